//! Subcommand handlers

use anyhow::{bail, Context, Result};
use camino::Utf8Path;
use reposcaffold::{OptionsMap, Plugin};
use reposcaffold_core::ScaffoldConfig;
use serde_json::Value;

use crate::cli::OptionsArgs;
use crate::output;

/// Load the scaffold config, or the defaults when no file is given
pub fn load_config(path: Option<&Utf8Path>) -> Result<ScaffoldConfig> {
    let Some(path) = path else {
        return Ok(ScaffoldConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path))?;
    ScaffoldConfig::from_yaml(&text).with_context(|| format!("Failed to parse config file {}", path))
}

fn options_map(args: &OptionsArgs) -> Result<OptionsMap> {
    if let Some(path) = &args.options {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file {}", path))?;
        let value: Value = serde_yaml_ng::from_str(&text)
            .with_context(|| format!("Failed to parse options file {}", path))?;
        return match value {
            Value::Object(map) => Ok(map),
            _ => bail!("Options file {} must contain a mapping", path),
        };
    }

    let mut map = OptionsMap::new();
    let flags = [
        ("repo", &args.repo),
        ("owner", &args.owner),
        ("org", &args.org),
        ("image_repo", &args.image_repo),
        ("branch", &args.branch),
    ];
    for (key, value) in flags {
        if let Some(value) = value {
            map.insert(key.to_string(), Value::from(value.as_str()));
        }
    }
    Ok(map)
}

/// `owner/repo` as given on the command line, for terminal messages
fn repo_label(options: &OptionsMap) -> String {
    let field = |key: &str| options.get(key).and_then(Value::as_str).filter(|s| !s.is_empty());
    let repo = field("repo").unwrap_or("<repo>");
    match field("org").or_else(|| field("owner")) {
        Some(owner) => format!("{}/{}", owner, repo),
        None => repo.to_string(),
    }
}

pub async fn create(args: OptionsArgs, config: ScaffoldConfig) -> Result<()> {
    let options = options_map(&args)?;
    let plugin = Plugin::github(config)?;
    let label = repo_label(&options);

    let spinner = output::working(&label, "provisioning from template...");
    let state = plugin.create(&options).await;
    spinner.finish_and_clear();

    let state = state?;
    output::done(&label, "created");
    output::state(&state);
    Ok(())
}

pub async fn read(args: OptionsArgs, config: ScaffoldConfig) -> Result<()> {
    let options = options_map(&args)?;
    let plugin = Plugin::github(config)?;
    let label = repo_label(&options);

    match plugin.read(&options).await? {
        Some(state) => {
            output::done(&label, "exists");
            output::state(&state);
        }
        None => output::not_found(&label),
    }
    Ok(())
}

pub async fn update(args: OptionsArgs, config: ScaffoldConfig) -> Result<()> {
    let options = options_map(&args)?;
    let plugin = Plugin::github(config)?;
    let label = repo_label(&options);

    let spinner = output::working(&label, "deleting and provisioning...");
    let state = plugin.update(&options).await;
    spinner.finish_and_clear();

    let state = state?;
    output::done(&label, "re-created");
    output::state(&state);
    Ok(())
}

pub async fn delete(args: OptionsArgs, config: ScaffoldConfig) -> Result<()> {
    let options = options_map(&args)?;
    let plugin = Plugin::github(config)?;

    plugin.delete(&options).await?;
    output::done(&repo_label(&options), "deleted");
    Ok(())
}
