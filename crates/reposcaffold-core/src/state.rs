//! State reported to the orchestration layer

use crate::types::{Outputs, ProvisioningOptions, ProvisioningResult};

/// Clone URL of the provisioned repository
pub fn repo_url(options: &ProvisioningOptions, host: &str) -> String {
    format!(
        "https://{}/{}/{}.git",
        host,
        options.resolved_owner(),
        options.repo_name
    )
}

/// Derive the state map from the options alone. Pure: the same options and
/// host always produce the same result.
pub fn build_state(options: &ProvisioningOptions, host: &str) -> ProvisioningResult {
    let owner = options.owner().unwrap_or_default().to_string();
    let org = options.org().unwrap_or_default().to_string();

    ProvisioningResult {
        owner_login: owner.clone(),
        org_login: org.clone(),
        repo_name: options.repo_name.clone(),
        outputs: Outputs {
            owner,
            org,
            repo: options.repo_name.clone(),
            repo_url: repo_url(options, host),
        },
    }
}
