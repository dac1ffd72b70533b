//! Static catalog of known AWS region codes.
//!
//! Region validation is a pure lookup against a closed set: no network
//! call, no side effect. The orchestrator runs it before any provider
//! call is made.

use crate::error::{DeployError, DeployResult};

/// All region codes the deployer accepts.
///
/// Kept in sync with the commercial, GovCloud, and China partitions.
pub const KNOWN_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "ca-central-1",
    "ca-west-1",
    "sa-east-1",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "eu-central-1",
    "eu-central-2",
    "eu-north-1",
    "eu-south-1",
    "eu-south-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-southeast-3",
    "ap-southeast-4",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-south-1",
    "ap-south-2",
    "ap-east-1",
    "af-south-1",
    "me-south-1",
    "me-central-1",
    "il-central-1",
    "us-gov-west-1",
    "us-gov-east-1",
    "cn-north-1",
    "cn-northwest-1",
];

/// Returns `true` if `name` is a known AWS region code.
#[must_use]
pub fn is_known(name: &str) -> bool {
    KNOWN_REGIONS.contains(&name)
}

/// Validate a region name against the catalog.
///
/// # Errors
/// Returns [`DeployError::InvalidRegion`] carrying the offending name if
/// it is not in the catalog.
pub fn validate(name: &str) -> DeployResult<()> {
    if is_known(name) {
        Ok(())
    } else {
        Err(DeployError::InvalidRegion(name.to_owned()))
    }
}
