//! Deployment value types shared across the pipeline.
//!
//! Everything here is immutable once constructed: each pipeline stage
//! produces a new value rather than mutating a shared one, so a failure
//! at any stage leaves prior stages' results intact.

use std::fmt;
use std::str::FromStr;

use crate::error::{DeployError, DeployResult};

/// HTTP method of a routed endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
    /// PATCH
    Patch,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
}

impl HttpMethod {
    /// Returns the method as the uppercase wire string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            other => Err(DeployError::InvalidDeployment(format!(
                "unknown HTTP method: {other}"
            ))),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path-and-method pair exposed by the routing service.
///
/// Routes form a set: the pipeline deduplicates by method + path before
/// binding, so no stage ever carries two identical routes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Route {
    /// HTTP method.
    pub method: HttpMethod,
    /// Resource path, starting with `/`.
    pub path: String,
}

impl Route {
    /// Create a new route.
    ///
    /// # Errors
    /// Returns [`DeployError::InvalidDeployment`] if the path is empty or
    /// does not start with `/`.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> DeployResult<Self> {
        let path = path.into();
        if path.is_empty() || !path.starts_with('/') {
            return Err(DeployError::InvalidDeployment(format!(
                "route path must start with '/': {path:?}"
            )));
        }
        Ok(Self { method, path })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Immutable descriptor of one deployment run.
///
/// Created once per invocation from build metadata and caller
/// configuration; owned exclusively by the orchestrator for the duration
/// of the run. The region is carried as the raw caller-supplied string
/// and validated against [`crate::regions`] by the pre-flight stage.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Deployment {
    group_id: String,
    artifact_id: String,
    version: String,
    stage: String,
    region: String,
    routes: Vec<Route>,
}

impl Deployment {
    /// Create a deployment descriptor.
    ///
    /// Duplicate routes (same method + path) are collapsed, preserving
    /// first-seen order.
    ///
    /// # Errors
    /// Returns [`DeployError::InvalidDeployment`] if any of the string
    /// fields is empty.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        stage: impl Into<String>,
        region: impl Into<String>,
        routes: Vec<Route>,
    ) -> DeployResult<Self> {
        let group_id = non_empty("group_id", group_id.into())?;
        let artifact_id = non_empty("artifact_id", artifact_id.into())?;
        let version = non_empty("version", version.into())?;
        let stage = non_empty("stage", stage.into())?;
        let region = non_empty("region", region.into())?;

        let mut deduped: Vec<Route> = Vec::with_capacity(routes.len());
        for route in routes {
            if !deduped.contains(&route) {
                deduped.push(route);
            }
        }

        Ok(Self {
            group_id,
            artifact_id,
            version,
            stage,
            region,
            routes: deduped,
        })
    }

    /// Artifact group coordinate (e.g. `com.example`).
    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Artifact name coordinate.
    #[must_use]
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// Semantic version string of the artifact being deployed.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Target stage name (e.g. `prod`).
    #[must_use]
    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// Target region, as supplied by the caller (not yet validated).
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The declared route set of the artifact contract.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Derived stack name, stable for a given group/artifact/stage.
    ///
    /// CloudFormation stack names only allow alphanumerics and hyphens,
    /// so dots in the group coordinate are folded to hyphens.
    #[must_use]
    pub fn stack_name(&self) -> String {
        let raw = format!("{}-{}-{}", self.group_id, self.artifact_id, self.stage);
        raw.chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect()
    }
}

/// Result of stack provisioning: the two stack outputs every downstream
/// stage depends on. Both fields are non-empty on a successful return.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StackOutput {
    /// Execution role ARN granted to the function.
    pub execution_role: String,
    /// ARN of the provisioned function.
    pub function_arn: String,
}

/// Fully-qualified, version-pinned identifier for a deployed function.
///
/// Produced by the function deployer; consumed only by the endpoint
/// deployer. Two publishes of the same function share `function_arn` but
/// never `version`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FunctionReference {
    /// Base (unqualified) function ARN.
    pub function_arn: String,
    /// Version number minted by the publish.
    pub version: String,
}

impl FunctionReference {
    /// The version-qualified ARN, as required by routing integrations.
    #[must_use]
    pub fn qualified_arn(&self) -> String {
        format!("{}:{}", self.function_arn, self.version)
    }
}

impl fmt::Display for FunctionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.function_arn, self.version)
    }
}

fn non_empty(field: &str, value: String) -> DeployResult<String> {
    if value.trim().is_empty() {
        return Err(DeployError::InvalidDeployment(format!(
            "{field} must not be empty"
        )));
    }
    Ok(value)
}
