//! Function version publish stage.

use std::sync::Arc;

use tracing::info;

use rustship_core::{DeployConfig, DeployError, DeployResult, Deployment, FunctionReference};
use rustship_provider::{FunctionService, FunctionSettings};

/// Publishes a new immutable version of the provisioned function.
///
/// The function code itself is uploaded by the packaging step before the
/// pipeline runs; this stage only applies the declared resource settings
/// and cuts the version.
#[derive(Debug)]
pub struct FunctionDeployer {
    functions: Arc<dyn FunctionService>,
    config: DeployConfig,
}

impl FunctionDeployer {
    /// Create a function deployer over a function service.
    #[must_use]
    pub fn new(functions: Arc<dyn FunctionService>, config: DeployConfig) -> Self {
        Self { functions, config }
    }

    /// Configure the function and publish a new version.
    ///
    /// The returned reference pins both the base function identity and
    /// the newly minted version number, distinct from any prior
    /// version's reference.
    ///
    /// # Errors
    /// Returns [`DeployError::Publish`] if the function does not resolve
    /// or the publish fails.
    pub async fn publish_version(
        &self,
        function_arn: &str,
        deployment: &Deployment,
    ) -> DeployResult<FunctionReference> {
        let settings = FunctionSettings {
            memory_mb: self.config.function_memory_mb,
            timeout_secs: self.config.function_timeout_secs,
        };

        self.functions
            .configure_function(function_arn, &settings)
            .await
            .map_err(|e| publish(function_arn, e))?;

        let description = format!(
            "{}:{} {} ({})",
            deployment.group_id(),
            deployment.artifact_id(),
            deployment.version(),
            deployment.stage()
        );
        let version = self
            .functions
            .publish_version(function_arn, &description)
            .await
            .map_err(|e| publish(function_arn, e))?;

        if version.is_empty() {
            return Err(DeployError::Publish {
                function: function_arn.to_owned(),
                reason: "provider returned an empty version".to_owned(),
            });
        }

        info!(function = %function_arn, version = %version, "published function version");
        Ok(FunctionReference {
            function_arn: function_arn.to_owned(),
            version,
        })
    }
}

fn publish(function_arn: &str, source: rustship_provider::ProviderError) -> DeployError {
    DeployError::Publish {
        function: function_arn.to_owned(),
        reason: source.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rustship_core::{HttpMethod, Route};
    use rustship_provider::memory::InMemoryFunctionService;

    const ARN: &str = "arn:aws:lambda:us-east-1:000000000000:function:svc";

    fn deployment() -> Deployment {
        Deployment::new(
            "com.example",
            "svc",
            "1.2.0",
            "prod",
            "us-east-1",
            vec![Route::new(HttpMethod::Get, "/users").unwrap()],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_should_publish_and_pin_version() {
        let functions = Arc::new(InMemoryFunctionService::new());
        functions.register_function(ARN);
        let deployer = FunctionDeployer::new(Arc::clone(&functions) as _, DeployConfig::default());

        let func = deployer.publish_version(ARN, &deployment()).await.unwrap();
        assert_eq!(func.function_arn, ARN);
        assert_eq!(func.version, "1");
        assert_eq!(func.qualified_arn(), format!("{ARN}:1"));
    }

    #[tokio::test]
    async fn test_should_mint_distinct_versions_for_same_function() {
        let functions = Arc::new(InMemoryFunctionService::new());
        functions.register_function(ARN);
        let deployer = FunctionDeployer::new(Arc::clone(&functions) as _, DeployConfig::default());

        let first = deployer.publish_version(ARN, &deployment()).await.unwrap();
        let second = deployer.publish_version(ARN, &deployment()).await.unwrap();
        assert_eq!(first.function_arn, second.function_arn);
        assert_ne!(first.version, second.version);
    }

    #[tokio::test]
    async fn test_should_apply_configured_settings() {
        let functions = Arc::new(InMemoryFunctionService::new());
        functions.register_function(ARN);
        let config = DeployConfig {
            function_memory_mb: 1024,
            function_timeout_secs: 60,
            ..DeployConfig::default()
        };
        let deployer = FunctionDeployer::new(Arc::clone(&functions) as _, config);

        deployer.publish_version(ARN, &deployment()).await.unwrap();
        let settings = functions.settings(ARN).unwrap();
        assert_eq!(settings.memory_mb, 1024);
        assert_eq!(settings.timeout_secs, 60);
    }

    #[tokio::test]
    async fn test_should_fail_when_function_not_found() {
        let functions = Arc::new(InMemoryFunctionService::new());
        let deployer = FunctionDeployer::new(Arc::clone(&functions) as _, DeployConfig::default());

        let err = deployer
            .publish_version(ARN, &deployment())
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::Publish { .. }));
    }

    #[tokio::test]
    async fn test_should_surface_publish_failure() {
        let functions = Arc::new(InMemoryFunctionService::new());
        functions.register_function(ARN);
        functions.fail_next_publish("CodeStorageExceededException");
        let deployer = FunctionDeployer::new(Arc::clone(&functions) as _, DeployConfig::default());

        let err = deployer
            .publish_version(ARN, &deployment())
            .await
            .unwrap_err();
        match err {
            DeployError::Publish { function, reason } => {
                assert_eq!(function, ARN);
                assert!(reason.contains("CodeStorageExceededException"));
            }
            other => panic!("expected Publish, got {other}"),
        }
    }
}
