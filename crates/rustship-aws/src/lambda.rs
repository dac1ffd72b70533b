//! Lambda-backed function service.

use async_trait::async_trait;
use aws_sdk_lambda::Client;
use aws_sdk_lambda::error::ProvideErrorMetadata;
use tracing::debug;

use rustship_provider::{FunctionService, FunctionSettings, ProviderError, ProviderResult};

/// [`FunctionService`] over the Lambda API.
#[derive(Debug)]
pub struct LambdaFunctionService {
    client: Client,
}

impl LambdaFunctionService {
    /// Wrap a Lambda client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FunctionService for LambdaFunctionService {
    async fn configure_function(
        &self,
        function_arn: &str,
        settings: &FunctionSettings,
    ) -> ProviderResult<()> {
        debug!(function = %function_arn, "updating function configuration");
        self.client
            .update_function_configuration()
            .function_name(function_arn)
            .memory_size(settings.memory_mb)
            .timeout(settings.timeout_secs)
            .send()
            .await
            .map_err(|e| classify(function_arn, &e))?;
        Ok(())
    }

    async fn publish_version(
        &self,
        function_arn: &str,
        description: &str,
    ) -> ProviderResult<String> {
        debug!(function = %function_arn, "publishing function version");
        let response = self
            .client
            .publish_version()
            .function_name(function_arn)
            .description(description)
            .send()
            .await
            .map_err(|e| classify(function_arn, &e))?;

        response
            .version()
            .map(ToOwned::to_owned)
            .ok_or_else(|| ProviderError::api("PublishVersion returned no version number"))
    }
}

/// Turn an SDK error into the provider error model, distinguishing a
/// missing function from other API failures.
fn classify<E, R>(
    function_arn: &str,
    err: &aws_sdk_lambda::error::SdkError<E, R>,
) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    if err.meta().code() == Some("ResourceNotFoundException") {
        return ProviderError::NotFound(format!("function not found: {function_arn}"));
    }
    ProviderError::api(
        err.meta()
            .message()
            .map_or_else(|| err.to_string(), ToOwned::to_owned),
    )
}
