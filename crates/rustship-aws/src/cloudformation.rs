//! CloudFormation-backed stack service.

use async_trait::async_trait;
use aws_sdk_cloudformation::Client;
use aws_sdk_cloudformation::error::ProvideErrorMetadata;
use aws_sdk_cloudformation::types::{Capability, Parameter};
use tracing::debug;

use rustship_provider::{
    ProviderError, ProviderResult, StackDescription, StackParameter, StackService, StackStatus,
    UpdateOutcome,
};

/// [`StackService`] over the CloudFormation API.
#[derive(Debug)]
pub struct CloudFormationStackService {
    client: Client,
}

impl CloudFormationStackService {
    /// Wrap a CloudFormation client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StackService for CloudFormationStackService {
    async fn describe_stack(&self, name: &str) -> ProviderResult<Option<StackDescription>> {
        let response = match self.client.describe_stacks().stack_name(name).send().await {
            Ok(response) => response,
            // DescribeStacks reports a missing stack as a validation
            // error, not an empty result.
            Err(e) if message_of(&e).contains("does not exist") => return Ok(None),
            Err(e) => return Err(ProviderError::api(message_of(&e))),
        };

        let Some(stack) = response.stacks().first() else {
            return Ok(None);
        };

        let outputs = stack
            .outputs()
            .iter()
            .filter_map(|o| Some((o.output_key()?.to_owned(), o.output_value()?.to_owned())))
            .collect();

        Ok(Some(StackDescription {
            status: map_status(stack.stack_status().map(aws_sdk_cloudformation::types::StackStatus::as_str)),
            status_reason: stack.stack_status_reason().map(ToOwned::to_owned),
            outputs,
        }))
    }

    async fn create_stack(
        &self,
        name: &str,
        template_body: &str,
        parameters: &[StackParameter],
    ) -> ProviderResult<()> {
        debug!(stack = %name, "submitting CreateStack");
        self.client
            .create_stack()
            .stack_name(name)
            .template_body(template_body)
            .set_parameters(Some(to_parameters(parameters)))
            .capabilities(Capability::CapabilityIam)
            .send()
            .await
            .map_err(|e| ProviderError::api(message_of(&e)))?;
        Ok(())
    }

    async fn update_stack(
        &self,
        name: &str,
        template_body: &str,
        parameters: &[StackParameter],
    ) -> ProviderResult<UpdateOutcome> {
        debug!(stack = %name, "submitting UpdateStack");
        match self
            .client
            .update_stack()
            .stack_name(name)
            .template_body(template_body)
            .set_parameters(Some(to_parameters(parameters)))
            .capabilities(Capability::CapabilityIam)
            .send()
            .await
        {
            Ok(_) => Ok(UpdateOutcome::Updated),
            // An update matching the deployed state is rejected with
            // this validation error; the stack is already as desired.
            Err(e) if message_of(&e).contains("No updates are to be performed") => {
                Ok(UpdateOutcome::NoChanges)
            }
            Err(e) => Err(ProviderError::api(message_of(&e))),
        }
    }
}

/// Render an SDK error into the provider-facing message.
fn message_of<E, R>(err: &aws_sdk_cloudformation::error::SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    err.meta()
        .message()
        .map_or_else(|| err.to_string(), ToOwned::to_owned)
}

/// Map a CloudFormation stack status string onto the provider model.
fn map_status(status: Option<&str>) -> StackStatus {
    match status {
        Some("CREATE_COMPLETE") => StackStatus::CreateComplete,
        Some("CREATE_FAILED") => StackStatus::CreateFailed,
        Some("CREATE_IN_PROGRESS" | "REVIEW_IN_PROGRESS") | None => StackStatus::CreateInProgress,
        Some("UPDATE_COMPLETE") => StackStatus::UpdateComplete,
        Some("UPDATE_IN_PROGRESS" | "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS") => {
            StackStatus::UpdateInProgress
        }
        Some("UPDATE_FAILED" | "UPDATE_ROLLBACK_COMPLETE" | "UPDATE_ROLLBACK_FAILED") => {
            StackStatus::UpdateFailed
        }
        Some(
            "ROLLBACK_IN_PROGRESS"
            | "UPDATE_ROLLBACK_IN_PROGRESS"
            | "UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS",
        ) => StackStatus::RollbackInProgress,
        // Everything else (rollback/deletion outcomes) is a terminal
        // failure from the deployer's point of view.
        Some(_) => StackStatus::RollbackComplete,
    }
}

fn to_parameters(parameters: &[StackParameter]) -> Vec<Parameter> {
    parameters
        .iter()
        .map(|p| {
            Parameter::builder()
                .parameter_key(&p.key)
                .parameter_value(&p.value)
                .build()
        })
        .collect()
}
