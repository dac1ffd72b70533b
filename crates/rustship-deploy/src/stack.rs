//! Stack provisioning stage.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use rustship_core::{DeployConfig, DeployError, DeployResult, Deployment, StackOutput, contract};
use rustship_provider::{StackDescription, StackService, UpdateOutcome};

use crate::template;

/// Idempotently creates or updates the deployment's stack and returns
/// its outputs.
///
/// Stack operations are asynchronous on the provider side, so after
/// submission the manager polls the stack until a terminal status,
/// backing off exponentially between polls up to the configured caps.
#[derive(Debug)]
pub struct StackManager {
    stacks: Arc<dyn StackService>,
    config: DeployConfig,
}

impl StackManager {
    /// Create a stack manager over a stack service.
    #[must_use]
    pub fn new(stacks: Arc<dyn StackService>, config: DeployConfig) -> Self {
        Self { stacks, config }
    }

    /// Create the deployment's stack if absent, update it otherwise, and
    /// wait for the operation to reach a terminal state.
    ///
    /// A provider-reported "no changes to apply" on update is success:
    /// the stack is already in the desired state and its current outputs
    /// are returned unchanged.
    ///
    /// # Errors
    /// Returns [`DeployError::Provisioning`] if the operation reaches a
    /// terminal failure status, the wait exceeds the configured maximum,
    /// or the stack outputs are missing.
    pub async fn create_or_update(&self, deployment: &Deployment) -> DeployResult<StackOutput> {
        let stack_name = deployment.stack_name();
        let body = template::template_body();
        let params = template::parameters(deployment);

        let existing = self
            .stacks
            .describe_stack(&stack_name)
            .await
            .map_err(|e| provisioning(&stack_name, e))?;

        if existing.is_none() {
            info!(stack = %stack_name, "stack not found, creating");
            self.stacks
                .create_stack(&stack_name, &body, &params)
                .await
                .map_err(|e| provisioning(&stack_name, e))?;
        } else {
            match self
                .stacks
                .update_stack(&stack_name, &body, &params)
                .await
                .map_err(|e| provisioning(&stack_name, e))?
            {
                UpdateOutcome::NoChanges => {
                    info!(stack = %stack_name, "no changes to apply, stack is up to date");
                }
                UpdateOutcome::Updated => {
                    info!(stack = %stack_name, "stack update submitted");
                }
            }
        }

        let description = self.wait_for_terminal(&stack_name).await?;
        extract_outputs(&stack_name, &description)
    }

    /// Poll the stack until it reaches a terminal status.
    async fn wait_for_terminal(&self, stack_name: &str) -> DeployResult<StackDescription> {
        let started = Instant::now();
        let mut interval = self.config.poll_initial_interval;

        loop {
            let description = self
                .stacks
                .describe_stack(stack_name)
                .await
                .map_err(|e| provisioning(stack_name, e))?
                .ok_or_else(|| DeployError::Provisioning {
                    stack_name: stack_name.to_owned(),
                    reason: "stack disappeared while waiting for a terminal state".to_owned(),
                })?;

            if description.status.is_terminal() {
                if description.status.is_success() {
                    return Ok(description);
                }
                return Err(DeployError::Provisioning {
                    stack_name: stack_name.to_owned(),
                    reason: description
                        .status_reason
                        .unwrap_or_else(|| format!("{:?}", description.status)),
                });
            }

            if started.elapsed() >= self.config.stack_max_wait {
                return Err(DeployError::Provisioning {
                    stack_name: stack_name.to_owned(),
                    reason: format!(
                        "stack did not reach a terminal state within {:?}",
                        self.config.stack_max_wait
                    ),
                });
            }

            debug!(stack = %stack_name, status = ?description.status, ?interval, "stack operation in progress");
            tokio::time::sleep(interval).await;
            interval = (interval * 2).min(self.config.poll_max_interval);
        }
    }
}

/// Pull the two required outputs out of a settled stack.
fn extract_outputs(stack_name: &str, description: &StackDescription) -> DeployResult<StackOutput> {
    let execution_role = required_output(stack_name, description, contract::OUTPUT_EXECUTION_ROLE)?;
    let function_arn = required_output(stack_name, description, contract::OUTPUT_FUNCTION_ARN)?;
    Ok(StackOutput {
        execution_role,
        function_arn,
    })
}

fn required_output(
    stack_name: &str,
    description: &StackDescription,
    key: &str,
) -> DeployResult<String> {
    match description.outputs.get(key) {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        _ => Err(DeployError::Provisioning {
            stack_name: stack_name.to_owned(),
            reason: format!("stack output {key} is missing or empty"),
        }),
    }
}

fn provisioning(stack_name: &str, source: rustship_provider::ProviderError) -> DeployError {
    DeployError::Provisioning {
        stack_name: stack_name.to_owned(),
        reason: source.to_string(),
    }
}
