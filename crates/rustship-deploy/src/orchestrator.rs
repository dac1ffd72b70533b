//! Deployment orchestration.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use rustship_core::{
    DeployConfig, DeployError, Deployment, FunctionReference, StackOutput, regions,
};
use rustship_provider::{FunctionService, RoutingService, StackService};

use crate::endpoints::EndpointDeployer;
use crate::function::FunctionDeployer;
use crate::stack::StackManager;

/// States of the deployment state machine.
///
/// Progress is strictly linear: `Init → RegionChecked → StackApplied →
/// FunctionPublished → EndpointsDeployed → Done`. No transition skips a
/// state and no state is revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Nothing has run yet; region validation is next.
    Init,
    /// Region validated; stack provisioning is next.
    RegionChecked,
    /// Stack outputs available; version publish is next.
    StackApplied,
    /// Function version pinned; endpoint deployment is next.
    FunctionPublished,
    /// Endpoints bound and stage activated.
    EndpointsDeployed,
    /// The run completed.
    Done,
}

impl Stage {
    /// Stage name as reported in logs and failure records.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::RegionChecked => "RegionChecked",
            Self::StackApplied => "StackApplied",
            Self::FunctionPublished => "FunctionPublished",
            Self::EndpointsDeployed => "EndpointsDeployed",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deployment failure: the stage the machine was in when a component
/// failed, plus the underlying cause.
///
/// Prior stages' resources are left in place; there is no automatic
/// rollback.
#[derive(Debug, thiserror::Error)]
#[error("deployment failed at stage {stage}: {source}")]
pub struct PipelineError {
    /// The state the machine was in when the failure occurred.
    pub stage: Stage,
    /// The component-level cause.
    #[source]
    pub source: DeployError,
}

/// Identifiers produced by a successful run.
#[derive(Debug, Clone)]
pub struct DeploymentReport {
    /// Outputs of the provisioned stack.
    pub stack_output: StackOutput,
    /// The version-pinned function reference that was wired up.
    pub function: FunctionReference,
    /// Number of routes activated under the stage.
    pub routes_deployed: usize,
}

/// Sequences the pipeline stages, propagating each stage's output into
/// the next stage's input.
///
/// One orchestrator run owns its [`Deployment`] and every intermediate
/// value exclusively; nothing is shared or mutated across stages, and no
/// two stages ever execute concurrently.
#[derive(Debug)]
pub struct DeploymentOrchestrator {
    stack_manager: StackManager,
    function_deployer: FunctionDeployer,
    endpoint_deployer: EndpointDeployer,
}

impl DeploymentOrchestrator {
    /// Create an orchestrator over the three provider services.
    #[must_use]
    pub fn new(
        stacks: Arc<dyn StackService>,
        functions: Arc<dyn FunctionService>,
        routing: Arc<dyn RoutingService>,
        config: DeployConfig,
    ) -> Self {
        Self {
            stack_manager: StackManager::new(stacks, config.clone()),
            function_deployer: FunctionDeployer::new(functions, config),
            endpoint_deployer: EndpointDeployer::new(routing),
        }
    }

    /// Run one deployment to completion or fatal failure.
    ///
    /// On any component failure the run halts immediately: no stage
    /// after the failing one is invoked, prior stages are not undone,
    /// and the error is wrapped exactly once with the stage name.
    pub async fn run(&self, deployment: Deployment) -> Result<DeploymentReport, PipelineError> {
        info!(
            group_id = %deployment.group_id(),
            artifact_id = %deployment.artifact_id(),
            version = %deployment.version(),
            stage = %deployment.stage(),
            region = %deployment.region(),
            "deployment starting"
        );

        regions::validate(deployment.region()).map_err(|e| fail(Stage::Init, e))?;
        info!(state = %Stage::RegionChecked, region = %deployment.region(), "region validated");

        let stack_output = self
            .stack_manager
            .create_or_update(&deployment)
            .await
            .map_err(|e| fail(Stage::RegionChecked, e))?;
        info!(
            state = %Stage::StackApplied,
            execution_role = %stack_output.execution_role,
            function_arn = %stack_output.function_arn,
            "stack applied"
        );

        let function = self
            .function_deployer
            .publish_version(&stack_output.function_arn, &deployment)
            .await
            .map_err(|e| fail(Stage::StackApplied, e))?;
        info!(state = %Stage::FunctionPublished, function = %function, "function version published");

        self.endpoint_deployer
            .deploy_endpoints(&deployment, &function, &stack_output.execution_role)
            .await
            .map_err(|e| fail(Stage::FunctionPublished, e))?;
        info!(
            state = %Stage::EndpointsDeployed,
            stage = %deployment.stage(),
            routes = deployment.routes().len(),
            "endpoints deployed"
        );

        info!(state = %Stage::Done, "deployment complete");
        Ok(DeploymentReport {
            routes_deployed: deployment.routes().len(),
            stack_output,
            function,
        })
    }
}

fn fail(stage: Stage, source: DeployError) -> PipelineError {
    PipelineError { stage, source }
}
