//! RustShip CLI - deploy a packaged artifact to AWS Lambda and API Gateway.
//!
//! One invocation runs the full pipeline: validate the target region,
//! create or update the artifact's CloudFormation stack, publish a new
//! Lambda version, and activate the declared routes under the target
//! stage. The process exits non-zero if any stage fails, with the
//! failing stage and cause in the log.
//!
//! # Usage
//!
//! ```text
//! rustship --group-id com.example --artifact-id svc \
//!     --artifact-version 1.2.0 --stage prod --region us-east-1 \
//!     --route "GET /users" --route "POST /users"
//! ```
//!
//! Pass `--local` to run against the in-memory providers instead of AWS.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RUSTSHIP_POLL_INITIAL_SECS` | `2` | First stack poll delay |
//! | `RUSTSHIP_POLL_MAX_SECS` | `30` | Per-poll delay cap |
//! | `RUSTSHIP_STACK_MAX_WAIT_SECS` | `900` | Overall stack wait cap |
//! | `RUSTSHIP_FUNCTION_MEMORY_MB` | `512` | Function memory size |
//! | `RUSTSHIP_FUNCTION_TIMEOUT_SECS` | `30` | Function timeout |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `--log-level`) |

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rustship_aws::AwsProviders;
use rustship_core::{DeployConfig, DeployError, Deployment, Route};
use rustship_deploy::DeploymentOrchestrator;
use rustship_provider::memory::{
    InMemoryFunctionService, InMemoryRoutingService, InMemoryStackService,
};
use rustship_provider::{FunctionService, RoutingService, StackService};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "rustship", version, about)]
struct Args {
    /// Artifact group coordinate (e.g. com.example).
    #[arg(long)]
    group_id: String,

    /// Artifact name coordinate.
    #[arg(long)]
    artifact_id: String,

    /// Artifact version to deploy.
    #[arg(long)]
    artifact_version: String,

    /// Stage to deploy (e.g. prod).
    #[arg(long, default_value = "dev")]
    stage: String,

    /// Region to deploy.
    #[arg(long, default_value = "us-east-1")]
    region: String,

    /// Route to expose, as "METHOD /path". Repeatable.
    #[arg(long = "route")]
    routes: Vec<String>,

    /// Run against the in-memory providers instead of AWS.
    #[arg(long)]
    local: bool,

    /// Log level filter when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `--log-level` value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Parse a `"METHOD /path"` route argument.
fn parse_route(raw: &str) -> Result<Route, DeployError> {
    let mut parts = raw.split_whitespace();
    let (Some(method), Some(path), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(DeployError::InvalidDeployment(format!(
            "route must be \"METHOD /path\": {raw:?}"
        )));
    };
    Route::new(method.parse()?, path)
}

/// The three provider services the orchestrator runs against.
type Providers = (
    Arc<dyn StackService>,
    Arc<dyn FunctionService>,
    Arc<dyn RoutingService>,
);

/// Build the in-memory providers for a `--local` run.
fn local_providers(region: &str) -> Providers {
    let functions = Arc::new(InMemoryFunctionService::new());
    let stacks =
        Arc::new(InMemoryStackService::new(region).with_function_service(Arc::clone(&functions)));
    let routing = Arc::new(InMemoryRoutingService::new());
    (stacks, functions, routing)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let routes = args
        .routes
        .iter()
        .map(|raw| parse_route(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let deployment = Deployment::new(
        &args.group_id,
        &args.artifact_id,
        &args.artifact_version,
        &args.stage,
        &args.region,
        routes,
    )?;

    let config = DeployConfig::from_env();
    let (stacks, functions, routing): Providers = if args.local {
        info!("running against in-memory providers");
        local_providers(&args.region)
    } else {
        let providers = AwsProviders::from_env(&args.region, &args.artifact_id).await;
        (providers.stacks, providers.functions, providers.routing)
    };

    let orchestrator = DeploymentOrchestrator::new(stacks, functions, routing, config);
    match orchestrator.run(deployment).await {
        Ok(report) => {
            info!(
                function = %report.function,
                execution_role = %report.stack_output.execution_role,
                routes = report.routes_deployed,
                "deployment succeeded"
            );
            Ok(())
        }
        Err(e) => {
            error!(stage = %e.stage, cause = %e.source, "deployment failed");
            Err(e.into())
        }
    }
}
