//! AWS SDK implementations of the RustShip provider traits.
//!
//! Each service wraps the corresponding SDK client behind the
//! capability traits from `rustship-provider`: CloudFormation as the
//! stack service, Lambda as the function service, and API Gateway
//! (REST) as the routing service.

mod apigateway;
mod cloudformation;
mod lambda;

pub use apigateway::ApiGatewayRoutingService;
pub use cloudformation::CloudFormationStackService;
pub use lambda::LambdaFunctionService;

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};

/// The three SDK-backed provider services, built from one shared
/// credential/region configuration.
#[derive(Debug)]
pub struct AwsProviders {
    /// CloudFormation-backed stack service.
    pub stacks: Arc<CloudFormationStackService>,
    /// Lambda-backed function service.
    pub functions: Arc<LambdaFunctionService>,
    /// API Gateway-backed routing service.
    pub routing: Arc<ApiGatewayRoutingService>,
}

impl AwsProviders {
    /// Load AWS configuration from the environment and construct the
    /// three services scoped to `region`. The routing service manages
    /// the REST API named `api_name`.
    pub async fn from_env(region: &str, api_name: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_owned()))
            .load()
            .await;

        Self {
            stacks: Arc::new(CloudFormationStackService::new(
                aws_sdk_cloudformation::Client::new(&config),
            )),
            functions: Arc::new(LambdaFunctionService::new(aws_sdk_lambda::Client::new(
                &config,
            ))),
            routing: Arc::new(ApiGatewayRoutingService::new(
                aws_sdk_apigateway::Client::new(&config),
                region,
                api_name,
            )),
        }
    }
}
