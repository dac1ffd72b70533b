//! Endpoint binding and stage activation.

use std::sync::Arc;

use tracing::{debug, info};

use rustship_core::{DeployError, DeployResult, Deployment, FunctionReference};
use rustship_provider::RoutingService;

/// Binds the declared route set to a function version and activates it
/// under the deployment's stage.
///
/// All per-route bindings complete before the single activation call, so
/// a stage is never cut over to a partially bound route set: the first
/// binding failure aborts the stage entirely and whatever was active
/// before remains active.
#[derive(Debug)]
pub struct EndpointDeployer {
    routing: Arc<dyn RoutingService>,
}

impl EndpointDeployer {
    /// Create an endpoint deployer over a routing service.
    #[must_use]
    pub fn new(routing: Arc<dyn RoutingService>) -> Self {
        Self { routing }
    }

    /// Bind every declared route, then activate the stage.
    ///
    /// # Errors
    /// Returns [`DeployError::Endpoint`] naming the failing route if any
    /// binding fails (activation is not attempted), or naming the stage
    /// activation if the final cutover fails.
    pub async fn deploy_endpoints(
        &self,
        deployment: &Deployment,
        function: &FunctionReference,
        execution_role: &str,
    ) -> DeployResult<()> {
        let stage = deployment.stage();
        let qualified_arn = function.qualified_arn();

        for route in deployment.routes() {
            self.routing
                .bind_route(stage, route, &qualified_arn, execution_role)
                .await
                .map_err(|e| DeployError::Endpoint {
                    route: route.to_string(),
                    reason: e.to_string(),
                })?;
            debug!(%route, stage = %stage, "route bound");
        }

        self.routing
            .activate_stage(stage)
            .await
            .map_err(|e| DeployError::Endpoint {
                route: format!("stage activation ({stage})"),
                reason: e.to_string(),
            })?;

        info!(
            stage = %stage,
            routes = deployment.routes().len(),
            function = %function,
            "endpoints activated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rustship_core::{HttpMethod, Route};
    use rustship_provider::memory::InMemoryRoutingService;

    const ROLE: &str = "arn:aws:iam::000000000000:role/svc-execution-role";

    fn function() -> FunctionReference {
        FunctionReference {
            function_arn: "arn:aws:lambda:us-east-1:000000000000:function:svc".to_owned(),
            version: "2".to_owned(),
        }
    }

    fn deployment(routes: Vec<Route>) -> Deployment {
        Deployment::new("com.example", "svc", "1.2.0", "prod", "us-east-1", routes).unwrap()
    }

    fn routes() -> Vec<Route> {
        vec![
            Route::new(HttpMethod::Get, "/users").unwrap(),
            Route::new(HttpMethod::Post, "/users").unwrap(),
            Route::new(HttpMethod::Delete, "/users/{id}").unwrap(),
        ]
    }

    #[tokio::test]
    async fn test_should_bind_all_routes_then_activate() {
        let routing = Arc::new(InMemoryRoutingService::new());
        let deployer = EndpointDeployer::new(Arc::clone(&routing) as _);

        deployer
            .deploy_endpoints(&deployment(routes()), &function(), ROLE)
            .await
            .unwrap();

        let active = routing.active_routes("prod");
        assert_eq!(active.len(), 3);
        assert!(active.iter().all(|b| b.qualified_arn.ends_with(":2")));
        assert!(active.iter().all(|b| b.execution_role == ROLE));
        assert_eq!(routing.activate_calls(), 1);
    }

    #[tokio::test]
    async fn test_should_not_activate_when_a_binding_fails() {
        let routing = Arc::new(InMemoryRoutingService::new());
        routing.fail_route(Route::new(HttpMethod::Post, "/users").unwrap());
        let deployer = EndpointDeployer::new(Arc::clone(&routing) as _);

        let err = deployer
            .deploy_endpoints(&deployment(routes()), &function(), ROLE)
            .await
            .unwrap_err();

        match err {
            DeployError::Endpoint { route, .. } => assert_eq!(route, "POST /users"),
            other => panic!("expected Endpoint, got {other}"),
        }
        assert_eq!(routing.activate_calls(), 0);
        assert!(routing.active_routes("prod").is_empty());
    }

    #[tokio::test]
    async fn test_should_keep_previous_stage_active_on_failure() {
        let routing = Arc::new(InMemoryRoutingService::new());
        let deployer = EndpointDeployer::new(Arc::clone(&routing) as _);

        // First deployment activates version 1 on a single route.
        let v1 = FunctionReference {
            version: "1".to_owned(),
            ..function()
        };
        deployer
            .deploy_endpoints(
                &deployment(vec![Route::new(HttpMethod::Get, "/users").unwrap()]),
                &v1,
                ROLE,
            )
            .await
            .unwrap();

        // Second deployment fails on its last route.
        routing.fail_route(Route::new(HttpMethod::Delete, "/users/{id}").unwrap());
        let err = deployer
            .deploy_endpoints(&deployment(routes()), &function(), ROLE)
            .await;
        assert!(err.is_err());

        let active = routing.active_routes("prod");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].qualified_arn.split(':').next_back(), Some("1"));
    }

    #[tokio::test]
    async fn test_should_activate_stage_with_empty_route_set() {
        let routing = Arc::new(InMemoryRoutingService::new());
        let deployer = EndpointDeployer::new(Arc::clone(&routing) as _);

        deployer
            .deploy_endpoints(&deployment(vec![]), &function(), ROLE)
            .await
            .unwrap();

        assert_eq!(routing.bind_calls(), 0);
        assert_eq!(routing.activate_calls(), 1);
    }
}
