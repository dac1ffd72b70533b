//! Failure-path integration tests: where the pipeline halts and what it
//! leaves behind.

#[cfg(test)]
mod tests {
    use rustship_core::{DeployError, HttpMethod, Route};
    use rustship_deploy::Stage;

    use crate::{pipeline, test_deployment};

    #[tokio::test]
    async fn test_should_halt_before_any_provider_call_for_unknown_region() {
        let p = pipeline();
        let err = p
            .orchestrator
            .run(test_deployment("1.2.0", "mars-1"))
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::Init);
        assert!(matches!(err.source, DeployError::InvalidRegion(_)));
        assert!(
            err.source
                .to_string()
                .contains("mars-1 is not an AWS region")
        );
        assert_eq!(p.stacks.total_calls(), 0);
        assert_eq!(p.functions.total_calls(), 0);
        assert_eq!(p.routing.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_should_halt_after_stack_failure_without_touching_downstream() {
        let p = pipeline();
        p.stacks
            .fail_next_operation("ROLLBACK_COMPLETE: role creation denied");
        let err = p
            .orchestrator
            .run(test_deployment("1.2.0", "us-east-1"))
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::RegionChecked);
        assert!(matches!(err.source, DeployError::Provisioning { .. }));
        assert!(err.source.to_string().contains("role creation denied"));
        assert_eq!(p.functions.total_calls(), 0);
        assert_eq!(p.routing.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_should_keep_stack_after_publish_failure() {
        let p = pipeline();
        p.functions.fail_next_publish("rate exceeded");
        let err = p
            .orchestrator
            .run(test_deployment("1.2.0", "us-east-1"))
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::StackApplied);
        assert!(matches!(err.source, DeployError::Publish { .. }));
        assert_eq!(p.routing.total_calls(), 0);

        // The stack survives the failed publish; a rerun picks it up via
        // the update path and succeeds.
        let report = p
            .orchestrator
            .run(test_deployment("1.2.0", "us-east-1"))
            .await
            .expect("rerun should succeed");
        assert_eq!(p.stacks.create_calls(), 1);
        assert_eq!(report.function.version, "1");
    }

    #[tokio::test]
    async fn test_should_keep_active_routes_when_binding_fails() {
        let p = pipeline();
        p.orchestrator
            .run(test_deployment("1.0.0", "us-east-1"))
            .await
            .expect("first deployment should succeed");
        let before = p.routing.active_routes("prod");
        assert_eq!(before.len(), 2);

        p.routing
            .fail_route(Route::new(HttpMethod::Get, "/users").expect("valid route"));
        let err = p
            .orchestrator
            .run(test_deployment("1.1.0", "us-east-1"))
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::FunctionPublished);
        assert!(matches!(err.source, DeployError::Endpoint { .. }));

        // The failed run never reached activation, so the previously
        // active set still serves version 1.
        let after = p.routing.active_routes("prod");
        assert_eq!(after, before);
        assert!(after.iter().all(|b| b.qualified_arn.ends_with(":1")));
    }

    #[tokio::test]
    async fn test_should_wrap_failure_exactly_once() {
        let p = pipeline();
        p.stacks.fail_next_operation("quota exceeded");
        let err = p
            .orchestrator
            .run(test_deployment("1.2.0", "us-east-1"))
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("deployment failed at stage RegionChecked"));
        assert_eq!(message.matches("failed at stage").count(), 1);
    }
}
