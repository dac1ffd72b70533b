//! Happy-path pipeline integration tests.

#[cfg(test)]
mod tests {
    use crate::{pipeline, pipeline_with_settle_polls, test_deployment};

    #[tokio::test]
    async fn test_should_deploy_end_to_end() {
        let p = pipeline();
        let report = p
            .orchestrator
            .run(test_deployment("1.2.0", "us-east-1"))
            .await
            .expect("deployment should succeed");

        assert_eq!(
            report.stack_output.function_arn,
            "arn:aws:lambda:us-east-1:000000000000:function:svc"
        );
        assert_eq!(report.function.version, "1");
        assert_eq!(report.routes_deployed, 2);

        let active = p.routing.active_routes("prod");
        assert_eq!(active.len(), 2);
        for bound in &active {
            assert_eq!(bound.qualified_arn, report.function.qualified_arn());
            assert_eq!(bound.execution_role, report.stack_output.execution_role);
        }
    }

    #[tokio::test]
    async fn test_should_apply_function_settings_before_publish() {
        let p = pipeline();
        let report = p
            .orchestrator
            .run(test_deployment("1.2.0", "us-east-1"))
            .await
            .expect("deployment should succeed");

        let settings = p
            .functions
            .settings(&report.stack_output.function_arn)
            .expect("settings should be applied");
        assert_eq!(settings.memory_mb, 512);
        assert_eq!(settings.timeout_secs, 30);
    }

    #[tokio::test]
    async fn test_should_converge_on_idempotent_rerun() {
        let p = pipeline();
        let first = p
            .orchestrator
            .run(test_deployment("1.2.0", "us-east-1"))
            .await
            .expect("first run should succeed");
        let second = p
            .orchestrator
            .run(test_deployment("1.2.0", "us-east-1"))
            .await
            .expect("second run should succeed");

        // Same artifact version converges on identical stack outputs.
        assert_eq!(first.stack_output, second.stack_output);
        assert_eq!(p.stacks.create_calls(), 1);
        assert_eq!(p.stacks.update_calls(), 1);

        // Every run still pins a fresh immutable function version.
        assert_eq!(first.function.version, "1");
        assert_eq!(second.function.version, "2");

        let active = p.routing.active_routes("prod");
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|b| b.qualified_arn.ends_with(":2")));
    }

    #[tokio::test]
    async fn test_should_publish_monotonic_versions_across_artifact_versions() {
        let p = pipeline();
        for (artifact_version, expected) in [("1.0.0", "1"), ("1.1.0", "2"), ("2.0.0", "3")] {
            let report = p
                .orchestrator
                .run(test_deployment(artifact_version, "us-east-1"))
                .await
                .expect("deployment should succeed");
            assert_eq!(report.function.version, expected);
        }
    }

    #[tokio::test]
    async fn test_should_poll_stack_until_settled() {
        let p = pipeline_with_settle_polls(3);
        let report = p
            .orchestrator
            .run(test_deployment("1.2.0", "us-east-1"))
            .await
            .expect("deployment should succeed");

        assert_eq!(report.function.version, "1");
        // Initial describe plus at least the settle polls.
        assert!(p.stacks.describe_calls() >= 4);
    }

    #[tokio::test]
    async fn test_should_deploy_stages_independently() {
        let p = pipeline();
        let prod = test_deployment("1.2.0", "us-east-1");
        p.orchestrator
            .run(prod)
            .await
            .expect("prod deployment should succeed");

        assert!(p.routing.active_routes("dev").is_empty());
        assert_eq!(p.routing.active_routes("prod").len(), 2);
    }
}
