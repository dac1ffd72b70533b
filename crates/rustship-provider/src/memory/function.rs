//! In-memory function service.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::traits::{FunctionService, FunctionSettings};

/// One function known to the service.
#[derive(Debug, Clone, Default)]
struct FunctionRecord {
    settings: Option<FunctionSettings>,
    published: u64,
    last_description: Option<String>,
}

/// In-memory [`FunctionService`].
///
/// Functions must be registered before they can be configured or
/// published against, mirroring the real service where the function is
/// provisioned by the stack first. Every publish mints the next version
/// number for that function, starting at `"1"`.
#[derive(Debug, Default)]
pub struct InMemoryFunctionService {
    functions: DashMap<String, FunctionRecord>,
    fail_publish: Mutex<Option<String>>,
    configure_calls: AtomicUsize,
    publish_calls: AtomicUsize,
}

impl InMemoryFunctionService {
    /// Create an empty function service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function by ARN. Idempotent.
    pub fn register_function(&self, function_arn: &str) {
        self.functions
            .entry(function_arn.to_owned())
            .or_default();
    }

    /// Whether a function with this ARN exists.
    #[must_use]
    pub fn is_registered(&self, function_arn: &str) -> bool {
        self.functions.contains_key(function_arn)
    }

    /// The settings last applied to a function, if any.
    #[must_use]
    pub fn settings(&self, function_arn: &str) -> Option<FunctionSettings> {
        self.functions
            .get(function_arn)
            .and_then(|r| r.settings)
    }

    /// Make the next publish fail with the given reason.
    pub fn fail_next_publish(&self, reason: impl Into<String>) {
        *self.fail_publish.lock() = Some(reason.into());
    }

    /// Number of configure calls observed.
    #[must_use]
    pub fn configure_calls(&self) -> usize {
        self.configure_calls.load(Ordering::Relaxed)
    }

    /// Number of publish calls observed.
    #[must_use]
    pub fn publish_calls(&self) -> usize {
        self.publish_calls.load(Ordering::Relaxed)
    }

    /// Total calls across all operations.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.configure_calls() + self.publish_calls()
    }
}

#[async_trait]
impl FunctionService for InMemoryFunctionService {
    async fn configure_function(
        &self,
        function_arn: &str,
        settings: &FunctionSettings,
    ) -> ProviderResult<()> {
        self.configure_calls.fetch_add(1, Ordering::Relaxed);

        let mut record = self.functions.get_mut(function_arn).ok_or_else(|| {
            ProviderError::NotFound(format!("function not found: {function_arn}"))
        })?;
        record.settings = Some(*settings);
        Ok(())
    }

    async fn publish_version(
        &self,
        function_arn: &str,
        description: &str,
    ) -> ProviderResult<String> {
        self.publish_calls.fetch_add(1, Ordering::Relaxed);

        if let Some(reason) = self.fail_publish.lock().take() {
            return Err(ProviderError::api(reason));
        }

        let mut record = self.functions.get_mut(function_arn).ok_or_else(|| {
            ProviderError::NotFound(format!("function not found: {function_arn}"))
        })?;
        record.published += 1;
        record.last_description = Some(description.to_owned());
        debug!(function = %function_arn, version = record.published, "version published");
        Ok(record.published.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARN: &str = "arn:aws:lambda:us-east-1:000000000000:function:svc";

    fn settings() -> FunctionSettings {
        FunctionSettings {
            memory_mb: 512,
            timeout_secs: 30,
        }
    }

    #[tokio::test]
    async fn test_should_publish_monotonic_versions() {
        let svc = InMemoryFunctionService::new();
        svc.register_function(ARN);

        let v1 = svc.publish_version(ARN, "deploy 1.2.0").await.unwrap();
        let v2 = svc.publish_version(ARN, "deploy 1.2.0").await.unwrap();
        assert_eq!(v1, "1");
        assert_eq!(v2, "2");
    }

    #[tokio::test]
    async fn test_should_fail_publish_for_unknown_function() {
        let svc = InMemoryFunctionService::new();
        let err = svc.publish_version(ARN, "deploy").await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_should_fail_configure_for_unknown_function() {
        let svc = InMemoryFunctionService::new();
        let err = svc.configure_function(ARN, &settings()).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_should_apply_settings() {
        let svc = InMemoryFunctionService::new();
        svc.register_function(ARN);
        svc.configure_function(ARN, &settings()).await.unwrap();

        let applied = svc.settings(ARN).unwrap();
        assert_eq!(applied.memory_mb, 512);
        assert_eq!(applied.timeout_secs, 30);
    }

    #[tokio::test]
    async fn test_should_inject_publish_failure_once() {
        let svc = InMemoryFunctionService::new();
        svc.register_function(ARN);
        svc.fail_next_publish("throttled");

        assert!(svc.publish_version(ARN, "deploy").await.is_err());
        assert_eq!(svc.publish_version(ARN, "deploy").await.unwrap(), "1");
    }

    #[tokio::test]
    async fn test_should_count_calls() {
        let svc = InMemoryFunctionService::new();
        svc.register_function(ARN);
        svc.configure_function(ARN, &settings()).await.unwrap();
        svc.publish_version(ARN, "deploy").await.unwrap();

        assert_eq!(svc.configure_calls(), 1);
        assert_eq!(svc.publish_calls(), 1);
        assert_eq!(svc.total_calls(), 2);
    }
}
