//! In-memory routing service.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use rustship_core::Route;

use crate::error::{ProviderError, ProviderResult};
use crate::traits::RoutingService;

/// A route bound to a version-qualified function ARN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundRoute {
    /// The bound route.
    pub route: Route,
    /// Version-qualified function ARN the route invokes.
    pub qualified_arn: String,
    /// Execution role granted invocation permission.
    pub execution_role: String,
}

/// Staged and active route sets for one stage.
#[derive(Debug, Clone, Default)]
struct StageRoutes {
    staged: Vec<BoundRoute>,
    active: Vec<BoundRoute>,
}

/// In-memory [`RoutingService`].
///
/// Bindings accumulate in a staged set per stage; activation atomically
/// replaces the active set with the staged one. A failed binding leaves
/// the active set untouched, which is exactly the no-partial-cutover
/// guarantee the pipeline relies on.
#[derive(Debug, Default)]
pub struct InMemoryRoutingService {
    stages: DashMap<String, StageRoutes>,
    failing_routes: Mutex<HashSet<Route>>,
    bind_calls: AtomicUsize,
    activate_calls: AtomicUsize,
}

impl InMemoryRoutingService {
    /// Create an empty routing service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every binding of `route` fail until cleared.
    pub fn fail_route(&self, route: Route) {
        self.failing_routes.lock().insert(route);
    }

    /// The currently active route set for a stage.
    #[must_use]
    pub fn active_routes(&self, stage: &str) -> Vec<BoundRoute> {
        self.stages
            .get(stage)
            .map(|s| s.active.clone())
            .unwrap_or_default()
    }

    /// The staged (not yet activated) route set for a stage.
    #[must_use]
    pub fn staged_routes(&self, stage: &str) -> Vec<BoundRoute> {
        self.stages
            .get(stage)
            .map(|s| s.staged.clone())
            .unwrap_or_default()
    }

    /// Number of bind calls observed.
    #[must_use]
    pub fn bind_calls(&self) -> usize {
        self.bind_calls.load(Ordering::Relaxed)
    }

    /// Number of activate calls observed.
    #[must_use]
    pub fn activate_calls(&self) -> usize {
        self.activate_calls.load(Ordering::Relaxed)
    }

    /// Total calls across all operations.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.bind_calls() + self.activate_calls()
    }
}

#[async_trait]
impl RoutingService for InMemoryRoutingService {
    async fn bind_route(
        &self,
        stage: &str,
        route: &Route,
        qualified_arn: &str,
        execution_role: &str,
    ) -> ProviderResult<()> {
        self.bind_calls.fetch_add(1, Ordering::Relaxed);

        if self.failing_routes.lock().contains(route) {
            return Err(ProviderError::api(format!(
                "route binding rejected: {route}"
            )));
        }

        let bound = BoundRoute {
            route: route.clone(),
            qualified_arn: qualified_arn.to_owned(),
            execution_role: execution_role.to_owned(),
        };

        let mut entry = self.stages.entry(stage.to_owned()).or_default();
        // Re-binding the same method + path replaces the staged entry.
        if let Some(existing) = entry.staged.iter_mut().find(|b| b.route == *route) {
            *existing = bound;
        } else {
            entry.staged.push(bound);
        }
        Ok(())
    }

    async fn activate_stage(&self, stage: &str) -> ProviderResult<()> {
        self.activate_calls.fetch_add(1, Ordering::Relaxed);

        let mut entry = self.stages.entry(stage.to_owned()).or_default();
        entry.active = entry.staged.clone();
        debug!(stage = %stage, routes = entry.active.len(), "stage activated");
        Ok(())
    }
}
