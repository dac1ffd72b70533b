//! In-memory stack service.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use rustship_core::contract;

use crate::error::{ProviderError, ProviderResult};
use crate::memory::InMemoryFunctionService;
use crate::traits::{StackDescription, StackParameter, StackService, StackStatus, UpdateOutcome};

/// Account ID used for all synthesized ARNs.
const ACCOUNT_ID: &str = "000000000000";

/// One stack known to the service.
#[derive(Debug, Clone)]
struct StackRecord {
    template_body: String,
    parameters: Vec<StackParameter>,
    status: StackStatus,
    status_reason: Option<String>,
    /// Terminal status the in-flight operation will settle into.
    target_status: StackStatus,
    /// Describe polls remaining before the operation settles.
    remaining_polls: u32,
    outputs: HashMap<String, String>,
}

/// In-memory [`StackService`] emulating create/update/describe semantics.
///
/// Stack operations are asynchronous on the provider side: a create or
/// update submits instantly and the stack settles into its terminal
/// status only after `settle_polls` describe calls, so callers exercise
/// the same poll loop they would against the real service.
#[derive(Debug)]
pub struct InMemoryStackService {
    region: String,
    stacks: DashMap<String, StackRecord>,
    /// When set, completed stacks register their function here so the
    /// local mode presents a consistent view across services.
    function_service: Option<Arc<InMemoryFunctionService>>,
    settle_polls: u32,
    fail_next: Mutex<Option<String>>,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
    describe_calls: AtomicUsize,
}

impl InMemoryStackService {
    /// Create a stack service scoped to `region`.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            stacks: DashMap::new(),
            function_service: None,
            settle_polls: 0,
            fail_next: Mutex::new(None),
            create_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            describe_calls: AtomicUsize::new(0),
        }
    }

    /// Register a function service to receive functions provisioned by
    /// completed stacks.
    #[must_use]
    pub fn with_function_service(mut self, functions: Arc<InMemoryFunctionService>) -> Self {
        self.function_service = Some(functions);
        self
    }

    /// Require `n` describe polls before an operation settles.
    #[must_use]
    pub fn with_settle_polls(mut self, n: u32) -> Self {
        self.settle_polls = n;
        self
    }

    /// Make the next create or update settle into a terminal failure
    /// with the given status reason.
    pub fn fail_next_operation(&self, reason: impl Into<String>) {
        *self.fail_next.lock() = Some(reason.into());
    }

    /// Number of create calls observed.
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::Relaxed)
    }

    /// Number of update calls observed.
    #[must_use]
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::Relaxed)
    }

    /// Number of describe calls observed.
    #[must_use]
    pub fn describe_calls(&self) -> usize {
        self.describe_calls.load(Ordering::Relaxed)
    }

    /// Total calls across all operations.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.create_calls() + self.update_calls() + self.describe_calls()
    }

    /// Synthesize the outputs of a successfully settled stack.
    fn synthesize_outputs(
        &self,
        stack_name: &str,
        parameters: &[StackParameter],
    ) -> HashMap<String, String> {
        let function_name = parameters
            .iter()
            .find(|p| p.key == contract::PARAM_ARTIFACT_ID)
            .map_or(stack_name, |p| p.value.as_str());

        let mut outputs = HashMap::new();
        outputs.insert(
            contract::OUTPUT_EXECUTION_ROLE.to_owned(),
            format!("arn:aws:iam::{ACCOUNT_ID}:role/{stack_name}-execution-role"),
        );
        outputs.insert(
            contract::OUTPUT_FUNCTION_ARN.to_owned(),
            format!(
                "arn:aws:lambda:{}:{ACCOUNT_ID}:function:{function_name}",
                self.region
            ),
        );
        outputs
    }

    /// Settle an in-flight operation into its terminal status.
    fn settle(&self, name: &str, record: &mut StackRecord) {
        record.status = record.target_status;
        debug!(stack = %name, status = ?record.status, "stack operation settled");
        if record.status.is_success() {
            record.outputs = self.synthesize_outputs(name, &record.parameters);
            if let Some(functions) = &self.function_service
                && let Some(arn) = record.outputs.get(contract::OUTPUT_FUNCTION_ARN)
            {
                functions.register_function(arn);
            }
        }
    }

    fn pending_failure(&self) -> Option<String> {
        self.fail_next.lock().take()
    }
}

#[async_trait]
impl StackService for InMemoryStackService {
    async fn describe_stack(&self, name: &str) -> ProviderResult<Option<StackDescription>> {
        self.describe_calls.fetch_add(1, Ordering::Relaxed);

        let Some(mut record) = self.stacks.get_mut(name) else {
            return Ok(None);
        };

        if !record.status.is_terminal() {
            if record.remaining_polls > 0 {
                record.remaining_polls -= 1;
            } else {
                self.settle(name, &mut record);
            }
        }

        Ok(Some(StackDescription {
            status: record.status,
            status_reason: record.status_reason.clone(),
            outputs: record.outputs.clone(),
        }))
    }

    async fn create_stack(
        &self,
        name: &str,
        template_body: &str,
        parameters: &[StackParameter],
    ) -> ProviderResult<()> {
        self.create_calls.fetch_add(1, Ordering::Relaxed);

        let (target_status, status_reason) = match self.pending_failure() {
            Some(reason) => (StackStatus::CreateFailed, Some(reason)),
            None => (StackStatus::CreateComplete, None),
        };

        let record = StackRecord {
            template_body: template_body.to_owned(),
            parameters: parameters.to_vec(),
            status: StackStatus::CreateInProgress,
            status_reason,
            target_status,
            remaining_polls: self.settle_polls,
            outputs: HashMap::new(),
        };

        match self.stacks.entry(name.to_owned()) {
            dashmap::mapref::entry::Entry::Occupied(e) => Err(ProviderError::api(format!(
                "stack already exists: {}",
                e.key()
            ))),
            dashmap::mapref::entry::Entry::Vacant(e) => {
                e.insert(record);
                Ok(())
            }
        }
    }

    async fn update_stack(
        &self,
        name: &str,
        template_body: &str,
        parameters: &[StackParameter],
    ) -> ProviderResult<UpdateOutcome> {
        self.update_calls.fetch_add(1, Ordering::Relaxed);

        let mut record = self
            .stacks
            .get_mut(name)
            .ok_or_else(|| ProviderError::NotFound(format!("stack does not exist: {name}")))?;

        if record.status.is_success()
            && record.template_body == template_body
            && record.parameters == parameters
        {
            return Ok(UpdateOutcome::NoChanges);
        }

        let (target_status, status_reason) = match self.pending_failure() {
            Some(reason) => (StackStatus::UpdateFailed, Some(reason)),
            None => (StackStatus::UpdateComplete, None),
        };

        record.template_body = template_body.to_owned();
        record.parameters = parameters.to_vec();
        record.status = StackStatus::UpdateInProgress;
        record.status_reason = status_reason;
        record.target_status = target_status;
        record.remaining_polls = self.settle_polls;

        Ok(UpdateOutcome::Updated)
    }
}
