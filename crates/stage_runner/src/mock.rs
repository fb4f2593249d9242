//! Mock stage invoker
//!
//! Records every invocation and supports injecting stage failures. Lets the
//! orchestrator run end to end without launching external jobs.

use std::sync::{Mutex, MutexGuard, PoisonError};

use contracts::{ContractError, StageInvocation, StageInvoker, StageName};
use tracing::{info, instrument};

/// Mock invoker configuration
#[derive(Debug, Default, Clone)]
pub struct MockInvokerConfig {
    /// Stages whose invocation should fail
    pub fail_stages: Vec<StageName>,
}

/// Mock stage invoker
#[derive(Debug, Default)]
pub struct MockInvoker {
    config: MockInvokerConfig,
    invocations: Mutex<Vec<StageInvocation>>,
}

impl MockInvoker {
    /// Create a mock invoker where every stage succeeds
    pub fn new() -> Self {
        Self::with_config(MockInvokerConfig::default())
    }

    /// Create a mock invoker with injected failures
    pub fn with_config(config: MockInvokerConfig) -> Self {
        Self {
            config,
            invocations: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock invoker failing the given stage
    pub fn failing(stage: StageName) -> Self {
        Self::with_config(MockInvokerConfig {
            fail_stages: vec![stage],
        })
    }

    /// Every invocation received so far, in call order
    pub fn invocations(&self) -> Vec<StageInvocation> {
        self.lock().clone()
    }

    /// Stages invoked so far, in call order
    pub fn invoked_stages(&self) -> Vec<StageName> {
        self.lock().iter().map(|i| i.stage).collect()
    }

    /// Recorded invocation for a stage, if it ran
    pub fn invocation_for(&self, stage: StageName) -> Option<StageInvocation> {
        self.lock().iter().find(|i| i.stage == stage).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StageInvocation>> {
        self.invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl StageInvoker for MockInvoker {
    fn name(&self) -> &str {
        "mock"
    }

    #[instrument(
        name = "mock_invoke",
        skip(self, invocation),
        fields(stage = %invocation.stage)
    )]
    async fn invoke(&self, invocation: &StageInvocation) -> Result<(), ContractError> {
        self.lock().push(invocation.clone());

        if self.config.fail_stages.contains(&invocation.stage) {
            return Err(ContractError::stage_execution(
                invocation.stage.as_str(),
                "injected failure",
            ));
        }

        info!(
            stage = %invocation.stage,
            params = invocation.parameters.len(),
            "Mock stage completed"
        );
        Ok(())
    }
}
