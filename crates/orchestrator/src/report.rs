//! Run report
//!
//! Per-stage outcome of one pipeline run, returned on success and attached to
//! the error on failure.

use std::time::Duration;

use contracts::StageName;
use serde::Serialize;

/// Orchestrator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "stage", rename_all = "snake_case")]
pub enum PipelineState {
    Pending,
    Running(StageName),
    Completed,
    Failed(StageName),
}

/// What happened to one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StageOutcome {
    Completed {
        #[serde(with = "secs")]
        elapsed: Duration,
    },
    /// Left out by the step selection
    Skipped,
    Failed {
        #[serde(with = "secs")]
        elapsed: Duration,
        message: String,
    },
    /// Selected, but an earlier stage failed
    NotReached,
}

impl StageOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            StageOutcome::Completed { .. } => "completed",
            StageOutcome::Skipped => "skipped",
            StageOutcome::Failed { .. } => "failed",
            StageOutcome::NotReached => "not reached",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRecord {
    pub stage: StageName,
    #[serde(flatten)]
    pub outcome: StageOutcome,
}

/// Statistics from a pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub state: PipelineState,
    /// One record per stage, in pipeline order
    pub stages: Vec<StageRecord>,
    #[serde(with = "secs")]
    pub duration: Duration,
}

impl RunReport {
    pub(crate) fn new() -> Self {
        Self {
            state: PipelineState::Pending,
            stages: Vec::with_capacity(StageName::ALL.len()),
            duration: Duration::ZERO,
        }
    }

    pub(crate) fn record(&mut self, stage: StageName, outcome: StageOutcome) {
        self.stages.push(StageRecord { stage, outcome });
    }

    pub fn outcome(&self, stage: StageName) -> Option<&StageOutcome> {
        self.stages
            .iter()
            .find(|r| r.stage == stage)
            .map(|r| &r.outcome)
    }

    /// Stages that ran to completion
    pub fn completed(&self) -> impl Iterator<Item = StageName> + '_ {
        self.stages
            .iter()
            .filter(|r| matches!(r.outcome, StageOutcome::Completed { .. }))
            .map(|r| r.stage)
    }

    pub fn is_success(&self) -> bool {
        self.state == PipelineState::Completed
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\nPipeline summary");
        println!("   ├─ State: {}", self.state_label());
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   └─ Stages:");

        let last = self.stages.len().saturating_sub(1);
        for (i, record) in self.stages.iter().enumerate() {
            let branch = if i == last { "└─" } else { "├─" };
            match &record.outcome {
                StageOutcome::Completed { elapsed } => println!(
                    "      {branch} {:<14} completed ({:.2}s)",
                    record.stage,
                    elapsed.as_secs_f64()
                ),
                StageOutcome::Failed { elapsed, message } => println!(
                    "      {branch} {:<14} failed ({:.2}s): {message}",
                    record.stage,
                    elapsed.as_secs_f64()
                ),
                other => println!("      {branch} {:<14} {}", record.stage, other.label()),
            }
        }

        println!();
    }

    fn state_label(&self) -> String {
        match self.state {
            PipelineState::Pending => "pending".to_string(),
            PipelineState::Running(stage) => format!("running {stage}"),
            PipelineState::Completed => "completed".to_string(),
            PipelineState::Failed(stage) => format!("failed at {stage}"),
        }
    }
}

mod secs {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }
}
