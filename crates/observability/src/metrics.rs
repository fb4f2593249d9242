//! Stage metrics
//!
//! Counters and histograms describing each pipeline run. Without an installed
//! recorder these calls are no-ops.

use std::time::Duration;

use contracts::StageName;
use metrics::{counter, gauge, histogram};

/// Outcome label attached to stage metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Success,
    Failure,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Success => "success",
            StageStatus::Failure => "failure",
        }
    }
}

/// Record one finished stage invocation
///
/// # Example
///
/// ```ignore
/// use observability::metrics::{record_stage_invocation, StageStatus};
///
/// let started = Instant::now();
/// let result = invoker.invoke(&invocation).await;
/// record_stage_invocation(invocation.stage, StageStatus::Success, started.elapsed());
/// ```
pub fn record_stage_invocation(stage: StageName, status: StageStatus, elapsed: Duration) {
    counter!(
        "stagehand_stage_invocations_total",
        "stage" => stage.as_str(),
        "status" => status.as_str()
    )
    .increment(1);

    histogram!("stagehand_stage_duration_seconds", "stage" => stage.as_str())
        .record(elapsed.as_secs_f64());
}

/// Record a stage left out by the step selection
pub fn record_stage_skipped(stage: StageName) {
    counter!("stagehand_stages_skipped_total", "stage" => stage.as_str()).increment(1);
}

/// Record the stage currently running (pipeline index, -1 when idle)
pub fn record_active_stage(index: Option<usize>) {
    gauge!("stagehand_active_stage_index").set(index.map_or(-1.0, |i| i as f64));
}

/// Record the end of a pipeline run
pub fn record_pipeline_finished(success: bool, elapsed: Duration) {
    let status = if success { "success" } else { "failure" };
    counter!("stagehand_pipeline_runs_total", "status" => status).increment(1);
    histogram!("stagehand_pipeline_duration_seconds").record(elapsed.as_secs_f64());
}
