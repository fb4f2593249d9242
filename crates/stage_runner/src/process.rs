//! Process-backed stage invoker
//!
//! Runs each stage through the job runtime's command line
//! (`mlflow run <job_dir> -e <entry_point> -P key=value ...` by default) and
//! waits for the child to exit. Run-grouping metadata is exported to the
//! child's environment only; the orchestrator's own environment is untouched.

use std::ffi::OsString;
use std::process::Stdio;

use contracts::{ContractError, StageInvocation, StageInvoker};
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Default job runtime executable
pub const DEFAULT_PROGRAM: &str = "mlflow";

/// Environment variable carrying the tracking project
pub const DEFAULT_PROJECT_ENV: &str = "WANDB_PROJECT";

/// Environment variable carrying the run group
pub const DEFAULT_GROUP_ENV: &str = "WANDB_RUN_GROUP";

/// Process invoker configuration
#[derive(Debug, Clone)]
pub struct ProcessInvokerConfig {
    /// Job runtime executable
    pub program: String,
    /// Child environment variable receiving `RunGroup::project`
    pub project_env: String,
    /// Child environment variable receiving `RunGroup::group`
    pub group_env: String,
}

impl Default for ProcessInvokerConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            project_env: DEFAULT_PROJECT_ENV.to_string(),
            group_env: DEFAULT_GROUP_ENV.to_string(),
        }
    }
}

/// Invoker spawning one child process per stage
#[derive(Debug, Clone, Default)]
pub struct ProcessInvoker {
    config: ProcessInvokerConfig,
}

impl ProcessInvoker {
    pub fn new(config: ProcessInvokerConfig) -> Self {
        Self { config }
    }

    /// Command-line arguments passed to the job runtime
    pub fn args(&self, invocation: &StageInvocation) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "run".into(),
            invocation.job_dir().into_os_string(),
            "-e".into(),
            invocation.entry_point.clone().into(),
        ];
        for (key, value) in &invocation.parameters {
            args.push("-P".into());
            args.push(format!("{key}={value}").into());
        }
        args
    }

    /// Environment variables exported to the child
    pub fn envs(&self, invocation: &StageInvocation) -> Vec<(String, String)> {
        vec![
            (
                self.config.project_env.clone(),
                invocation.run_group.project.clone(),
            ),
            (
                self.config.group_env.clone(),
                invocation.run_group.group.clone(),
            ),
        ]
    }

    fn command(&self, invocation: &StageInvocation) -> Command {
        let mut command = Command::new(&self.config.program);
        command
            .args(self.args(invocation))
            .envs(self.envs(invocation))
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        command
    }
}

impl StageInvoker for ProcessInvoker {
    fn name(&self) -> &str {
        &self.config.program
    }

    #[instrument(
        name = "process_invoke",
        skip(self, invocation),
        fields(stage = %invocation.stage, job = %invocation.job_id)
    )]
    async fn invoke(&self, invocation: &StageInvocation) -> Result<(), ContractError> {
        let stage = invocation.stage.as_str();
        debug!(
            program = %self.config.program,
            args = ?self.args(invocation),
            "Spawning stage job"
        );

        let status = self
            .command(invocation)
            .status()
            .await
            .map_err(|e| ContractError::StageExecution {
                stage: stage.to_string(),
                message: format!("failed to launch '{}': {e}", self.config.program),
                source: Some(Box::new(e)),
            })?;

        if status.success() {
            info!(stage, "Stage job exited successfully");
            Ok(())
        } else {
            Err(ContractError::stage_execution(
                stage,
                format!("job terminated abnormally ({status})"),
            ))
        }
    }
}
