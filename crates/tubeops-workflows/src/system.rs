//! System information page
//!
//! Process and host metrics for debugging performance issues. The console
//! runs in the same process as the app server, so these numbers describe
//! the deployment the operator is actually investigating.

use async_trait::async_trait;
use sysinfo::System;
use tubeops_core::{MetadataEntry, Workflow, WorkflowContext, WorkflowError};

fn to_mb(bytes: u64) -> String {
    #[allow(clippy::cast_precision_loss)]
    let mb = bytes as f64 / (1024.0 * 1024.0);
    format!("{mb:.2}mb")
}

/// The `system_info` page
#[derive(Default)]
pub struct SystemInfo;

impl SystemInfo {
    /// New page
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Workflow for SystemInfo {
    fn slug(&self) -> &'static str {
        "system_info"
    }

    fn name(&self) -> &'static str {
        "System information"
    }

    async fn run(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        let mut sys = System::new_all();
        sys.refresh_all();

        ctx.io()
            .display(tubeops_core::DisplayStep::heading("Process info"))
            .await?;

        let process_memory = sysinfo::get_current_pid()
            .ok()
            .and_then(|pid| sys.process(pid))
            .map(|p| to_mb(p.memory()))
            .unwrap_or_else(|| "-".to_string());

        ctx.io()
            .metadata(
                "Process",
                vec![
                    MetadataEntry::new(
                        "PID",
                        sysinfo::get_current_pid()
                            .map(|p| p.to_string())
                            .unwrap_or_else(|_| "-".to_string()),
                    ),
                    MetadataEntry::new("Memory", process_memory),
                    MetadataEntry::new("Arch", std::env::consts::ARCH),
                    MetadataEntry::new("OS", std::env::consts::OS),
                ],
            )
            .await?;

        ctx.io()
            .display(tubeops_core::DisplayStep::heading("Server info"))
            .await?;

        ctx.io()
            .metadata(
                "Host",
                vec![
                    MetadataEntry::new("Uptime (seconds)", System::uptime().to_string()),
                    MetadataEntry::new("Total memory", to_mb(sys.total_memory())),
                    MetadataEntry::new("Used memory", to_mb(sys.used_memory())),
                    MetadataEntry::new("CPU cores", sys.cpus().len().to_string()),
                ],
            )
            .await?;

        ctx.reporter().info("System information rendered")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tubeops_core::{DisplayStep, ParamBag};
    use tubeops_test_utils::{RecordingExecutor, ScriptedOperator};

    #[tokio::test]
    async fn renders_process_and_host_sections() {
        let workflow = SystemInfo::new();

        let operator = Arc::new(ScriptedOperator::new());
        let ctx = WorkflowContext::new(
            operator.clone(),
            ParamBag::new(),
            Arc::new(RecordingExecutor::new()),
        );

        workflow.run(&ctx).await.unwrap();

        let headings: Vec<String> = operator
            .displays()
            .iter()
            .filter_map(|d| match d {
                DisplayStep::Heading { title } => Some(title.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(headings, vec!["Process info", "Server info"]);
    }

    #[test]
    fn mb_formatting() {
        assert_eq!(to_mb(1_048_576), "1.00mb");
    }
}
