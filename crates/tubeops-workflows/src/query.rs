//! AI-assisted database query
//!
//! Builds a schema-aware prompt, asks the completion service to draft a
//! `SELECT` statement for the operator's question, and executes it only
//! after an explicit choice. Registered only when a completion service is
//! configured; without one the whole category is absent, not broken.

use async_trait::async_trait;
use std::sync::Arc;
use tubeops_core::{
    ChoiceOption, ChoiceStep, PromptStep, Workflow, WorkflowContext, WorkflowError,
};
use tubeops_services::CompletionClient;
use tubeops_store::SqlBackend;

/// The `database_query` workflow
pub struct DatabaseQuery {
    backend: Arc<dyn SqlBackend>,
    completion: Arc<dyn CompletionClient>,
}

impl DatabaseQuery {
    /// Workflow over a SQL backend and a completion client
    #[must_use]
    pub fn new(backend: Arc<dyn SqlBackend>, completion: Arc<dyn CompletionClient>) -> Self {
        Self {
            backend,
            completion,
        }
    }

    fn prompt_for(&self, question: &str) -> String {
        let mut lines = vec![
            "Given the following SQL tables, with their properties:".to_string(),
            "#".to_string(),
        ];
        for table in self.backend.schema() {
            lines.push(format!("# {}({})", table.name, table.columns.join(", ")));
        }
        lines.push("#".to_string());
        lines.push(format!("Can you write a query to {question}"));
        lines.push("SELECT".to_string());
        lines.join("\n")
    }
}

#[async_trait]
impl Workflow for DatabaseQuery {
    fn slug(&self) -> &'static str {
        "database_query"
    }

    fn name(&self) -> &'static str {
        "AI database query"
    }

    async fn run(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        let question = ctx
            .io()
            .prompt(PromptStep::multiline("What do you want to know?").with_help(
                "e.g. list users who purchased more than three videos in the last month",
            ))
            .await?;
        let question = question.as_text().unwrap_or_default().to_string();

        let completion = self.completion.complete(&self.prompt_for(&question)).await?;
        let sql = format!("SELECT {}", completion.trim());

        ctx.io()
            .markdown(format!("**Query to execute:**\n`{sql}`"))
            .await?;

        let choice = ctx
            .io()
            .choose(ChoiceStep::single(
                "Run this query?",
                vec![
                    ChoiceOption::new("Execute query", "execute"),
                    ChoiceOption::new("Cancel", "cancel"),
                ],
            ))
            .await?;

        if choice != "execute" {
            return ctx.reporter().info("Cancelled");
        }

        let result = self.backend.execute(&sql).await?;
        let row_count = result.rows.len();

        ctx.io()
            .table(format!("{row_count} rows"), result.columns, result.rows)
            .await?;

        ctx.reporter()
            .info(format!("Query returned {row_count} row(s)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubeops_core::{DisplayStep, ParamBag};
    use tubeops_store::QueryRows;
    use tubeops_test_utils::{RecordingExecutor, ScriptedOperator, StubCompletion, StubSql};

    fn rows() -> QueryRows {
        QueryRows {
            columns: vec!["id".into(), "title".into()],
            rows: vec![
                vec!["1".into(), "Building my Dream PC".into()],
                vec!["2".into(), "Laptop Chip Showdown".into()],
            ],
        }
    }

    #[tokio::test]
    async fn executes_the_generated_select() {
        let workflow = DatabaseQuery::new(
            Arc::new(StubSql::returning(rows())),
            Arc::new(StubCompletion::new("id, title FROM videos")),
        );

        let operator = Arc::new(
            ScriptedOperator::new()
                .then_text("list all videos")
                .then_choice(&["execute"]),
        );
        let ctx = WorkflowContext::new(
            operator.clone(),
            ParamBag::new(),
            Arc::new(RecordingExecutor::new()),
        );

        workflow.run(&ctx).await.unwrap();

        let displays = operator.displays();
        assert!(displays.iter().any(|d| matches!(
            d,
            DisplayStep::Markdown { body } if body.contains("SELECT id, title FROM videos")
        )));
        assert!(displays
            .iter()
            .any(|d| matches!(d, DisplayStep::Table { rows, .. } if rows.len() == 2)));
    }

    #[tokio::test]
    async fn cancel_skips_execution() {
        let workflow = DatabaseQuery::new(
            Arc::new(StubSql::failing("must not be called")),
            Arc::new(StubCompletion::new("id FROM videos")),
        );

        let ctx = WorkflowContext::new(
            Arc::new(
                ScriptedOperator::new()
                    .then_text("anything")
                    .then_choice(&["cancel"]),
            ),
            ParamBag::new(),
            Arc::new(RecordingExecutor::new()),
        );

        // the failing backend proves execute() was never reached
        workflow.run(&ctx).await.unwrap();
    }

    #[tokio::test]
    async fn backend_failure_surfaces_verbatim() {
        let workflow = DatabaseQuery::new(
            Arc::new(StubSql::failing("relation does not exist")),
            Arc::new(StubCompletion::new("id FROM missing")),
        );

        let ctx = WorkflowContext::new(
            Arc::new(
                ScriptedOperator::new()
                    .then_text("anything")
                    .then_choice(&["execute"]),
            ),
            ParamBag::new(),
            Arc::new(RecordingExecutor::new()),
        );

        let err = workflow.run(&ctx).await.unwrap_err();
        assert!(err.to_string().contains("relation does not exist"));
    }

    #[test]
    fn prompt_embeds_the_schema() {
        let workflow = DatabaseQuery::new(
            Arc::new(StubSql::returning(rows())),
            Arc::new(StubCompletion::new("")),
        );
        let prompt = workflow.prompt_for("count videos");
        assert!(prompt.contains("# videos(id, title, price)"));
        assert!(prompt.contains("Can you write a query to count videos"));
        assert!(prompt.ends_with("SELECT"));
    }
}
