//! Asset manager workflows
//!
//! Browse, delete, and upload objects in the company bucket without the
//! storage console. The whole category is registered only when storage is
//! configured. The listing reads the provider's first page only — a
//! documented limitation of the tool.

use async_trait::async_trait;
use std::sync::Arc;
use tubeops_core::{
    FieldSpec, ParamKind, ParamShape, PromptStep, Workflow, WorkflowContext, WorkflowError,
};
use tubeops_services::{format_size, AssetManager};

/// The `assets` page
pub struct AssetBrowser {
    manager: Arc<AssetManager>,
}

impl AssetBrowser {
    /// Page over a storage manager
    #[must_use]
    pub fn new(manager: Arc<AssetManager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl Workflow for AssetBrowser {
    fn slug(&self) -> &'static str {
        "assets"
    }

    fn name(&self) -> &'static str {
        "S3 object manager"
    }

    async fn run(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        let objects = self.manager.list().await?;

        let rows = objects
            .iter()
            .map(|o| {
                vec![
                    o.key.clone(),
                    format_size(o.size_bytes),
                    o.last_modified.to_rfc3339(),
                    if o.is_image() { "image" } else { "-" }.to_string(),
                    o.url.clone(),
                ]
            })
            .collect();

        ctx.io()
            .table(
                "All objects",
                vec![
                    "Key".into(),
                    "Size".into(),
                    "Last modified".into(),
                    "Preview".into(),
                    "URL".into(),
                ],
                rows,
            )
            .await?;

        ctx.reporter()
            .info(format!("{} object(s) listed", objects.len()))
    }
}

/// The `assets/delete` workflow (row action, key-scoped)
pub struct AssetDelete {
    manager: Arc<AssetManager>,
}

impl AssetDelete {
    /// Workflow over a storage manager
    #[must_use]
    pub fn new(manager: Arc<AssetManager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl Workflow for AssetDelete {
    fn slug(&self) -> &'static str {
        "assets/delete"
    }

    fn name(&self) -> &'static str {
        "Delete object"
    }

    fn unlisted(&self) -> bool {
        true
    }

    fn params(&self) -> ParamShape {
        ParamShape::of(vec![FieldSpec::required("object_key", ParamKind::String)])
    }

    async fn run(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        // required by the shape, so present after resolution
        let key = ctx
            .params()
            .get_str("object_key")
            .ok_or_else(|| WorkflowError::validation("object_key", "missing required field"))?
            .to_string();

        self.manager.delete(&key).await?;

        ctx.reporter()
            .info(format!("Deleted object with key: {key}"))
    }
}

/// The `assets/upload` workflow
pub struct AssetUpload {
    manager: Arc<AssetManager>,
}

impl AssetUpload {
    /// Workflow over a storage manager
    #[must_use]
    pub fn new(manager: Arc<AssetManager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl Workflow for AssetUpload {
    fn slug(&self) -> &'static str {
        "assets/upload"
    }

    fn name(&self) -> &'static str {
        "Upload files"
    }

    fn unlisted(&self) -> bool {
        true
    }

    async fn run(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        let files = ctx.io().prompt(PromptStep::files("Choose files")).await?;
        let files = files.as_files().unwrap_or_default().to_vec();

        let mut uploaded = Vec::with_capacity(files.len());
        for file in &files {
            let slot = self.manager.presign_upload(&file.name).await?;
            ctx.io()
                .display(tubeops_core::DisplayStep::code(
                    file.name.clone(),
                    format!("upload: {}\ndownload: {}", slot.upload_url, slot.download_url),
                ))
                .await?;
            uploaded.push(slot);
        }

        ctx.reporter()
            .info(format!("{} upload slot(s) issued", uploaded.len()))
    }
}
