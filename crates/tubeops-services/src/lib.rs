//! External service collaborators
//!
//! The three outbound boundaries of the operations console, each behind a
//! small trait so workflows stay testable without the network:
//! - [`CompletionClient`] — OpenAI-compatible chat completion (SQL drafting)
//! - [`Notifier`] — fire-and-forget channel notifications
//! - [`AssetManager`] — list/delete/presign over one fixed bucket
//!
//! Every outbound call carries a bounded timeout from
//! [`AdminConfig`](tubeops_core::AdminConfig); failures surface verbatim
//! and are never retried automatically.

#![warn(unreachable_pub)]

// Core modules
pub mod assets;
pub mod completion;
pub mod notify;

// Re-exports for convenience
pub use assets::{
    format_size, AssetManager, AssetObject, PresignedUpload, UploadSigner, LIST_PAGE_CAP,
    UPLOAD_URL_TTL,
};
pub use completion::{CompletionClient, OpenAiClient};
pub use notify::{Notification, Notifier, NullNotifier, WebhookNotifier};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
