//! Admin workflow catalog
//!
//! The concrete workflows of the operations console, built on the
//! `tubeops-core` engine:
//! - comment moderation (allow / mark spam / ban with cascade)
//! - feature flag editing
//! - user management (overview, verification, onboarding, notes)
//! - customer support (dashboard, ticket creation and closing)
//! - AI-assisted database querying (completion-gated)
//! - object storage browsing (storage-gated)
//! - system information
//!
//! [`registrar::register_all`] wires the catalog against the startup
//! configuration; categories without their external service configured are
//! skipped at registration.

#![warn(unreachable_pub)]

// Core modules
pub mod assets;
pub mod flags;
mod helpers;
pub mod moderation;
pub mod query;
pub mod registrar;
pub mod support;
pub mod system;
pub mod users;

// Re-exports for convenience
pub use assets::{AssetBrowser, AssetDelete, AssetUpload};
pub use flags::FeatureFlagManager;
pub use moderation::ModerateComment;
pub use query::DatabaseQuery;
pub use registrar::{register_all, WorkflowDeps};
pub use support::{CloseTicket, CreateTicket, SupportDashboard};
pub use system::SystemInfo;
pub use users::{AddUserNote, OnboardProUser, OnboardUser, UsersOverview, VerifyUser};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
