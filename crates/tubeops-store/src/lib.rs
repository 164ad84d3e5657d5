//! Domain entities and the reference persistence collaborator
//!
//! The workflow engine reaches persistence through three seams: typed
//! readers, [`SearchSource`](tubeops_core::SearchSource) callbacks, and the
//! [`EffectExecutor`](tubeops_core::EffectExecutor). This crate provides
//! the ViewTube entities and an in-memory implementation of all three,
//! plus the deletion-scheduling and SQL-introspection collaborator
//! contracts and a deterministic demo dataset.

#![warn(unreachable_pub)]

// Core modules
pub mod entities;
pub mod retention;
pub mod seed;
pub mod sql;
pub mod store;

// Re-exports for convenience
pub use entities::{
    fields, Channel, ChannelId, Comment, CommentId, ContactMethod, Environment, FeatureFlag,
    NoteId, PurchaseId, SupportTicket, TicketId, TicketSeverity, TicketStatus, User, UserId,
    UserNote, Video, VideoId, VideoPurchase,
};
pub use retention::{DeletionScheduler, LedgerScheduler};
pub use seed::{seed_demo, SeedSummary};
pub use sql::{QueryRows, SqlBackend, TableSchema};
pub use store::{MemoryStore, TicketSearch, UserSearch, VideoSearch};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
