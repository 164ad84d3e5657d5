//! Public web app for the ViewTube demo deployment
//!
//! A minimal visitor-facing site (video list, video detail) over the same
//! store the admin workflows mutate, plus the comment-flag endpoint that
//! enqueues moderation work for operators. The `tubeops` binary in this
//! crate wires configuration, seeding, workflow registration and the
//! server together.

#![warn(unreachable_pub)]

// Core modules
pub mod queue;
pub mod routes;

// Re-exports for convenience
pub use queue::{InvocationQueue, QueuedInvocation};
pub use routes::{router, AppState};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
