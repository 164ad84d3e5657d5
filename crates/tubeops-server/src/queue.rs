//! Operator hand-off queue
//!
//! The public site never runs workflows itself; flagging a comment enqueues
//! a `moderate_comment` invocation with the comment id pre-filled, and an
//! operator console drains the queue and drives the steps.

use parking_lot::Mutex;
use std::collections::VecDeque;
use tubeops_core::ParamBag;

/// One queued workflow invocation
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedInvocation {
    /// Target workflow slug
    pub slug: String,
    /// Pre-filled parameters
    pub params: ParamBag,
}

/// FIFO queue of pending invocations
#[derive(Debug, Default)]
pub struct InvocationQueue {
    pending: Mutex<VecDeque<QueuedInvocation>>,
}

impl InvocationQueue {
    /// Empty queue
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue an invocation for the next available operator
    pub fn enqueue(&self, slug: impl Into<String>, params: ParamBag) {
        let slug = slug.into();
        tracing::info!(%slug, "invocation enqueued");
        self.pending
            .lock()
            .push_back(QueuedInvocation { slug, params });
    }

    /// Take every pending invocation, oldest first
    #[must_use]
    pub fn drain(&self) -> Vec<QueuedInvocation> {
        self.pending.lock().drain(..).collect()
    }

    /// Number of pending invocations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether the queue is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}
