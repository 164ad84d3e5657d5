//! Mutation effects
//!
//! Every write a workflow performs is an explicit [`Effect`] applied by an
//! [`EffectExecutor`]: a named-field update, a row creation, or a row
//! deletion, always scoped to a single primary key. There is no implicit
//! cascading — compound operations (e.g. ban user: delete comment, then
//! schedule the account) are separate effects issued by the workflow in a
//! fixed order, destructive child-record effect first.
//!
//! There is no rollback across effects. A failure after the first applied
//! effect leaves prior effects in place; acceptable weak consistency for an
//! operator tool, and a documented limitation rather than an assumption.

use crate::error::WorkflowError;
use async_trait::async_trait;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Entity kinds addressable by effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Account rows
    User,
    /// Video rows
    Video,
    /// Comment rows
    Comment,
    /// Feature flag rows (keyed by slug)
    FeatureFlag,
    /// Support ticket rows
    SupportTicket,
    /// Operator note rows
    UserNote,
}

impl EntityKind {
    /// Stable lowercase label for logs and errors
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Video => "video",
            Self::Comment => "comment",
            Self::FeatureFlag => "feature_flag",
            Self::SupportTicket => "support_ticket",
            Self::UserNote => "user_note",
        }
    }
}

/// One field value inside a patch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Boolean field
    Bool(bool),
    /// Integer field
    Int(i64),
    /// Float field
    Float(f64),
    /// Text field
    Text(String),
    /// Text list field (e.g. enabled environments)
    TextList(Vec<String>),
    /// Date field
    Date(NaiveDate),
    /// Explicit null
    Null,
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Ordered named-field patch
///
/// Order is preserved so receipts and logs list fields the way the workflow
/// supplied them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldPatch(IndexMap<String, FieldValue>);

impl FieldPatch {
    /// Empty patch
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field set
    #[inline]
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Set a field
    #[inline]
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(field.into(), value.into());
    }

    /// Field lookup
    #[inline]
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    /// Field names in insertion order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the patch is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One create/update/delete operation against the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Partial update of named fields on one row
    Update {
        /// Target entity kind
        entity: EntityKind,
        /// Primary key
        id: String,
        /// Fields to write
        fields: FieldPatch,
    },
    /// Creation of one row
    Create {
        /// Target entity kind
        entity: EntityKind,
        /// Initial field values
        fields: FieldPatch,
    },
    /// Deletion of one row
    Delete {
        /// Target entity kind
        entity: EntityKind,
        /// Primary key
        id: String,
    },
}

impl Effect {
    /// Partial update
    #[inline]
    #[must_use]
    pub fn update(entity: EntityKind, id: impl Into<String>, fields: FieldPatch) -> Self {
        Self::Update {
            entity,
            id: id.into(),
            fields,
        }
    }

    /// Row creation
    #[inline]
    #[must_use]
    pub fn create(entity: EntityKind, fields: FieldPatch) -> Self {
        Self::Create { entity, fields }
    }

    /// Row deletion
    #[inline]
    #[must_use]
    pub fn delete(entity: EntityKind, id: impl Into<String>) -> Self {
        Self::Delete {
            entity,
            id: id.into(),
        }
    }

    /// Target entity kind
    #[inline]
    #[must_use]
    pub fn entity(&self) -> EntityKind {
        match self {
            Self::Update { entity, .. } | Self::Create { entity, .. } | Self::Delete { entity, .. } => {
                *entity
            }
        }
    }

    /// Whether this effect destroys data
    #[inline]
    #[must_use]
    pub fn is_destructive(&self) -> bool {
        matches!(self, Self::Delete { .. })
    }
}

/// What an executor did for one effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Row updated
    Updated,
    /// Row created
    Created,
    /// Row deleted
    Deleted,
}

/// Receipt for one applied effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectReceipt {
    /// Entity kind acted on
    pub entity: EntityKind,
    /// Primary key of the affected row
    pub id: String,
    /// What happened
    pub kind: EffectKind,
}

/// Applies effects against the persistence collaborator
///
/// Individual effects rely on the persistence layer's per-row atomicity;
/// the executor provides no cross-effect transaction and no rollback.
/// Updates and deletes are primary-key scoped — there is no bulk surface.
#[async_trait]
pub trait EffectExecutor: Send + Sync {
    /// Apply one effect
    ///
    /// # Errors
    /// - [`WorkflowError::NotFound`] when the target row no longer exists
    /// - [`WorkflowError::Storage`] for unknown fields or value mismatches
    async fn apply(&self, effect: Effect) -> Result<EffectReceipt, WorkflowError>;
}
