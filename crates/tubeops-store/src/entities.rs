//! Domain entities
//!
//! Rows as the workflows see them. Identifiers are ULID newtypes (sortable,
//! so ascending id equals creation order — the documented tie-break for
//! search results). Closed enums replace the stringly typed columns of the
//! upstream schema so unhandled variants cannot exist.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub Ulid);

        impl $name {
            /// Generate a fresh identifier
            #[inline]
            #[must_use]
            pub fn new() -> Self {
                Self(Ulid::new())
            }

            /// Parse from its canonical string form
            #[inline]
            #[must_use]
            pub fn parse(raw: &str) -> Option<Self> {
                Ulid::from_string(raw).ok().map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// User identifier
    UserId
);
id_type!(
    /// Channel identifier
    ChannelId
);
id_type!(
    /// Video identifier
    VideoId
);
id_type!(
    /// Comment identifier
    CommentId
);
id_type!(
    /// Support ticket identifier
    TicketId
);
id_type!(
    /// User note identifier
    NoteId
);
id_type!(
    /// Purchase identifier
    PurchaseId
);

/// An account on the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Identifier
    pub id: UserId,
    /// Display name
    pub name: Option<String>,
    /// Unique email
    pub email: String,
    /// Avatar URL
    pub image_url: Option<String>,
    /// Passed the verification workflow
    pub is_verified: bool,
    /// May upload videos
    pub can_upload: bool,
    /// Signup timestamp
    pub signed_up_at: DateTime<Utc>,
    /// Upload length cap in seconds, for professional plans
    pub max_upload_duration: Option<u32>,
    /// Birthday collected at onboarding
    pub birthday: Option<NaiveDate>,
    /// Personal website
    pub website: Option<String>,
    /// Rich-text profile
    pub profile_text: Option<String>,
}

impl User {
    /// Minimal account as created by onboarding
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            name: None,
            email: email.into(),
            image_url: None,
            is_verified: false,
            can_upload: false,
            signed_up_at: Utc::now(),
            max_upload_duration: None,
            birthday: None,
            website: None,
            profile_text: None,
        }
    }

    /// Name when set, email otherwise
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// A creator channel owning videos
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Identifier
    pub id: ChannelId,
    /// Channel name
    pub name: String,
    /// Owning user
    pub owner: UserId,
}

/// A hosted video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    /// Identifier
    pub id: VideoId,
    /// Title
    pub title: String,
    /// Media URL
    pub url: String,
    /// Thumbnail URL
    pub thumbnail_url: String,
    /// Owning channel
    pub channel: ChannelId,
    /// Purchase price in dollars
    pub price: u32,
    /// Upload timestamp
    pub created_at: DateTime<Utc>,
}

/// A comment under a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Identifier
    pub id: CommentId,
    /// Parent video
    pub video: VideoId,
    /// Author
    pub author: UserId,
    /// Text content
    pub content: String,
    /// Flagged as spam by moderation
    pub is_spam: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Deployment environments a flag can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Environment {
    /// Production traffic
    Production,
    /// Staging traffic
    Staging,
}

impl Environment {
    /// Canonical uppercase form
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "PRODUCTION",
            Self::Staging => "STAGING",
        }
    }

    /// Parse the canonical uppercase form
    #[inline]
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PRODUCTION" => Some(Self::Production),
            "STAGING" => Some(Self::Staging),
            _ => None,
        }
    }
}

/// An experimental feature toggle
///
/// Invariant: `rollout_percentage` and `enabled_environments` are only
/// edited while the flag is enabled; the editor workflow collects them on
/// the enable branch only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlag {
    /// Unique key
    pub slug: String,
    /// Human description
    pub description: String,
    /// Whether the flag is live
    pub is_enabled: bool,
    /// Rollout percentage, 0–100
    pub rollout_percentage: u8,
    /// Environments the flag is enabled in
    pub enabled_environments: Vec<Environment>,
}

/// Ticket severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketSeverity {
    /// Low impact
    Low,
    /// Medium impact
    Medium,
    /// High impact
    High,
}

impl TicketSeverity {
    /// Canonical uppercase form
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    /// Parse the canonical uppercase form
    #[inline]
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            _ => None,
        }
    }
}

/// How the customer wants to be reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactMethod {
    /// Email
    Email,
    /// Chat
    Chat,
    /// Phone
    Phone,
}

impl ContactMethod {
    /// Canonical uppercase form
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "EMAIL",
            Self::Chat => "CHAT",
            Self::Phone => "PHONE",
        }
    }

    /// Parse the canonical uppercase form
    #[inline]
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "EMAIL" => Some(Self::Email),
            "CHAT" => Some(Self::Chat),
            "PHONE" => Some(Self::Phone),
            _ => None,
        }
    }
}

/// Ticket lifecycle state; transitions OPEN → CLOSED only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    /// Awaiting resolution
    Open,
    /// Resolved, terminal
    Closed,
}

impl TicketStatus {
    /// Canonical uppercase form
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }

    /// Parse the canonical uppercase form
    #[inline]
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "OPEN" => Some(Self::Open),
            "CLOSED" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// A customer support ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportTicket {
    /// Identifier
    pub id: TicketId,
    /// Short title
    pub title: String,
    /// Rich-text description
    pub description: String,
    /// Severity
    pub severity: TicketSeverity,
    /// Contact method
    pub contact_method: ContactMethod,
    /// Lifecycle state
    pub status: TicketStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// An operator note attached to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserNote {
    /// Identifier
    pub id: NoteId,
    /// Annotated user
    pub user: UserId,
    /// Rich-text content
    pub content: String,
    /// Email of the operator who wrote the note
    pub author_email: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A paid video purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoPurchase {
    /// Identifier
    pub id: PurchaseId,
    /// Buyer
    pub owner: UserId,
    /// Purchased video
    pub video: VideoId,
    /// Amount paid in dollars
    pub amount: u32,
    /// Purchase timestamp
    pub created_at: DateTime<Utc>,
}

/// Field names accepted by the effect executor, per entity
pub mod fields {
    /// `Comment.is_spam`
    pub const IS_SPAM: &str = "is_spam";
    /// `User.is_verified`
    pub const IS_VERIFIED: &str = "is_verified";
    /// `User.can_upload`
    pub const CAN_UPLOAD: &str = "can_upload";
    /// `User.name`
    pub const NAME: &str = "name";
    /// `User.email`
    pub const EMAIL: &str = "email";
    /// `User.max_upload_duration`
    pub const MAX_UPLOAD_DURATION: &str = "max_upload_duration";
    /// `User.birthday`
    pub const BIRTHDAY: &str = "birthday";
    /// `User.website`
    pub const WEBSITE: &str = "website";
    /// `User.profile_text`
    pub const PROFILE_TEXT: &str = "profile_text";
    /// `FeatureFlag.is_enabled`
    pub const IS_ENABLED: &str = "is_enabled";
    /// `FeatureFlag.rollout_percentage`
    pub const ROLLOUT_PERCENTAGE: &str = "rollout_percentage";
    /// `FeatureFlag.enabled_environments`
    pub const ENABLED_ENVIRONMENTS: &str = "enabled_environments";
    /// `SupportTicket.title`
    pub const TITLE: &str = "title";
    /// `SupportTicket.description` / `UserNote.content`
    pub const DESCRIPTION: &str = "description";
    /// `SupportTicket.severity`
    pub const SEVERITY: &str = "severity";
    /// `SupportTicket.contact_method`
    pub const CONTACT_METHOD: &str = "contact_method";
    /// `SupportTicket.status`
    pub const STATUS: &str = "status";
    /// `UserNote.user_id`
    pub const USER_ID: &str = "user_id";
    /// `UserNote.content`
    pub const CONTENT: &str = "content";
    /// `UserNote.author_email`
    pub const AUTHOR_EMAIL: &str = "author_email";
}
