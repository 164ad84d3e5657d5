//! In-memory reference persistence
//!
//! The workflows talk to persistence through three seams — typed readers,
//! [`SearchSource`] callbacks, and the [`EffectExecutor`] — and this module
//! provides the reference implementation backing all three with concurrent
//! maps. Individual operations are per-row atomic (DashMap entry locking);
//! there is no cross-invocation isolation: two operators acting on the same
//! row race with last-write-wins semantics, a documented limitation of the
//! console.

use crate::entities::{
    fields, Channel, ChannelId, Comment, CommentId, ContactMethod, Environment, FeatureFlag,
    NoteId, PurchaseId, SupportTicket, TicketId, TicketSeverity, TicketStatus, User, UserId,
    UserNote, Video, VideoId, VideoPurchase,
};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tubeops_core::{
    Candidate, Effect, EffectExecutor, EffectKind, EffectReceipt, EntityKind, FieldPatch,
    FieldValue, SearchSource, WorkflowError,
};

/// Concurrent in-memory store for the demo deployment
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<UserId, User>,
    channels: DashMap<ChannelId, Channel>,
    videos: DashMap<VideoId, Video>,
    comments: DashMap<CommentId, Comment>,
    flags: DashMap<String, FeatureFlag>,
    tickets: DashMap<TicketId, SupportTicket>,
    notes: DashMap<NoteId, UserNote>,
    purchases: DashMap<PurchaseId, VideoPurchase>,
    pending_deletions: Mutex<Vec<String>>,
}

impl MemoryStore {
    /// Empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ---- inserts ------------------------------------------------------

    /// Insert a user, returning its id
    pub fn insert_user(&self, user: User) -> UserId {
        let id = user.id;
        self.users.insert(id, user);
        id
    }

    /// Insert a channel, returning its id
    pub fn insert_channel(&self, channel: Channel) -> ChannelId {
        let id = channel.id;
        self.channels.insert(id, channel);
        id
    }

    /// Insert a video, returning its id
    pub fn insert_video(&self, video: Video) -> VideoId {
        let id = video.id;
        self.videos.insert(id, video);
        id
    }

    /// Insert a comment, returning its id
    pub fn insert_comment(&self, comment: Comment) -> CommentId {
        let id = comment.id;
        self.comments.insert(id, comment);
        id
    }

    /// Insert or replace a feature flag
    pub fn insert_flag(&self, flag: FeatureFlag) {
        self.flags.insert(flag.slug.clone(), flag);
    }

    /// Insert a ticket, returning its id
    pub fn insert_ticket(&self, ticket: SupportTicket) -> TicketId {
        let id = ticket.id;
        self.tickets.insert(id, ticket);
        id
    }

    /// Insert a purchase, returning its id
    pub fn insert_purchase(&self, purchase: VideoPurchase) -> PurchaseId {
        let id = purchase.id;
        self.purchases.insert(id, purchase);
        id
    }

    // ---- readers ------------------------------------------------------

    /// User by id
    #[must_use]
    pub fn user(&self, id: UserId) -> Option<User> {
        self.users.get(&id).map(|u| u.clone())
    }

    /// User by unique email
    #[must_use]
    pub fn user_by_email(&self, email: &str) -> Option<User> {
        self.users.iter().find(|u| u.email == email).map(|u| u.clone())
    }

    /// All users, newest signup first (id ascending as tie-break)
    #[must_use]
    pub fn users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.clone()).collect();
        users.sort_by(|a, b| b.signed_up_at.cmp(&a.signed_up_at).then(a.id.cmp(&b.id)));
        users
    }

    /// Channel by id
    #[must_use]
    pub fn channel(&self, id: ChannelId) -> Option<Channel> {
        self.channels.get(&id).map(|c| c.clone())
    }

    /// Channels owned by a user, id ascending
    #[must_use]
    pub fn channels_for_owner(&self, owner: UserId) -> Vec<Channel> {
        let mut channels: Vec<Channel> = self
            .channels
            .iter()
            .filter(|c| c.owner == owner)
            .map(|c| c.clone())
            .collect();
        channels.sort_by_key(|c| c.id);
        channels
    }

    /// Video by id
    #[must_use]
    pub fn video(&self, id: VideoId) -> Option<Video> {
        self.videos.get(&id).map(|v| v.clone())
    }

    /// All videos, id ascending (creation order)
    #[must_use]
    pub fn videos(&self) -> Vec<Video> {
        let mut videos: Vec<Video> = self.videos.iter().map(|v| v.clone()).collect();
        videos.sort_by_key(|v| v.id);
        videos
    }

    /// Videos owned by a user's channels, id ascending
    #[must_use]
    pub fn videos_for_owner(&self, owner: UserId) -> Vec<Video> {
        let channel_ids: Vec<ChannelId> = self
            .channels_for_owner(owner)
            .into_iter()
            .map(|c| c.id)
            .collect();
        let mut videos: Vec<Video> = self
            .videos
            .iter()
            .filter(|v| channel_ids.contains(&v.channel))
            .map(|v| v.clone())
            .collect();
        videos.sort_by_key(|v| v.id);
        videos
    }

    /// Comment by id
    #[must_use]
    pub fn comment(&self, id: CommentId) -> Option<Comment> {
        self.comments.get(&id).map(|c| c.clone())
    }

    /// Comments under a video, id ascending (creation order)
    #[must_use]
    pub fn comments_for_video(&self, video: VideoId) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.video == video)
            .map(|c| c.clone())
            .collect();
        comments.sort_by_key(|c| c.id);
        comments
    }

    /// Comments written by a user, id ascending
    #[must_use]
    pub fn comments_by_author(&self, author: UserId) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.author == author)
            .map(|c| c.clone())
            .collect();
        comments.sort_by_key(|c| c.id);
        comments
    }

    /// Flag by slug
    #[must_use]
    pub fn flag(&self, slug: &str) -> Option<FeatureFlag> {
        self.flags.get(slug).map(|f| f.clone())
    }

    /// All flags, slug ascending
    #[must_use]
    pub fn flags(&self) -> Vec<FeatureFlag> {
        let mut flags: Vec<FeatureFlag> = self.flags.iter().map(|f| f.clone()).collect();
        flags.sort_by(|a, b| a.slug.cmp(&b.slug));
        flags
    }

    /// Ticket by id
    #[must_use]
    pub fn ticket(&self, id: TicketId) -> Option<SupportTicket> {
        self.tickets.get(&id).map(|t| t.clone())
    }

    /// Open tickets, newest first (id descending as tie-break)
    #[must_use]
    pub fn open_tickets(&self) -> Vec<SupportTicket> {
        let mut tickets: Vec<SupportTicket> = self
            .tickets
            .iter()
            .filter(|t| t.status == TicketStatus::Open)
            .map(|t| t.clone())
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        tickets
    }

    /// Notes attached to a user, id ascending
    #[must_use]
    pub fn notes_for_user(&self, user: UserId) -> Vec<UserNote> {
        let mut notes: Vec<UserNote> = self
            .notes
            .iter()
            .filter(|n| n.user == user)
            .map(|n| n.clone())
            .collect();
        notes.sort_by_key(|n| n.id);
        notes
    }

    /// Purchases made by a user, id ascending
    #[must_use]
    pub fn purchases_for_user(&self, owner: UserId) -> Vec<VideoPurchase> {
        let mut purchases: Vec<VideoPurchase> = self
            .purchases
            .iter()
            .filter(|p| p.owner == owner)
            .map(|p| p.clone())
            .collect();
        purchases.sort_by_key(|p| p.id);
        purchases
    }

    // ---- deletion ledger ---------------------------------------------

    /// Record an account as marked for deletion
    pub fn mark_for_deletion(&self, email: impl Into<String>) {
        self.pending_deletions.lock().push(email.into());
    }

    /// Emails currently marked for deletion
    #[must_use]
    pub fn pending_deletions(&self) -> Vec<String> {
        self.pending_deletions.lock().clone()
    }
}

// ---- patch field helpers ---------------------------------------------

fn field_bool(patch: &FieldPatch, name: &str) -> Result<Option<bool>, WorkflowError> {
    match patch.get(name) {
        None => Ok(None),
        Some(FieldValue::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(WorkflowError::Storage(format!(
            "field `{name}` expects a boolean, got {other:?}"
        ))),
    }
}

fn field_text(patch: &FieldPatch, name: &str) -> Result<Option<String>, WorkflowError> {
    match patch.get(name) {
        None => Ok(None),
        Some(FieldValue::Text(s)) => Ok(Some(s.clone())),
        Some(other) => Err(WorkflowError::Storage(format!(
            "field `{name}` expects text, got {other:?}"
        ))),
    }
}

fn field_int(patch: &FieldPatch, name: &str) -> Result<Option<i64>, WorkflowError> {
    match patch.get(name) {
        None => Ok(None),
        Some(FieldValue::Int(i)) => Ok(Some(*i)),
        Some(other) => Err(WorkflowError::Storage(format!(
            "field `{name}` expects an integer, got {other:?}"
        ))),
    }
}

fn ensure_known_fields(patch: &FieldPatch, known: &[&str]) -> Result<(), WorkflowError> {
    for field in patch.fields() {
        if !known.contains(&field) {
            return Err(WorkflowError::Storage(format!("unknown field `{field}`")));
        }
    }
    Ok(())
}

#[async_trait]
impl EffectExecutor for MemoryStore {
    async fn apply(&self, effect: Effect) -> Result<EffectReceipt, WorkflowError> {
        match effect {
            Effect::Update { entity, id, fields } => self.apply_update(entity, &id, &fields),
            Effect::Create { entity, fields } => self.apply_create(entity, &fields),
            Effect::Delete { entity, id } => self.apply_delete(entity, &id),
        }
    }
}

impl MemoryStore {
    fn apply_update(
        &self,
        entity: EntityKind,
        id: &str,
        patch: &FieldPatch,
    ) -> Result<EffectReceipt, WorkflowError> {
        match entity {
            EntityKind::Comment => {
                ensure_known_fields(patch, &[fields::IS_SPAM])?;
                let is_spam = field_bool(patch, fields::IS_SPAM)?;
                let key = CommentId::parse(id)
                    .ok_or_else(|| WorkflowError::not_found("comment", id))?;
                let mut comment = self
                    .comments
                    .get_mut(&key)
                    .ok_or_else(|| WorkflowError::not_found("comment", id))?;
                if let Some(is_spam) = is_spam {
                    comment.is_spam = is_spam;
                }
            }
            EntityKind::User => {
                ensure_known_fields(
                    patch,
                    &[
                        fields::IS_VERIFIED,
                        fields::CAN_UPLOAD,
                        fields::NAME,
                        fields::EMAIL,
                        fields::MAX_UPLOAD_DURATION,
                        fields::WEBSITE,
                        fields::PROFILE_TEXT,
                    ],
                )?;
                let key =
                    UserId::parse(id).ok_or_else(|| WorkflowError::not_found("user", id))?;
                let is_verified = field_bool(patch, fields::IS_VERIFIED)?;
                let can_upload = field_bool(patch, fields::CAN_UPLOAD)?;
                let name = field_text(patch, fields::NAME)?;
                let email = field_text(patch, fields::EMAIL)?;
                let max_upload = field_int(patch, fields::MAX_UPLOAD_DURATION)?
                    .map(|v| {
                        u32::try_from(v).map_err(|_| {
                            WorkflowError::Storage(format!(
                                "max_upload_duration out of range: {v}"
                            ))
                        })
                    })
                    .transpose()?;
                let website = field_text(patch, fields::WEBSITE)?;
                let profile_text = field_text(patch, fields::PROFILE_TEXT)?;

                let mut user = self
                    .users
                    .get_mut(&key)
                    .ok_or_else(|| WorkflowError::not_found("user", id))?;
                if let Some(v) = is_verified {
                    user.is_verified = v;
                }
                if let Some(v) = can_upload {
                    user.can_upload = v;
                }
                if let Some(v) = name {
                    user.name = Some(v);
                }
                if let Some(v) = email {
                    user.email = v;
                }
                if let Some(v) = max_upload {
                    user.max_upload_duration = Some(v);
                }
                if let Some(v) = website {
                    user.website = Some(v);
                }
                if let Some(v) = profile_text {
                    user.profile_text = Some(v);
                }
            }
            EntityKind::FeatureFlag => {
                ensure_known_fields(
                    patch,
                    &[
                        fields::IS_ENABLED,
                        fields::ROLLOUT_PERCENTAGE,
                        fields::ENABLED_ENVIRONMENTS,
                    ],
                )?;
                let is_enabled = field_bool(patch, fields::IS_ENABLED)?;
                let rollout = field_int(patch, fields::ROLLOUT_PERCENTAGE)?
                    .map(|v| {
                        u8::try_from(v).ok().filter(|v| *v <= 100).ok_or_else(|| {
                            WorkflowError::Storage(format!(
                                "rollout_percentage must be 0-100, got {v}"
                            ))
                        })
                    })
                    .transpose()?;
                let environments = match patch.get(fields::ENABLED_ENVIRONMENTS) {
                    None => None,
                    Some(FieldValue::TextList(raw)) => {
                        let mut parsed = Vec::with_capacity(raw.len());
                        for value in raw {
                            parsed.push(Environment::parse(value).ok_or_else(|| {
                                WorkflowError::Storage(format!("unknown environment `{value}`"))
                            })?);
                        }
                        Some(parsed)
                    }
                    Some(other) => {
                        return Err(WorkflowError::Storage(format!(
                            "field `enabled_environments` expects a text list, got {other:?}"
                        )))
                    }
                };

                let mut flag = self
                    .flags
                    .get_mut(id)
                    .ok_or_else(|| WorkflowError::not_found("feature_flag", id))?;
                if let Some(v) = is_enabled {
                    flag.is_enabled = v;
                }
                if let Some(v) = rollout {
                    flag.rollout_percentage = v;
                }
                if let Some(v) = environments {
                    flag.enabled_environments = v;
                }
            }
            EntityKind::SupportTicket => {
                ensure_known_fields(patch, &[fields::STATUS])?;
                let status = field_text(patch, fields::STATUS)?
                    .map(|raw| {
                        TicketStatus::parse(&raw).ok_or_else(|| {
                            WorkflowError::Storage(format!("unknown ticket status `{raw}`"))
                        })
                    })
                    .transpose()?;
                let key = TicketId::parse(id)
                    .ok_or_else(|| WorkflowError::not_found("support_ticket", id))?;
                let mut ticket = self
                    .tickets
                    .get_mut(&key)
                    .ok_or_else(|| WorkflowError::not_found("support_ticket", id))?;
                if let Some(status) = status {
                    ticket.status = status;
                    ticket.updated_at = Utc::now();
                }
            }
            EntityKind::Video | EntityKind::UserNote => {
                return Err(WorkflowError::Storage(format!(
                    "updates are not supported for {}",
                    entity.label()
                )));
            }
        }

        tracing::debug!(entity = entity.label(), id, "row updated");
        Ok(EffectReceipt {
            entity,
            id: id.to_string(),
            kind: EffectKind::Updated,
        })
    }

    fn apply_create(
        &self,
        entity: EntityKind,
        patch: &FieldPatch,
    ) -> Result<EffectReceipt, WorkflowError> {
        let id = match entity {
            EntityKind::User => {
                ensure_known_fields(
                    patch,
                    &[
                        fields::EMAIL,
                        fields::NAME,
                        fields::CAN_UPLOAD,
                        fields::MAX_UPLOAD_DURATION,
                        fields::BIRTHDAY,
                        fields::WEBSITE,
                        fields::PROFILE_TEXT,
                    ],
                )?;
                let email = field_text(patch, fields::EMAIL)?.ok_or_else(|| {
                    WorkflowError::Storage("user creation requires `email`".to_string())
                })?;
                if self.user_by_email(&email).is_some() {
                    return Err(WorkflowError::Storage(format!(
                        "email already registered: {email}"
                    )));
                }

                let mut user = User::new(email);
                user.name = field_text(patch, fields::NAME)?;
                user.can_upload = field_bool(patch, fields::CAN_UPLOAD)?.unwrap_or(false);
                user.max_upload_duration = field_int(patch, fields::MAX_UPLOAD_DURATION)?
                    .map(|v| {
                        u32::try_from(v).map_err(|_| {
                            WorkflowError::Storage(format!(
                                "max_upload_duration out of range: {v}"
                            ))
                        })
                    })
                    .transpose()?;
                if let Some(FieldValue::Date(birthday)) = patch.get(fields::BIRTHDAY) {
                    user.birthday = Some(*birthday);
                }
                user.website = field_text(patch, fields::WEBSITE)?;
                user.profile_text = field_text(patch, fields::PROFILE_TEXT)?;
                self.insert_user(user).to_string()
            }
            EntityKind::SupportTicket => {
                ensure_known_fields(
                    patch,
                    &[
                        fields::TITLE,
                        fields::DESCRIPTION,
                        fields::SEVERITY,
                        fields::CONTACT_METHOD,
                        fields::STATUS,
                    ],
                )?;
                let title = field_text(patch, fields::TITLE)?.ok_or_else(|| {
                    WorkflowError::Storage("ticket creation requires `title`".to_string())
                })?;
                let severity = field_text(patch, fields::SEVERITY)?
                    .and_then(|raw| TicketSeverity::parse(&raw))
                    .ok_or_else(|| {
                        WorkflowError::Storage("ticket creation requires a valid `severity`".to_string())
                    })?;
                let contact_method = field_text(patch, fields::CONTACT_METHOD)?
                    .and_then(|raw| ContactMethod::parse(&raw))
                    .ok_or_else(|| {
                        WorkflowError::Storage(
                            "ticket creation requires a valid `contact_method`".to_string(),
                        )
                    })?;
                let now = Utc::now();
                let ticket = SupportTicket {
                    id: TicketId::new(),
                    title,
                    description: field_text(patch, fields::DESCRIPTION)?.unwrap_or_default(),
                    severity,
                    contact_method,
                    status: TicketStatus::Open,
                    created_at: now,
                    updated_at: now,
                };
                self.insert_ticket(ticket).to_string()
            }
            EntityKind::UserNote => {
                ensure_known_fields(
                    patch,
                    &[fields::USER_ID, fields::CONTENT, fields::AUTHOR_EMAIL],
                )?;
                let raw_user = field_text(patch, fields::USER_ID)?.ok_or_else(|| {
                    WorkflowError::Storage("note creation requires `user_id`".to_string())
                })?;
                let user = UserId::parse(&raw_user)
                    .filter(|id| self.users.contains_key(id))
                    .ok_or_else(|| WorkflowError::not_found("user", raw_user.clone()))?;
                let note = UserNote {
                    id: NoteId::new(),
                    user,
                    content: field_text(patch, fields::CONTENT)?.unwrap_or_default(),
                    author_email: field_text(patch, fields::AUTHOR_EMAIL)?.unwrap_or_default(),
                    created_at: Utc::now(),
                };
                let id = note.id;
                self.notes.insert(id, note);
                id.to_string()
            }
            EntityKind::Comment | EntityKind::Video | EntityKind::FeatureFlag => {
                return Err(WorkflowError::Storage(format!(
                    "creation is not supported for {}",
                    entity.label()
                )));
            }
        };

        tracing::debug!(entity = entity.label(), id, "row created");
        Ok(EffectReceipt {
            entity,
            id,
            kind: EffectKind::Created,
        })
    }

    fn apply_delete(&self, entity: EntityKind, id: &str) -> Result<EffectReceipt, WorkflowError> {
        match entity {
            EntityKind::Comment => {
                let key = CommentId::parse(id)
                    .ok_or_else(|| WorkflowError::not_found("comment", id))?;
                self.comments
                    .remove(&key)
                    .ok_or_else(|| WorkflowError::not_found("comment", id))?;
            }
            EntityKind::User => {
                let key =
                    UserId::parse(id).ok_or_else(|| WorkflowError::not_found("user", id))?;
                self.users
                    .remove(&key)
                    .ok_or_else(|| WorkflowError::not_found("user", id))?;
            }
            _ => {
                return Err(WorkflowError::Storage(format!(
                    "deletion is not supported for {}",
                    entity.label()
                )));
            }
        }

        tracing::debug!(entity = entity.label(), id, "row deleted");
        Ok(EffectReceipt {
            entity,
            id: id.to_string(),
            kind: EffectKind::Deleted,
        })
    }
}

// ---- search sources ---------------------------------------------------

/// User search: case-insensitive substring over `name`, id ascending
/// (ULIDs, therefore creation order)
pub struct UserSearch(pub Arc<MemoryStore>);

#[async_trait]
impl SearchSource for UserSearch {
    fn entity(&self) -> &'static str {
        "user"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, WorkflowError> {
        let query = query.to_lowercase();
        let mut matches: Vec<User> = self
            .0
            .users
            .iter()
            .filter(|u| {
                u.name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&query))
            })
            .map(|u| u.clone())
            .collect();
        matches.sort_by_key(|u| u.id);
        matches.truncate(limit);

        Ok(matches
            .into_iter()
            .map(|u| {
                let mut candidate = Candidate::new(u.id.to_string(), u.display_name())
                    .with_description(u.email.clone());
                if let Some(image_url) = &u.image_url {
                    candidate = candidate.with_image(image_url.clone());
                }
                candidate
            })
            .collect())
    }
}

/// Video search: case-insensitive substring over `title`, id ascending
pub struct VideoSearch(pub Arc<MemoryStore>);

#[async_trait]
impl SearchSource for VideoSearch {
    fn entity(&self) -> &'static str {
        "video"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, WorkflowError> {
        let query = query.to_lowercase();
        let mut matches: Vec<Video> = self
            .0
            .videos
            .iter()
            .filter(|v| v.title.to_lowercase().contains(&query))
            .map(|v| v.clone())
            .collect();
        matches.sort_by_key(|v| v.id);
        matches.truncate(limit);

        Ok(matches
            .into_iter()
            .map(|v| {
                Candidate::new(v.id.to_string(), v.title.clone())
                    .with_image(v.thumbnail_url.clone())
            })
            .collect())
    }
}

/// Ticket search: case-insensitive substring over `title`, newest first
pub struct TicketSearch(pub Arc<MemoryStore>);

#[async_trait]
impl SearchSource for TicketSearch {
    fn entity(&self) -> &'static str {
        "ticket"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, WorkflowError> {
        let query = query.to_lowercase();
        let mut matches: Vec<SupportTicket> = self
            .0
            .tickets
            .iter()
            .filter(|t| t.title.to_lowercase().contains(&query))
            .map(|t| t.clone())
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        matches.truncate(limit);

        Ok(matches
            .into_iter()
            .map(|t| {
                Candidate::new(t.id.to_string(), t.title.clone())
                    .with_description(t.description.clone())
            })
            .collect())
    }
}
