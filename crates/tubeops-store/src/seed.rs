//! Demo dataset
//!
//! Deterministic fixtures for local runs and tests: a handful of accounts,
//! one creator channel with three videos, comments (one obvious spam row),
//! purchases, feature flags and open support tickets — enough rows that
//! every workflow has something to act on.

use crate::entities::{
    Channel, ChannelId, Comment, CommentId, ContactMethod, Environment, FeatureFlag,
    SupportTicket, TicketId, TicketSeverity, TicketStatus, User, UserId, Video, VideoId,
    VideoPurchase, PurchaseId,
};
use crate::store::MemoryStore;
use chrono::{Duration, Utc};

/// Handles to notable seeded rows, for tests and demos
#[derive(Debug, Clone)]
pub struct SeedSummary {
    /// The creator account owning the channel
    pub creator: UserId,
    /// The account that posted the spam comment
    pub spammer: UserId,
    /// The most commented video
    pub featured_video: VideoId,
    /// The obviously spammy comment
    pub spam_comment: CommentId,
    /// One open support ticket
    pub open_ticket: TicketId,
}

/// Load the demo dataset into a store
#[allow(clippy::too_many_lines)]
pub fn seed_demo(store: &MemoryStore) -> SeedSummary {
    let now = Utc::now();

    let mut rivka = User::new("rivka@viewtube.example");
    rivka.name = Some("Rivka Adler".into());
    rivka.is_verified = true;
    rivka.can_upload = true;
    rivka.image_url = Some("https://cdn.viewtube.example/avatars/rivka.png".into());
    rivka.signed_up_at = now - Duration::days(700);
    let creator = store.insert_user(rivka);

    let mut theo = User::new("theo@viewtube.example");
    theo.name = Some("Theo Brandt".into());
    theo.image_url = Some("https://cdn.viewtube.example/avatars/theo.png".into());
    theo.signed_up_at = now - Duration::days(420);
    let buyer = store.insert_user(theo);

    let mut noor = User::new("noor@viewtube.example");
    noor.name = Some("Noor Haddad".into());
    noor.image_url = Some("https://cdn.viewtube.example/avatars/noor.png".into());
    noor.signed_up_at = now - Duration::days(240);
    let spammer = store.insert_user(noor);

    let mut priya = User::new("priya@viewtube.example");
    priya.name = Some("Priya Raman".into());
    priya.is_verified = true;
    priya.image_url = Some("https://cdn.viewtube.example/avatars/priya.png".into());
    priya.signed_up_at = now - Duration::days(90);
    let commenter = store.insert_user(priya);

    let channel = store.insert_channel(Channel {
        id: ChannelId::new(),
        name: "Rivka's Tech Tips".into(),
        owner: creator,
    });

    let mut featured_video = VideoId::new();
    for (index, (title, price)) in [
        ("Building my Dream PC", 10),
        ("Hackintosh in a Weekend", 5),
        ("Laptop Chip Showdown", 5),
    ]
    .into_iter()
    .enumerate()
    {
        let video = store.insert_video(Video {
            id: VideoId::new(),
            title: title.into(),
            url: format!("https://cdn.viewtube.example/media/{index}.mp4"),
            thumbnail_url: format!("https://cdn.viewtube.example/thumbs/{index}.jpg"),
            channel,
            price,
            created_at: now - Duration::days(30 - index as i64),
        });
        if index == 2 {
            featured_video = video;
        }
    }

    let spam_comment = store.insert_comment(Comment {
        id: CommentId::new(),
        video: featured_video,
        author: spammer,
        content: "I earn $6k/month from home doing NOTHING. Get rich at totally-legit.example"
            .into(),
        is_spam: false,
        created_at: now - Duration::hours(20),
    });

    store.insert_comment(Comment {
        id: CommentId::new(),
        video: featured_video,
        author: commenter,
        content: "Just ordered mine, should arrive any day now".into(),
        is_spam: false,
        created_at: now - Duration::hours(12),
    });

    store.insert_comment(Comment {
        id: CommentId::new(),
        video: featured_video,
        author: buyer,
        content: "Maybe now I can run two Electron apps at once?".into(),
        is_spam: false,
        created_at: now - Duration::hours(3),
    });

    for video in store.videos() {
        store.insert_purchase(VideoPurchase {
            id: PurchaseId::new(),
            owner: buyer,
            video: video.id,
            amount: video.price,
            created_at: now - Duration::days(10),
        });
    }

    store.insert_flag(FeatureFlag {
        slug: "new-player".into(),
        description: "Rewritten playback engine".into(),
        is_enabled: true,
        rollout_percentage: 50,
        enabled_environments: vec![Environment::Staging],
    });
    store.insert_flag(FeatureFlag {
        slug: "live-chat".into(),
        description: "Real-time chat under live streams".into(),
        is_enabled: false,
        rollout_percentage: 0,
        enabled_environments: vec![],
    });
    store.insert_flag(FeatureFlag {
        slug: "hdr-uploads".into(),
        description: "Accept HDR10 uploads".into(),
        is_enabled: true,
        rollout_percentage: 100,
        enabled_environments: vec![Environment::Production, Environment::Staging],
    });

    let open_ticket = store.insert_ticket(SupportTicket {
        id: TicketId::new(),
        title: "Purchase receipt shows the wrong date".into(),
        description: "Receipts between March 12-18 carry the wrong purchase date".into(),
        severity: TicketSeverity::Low,
        contact_method: ContactMethod::Email,
        status: TicketStatus::Open,
        created_at: now - Duration::hours(30),
        updated_at: now - Duration::hours(30),
    });

    store.insert_ticket(SupportTicket {
        id: TicketId::new(),
        title: "Cannot sign in with 2FA".into(),
        description: "Authenticator codes rejected since yesterday".into(),
        severity: TicketSeverity::High,
        contact_method: ContactMethod::Phone,
        status: TicketStatus::Open,
        created_at: now - Duration::hours(6),
        updated_at: now - Duration::hours(6),
    });

    store.insert_ticket(SupportTicket {
        id: TicketId::new(),
        title: "Refund request for duplicate purchase".into(),
        description: "Charged twice for the same video".into(),
        severity: TicketSeverity::Medium,
        contact_method: ContactMethod::Chat,
        status: TicketStatus::Closed,
        created_at: now - Duration::days(4),
        updated_at: now - Duration::days(3),
    });

    tracing::info!("demo dataset loaded");

    SeedSummary {
        creator,
        spammer,
        featured_video,
        spam_comment,
        open_ticket,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_populates_every_table() {
        let store = MemoryStore::new();
        let summary = seed_demo(&store);

        assert_eq!(store.users().len(), 4);
        assert_eq!(store.videos().len(), 3);
        assert_eq!(store.flags().len(), 3);
        assert_eq!(store.open_tickets().len(), 2);
        assert_eq!(store.comments_for_video(summary.featured_video).len(), 3);
        assert!(store.comment(summary.spam_comment).is_some());
        assert!(store.user(summary.spammer).is_some());
    }

    #[test]
    fn open_tickets_are_newest_first() {
        let store = MemoryStore::new();
        seed_demo(&store);

        let tickets = store.open_tickets();
        assert_eq!(tickets[0].title, "Cannot sign in with 2FA");
    }
}
