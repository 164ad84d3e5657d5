//! Public site routes
//!
//! The visitor-facing surface is two JSON pages (video list, video detail)
//! plus the comment-flag endpoint that hands moderation off to the
//! operator queue. Rendering stays with the caller; these routes only
//! shape data.

use crate::queue::InvocationQueue;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tubeops_core::ParamBag;
use tubeops_store::{CommentId, MemoryStore, VideoId};

/// Shared route state
#[derive(Clone)]
pub struct AppState {
    /// Persistence collaborator
    pub store: Arc<MemoryStore>,
    /// Operator hand-off queue
    pub queue: Arc<InvocationQueue>,
}

/// One video row on the index page
#[derive(Debug, Serialize)]
pub struct VideoView {
    /// Video id
    pub id: String,
    /// Title
    pub title: String,
    /// Thumbnail URL
    pub thumbnail_url: String,
    /// Price in dollars
    pub price: u32,
    /// Owning channel name
    pub channel: String,
}

/// One comment on the detail page
#[derive(Debug, Serialize)]
pub struct CommentView {
    /// Comment id
    pub id: String,
    /// Author display name
    pub author: String,
    /// Text content
    pub content: String,
    /// Spam marker
    pub is_spam: bool,
}

/// The video detail page
#[derive(Debug, Serialize)]
pub struct VideoDetail {
    /// Video id
    pub id: String,
    /// Title
    pub title: String,
    /// Media URL
    pub url: String,
    /// Thumbnail URL
    pub thumbnail_url: String,
    /// Price in dollars
    pub price: u32,
    /// Comments with authors
    pub comments: Vec<CommentView>,
}

/// Build the public router
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/video/{id}", get(video_detail))
        .route("/comment/flag/{id}", post(flag_comment))
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Json<Vec<VideoView>> {
    let videos = state
        .store
        .videos()
        .into_iter()
        .map(|v| VideoView {
            id: v.id.to_string(),
            title: v.title,
            thumbnail_url: v.thumbnail_url,
            price: v.price,
            channel: state
                .store
                .channel(v.channel)
                .map(|c| c.name)
                .unwrap_or_default(),
        })
        .collect();
    Json(videos)
}

async fn video_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VideoDetail>, (StatusCode, String)> {
    let video = VideoId::parse(&id)
        .and_then(|vid| state.store.video(vid))
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("video not found: {id}")))?;

    let comments = state
        .store
        .comments_for_video(video.id)
        .into_iter()
        .map(|c| CommentView {
            id: c.id.to_string(),
            author: state
                .store
                .user(c.author)
                .map(|u| u.display_name().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            content: c.content,
            is_spam: c.is_spam,
        })
        .collect();

    Ok(Json(VideoDetail {
        id: video.id.to_string(),
        title: video.title,
        url: video.url,
        thumbnail_url: video.thumbnail_url,
        price: video.price,
        comments,
    }))
}

async fn flag_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    // validate before enqueueing so visitors cannot queue junk ids
    let comment = CommentId::parse(&id)
        .and_then(|cid| state.store.comment(cid))
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("comment not found: {id}")))?;

    state.queue.enqueue(
        "moderate_comment",
        ParamBag::new().with("comment_id", comment.id.to_string()),
    );

    Ok(Json(serde_json::json!({ "flagged": true })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use tower::util::ServiceExt;
    use tubeops_store::seed_demo;

    fn app() -> (Router, AppState) {
        let store = Arc::new(MemoryStore::new());
        seed_demo(&store);
        let state = AppState {
            store,
            queue: Arc::new(InvocationQueue::new()),
        };
        (router(state.clone()), state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn index_lists_videos_with_channel_names() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 3);
        assert_eq!(json[0]["channel"], "Rivka's Tech Tips");
    }

    #[tokio::test]
    async fn video_detail_includes_comment_authors() {
        let (app, state) = app();
        let video_id = state.store.videos()[2].id.to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/video/{video_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["comments"].as_array().unwrap().len(), 3);
        assert_eq!(json["comments"][0]["author"], "Noor Haddad");
    }

    #[tokio::test]
    async fn missing_video_is_404() {
        let (app, _) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/video/{}", VideoId::new()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn flagging_enqueues_a_moderation_invocation() {
        let (app, state) = app();
        let comment_id = state
            .store
            .comments_for_video(state.store.videos()[2].id)[0]
            .id
            .to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/comment/flag/{comment_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["flagged"], true);

        let queued = state.queue.drain();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].slug, "moderate_comment");
        assert_eq!(queued[0].params.get_str("comment_id"), Some(comment_id.as_str()));
    }
}
