// src/models/post.rs

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use url::Url;
use validator::{Validate, ValidationError};

/// Kind of media attached to a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[default]
    None,
    Photo,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::None => "none",
            MediaType::Photo => "photo",
            MediaType::Video => "video",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(MediaType::None),
            "photo" => Ok(MediaType::Photo),
            "video" => Ok(MediaType::Video),
            other => Err(format!("unknown media type '{}'", other)),
        }
    }
}

/// A post as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub media_url: Option<String>,
    pub media_type: MediaType,

    /// Denormalized count of rows in `likes` for this post.
    pub likes: i32,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Raw row of the 'posts' table. `media_type` is stored as TEXT.
#[derive(Debug, FromRow)]
pub struct PostRow {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub media_url: Option<String>,
    pub media_type: String,
    pub likes: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        let media_type = row.media_type.parse().unwrap_or_else(|e| {
            tracing::warn!("Post {} has {}, treating as none", row.id, e);
            MediaType::None
        });

        Post {
            id: row.id,
            user_id: row.user_id,
            content: row.content,
            media_url: row.media_url,
            media_type,
            likes: row.likes,
            created_at: row.created_at,
        }
    }
}

/// Values the store needs to insert a post.
/// `likes` and `created_at` are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: i64,
    pub content: String,
    pub media_url: Option<String>,
    pub media_type: MediaType,
}

/// DTO for creating a new post.
/// Any client-supplied `likes`/`createdAt` is ignored because those fields don't exist here.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_media_pair))]
pub struct CreatePostRequest {
    /// Required, but may be empty.
    #[validate(length(max = 10000, message = "Content must be at most 10000 characters"))]
    pub content: String,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(max = 2048), custom(function = validate_url_string))]
    pub media_url: Option<String>,

    #[serde(default)]
    pub media_type: Option<MediaType>,
}

impl CreatePostRequest {
    pub fn media_type(&self) -> MediaType {
        self.media_type.unwrap_or_default()
    }
}

/// Query parameters for listing posts.
#[derive(Debug, Default, Deserialize)]
pub struct PostListParams {
    /// Restrict the feed to one media type.
    pub media: Option<MediaType>,
}

/// Query parameters for the trending feed.
#[derive(Debug, Default, Deserialize)]
pub struct TrendingParams {
    /// Number of posts to return (default: 10, max: 100).
    pub limit: Option<usize>,
}

/// Clients send `""` when no media is attached.
fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Validates that a string is a correctly formatted URL.
fn validate_url_string(url: &str) -> Result<(), ValidationError> {
    if Url::parse(url).is_err() {
        return Err(ValidationError::new("invalid_url"));
    }
    Ok(())
}

/// A media URL and a non-`none` media type must come together.
fn validate_media_pair(req: &CreatePostRequest) -> Result<(), ValidationError> {
    match (req.media_url.is_some(), req.media_type()) {
        (true, MediaType::None) => Err(ValidationError::new("media_type_required")
            .with_message("mediaType must be photo or video when mediaUrl is set".into())),
        (false, MediaType::Photo | MediaType::Video) => Err(ValidationError::new(
            "media_url_required",
        )
        .with_message("mediaUrl is required for photo and video posts".into())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: serde_json::Value) -> CreatePostRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn text_post_is_valid() {
        let req = parse(serde_json::json!({ "content": "hi", "mediaUrl": "", "mediaType": null }));
        assert!(req.validate().is_ok());
        assert_eq!(req.media_url, None);
        assert_eq!(req.media_type(), MediaType::None);
    }

    #[test]
    fn empty_content_is_allowed() {
        let req = parse(serde_json::json!({ "content": "" }));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn photo_needs_url() {
        let req = parse(serde_json::json!({ "content": "x", "mediaType": "photo" }));
        assert!(req.validate().is_err());

        let req = parse(serde_json::json!({
            "content": "x",
            "mediaType": "photo",
            "mediaUrl": "https://cdn.example.com/cat.png"
        }));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn url_needs_media_type() {
        let req = parse(serde_json::json!({
            "content": "x",
            "mediaUrl": "https://cdn.example.com/clip.mp4"
        }));
        assert!(req.validate().is_err());
    }

    #[test]
    fn malformed_url_is_rejected() {
        let req = parse(serde_json::json!({
            "content": "x",
            "mediaType": "video",
            "mediaUrl": "not a url"
        }));
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("media_url"));
    }

    #[test]
    fn media_type_text_round_trips_through_row() {
        let row = PostRow {
            id: 1,
            user_id: 2,
            content: "c".into(),
            media_url: Some("https://x.test/a.mp4".into()),
            media_type: "video".into(),
            likes: 3,
            created_at: chrono::Utc::now(),
        };
        let post = Post::from(row);
        assert_eq!(post.media_type, MediaType::Video);
        assert_eq!(post.likes, 3);
    }
}
