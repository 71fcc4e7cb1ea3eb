use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    Comment, Id, NewComment, NewPost, NewStory, NewUser, Post, Story, StoryKind, User,
};

pub(crate) mod collection;
pub(crate) mod helpers;
pub mod stored;

pub(crate) type StdResult<T, E> = ::std::result::Result<T, E>;
pub type Result<T> = ::std::result::Result<T, RepositoryError>;

#[async_trait]
pub trait UserRepository {
    async fn insert(&self, draft: NewUser) -> Result<User>;

    async fn find(&self, id: Id) -> Result<User>;
    async fn finds(&self, query: UserQuery) -> Result<Vec<User>>;

    async fn update(&self, id: Id, mutation: UserMutation) -> Result<User>;

    /// The current-user pointer; seeded from the first fixture user when unset.
    async fn current(&self) -> Result<Option<User>>;
    async fn set_current(&self, id: Id) -> Result<User>;

    async fn delete(&self, id: Id) -> Result<User>;
}

#[async_trait]
pub trait PostRepository {
    async fn insert(&self, draft: NewPost, created: DateTime<Utc>) -> Result<Post>;

    async fn find(&self, id: Id) -> Result<Post>;
    async fn finds(&self, query: PostQuery) -> Result<Vec<Post>>;

    async fn update(&self, id: Id, mutation: PostMutation) -> Result<Post>;

    async fn toggle_liked(&self, id: Id) -> Result<Post>;
    async fn toggle_saved(&self, id: Id) -> Result<Post>;

    async fn delete(&self, id: Id) -> Result<Post>;
}

#[async_trait]
pub trait StoryRepository {
    async fn insert(&self, draft: NewStory, created: DateTime<Utc>) -> Result<Story>;

    async fn find(&self, id: Id) -> Result<Story>;
    async fn finds(&self, query: StoryQuery) -> Result<Vec<Story>>;

    async fn update(&self, id: Id, mutation: StoryMutation) -> Result<Story>;

    async fn delete(&self, id: Id) -> Result<Story>;
}

#[async_trait]
pub trait CommentRepository {
    async fn insert(&self, draft: NewComment, created: DateTime<Utc>) -> Result<Comment>;

    async fn find(&self, id: Id) -> Result<Comment>;
    async fn finds(&self, query: CommentQuery) -> Result<Vec<Comment>>;

    async fn update(&self, id: Id, mutation: CommentMutation) -> Result<Comment>;

    async fn delete(&self, id: Id) -> Result<Comment>;
}

#[async_trait]
pub trait SearchHistoryRepository {
    /// Most recent first.
    async fn list(&self) -> Result<Vec<String>>;
    async fn push(&self, query: String) -> Result<Vec<String>>;
    async fn clear(&self) -> Result<()>;
}

/// Every set field must match. Text matching is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    /// Substring of username or bio.
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub user_id: Option<String>,
    pub saved: Option<bool>,
    /// Substring of caption or of any hashtag.
    pub text: Option<String>,
    /// Exact hashtag.
    pub hashtag: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StoryQuery {
    pub user_id: Option<String>,
    pub active_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct CommentQuery {
    pub post_id: Option<Id>,
}

#[derive(Debug, Clone, Default)]
pub struct UserMutation {
    pub username: Option<String>,
    pub bio: Option<String>,
    pub profile_pic: Option<String>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct PostMutation {
    pub image_url: Option<String>,
    pub caption: Option<String>,
    pub hashtags: Option<Vec<String>>,
    pub likes: Option<u64>,
    pub is_liked: Option<bool>,
    pub is_saved: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct StoryMutation {
    pub content: Option<String>,
    pub kind: Option<StoryKind>,
    pub expires_at: Option<DateTime<Utc>>,
    pub viewed: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct CommentMutation {
    pub text: Option<String>,
}

#[derive(Debug)]
pub enum RepositoryError {
    NotFound,
    NoUnique { matched: u32 },
    Internal(anyhow::Error),
}

impl ::std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        match self {
            RepositoryError::NotFound => write!(f, "cannot find object."),
            RepositoryError::NoUnique { matched } => write!(
                f,
                "expected unique object, found non-unique objects (matched: {})",
                matched
            ),
            RepositoryError::Internal(e) => write!(f, "internal error: {}", e),
        }
    }
}

impl ::std::error::Error for RepositoryError {}

impl From<crate::storage::StorageError> for RepositoryError {
    fn from(e: crate::storage::StorageError) -> Self { RepositoryError::Internal(e.into()) }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(e: serde_json::Error) -> Self { RepositoryError::Internal(e.into()) }
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub(crate) fn convert_404<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(t) => Ok(Some(t)),
        Err(RepositoryError::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}
