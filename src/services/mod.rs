//! Asynchronous services the view layer calls.
//!
//! Each service wraps one repository, pauses on the injected [`Latency`]
//! before every call and turns "not found" into `None`. Other repository
//! failures surface as `anyhow` errors with the entity named.

pub mod comment;
pub mod latency;
pub mod post;
pub mod search;
pub mod story;
pub mod user;

use anyhow::{anyhow, Error, Result};

pub use comment::CommentService;
pub use latency::{Call, FixedLatency, Latency, NoLatency};
pub use post::PostService;
pub use search::SearchService;
pub use story::StoryService;
pub use user::UserService;

use crate::repositories::collection::SharedStorage;
use crate::repositories::RepositoryError;

fn user_err_fmt(e: RepositoryError) -> Error { anyhow!("user repository error: {}", e) }

fn post_err_fmt(e: RepositoryError) -> Error { anyhow!("post repository error: {}", e) }

fn story_err_fmt(e: RepositoryError) -> Error { anyhow!("story repository error: {}", e) }

fn comment_err_fmt(e: RepositoryError) -> Error { anyhow!("comment repository error: {}", e) }

fn search_err_fmt(e: RepositoryError) -> Error { anyhow!("search history error: {}", e) }

pub struct Services {
    pub users: UserService,
    pub posts: PostService,
    pub stories: StoryService,
    pub comments: CommentService,
    pub searches: SearchService,
    pub(crate) storage: SharedStorage,
    pub(crate) namespace: String,
}

impl Services {
    pub fn namespace(&self) -> &str { &self.namespace }

    /// Removes every key of the namespace. Collections are seeded again on
    /// their next access.
    #[tracing::instrument(skip(self), fields(namespace = %self.namespace))]
    pub async fn clear_all(&self) -> Result<()> {
        let prefix = format!("{}_", self.namespace);

        let keys = self.storage.keys().await?;
        let mut removed = 0;
        for key in keys.iter().filter(|k| k.starts_with(&prefix)) {
            self.storage.remove(key).await?;
            removed += 1;
        }

        tracing::info!("cleared {} keys", removed);
        Ok(())
    }
}
