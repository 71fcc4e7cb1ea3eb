use std::sync::Arc;

use anyhow::Result;

use super::latency::{Call, Latency};
use super::post_err_fmt;
use crate::entities::{Id, NewPost, Post};
use crate::repositories::{convert_404, PostMutation, PostQuery, PostRepository};
use crate::utils::{creation_time, newest_first, Chain};

pub struct PostService {
    pub post_repository: Arc<dyn PostRepository + Sync + Send>,
    pub latency: Arc<dyn Latency + Sync + Send>,
}

impl PostService {
    async fn finds(&self, query: PostQuery, call: Call) -> Result<Vec<Post>> {
        self.latency.pause(call).await;

        self.post_repository
            .finds(query)
            .await
            .map_err(post_err_fmt)?
            .also_(|o| tracing::trace!("output - {} posts", o.len()))
            .let_(Ok)
    }

    /// The feed, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<Post>> {
        self.finds(PostQuery::default(), Call::Scan)
            .await?
            .also_(|v| newest_first(v))
            .let_(Ok)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, id: Id) -> Result<Option<Post>> {
        self.latency.pause(Call::Lookup).await;

        convert_404(self.post_repository.find(id).await)
            .map_err(post_err_fmt)?
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }

    /// Posts of one author (by username), newest first.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_user(&self, user_id: &str) -> Result<Vec<Post>> {
        let query = PostQuery {
            user_id: Some(user_id.to_string()),
            ..Default::default()
        };

        self.finds(query, Call::Scan)
            .await?
            .also_(|v| newest_first(v))
            .let_(Ok)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_saved(&self) -> Result<Vec<Post>> {
        let query = PostQuery {
            saved: Some(true),
            ..Default::default()
        };

        self.finds(query, Call::Scan)
            .await?
            .also_(|v| newest_first(v))
            .let_(Ok)
    }

    /// Stamps the draft with a new id and the current time; the post starts
    /// unliked, unsaved and without likes.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, draft: NewPost) -> Result<Post> {
        self.latency.pause(Call::Write).await;

        self.post_repository
            .insert(draft, creation_time())
            .await
            .map_err(post_err_fmt)?
            .also_(|o| tracing::debug!("created post {} by {}", o.id, o.user_id))
            .let_(Ok)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update(&self, id: Id, mutation: PostMutation) -> Result<Option<Post>> {
        self.latency.pause(Call::Write).await;

        convert_404(self.post_repository.update(id, mutation).await)
            .map_err(post_err_fmt)?
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }

    /// Succeeds whether or not the post existed. Its comments are kept.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Id) -> Result<()> {
        self.latency.pause(Call::Write).await;

        match convert_404(self.post_repository.delete(id).await).map_err(post_err_fmt)? {
            Some(p) => tracing::debug!("deleted post {}", p.id),
            None => tracing::debug!("post {} already absent", id),
        }

        Ok(())
    }

    /// Flips the liked flag and moves the like count with it.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_like(&self, id: Id) -> Result<Option<Post>> {
        self.latency.pause(Call::Toggle).await;

        convert_404(self.post_repository.toggle_liked(id).await)
            .map_err(post_err_fmt)?
            .also_(|o| {
                if let Some(p) = o {
                    tracing::debug!("post {} liked={} likes={}", p.id, p.is_liked, p.likes)
                }
            })
            .let_(Ok)
    }

    #[tracing::instrument(skip(self))]
    pub async fn toggle_save(&self, id: Id) -> Result<Option<Post>> {
        self.latency.pause(Call::Toggle).await;

        convert_404(self.post_repository.toggle_saved(id).await)
            .map_err(post_err_fmt)?
            .also_(|o| {
                if let Some(p) = o {
                    tracing::debug!("post {} saved={}", p.id, p.is_saved)
                }
            })
            .let_(Ok)
    }

    /// Posts whose caption or any hashtag contains `query`, ignoring case,
    /// in stored order.
    #[tracing::instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Post>> {
        let query = PostQuery {
            text: Some(query.to_string()),
            ..Default::default()
        };

        self.finds(query, Call::Scan).await
    }

    /// Posts carrying `hashtag` exactly (ignoring case and a leading `#`),
    /// newest first.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_hashtag(&self, hashtag: &str) -> Result<Vec<Post>> {
        let query = PostQuery {
            hashtag: Some(hashtag.to_string()),
            ..Default::default()
        };

        self.finds(query, Call::Scan)
            .await?
            .also_(|v| newest_first(v))
            .let_(Ok)
    }
}
