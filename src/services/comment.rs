use std::sync::Arc;

use anyhow::Result;

use super::comment_err_fmt;
use super::latency::{Call, Latency};
use crate::entities::{Comment, Id, NewComment};
use crate::repositories::{convert_404, CommentMutation, CommentQuery, CommentRepository};
use crate::utils::{creation_time, oldest_first, Chain};

pub struct CommentService {
    pub comment_repository: Arc<dyn CommentRepository + Sync + Send>,
    pub latency: Arc<dyn Latency + Sync + Send>,
}

impl CommentService {
    #[tracing::instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<Comment>> {
        self.latency.pause(Call::Scan).await;

        self.comment_repository
            .finds(CommentQuery::default())
            .await
            .map_err(comment_err_fmt)?
            .also_(|o| tracing::trace!("output - {} comments", o.len()))
            .let_(Ok)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, id: Id) -> Result<Option<Comment>> {
        self.latency.pause(Call::Lookup).await;

        convert_404(self.comment_repository.find(id).await)
            .map_err(comment_err_fmt)?
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }

    /// The thread under a post, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_post(&self, post_id: Id) -> Result<Vec<Comment>> {
        self.latency.pause(Call::Scan).await;

        let query = CommentQuery {
            post_id: Some(post_id),
        };

        self.comment_repository
            .finds(query)
            .await
            .map_err(comment_err_fmt)?
            .also_(|v| oldest_first(v))
            .also_(|o| tracing::trace!("output - {} comments", o.len()))
            .let_(Ok)
    }

    /// The referenced post is not checked for existence.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, draft: NewComment) -> Result<Comment> {
        self.latency.pause(Call::Write).await;

        self.comment_repository
            .insert(draft, creation_time())
            .await
            .map_err(comment_err_fmt)?
            .also_(|o| tracing::debug!("created comment {} on post {}", o.id, o.post_id))
            .let_(Ok)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update(&self, id: Id, mutation: CommentMutation) -> Result<Option<Comment>> {
        self.latency.pause(Call::Write).await;

        convert_404(self.comment_repository.update(id, mutation).await)
            .map_err(comment_err_fmt)?
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Id) -> Result<()> {
        self.latency.pause(Call::Write).await;

        match convert_404(self.comment_repository.delete(id).await).map_err(comment_err_fmt)? {
            Some(c) => tracing::debug!("deleted comment {}", c.id),
            None => tracing::debug!("comment {} already absent", id),
        }

        Ok(())
    }
}
