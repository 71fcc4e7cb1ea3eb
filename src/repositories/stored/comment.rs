use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::super::collection::{Collection, SharedStorage};
use super::super::helpers::{find_by_id, find_by_id_mut, remove_by_id};
use super::super::{CommentMutation, CommentQuery, CommentRepository, Result};
use crate::entities::{Comment, Id, NewComment};

pub struct StoredCommentRepository {
    comments: Collection<Comment>,
}

impl StoredCommentRepository {
    pub fn new_with(storage: SharedStorage, namespace: &str, seed: Vec<Comment>) -> Self {
        Self {
            comments: Collection::new(storage, namespace, "comments", seed),
        }
    }
}

#[async_trait]
impl CommentRepository for StoredCommentRepository {
    async fn insert(&self, draft: NewComment, created: DateTime<Utc>) -> Result<Comment> {
        let mut w = self.comments.write().await?;

        let NewComment {
            post_id,
            user_id,
            text,
        } = draft;
        let comment = Comment {
            id: w.next_id().await?,
            post_id,
            user_id,
            text,
            timestamp: created,
        };

        w.items.push(comment.clone());
        w.commit().await?;

        Ok(comment)
    }

    async fn find(&self, id: Id) -> Result<Comment> {
        let comments = self.comments.read().await?;

        Ok(find_by_id(&comments, id)?.clone())
    }

    async fn finds(&self, CommentQuery { post_id }: CommentQuery) -> Result<Vec<Comment>> {
        Ok(self
            .comments
            .read()
            .await?
            .into_iter()
            .filter(|c| post_id.map(|p| c.post_id == p).unwrap_or(true))
            .collect())
    }

    async fn update(&self, id: Id, CommentMutation { text }: CommentMutation) -> Result<Comment> {
        let mut w = self.comments.write().await?;
        let item = find_by_id_mut(&mut w.items, id)?;

        if let Some(val) = text {
            item.text = val;
        }

        let updated = item.clone();
        w.commit().await?;

        Ok(updated)
    }

    async fn delete(&self, id: Id) -> Result<Comment> {
        let mut w = self.comments.write().await?;
        let removed = remove_by_id(&mut w.items, id)?;
        w.commit().await?;

        Ok(removed)
    }
}
