use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::super::collection::{Collection, SharedStorage};
use super::super::helpers::{find_by_id, find_by_id_mut, remove_by_id};
use super::super::{contains_ignore_case, PostMutation, PostQuery, PostRepository, Result};
use crate::entities::{Id, NewPost, Post};

pub struct StoredPostRepository {
    posts: Collection<Post>,
}

impl StoredPostRepository {
    pub fn new_with(storage: SharedStorage, namespace: &str, seed: Vec<Post>) -> Self {
        Self {
            posts: Collection::new(storage, namespace, "posts", seed),
        }
    }

    async fn modify(&self, id: Id, f: impl FnOnce(&mut Post) + Send) -> Result<Post> {
        let mut w = self.posts.write().await?;
        let item = find_by_id_mut(&mut w.items, id)?;

        f(item);

        let updated = item.clone();
        w.commit().await?;

        Ok(updated)
    }
}

#[async_trait]
impl PostRepository for StoredPostRepository {
    async fn insert(&self, draft: NewPost, created: DateTime<Utc>) -> Result<Post> {
        let mut w = self.posts.write().await?;

        let NewPost {
            user_id,
            image_url,
            caption,
            hashtags,
        } = draft;
        let post = Post {
            id: w.next_id().await?,
            user_id,
            image_url,
            caption,
            hashtags,
            timestamp: created,
            likes: 0,
            is_liked: false,
            is_saved: false,
            comments: vec![],
        };

        w.items.push(post.clone());
        w.commit().await?;

        Ok(post)
    }

    async fn find(&self, id: Id) -> Result<Post> {
        let posts = self.posts.read().await?;

        Ok(find_by_id(&posts, id)?.clone())
    }

    async fn finds(
        &self,
        PostQuery {
            user_id,
            saved,
            text,
            hashtag,
        }: PostQuery,
    ) -> Result<Vec<Post>> {
        let hashtag = hashtag.map(|h| h.trim_start_matches('#').to_lowercase());

        Ok(self
            .posts
            .read()
            .await?
            .into_iter()
            .filter(|p| user_id.as_ref().map(|u| &p.user_id == u).unwrap_or(true))
            .filter(|p| saved.map(|s| p.is_saved == s).unwrap_or(true))
            .filter(|p| {
                text.as_ref()
                    .map(|t| {
                        contains_ignore_case(&p.caption, t)
                            || p.hashtags.iter().any(|h| contains_ignore_case(h, t))
                    })
                    .unwrap_or(true)
            })
            .filter(|p| {
                hashtag
                    .as_ref()
                    .map(|t| p.hashtags.iter().any(|h| &h.to_lowercase() == t))
                    .unwrap_or(true)
            })
            .collect())
    }

    async fn update(&self, id: Id, mutation: PostMutation) -> Result<Post> {
        let PostMutation {
            image_url,
            caption,
            hashtags,
            likes,
            is_liked,
            is_saved,
        } = mutation;

        self.modify(id, move |item| {
            if let Some(val) = image_url {
                item.image_url = val;
            }
            if let Some(val) = caption {
                item.caption = val;
            }
            if let Some(val) = hashtags {
                item.hashtags = val;
            }
            if let Some(val) = likes {
                item.likes = val;
            }
            if let Some(val) = is_liked {
                item.is_liked = val;
            }
            if let Some(val) = is_saved {
                item.is_saved = val;
            }
        })
        .await
    }

    async fn toggle_liked(&self, id: Id) -> Result<Post> {
        self.modify(id, |item| {
            item.is_liked = !item.is_liked;
            item.likes = match item.is_liked {
                true => item.likes + 1,
                false => item.likes.saturating_sub(1),
            };
        })
        .await
    }

    async fn toggle_saved(&self, id: Id) -> Result<Post> {
        self.modify(id, |item| item.is_saved = !item.is_saved).await
    }

    async fn delete(&self, id: Id) -> Result<Post> {
        let mut w = self.posts.write().await?;
        let removed = remove_by_id(&mut w.items, id)?;
        w.commit().await?;

        Ok(removed)
    }
}
