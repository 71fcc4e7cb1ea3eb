use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::super::collection::{Collection, SharedStorage};
use super::super::helpers::{find_by_id, find_by_id_mut, remove_by_id};
use super::super::{Result, StoryMutation, StoryQuery, StoryRepository};
use crate::entities::{Id, NewStory, Story};

pub struct StoredStoryRepository {
    stories: Collection<Story>,
    ttl: Duration,
}

impl StoredStoryRepository {
    /// New stories expire `ttl` after creation.
    pub fn new_with(storage: SharedStorage, namespace: &str, seed: Vec<Story>, ttl: Duration) -> Self {
        Self {
            stories: Collection::new(storage, namespace, "stories", seed),
            ttl,
        }
    }
}

#[async_trait]
impl StoryRepository for StoredStoryRepository {
    async fn insert(&self, draft: NewStory, created: DateTime<Utc>) -> Result<Story> {
        let mut w = self.stories.write().await?;

        let NewStory {
            user_id,
            content,
            kind,
        } = draft;
        let story = Story {
            id: w.next_id().await?,
            user_id,
            content,
            kind,
            timestamp: created,
            expires_at: created + self.ttl,
            viewed: false,
        };

        w.items.push(story.clone());
        w.commit().await?;

        Ok(story)
    }

    async fn find(&self, id: Id) -> Result<Story> {
        let stories = self.stories.read().await?;

        Ok(find_by_id(&stories, id)?.clone())
    }

    async fn finds(&self, StoryQuery { user_id, active_at }: StoryQuery) -> Result<Vec<Story>> {
        Ok(self
            .stories
            .read()
            .await?
            .into_iter()
            .filter(|s| user_id.as_ref().map(|u| &s.user_id == u).unwrap_or(true))
            .filter(|s| active_at.map(|now| s.is_active_at(now)).unwrap_or(true))
            .collect())
    }

    async fn update(&self, id: Id, mutation: StoryMutation) -> Result<Story> {
        let mut w = self.stories.write().await?;
        let item = find_by_id_mut(&mut w.items, id)?;

        let StoryMutation {
            content,
            kind,
            expires_at,
            viewed,
        } = mutation;
        if let Some(val) = content {
            item.content = val;
        }
        if let Some(val) = kind {
            item.kind = val;
        }
        if let Some(val) = expires_at {
            item.expires_at = val;
        }
        if let Some(val) = viewed {
            item.viewed = val;
        }

        let updated = item.clone();
        w.commit().await?;

        Ok(updated)
    }

    async fn delete(&self, id: Id) -> Result<Story> {
        let mut w = self.stories.write().await?;
        let removed = remove_by_id(&mut w.items, id)?;
        w.commit().await?;

        Ok(removed)
    }
}
