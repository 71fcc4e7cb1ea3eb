use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;

use super::latency::{Call, Latency};
use super::story_err_fmt;
use crate::entities::{Id, NewStory, Story, UserStories};
use crate::repositories::{convert_404, StoryMutation, StoryQuery, StoryRepository};
use crate::utils::{creation_time, newest_first, oldest_first, Chain};

pub struct StoryService {
    pub story_repository: Arc<dyn StoryRepository + Sync + Send>,
    pub latency: Arc<dyn Latency + Sync + Send>,
}

impl StoryService {
    async fn finds(&self, query: StoryQuery) -> Result<Vec<Story>> {
        self.latency.pause(Call::Scan).await;

        self.story_repository
            .finds(query)
            .await
            .map_err(story_err_fmt)?
            .also_(|o| tracing::trace!("output - {} stories", o.len()))
            .let_(Ok)
    }

    /// Active stories, newest first. Expired stories stay in storage but are
    /// never returned.
    #[tracing::instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<Story>> {
        let query = StoryQuery {
            active_at: Some(Utc::now()),
            ..Default::default()
        };

        self.finds(query).await?.also_(|v| newest_first(v)).let_(Ok)
    }

    /// Looks a story up whether or not it has expired.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, id: Id) -> Result<Option<Story>> {
        self.latency.pause(Call::Lookup).await;

        convert_404(self.story_repository.find(id).await)
            .map_err(story_err_fmt)?
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }

    /// Active stories of one author (by username), oldest first, in viewing order.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_user(&self, user_id: &str) -> Result<Vec<Story>> {
        let query = StoryQuery {
            user_id: Some(user_id.to_string()),
            active_at: Some(Utc::now()),
        };

        self.finds(query).await?.also_(|v| oldest_first(v)).let_(Ok)
    }

    /// Stamps the draft with a new id and the current time; the story starts
    /// unviewed and expires one story lifetime later.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, draft: NewStory) -> Result<Story> {
        self.latency.pause(Call::Write).await;

        self.story_repository
            .insert(draft, creation_time())
            .await
            .map_err(story_err_fmt)?
            .also_(|o| tracing::debug!("created story {} by {}", o.id, o.user_id))
            .let_(Ok)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update(&self, id: Id, mutation: StoryMutation) -> Result<Option<Story>> {
        self.latency.pause(Call::Write).await;

        convert_404(self.story_repository.update(id, mutation).await)
            .map_err(story_err_fmt)?
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Id) -> Result<()> {
        self.latency.pause(Call::Write).await;

        match convert_404(self.story_repository.delete(id).await).map_err(story_err_fmt)? {
            Some(s) => tracing::debug!("deleted story {}", s.id),
            None => tracing::debug!("story {} already absent", id),
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn mark_viewed(&self, id: Id) -> Result<Option<Story>> {
        self.latency.pause(Call::Toggle).await;

        let mutation = StoryMutation {
            viewed: Some(true),
            ..Default::default()
        };

        convert_404(self.story_repository.update(id, mutation).await)
            .map_err(story_err_fmt)?
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }

    /// Active stories grouped by author for the story bar.
    #[tracing::instrument(skip(self))]
    pub async fn get_active_user_stories(&self) -> Result<Vec<UserStories>> {
        let now = Utc::now();
        let query = StoryQuery {
            active_at: Some(now),
            ..Default::default()
        };

        self.finds(query)
            .await?
            .let_(|stories| UserStories::group_active(stories, now))
            .also_(|o| tracing::trace!("output - {} groups", o.len()))
            .let_(Ok)
    }
}
