use std::sync::Arc;

use anyhow::Result;

use super::latency::{Call, Latency};
use super::user_err_fmt;
use crate::entities::{Id, NewUser, User};
use crate::repositories::{convert_404, UserMutation, UserQuery, UserRepository};
use crate::utils::Chain;

pub struct UserService {
    pub user_repository: Arc<dyn UserRepository + Sync + Send>,
    pub latency: Arc<dyn Latency + Sync + Send>,
}

impl UserService {
    /// Every user in stored order.
    #[tracing::instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<User>> {
        self.latency.pause(Call::Scan).await;

        self.user_repository
            .finds(UserQuery::default())
            .await
            .map_err(user_err_fmt)?
            .also_(|o| tracing::trace!("output - {} users", o.len()))
            .let_(Ok)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, id: Id) -> Result<Option<User>> {
        self.latency.pause(Call::Lookup).await;

        convert_404(self.user_repository.find(id).await)
            .map_err(user_err_fmt)?
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }

    /// The user new posts, stories and comments are attributed to.
    #[tracing::instrument(skip(self))]
    pub async fn current(&self) -> Result<Option<User>> {
        self.latency.pause(Call::Lookup).await;

        self.user_repository
            .current()
            .await
            .map_err(user_err_fmt)?
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }

    /// Points the current user at `id`; `None` leaves the pointer untouched.
    #[tracing::instrument(skip(self))]
    pub async fn switch_current(&self, id: Id) -> Result<Option<User>> {
        self.latency.pause(Call::Write).await;

        convert_404(self.user_repository.set_current(id).await)
            .map_err(user_err_fmt)?
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create(&self, draft: NewUser) -> Result<User> {
        self.latency.pause(Call::Write).await;

        self.user_repository
            .insert(draft)
            .await
            .map_err(user_err_fmt)?
            .also_(|o| tracing::debug!("created user {} ({})", o.id, o.username))
            .let_(Ok)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update(&self, id: Id, mutation: UserMutation) -> Result<Option<User>> {
        self.latency.pause(Call::Write).await;

        convert_404(self.user_repository.update(id, mutation).await)
            .map_err(user_err_fmt)?
            .also_(|o| tracing::trace!("output - {:?}", o))
            .let_(Ok)
    }

    /// Succeeds whether or not the user existed. Their posts, stories and
    /// comments are kept.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Id) -> Result<()> {
        self.latency.pause(Call::Write).await;

        match convert_404(self.user_repository.delete(id).await).map_err(user_err_fmt)? {
            Some(u) => tracing::debug!("deleted user {} ({})", u.id, u.username),
            None => tracing::debug!("user {} already absent", id),
        }

        Ok(())
    }

    /// Users whose username or bio contains `query`, ignoring case.
    #[tracing::instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<User>> {
        self.latency.pause(Call::Scan).await;

        let query = UserQuery {
            text: Some(query.to_string()),
        };

        self.user_repository
            .finds(query)
            .await
            .map_err(user_err_fmt)?
            .also_(|o| tracing::trace!("output - {} users", o.len()))
            .let_(Ok)
    }
}
