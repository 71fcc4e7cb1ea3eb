use async_trait::async_trait;

use super::super::collection::{Collection, SharedStorage, Slot};
use super::super::helpers::{find_by_id, find_by_id_mut, remove_by_id};
use super::super::{
    contains_ignore_case, RepositoryError, Result, UserMutation, UserQuery, UserRepository,
};
use crate::entities::{Id, NewUser, User};

pub struct StoredUserRepository {
    users: Collection<User>,
    current: Slot<User>,
}

impl StoredUserRepository {
    pub fn new_with(storage: SharedStorage, namespace: &str, seed: Vec<User>) -> Self {
        Self {
            current: Slot::new(storage.clone(), namespace, "current_user"),
            users: Collection::new(storage, namespace, "users", seed),
        }
    }
}

#[async_trait]
impl UserRepository for StoredUserRepository {
    async fn insert(&self, draft: NewUser) -> Result<User> {
        let mut w = self.users.write().await?;

        let NewUser {
            username,
            bio,
            profile_pic,
            followers,
            following,
        } = draft;
        let user = User {
            id: w.next_id().await?,
            username,
            bio,
            profile_pic,
            followers,
            following,
        };

        w.items.push(user.clone());
        w.commit().await?;

        Ok(user)
    }

    async fn find(&self, id: Id) -> Result<User> {
        let users = self.users.read().await?;

        Ok(find_by_id(&users, id)?.clone())
    }

    async fn finds(&self, UserQuery { text }: UserQuery) -> Result<Vec<User>> {
        Ok(self
            .users
            .read()
            .await?
            .into_iter()
            .filter(|u| {
                text.as_ref()
                    .map(|t| contains_ignore_case(&u.username, t) || contains_ignore_case(&u.bio, t))
                    .unwrap_or(true)
            })
            .collect())
    }

    async fn update(&self, id: Id, mutation: UserMutation) -> Result<User> {
        let mut w = self.users.write().await?;
        let item = find_by_id_mut(&mut w.items, id)?;

        let UserMutation {
            username,
            bio,
            profile_pic,
            followers,
            following,
        } = mutation;
        if let Some(val) = username {
            item.username = val;
        }
        if let Some(val) = bio {
            item.bio = val;
        }
        if let Some(val) = profile_pic {
            item.profile_pic = val;
        }
        if let Some(val) = followers {
            item.followers = val;
        }
        if let Some(val) = following {
            item.following = val;
        }

        let updated = item.clone();
        w.commit().await?;

        let _guard = self.current.lock().await;
        if let Some(current) = self.current.get().await? {
            if current.id == id {
                self.current.set(&updated).await?;
            }
        }

        Ok(updated)
    }

    async fn current(&self) -> Result<Option<User>> {
        let _guard = self.current.lock().await;

        if let Some(user) = self.current.get().await? {
            return Ok(Some(user));
        }

        let first = match self.users.seed().first() {
            Some(first) => first,
            None => return Ok(None),
        };

        // the persisted record may already have been updated
        let users = self.users.read().await?;
        let user = match find_by_id(&users, first.id) {
            Ok(u) => u.clone(),
            Err(RepositoryError::NotFound) => first.clone(),
            Err(e) => return Err(e),
        };

        self.current.set(&user).await?;
        Ok(Some(user))
    }

    async fn set_current(&self, id: Id) -> Result<User> {
        let user = self.find(id).await?;

        let _guard = self.current.lock().await;
        self.current.set(&user).await?;

        Ok(user)
    }

    async fn delete(&self, id: Id) -> Result<User> {
        let mut w = self.users.write().await?;
        let removed = remove_by_id(&mut w.items, id)?;
        w.commit().await?;

        Ok(removed)
    }
}
