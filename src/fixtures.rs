//! Seed data written into a namespace the first time each collection is read.

use anyhow::{Context, Result};

use crate::entities::{Comment, Post, Story, User};

const USERS: &str = include_str!("../fixtures/users.json");
const POSTS: &str = include_str!("../fixtures/posts.json");
const STORIES: &str = include_str!("../fixtures/stories.json");
const COMMENTS: &str = include_str!("../fixtures/comments.json");

#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    /// The first user also seeds the current-user pointer.
    pub users: Vec<User>,
    pub posts: Vec<Post>,
    pub stories: Vec<Story>,
    pub comments: Vec<Comment>,
}

impl Fixtures {
    pub fn empty() -> Self { Self::default() }

    /// The demo data shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Ok(Self {
            users: serde_json::from_str(USERS).context("bundled users")?,
            posts: serde_json::from_str(POSTS).context("bundled posts")?,
            stories: serde_json::from_str(STORIES).context("bundled stories")?,
            comments: serde_json::from_str(COMMENTS).context("bundled comments")?,
        })
    }

    pub fn with_users(mut self, users: Vec<User>) -> Self {
        self.users = users;
        self
    }

    pub fn with_stories(mut self, stories: Vec<Story>) -> Self {
        self.stories = stories;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_data_parses() {
        let f = Fixtures::bundled().unwrap();

        assert_eq!(f.users[0].username, "john_doe");
        assert!(!f.posts.is_empty());
        assert!(!f.stories.is_empty());
        assert!(f.comments.iter().all(|c| f.posts.iter().any(|p| p.id == c.post_id)));
    }
}
