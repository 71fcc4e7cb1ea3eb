use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub type Id = u64;

/// A persisted entity addressed by a numeric id.
pub trait Record {
    fn id(&self) -> Id;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "Id")]
    pub id: Id,
    pub username: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_pic: String,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
}

/// `user_id` holds the author's username, not the numeric user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "Id")]
    pub id: Id,
    pub user_id: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub is_saved: bool,
    // never written by the comment service, comments live in their own collection
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryKind {
    Text,
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    #[serde(rename = "Id")]
    pub id: Id,
    pub user_id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: StoryKind,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub viewed: bool,
}

impl Story {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool { self.expires_at > now }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "Id")]
    pub id: Id,
    pub post_id: Id,
    pub user_id: String,
    pub text: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl Record for User {
    fn id(&self) -> Id { self.id }
}
impl Record for Post {
    fn id(&self) -> Id { self.id }
}
impl Record for Story {
    fn id(&self) -> Id { self.id }
}
impl Record for Comment {
    fn id(&self) -> Id { self.id }
}

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub bio: String,
    pub profile_pic: String,
    pub followers: u64,
    pub following: u64,
}

#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub user_id: String,
    pub image_url: String,
    pub caption: String,
    pub hashtags: Vec<String>,
}

impl NewPost {
    /// Builds a draft whose hashtags are taken from the `#words` of `caption`.
    pub fn from_caption(
        user_id: impl Into<String>,
        image_url: impl Into<String>,
        caption: impl Into<String>,
    ) -> Self {
        let caption = caption.into().trim().to_string();

        Self {
            user_id: user_id.into(),
            image_url: image_url.into(),
            hashtags: hashtags_in(&caption),
            caption,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewStory {
    pub user_id: String,
    pub content: String,
    pub kind: StoryKind,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Id,
    pub user_id: String,
    pub text: String,
}

/// Active stories of one user, as shown in the story bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStories {
    pub user_id: String,
    pub stories: Vec<Story>,
    pub has_unviewed: bool,
}

impl UserStories {
    /// Drops expired stories and groups the rest by author.
    ///
    /// Groups keep the order in which their author first appears in `stories`;
    /// stories inside a group are sorted oldest-first.
    pub fn group_active(stories: Vec<Story>, now: DateTime<Utc>) -> Vec<UserStories> {
        let mut groups: Vec<UserStories> = vec![];

        for story in stories.into_iter().filter(|s| s.is_active_at(now)) {
            match groups.iter_mut().find(|g| g.user_id == story.user_id) {
                Some(group) => group.stories.push(story),
                None => groups.push(UserStories {
                    user_id: story.user_id.clone(),
                    stories: vec![story],
                    has_unviewed: false,
                }),
            }
        }

        for group in groups.iter_mut() {
            group.stories.sort_by_key(|s| s.timestamp);
            group.has_unviewed = group.stories.iter().any(|s| !s.viewed);
        }

        groups
    }
}

lazy_static! {
    static ref HASHTAG: Regex = Regex::new(r"#([0-9A-Za-z_]+)").unwrap();
}

/// Lower-cased hashtags of `text` without the leading `#`, in order of appearance.
pub fn hashtags_in(text: &str) -> Vec<String> {
    HASHTAG
        .captures_iter(text)
        .map(|c| c[1].to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn story(id: Id, user: &str, minutes: i64, viewed: bool, now: DateTime<Utc>) -> Story {
        let timestamp = now - Duration::minutes(minutes);
        Story {
            id,
            user_id: user.to_string(),
            content: format!("story {}", id),
            kind: StoryKind::Text,
            timestamp,
            expires_at: timestamp + Duration::hours(24),
            viewed,
        }
    }

    #[test]
    fn groups_by_user_and_flags_unviewed() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let stories = vec![
            story(1, "a", 30, true, now),
            story(2, "b", 10, true, now),
            story(3, "b", 50, false, now),
        ];

        let groups = UserStories::group_active(stories, now);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].user_id, "a");
        assert!(!groups[0].has_unviewed);
        assert_eq!(groups[1].user_id, "b");
        assert!(groups[1].has_unviewed);
        let ids: Vec<_> = groups[1].stories.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn expired_stories_are_left_out_even_when_unviewed() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let stories = vec![
            story(1, "a", 60 * 25, false, now),
            story(2, "b", 5, true, now),
        ];

        let groups = UserStories::group_active(stories, now);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].user_id, "b");
        assert!(!groups[0].has_unviewed);
    }

    #[test]
    fn story_expiring_exactly_now_is_inactive() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let s = story(1, "a", 60 * 24, false, now);
        assert!(!s.is_active_at(now));
    }

    #[test]
    fn extracts_hashtags_lowercased() {
        assert_eq!(
            hashtags_in("Golden hour #Sunset at the #beach_day, #2024!"),
            vec!["sunset", "beach_day", "2024"]
        );
        assert!(hashtags_in("no tags here # alone").is_empty());
    }

    #[test]
    fn new_post_from_caption_trims_and_tags() {
        let draft = NewPost::from_caption("john_doe", "img.jpg", "  Morning run #Fitness  ");
        assert_eq!(draft.caption, "Morning run #Fitness");
        assert_eq!(draft.hashtags, vec!["fitness"]);
    }

    #[test]
    fn post_uses_wire_field_names() {
        let json = r#"{
            "Id": 7,
            "userId": "jane",
            "imageUrl": "x.jpg",
            "caption": "hi",
            "hashtags": ["a"],
            "timestamp": 1714564800000,
            "likes": 3,
            "isLiked": true,
            "isSaved": false,
            "comments": []
        }"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.id, 7);
        assert_eq!(post.user_id, "jane");
        assert_eq!(post.timestamp.timestamp_millis(), 1_714_564_800_000);
        assert!(post.is_liked);

        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["imageUrl"], "x.jpg");
        assert_eq!(value["isSaved"], false);
    }

    #[test]
    fn story_kind_is_persisted_as_type() {
        let json = r#"{"Id":1,"userId":"a","content":"c","type":"image","timestamp":0,"expiresAt":86400000}"#;
        let story: Story = serde_json::from_str(json).unwrap();
        assert_eq!(story.kind, StoryKind::Image);
        assert!(!story.viewed);
        assert_eq!(serde_json::to_value(&story).unwrap()["type"], "image");
    }
}
