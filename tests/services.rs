mod common;

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use snapflow::entities::{NewComment, NewPost, NewStory, NewUser, Story, StoryKind, User};
use snapflow::repositories::{CommentMutation, PostMutation, StoryMutation, UserMutation};
use snapflow::storage::Storage;
use snapflow::Fixtures;

fn ids<T>(items: &[T], id: impl Fn(&T) -> u64) -> Vec<u64> { items.iter().map(id).collect() }

#[tokio::test]
async fn feed_is_newest_first() {
    let s = common::bundled();

    let feed = s.posts.get_all().await.unwrap();
    assert_eq!(ids(&feed, |p| p.id), vec![6, 5, 4, 3, 2, 1]);
}

#[tokio::test]
async fn created_post_is_found_then_gone_after_delete() {
    let s = common::bundled();

    let post = s
        .posts
        .create(NewPost::from_caption("jane_smith", "x.jpg", "Rainy day #Coffee"))
        .await
        .unwrap();
    assert_eq!(post.id, 7);
    assert_eq!(post.likes, 0);
    assert!(!post.is_liked && !post.is_saved);
    assert!(post.comments.is_empty());
    assert_eq!(post.hashtags, vec!["coffee"]);

    assert_eq!(s.posts.get_by_id(post.id).await.unwrap(), Some(post.clone()));
    assert_eq!(s.posts.get_all().await.unwrap()[0].id, post.id);

    s.posts.delete(post.id).await.unwrap();
    assert_eq!(s.posts.get_by_id(post.id).await.unwrap(), None);

    // deleting again is still fine
    s.posts.delete(post.id).await.unwrap();
}

#[tokio::test]
async fn toggling_like_twice_restores_the_post() {
    let s = common::bundled();
    let before = s.posts.get_by_id(3).await.unwrap().unwrap();

    let once = s.posts.toggle_like(3).await.unwrap().unwrap();
    assert_eq!(once.is_liked, !before.is_liked);
    match once.is_liked {
        true => assert_eq!(once.likes, before.likes + 1),
        false => assert_eq!(once.likes, before.likes - 1),
    }

    let twice = s.posts.toggle_like(3).await.unwrap().unwrap();
    assert_eq!(twice, before);
}

#[tokio::test]
async fn toggling_a_missing_post_is_none() {
    let s = common::bundled();

    assert_eq!(s.posts.toggle_like(99).await.unwrap(), None);
    assert_eq!(s.posts.toggle_save(99).await.unwrap(), None);
}

#[tokio::test]
async fn saved_posts_follow_toggle_save() {
    let s = common::bundled();
    for p in s.posts.get_saved().await.unwrap() {
        s.posts.toggle_save(p.id).await.unwrap();
    }

    s.posts.toggle_save(2).await.unwrap();
    s.posts.toggle_save(5).await.unwrap();

    let saved = s.posts.get_saved().await.unwrap();
    assert_eq!(ids(&saved, |p| p.id), vec![5, 2]);
}

#[tokio::test]
async fn update_merges_only_given_fields() {
    let s = common::bundled();
    let before = s.posts.get_by_id(2).await.unwrap().unwrap();

    let mutation = PostMutation {
        caption: Some("edited".to_string()),
        ..Default::default()
    };
    let after = s.posts.update(2, mutation).await.unwrap().unwrap();

    assert_eq!(after.caption, "edited");
    assert_eq!(after.id, before.id);
    assert_eq!(after.timestamp, before.timestamp);
    assert_eq!(after.hashtags, before.hashtags);
    assert_eq!(s.posts.update(99, PostMutation::default()).await.unwrap(), None);
}

#[tokio::test]
async fn sunset_search_finds_john_doe_posts() {
    let s = common::bundled();

    let found = s.posts.search("SUNSET").await.unwrap();
    assert_eq!(ids(&found, |p| p.id), vec![1, 6]);
    assert!(found.iter().all(|p| p.user_id == "john_doe"));

    let tagged = s.posts.get_by_hashtag("#Sunset").await.unwrap();
    assert_eq!(ids(&tagged, |p| p.id), vec![6, 1]);

    let johns = s.posts.get_by_user("john_doe").await.unwrap();
    assert_eq!(ids(&johns, |p| p.id), vec![6, 1]);
}

#[tokio::test]
async fn hashtag_lookup_is_exact() {
    let s = common::bundled();

    assert!(s.posts.get_by_hashtag("sun").await.unwrap().is_empty());
    let loose = s.posts.search("sun").await.unwrap();
    assert_eq!(ids(&loose, |p| p.id), vec![1, 3, 6]);
}

#[tokio::test]
async fn user_search_covers_username_and_bio() {
    let s = common::bundled();

    let by_name = s.users.search("JANE").await.unwrap();
    assert_eq!(ids(&by_name, |u| u.id), vec![2]);

    let by_bio = s.users.search("golden hours").await.unwrap();
    assert_eq!(by_bio.len(), 1);
    assert_eq!(by_bio[0].username, "john_doe");
}

#[tokio::test]
async fn expired_stories_are_hidden_but_kept() {
    let s = common::bundled();

    let active = s.stories.get_all().await.unwrap();
    assert_eq!(ids(&active, |st| st.id), vec![4, 3, 2, 1]);
    assert!(s.stories.get_by_user("alex_chen").await.unwrap().is_empty());

    // still addressable by id
    assert!(s.stories.get_by_id(5).await.unwrap().is_some());
}

#[tokio::test]
async fn story_bar_groups_active_stories() {
    let s = common::bundled();

    let groups = s.stories.get_active_user_stories().await.unwrap();
    let users: Vec<_> = groups.iter().map(|g| g.user_id.as_str()).collect();
    assert_eq!(users, vec!["jane_smith", "mike_wilson", "sarah_jones"]);

    assert_eq!(ids(&groups[0].stories, |st| st.id), vec![1, 3]);
    assert!(groups[0].has_unviewed);
    assert!(!groups[1].has_unviewed);
    assert!(groups[2].has_unviewed);
}

#[tokio::test]
async fn viewing_a_story_clears_the_unviewed_flag() {
    let s = common::bundled();

    let story = s.stories.mark_viewed(4).await.unwrap().unwrap();
    assert!(story.viewed);

    let groups = s.stories.get_active_user_stories().await.unwrap();
    let sarah = groups.iter().find(|g| g.user_id == "sarah_jones").unwrap();
    assert!(!sarah.has_unviewed);

    assert_eq!(s.stories.mark_viewed(99).await.unwrap(), None);
}

#[tokio::test]
async fn new_story_lives_for_a_day() {
    let s = common::empty();

    let story = s
        .stories
        .create(NewStory {
            user_id: "jane_smith".to_string(),
            content: "hello".to_string(),
            kind: StoryKind::Text,
        })
        .await
        .unwrap();

    assert_eq!(story.expires_at - story.timestamp, Duration::hours(24));
    assert!(!story.viewed);
    assert_eq!(s.stories.get_by_user("jane_smith").await.unwrap(), vec![story]);
}

#[tokio::test]
async fn comments_of_a_post_are_oldest_first() {
    let s = common::bundled();

    let created = s
        .comments
        .create(NewComment {
            post_id: 1,
            user_id: "mike_wilson".to_string(),
            text: "wow".to_string(),
        })
        .await
        .unwrap();

    let thread = s.comments.get_by_post(1).await.unwrap();
    assert_eq!(ids(&thread, |c| c.id), vec![1, 2, created.id]);
    assert!(s.comments.get_by_post(42).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleted_ids_are_not_reused() {
    let s = common::bundled();

    let first = s
        .users
        .create(NewUser {
            username: "temp".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    s.users.delete(first.id).await.unwrap();

    let second = s
        .users
        .create(NewUser {
            username: "temp2".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(second.id > first.id);
}

#[tokio::test]
async fn concurrent_creates_get_distinct_ids() {
    let s = Arc::new(common::empty());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let s = s.clone();
            tokio::spawn(async move {
                s.posts
                    .create(NewPost::from_caption("u", "", format!("post {}", i)))
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut created = vec![];
    for h in handles {
        created.push(h.await.unwrap().id);
    }
    created.sort_unstable();
    created.dedup();
    assert_eq!(created.len(), 8);

    assert_eq!(s.posts.get_all().await.unwrap().len(), 8);
}

#[tokio::test]
async fn current_user_follows_updates() {
    let s = common::bundled();

    let current = s.users.current().await.unwrap().unwrap();
    assert_eq!(current.username, "john_doe");

    let mutation = UserMutation {
        bio: Some("new bio".to_string()),
        ..Default::default()
    };
    s.users.update(current.id, mutation).await.unwrap();
    assert_eq!(s.users.current().await.unwrap().unwrap().bio, "new bio");

    let switched = s.users.switch_current(3).await.unwrap().unwrap();
    assert_eq!(s.users.current().await.unwrap(), Some(switched));
    assert_eq!(s.users.switch_current(99).await.unwrap(), None);
}

#[tokio::test]
async fn no_current_user_without_users() {
    let s = common::empty();

    assert_eq!(s.users.current().await.unwrap(), None);
}

#[tokio::test]
async fn recent_searches_dedupe_and_cap() {
    let s = common::bundled();

    for q in ["a", "b", "c", "d", "e", "f"] {
        s.searches.record(q).await.unwrap();
    }
    assert_eq!(s.searches.recent().await.unwrap(), vec!["f", "e", "d", "c", "b"]);

    let recent = s.searches.record(" d ").await.unwrap();
    assert_eq!(recent, vec!["d", "f", "e", "c", "b"]);

    assert_eq!(s.searches.record("   ").await.unwrap(), recent);

    s.searches.clear().await.unwrap();
    assert!(s.searches.recent().await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupted_collection_is_an_error() {
    let (storage, s) = common::shared(Fixtures::bundled().unwrap());

    storage
        .set("snapflow_posts", "{not json".to_string())
        .await
        .unwrap();

    assert!(s.posts.get_all().await.is_err());
    assert!(s.posts.get_by_id(1).await.is_err());
}

#[tokio::test]
async fn clear_all_reseeds_on_next_access() {
    let (storage, s) = common::shared(Fixtures::bundled().unwrap());

    s.posts.delete(1).await.unwrap();
    s.searches.record("beach").await.unwrap();
    storage.set("other_posts", "[]".to_string()).await.unwrap();

    s.clear_all().await.unwrap();

    let keys = storage.keys().await.unwrap();
    assert_eq!(keys, vec!["other_posts".to_string()]);

    assert_eq!(s.posts.get_all().await.unwrap().len(), 6);
    assert!(s.searches.recent().await.unwrap().is_empty());
}

#[tokio::test]
async fn search_without_match_is_empty() {
    let s = common::bundled();

    assert!(s.posts.search("volcano").await.unwrap().is_empty());
    assert!(s.users.search("volcano").await.unwrap().is_empty());
}

#[tokio::test]
async fn created_post_is_found_by_hashtag_search() {
    let john = User {
        id: 1,
        username: "john_doe".to_string(),
        bio: String::new(),
        profile_pic: String::new(),
        followers: 0,
        following: 0,
    };
    let s = snapflow::in_memory(&common::config(), Fixtures::empty().with_users(vec![john]));

    let author = s.users.current().await.unwrap().unwrap().username;
    let post = s
        .posts
        .create(NewPost {
            user_id: author,
            image_url: "sky.jpg".to_string(),
            caption: "evening".to_string(),
            hashtags: vec!["sunset".to_string()],
        })
        .await
        .unwrap();

    assert_eq!(post.user_id, "john_doe");
    assert_eq!(s.posts.search("SUNSET").await.unwrap(), vec![post]);
}

#[tokio::test]
async fn current_user_reflects_update_made_before_first_read() {
    let s = common::bundled();

    let mutation = UserMutation {
        bio: Some("new bio".to_string()),
        ..Default::default()
    };
    s.users.update(1, mutation).await.unwrap();

    let current = s.users.current().await.unwrap().unwrap();
    assert_eq!(current.id, 1);
    assert_eq!(current.bio, "new bio");
}

#[tokio::test]
async fn current_user_falls_back_to_seed_when_deleted() {
    let s = common::bundled();

    s.users.delete(1).await.unwrap();

    let current = s.users.current().await.unwrap().unwrap();
    assert_eq!(current.username, "john_doe");
}

#[tokio::test]
async fn user_lifecycle() {
    let s = common::bundled();

    let user = s
        .users
        .create(NewUser {
            username: "nina".to_string(),
            bio: "Cyclist".to_string(),
            followers: 3,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(user.id, 6);
    assert_eq!(user.username, "nina");
    assert_eq!(user.followers, 3);
    assert_eq!(s.users.get_by_id(user.id).await.unwrap(), Some(user.clone()));

    s.users.delete(user.id).await.unwrap();
    assert_eq!(s.users.get_by_id(user.id).await.unwrap(), None);
    assert_eq!(s.users.get_all().await.unwrap().len(), 5);
}

#[tokio::test]
async fn story_lifecycle() {
    let s = common::bundled();

    let story = s
        .stories
        .create(NewStory {
            user_id: "alex_chen".to_string(),
            content: "pic.jpg".to_string(),
            kind: StoryKind::Image,
        })
        .await
        .unwrap();
    assert_eq!(story.id, 6);
    assert_eq!(story.kind, StoryKind::Image);
    assert_eq!(s.stories.get_by_id(story.id).await.unwrap(), Some(story.clone()));

    let mutation = StoryMutation {
        content: Some("other.jpg".to_string()),
        ..Default::default()
    };
    let updated = s.stories.update(story.id, mutation).await.unwrap().unwrap();
    assert_eq!(updated.content, "other.jpg");
    assert_eq!(updated.expires_at, story.expires_at);

    s.stories.delete(story.id).await.unwrap();
    assert_eq!(s.stories.get_by_id(story.id).await.unwrap(), None);
    assert!(s.stories.get_by_user("alex_chen").await.unwrap().is_empty());
}

#[tokio::test]
async fn comment_lifecycle() {
    let s = common::bundled();

    let comment = s
        .comments
        .create(NewComment {
            post_id: 3,
            user_id: "jane_smith".to_string(),
            text: "great view".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(comment.id, 6);
    assert_eq!(comment.post_id, 3);
    assert_eq!(s.comments.get_by_id(comment.id).await.unwrap(), Some(comment.clone()));

    let mutation = CommentMutation {
        text: Some("great view!".to_string()),
    };
    let edited = s.comments.update(comment.id, mutation).await.unwrap().unwrap();
    assert_eq!(edited.text, "great view!");
    assert_eq!(edited.timestamp, comment.timestamp);

    s.comments.delete(comment.id).await.unwrap();
    assert_eq!(s.comments.get_by_id(comment.id).await.unwrap(), None);
    assert_eq!(s.comments.get_all().await.unwrap().len(), 5);
}

#[tokio::test]
async fn seeded_expired_story_is_only_reachable_by_id() {
    let created = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let old = Story {
        id: 1,
        user_id: "jane_smith".to_string(),
        content: "gone".to_string(),
        kind: StoryKind::Text,
        timestamp: created,
        expires_at: created + Duration::hours(24),
        viewed: false,
    };
    let s = snapflow::in_memory(&common::config(), Fixtures::empty().with_stories(vec![old.clone()]));

    assert!(s.stories.get_all().await.unwrap().is_empty());
    assert!(s.stories.get_active_user_stories().await.unwrap().is_empty());
    assert_eq!(s.stories.get_by_id(1).await.unwrap(), Some(old));
}
