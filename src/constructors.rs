use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::fixtures::Fixtures;
use crate::repositories::stored::{
    StoredCommentRepository, StoredPostRepository, StoredSearchHistory, StoredStoryRepository,
    StoredUserRepository,
};
use crate::services::{
    CommentService, PostService, SearchService, Services, StoryService, UserService,
};
use crate::storage::{FileStorage, MemoryStorage, Storage};

pub fn with_storage(
    storage: Arc<dyn Storage + Sync + Send>,
    config: &Config,
    fixtures: Fixtures,
) -> Services {
    let ns = config.namespace.as_str();
    let latency = config.latency.build();
    let Fixtures {
        users,
        posts,
        stories,
        comments,
    } = fixtures;

    Services {
        users: UserService {
            user_repository: Arc::new(StoredUserRepository::new_with(storage.clone(), ns, users)),
            latency: latency.clone(),
        },
        posts: PostService {
            post_repository: Arc::new(StoredPostRepository::new_with(storage.clone(), ns, posts)),
            latency: latency.clone(),
        },
        stories: StoryService {
            story_repository: Arc::new(StoredStoryRepository::new_with(
                storage.clone(),
                ns,
                stories,
                config.story_ttl(),
            )),
            latency: latency.clone(),
        },
        comments: CommentService {
            comment_repository: Arc::new(StoredCommentRepository::new_with(
                storage.clone(),
                ns,
                comments,
            )),
            latency,
        },
        searches: SearchService {
            history_repository: Arc::new(StoredSearchHistory::new_with(
                storage.clone(),
                ns,
                config.recent_search_limit,
            )),
        },
        storage,
        namespace: config.namespace.clone(),
    }
}

pub fn in_memory(config: &Config, fixtures: Fixtures) -> Services {
    with_storage(Arc::new(MemoryStorage::new()), config, fixtures)
}

pub async fn on_disk(
    dir: impl AsRef<Path>,
    config: &Config,
    fixtures: Fixtures,
) -> ::anyhow::Result<Services> {
    let storage = FileStorage::open(dir).await?;
    tracing::info!("using store at {}", storage.dir().display());

    Ok(with_storage(Arc::new(storage), config, fixtures))
}
