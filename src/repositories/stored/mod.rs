//! Repositories over any [`Storage`](crate::storage::Storage) backend.
//!
//! Every repository keeps its whole collection under one key and rewrites it
//! on each mutation, serialized by the collection's writer lock.

mod comment;
mod post;
mod search;
mod story;
mod user;

pub use comment::StoredCommentRepository;
pub use post::StoredPostRepository;
pub use search::StoredSearchHistory;
pub use story::StoredStoryRepository;
pub use user::StoredUserRepository;
