use chrono::{DateTime, SubsecRound, Utc};

use crate::entities::{Comment, Post, Story};

/// Kotlin-style scope functions, used to keep service pipelines flat.
pub(crate) trait Chain: Sized {
    #[inline]
    fn let_<F, R>(self, f: F) -> R
    where F: FnOnce(Self) -> R {
        f(self)
    }

    #[inline]
    fn also_<F, R>(mut self, f: F) -> Self
    where F: FnOnce(&mut Self) -> R {
        f(&mut self);
        self
    }
}
impl<T> Chain for T {}

pub(crate) trait Timestamped {
    fn created(&self) -> DateTime<Utc>;
}
impl Timestamped for Post {
    fn created(&self) -> DateTime<Utc> { self.timestamp }
}
impl Timestamped for Story {
    fn created(&self) -> DateTime<Utc> { self.timestamp }
}
impl Timestamped for Comment {
    fn created(&self) -> DateTime<Utc> { self.timestamp }
}

/// Now, cut to the millisecond precision records are persisted with.
pub(crate) fn creation_time() -> DateTime<Utc> { Utc::now().trunc_subsecs(3) }

// both sorts are stable: equal timestamps keep their stored order

pub(crate) fn newest_first<T: Timestamped>(items: &mut [T]) {
    items.sort_by(|a, b| b.created().cmp(&a.created()));
}

pub(crate) fn oldest_first<T: Timestamped>(items: &mut [T]) {
    items.sort_by_key(|i| i.created());
}
