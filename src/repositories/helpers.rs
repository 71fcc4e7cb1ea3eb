use super::{RepositoryError, Result as RepoResult, StdResult};
use crate::entities::{Id, Record};

fn unique<T>(mut found: Vec<T>) -> RepoResult<T> {
    match found.len() {
        0 => Err(RepositoryError::NotFound),
        1 => Ok(found.remove(0)),
        i => Err(RepositoryError::NoUnique { matched: i as u32 }),
    }
}

pub fn find_by_id<T: Record + ::core::fmt::Debug>(v: &[T], id: Id) -> RepoResult<&T> {
    let found = v.iter().filter(|r| r.id() == id).collect::<Vec<_>>();
    tracing::trace!("found - {:?}", found);

    unique(found)
}

pub fn find_by_id_mut<T: Record + ::core::fmt::Debug>(v: &mut [T], id: Id) -> RepoResult<&mut T> {
    let found = v.iter_mut().filter(|r| r.id() == id).collect::<Vec<_>>();
    tracing::trace!("found - {:?}", found);

    unique(found)
}

pub fn try_remove_target_from_vec<T>(
    vec: &mut Vec<T>,
    is_target: impl Fn(&T) -> bool,
) -> StdResult<T, usize> {
    let mut indexes: Vec<_> = vec
        .iter()
        .enumerate()
        .filter_map(|(i, v)| match is_target(v) {
            true => Some(i),
            false => None,
        })
        .collect();

    match indexes.len() {
        1 => Ok(vec.remove(indexes.remove(0))),
        _ => Err(indexes.len()),
    }
}

pub fn remove_by_id<T: Record>(vec: &mut Vec<T>, id: Id) -> RepoResult<T> {
    try_remove_target_from_vec(vec, |r| r.id() == id).map_err(|matched| match matched {
        0 => RepositoryError::NotFound,
        i => RepositoryError::NoUnique { matched: i as u32 },
    })
}
