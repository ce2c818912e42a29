//! # Collection Management
//!
//! Request-level edits on a loaded collection snapshot. The store only works
//! at collection granularity, so every edit here is a read-modify-write: load
//! the full set, mutate it in memory, save the whole set back in one call.

use crate::domain::{Collection, RequestData};
use crate::error::{CollectionError, UpdateError};
use crate::storage::Store;

fn find_index(collections: &[Collection], collection_id: &str) -> Result<usize, CollectionError> {
    collections
        .iter()
        .position(|collection| collection.id == collection_id)
        .ok_or_else(|| CollectionError::CollectionNotFound(collection_id.to_string()))
}

/// Move a request from one collection to the end of another.
///
/// Both collections are checked before anything changes, so a failed move
/// leaves the snapshot as it was. Moving within one collection sends the
/// request to the end of that list.
pub fn move_request(
    collections: &mut [Collection],
    request_id: &str,
    from_collection_id: &str,
    to_collection_id: &str,
) -> Result<(), CollectionError> {
    let from = find_index(collections, from_collection_id)?;
    let to = find_index(collections, to_collection_id)?;

    let position = collections[from]
        .requests
        .iter()
        .position(|request| request.id == request_id)
        .ok_or_else(|| CollectionError::RequestNotFound {
            collection_id: from_collection_id.to_string(),
            request_id: request_id.to_string(),
        })?;

    let request = collections[from].requests.remove(position);
    collections[to].requests.push(request);
    Ok(())
}

/// Replace the request with the same id in place, or append it.
pub fn upsert_request(
    collections: &mut [Collection],
    collection_id: &str,
    request: RequestData,
) -> Result<(), CollectionError> {
    let index = find_index(collections, collection_id)?;
    let requests = &mut collections[index].requests;

    match requests.iter_mut().find(|existing| existing.id == request.id) {
        Some(existing) => *existing = request,
        None => requests.push(request),
    }
    Ok(())
}

pub fn remove_request(
    collections: &mut [Collection],
    collection_id: &str,
    request_id: &str,
) -> Result<RequestData, CollectionError> {
    let index = find_index(collections, collection_id)?;
    let requests = &mut collections[index].requests;

    let position = requests
        .iter()
        .position(|request| request.id == request_id)
        .ok_or_else(|| CollectionError::RequestNotFound {
            collection_id: collection_id.to_string(),
            request_id: request_id.to_string(),
        })?;
    Ok(requests.remove(position))
}

pub fn rename_collection(
    collections: &mut [Collection],
    collection_id: &str,
    name: impl Into<String>,
) -> Result<(), CollectionError> {
    let index = find_index(collections, collection_id)?;
    collections[index].name = name.into();
    Ok(())
}

/// Rename a saved request; every other field is left as saved.
pub fn rename_request(
    collections: &mut [Collection],
    collection_id: &str,
    request_id: &str,
    name: impl Into<String>,
) -> Result<(), CollectionError> {
    let index = find_index(collections, collection_id)?;
    let request = collections[index]
        .requests
        .iter_mut()
        .find(|request| request.id == request_id)
        .ok_or_else(|| CollectionError::RequestNotFound {
            collection_id: collection_id.to_string(),
            request_id: request_id.to_string(),
        })?;
    request.name = name.into();
    Ok(())
}

/// Store-backed [`move_request`]: one snapshot, one save of the full set.
pub fn move_saved_request(
    store: &Store,
    request_id: &str,
    from_collection_id: &str,
    to_collection_id: &str,
) -> Result<(), UpdateError> {
    store.update_collections(|collections| {
        move_request(collections, request_id, from_collection_id, to_collection_id)?;
        Ok(())
    })
}

pub fn save_request(store: &Store, collection_id: &str, request: RequestData) -> Result<(), UpdateError> {
    store.update_collections(|collections| {
        upsert_request(collections, collection_id, request)?;
        Ok(())
    })
}

pub fn delete_saved_request(
    store: &Store,
    collection_id: &str,
    request_id: &str,
) -> Result<RequestData, UpdateError> {
    store.update_collections(|collections| Ok(remove_request(collections, collection_id, request_id)?))
}

pub fn rename_saved_collection(store: &Store, collection_id: &str, name: &str) -> Result<(), UpdateError> {
    store.update_collections(|collections| Ok(rename_collection(collections, collection_id, name)?))
}

pub fn rename_saved_request(
    store: &Store,
    collection_id: &str,
    request_id: &str,
    name: &str,
) -> Result<(), UpdateError> {
    store.update_collections(|collections| Ok(rename_request(collections, collection_id, request_id, name)?))
}

/// Look up a saved request by collection and request id.
pub fn find_request<'a>(
    collections: &'a [Collection],
    collection_id: &str,
    request_id: &str,
) -> Result<&'a RequestData, CollectionError> {
    let index = find_index(collections, collection_id)?;
    collections[index]
        .find_request(request_id)
        .ok_or_else(|| CollectionError::RequestNotFound {
            collection_id: collection_id.to_string(),
            request_id: request_id.to_string(),
        })
}
