use crate::repos::shared::repo::DeleteResult;
use dosewatch_domain::{Entity, ID};
use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

/// Useful functions for creating inmemory repositories

fn lock<T>(collection: &Mutex<Vec<T>>) -> MutexGuard<'_, Vec<T>> {
    // Recover the data of a poisoned lock
    collection.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Merges `val` into the value with the same key, or inserts it when there
/// is none. Returns the stored value.
pub fn upsert_by<T: Clone, K: Eq, F: Fn(&T) -> K, M: FnOnce(&mut T, &T)>(
    val: &T,
    collection: &Mutex<Vec<T>>,
    key: F,
    merge: M,
) -> T {
    let mut collection = lock(collection);
    let val_key = key(val);
    match collection.iter_mut().find(|item| key(item) == val_key) {
        Some(existing) => {
            merge(existing, val);
            existing.clone()
        }
        None => {
            collection.push(val.clone());
            val.clone()
        }
    }
}

/// Inserts the values whose key is not already taken. The key check and the
/// insert happen under the same lock. Returns the number of inserted values.
pub fn insert_unique_by<T: Clone, K: Eq + Hash, F: Fn(&T) -> K>(
    vals: &[T],
    collection: &Mutex<Vec<T>>,
    key: F,
) -> usize {
    let mut collection = lock(collection);
    let mut taken = collection.iter().map(&key).collect::<HashSet<_>>();
    let mut inserted = 0;
    for val in vals {
        if taken.insert(key(val)) {
            collection.push(val.clone());
            inserted += 1;
        }
    }
    inserted
}

pub fn find<T: Clone + Entity>(val_id: &ID, collection: &Mutex<Vec<T>>) -> Option<T> {
    let collection = lock(collection);
    collection.iter().find(|item| item.id() == val_id).cloned()
}

pub fn find_by<T: Clone + Entity, F: FnMut(&T) -> bool>(
    collection: &Mutex<Vec<T>>,
    mut compare: F,
) -> Vec<T> {
    let collection = lock(collection);
    let mut items = Vec::new();
    for item in collection.iter() {
        if compare(item) {
            items.push(item.clone());
        }
    }
    items
}

/// Runs `update` on the value with the given id while holding the lock.
/// Returns `None` if there is no such value.
pub fn update_one<T: Entity, R, U: FnOnce(&mut T) -> R>(
    val_id: &ID,
    collection: &Mutex<Vec<T>>,
    update: U,
) -> Option<R> {
    let mut collection = lock(collection);
    collection
        .iter_mut()
        .find(|item| item.id() == val_id)
        .map(update)
}

pub fn delete<T: Clone + Entity>(val_id: &ID, collection: &Mutex<Vec<T>>) -> Option<T> {
    let mut collection = lock(collection);
    let index = collection.iter().position(|item| item.id() == val_id)?;
    Some(collection.remove(index))
}

pub fn delete_by<T: Clone + Entity, F: Fn(&T) -> bool>(
    collection: &Mutex<Vec<T>>,
    compare: F,
) -> DeleteResult {
    DeleteResult {
        deleted_count: find_and_delete_by(collection, compare).len() as i64,
    }
}

pub fn find_and_delete_by<T: Clone + Entity, F: Fn(&T) -> bool>(
    collection: &Mutex<Vec<T>>,
    compare: F,
) -> Vec<T> {
    let mut collection = lock(collection);
    let mut deleted_items = Vec::new();
    let mut index = 0;
    while index < collection.len() {
        if compare(&collection[index]) {
            deleted_items.push(collection.remove(index));
        } else {
            index += 1;
        }
    }

    deleted_items
}
