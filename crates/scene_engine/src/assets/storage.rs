//! String-keyed content storage

use std::collections::HashMap;

use super::AssetError;

/// Map from content key to item, rejecting duplicate keys
#[derive(Debug, Clone)]
pub struct KeyedStorage<T> {
    items: HashMap<String, T>,
}

impl<T> KeyedStorage<T> {
    /// Create an empty storage
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
        }
    }

    /// Register an item under a new key
    pub fn add(&mut self, key: impl Into<String>, item: T) -> Result<(), AssetError> {
        let key = key.into();
        if self.items.contains_key(&key) {
            return Err(AssetError::DuplicateKey(key));
        }
        self.items.insert(key, item);
        Ok(())
    }

    /// Look up an item
    pub fn get(&self, key: &str) -> Option<&T> {
        self.items.get(key)
    }

    /// Look up an item mutably
    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.items.get_mut(key)
    }

    /// Look up an item, failing with [`AssetError::NotFound`]
    pub fn require(&self, key: &str) -> Result<&T, AssetError> {
        self.get(key).ok_or_else(|| AssetError::NotFound(key.to_owned()))
    }

    /// Remove and return an item
    pub fn remove(&mut self, key: &str) -> Result<T, AssetError> {
        self.items
            .remove(key)
            .ok_or_else(|| AssetError::NotFound(key.to_owned()))
    }

    /// Whether a key is registered
    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the storage is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Registered keys, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Registered items, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Drop every item
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T> Default for KeyedStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}
