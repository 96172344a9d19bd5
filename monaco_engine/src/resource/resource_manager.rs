/// ResourceManager - keyed cache of shared, loaded assets
///
/// One instance is owned by the application and passed by reference to
/// whatever loads assets. Access is single-threaded (`&mut self`).

use std::any::Any;
use std::sync::Arc;
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::render::Device;
use crate::resource::{Resource, ResourceState};

struct CacheEntry {
    resource: Arc<dyn Resource>,
    typed: Arc<dyn Any + Send + Sync>,
}

#[derive(Default)]
pub struct ResourceManager {
    entries: FxHashMap<String, CacheEntry>,
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached resource for `key`, or build, load and init a new one
    ///
    /// `make` constructs the resource and is only called on a cache miss. A
    /// resource that fails `load` or `init` is not cached.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `key` is cached with another resource type,
    /// otherwise the `load` / `init` error of the new resource.
    pub fn get_or_load<T, F>(&mut self, device: &Device, key: &str, file: &str, make: F) -> Result<Arc<T>>
    where
        T: Resource + Any + 'static,
        F: FnOnce() -> T,
    {
        if let Some(entry) = self.entries.get(key) {
            let Ok(existing) = entry.typed.clone().downcast::<T>() else {
                crate::engine_bail!("monaco::ResourceManager", InvalidArgument:
                    "'{}' is already cached as a {:?} resource", key, entry.resource.resource_type());
            };
            if existing.state() == ResourceState::Loaded {
                crate::engine_trace!("monaco::ResourceManager", "Cache hit for '{}'", key);
                return Ok(existing);
            }
        }

        let mut resource = make();
        resource.load(file).map_err(|e| {
            crate::engine_warn!("monaco::ResourceManager", "Loading '{}' from '{}' failed", key, file);
            e
        })?;
        resource.init(device).map_err(|e| {
            crate::engine_warn!("monaco::ResourceManager", "Initializing '{}' failed", key);
            e
        })?;

        crate::engine_info!("monaco::ResourceManager",
            "Loaded '{}' ({:?}, {} bytes)", key, resource.resource_type(), resource.size_in_bytes());

        let resource = Arc::new(resource);
        let displaced = self.entries.insert(key.to_string(), CacheEntry {
            resource: resource.clone(),
            typed: resource.clone(),
        });
        if let Some(entry) = displaced {
            Self::release(key, entry);
        }
        Ok(resource)
    }

    /// Cached resource for `key` without loading; `None` on a miss or a type mismatch
    pub fn get<T: Resource + Any + 'static>(&self, key: &str) -> Option<Arc<T>> {
        let entry = self.entries.get(key)?;
        entry.typed.clone().downcast::<T>().ok()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_size_in_bytes(&self) -> usize {
        self.entries.values().map(|entry| entry.resource.size_in_bytes()).sum()
    }

    /// Unload and evict `key`
    ///
    /// When other owners still hold the resource it is only evicted; its
    /// data is released with the last reference.
    pub fn unload(&mut self, key: &str) {
        if let Some(entry) = self.entries.remove(key) {
            Self::release(key, entry);
        }
    }

    /// Unload and evict every entry
    pub fn unload_all(&mut self) {
        for (key, entry) in self.entries.drain() {
            Self::release(&key, entry);
        }
    }

    fn release(key: &str, entry: CacheEntry) {
        let CacheEntry { mut resource, typed } = entry;
        drop(typed);
        match Arc::get_mut(&mut resource) {
            Some(resource) => resource.unload(),
            None => crate::engine_debug!("monaco::ResourceManager",
                "'{}' evicted while still in use", key),
        }
    }
}

#[cfg(test)]
#[path = "resource_manager_tests.rs"]
mod tests;
