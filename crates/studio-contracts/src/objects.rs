use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

const URL_SCHEME: &str = "blob:studio/";

#[derive(Debug, Clone)]
struct StoredObject {
    mime_type: String,
    bytes: Arc<[u8]>,
}

/// In-memory registry of locally addressable byte buffers.
///
/// Every entry is owned by exactly one [`ObjectUrl`]; the entry disappears
/// when that handle is released or dropped.
#[derive(Debug, Clone, Default)]
pub struct ObjectStore {
    inner: Arc<Mutex<HashMap<String, StoredObject>>>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, bytes: impl Into<Arc<[u8]>>, mime_type: &str) -> ObjectUrl {
        let url = format!("{URL_SCHEME}{}", Uuid::new_v4());
        self.entries().insert(
            url.clone(),
            StoredObject {
                mime_type: mime_type.to_string(),
                bytes: bytes.into(),
            },
        );
        ObjectUrl {
            url,
            store: self.clone(),
        }
    }

    /// Bytes and media type behind `url`, or `None` once it was released.
    pub fn resolve(&self, url: &str) -> Option<(String, Arc<[u8]>)> {
        self.entries()
            .get(url)
            .map(|object| (object.mime_type.clone(), object.bytes.clone()))
    }

    pub fn live_count(&self) -> usize {
        self.entries().len()
    }

    fn revoke(&self, url: &str) -> bool {
        self.entries().remove(url).is_some()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, StoredObject>> {
        // The map stays consistent even if a holder panicked mid-insert.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Owned handle to an [`ObjectStore`] entry. Not `Clone`: releasing consumes
/// it, and dropping an unreleased handle revokes the entry.
pub struct ObjectUrl {
    url: String,
    store: ObjectStore,
}

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn mime_type(&self) -> Option<String> {
        self.store.resolve(&self.url).map(|(mime, _)| mime)
    }

    pub fn bytes(&self) -> Option<Arc<[u8]>> {
        self.store.resolve(&self.url).map(|(_, bytes)| bytes)
    }

    pub fn release(self) {
        drop(self);
    }
}

impl fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectUrl").field(&self.url).finish()
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.store.revoke(&self.url);
    }
}
