use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;

use super::data::{Comment, ImageId, Rotation};
use super::store::KeyValueStore;
use crate::error::{GalleryError, Result};

/// Key holding the id -> degrees rotation map
pub const ROTATIONS_KEY: &str = "imageRotations";
/// Key holding the id -> description map
pub const DESCRIPTIONS_KEY: &str = "imageDescriptions";
/// Prefix of the per-image comment list keys
pub const COMMENTS_KEY_PREFIX: &str = "image_comments_";

/// Key of the comment list for one image
pub fn comments_key(id: ImageId) -> String {
    format!("{}{}", COMMENTS_KEY_PREFIX, id)
}

/// The Library is the typed repository over the key-value store.
/// It stores descriptions, comments and rotations as JSON values.
pub struct Library {
    store: Box<dyn KeyValueStore>,
}

impl Library {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Decode the JSON value under `key`, or the default when absent
    fn read<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        match self.store.get(key)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| GalleryError::CorruptValue {
                key: key.to_string(),
                source,
            }),
            None => Ok(T::default()),
        }
    }

    fn write<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(|source| GalleryError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, &raw)
    }

    /// All persisted descriptions keyed by image id
    pub fn descriptions(&self) -> Result<BTreeMap<ImageId, String>> {
        self.read(DESCRIPTIONS_KEY)
    }

    /// Replace the whole description map
    pub fn set_descriptions(&mut self, descriptions: &BTreeMap<ImageId, String>) -> Result<()> {
        self.write(DESCRIPTIONS_KEY, descriptions)
    }

    /// Comments for one image, oldest first
    pub fn comments(&self, id: ImageId) -> Result<Vec<Comment>> {
        self.read(&comments_key(id))
    }

    /// Append a comment and return the updated list
    pub fn append_comment(&mut self, id: ImageId, comment: Comment) -> Result<Vec<Comment>> {
        let key = comments_key(id);
        let mut comments: Vec<Comment> = self.read(&key)?;
        comments.push(comment);
        self.write(&key, &comments)?;
        Ok(comments)
    }

    /// All persisted rotations keyed by image id
    pub fn rotations(&self) -> Result<BTreeMap<ImageId, Rotation>> {
        self.read(ROTATIONS_KEY)
    }

    /// Rotation for one image, zero when none is stored
    pub fn rotation(&self, id: ImageId) -> Result<Rotation> {
        Ok(self.rotations()?.get(&id).copied().unwrap_or_default())
    }

    pub fn set_rotation(&mut self, id: ImageId, rotation: Rotation) -> Result<()> {
        let mut rotations = self.rotations()?;
        rotations.insert(id, rotation);
        self.write(ROTATIONS_KEY, &rotations)
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library").finish_non_exhaustive()
    }
}
