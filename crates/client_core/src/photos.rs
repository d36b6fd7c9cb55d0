//! Photos picked during registration, kept in memory until submission.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared::domain::PhotoId;
use tracing::debug;

use crate::error::FlowError;

/// A file as handed over by the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoSource {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PhotoSource {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedPhoto {
    pub id: PhotoId,
    /// Session-local reference used for previews. Meaningless to the server.
    pub preview_ref: String,
    pub source: PhotoSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddPhotosOutcome {
    pub accepted: usize,
    pub discarded: usize,
}

#[derive(Debug, Clone)]
pub struct PhotoStaging {
    capacity: usize,
    photos: Vec<StagedPhoto>,
    cover: Option<PhotoId>,
}

impl PhotoStaging {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            photos: Vec::new(),
            cover: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn photos(&self) -> &[StagedPhoto] {
        &self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.photos.len())
    }

    pub fn cover_id(&self) -> Option<PhotoId> {
        self.cover
    }

    pub fn cover(&self) -> Option<&StagedPhoto> {
        let cover = self.cover?;
        self.photos.iter().find(|photo| photo.id == cover)
    }

    /// Stages as many files as fit; the rest are dropped. The first photo
    /// staged while no cover is set becomes the cover.
    pub fn add_photos(
        &mut self,
        files: impl IntoIterator<Item = PhotoSource>,
    ) -> AddPhotosOutcome {
        let mut outcome = AddPhotosOutcome::default();
        for source in files {
            if self.photos.len() >= self.capacity {
                outcome.discarded += 1;
                continue;
            }
            let id = PhotoId::generate();
            let preview_ref = format!("local://{id}/{}", source.file_name);
            self.photos.push(StagedPhoto {
                id,
                preview_ref,
                source,
            });
            outcome.accepted += 1;
        }

        if self.cover.is_none() {
            self.cover = self.photos.first().map(|photo| photo.id);
        }
        if outcome.discarded > 0 {
            debug!(
                capacity = self.capacity,
                discarded = outcome.discarded,
                "photo staging capacity reached"
            );
        }
        outcome
    }

    pub fn remove_photo(&mut self, id: PhotoId) -> bool {
        let Some(pos) = self.photos.iter().position(|photo| photo.id == id) else {
            return false;
        };
        self.photos.remove(pos);
        if self.cover == Some(id) {
            self.cover = self.photos.first().map(|photo| photo.id);
        }
        true
    }

    pub fn set_cover(&mut self, id: PhotoId) -> bool {
        if self.photos.iter().any(|photo| photo.id == id) {
            self.cover = Some(id);
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.photos.clear();
        self.cover = None;
    }

    /// Inline `data:` URL of the cover, if one is set.
    pub fn encode_cover(&self) -> Result<Option<String>, FlowError> {
        let Some(cover) = self.cover() else {
            return Ok(None);
        };
        if cover.source.bytes.is_empty() {
            return Err(FlowError::PhotoEncoding {
                file_name: cover.source.file_name.clone(),
                reason: "file is empty".to_string(),
            });
        }
        Ok(Some(format!(
            "data:{};base64,{}",
            cover.source.mime_type(),
            STANDARD.encode(&cover.source.bytes)
        )))
    }
}

#[cfg(test)]
#[path = "tests/photos_tests.rs"]
mod tests;
