//! Session state: everything that lives between one folder load and the
//! next.
//!
//! The session owns the ordered image list, the cursor used for
//! single-image navigation, the configured model identifier, and the
//! resolved ExifTool path. It is held by the interactive loop and replaced
//! wholesale when a new folder is loaded; background workers receive
//! clones of the pieces they need rather than sharing the session itself.

use std::path::{Path, PathBuf};

/// State for one loaded folder.
#[derive(Debug, Clone, Default)]
pub struct Session {
    images: Vec<PathBuf>,
    cursor: usize,
    model: String,
    exiftool: Option<PathBuf>,
}

impl Session {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            images: Vec::new(),
            cursor: 0,
            model: model.into(),
            exiftool: None,
        }
    }

    /// Replaces the image list with a fresh scan result and resets the
    /// cursor to the first image.
    pub fn load_images(&mut self, images: Vec<PathBuf>) {
        self.images = images;
        self.cursor = 0;
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The image under the cursor, if any images are loaded.
    pub fn current_image(&self) -> Option<&Path> {
        self.images.get(self.cursor).map(PathBuf::as_path)
    }

    /// Moves the cursor to the next image. Stops at the last image rather
    /// than wrapping.
    pub fn next_image(&mut self) {
        if self.cursor + 1 < self.images.len() {
            self.cursor += 1;
        }
    }

    /// Moves the cursor to the previous image. Stops at the first image.
    pub fn prev_image(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// The resolved metadata-writer executable, once located.
    pub fn exiftool(&self) -> Option<&Path> {
        self.exiftool.as_deref()
    }

    pub fn set_exiftool(&mut self, path: Option<PathBuf>) {
        self.exiftool = path;
    }

    /// Write operations are only allowed once the writer is resolved.
    pub fn can_write(&self) -> bool {
        self.exiftool.is_some()
    }
}
