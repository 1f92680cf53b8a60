//! Attachment model.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A local file to attach, and the name it is shown under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attachment {
    path: PathBuf,
    filename: String,
}

impl Attachment {
    /// Creates an attachment. The file is not touched until send time.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            filename: filename.into(),
        }
    }

    /// Creates an attachment named after the last component of `path`.
    ///
    /// Falls back to `"attachment"` for paths without a file name.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map_or_else(|| "attachment".to_string(), |n| n.to_string_lossy().into_owned());
        Self { path, filename }
    }

    /// Location of the file on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display filename in the message.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }
}
