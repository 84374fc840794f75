//! Scratch files owned by a single pipeline run.
//!
//! A [`ScratchFile`] deletes its file when dropped, so every exit path of a
//! run (success, early return through `?`, or panic unwinding) reclaims it.
//! The one file a run hands back to its caller is promoted with
//! [`ScratchFile::keep`].

use std::fmt;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::error::MediaResult;

pub struct ScratchFile {
    path: TempPath,
}

impl ScratchFile {
    /// Create an empty, uniquely named file in `dir`.
    ///
    /// The name is `<prefix><random><suffix>`, so concurrent runs never collide.
    pub fn create_in(dir: impl AsRef<Path>, prefix: &str, suffix: &str) -> MediaResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(dir)?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    /// Take ownership of an existing path; it is deleted on drop from now on.
    pub fn adopt(path: impl Into<PathBuf>) -> Self {
        Self {
            path: TempPath::from_path(path.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Promote the file out of scratch: it survives the drop of this handle.
    pub fn keep(self) -> PathBuf {
        let path = self.path.to_path_buf();
        // Disarms the delete-on-drop; the returned error only reports a failed close
        let _ = self.path.keep();
        path
    }

    /// Move the file over `dest` atomically (same filesystem) and stop tracking it.
    pub fn persist(self, dest: impl AsRef<Path>) -> MediaResult<PathBuf> {
        let dest = dest.as_ref();
        self.path.persist(dest).map_err(|e| e.error)?;
        Ok(dest.to_path_buf())
    }
}

impl AsRef<Path> for ScratchFile {
    fn as_ref(&self) -> &Path {
        self.path()
    }
}

impl fmt::Debug for ScratchFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScratchFile").field(&self.path()).finish()
    }
}
