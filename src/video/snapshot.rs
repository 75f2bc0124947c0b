use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::video::types::Frame;

/// Writes before/after still pairs for visual comparison
pub struct SnapshotWriter {
    directory: PathBuf,
}

impl SnapshotWriter {
    /// Use `directory` for snapshots, creating it if needed
    pub fn create<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    pub fn original_path(&self, index: u64) -> PathBuf {
        self.directory.join(format!("frame{}.jpg", index))
    }

    pub fn repaired_path(&self, index: u64) -> PathBuf {
        self.directory.join(format!("frame{}new.jpg", index))
    }

    /// Save the input frame and its repaired version under frame number `index`
    pub fn save_pair(&self, index: u64, original: &Frame, repaired: &Frame) -> Result<()> {
        let original_path = self.original_path(index);
        let repaired_path = self.repaired_path(index);

        original.save(&original_path)?;
        repaired.save(&repaired_path)?;

        debug!("Saved snapshot pair {} and {}", original_path.display(), repaired_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_pair_creates_directory_and_files() {
        let dir = tempdir().unwrap();
        let writer = SnapshotWriter::create(dir.path().join("nested/output")).unwrap();

        let frame = Frame::new_filled(16, 16, [200, 10, 10]);
        writer.save_pair(300, &frame, &frame).unwrap();

        assert!(writer.original_path(300).ends_with("frame300.jpg"));
        assert!(writer.original_path(300).is_file());
        assert!(writer.repaired_path(300).ends_with("frame300new.jpg"));
        assert!(writer.repaired_path(300).is_file());
    }
}
