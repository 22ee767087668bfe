//! Where the artefacts of one model run live on disk.
//!
//! ```text
//! <root>/<model>_<tag>/
//!     ascii/<model>-<part>.stl
//!     binary/<model>-<part>.stl
//!     <model>_<tag>.step
//!     <model>_<tag>_parameters.txt
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::OutputError;

/// Short names the document and sidecar are first written under, keeping
/// the temporary paths short before the final rename.
pub const DOCUMENT_TEMP_NAME: &str = "A.step";
pub const SIDECAR_TEMP_NAME: &str = "A.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    model: String,
    tag: String,
    dir: PathBuf,
}

impl OutputLayout {
    pub fn new(root: &Path, model: &str, tag: &str) -> Self {
        Self {
            model: model.to_string(),
            tag: tag.to_string(),
            dir: root.join(format!("{model}_{tag}")),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ascii_dir(&self) -> PathBuf {
        self.dir.join("ascii")
    }

    pub fn binary_dir(&self) -> PathBuf {
        self.dir.join("binary")
    }

    /// `<model>-<part>`, used for file names and as the STL solid name stem.
    pub fn part_name(&self, part: &str) -> String {
        format!("{}-{part}", self.model)
    }

    pub fn ascii_stl(&self, part: &str) -> PathBuf {
        self.ascii_dir().join(format!("{}.stl", self.part_name(part)))
    }

    pub fn binary_stl(&self, part: &str) -> PathBuf {
        self.binary_dir().join(format!("{}.stl", self.part_name(part)))
    }

    pub fn document(&self) -> PathBuf {
        self.dir.join(format!("{}_{}.step", self.model, self.tag))
    }

    pub fn sidecar(&self) -> PathBuf {
        self.dir.join(format!("{}_{}_parameters.txt", self.model, self.tag))
    }

    /// Create the run directory and both STL directories.
    pub fn create(&self) -> Result<(), OutputError> {
        for dir in [self.dir.clone(), self.ascii_dir(), self.binary_dir()] {
            fs::create_dir_all(&dir).map_err(OutputError::io(&dir))?;
        }
        Ok(())
    }
}

/// Write `contents` to `temp_name` inside `dir`, then rename it over `target`.
pub(crate) fn write_then_rename(
    dir: &Path,
    temp_name: &str,
    target: &Path,
    contents: &[u8],
) -> Result<(), OutputError> {
    let temp = dir.join(temp_name);
    fs::write(&temp, contents).map_err(OutputError::io(&temp))?;
    if target.exists() {
        fs::remove_file(target).map_err(OutputError::io(target))?;
    }
    fs::rename(&temp, target).map_err(OutputError::io(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_model_and_tag() {
        let layout = OutputLayout::new(Path::new("/out"), "pillbox_cavity", "Base");
        assert_eq!(layout.dir(), Path::new("/out/pillbox_cavity_Base"));
        assert_eq!(
            layout.ascii_stl("vac"),
            Path::new("/out/pillbox_cavity_Base/ascii/pillbox_cavity-vac.stl")
        );
        assert_eq!(
            layout.binary_stl("shell"),
            Path::new("/out/pillbox_cavity_Base/binary/pillbox_cavity-shell.stl")
        );
        assert_eq!(
            layout.document(),
            Path::new("/out/pillbox_cavity_Base/pillbox_cavity_Base.step")
        );
        assert_eq!(
            layout.sidecar(),
            Path::new("/out/pillbox_cavity_Base/pillbox_cavity_Base_parameters.txt")
        );
    }
}
