//! Scoped temp copies of the input spreadsheets
//!
//! Callers handing over transient files (web uploads, attachments saved
//! by another tool) get a per-run staging directory. The copies live
//! exactly as long as the [`StagedFiles`] value: dropping it removes the
//! directory on every exit path, including mid-batch failures.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result, bail};

/// Distinguishes staging directories of runs sharing one process
static STAGE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Owned temp copies of a run's input files
pub struct StagedFiles {
    dir: PathBuf,
    files: Vec<PathBuf>,
}

impl StagedFiles {
    /// Copy the sources into a fresh staging directory under the system
    /// temp dir
    pub fn stage<P: AsRef<Path>>(sources: &[P]) -> Result<Self> {
        let run = STAGE_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "rid-import-stage-{}-{}",
            std::process::id(),
            run
        ));
        Self::stage_in(dir, sources)
    }

    fn stage_in<P: AsRef<Path>>(dir: PathBuf, sources: &[P]) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create staging directory {}", dir.display()))?;

        // Held from here on so an early return still cleans up
        let mut staged = Self {
            dir: dir.clone(),
            files: Vec::new(),
        };

        for (idx, source) in sources.iter().enumerate() {
            let source = source.as_ref();
            let Some(name) = source.file_name() else {
                bail!("{} has no file name to stage under", source.display());
            };
            let mut target = dir.clone();
            target.push(format!("{:02}-{}", idx, name.to_string_lossy()));
            fs::copy(source, &target)
                .with_context(|| format!("Failed to stage {}", source.display()))?;
            staged.files.push(target);
        }

        Ok(staged)
    }

    /// The staged copies, in source order
    pub fn paths(&self) -> &[PathBuf] {
        &self.files
    }
}

impl Drop for StagedFiles {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_dir_all(&self.dir) {
            log::warn!(
                "Could not remove staging directory {}: {}",
                self.dir.display(),
                err
            );
        }
    }
}
