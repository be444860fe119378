//! Source-tree fingerprinting
//!
//! Hashes a module's source directory together with the target it is built
//! for. Same sources + same target = same fingerprint.

use crate::config::ModuleConfig;
use crate::error::{BuildbarError, BuildbarResult};
use crate::fingerprint::{Fingerprint, FingerprintProvider};
use crate::target::BuildTarget;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Bumped whenever the hashed layout changes
const FORMAT_TAG: &str = "buildbar-fingerprint-v1";

/// Fingerprints modules by hashing every file of their source tree
#[derive(Debug, Clone)]
pub struct SourceTreeFingerprint {
    repos_dir: PathBuf,
    ignore: Vec<String>,
}

impl SourceTreeFingerprint {
    /// Create a provider resolving sources under `repos_dir`
    pub fn new(repos_dir: PathBuf, ignore: Vec<String>) -> Self {
        Self { repos_dir, ignore }
    }

    /// Directory holding the sources of `module`
    pub fn source_dir(&self, module: &str, config: &ModuleConfig) -> PathBuf {
        match (&config.source, &config.repos) {
            (Some(source), _) => crate::config::expand_home(source),
            (None, Some(repos)) => self.repos_dir.join(repos),
            (None, None) => self.repos_dir.join(module),
        }
    }

    fn is_ignored(&self, name: &std::ffi::OsStr) -> bool {
        name.to_str()
            .is_some_and(|name| self.ignore.iter().any(|i| i == name))
    }

    fn hash_tree(&self, module: &str, root: &Path, hasher: &mut Sha256) -> BuildbarResult<usize> {
        let mut files = 0;

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_ignored(entry.file_name()));

        for entry in walker {
            let entry = entry.map_err(|e| BuildbarError::Fingerprint {
                module: module.to_string(),
                reason: e.to_string(),
            })?;
            let file_type = entry.file_type();
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());

            if file_type.is_symlink() && entry.depth() > 0 {
                hash_symlink(entry.path(), relative, hasher)?;
                files += 1;
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            hasher.update(relative.to_string_lossy().as_bytes());
            hasher.update([0]);
            hash_contents(entry.path(), hasher)?;
            files += 1;
        }

        Ok(files)
    }
}

fn hash_contents(path: &Path, hasher: &mut Sha256) -> BuildbarResult<()> {
    let contents = fs::read(path)
        .map_err(|e| BuildbarError::io(format!("reading source file {}", path.display()), e))?;
    hasher.update((contents.len() as u64).to_le_bytes());
    hasher.update(&contents);
    Ok(())
}

/// Links are not followed during the walk; the link target is hashed, and
/// so are the contents when it resolves to a regular file
fn hash_symlink(path: &Path, relative: &Path, hasher: &mut Sha256) -> BuildbarResult<()> {
    let target = fs::read_link(path)
        .map_err(|e| BuildbarError::io(format!("reading link {}", path.display()), e))?;

    hasher.update(b"link\0");
    hasher.update(relative.to_string_lossy().as_bytes());
    hasher.update([0]);
    hasher.update(target.to_string_lossy().as_bytes());
    hasher.update([0]);

    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => hash_contents(path, hasher),
        Ok(_) => Ok(()),
        Err(e) => {
            debug!("Dangling link {}: {}", path.display(), e);
            Ok(())
        }
    }
}

impl FingerprintProvider for SourceTreeFingerprint {
    fn compute(
        &self,
        module: &str,
        config: &ModuleConfig,
        target: &BuildTarget,
    ) -> BuildbarResult<Fingerprint> {
        let root = self.source_dir(module, config);
        if !root.is_dir() {
            return Err(BuildbarError::SourceMissing {
                module: module.to_string(),
                path: root,
            });
        }

        let mut hasher = Sha256::new();
        for part in [
            FORMAT_TAG,
            target.platform.as_str(),
            target.arch.as_deref().unwrap_or(""),
            module,
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0]);
        }

        let mut targets: Vec<String> = config
            .targets
            .iter()
            .map(|t| t.to_ascii_lowercase())
            .collect();
        targets.sort();
        hasher.update(targets.join(",").as_bytes());
        hasher.update([0]);

        let files = self.hash_tree(module, &root, &mut hasher)?;
        let fingerprint = Fingerprint::new(hex::encode(hasher.finalize()));

        debug!(
            "Fingerprinted {} for {} over {} files: {}",
            module,
            target,
            files,
            fingerprint.short()
        );
        Ok(fingerprint)
    }
}
