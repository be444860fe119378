//! Build-state cache persistence
//!
//! One JSON file per build target records the last fingerprint observed for
//! each module. The cache only moves forward: every evaluation overwrites
//! the previous entry and no history is kept.

use crate::error::{BuildbarError, BuildbarResult};
use crate::fingerprint::Fingerprint;
use crate::target::BuildTarget;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// On-disk representation of a build-state cache
#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    platform: String,
    arch: Option<String>,
    updated_at: DateTime<Utc>,
    modules: BTreeMap<String, Fingerprint>,
}

/// Last-seen fingerprints of modules for one build target
#[derive(Debug, Clone)]
pub struct BuildStateCache {
    path: PathBuf,
    target: BuildTarget,
    entries: BTreeMap<String, Fingerprint>,
    updated_at: Option<DateTime<Utc>>,
}

impl BuildStateCache {
    /// Get the cache file path for `target` under `state_dir`
    pub fn path_for(state_dir: &Path, target: &BuildTarget) -> PathBuf {
        state_dir
            .join("build-states")
            .join(format!("{}.json", target.slug()))
    }

    /// Create an empty cache that will be saved to `path`
    pub fn empty(path: PathBuf, target: BuildTarget) -> Self {
        Self {
            path,
            target,
            entries: BTreeMap::new(),
            updated_at: None,
        }
    }

    /// Load the cache at `path`
    ///
    /// Never fails: a missing file is a cold start, and an unreadable,
    /// corrupt or foreign file is logged and treated as a cold start too.
    pub fn load(path: PathBuf, target: BuildTarget) -> Self {
        if !path.exists() {
            debug!("No build-state cache at {}, cold start", path.display());
            return Self::empty(path, target);
        }

        let file = fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_json::from_str::<CacheFile>(&content).map_err(|e| e.to_string())
            });

        match file {
            Ok(file) if file.platform == target.platform && file.arch == target.arch => {
                debug!(
                    "Loaded {} build states from {}",
                    file.modules.len(),
                    path.display()
                );
                Self {
                    path,
                    target,
                    entries: file.modules,
                    updated_at: Some(file.updated_at),
                }
            }
            Ok(file) => {
                warn!(
                    "Build-state cache {} belongs to {}/{}, ignoring it",
                    path.display(),
                    file.platform,
                    file.arch.as_deref().unwrap_or("noarch")
                );
                Self::empty(path, target)
            }
            Err(reason) => {
                warn!(
                    "Unreadable build-state cache {}: {}, starting cold",
                    path.display(),
                    reason
                );
                Self::empty(path, target)
            }
        }
    }

    /// Last fingerprint recorded for `module`, if any
    pub fn get(&self, module: &str) -> Option<&Fingerprint> {
        self.entries.get(module)
    }

    /// Record `fingerprint` for `module`, replacing any previous value
    pub fn set(&mut self, module: &str, fingerprint: Fingerprint) {
        self.entries.insert(module.to_string(), fingerprint);
    }

    /// Forget `module`, returning its last fingerprint
    pub fn remove(&mut self, module: &str) -> Option<Fingerprint> {
        self.entries.remove(module)
    }

    /// Forget every module
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All entries, sorted by module name
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Fingerprint)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The target this cache is scoped to
    pub fn target(&self) -> &BuildTarget {
        &self.target
    }

    /// File this cache is loaded from and saved to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the cache was last saved, if ever
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Persist the cache, replacing the previous file
    ///
    /// Writes a sibling temp file and renames it over the cache so a crash
    /// never leaves a truncated file behind. A failed write is retried once.
    pub fn save(&mut self) -> BuildbarResult<()> {
        let now = Utc::now();
        let file = CacheFile {
            platform: self.target.platform.clone(),
            arch: self.target.arch.clone(),
            updated_at: now,
            modules: self.entries.clone(),
        };
        let content = serde_json::to_string_pretty(&file)?;

        if let Err(first) = self.write_atomic(&content) {
            warn!(
                "Writing build-state cache {} failed ({}), retrying",
                self.path.display(),
                first
            );
            self.write_atomic(&content)
                .map_err(|source| BuildbarError::CachePersist {
                    path: self.path.clone(),
                    source,
                })?;
        }

        self.updated_at = Some(now);
        debug!(
            "Saved {} build states to {}",
            self.entries.len(),
            self.path.display()
        );
        Ok(())
    }

    fn write_atomic(&self, content: &str) -> std::io::Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "build-states.json".to_string());

        // Unique per writer; dropped (and removed) if the rename fails
        let mut temp = tempfile::Builder::new()
            .prefix(&format!(".{}.", file_name))
            .suffix(".tmp")
            .tempfile_in(parent)?;
        temp.write_all(content.as_bytes())?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ios() -> BuildTarget {
        BuildTarget::new("ios")
    }

    #[test]
    fn path_is_derived_from_target() {
        let path = BuildStateCache::path_for(Path::new("/state"), &ios());
        assert_eq!(path, PathBuf::from("/state/build-states/ios-arm64.json"));

        let path = BuildStateCache::path_for(Path::new("/state"), &BuildTarget::new("linux"));
        assert_eq!(path, PathBuf::from("/state/build-states/linux-noarch.json"));
    }

    #[test]
    fn missing_file_is_cold_start() {
        let temp = TempDir::new().unwrap();
        let cache = BuildStateCache::load(temp.path().join("absent.json"), ios());

        assert!(cache.is_empty());
        assert!(cache.get("core-lib").is_none());
        assert!(cache.updated_at().is_none());
    }

    #[test]
    fn set_overwrites_previous_value() {
        let temp = TempDir::new().unwrap();
        let mut cache = BuildStateCache::empty(temp.path().join("c.json"), ios());

        cache.set("core-lib", Fingerprint::new("old"));
        cache.set("core-lib", Fingerprint::new("new"));

        assert_eq!(cache.get("core-lib"), Some(&Fingerprint::new("new")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = BuildStateCache::path_for(temp.path(), &ios());
        let mut cache = BuildStateCache::empty(path.clone(), ios());
        cache.set("core-lib", Fingerprint::new("abc123"));
        cache.set("core-ui", Fingerprint::new("def456"));

        cache.save().unwrap();
        let loaded = BuildStateCache::load(path, ios());

        let entries: Vec<_> = loaded.entries().collect();
        assert_eq!(
            entries,
            vec![
                ("core-lib", &Fingerprint::new("abc123")),
                ("core-ui", &Fingerprint::new("def456")),
            ]
        );
        assert!(loaded.updated_at().is_some());
    }

    #[test]
    fn empty_cache_roundtrips() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.json");
        BuildStateCache::empty(path.clone(), ios()).save().unwrap();

        let loaded = BuildStateCache::load(path.clone(), ios());
        assert!(loaded.is_empty());
        assert!(path.exists());
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ios-arm64.json");
        let mut cache = BuildStateCache::empty(path, ios());
        cache.set("core-lib", Fingerprint::new("abc"));
        cache.save().unwrap();

        let names: Vec<String> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["ios-arm64.json"]);
    }

    #[test]
    fn overlapping_saves_leave_a_whole_file() {
        let temp = TempDir::new().unwrap();
        let path = BuildStateCache::path_for(temp.path(), &ios());

        let writers: Vec<_> = (0..4)
            .map(|writer| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let mut cache = BuildStateCache::empty(path, ios());
                    for module in 0..50 {
                        cache.set(
                            &format!("module-{}", module),
                            Fingerprint::new(format!("{}-{}", writer, module)),
                        );
                        cache.save().unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        let file: CacheFile = serde_json::from_str(&content).unwrap();
        assert_eq!(file.modules.len(), 50);

        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|name| name.to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn corrupt_file_is_cold_start() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ios-arm64.json");
        fs::write(&path, "{ not json").unwrap();

        let cache = BuildStateCache::load(path, ios());
        assert!(cache.is_empty());
    }

    #[test]
    fn file_of_other_target_is_ignored() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("shared.json");
        let mut android = BuildStateCache::empty(path.clone(), BuildTarget::new("android"));
        android.set("core-lib", Fingerprint::new("abc"));
        android.save().unwrap();

        let cache = BuildStateCache::load(path, ios());
        assert!(cache.is_empty());
    }

    #[test]
    fn save_fails_when_directory_is_unwritable() {
        let temp = TempDir::new().unwrap();
        // A regular file where the parent directory should be
        let blocker = temp.path().join("build-states");
        fs::write(&blocker, "").unwrap();
        let mut cache = BuildStateCache::empty(blocker.join("ios-arm64.json"), ios());

        let err = cache.save().unwrap_err();
        assert!(matches!(err, BuildbarError::CachePersist { .. }));
    }

    #[test]
    fn remove_and_clear() {
        let temp = TempDir::new().unwrap();
        let mut cache = BuildStateCache::empty(temp.path().join("c.json"), ios());
        cache.set("a", Fingerprint::new("1"));
        cache.set("b", Fingerprint::new("2"));

        assert_eq!(cache.remove("a"), Some(Fingerprint::new("1")));
        assert!(cache.get("a").is_none());
        cache.clear();
        assert!(cache.is_empty());
    }
}
