//! Cross-file storage for collecting rules.
//!
//! Collection runs in two phases separated by a barrier:
//!
//! 1. every file contributes its info through [`RuleStorage::collect`],
//!    possibly from many threads at once;
//! 2. after [`RuleStorage::seal`], rules read the complete map through
//!    [`RuleStorage::collected`].
//!
//! Reading before the barrier or writing after it is a harness bug and
//! panics.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Stable identity of a file within one run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileId {
    /// A file on disk.
    Path(PathBuf),
    /// An in-memory file.
    Virtual(u64),
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Virtual(id) => write!(f, "<virtual:{id}>"),
        }
    }
}

type ErasedInfo = Arc<dyn Any + Send + Sync>;

/// Per-rule, per-file info gathered in phase 1.
#[derive(Default)]
pub struct RuleStorage {
    entries: RwLock<HashMap<String, BTreeMap<FileId, ErasedInfo>>>,
    sealed: AtomicBool,
}

impl std::fmt::Debug for RuleStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleStorage")
            .field("sealed", &self.is_sealed())
            .finish_non_exhaustive()
    }
}

impl RuleStorage {
    /// Creates an empty, unsealed storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `info` for `file` under `rule_id`.
    ///
    /// # Panics
    ///
    /// Panics if the storage is already sealed.
    pub fn collect<T: Send + Sync + 'static>(&self, rule_id: &str, file: FileId, info: T) {
        assert!(
            !self.is_sealed(),
            "rule storage is sealed; '{rule_id}' tried to collect after the barrier"
        );
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries
            .entry(rule_id.to_string())
            .or_default()
            .insert(file, Arc::new(info));
    }

    /// Marks the end of phase 1.
    pub fn seal(&self) {
        self.sealed.store(true, Ordering::Release);
    }

    /// Returns true once phase 1 has ended.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// Everything collected for `rule_id`, ordered by [`FileId`].
    ///
    /// Entries stored with a different type are skipped.
    ///
    /// # Panics
    ///
    /// Panics if the storage is not sealed yet.
    #[must_use]
    pub fn collected<T: Send + Sync + 'static>(&self, rule_id: &str) -> CollectedInfo<T> {
        assert!(
            self.is_sealed(),
            "rule storage read for '{rule_id}' before every file was collected"
        );
        let entries = self
            .entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let by_file = entries
            .get(rule_id)
            .map(|files| {
                files
                    .iter()
                    .filter_map(|(id, info)| {
                        Arc::clone(info)
                            .downcast::<T>()
                            .ok()
                            .map(|typed| (id.clone(), typed))
                    })
                    .collect()
            })
            .unwrap_or_default();
        CollectedInfo { by_file }
    }
}

/// A read-only snapshot of one rule's collected info.
#[derive(Debug)]
pub struct CollectedInfo<T> {
    by_file: BTreeMap<FileId, Arc<T>>,
}

impl<T> CollectedInfo<T> {
    /// Info for one file.
    #[must_use]
    pub fn get(&self, file: &FileId) -> Option<&T> {
        self.by_file.get(file).map(AsRef::as_ref)
    }

    /// Every file's info in [`FileId`] order.
    pub fn iter(&self) -> impl Iterator<Item = (&FileId, &T)> {
        self.by_file.iter().map(|(id, info)| (id, info.as_ref()))
    }

    /// Number of files that contributed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_file.len()
    }

    /// Returns true if no file contributed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_file.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collected_info_is_ordered_by_file() {
        let storage = RuleStorage::new();
        storage.collect("r", FileId::Path("b.swift".into()), 2u32);
        storage.collect("r", FileId::Path("a.swift".into()), 1u32);
        storage.seal();
        let collected = storage.collected::<u32>("r");
        let values: Vec<u32> = collected.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn unknown_rule_yields_empty_info() {
        let storage = RuleStorage::new();
        storage.seal();
        assert!(storage.collected::<u32>("missing").is_empty());
    }

    #[test]
    fn mismatched_types_are_skipped() {
        let storage = RuleStorage::new();
        storage.collect("r", FileId::Virtual(0), "text".to_string());
        storage.seal();
        assert!(storage.collected::<u32>("r").is_empty());
        assert_eq!(storage.collected::<String>("r").len(), 1);
    }

    #[test]
    fn parallel_collection_keeps_every_file() {
        let storage = RuleStorage::new();
        std::thread::scope(|scope| {
            for i in 0..8u64 {
                let storage = &storage;
                scope.spawn(move || storage.collect("r", FileId::Virtual(i), i));
            }
        });
        storage.seal();
        assert_eq!(storage.collected::<u64>("r").len(), 8);
    }

    #[test]
    #[should_panic(expected = "before every file was collected")]
    fn reading_before_seal_panics() {
        let storage = RuleStorage::new();
        let _ = storage.collected::<u32>("r");
    }

    #[test]
    #[should_panic(expected = "after the barrier")]
    fn collecting_after_seal_panics() {
        let storage = RuleStorage::new();
        storage.seal();
        storage.collect("r", FileId::Virtual(1), 1u32);
    }
}
