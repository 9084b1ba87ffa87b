//! Process-wide interpreter state.
//!
//! The mode flags, the loaded-library map, and the file-hash set are global
//! and append-only: libraries stay loaded until [`clean_up`] at process
//! exit, and a file hash, once registered, makes any re-load of identical
//! content a no-op. Everything is initialised lazily on first use.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use libloading::Library;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

static TEST_MODE: AtomicBool = AtomicBool::new(false);
static UNSAFE_MODE: AtomicBool = AtomicBool::new(false);

static NATIVE_LIBRARIES: OnceLock<Mutex<FxHashMap<String, Library>>> = OnceLock::new();
static FILE_HASHES: OnceLock<Mutex<FxHashSet<String>>> = OnceLock::new();

pub(crate) fn native_libraries() -> &'static Mutex<FxHashMap<String, Library>> {
    NATIVE_LIBRARIES.get_or_init(|| Mutex::new(FxHashMap::default()))
}

fn file_hashes() -> &'static Mutex<FxHashSet<String>> {
    FILE_HASHES.get_or_init(|| Mutex::new(FxHashSet::default()))
}

pub fn is_test_mode() -> bool {
    TEST_MODE.load(Ordering::Relaxed)
}

pub fn set_test_mode(enabled: bool) {
    TEST_MODE.store(enabled, Ordering::Relaxed);
}

pub fn is_unsafe_mode() -> bool {
    UNSAFE_MODE.load(Ordering::Relaxed)
}

pub fn set_unsafe_mode(enabled: bool) {
    UNSAFE_MODE.store(enabled, Ordering::Relaxed);
}

/// Register a content hash. Returns `true` when the hash was new.
pub fn add_file_hash(hash: impl Into<String>) -> bool {
    file_hashes().lock().insert(hash.into())
}

pub fn has_file_hash(hash: &str) -> bool {
    file_hashes().lock().contains(hash)
}

/// Unload every native library. Called once at process exit; native
/// function pointers resolved earlier must not be used afterwards.
pub fn clean_up() {
    let mut libraries = native_libraries().lock();
    let count = libraries.len();
    if count > 0 {
        tracing::debug!(count, "unloading native libraries");
    }
    libraries.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn mode_flags_round_trip() {
        set_test_mode(true);
        assert!(is_test_mode());
        set_test_mode(false);
        assert!(!is_test_mode());

        set_unsafe_mode(true);
        assert!(is_unsafe_mode());
        set_unsafe_mode(false);
    }

    #[test]
    fn file_hash_registry_is_first_load_only() {
        assert!(add_file_hash("runtime-test-hash-1"));
        assert!(!add_file_hash("runtime-test-hash-1"));
        assert!(has_file_hash("runtime-test-hash-1"));
        assert!(!has_file_hash("runtime-test-hash-never"));
    }
}
