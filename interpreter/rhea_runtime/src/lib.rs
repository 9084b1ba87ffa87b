//! Runtime services for the Rhea interpreter.
//!
//! Process-wide state (mode flags, the loaded-library registry, the
//! file-hash set), the dynamic library loader behind native bindings,
//! install-root discovery, and the versioned module resolver.

mod loader;
mod path_helper;
mod runtime;
mod semver;

pub use loader::{load_native_symbol, NativeLoaderError};
pub use path_helper::{
    find_shared_library, installation_path, is_module_installed, module_source_files,
};
pub use runtime::{
    add_file_hash, clean_up, has_file_hash, is_test_mode, is_unsafe_mode, set_test_mode,
    set_unsafe_mode,
};
pub use semver::SemVer;
