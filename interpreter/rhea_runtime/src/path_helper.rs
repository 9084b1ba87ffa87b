//! Install-root discovery and the module resolver.
//!
//! Modules live under `<INSTALL_ROOT>/modules/<name>@<version>/` with
//! interpreted sources in `src/` and shared libraries in `lib/`. The
//! install root comes from `RHEA_PATH`, falling back to `N8_PATH`.

use std::path::{Path, PathBuf};

/// Primary environment variable naming the installation root.
pub const ENV_INSTALL_PATH: &str = "RHEA_PATH";
/// Legacy fallback kept for installations of the previous generation.
pub const ENV_INSTALL_PATH_LEGACY: &str = "N8_PATH";

#[cfg(target_os = "macos")]
const SHARED_LIBRARY_EXTENSION: &str = "dylib";
#[cfg(target_os = "windows")]
const SHARED_LIBRARY_EXTENSION: &str = "dll";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const SHARED_LIBRARY_EXTENSION: &str = "so";

/// The installation root, when one is configured.
pub fn installation_path() -> Option<PathBuf> {
    std::env::var_os(ENV_INSTALL_PATH)
        .or_else(|| std::env::var_os(ENV_INSTALL_PATH_LEGACY))
        .map(PathBuf::from)
}

fn module_src_dir(name: &str, version: &str) -> Option<PathBuf> {
    let root = installation_path()?;
    Some(root.join("modules").join(format!("{name}@{version}")).join("src"))
}

/// Does `<root>/modules/<name>@<version>/src` exist?
pub fn is_module_installed(name: &str, version: &str) -> bool {
    module_src_dir(name, version).is_some_and(|dir| dir.is_dir())
}

/// Every interpreted source file of an installed module, sorted by name.
///
/// Both the current `.rhea` suffix and the previous generation's `.n8`
/// are accepted.
pub fn module_source_files(name: &str, version: &str) -> Vec<PathBuf> {
    let Some(dir) = module_src_dir(name, version) else {
        return Vec::new();
    };
    let Ok(entries) = std::fs::read_dir(&dir) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == "rhea" || ext == "n8")
        })
        .collect();
    files.sort();
    files
}

/// Resolve a library name to the shared object to load.
///
/// The current directory is searched first, then every module's `lib/`
/// directory under the install root.
pub fn find_shared_library(name: &str) -> Option<PathBuf> {
    let raw = PathBuf::from(format!("{name}.{SHARED_LIBRARY_EXTENSION}"));
    if raw.exists() {
        return Some(raw);
    }

    let modules = installation_path()?.join("modules");
    let entries = std::fs::read_dir(&modules).ok()?;

    for module in entries.filter_map(Result::ok) {
        let folder_name = module.file_name().to_string_lossy().to_string();
        if !folder_name.starts_with(name) {
            continue;
        }

        let lib_dir = module.path().join("lib");
        let Ok(lib_entries) = std::fs::read_dir(&lib_dir) else {
            continue;
        };
        for entry in lib_entries.filter_map(Result::ok) {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let matches_name = path
                .file_name()
                .is_some_and(|file| file.to_string_lossy().starts_with(name));
            let matches_ext = path
                .extension()
                .is_some_and(|ext| ext == SHARED_LIBRARY_EXTENSION);
            if matches_name && matches_ext {
                return Some(path);
            }
        }
    }

    None
}

/// Hidden from docs; test-only access to the extension in use.
#[doc(hidden)]
pub fn shared_library_extension() -> &'static str {
    SHARED_LIBRARY_EXTENSION
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    fn with_install_root<R>(run: impl FnOnce(&Path) -> R) -> R {
        #[allow(clippy::unwrap_used, reason = "test setup")]
        let root = tempfile::tempdir().unwrap();
        std::env::set_var(ENV_INSTALL_PATH, root.path());
        let result = run(root.path());
        std::env::remove_var(ENV_INSTALL_PATH);
        result
    }

    #[test]
    #[serial]
    fn installation_path_prefers_primary_variable() {
        std::env::set_var(ENV_INSTALL_PATH, "/primary");
        std::env::set_var(ENV_INSTALL_PATH_LEGACY, "/legacy");
        assert_eq!(installation_path(), Some(PathBuf::from("/primary")));

        std::env::remove_var(ENV_INSTALL_PATH);
        assert_eq!(installation_path(), Some(PathBuf::from("/legacy")));

        std::env::remove_var(ENV_INSTALL_PATH_LEGACY);
        assert_eq!(installation_path(), None);
    }

    #[test]
    #[serial]
    #[allow(clippy::unwrap_used, reason = "test setup")]
    fn module_files_are_listed_and_sorted() {
        with_install_root(|root| {
            let src = root.join("modules").join("geo@1.2.0").join("src");
            fs::create_dir_all(&src).unwrap();
            fs::write(src.join("b.rhea"), "").unwrap();
            fs::write(src.join("a.rhea"), "").unwrap();
            fs::write(src.join("legacy.n8"), "").unwrap();
            fs::write(src.join("notes.txt"), "").unwrap();

            assert!(is_module_installed("geo", "1.2.0"));
            assert!(!is_module_installed("geo", "9.9.9"));

            let files = module_source_files("geo", "1.2.0");
            let names: Vec<String> = files
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
                .collect();
            assert_eq!(names, vec!["a.rhea", "b.rhea", "legacy.n8"]);
        });
    }

    #[test]
    #[serial]
    #[allow(clippy::unwrap_used, reason = "test setup")]
    fn shared_library_lookup_scans_module_lib_dirs() {
        with_install_root(|root| {
            let lib = root.join("modules").join("geo@1.2.0").join("lib");
            fs::create_dir_all(&lib).unwrap();
            let file = lib.join(format!("geo.{}", shared_library_extension()));
            fs::write(&file, "").unwrap();

            assert_eq!(find_shared_library("geo"), Some(file));
            assert_eq!(find_shared_library("missing"), None);
        });
    }
}
