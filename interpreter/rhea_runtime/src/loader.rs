//! Dynamic library loading for native bindings.
//!
//! First request for a library resolves its name to a path, opens it, and
//! caches the handle in the process-wide registry; later requests reuse the
//! handle. Symbol names arrive in dotted form (`math.cos`) and resolve with
//! dots replaced by underscores (`math_cos`). A missing symbol unloads the
//! library again before reporting.

// The loader is the one place the interpreter talks to raw symbols.
#![allow(
    unsafe_code,
    reason = "dynamic symbol resolution requires the libloading unsafe surface"
)]

use std::path::PathBuf;

use thiserror::Error;

use crate::path_helper::find_shared_library;
use crate::runtime::native_libraries;

/// Failure while loading a library or resolving a symbol.
#[derive(Debug, Error)]
pub enum NativeLoaderError {
    #[error("Cannot find shared library: {name}")]
    LibraryNotFound { name: String },

    #[error("Failed to load library: {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        source: libloading::Error,
    },

    #[error("Cannot resolve symbol `{symbol}` in library: {library}")]
    SymbolNotFound { symbol: String, library: PathBuf },
}

/// Resolve a dotted native name inside `library_name` to a raw symbol
/// address.
///
/// The returned pointer stays valid for the life of the process: the
/// library handle lives in the append-only registry until
/// [`crate::clean_up`] runs at exit.
pub fn load_native_symbol(
    library_name: &str,
    dotted_name: &str,
) -> Result<*const (), NativeLoaderError> {
    let path = find_shared_library(library_name).ok_or_else(|| {
        NativeLoaderError::LibraryNotFound {
            name: library_name.to_string(),
        }
    })?;
    let key = path.to_string_lossy().to_string();
    let symbol_name = dotted_name.replace('.', "_");

    let mut libraries = native_libraries().lock();

    if !libraries.contains_key(&key) {
        tracing::debug!(library = %key, "loading native library");
        // SAFETY: loading a library runs its initialisers; the interpreter
        // trusts installed native modules by design.
        let library = unsafe { libloading::Library::new(&path) }.map_err(|source| {
            NativeLoaderError::OpenFailed {
                path: path.clone(),
                source,
            }
        })?;
        libraries.insert(key.clone(), library);
    }

    let library = &libraries[&key];
    // SAFETY: the symbol is immediately reduced to a raw address; callers
    // cast it to the native ABI signature, which is the loaded library's
    // contract.
    let resolved = unsafe { library.get::<unsafe extern "C" fn()>(symbol_name.as_bytes()) };

    match resolved {
        Ok(symbol) => {
            let address = *symbol as *const ();
            tracing::trace!(symbol = %symbol_name, library = %key, "resolved native symbol");
            Ok(address)
        }
        Err(_) => {
            // Drop the handle again so a bad library does not stay resident.
            libraries.remove(&key);
            Err(NativeLoaderError::SymbolNotFound {
                symbol: symbol_name,
                library: path,
            })
        }
    }
}
