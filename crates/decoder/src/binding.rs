//! Dynamic binding resolver.
//!
//! Loads a native codec library by trying candidate names/paths in order and
//! resolves entry points by symbol name. Loading goes through `libloading`;
//! symbol lookup goes through the [`SymbolSource`] seam so binding tables can
//! be resolved against anything that maps names to addresses.

use std::ffi::c_void;
use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::{debug, info};

use rd_common::DecodeError;

// ---------------------------------------------------------------------------
// Symbol sources
// ---------------------------------------------------------------------------

/// Anything that maps an exported symbol name to its address.
pub trait SymbolSource {
    /// Address of `name`, or `None` if the symbol is not exported.
    fn raw_symbol(&self, name: &str) -> Option<*mut c_void>;
}

impl SymbolSource for Library {
    fn raw_symbol(&self, name: &str) -> Option<*mut c_void> {
        // SAFETY: the symbol is read as an untyped address; nothing is called
        // or dereferenced here. Typing happens in `SymbolResolver`.
        let address = unsafe { self.get::<*mut c_void>(name.as_bytes()) }.ok()?;
        let address = *address;
        (!address.is_null()).then_some(address)
    }
}

// ---------------------------------------------------------------------------
// Loaded library
// ---------------------------------------------------------------------------

/// A successfully opened native library and where it came from.
pub struct LoadedLibrary {
    library: Library,
    path: PathBuf,
}

impl std::fmt::Debug for LoadedLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedLibrary")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl LoadedLibrary {
    /// Try each candidate in order; the first one that opens wins.
    ///
    /// # Errors
    /// Returns `DecodeError::LibraryNotFound` listing every candidate tried,
    /// with the loader message of the last failure.
    pub fn load_candidate<I, P>(candidates: I) -> Result<Self, DecodeError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut tried = Vec::new();
        let mut last_reason = String::from("no candidate library names");

        for candidate in candidates {
            let candidate = candidate.as_ref();
            debug!(candidate = %candidate.display(), "Trying decoder library");

            // SAFETY: loading a codec library runs its initialisers. The
            // caller chose the candidates and vouches for them.
            match unsafe { Library::new(candidate) } {
                Ok(library) => {
                    info!(path = %candidate.display(), "Decoder library loaded");
                    return Ok(Self {
                        library,
                        path: candidate.to_path_buf(),
                    });
                }
                Err(e) => {
                    tried.push(candidate.display().to_string());
                    last_reason = e.to_string();
                }
            }
        }

        Err(DecodeError::LibraryNotFound {
            tried,
            reason: last_reason,
        })
    }

    /// Load exactly one file.
    pub fn load_file(path: &Path) -> Result<Self, DecodeError> {
        Self::load_candidate([path])
    }

    /// The path (or bare name) the library was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name component of [`path`](Self::path).
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

impl SymbolSource for LoadedLibrary {
    fn raw_symbol(&self, name: &str) -> Option<*mut c_void> {
        self.library.raw_symbol(name)
    }
}

/// Expand library names into an ordered candidate list.
///
/// Every name is tried in each search directory first, then bare so the
/// platform loader applies its own search path.
pub fn candidate_paths(names: &[&str], search_dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = search_dirs
        .iter()
        .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
        .collect();
    candidates.extend(names.iter().map(PathBuf::from));
    candidates
}

/// Directories searched for a codec library: next to the executable, its
/// `decoder/` subdirectory, the `extra` directories, then the working
/// directory. Duplicates are dropped.
pub fn library_search_dirs(extra: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    let mut push = |dir: PathBuf| {
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    };

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        push(exe_dir.clone());
        push(exe_dir.join("decoder"));
    }
    extra.iter().cloned().for_each(&mut push);
    if let Ok(cwd) = std::env::current_dir() {
        push(cwd);
    }
    dirs
}

// ---------------------------------------------------------------------------
// Typed resolution
// ---------------------------------------------------------------------------

/// Resolves symbol names from a source into typed function pointers.
pub struct SymbolResolver<'a, S: SymbolSource + ?Sized> {
    source: &'a S,
    library: &'a str,
}

impl<'a, S: SymbolSource + ?Sized> SymbolResolver<'a, S> {
    /// `library` is only used in error messages.
    pub fn new(source: &'a S, library: &'a str) -> Self {
        Self { source, library }
    }

    /// Resolve a mandatory entry point.
    ///
    /// # Safety
    /// `F` must be a function pointer type matching the exported symbol's
    /// real signature and calling convention.
    pub unsafe fn required<F: Copy>(&self, name: &str) -> Result<F, DecodeError> {
        // SAFETY: forwarded to the caller.
        unsafe { self.optional(name) }.ok_or_else(|| DecodeError::MissingSymbol {
            library: self.library.to_string(),
            symbol: name.to_string(),
        })
    }

    /// Resolve an entry point whose absence only disables a capability.
    ///
    /// # Safety
    /// Same contract as [`required`](Self::required).
    pub unsafe fn optional<F: Copy>(&self, name: &str) -> Option<F> {
        assert_eq!(
            std::mem::size_of::<F>(),
            std::mem::size_of::<*mut c_void>(),
            "symbol type for {name} is not pointer sized"
        );
        let address = self.source.raw_symbol(name)?;
        // SAFETY: size checked above; the caller guarantees `F` is the
        // function pointer type of this symbol.
        Some(unsafe { std::mem::transmute_copy::<*mut c_void, F>(&address) })
    }
}
