//! Context Loader: expands file, directory, and glob arguments into a flat
//! list of `(path, content)` pairs.
//!
//! Files are read whole. Directories are expanded depth-first, children in
//! sorted order, hidden entries skipped. Anything that is not a regular file
//! is listed as a directory, so a missing path fails with
//! [`LoadError::List`].

use std::path::{Path, PathBuf};

use quill_core::LoadError;
use tracing::debug;

/// Characters that make a context argument a glob pattern.
const GLOB_CHARS: [char; 3] = ['*', '?', '['];

/// Ordered file contents gathered for one session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContextMap {
    entries: Vec<(PathBuf, String)>,
}

impl ContextMap {
    pub fn push(&mut self, path: PathBuf, content: String) {
        self.entries.push((path, content));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.entries.iter().map(|(p, c)| (p.as_path(), c.as_str()))
    }

    pub fn paths(&self) -> Vec<&Path> {
        self.entries.iter().map(|(p, _)| p.as_path()).collect()
    }

    /// Text block embedded in the compiled prompt.
    ///
    /// ```text
    /// --- notes/a.md ---
    /// <content of a.md>
    ///
    /// --- notes/b.md ---
    /// <content of b.md>
    /// ```
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(path, content)| format!("--- {} ---\n{content}", path.display()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Where session context comes from.
pub trait ContextSource: Send {
    fn load(&self) -> Result<ContextMap, LoadError>;
}

/// Reads context from the local filesystem.
#[derive(Clone, Debug)]
pub struct FsContextLoader {
    roots: Vec<PathBuf>,
}

impl FsContextLoader {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Build a loader from the command-line context argument.
    ///
    /// Glob patterns are expanded now, so a pattern matching nothing gives
    /// a loader with no roots. Other arguments become the single root.
    pub fn from_arg(arg: &str) -> Result<Self, LoadError> {
        if !arg.contains(GLOB_CHARS) {
            return Ok(Self::new(vec![PathBuf::from(arg)]));
        }

        let paths = glob::glob(arg).map_err(|e| LoadError::Pattern {
            pattern: arg.to_string(),
            message: e.to_string(),
        })?;

        let mut roots = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) => roots.push(path),
                Err(e) => {
                    let path = e.path().to_path_buf();
                    return Err(LoadError::List {
                        path,
                        source: e.into_error(),
                    });
                }
            }
        }
        roots.sort();
        debug!(pattern = arg, matches = roots.len(), "expanded context pattern");
        Ok(Self::new(roots))
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl ContextSource for FsContextLoader {
    fn load(&self) -> Result<ContextMap, LoadError> {
        let mut map = ContextMap::default();
        for root in &self.roots {
            expand(root, &mut map)?;
        }
        debug!(files = map.len(), "context loaded");
        Ok(map)
    }
}

fn expand(path: &Path, map: &mut ContextMap) -> Result<(), LoadError> {
    if path.is_file() {
        let bytes = std::fs::read(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        map.push(
            path.to_path_buf(),
            String::from_utf8_lossy(&bytes).into_owned(),
        );
        return Ok(());
    }

    let list_err = |source| LoadError::List {
        path: path.to_path_buf(),
        source,
    };
    let mut children = Vec::new();
    for entry in std::fs::read_dir(path).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        children.push(entry.path());
    }
    children.sort();

    for child in &children {
        expand(child, map)?;
    }
    Ok(())
}
