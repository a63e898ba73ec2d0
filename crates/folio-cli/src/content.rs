// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Filesystem content store.
//!
//! Content identifiers map onto files below the content directory:
//! `blog/hello` is served from `content/blog/hello.md` or
//! `content/blog/hello/index.md`.

use std::path::{Component, Path, PathBuf};

use folio::ContentStore;

/// A [`ContentStore`] backed by a directory of files.
#[derive(Debug, Clone)]
pub struct FileContentStore {
    root: PathBuf,
    extension: String,
}

impl FileContentStore {
    /// Creates a store rooted at `root` for files with `extension` (no dot).
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    /// The content directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves an identifier to the file that holds it.
    pub fn path_for(&self, identifier: &str) -> Option<PathBuf> {
        if !is_safe_identifier(identifier) {
            return None;
        }

        let direct = self.root.join(format!("{}.{}", identifier, self.extension));
        if direct.is_file() {
            return Some(direct);
        }

        let index = self
            .root
            .join(identifier)
            .join(format!("index.{}", self.extension));
        index.is_file().then_some(index)
    }

    /// Reads the content for `identifier`.
    pub fn read(&self, identifier: &str) -> Option<String> {
        let path = self.path_for(identifier)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!("failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// All identifiers in the store, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        let pattern = format!("{}/**/*.{}", self.root.display(), self.extension);
        let entries = match glob::glob(&pattern) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("invalid content glob {}: {}", pattern, e);
                return Vec::new();
            }
        };

        let index_name = format!("index.{}", self.extension);
        let mut identifiers: Vec<String> = entries
            .flatten()
            .filter_map(|path| {
                let relative = path.strip_prefix(&self.root).ok()?;
                let mut parts: Vec<String> = relative
                    .components()
                    .filter_map(|c| c.as_os_str().to_str().map(str::to_string))
                    .collect();
                let file = parts.pop()?;
                if file != index_name {
                    let stem = file.strip_suffix(&format!(".{}", self.extension))?;
                    parts.push(stem.to_string());
                }
                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join("/"))
                }
            })
            .collect();

        identifiers.sort();
        identifiers.dedup();
        identifiers
    }
}

impl ContentStore for FileContentStore {
    fn exists(&self, identifier: &str) -> bool {
        self.path_for(identifier).is_some()
    }
}

fn is_safe_identifier(identifier: &str) -> bool {
    if identifier.is_empty() || identifier.contains('\\') || identifier.contains('\0') {
        return false;
    }
    Path::new(identifier)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}
