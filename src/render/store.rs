//! Template lookup in the read-only templates directory

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::core::filename::DOCX_EXTENSION;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Invalid template identifier: {0:?}")]
    InvalidId(String),

    #[error("Failed to read templates directory {path}: {message}")]
    Unreadable { path: PathBuf, message: String },
}

/// Templates keyed by file name under one directory
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an identifier to an existing template file
    ///
    /// Identifiers are plain file names; `.docx` is implied when no extension
    /// is given. Anything that could escape the directory is rejected.
    pub fn resolve(&self, id: &str) -> Result<PathBuf, TemplateError> {
        let id = id.trim();
        if id.is_empty()
            || id.starts_with('.')
            || id.contains(['/', '\\', '\0'])
            || id.contains("..")
        {
            return Err(TemplateError::InvalidId(id.to_string()));
        }

        let file_name = if Path::new(id).extension().is_some() {
            id.to_string()
        } else {
            format!("{}{}", id, DOCX_EXTENSION)
        };

        let path = self.root.join(&file_name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(TemplateError::NotFound(file_name))
        }
    }

    /// File names of the `.docx` templates available, sorted
    pub fn list(&self) -> Result<Vec<String>, TemplateError> {
        if !self.root.is_dir() {
            return Err(TemplateError::Unreadable {
                path: self.root.clone(),
                message: "not a directory".to_string(),
            });
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| TemplateError::Unreadable {
                path: self.root.clone(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            // Word keeps "~$name.docx" lock files next to open documents
            if name.starts_with('.') || name.starts_with("~$") {
                continue;
            }
            if name.to_lowercase().ends_with(DOCX_EXTENSION) {
                names.push(name.into_owned());
            }
        }

        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn store_with(files: &[&str]) -> (TempDir, TemplateStore) {
        let tmp = TempDir::new().unwrap();
        for file in files {
            fs::write(tmp.path().join(file), b"x").unwrap();
        }
        let store = TemplateStore::new(tmp.path());
        (tmp, store)
    }

    #[test]
    fn test_resolve_existing() {
        let (_tmp, store) = store_with(&["recibo_predial.docx"]);
        let path = store.resolve("recibo_predial.docx").unwrap();
        assert!(path.ends_with("recibo_predial.docx"));
    }

    #[test]
    fn test_resolve_adds_extension() {
        let (_tmp, store) = store_with(&["constancia.docx"]);
        let path = store.resolve("constancia").unwrap();
        assert!(path.ends_with("constancia.docx"));
    }

    #[test]
    fn test_resolve_missing() {
        let (_tmp, store) = store_with(&[]);
        match store.resolve("nope.docx") {
            Err(TemplateError::NotFound(name)) => assert_eq!(name, "nope.docx"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let (_tmp, store) = store_with(&["recibo.docx"]);
        for id in ["../recibo.docx", "sub/recibo.docx", "..", ".hidden.docx", "a\\b.docx", ""] {
            assert!(
                matches!(store.resolve(id), Err(TemplateError::InvalidId(_))),
                "{:?} should be rejected",
                id
            );
        }
    }

    #[test]
    fn test_resolve_directory_is_not_a_template() {
        let (tmp, store) = store_with(&[]);
        fs::create_dir(tmp.path().join("carpeta.docx")).unwrap();
        assert!(matches!(
            store.resolve("carpeta.docx"),
            Err(TemplateError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_filters_and_sorts() {
        let (tmp, store) = store_with(&[
            "recibo_predial.docx",
            "constancia.DOCX",
            "~$recibo_predial.docx",
            "notas.txt",
            ".oculto.docx",
        ]);
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("sub").join("otro.docx"), b"x").unwrap();

        assert_eq!(
            store.list().unwrap(),
            vec!["constancia.DOCX".to_string(), "recibo_predial.docx".to_string()]
        );
    }

    #[test]
    fn test_list_missing_dir() {
        let store = TemplateStore::new("/nonexistent/templates");
        assert!(matches!(store.list(), Err(TemplateError::Unreadable { .. })));
    }
}
