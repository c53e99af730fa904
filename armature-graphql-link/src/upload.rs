//! File uploads and file extraction.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use indexmap::IndexMap;
use mime::Mime;
use serde_json::Value;

use crate::{Body, Operation, Result, Variable};

/// A file value carried in operation variables.
///
/// Uploads are compared by identity: clones of one upload are the same file,
/// two uploads with equal content are different files.
#[derive(Clone)]
pub struct Upload {
    inner: Arc<UploadInner>,
}

#[derive(Clone)]
struct UploadInner {
    bytes: Bytes,
    file_name: Option<String>,
    content_type: Option<Mime>,
}

impl Upload {
    /// Create an upload from raw bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            inner: Arc::new(UploadInner {
                bytes: bytes.into(),
                file_name: None,
                content_type: None,
            }),
        }
    }

    /// Create an upload with a file name.
    pub fn named(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self::new(bytes).with_file_name(file_name)
    }

    /// Read an upload from disk, taking the file name and content type from
    /// the path.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;

        let mut upload = Self::new(bytes);
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            upload = upload.with_file_name(name);
        }
        if let Some(mime) = mime_guess::from_path(path).first() {
            upload = upload.with_content_type(mime);
        }
        Ok(upload)
    }

    /// Set the file name. Returns a new upload identity.
    pub fn with_file_name(self, file_name: impl Into<String>) -> Self {
        let mut inner = Arc::unwrap_or_clone(self.inner);
        inner.file_name = Some(file_name.into());
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Set the content type. Returns a new upload identity.
    pub fn with_content_type(self, content_type: Mime) -> Self {
        let mut inner = Arc::unwrap_or_clone(self.inner);
        inner.content_type = Some(content_type);
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Get the file contents.
    pub fn bytes(&self) -> &Bytes {
        &self.inner.bytes
    }

    /// Get the file name.
    pub fn file_name(&self) -> Option<&str> {
        self.inner.file_name.as_deref()
    }

    /// Get the content type.
    pub fn content_type(&self) -> Option<&Mime> {
        self.inner.content_type.as_ref()
    }

    /// Get the size in bytes.
    pub fn len(&self) -> usize {
        self.inner.bytes.len()
    }

    /// Check if the file is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.bytes.is_empty()
    }
}

impl PartialEq for Upload {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Upload {}

impl Hash for Upload {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.inner.file_name)
            .field("content_type", &self.inner.content_type)
            .field("len", &self.inner.bytes.len())
            .finish()
    }
}

/// Where each extracted file occurred, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileMap {
    entries: IndexMap<Upload, Vec<String>>,
}

impl FileMap {
    /// Create an empty file map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `upload` occurred at `path`.
    pub fn insert(&mut self, upload: Upload, path: impl Into<String>) {
        self.entries.entry(upload).or_default().push(path.into());
    }

    /// Get the number of distinct files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no files were found.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the paths recorded for a file.
    pub fn paths(&self, upload: &Upload) -> Option<&[String]> {
        self.entries.get(upload).map(Vec::as_slice)
    }

    /// Iterate over files and their paths in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Upload, &[String])> {
        self.entries.iter().map(|(upload, paths)| (upload, paths.as_slice()))
    }
}

/// Result of file extraction: a sanitized clone and the files taken out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// The body with every file replaced by `null`.
    pub clone: Body,
    /// The files and the paths they were found at.
    pub files: FileMap,
}

/// Adapter that locates file values in a request body.
///
/// Implementations must be deterministic and must leave `body` untouched.
/// Any `Fn(&Body) -> Extraction` closure is an adapter.
pub trait ExtractFiles: Send + Sync {
    /// Return a sanitized clone of `body` and the files it contained.
    fn extract(&self, body: &Body) -> Extraction;
}

impl<F> ExtractFiles for F
where
    F: Fn(&Body) -> Extraction + Send + Sync,
{
    fn extract(&self, body: &Body) -> Extraction {
        self(body)
    }
}

/// Default adapter that finds [`Upload`] values in operation variables.
///
/// Paths are dot separated: `variables.file`, `variables.files.0`, and for
/// batches the operation index comes first (`0.variables.file`).
#[derive(Debug, Clone, Copy, Default)]
pub struct UploadExtractor;

impl ExtractFiles for UploadExtractor {
    fn extract(&self, body: &Body) -> Extraction {
        let mut files = FileMap::new();
        let clone = match body {
            Body::Single(operation) => Body::Single(sanitize_operation(operation, "", &mut files)),
            Body::Batch(operations) => Body::Batch(
                operations
                    .iter()
                    .enumerate()
                    .map(|(i, op)| sanitize_operation(op, &format!("{i}."), &mut files))
                    .collect(),
            ),
        };
        Extraction { clone, files }
    }
}

fn sanitize_operation(operation: &Operation, prefix: &str, files: &mut FileMap) -> Operation {
    Operation {
        operation_name: operation.operation_name.clone(),
        variables: operation
            .variables
            .iter()
            .map(|(name, value)| {
                let path = format!("{prefix}variables.{name}");
                (name.clone(), sanitize(value, path, files))
            })
            .collect(),
        query: operation.query.clone(),
        extensions: operation.extensions.clone(),
    }
}

fn sanitize(value: &Variable, path: String, files: &mut FileMap) -> Variable {
    match value {
        Variable::Upload(upload) => {
            files.insert(upload.clone(), path);
            Variable::Json(Value::Null)
        }
        Variable::List(items) => Variable::List(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| sanitize(item, format!("{path}.{i}"), files))
                .collect(),
        ),
        Variable::Object(fields) => Variable::Object(
            fields
                .iter()
                .map(|(key, item)| (key.clone(), sanitize(item, format!("{path}.{key}"), files)))
                .collect(),
        ),
        Variable::Json(json) => Variable::Json(json.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upload_identity() {
        let a = Upload::named("a.txt", "same");
        let b = Upload::named("a.txt", "same");
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.file_name(), Some("a.txt"));
        assert_eq!(a.len(), 4);
    }

    #[test]
    fn test_file_map_groups_paths() {
        let a = Upload::new("a");
        let b = Upload::new("b");
        let mut files = FileMap::new();
        files.insert(a.clone(), "variables.a");
        files.insert(b.clone(), "variables.b");
        files.insert(a.clone(), "variables.again");

        assert_eq!(files.len(), 2);
        assert_eq!(
            files.paths(&a).unwrap(),
            &["variables.a".to_string(), "variables.again".to_string()]
        );
        let order: Vec<_> = files.iter().map(|(upload, _)| upload.clone()).collect();
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn test_extractor_single_operation() {
        let file = Upload::named("avatar.png", vec![1u8, 2, 3]);
        let body = Body::from(
            Operation::new("mutation($file: Upload!) { upload(file: $file) }")
                .variable("file", file.clone())
                .variable("note", "hi"),
        );

        let Extraction { clone, files } = UploadExtractor.extract(&body);

        assert_eq!(files.len(), 1);
        assert_eq!(files.paths(&file).unwrap(), &["variables.file".to_string()]);
        assert!(!clone.operations()[0].has_uploads());
        assert_eq!(
            serde_json::to_value(&clone).unwrap()["variables"],
            json!({"file": null, "note": "hi"})
        );
        // The input keeps its upload.
        assert!(body.operations()[0].has_uploads());
    }

    #[test]
    fn test_extractor_nested_paths() {
        let first = Upload::new("1");
        let second = Upload::new("2");
        let mut input = IndexMap::new();
        input.insert("doc".to_string(), Variable::from(second.clone()));
        input.insert("title".to_string(), Variable::from("t"));

        let body = Body::from(
            Operation::new("mutation { m }")
                .variable(
                    "files",
                    vec![Variable::from(first.clone()), Variable::from(first.clone())],
                )
                .variable("input", input),
        );

        let extraction = UploadExtractor.extract(&body);
        assert_eq!(
            extraction.files.paths(&first).unwrap(),
            &["variables.files.0".to_string(), "variables.files.1".to_string()]
        );
        assert_eq!(
            extraction.files.paths(&second).unwrap(),
            &["variables.input.doc".to_string()]
        );
    }

    #[test]
    fn test_extractor_batch_paths() {
        let file = Upload::new("x");
        let body = Body::batch(vec![
            Operation::new("{ a }"),
            Operation::new("mutation { b }").variable("file", file.clone()),
        ])
        .unwrap();

        let extraction = UploadExtractor.extract(&body);
        assert!(extraction.clone.is_batch());
        assert_eq!(
            extraction.files.paths(&file).unwrap(),
            &["1.variables.file".to_string()]
        );
    }

    #[test]
    fn test_extractor_without_files() {
        let body = Body::from(Operation::new("{ a }").variable("a", 1i64));
        let extraction = UploadExtractor.extract(&body);
        assert!(extraction.files.is_empty());
        assert_eq!(extraction.clone, body);
    }

    #[tokio::test]
    async fn test_upload_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        tokio::fs::write(&path, b"contents").await.unwrap();

        let upload = Upload::from_path(&path).await.unwrap();
        assert_eq!(upload.file_name(), Some("notes.txt"));
        assert_eq!(upload.content_type(), Some(&mime::TEXT_PLAIN));
        assert_eq!(upload.bytes().as_ref(), b"contents");
    }

    #[tokio::test]
    async fn test_upload_from_missing_path() {
        let result = Upload::from_path("/definitely/not/here.bin").await;
        assert!(matches!(result, Err(crate::LinkError::Io(_))));
    }
}
