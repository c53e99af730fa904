//! GraphQL multipart request assembly.
//!
//! Follows the GraphQL multipart request convention: an `operations` field
//! with the sanitized body, a `map` field relating numbered parts to paths,
//! then one part per file named by its number.

use indexmap::IndexMap;
use reqwest::multipart::{Form, Part};

use crate::{Body, FileMap, Result, Upload};

/// Name of the field holding the sanitized operations.
pub const OPERATIONS_FIELD: &str = "operations";

/// Name of the field relating file parts to paths.
pub const MAP_FIELD: &str = "map";

/// File name sent for uploads that have none.
pub const DEFAULT_FILE_NAME: &str = "blob";

/// A multipart form body, ready to hand to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartBody {
    operations: String,
    map: String,
    files: Vec<(String, Upload)>,
}

impl MultipartBody {
    /// Assemble the form from a sanitized body and its files.
    ///
    /// Files are numbered from 1 in the file map's order; the same number is
    /// the key in `map` and the name of the file part.
    pub fn assemble(clone: &Body, files: &FileMap) -> Result<Self> {
        let operations = serde_json::to_string(clone)?;

        let mut map = IndexMap::with_capacity(files.len());
        let mut parts = Vec::with_capacity(files.len());
        for (index, (upload, paths)) in files.iter().enumerate() {
            let field = (index + 1).to_string();
            map.insert(field.clone(), paths);
            parts.push((field, upload.clone()));
        }

        Ok(Self {
            operations,
            map: serde_json::to_string(&map)?,
            files: parts,
        })
    }

    /// Get the JSON of the `operations` field.
    pub fn operations(&self) -> &str {
        &self.operations
    }

    /// Get the JSON of the `map` field.
    pub fn map(&self) -> &str {
        &self.map
    }

    /// Get the file parts with their field names.
    pub fn files(&self) -> &[(String, Upload)] {
        &self.files
    }

    /// Convert into a reqwest form, keeping field order.
    pub fn into_form(self) -> std::result::Result<Form, reqwest::Error> {
        let mut form = Form::new()
            .text(OPERATIONS_FIELD, self.operations)
            .text(MAP_FIELD, self.map);

        for (field, upload) in self.files {
            let file_name = upload.file_name().unwrap_or(DEFAULT_FILE_NAME).to_string();
            let mut part = Part::stream_with_length(upload.bytes().clone(), upload.len() as u64)
                .file_name(file_name);
            if let Some(content_type) = upload.content_type() {
                part = part.mime_str(content_type.as_ref())?;
            }
            form = form.part(field, part);
        }

        Ok(form)
    }
}
