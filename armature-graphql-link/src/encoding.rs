//! Request body shape selection.
//!
//! Reconciles the HTTP method, batching and multipart upload into exactly one
//! [`BodyShape`]. Incompatible combinations are rejected before any encoding
//! work happens, in this order:
//!
//! 1. upload with a batch,
//! 2. upload with a method that has no body,
//! 3. upload without an extraction adapter,
//! 4. batch with a method that has no body.
//!
//! An upload request for a single operation whose adapter finds no files
//! falls back to the plain encoding of the sanitized clone. A batch is always
//! rejected with upload, even if it holds no files.

use http::Method;
use serde_json::Value;
use tracing::debug;

use crate::{
    Body, ExtractFiles, Extraction, Incompatibility, LinkError, MultipartBody, Operation, Result,
};

/// Operation fields that are JSON encoded when sent as query parameters.
const STRINGIFIED_PARAMS: [&str; 2] = ["variables", "extensions"];

/// How a request carries its operations.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyShape {
    /// Operation fields as URL query parameters.
    QueryString(Vec<(String, String)>),
    /// A single operation as a JSON body.
    Json(Operation),
    /// A batch as a JSON array body.
    Batch(Vec<Operation>),
    /// A multipart form with file parts.
    Multipart(MultipartBody),
}

impl BodyShape {
    /// Short name of the shape, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::QueryString(_) => "query-string",
            Self::Json(_) => "json",
            Self::Batch(_) => "batch",
            Self::Multipart(_) => "multipart",
        }
    }
}

/// Check if the method carries a request body (POST, PUT or PATCH, in any case).
pub fn is_body_bearing(method: &Method) -> bool {
    ["POST", "PUT", "PATCH"]
        .iter()
        .any(|m| method.as_str().eq_ignore_ascii_case(m))
}

/// Normalize a method name to upper case.
pub fn normalize_method(method: Method) -> Method {
    if method.as_str().bytes().any(|b| b.is_ascii_lowercase()) {
        Method::from_bytes(method.as_str().to_ascii_uppercase().as_bytes()).unwrap_or(method)
    } else {
        method
    }
}

/// Select the body shape for a request.
pub fn select_shape(
    method: &Method,
    body: Body,
    use_multipart: bool,
    extract_files: Option<&dyn ExtractFiles>,
) -> Result<BodyShape> {
    let body_bearing = is_body_bearing(method);
    let mut body = body;

    if use_multipart {
        if body.is_batch() {
            return Err(reject(Incompatibility::UploadWithBatching));
        }
        if !body_bearing {
            return Err(reject(Incompatibility::UploadWithQueryString));
        }
        let Some(extractor) = extract_files else {
            debug!("Rejecting file upload without an extraction adapter");
            return Err(LinkError::MissingAdapter);
        };

        let Extraction { clone, files } = extractor.extract(&body);
        if !files.is_empty() {
            debug!(files = files.len(), "Encoding operation as multipart form");
            return Ok(BodyShape::Multipart(MultipartBody::assemble(&clone, &files)?));
        }

        debug!("No files found, sending the operation without multipart");
        body = clone;
    }

    match body {
        Body::Batch(_) if !body_bearing => Err(reject(Incompatibility::BatchingWithQueryString)),
        Body::Batch(operations) => Ok(BodyShape::Batch(operations)),
        Body::Single(operation) if body_bearing => Ok(BodyShape::Json(operation)),
        Body::Single(operation) => Ok(BodyShape::QueryString(query_params(&operation)?)),
    }
}

fn reject(reason: Incompatibility) -> LinkError {
    debug!(%reason, "Rejecting request encoding");
    LinkError::IncompatibleEncoding(reason)
}

/// Encode each field of the operation as a query parameter.
///
/// `variables` and `extensions` are JSON encoded; other strings pass through
/// unchanged. Absent fields are left out.
fn query_params(operation: &Operation) -> Result<Vec<(String, String)>> {
    let Value::Object(fields) = serde_json::to_value(operation)? else {
        return Ok(Vec::new());
    };

    let mut params = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        let stringify = STRINGIFIED_PARAMS
            .iter()
            .any(|param| key.eq_ignore_ascii_case(param));

        let value = if stringify {
            serde_json::to_string(&value)?
        } else {
            match value {
                Value::Null => continue,
                Value::String(s) => s,
                other => other.to_string(),
            }
        };
        params.push((key, value));
    }
    Ok(params)
}
