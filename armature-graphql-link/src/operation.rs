//! GraphQL operation payloads.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::{LinkError, Result, Upload};

/// Variables of an operation, keyed by variable name.
pub type Variables = IndexMap<String, Variable>;

/// A variable value that may contain file uploads.
///
/// Plain JSON is kept as [`Variable::Json`]. Lists and objects that contain
/// uploads are spelled out so file values can be located by path. An upload
/// serializes as `null`, the placeholder used by the multipart request format.
#[derive(Debug, Clone, PartialEq)]
pub enum Variable {
    /// Plain JSON value without uploads.
    Json(Value),
    /// List of values.
    List(Vec<Variable>),
    /// Object of values.
    Object(IndexMap<String, Variable>),
    /// File upload.
    Upload(Upload),
}

impl Variable {
    /// Check if this value is an upload.
    pub fn is_upload(&self) -> bool {
        matches!(self, Self::Upload(_))
    }

    /// Check if this value contains an upload anywhere.
    pub fn contains_upload(&self) -> bool {
        match self {
            Self::Upload(_) => true,
            Self::List(items) => items.iter().any(Variable::contains_upload),
            Self::Object(fields) => fields.values().any(Variable::contains_upload),
            Self::Json(_) => false,
        }
    }
}

impl Serialize for Variable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Json(value) => value.serialize(serializer),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Self::Upload(_) => serializer.serialize_none(),
        }
    }
}

impl From<Value> for Variable {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Upload> for Variable {
    fn from(upload: Upload) -> Self {
        Self::Upload(upload)
    }
}

impl From<Vec<Variable>> for Variable {
    fn from(items: Vec<Variable>) -> Self {
        Self::List(items)
    }
}

impl From<IndexMap<String, Variable>> for Variable {
    fn from(fields: IndexMap<String, Variable>) -> Self {
        Self::Object(fields)
    }
}

impl From<&str> for Variable {
    fn from(value: &str) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<String> for Variable {
    fn from(value: String) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<i64> for Variable {
    fn from(value: i64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<f64> for Variable {
    fn from(value: f64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<bool> for Variable {
    fn from(value: bool) -> Self {
        Self::Json(Value::from(value))
    }
}

/// A single GraphQL operation.
///
/// Serializes as `{"operationName", "variables", "query", "extensions"}`;
/// absent optional fields are left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Operation name (for documents with multiple operations).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    /// Variables for the operation.
    pub variables: Variables,
    /// The GraphQL document. Left out for persisted queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Extensions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl Operation {
    /// Create a new operation.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            operation_name: None,
            variables: Variables::new(),
            query: Some(query.into()),
            extensions: None,
        }
    }

    /// Set the operation name.
    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Set a single variable.
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Variable>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Set variables from any serializable value.
    ///
    /// Object fields are added to the existing variables and `null` adds
    /// nothing. Any other value is rejected.
    pub fn variables<T: Serialize>(mut self, variables: T) -> Result<Self> {
        match serde_json::to_value(variables)? {
            Value::Object(fields) => {
                self.variables
                    .extend(fields.into_iter().map(|(k, v)| (k, Variable::Json(v))));
                Ok(self)
            }
            Value::Null => Ok(self),
            other => Err(LinkError::Parse(format!(
                "variables must serialize to an object, got {other}"
            ))),
        }
    }

    /// Set extensions.
    pub fn extensions(mut self, extensions: Value) -> Self {
        self.extensions = Some(extensions);
        self
    }

    /// Check if any variable holds an upload.
    pub fn has_uploads(&self) -> bool {
        self.variables.values().any(Variable::contains_upload)
    }
}

/// The body of a request: one operation or an ordered batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Body {
    /// A single operation.
    Single(Operation),
    /// A batch of operations, sent as a JSON array.
    Batch(Vec<Operation>),
}

impl Body {
    /// Create a batch body. A batch needs at least one operation.
    pub fn batch(operations: Vec<Operation>) -> Result<Self> {
        if operations.is_empty() {
            return Err(LinkError::EmptyBatch);
        }
        Ok(Self::Batch(operations))
    }

    /// Check if this is a batch.
    pub fn is_batch(&self) -> bool {
        matches!(self, Self::Batch(_))
    }

    /// Get the number of operations.
    pub fn len(&self) -> usize {
        self.operations().len()
    }

    /// Always false; a body holds at least one operation.
    pub fn is_empty(&self) -> bool {
        self.operations().is_empty()
    }

    /// Get the operations.
    pub fn operations(&self) -> &[Operation] {
        match self {
            Self::Single(operation) => std::slice::from_ref(operation),
            Self::Batch(operations) => operations,
        }
    }

    /// Get the operations mutably.
    pub fn operations_mut(&mut self) -> &mut [Operation] {
        match self {
            Self::Single(operation) => std::slice::from_mut(operation),
            Self::Batch(operations) => operations,
        }
    }
}

impl From<Operation> for Body {
    fn from(operation: Operation) -> Self {
        Self::Single(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_serialization() {
        let op = Operation::new("query GetUser($id: ID!) { user(id: $id) { id } }")
            .operation_name("GetUser")
            .variable("id", "42");

        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(
            value,
            json!({
                "operationName": "GetUser",
                "variables": {"id": "42"},
                "query": "query GetUser($id: ID!) { user(id: $id) { id } }",
            })
        );
    }

    #[test]
    fn test_operation_without_query() {
        let mut op = Operation::new("{ me { id } }").extensions(json!({"persistedQuery": {}}));
        op.query = None;

        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(
            value,
            json!({"variables": {}, "extensions": {"persistedQuery": {}}})
        );
    }

    #[test]
    fn test_upload_serializes_as_null() {
        let op = Operation::new("mutation($file: Upload!) { upload(file: $file) }")
            .variable("file", Upload::new("hello"))
            .variable(
                "files",
                vec![Variable::from(Upload::new("a")), Variable::from("keep")],
            );

        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value["variables"], json!({"file": null, "files": [null, "keep"]}));
        assert!(op.has_uploads());
    }

    #[test]
    fn test_variables_from_struct() {
        #[derive(Serialize)]
        struct Vars {
            a: i32,
        }

        let op = Operation::new("{ a }")
            .variables(Vars { a: 1 })
            .unwrap()
            .variables(None::<Vars>)
            .unwrap();
        assert_eq!(op.variables.len(), 1);
        assert_eq!(op.variables["a"], Variable::Json(json!(1)));
        assert!(!op.has_uploads());
    }

    #[test]
    fn test_non_object_variables_are_rejected() {
        let result = Operation::new("{ a }").variables(42);
        assert!(matches!(result, Err(LinkError::Parse(_))));

        let result = Operation::new("{ a }").variables(vec![1, 2]);
        assert!(matches!(result, Err(LinkError::Parse(_))));
    }

    #[test]
    fn test_batch_body() {
        assert!(matches!(Body::batch(Vec::new()), Err(LinkError::EmptyBatch)));

        let body = Body::batch(vec![Operation::new("{ a }"), Operation::new("{ b }")]).unwrap();
        assert!(body.is_batch());
        assert_eq!(body.len(), 2);
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!([
                {"variables": {}, "query": "{ a }"},
                {"variables": {}, "query": "{ b }"},
            ])
        );

        let single = Body::from(Operation::new("{ a }"));
        assert!(!single.is_batch());
        assert_eq!(single.len(), 1);
    }
}
