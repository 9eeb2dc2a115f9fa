use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const CODE_EXTENSION: &str = "code";
pub const INTERNAL_EXTENSION: &str = "internal";

/// Classification stored under `extensions.code` for errors raised on the client side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The request failed in transport or the server answered with a non-success status.
    RequestError,
    /// The request body could not be encoded.
    JsonEncodeError,
    /// The response body is not a GraphQL response envelope.
    JsonDecodeError,
    /// A field of the response data could not be decoded into the destination.
    GraphQLDecodeError,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::RequestError => "request_error",
            ErrorCode::JsonEncodeError => "json_encode_error",
            ErrorCode::JsonDecodeError => "json_decode_error",
            ErrorCode::GraphQLDecodeError => "graphql_decode_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{Line:{} Column:{}}}", self.line, self.column)
    }
}

/// One step of a response path: an object key or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(index) => write!(f, "{}", index),
            PathSegment::Key(key) => f.write_str(key),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// A single GraphQL error, whether reported by the server or raised by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("Message: {message}, Locations: [{}]", display_locations(.locations))]
pub struct GraphQLError {
    pub message: String,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

fn display_locations(locations: &[Location]) -> String {
    locations.iter().map(Location::to_string).collect::<Vec<_>>().join(" ")
}

impl GraphQLError {
    pub fn new(message: impl Into<String>) -> Self {
        GraphQLError { message: message.into(), ..GraphQLError::default() }
    }

    pub fn with_code(message: impl Into<String>, code: ErrorCode) -> Self {
        GraphQLError::new(message).with_extension(CODE_EXTENSION, code.as_str())
    }

    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = path;
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    pub fn code(&self) -> Option<&str> {
        self.extensions.get(CODE_EXTENSION).and_then(Value::as_str)
    }

    pub fn internal(&self) -> Option<&Map<String, Value>> {
        self.extensions.get(INTERNAL_EXTENSION).and_then(Value::as_object)
    }
}

/// The ordered list of errors a call produced.
///
/// Server errors, transport failures and decoding problems all end up here so callers can
/// tell them apart through [`GraphQLError::code`] alone.
#[derive(Debug, Clone, Default, PartialEq, thiserror::Error)]
#[error("{}", display_errors(.0))]
pub struct Errors(Vec<GraphQLError>);

fn display_errors(errors: &[GraphQLError]) -> String {
    errors.iter().map(GraphQLError::to_string).collect::<Vec<_>>().join("; ")
}

impl Errors {
    pub fn new() -> Self {
        Errors(Vec::new())
    }

    pub fn push(&mut self, error: GraphQLError) {
        self.0.push(error);
    }

    /// Adds the `internal` diagnostic extension to every error.
    pub fn attach_internal(&mut self, internal: &Map<String, Value>) {
        for error in &mut self.0 {
            error.extensions.insert(INTERNAL_EXTENSION.to_string(), Value::Object(internal.clone()));
        }
    }

    /// `Ok(())` when there is nothing to report.
    pub fn into_result(self) -> Result<(), Errors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Deref for Errors {
    type Target = [GraphQLError];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<GraphQLError> for Errors {
    fn from(error: GraphQLError) -> Self {
        Errors(vec![error])
    }
}

impl From<Vec<GraphQLError>> for Errors {
    fn from(errors: Vec<GraphQLError>) -> Self {
        Errors(errors)
    }
}

impl FromIterator<GraphQLError> for Errors {
    fn from_iter<I: IntoIterator<Item = GraphQLError>>(iter: I) -> Self {
        Errors(iter.into_iter().collect())
    }
}

impl Extend<GraphQLError> for Errors {
    fn extend<I: IntoIterator<Item = GraphQLError>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl IntoIterator for Errors {
    type Item = GraphQLError;
    type IntoIter = std::vec::IntoIter<GraphQLError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Errors {
    type Item = &'a GraphQLError;
    type IntoIter = std::slice::Iter<'a, GraphQLError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
