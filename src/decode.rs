use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ErrorCode, GraphQLError, PathSegment};

/// A field of the response data that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl DecodeFailure {
    pub fn into_error(self) -> GraphQLError {
        let message = if self.path.is_empty() {
            self.message
        } else {
            let path = self.path.iter().map(PathSegment::to_string).collect::<Vec<_>>().join(".");
            format!("{}: {}", path, self.message)
        };
        GraphQLError::with_code(message, ErrorCode::GraphQLDecodeError).with_path(self.path)
    }
}

/// State carried through one decoding pass over response data.
///
/// Tracks the current response path so failures can be reported where they happen, and the
/// paths of server-reported errors: a value that fails to decode at or below such a path is
/// the expected fallout of that error and is not reported again.
#[derive(Debug, Default)]
pub struct DecodeContext {
    path: Vec<PathSegment>,
    error_paths: Vec<Vec<PathSegment>>,
    failures: Vec<DecodeFailure>,
    rejected: bool,
}

impl DecodeContext {
    pub fn new() -> Self {
        DecodeContext::default()
    }

    pub fn with_error_paths<I>(error_paths: I) -> Self
    where
        I: IntoIterator<Item = Vec<PathSegment>>,
    {
        DecodeContext {
            error_paths: error_paths.into_iter().filter(|path| !path.is_empty()).collect(),
            ..DecodeContext::default()
        }
    }

    pub fn at_key<R>(&mut self, key: &str, decode: impl FnOnce(&mut Self) -> R) -> R {
        self.descend(PathSegment::Key(key.to_string()), decode)
    }

    pub fn at_index<R>(&mut self, index: usize, decode: impl FnOnce(&mut Self) -> R) -> R {
        self.descend(PathSegment::Index(index), decode)
    }

    fn descend<R>(&mut self, segment: PathSegment, decode: impl FnOnce(&mut Self) -> R) -> R {
        self.path.push(segment);
        let outer = std::mem::take(&mut self.rejected);
        let result = decode(self);
        self.rejected = outer;
        self.path.pop();
        result
    }

    /// Records that the value at the current path was rejected.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.rejected = true;
        let message = message.into();
        if self.covered_by_error() {
            tracing::trace!(path = ?self.path, %message, "decode failure below a reported error");
            return;
        }
        tracing::warn!(path = ?self.path, %message, "unable to decode response field");
        self.failures.push(DecodeFailure { path: self.path.clone(), message });
    }

    /// Runs `decode` and reports whether it rejected the value at the current path itself.
    /// Failures deeper in the value do not count.
    pub fn rejects(&mut self, decode: impl FnOnce(&mut Self)) -> bool {
        let outer = std::mem::take(&mut self.rejected);
        decode(self);
        let rejected = self.rejected;
        self.rejected = outer || rejected;
        rejected
    }

    /// `true` for objects. Null is skipped silently, anything else is a failure.
    pub fn expect_object(&mut self, value: &Value) -> bool {
        match value {
            Value::Object(_) => true,
            Value::Null => false,
            other => {
                self.fail(format!("expected an object, found {}", kind(other)));
                false
            }
        }
    }

    pub fn into_failures(self) -> Vec<DecodeFailure> {
        self.failures
    }

    fn covered_by_error(&self) -> bool {
        self.error_paths.iter().any(|error_path| self.path.starts_with(error_path))
    }
}

/// Decodes a leaf value through its serde implementation.
///
/// `null` leaves the target untouched unless the target itself accepts null.
pub fn decode_scalar<T: DeserializeOwned>(target: &mut T, value: &Value, cx: &mut DecodeContext) {
    match serde_path_to_error::deserialize::<_, T>(value) {
        Ok(decoded) => *target = decoded,
        Err(_) if value.is_null() => {}
        Err(error) => cx.fail(error.to_string()),
    }
}

pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_decodes_and_ignores_null() {
        let mut cx = DecodeContext::new();
        let mut login = "before".to_string();
        decode_scalar(&mut login, &Value::Null, &mut cx);
        assert_eq!(login, "before");

        decode_scalar(&mut login, &json!("gopher"), &mut cx);
        assert_eq!(login, "gopher");
        assert!(cx.into_failures().is_empty());
    }

    #[test]
    fn failures_carry_their_path() {
        let mut cx = DecodeContext::new();
        let mut count = 0i32;
        cx.at_key("repository", |cx| {
            cx.at_index(2, |cx| decode_scalar(&mut count, &json!("many"), cx));
        });
        let failures = cx.into_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path, vec![PathSegment::from("repository"), PathSegment::Index(2)]);

        let error = failures[0].clone().into_error();
        assert_eq!(error.code(), Some("graphql_decode_error"));
        assert!(error.message.starts_with("repository.2: "));
    }

    #[test]
    fn failures_below_reported_errors_are_dropped() {
        let mut cx = DecodeContext::with_error_paths(vec![vec![PathSegment::from("node2")]]);
        let mut id = String::new();
        cx.at_key("node2", |cx| cx.at_key("id", |cx| decode_scalar(&mut id, &json!(5), cx)));
        assert!(cx.into_failures().is_empty());
    }

    #[test]
    fn rejects_only_sees_its_own_level() {
        let mut cx = DecodeContext::new();
        let mut number = 0u8;
        let rejected = cx.rejects(|cx| cx.at_key("deep", |cx| decode_scalar(&mut number, &json!(true), cx)));
        assert!(!rejected);

        let rejected = cx.rejects(|cx| decode_scalar(&mut number, &json!(true), cx));
        assert!(rejected);
        assert_eq!(cx.into_failures().len(), 2);
    }
}
