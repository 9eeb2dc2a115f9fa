use serde::Deserialize;
use serde_json::{json, Deserializer, Map, Value};

use crate::decode::{DecodeContext, DecodeFailure};
use crate::error::{ErrorCode, Errors, GraphQLError, Location, PathSegment};
use crate::selection::Selectable;
use crate::transport::{TransportFailure, TransportResponse};

/// A GraphQL response: the `data` object, when present, and the errors that came with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub data: Option<Map<String, Value>>,
    pub errors: Errors,
}

impl Response {
    /// Parses a response body. A body that is not a response envelope yields a
    /// `json_decode_error`.
    pub fn parse(body: &[u8]) -> Result<Response, GraphQLError> {
        let deserializer = &mut Deserializer::from_slice(body);
        let envelope: Envelope = serde_path_to_error::deserialize(&mut *deserializer)
            .map_err(|error| GraphQLError::with_code(error.to_string(), ErrorCode::JsonDecodeError))?;
        deserializer
            .end()
            .map_err(|error| GraphQLError::with_code(error.to_string(), ErrorCode::JsonDecodeError))?;

        Ok(Response {
            data: envelope.data,
            errors: envelope.errors.unwrap_or_default().into_iter().map(GraphQLError::from).collect(),
        })
    }

    fn failed(error: GraphQLError) -> Response {
        Response { data: None, errors: error.into() }
    }

    /// The data when no errors were reported.
    pub fn into_result(self) -> Result<Option<Map<String, Value>>, Errors> {
        if self.errors.is_empty() {
            Ok(self.data)
        } else {
            Err(self.errors)
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Map<String, Value>>,
    #[serde(default)]
    errors: Option<Vec<ServerError>>,
}

#[derive(Deserialize)]
struct ServerError {
    message: String,
    #[serde(default)]
    locations: Option<Vec<Location>>,
    #[serde(default)]
    path: Option<Vec<PathSegment>>,
    #[serde(default)]
    extensions: Option<Map<String, Value>>,
    #[serde(flatten)]
    other: Map<String, Value>,
}

impl From<ServerError> for GraphQLError {
    fn from(error: ServerError) -> Self {
        let mut extensions = error.extensions.unwrap_or_default();
        for (key, value) in error.other {
            extensions.entry(key).or_insert(value);
        }
        GraphQLError {
            message: error.message,
            locations: error.locations.unwrap_or_default(),
            path: error.path.unwrap_or_default(),
            extensions,
        }
    }
}

/// Turns the outcome of one request into decoded data and errors.
///
/// Every failure, whether it comes from the transport, the HTTP status, the envelope or the
/// server, ends up in the same [`Errors`] list. In debug mode each error also carries an
/// `internal` extension with the request body and, when one arrived, the raw response.
#[derive(Debug, Clone, Copy)]
pub struct ResponseDecoder<'a> {
    request_body: &'a str,
    debug: bool,
}

impl<'a> ResponseDecoder<'a> {
    pub fn new(request_body: &'a str) -> Self {
        ResponseDecoder { request_body, debug: false }
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Decodes the response data into `destination`.
    ///
    /// Whatever decoded stays in `destination` even when errors are returned.
    pub fn decode<T: Selectable>(
        &self,
        outcome: &Result<TransportResponse, TransportFailure>,
        destination: &mut T,
    ) -> Result<(), Errors> {
        let Response { data, mut errors } = self.read(outcome);
        if let Some(data) = data {
            let mut cx = DecodeContext::with_error_paths(errors.iter().map(|error| error.path.clone()));
            destination.decode(&Value::Object(data), &mut cx);
            errors.extend(cx.into_failures().into_iter().map(DecodeFailure::into_error));
        }
        self.finish(errors, outcome).into_result()
    }

    /// Returns the response with its data left undecoded.
    pub fn decode_raw(&self, outcome: &Result<TransportResponse, TransportFailure>) -> Response {
        let mut response = self.read(outcome);
        response.errors = self.finish(std::mem::take(&mut response.errors), outcome);
        response
    }

    fn read(&self, outcome: &Result<TransportResponse, TransportFailure>) -> Response {
        let response = match outcome {
            Ok(response) => response,
            Err(failure) => {
                tracing::debug!(error = %failure, "request failed");
                return Response::failed(GraphQLError::with_code(failure.to_string(), ErrorCode::RequestError));
            }
        };

        if !response.status.is_success() {
            let body = String::from_utf8_lossy(&response.body);
            let message = format!("{}; body: {:?}", response.status, body);
            return Response::failed(GraphQLError::with_code(message, ErrorCode::RequestError));
        }

        Response::parse(&response.body).unwrap_or_else(Response::failed)
    }

    fn finish(&self, mut errors: Errors, outcome: &Result<TransportResponse, TransportFailure>) -> Errors {
        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "response carried errors");
        }
        if self.debug && !errors.is_empty() {
            let mut internal = Map::new();
            internal.insert("request".to_string(), json!({ "body": self.request_body }));
            if let Ok(response) = outcome {
                internal.insert(
                    "response".to_string(),
                    json!({
                        "status": response.status.as_u16(),
                        "body": String::from_utf8_lossy(&response.body),
                    }),
                );
            }
            errors.attach_internal(&internal);
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;

    #[test]
    fn parses_partial_response() {
        let response = Response::parse(
            br#"{
                "data": { "node1": { "id": "X" }, "node2": null },
                "errors": [{
                    "message": "M",
                    "type": "NOT_FOUND",
                    "path": ["node2"],
                    "locations": [{ "line": 10, "column": 4 }]
                }]
            }"#,
        )
        .unwrap();

        let data = response.data.unwrap();
        assert_eq!(data["node1"], json!({ "id": "X" }));
        assert_eq!(data["node2"], Value::Null);
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].path, vec![PathSegment::from("node2")]);
        assert_eq!(response.errors[0].extensions["type"], json!("NOT_FOUND"));
        assert_eq!(response.errors[0].to_string(), "Message: M, Locations: [{Line:10 Column:4}]");
    }

    #[test]
    fn explicit_extensions_win_over_folded_members() {
        let response =
            Response::parse(br#"{"errors":[{"message":"M","code":"top","extensions":{"code":"inner"}}]}"#).unwrap();
        assert_eq!(response.errors[0].code(), Some("inner"));
    }

    #[test]
    fn missing_data_and_null_lists() {
        let response = Response::parse(br#"{"data": null, "errors": null}"#).unwrap();
        assert_eq!(response, Response::default());

        let response = Response::parse(br#"{"errors":[{"message":"M","locations":null}]}"#).unwrap();
        assert!(response.data.is_none());
        assert_eq!(response.errors[0].to_string(), "Message: M, Locations: []");
    }

    #[test]
    fn rejects_non_envelopes() {
        let bodies: [&[u8]; 4] = [b"<html>", br#"{"data": []}"#, br#"{"data": {}} trailing"#, br#"{"errors":[{}]}"#];
        for body in bodies {
            let error = Response::parse(body).unwrap_err();
            assert_eq!(error.code(), Some("json_decode_error"));
        }
    }

    #[test]
    fn status_failure_quotes_the_body() {
        let outcome = Ok(TransportResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "important message\n"));
        let response = ResponseDecoder::new("{}").decode_raw(&outcome);
        assert_eq!(
            response.errors.to_string(),
            r#"Message: 500 Internal Server Error; body: "important message\n", Locations: []"#
        );
        assert_eq!(response.errors[0].code(), Some("request_error"));
        assert!(response.errors[0].internal().is_none());
    }

    #[test]
    fn transport_failure_in_debug_mode() {
        let outcome = Err(TransportFailure::Other("connection refused".to_string()));
        let response = ResponseDecoder::new(r#"{"query":"{a}"}"#).debug(true).decode_raw(&outcome);
        let error = &response.errors[0];
        assert_eq!(error.message, "connection refused");
        assert_eq!(error.code(), Some("request_error"));
        assert_eq!(error.internal().unwrap()["request"], json!({ "body": r#"{"query":"{a}"}"# }));
        assert!(!error.internal().unwrap().contains_key("response"));
    }

    #[test]
    fn clean_response_has_no_errors() {
        let outcome = Ok(TransportResponse::ok(r#"{"data":{"a":1}}"#));
        let response = ResponseDecoder::new("{}").debug(true).decode_raw(&outcome);
        assert_eq!(response.into_result().unwrap(), Some(json!({ "a": 1 }).as_object().cloned().unwrap()));
    }
}
