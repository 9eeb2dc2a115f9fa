use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{ConfigError, EndpointConfig};
use crate::document::{construct_operation, Operation, OperationKind};
use crate::error::{ErrorCode, Errors, GraphQLError};
use crate::response::{Response, ResponseDecoder};
use crate::selection::Selectable;
use crate::transport::{HttpTransport, Transport, TransportFailure, TransportRequest, TransportResponse};
use crate::variables::Variables;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestEnvelope<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    variables: &'a Map<String, Value>,
}

/// Sends operations built from Rust types and decodes the answers back into them.
///
/// ```no_run
/// use graphql_mold::{Client, Selectable, Variables};
///
/// #[derive(Debug, Default, Selectable)]
/// struct Query {
///     viewer: Viewer,
/// }
///
/// #[derive(Debug, Default, Selectable)]
/// struct Viewer {
///     login: String,
/// }
///
/// # async fn run() -> Result<(), graphql_mold::Errors> {
/// let client = Client::new("https://api.github.com/graphql");
/// let mut query = Query::default();
/// client.query(&mut query, &Variables::new()).await?;
/// println!("{}", query.viewer.login);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client<T = HttpTransport> {
    transport: T,
    debug: bool,
}

impl Client<HttpTransport> {
    pub fn new(url: impl Into<String>) -> Self {
        Client::with_transport(HttpTransport::new(url))
    }

    pub fn from_config(config: &EndpointConfig) -> Result<Self, ConfigError> {
        Ok(Client::with_transport(HttpTransport::from_config(config)?))
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(transport: T) -> Self {
        Client { transport, debug: false }
    }

    /// Attaches the request and raw response to every returned error.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs a query shaped like `query` and fills it from the response.
    ///
    /// On errors the fields that did decode are kept, so partial data stays usable.
    pub async fn query<Q: Selectable>(&self, query: &mut Q, variables: &Variables) -> Result<(), Errors> {
        self.exec(&Operation::query(), query, variables).await
    }

    /// Like [`Client::query`], with the name and directives of `operation`.
    pub async fn query_with<Q: Selectable>(
        &self,
        operation: Operation,
        query: &mut Q,
        variables: &Variables,
    ) -> Result<(), Errors> {
        self.exec(&operation.with_kind(OperationKind::Query), query, variables).await
    }

    pub async fn mutate<M: Selectable>(&self, mutation: &mut M, variables: &Variables) -> Result<(), Errors> {
        self.exec(&Operation::mutation(), mutation, variables).await
    }

    pub async fn mutate_with<M: Selectable>(
        &self,
        operation: Operation,
        mutation: &mut M,
        variables: &Variables,
    ) -> Result<(), Errors> {
        self.exec(&operation.with_kind(OperationKind::Mutation), mutation, variables).await
    }

    /// Runs any operation and decodes the response into `destination`.
    pub async fn exec<D: Selectable>(
        &self,
        operation: &Operation,
        destination: &mut D,
        variables: &Variables,
    ) -> Result<(), Errors> {
        let document = construct_operation(destination, variables, operation);
        let body = encode_request(&document, operation.operation_name(), &variables.to_json())?;
        let outcome = self.send(&body).await;
        ResponseDecoder::new(&body).debug(self.debug).decode(&outcome, destination)
    }

    /// Runs a query shaped like `query` but returns the `data` object without decoding it.
    pub async fn query_raw<Q: Selectable>(&self, query: &Q, variables: &Variables) -> Response {
        let operation = Operation::query();
        let document = construct_operation(query, variables, &operation);
        self.exec_raw(&document, None, &variables.to_json()).await
    }

    /// Sends a ready-made document.
    pub async fn exec_raw(
        &self,
        document: &str,
        operation_name: Option<&str>,
        variables: &Map<String, Value>,
    ) -> Response {
        let body = match encode_request(document, operation_name, variables) {
            Ok(body) => body,
            Err(errors) => return Response { data: None, errors },
        };
        let outcome = self.send(&body).await;
        ResponseDecoder::new(&body).debug(self.debug).decode_raw(&outcome)
    }

    async fn send(&self, body: &str) -> Result<TransportResponse, TransportFailure> {
        tracing::debug!(bytes = body.len(), "sending request");
        self.transport
            .execute(TransportRequest { body: body.as_bytes().to_vec() })
            .await
    }
}

fn encode_request(
    document: &str,
    operation_name: Option<&str>,
    variables: &Map<String, Value>,
) -> Result<String, Errors> {
    let envelope = RequestEnvelope { query: document, operation_name, variables };
    serde_json::to_string(&envelope)
        .map_err(|error| GraphQLError::with_code(error.to_string(), ErrorCode::JsonEncodeError).into())
}
