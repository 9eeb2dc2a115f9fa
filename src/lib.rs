//! Builds GraphQL operation documents from the shape of Rust types and decodes responses,
//! including partial ones, back into values of those types.
//!
//! A query is a struct whose fields mirror the selection set. `#[derive(Selectable)]`
//! describes it, [`construct_query`] renders it and [`Client::query`] sends it and fills it
//! from the answer:
//!
//! ```
//! use graphql_mold::{construct_query, Selectable, Variables};
//!
//! #[derive(Default, Selectable)]
//! struct Query {
//!     #[graphql("repository(owner: $owner, name: $name)")]
//!     repository: Repository,
//! }
//!
//! #[derive(Default, Selectable)]
//! struct Repository {
//!     description: Option<String>,
//!     stargazer_count: i64,
//! }
//!
//! let variables = Variables::new().with("owner", "octocat")?.with("name", "hello-world")?;
//! assert_eq!(
//!     construct_query(&Query::default(), &variables),
//!     "query ($name:String!$owner:String!){repository(owner: $owner, name: $name){description,stargazerCount}}"
//! );
//! # Ok::<(), graphql_mold::GraphQLError>(())
//! ```

extern crate self as graphql_mold;

pub mod annotation;
pub mod client;
pub mod config;
pub mod decode;
pub mod document;
pub mod error;
pub mod pairs;
pub mod response;
pub mod scalar;
pub mod selection;
pub mod transport;
pub mod variables;
mod writer;

pub use client::Client;
pub use config::{Config, ConfigError, EndpointConfig};
pub use decode::{DecodeContext, DecodeFailure};
pub use document::{
    construct_mutation, construct_operation, construct_query, construct_subscription, Document, Operation,
    OperationKind,
};
pub use error::{ErrorCode, Errors, GraphQLError, Location, PathSegment};
pub use pairs::SelectionMap;
pub use response::{Response, ResponseDecoder};
pub use scalar::ID;
pub use selection::{Field, Selectable};
pub use transport::{HttpTransport, Transport, TransportFailure, TransportRequest, TransportResponse};
pub use variables::{InputType, TypeRef, Variable, Variables};

pub use graphql_mold_codegen::{InputType, Selectable};

#[doc(hidden)]
pub mod __private {
    pub use crate::annotation::Annotation;
    pub use crate::decode::{decode_scalar, DecodeContext};
    pub use crate::selection::{decode_member, decode_opaque, select_member, select_opaque, Field, Selectable};
    pub use crate::variables::{InputType, TypeRef};
    pub use serde::de::DeserializeOwned;
    pub use serde_json::Value;
    pub use std::sync::OnceLock;
}
