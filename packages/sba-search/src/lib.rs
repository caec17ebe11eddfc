mod candidate;
mod client;
mod error;

pub mod knn;
pub mod mapping;

pub use candidate::Candidate;
pub use client::OpenSearchClient;
pub use error::{Error, Result};
pub use knn::{SOURCE_FIELDS, knn_search};
pub use mapping::{DENSE_VECTOR_TYPE, MappingCache, VectorField, resolve_vector_field};

use std::{future::Future, pin::Pin};

use serde_json::Value;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Capabilities the retrieval core needs from the search cluster. The HTTP
/// implementation lives in [`OpenSearchClient`]; tests substitute stubs.
pub trait SearchBackend
where
	Self: Send + Sync,
{
	/// Fetch the index's field-type schema.
	fn get_mapping<'a>(&'a self, index: &'a str) -> BoxFuture<'a, Result<Value>>;
	/// Execute one structured query body against the index.
	fn search<'a>(&'a self, index: &'a str, body: &'a Value) -> BoxFuture<'a, Result<Value>>;
	/// Lightweight liveness check.
	fn ping<'a>(&'a self) -> BoxFuture<'a, Result<()>>;
}
