// Transport module - endpoints that execute node commands
//
// Numan Thabit 2025 Nov

pub mod http;
pub mod memory;

pub use http::HttpEndpoint;
pub use memory::MemoryEndpoint;

use crate::errors::ClientResult;
use crate::router::routes::Operation;
use futures::future::BoxFuture;
use serde_json::Value;
use std::fmt;

/// One backend node. Executes a single command and returns the raw response
/// object, or a transport/protocol failure. No retries at this layer.
///
/// A request the endpoint cannot put on the wire at all (a composite
/// operation, params that are not a JSON object) fails with
/// `ClientError::Validation` before anything is sent. The routing client
/// never issues such requests.
pub trait Endpoint: Send + Sync + fmt::Debug {
    /// Connection address, e.g. `http://localhost:14265`.
    fn address(&self) -> &str;

    /// Executes `operation` with `params` (the command's JSON fields, without
    /// the command name itself).
    fn execute(&self, operation: Operation, params: Value) -> BoxFuture<'_, ClientResult<Value>>;
}
