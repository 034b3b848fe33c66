// Library root module for tangle-router
// This file defines the public API and module structure: a routing client
// that sends each ledger node command to its configured endpoint, plus bundle
// reconstruction and transfer building on top of it
//
// Numan Thabit 2025 Nov

pub mod bundle;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod router;
pub mod signing;
pub mod transaction;
pub mod transport;
pub mod trytes;

pub use bundle::{AttachedBundle, ProposedBundle, ProposedTransaction};
pub use errors::{ClientError, ClientResult, ErrorKind, SendStage};
pub use router::{Operation, OperationRouter, RoutingClient};
pub use transport::Endpoint;
