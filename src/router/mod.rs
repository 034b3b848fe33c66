// Router module - operation routing and the client facade
// This file wires the route table, the per-command facade and the
// send/replay execution pipeline
//
// Numan Thabit 2025 Nov

pub mod execution;
pub mod routes;
pub mod selector;

#[allow(clippy::module_inception)]
pub mod router;

pub use execution::ExecutionStats;
pub use router::{RoutingClient, Tips};
pub use routes::Operation;
pub use selector::OperationRouter;
