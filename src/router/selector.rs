// Operation router - resolves each operation to the endpoint that serves it
// Unmapped operations fall back to the default endpoint, so resolution
// never fails
//
// Numan Thabit 2025 Nov

use crate::router::routes::Operation;
use crate::transport::Endpoint;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Route table: per-operation overrides on top of one default endpoint.
///
/// The table is plain data; share it behind an `Arc` once configured and it
/// is safe for any number of concurrent readers.
#[derive(Clone)]
pub struct OperationRouter {
    default: Arc<dyn Endpoint>,
    routes: HashMap<Operation, Arc<dyn Endpoint>>,
}

impl OperationRouter {
    pub fn new(default: Arc<dyn Endpoint>) -> Self {
        Self {
            default,
            routes: HashMap::new(),
        }
    }

    /// Registers `endpoint` for `operation`, replacing any earlier route.
    pub fn add_route(&mut self, operation: Operation, endpoint: Arc<dyn Endpoint>) -> &mut Self {
        debug!(
            operation = %operation,
            endpoint = %endpoint.address(),
            "route registered"
        );
        self.routes.insert(operation, endpoint);
        self
    }

    /// Builder form of [`add_route`](Self::add_route).
    pub fn with_route(mut self, operation: Operation, endpoint: Arc<dyn Endpoint>) -> Self {
        self.add_route(operation, endpoint);
        self
    }

    pub fn resolve(&self, operation: Operation) -> &Arc<dyn Endpoint> {
        self.routes.get(&operation).unwrap_or(&self.default)
    }

    pub fn is_overridden(&self, operation: Operation) -> bool {
        self.routes.contains_key(&operation)
    }

    /// Effective endpoint address for every operation, in declaration order.
    pub fn table(&self) -> Vec<(Operation, String)> {
        Operation::ALL
            .into_iter()
            .map(|op| (op, self.resolve(op).address().to_string()))
            .collect()
    }
}

impl std::fmt::Debug for OperationRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRouter")
            .field("default", &self.default.address())
            .field("overrides", &self.routes.len())
            .finish()
    }
}
