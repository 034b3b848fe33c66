// Configuration management module
// This file handles loading the node endpoints and per-operation routes
// from an optional config file and environment variables
//
// Numan Thabit 2025 Nov

use crate::router::routes::Operation;
use crate::router::selector::OperationRouter;
use crate::router::router::{RoutingClient, DEFAULT_MIN_WEIGHT_MAGNITUDE};
use crate::transport::{Endpoint, HttpEndpoint};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const DEFAULT_DEPTH: u32 = 3;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Node that serves every operation without an explicit route,
    /// e.g. a public node at http://node.example:14265
    pub default_node: Url,
    /// Per-operation overrides keyed by operation or command name,
    /// e.g. `attachToTangle = "http://localhost:14265"`
    #[serde(default)]
    pub routes: BTreeMap<String, Url>,
    /// Request timeout applied to every endpoint
    pub request_timeout_secs: Option<u64>,
    /// Tip selection depth for replay and send
    pub depth: Option<u32>,
    /// PoW difficulty passed to attach
    pub min_weight_magnitude: Option<u8>,
}

impl AppConfig {
    /// Loads `<file_stem>.{toml,yaml,json}` from the working directory if
    /// present, then environment variables (`DEFAULT_NODE`,
    /// `ROUTES__ATTACHTOTANGLE`, ...).
    pub fn load_from(file_stem: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_stem).required(false))
            .add_source(config::Environment::default().separator("__"))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    pub fn depth(&self) -> u32 {
        self.depth.unwrap_or(DEFAULT_DEPTH)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Parsed route overrides.
    pub fn route_overrides(&self) -> Result<Vec<(Operation, Url)>> {
        self.routes
            .iter()
            .map(|(name, url)| {
                let op = name
                    .parse::<Operation>()
                    .with_context(|| format!("invalid route key: {name}"))?;
                Ok((op, url.clone()))
            })
            .collect()
    }

    /// Builds the route table. Routes naming the same URL share one endpoint.
    pub fn build_router(&self) -> Result<OperationRouter> {
        let timeout = self.request_timeout();
        let mut endpoints: HashMap<String, Arc<dyn Endpoint>> = HashMap::new();
        let mut endpoint_for = |url: &Url| -> Result<Arc<dyn Endpoint>> {
            if let Some(existing) = endpoints.get(url.as_str()) {
                return Ok(existing.clone());
            }
            let endpoint: Arc<dyn Endpoint> = Arc::new(
                HttpEndpoint::with_timeout(url.as_str(), timeout)
                    .with_context(|| format!("create endpoint for {url}"))?,
            );
            endpoints.insert(url.as_str().to_string(), endpoint.clone());
            Ok(endpoint)
        };

        let mut router = OperationRouter::new(endpoint_for(&self.default_node)?);
        for (op, url) in self.route_overrides()? {
            router.add_route(op, endpoint_for(&url)?);
        }
        Ok(router)
    }

    pub fn build_client(&self) -> Result<RoutingClient> {
        let router = self.build_router()?;
        Ok(RoutingClient::new(router).with_min_weight_magnitude(
            self.min_weight_magnitude
                .unwrap_or(DEFAULT_MIN_WEIGHT_MAGNITUDE),
        ))
    }
}
