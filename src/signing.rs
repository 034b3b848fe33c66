// Bundle signing seam
// Signing inputs and selecting a remainder is delegated to an external
// signer; this file defines the interface the send pipeline calls
//
// Numan Thabit 2025 Nov

use crate::bundle::ProposedBundle;
use crate::errors::ClientResult;
use crate::router::RoutingClient;
use crate::trytes::TryteString;
use futures::future::BoxFuture;

/// Turns a proposed bundle into signed, ready-to-attach transaction trytes.
///
/// Implementations add inputs and a remainder as needed, compute the bundle
/// hash and fill signature fragments. Any node lookups they need (input
/// discovery, balance checks) go through `client`, so they follow the same
/// routes as the rest of the transfer. The returned list is ordered tail
/// first and every entry is a full raw transaction.
pub trait BundleSigner: Send + Sync {
    fn sign<'a>(
        &'a self,
        client: &'a RoutingClient,
        bundle: &'a ProposedBundle,
    ) -> BoxFuture<'a, ClientResult<Vec<TryteString>>>;
}
