// Fetcher module: HTTP transport plus the retrying driver on top of it.

pub mod traits;
pub mod http;
pub mod resilient;
#[cfg(test)]
pub mod mock;

pub use http::ReqwestTransport;
pub use resilient::{ResilientFetcher, RetryPolicy};
pub use traits::Transport;
