//! Provides clients for the HTTP services the application talks to.
//!
//! Includes:
//! - `openaq`: Client for the real OpenAQ v3 API, used by the proxy endpoint.
//! - `proxy`: Client for this service's own proxy endpoint, used by the map view.

mod openaq;
mod proxy;

pub use openaq::*;
pub use proxy::*;
