//! Async client for the CarsXE vehicle data API.
//!
//! ```no_run
//! use carsxe::{CarsxeClient, CarsxeConfig};
//!
//! # async fn demo() -> carsxe::Result<()> {
//! let client = CarsxeClient::new(CarsxeConfig::new("YOUR_API_KEY"))?;
//! let plate = client
//!     .plate_decoder([("plate", "7XER187"), ("state", "CA"), ("country", "US")])
//!     .await?;
//! println!("{}", serde_json::to_string_pretty(&plate).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod request;
pub mod strict;
pub mod transport;

// Convenient re-exports
pub use client::CarsxeClient;
pub use config::{CarsxeConfig, KeyFromEnv};
pub use endpoint::{Endpoint, EndpointSpec};
pub use error::{CarsxeError, Result};
pub use request::{build_url, ApiRequest, HttpMethod, Params};
pub use strict::StrictClient;
pub use transport::{
    decode_response, HttpTransport, JsonMap, MockHandle, MockResponse, MockTransport, RawResponse, Transport,
};
pub use tokio_util::sync::CancellationToken;
