//! Volvo On Call Client Library
//!
//! Typed async client for the VOC customer REST API: account and vehicle
//! lookups, telemetry, remote commands and service-status polling.
//!
//! # Example
//!
//! ```rust,no_run
//! use voc_client::VocClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = VocClient::new("user@example.com", "secret")?;
//!
//!     // Fetch a vehicle with its attributes, status and relations resolved
//!     let vehicle = client.get_vehicle("YV1XZ12345678901").await?;
//!
//!     // Issue a command, then poll it to completion
//!     let mut status = vehicle.lock(&client).await?;
//!     client.evaluate_service_status_auto(&mut status).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Service Regions
//!
//! Europe is the default. Other regions are selected with a host suffix, or
//! by pointing the client at an explicit API root:
//!
//! ```rust,no_run
//! use voc_client::{ClientConfig, VocClient};
//!
//! # fn main() -> voc_client::Result<()> {
//! let na = VocClient::with_config(
//!     "user",
//!     "secret",
//!     ClientConfig::builder().region("na").build(),
//! )?;
//! assert_eq!(
//!     na.api_root(),
//!     "https://vocapi-na.wirelesscar.net/customerapi/rest/v3.0"
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Testing
//!
//! The `testing` module provides a mock server and a scripted transport:
//!
//! ```rust,ignore
//! use voc_client::testing::TestServer;
//!
//! let server = TestServer::start(router).await?;
//! let attributes = server.client.get_vehicle_attributes("YV1").await?;
//! ```

mod account;
mod client;
mod commands;
pub mod config;
mod error;
pub mod service;
pub mod testing;
pub mod transport;
mod types;
mod vehicle;

pub use account::{AccountVehicleRelation, CustomerAccount};
pub use client::VocClient;
pub use config::{ClientConfig, ClientConfigBuilder, TimeoutsConfig};
pub use error::{Result, VocError};
pub use service::{ServiceState, ServiceStatus, ServiceType};
pub use transport::{HttpTransport, Method, Transport};
pub use types::*;
pub use vehicle::Vehicle;
