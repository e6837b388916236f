//! # Micbridge - Wireless Microphone Receiver Telemetry Bridge
//!
//! Micbridge watches one wireless-microphone receiver per room and bridges
//! its line-oriented TCP status protocol into structured events for a
//! downstream publishing layer.
//!
//! ## What it does
//!
//! - **Device Resolution**: Resolves the room's receiver through an external
//!   device registry, retrying until registration catches up.
//! - **Framing**: Turns the receiver's raw byte stream into discrete
//!   `>`-terminated status messages.
//! - **Normalization**: Classifies each message (interference, power,
//!   battery), extracts key/value fields, derives an hours/minutes battery
//!   reading, and filters sentinel noise.
//! - **Publishing**: Forwards surviving events to the event transport and
//!   faults to the error transport; a bad frame never stops the loop.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use micbridge::config::Config;
//! use micbridge::lookup::HttpDeviceLookup;
//! use micbridge::monitor::Monitor;
//! use micbridge::publishing::HttpPublisher;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let lookup = Arc::new(HttpDeviceLookup::new(
//!         &config.lookup.base_url,
//!         config.lookup.timeout(),
//!     )?);
//!     let publisher = Arc::new(HttpPublisher::new(
//!         &config.publishing.event_url,
//!         &config.publishing.error_url,
//!         config.publishing.timeout(),
//!     )?);
//!
//!     Monitor::new(&config, lookup, publisher).run().await
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`monitor`] - connection lifecycle and the read/publish loop
//! - [`receiver`] - TCP link to the device and message framing
//! - [`protocol`] - classify/extract/derive/filter normalization pipeline
//! - [`events`] - the structured event model
//! - [`lookup`] - device registry client
//! - [`publishing`] - event and error transports
//! - [`config`] - configuration management
//!
//! One monitor instance runs as a single sequential loop per room. Multiple
//! rooms run as independent instances sharing no state.

pub mod config;
pub mod events;
pub mod logutil;
pub mod lookup;
pub mod monitor;
pub mod protocol;
pub mod publishing;
pub mod receiver;
