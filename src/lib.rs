//! Watchtower - service monitoring dashboard client
//!
//! This library provides the client side of the Watchtower monitoring
//! server: account sessions, the service registry API, live metrics
//! ingestion over a push channel, and the screen-level workflows built on
//! top of them.

pub mod api;
pub mod cli;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod push;
pub mod screens;
pub mod session;
