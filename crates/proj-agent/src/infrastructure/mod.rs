//! Infrastructure layer for the agent application.
//!
//! Contains the hardware- and boundary-facing adapters: the serial transport,
//! the cloud parameter boundary, status sinks, and configuration storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `proj_core`, but MUST NOT be imported by the `application` or domain
//! layers.
//!
//! # Sub-modules
//!
//! - **`serial`** – The tokio-serial transport implementing `CommandLink`,
//!   plus its receive worker and a `MockLink` recording fake for tests and
//!   port-less operation.
//!
//! - **`cloud`** – Boundary types for the (external) cloud parameter layer:
//!   tagged `ParameterWrite` dispatch inbound, JSON state documents outbound.
//!
//! - **`status`** – `StatusSink` implementations for the device response
//!   feed: tracing-backed logging and a channel sink.
//!
//! - **`storage`** – TOML configuration load/save.

pub mod cloud;
pub mod serial;
pub mod status;
pub mod storage;
