//! Application layer use cases for the agent.
//!
//! - **`control_device`** – The device-state controller and connectivity
//!   resynchronizer.  Owns the mirror, validates writes against it, and
//!   delegates byte transfer to a `CommandLink` implementation injected at
//!   construction time.
//!
//! - **`route_responses`** – Forwards trimmed response lines from the
//!   transport's receive worker to an external `StatusSink`, decoupling read
//!   cadence from reporting cadence.

pub mod control_device;
pub mod route_responses;
