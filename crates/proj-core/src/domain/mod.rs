//! Domain module containing the device-state mirror.

pub mod state;

pub use state::{DeviceState, StateUpdate};
