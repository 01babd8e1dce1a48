//! Google Directions outbound adapter.
//!
//! This module provides the HTTP implementation of the `DirectionsSource`
//! port on top of the retrying request executor.

mod dto;
mod source;

pub use source::{GOOGLE_DIRECTIONS_URL, GoogleDirectionsSource};
