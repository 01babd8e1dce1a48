//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **cache**: in-process and Redis route caches behind a switchable facade
//! - **http**: reqwest transport used by the retrying executor
//! - **google_directions**: driving directions source
//! - **open_meteo**: hourly forecast source
//!
//! Adapters translate between provider payloads and domain types. They hold
//! no business logic.

pub mod cache;
pub mod google_directions;
pub mod http;
pub mod open_meteo;
