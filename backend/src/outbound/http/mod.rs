//! Outbound HTTP transport adapters.

mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;
