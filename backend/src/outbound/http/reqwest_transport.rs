//! Reqwest-backed implementation of the HTTP transport port.
//!
//! This adapter owns client construction and error classification only. It
//! sends exactly one request per call; retries belong to the executor.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};

use crate::domain::ports::{
    HttpMethod, HttpTransport, HttpTransportError, OutboundRequest, OutboundResponse,
};

const DEFAULT_USER_AGENT: &str = concat!("route-weather/", env!("CARGO_PKG_VERSION"));

/// Shared reqwest client with a whole-request timeout.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    fn build(&self, request: &OutboundRequest) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method_for(request.method), request.url.clone())
            .header(reqwest::header::ACCEPT, "application/json");
        if !request.options.query.is_empty() {
            builder = builder.query(&request.options.query);
        }
        for (name, value) in &request.options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.options.json_body {
            builder = builder.json(body);
        }
        builder
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<OutboundResponse, HttpTransportError> {
        let response = self
            .build(request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_transport_error)?;
        Ok(OutboundResponse::new(status, body.to_vec()))
    }
}

fn method_for(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn map_transport_error(error: reqwest::Error) -> HttpTransportError {
    let message = error.to_string();
    if error.is_builder() {
        HttpTransportError::invalid_request(message)
    } else if error.is_timeout() {
        HttpTransportError::timeout(message)
    } else if error.is_connect() {
        HttpTransportError::connect(message)
    } else if error.is_decode() {
        HttpTransportError::decode(message)
    } else if error.is_request() || error.is_body() {
        HttpTransportError::network(message)
    } else {
        HttpTransportError::invalid_request(message)
    }
}
