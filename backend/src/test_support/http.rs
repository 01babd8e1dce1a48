//! Scripted HTTP transport for retry and adapter tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::ports::{HttpTransport, HttpTransportError, OutboundRequest, OutboundResponse};

/// Transport that replays scripted results in order.
///
/// Once the script is exhausted the last scripted result is repeated, which
/// lets tests describe "always fails" with a single entry.
pub struct ScriptedTransport {
    scripted: Mutex<VecDeque<Result<OutboundResponse, HttpTransportError>>>,
    last: Mutex<Option<Result<OutboundResponse, HttpTransportError>>>,
    requests: Mutex<Vec<OutboundRequest>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    /// Replay `scripted` one result per call.
    pub fn new(scripted: Vec<Result<OutboundResponse, HttpTransportError>>) -> Self {
        Self {
            scripted: Mutex::new(scripted.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer every call with `status` and a JSON body.
    pub fn always_json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(vec![Ok(OutboundResponse::new(status, body.to_string()))])
    }

    /// Number of `send` calls observed.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests observed so far, in order.
    pub fn requests(&self) -> Vec<OutboundRequest> {
        match self.requests.lock() {
            Ok(requests) => requests.clone(),
            Err(_) => panic!("requests mutex"),
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<OutboundResponse, HttpTransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.requests.lock() {
            Ok(mut requests) => requests.push(request.clone()),
            Err(_) => panic!("requests mutex"),
        }

        let next = match self.scripted.lock() {
            Ok(mut scripted) => scripted.pop_front(),
            Err(_) => panic!("script mutex"),
        };
        let mut last = match self.last.lock() {
            Ok(last) => last,
            Err(_) => panic!("last result mutex"),
        };
        if let Some(result) = next {
            *last = Some(result);
        }
        match last.as_ref() {
            Some(result) => result.clone(),
            None => panic!("scripted transport has no results"),
        }
    }
}
