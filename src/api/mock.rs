//! Scripted transport for unit tests: replies are queued up front, requests are recorded.

use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{ApiClient, ApiRequest, ApiResponse, Transport};
use crate::error::{ClientError, RequestError};
use crate::storage::SessionStorage;

#[derive(Default)]
pub(crate) struct MockTransport {
    replies: Mutex<VecDeque<Result<ApiResponse, ClientError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub(crate) fn client(storage: Arc<dyn SessionStorage>) -> (Arc<MockTransport>, ApiClient) {
        let transport = Arc::new(MockTransport::default());
        let client = ApiClient::new(transport.clone(), storage);
        (transport, client)
    }

    pub(crate) fn respond(&self, status: u16, body: Value) {
        self.replies.lock().unwrap().push_back(Ok(ApiResponse {
            status,
            body: Some(body),
        }));
    }

    pub(crate) fn fail_unreachable(&self) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(ClientError::Request(RequestError::unreachable())));
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, ClientError>> {
        self.requests.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Request(RequestError::unreachable())));
        Box::pin(async move { reply })
    }
}
