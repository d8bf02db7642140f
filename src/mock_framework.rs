//! # Mock Framework
//!
//! Utilities for testing order logic without a backend.
//!
//! Use [`create_mock_gateway`] to get a gateway and a receiver.
//! Then use [`expect_request`] to assert each call and script its reply.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::error::HttpError;
use crate::gateway::{ApiGateway, GatewayCall, Method};

pub type GatewayReply = oneshot::Sender<Result<Value, HttpError>>;

/// One call observed by the mock gateway, with the channel to answer it on.
#[derive(Debug)]
pub struct GatewayRequest {
    pub call: GatewayCall,
    pub respond_to: GatewayReply,
}

impl GatewayRequest {
    pub fn reply(self, result: Result<Value, HttpError>) {
        let _ = self.respond_to.send(result);
    }

    pub fn ok(self, value: Value) {
        self.reply(Ok(value));
    }

    pub fn fail(self, status: u16) {
        self.reply(Err(HttpError::from_status(status, format!("mock status {status}"))));
    }

    pub fn unreachable(self) {
        self.reply(Err(HttpError::unreachable("mock network down")));
    }
}

/// Gateway that forwards every call to a channel the test controls.
#[derive(Clone)]
pub struct ChannelGateway {
    sender: mpsc::Sender<GatewayRequest>,
}

#[async_trait]
impl ApiGateway for ChannelGateway {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, HttpError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(GatewayRequest {
                call: GatewayCall::new(method, path, body),
                respond_to,
            })
            .await
            .map_err(|_| HttpError::unreachable("mock gateway closed"))?;
        response
            .await
            .map_err(|_| HttpError::unreachable("mock reply dropped"))?
    }
}

/// Creates a mock gateway and a receiver for asserting requests.
///
/// # Testing Strategy
/// Each backend call the code under test makes shows up on `receiver`. The test
/// inspects it and replies with a body or an error, so every branch of the
/// update cascade and the aggregator can be driven deterministically.
pub fn create_mock_gateway(buffer_size: usize) -> (ChannelGateway, mpsc::Receiver<GatewayRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ChannelGateway { sender }, receiver)
}

/// Waits for the next request and checks its method and path.
pub async fn expect_request(
    receiver: &mut mpsc::Receiver<GatewayRequest>,
    method: Method,
    path: &str,
) -> Option<GatewayRequest> {
    match receiver.recv().await {
        Some(request) if request.call.method == method && request.call.path == path => Some(request),
        _ => None,
    }
}

/// Collects the next `count` requests, in arrival order.
pub async fn next_requests(receiver: &mut mpsc::Receiver<GatewayRequest>, count: usize) -> Vec<GatewayRequest> {
    let mut requests = Vec::with_capacity(count);
    while requests.len() < count {
        match receiver.recv().await {
            Some(request) => requests.push(request),
            None => break,
        }
    }
    requests
}

/// Asserts that nothing else reached the gateway.
pub fn assert_no_request(receiver: &mut mpsc::Receiver<GatewayRequest>) {
    if let Ok(request) = receiver.try_recv() {
        panic!("Unexpected gateway call: {} {}", request.call.method, request.call.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_gateway() {
        let (gateway, mut receiver) = create_mock_gateway(10);

        let call = tokio::spawn(async move { gateway.put("orders/3", Some(json!({"status": "paid"}))).await });

        let request = expect_request(&mut receiver, Method::Put, "orders/3")
            .await
            .expect("Expected PUT orders/3");
        assert_eq!(request.call.body, Some(json!({"status": "paid"})));
        request.fail(403);

        let result = call.await.unwrap();
        assert!(result.unwrap_err().is_forbidden());
        assert_no_request(&mut receiver);
    }
}
