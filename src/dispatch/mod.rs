use reqwest::{header, Client, Url};
use serde_json::Value;

use crate::core::DispatchError;
use crate::models::PaymentInfo;

/// What the transaction endpoint answered to an accepted record.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    pub status: u16,
    pub body: Option<Value>,
}

/// Posts payment records to the transaction endpoint.
#[derive(Clone)]
pub struct Dispatcher {
    client: Client,
    endpoint: Url,
}

impl Dispatcher {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Dispatcher { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn send(&self, info: &PaymentInfo) -> Result<DispatchReport, DispatchError> {
        tracing::info!(endpoint = %self.endpoint, ?info, "Sending payment info");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .json(info)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = body_or_read_error(response.text().await);
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body,
            });
        }

        let text = response.text().await?;
        let body = serde_json::from_str::<Value>(&text).ok();
        tracing::info!(status = status.as_u16(), "Payment info successfully sent: {}", text);

        Ok(DispatchReport {
            status: status.as_u16(),
            body,
        })
    }
}

/// Body of a rejected response; a body that cannot be read is described
/// in its place so the rejection is still logged with a reason.
fn body_or_read_error(body: Result<String, reqwest::Error>) -> String {
    match body {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Could not read rejected response body: {}", e);
            format!("<unreadable response body: {}>", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header as header_eq, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn info() -> PaymentInfo {
        PaymentInfo {
            amount: 50.0,
            payment_date: "2024-03-01".to_string(),
            institution: "ACME".to_string(),
            user: "bob".to_string(),
        }
    }

    fn dispatcher(server: &MockServer) -> Dispatcher {
        let endpoint = Url::parse(&format!("{}/transactions", server.uri())).unwrap();
        Dispatcher::new(Client::new(), endpoint)
    }

    #[tokio::test]
    async fn posts_record_as_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transactions"))
            .and(header_eq("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "amount": 50.0,
                "payment_date": "2024-03-01",
                "institution": "ACME",
                "user": "bob"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({ "id": 7 })))
            .expect(1)
            .mount(&server)
            .await;

        let report = dispatcher(&server).send(&info()).await.unwrap();

        assert_eq!(report.status, 201);
        assert_eq!(report.body, Some(serde_json::json!({ "id": 7 })));
    }

    #[tokio::test]
    async fn non_json_success_body_is_tolerated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("created"))
            .mount(&server)
            .await;

        let report = dispatcher(&server).send(&info()).await.unwrap();
        assert_eq!(report.status, 200);
        assert_eq!(report.body, None);
    }

    #[tokio::test]
    async fn server_error_includes_response_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
            .expect(1)
            .mount(&server)
            .await;

        let err = dispatcher(&server).send(&info()).await.unwrap_err();

        assert!(matches!(err, DispatchError::Rejected { status: 500, .. }));
        let message = err.to_string();
        assert!(message.contains("Internal Server Error"));
        assert!(message.contains("database unavailable"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let endpoint = Url::parse("http://127.0.0.1:1/transactions").unwrap();

        let err = Dispatcher::new(Client::new(), endpoint)
            .send(&info())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Transport(_)));
    }

    #[tokio::test]
    async fn unreadable_rejection_body_is_described() {
        let read_error = Client::new()
            .get("http://127.0.0.1:1/")
            .send()
            .await
            .unwrap_err();

        let body = body_or_read_error(Err(read_error));
        assert!(body.starts_with("<unreadable response body: "));
    }
}
