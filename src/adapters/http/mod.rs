//! HTTP adapter: `PredictTransport` over a blocking reqwest client.
//!
//! One call is one attempt. The per-attempt timeout is set on the client,
//! so a sleeping remote instance surfaces as `TransportError::Timeout`.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::domain::PatientRecord;
use crate::ports::{PredictTransport, TransportError, TransportReply};

/// Posts prediction requests to a fixed endpoint URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    /// Build a transport for `url` with the given per-attempt timeout.
    ///
    /// # Errors
    /// Returns `TransportError::Other` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::Connect(e.to_string())
    } else {
        TransportError::Other(e.to_string())
    }
}

impl PredictTransport for HttpTransport {
    fn post_predict(&self, record: &PatientRecord) -> Result<TransportReply, TransportError> {
        let response = self
            .client
            .post(&self.url)
            .json(record)
            .send()
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let body = response.bytes().map_err(map_reqwest_error)?.to_vec();

        tracing::debug!("POST {} -> {} ({} bytes)", self.url, status, body.len());
        Ok(TransportReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample_record;
    use axum::http::header;
    use axum::routing::post;
    use axum::Router;
    use std::net::SocketAddr;

    const OK_BODY: &str = r#"{"prediction":1,"probability":0.7}"#;

    /// Serve `router` on a loopback port from a runtime on its own thread.
    fn serve(router: Router) -> SocketAddr {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.set_nonblocking(true).expect("nonblocking");
        let addr = listener.local_addr().expect("addr");

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).expect("listener");
                axum::serve(listener, router).await.expect("serve");
            });
        });
        addr
    }

    fn predict_url(addr: SocketAddr) -> String {
        format!("http://{addr}/predict")
    }

    #[test]
    fn test_success_reply_is_passed_through() {
        let addr = serve(Router::new().route(
            "/predict",
            post(|| async { ([(header::CONTENT_TYPE, "application/json")], OK_BODY) }),
        ));
        let transport = HttpTransport::new(predict_url(addr), Duration::from_secs(5)).expect("client");

        let reply = transport.post_predict(&sample_record()).expect("reply");
        assert!(reply.is_success());
        assert_eq!(reply.body, OK_BODY.as_bytes().to_vec());
    }

    #[test]
    fn test_error_status_is_a_reply_not_a_transport_error() {
        let addr = serve(Router::new().route(
            "/predict",
            post(|| async {
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    r#"{"detail":"Internal server error"}"#,
                )
            }),
        ));
        let transport = HttpTransport::new(predict_url(addr), Duration::from_secs(5)).expect("client");

        let reply = transport.post_predict(&sample_record()).expect("reply");
        assert_eq!(reply.status, 500);
        assert!(!reply.is_success());
    }

    #[test]
    fn test_sleeping_service_times_out() {
        let addr = serve(Router::new().route(
            "/predict",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                OK_BODY
            }),
        ));
        let transport =
            HttpTransport::new(predict_url(addr), Duration::from_millis(300)).expect("client");

        assert_eq!(
            transport.post_predict(&sample_record()),
            Err(TransportError::Timeout)
        );
    }

    #[test]
    fn test_refused_connection_is_connect_error() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr")
        };
        let transport = HttpTransport::new(predict_url(addr), Duration::from_secs(2)).expect("client");

        let err = transport.post_predict(&sample_record()).expect_err("must fail");
        assert!(matches!(err, TransportError::Connect(_)), "{err:?}");
    }
}
