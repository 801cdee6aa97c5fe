use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::record::StrikeReport;
use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::{Client, RequestBuilder, Response};

/// Read and insert operations over strike reports.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// All reports, newest `created_at` first.
    async fn list_reports(&self) -> Result<Vec<StrikeReport>>;

    /// Inserts one report and returns the stored row(s) with server-assigned fields.
    async fn create_report(&self, report: &StrikeReport) -> Result<Vec<StrikeReport>>;
}

/// Record store reached through the hosted service's REST interface.
pub struct RestStore {
    client: Client,
    config: StoreConfig,
}

impl RestStore {
    pub fn new(config: StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    /// Attaches the API key both as `apikey` and as a bearer token.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    /// `GET` of every row, newest first.
    fn list_request(&self) -> RequestBuilder {
        let request = self
            .client
            .get(self.config.table_url())
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        self.authorize(request)
    }

    /// `POST` of a single-row array, asking for the stored row back.
    fn insert_request(&self, report: &StrikeReport) -> RequestBuilder {
        let request = self
            .client
            .post(self.config.table_url())
            .header("Prefer", "return=representation")
            .json(&[report]);
        self.authorize(request)
    }

    /// Turns a non-2xx response into `StoreError::Http`, otherwise decodes the body.
    async fn read_rows(response: Response) -> Result<Vec<StrikeReport>> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ReportStore for RestStore {
    async fn list_reports(&self) -> Result<Vec<StrikeReport>> {
        debug!("Fetching reports from {}", self.config.table_url());

        let response = self.list_request().send().await?;
        let reports = Self::read_rows(response).await?;

        info!("Loaded {} reports", reports.len());
        Ok(reports)
    }

    async fn create_report(&self, report: &StrikeReport) -> Result<Vec<StrikeReport>> {
        report.validate()?;

        debug!("Submitting report: {:?}", report);

        let response = self.insert_request(report).send().await?;

        match Self::read_rows(response).await {
            Ok(stored) => {
                info!(
                    "Stored report {:?} for {}",
                    stored.first().and_then(|r| r.id),
                    report.building
                );
                Ok(stored)
            }
            Err(e) => {
                error!("Insert failed: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::BirdCondition;
    use chrono::NaiveDate;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned HTTP response on a local port and returns a store pointed at it.
    async fn canned_store(status_line: &str, body: &str) -> RestStore {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            // read headers and any body fully so the close is clean
            loop {
                if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&request[..end]).to_lowercase();
                    let body_len = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + body_len {
                        break;
                    }
                }
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        let config = StoreConfig::new(&format!("http://{}", addr), "anon-key")
            .unwrap()
            .with_timeout(5);
        RestStore::new(config).unwrap()
    }

    fn sample_report() -> StrikeReport {
        let mut report = StrikeReport::new(
            NaiveDate::from_ymd_opt(2025, 9, 14).unwrap(),
            "Mourant",
            BirdCondition::Stunned,
        );
        report.species = Some("Merlin".to_string());
        report
    }

    fn store() -> RestStore {
        let config = StoreConfig::new("http://127.0.0.1:9", "anon-key")
            .unwrap()
            .with_timeout(1);
        RestStore::new(config).unwrap()
    }

    #[test]
    fn test_requests_carry_both_auth_headers() {
        let store = store();
        let request = store
            .authorize(store.client.get(store.config.table_url()))
            .build()
            .unwrap();
        assert_eq!(request.headers()["apikey"], "anon-key");
        assert_eq!(request.headers()["authorization"], "Bearer anon-key");
    }

    #[test]
    fn test_list_request_orders_newest_first() {
        let store = store();
        let request = store.list_request().build().unwrap();
        assert_eq!(*request.method(), reqwest::Method::GET);
        assert_eq!(request.url().path(), "/rest/v1/bird_strikes");
        assert_eq!(request.url().query(), Some("select=*&order=created_at.desc"));
        assert_eq!(request.headers()["apikey"], "anon-key");
    }

    #[test]
    fn test_insert_request_sends_one_row_array() {
        let store = store();
        let request = store.insert_request(&sample_report()).build().unwrap();
        assert_eq!(*request.method(), reqwest::Method::POST);
        assert_eq!(request.headers()["prefer"], "return=representation");
        assert_eq!(request.headers()["authorization"], "Bearer anon-key");

        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let rows: serde_json::Value = serde_json::from_slice(body).unwrap();
        let rows = rows.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["building"], "Mourant");
        assert_eq!(rows[0]["bird_condition"], "stunned");
        assert!(rows[0].get("id").is_none());
        assert!(rows[0].get("created_at").is_none());
    }

    #[tokio::test]
    async fn test_error_status_maps_to_http_error() {
        let store = canned_store("503 Service Unavailable", "{\"message\":\"down\"}").await;
        match store.list_reports().await {
            Err(StoreError::Http { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "{\"message\":\"down\"}");
            }
            other => panic!("expected HTTP error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_maps_to_decode_error() {
        let store = canned_store("200 OK", "[{\"date\": ").await;
        let err = store.list_reports().await.unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[tokio::test]
    async fn test_insert_returns_stored_rows() {
        let body = r#"[{"id":41,"date":"2025-09-14","time":null,"location":null,"building":"Mourant","bird_condition":"stunned","species":"Merlin","reporter_email":null,"notes":null,"created_at":"2025-09-14T16:20:01+00:00"}]"#;
        let store = canned_store("201 Created", body).await;
        let stored = store.create_report(&sample_report()).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, Some(41));
        assert!(stored[0].created_at.is_some());
    }

    #[tokio::test]
    async fn test_invalid_report_is_rejected_before_sending() {
        let report = StrikeReport::new(
            NaiveDate::from_ymd_opt(2025, 9, 14).unwrap(),
            "",
            BirdCondition::Injured,
        );
        let err = store().create_report(&report).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_unreachable_store_is_a_transport_error() {
        let err = store().list_reports().await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
    }
}
