use std::time::Duration;

use anyhow::{Context, Result};

use super::models::{BarcodeRequest, ConfirmationResult, FailureResponse, HealthResponse};

pub const DEFAULT_API_URL: &str = "http://localhost:8015";

const SCAN_TIMEOUT: Duration = Duration::from_secs(10);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(15);

/// Result of submitting a scan to a running API.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Confirmed(ConfirmationResult),
    Rejected { status: u16, failure: FailureResponse },
}

/// Thin HTTP client for the intake API.
pub struct IntakeClient {
    base_url: String,
    http: reqwest::Client,
}

impl IntakeClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn scan(&self, barcode: &str) -> Result<ScanOutcome> {
        let url = format!("{}/api/process-barcode", self.base_url);
        let resp = self
            .http
            .post(&url)
            .timeout(SCAN_TIMEOUT)
            .json(&BarcodeRequest {
                barcode: barcode.to_string(),
            })
            .send()
            .await
            .with_context(|| format!("Failed to reach intake API at {}", self.base_url))?;

        let status = resp.status();
        if status.is_success() {
            let result = resp
                .json::<ConfirmationResult>()
                .await
                .context("Failed to parse confirmation from intake API")?;
            Ok(ScanOutcome::Confirmed(result))
        } else {
            let failure = resp
                .json::<FailureResponse>()
                .await
                .with_context(|| format!("Intake API returned {} without a failure body", status))?;
            Ok(ScanOutcome::Rejected {
                status: status.as_u16(),
                failure,
            })
        }
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let url = format!("{}/", self.base_url);
        self.http
            .get(&url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .with_context(|| format!("Failed to reach intake API at {}", self.base_url))?
            .error_for_status()
            .context("Intake API health endpoint returned error status")?
            .json::<HealthResponse>()
            .await
            .context("Failed to parse health response from intake API")
    }
}
