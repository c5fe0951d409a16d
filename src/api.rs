/// Backend HTTP API client.
///
/// Talks to the carbon/task backend using the synchronous `ureq` client.
/// One endpoint per method, typed request/response structs throughout:
///
/// - **Carbon**: `GET /api/carbon-intensity?region=R`
/// - **Chat**: `POST /api/greenai`
/// - **Reports**: `GET /api/get-reports`, `GET /api/download-report/:name`
/// - **Tasks**: `POST /api/upload-task` (multipart), `POST /api/run-task`,
///   `POST /api/save-carbon-report`
///
/// The backend wraps domain failures in a `{success: false, error}`
/// envelope, sometimes behind a 4xx status — so status errors are still
/// parsed as JSON and the server-provided message wins over a generic
/// one. No retries anywhere: a failed call surfaces immediately and the
/// user re-triggers by hand.
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::GridwatchConfig;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A validated carbon intensity reading.
#[derive(Debug, Clone, Serialize)]
pub struct CarbonReading {
    pub region: String,
    /// Grams of CO2-equivalent per kWh. Always finite and >= 0 once validated.
    pub carbon_intensity: f64,
}

/// Raw carbon payload — `carbon_intensity` is null when the upstream
/// lookup failed, which callers must treat as an error, not a reading.
#[derive(Debug, Deserialize)]
struct WireCarbon {
    region: Option<String>,
    carbon_intensity: Option<f64>,
}

impl WireCarbon {
    fn into_reading(self, fallback_region: &str) -> Option<CarbonReading> {
        let carbon_intensity = self.carbon_intensity?;
        Some(CarbonReading {
            region: self.region.unwrap_or_else(|| fallback_region.to_string()),
            carbon_intensity,
        })
    }
}

/// A reply from the Green AI assistant.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub answer: String,
    /// Grid reading included by the backend, when it had one.
    pub carbon: Option<CarbonReading>,
}

#[derive(Debug, Deserialize)]
struct WireChat {
    answer: Option<String>,
    carbon: Option<WireCarbon>,
    error: Option<String>,
}

/// One entry in the remote report listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub filename: String,
    /// Size in bytes.
    pub size: u64,
    /// Backend timestamp string (naive isoformat).
    pub modified: String,
}

/// Server receipt for a successful task upload.
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    /// Server-assigned filename; the handle for `run_task`.
    pub filename: String,
    pub size: u64,
}

#[derive(Debug, Deserialize)]
struct WireUpload {
    #[serde(default)]
    success: bool,
    filename: Option<String>,
    size: Option<u64>,
    error: Option<String>,
}

/// A log file extracted from the task's output archive.
#[derive(Debug, Clone, Deserialize)]
pub struct RunLog {
    pub filename: String,
    pub content: String,
}

/// Result of a completed task execution.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub logs: Vec<RunLog>,
    /// Output archive identifier, used to build the download link.
    pub output_file: String,
}

#[derive(Debug, Deserialize)]
struct WireRun {
    #[serde(default)]
    success: bool,
    logs: Option<Vec<RunLog>>,
    output_file: Option<String>,
    error: Option<String>,
}

/// Carbon report record persisted after a completed run.
///
/// Numeric fields are pre-formatted strings — that is the wire format the
/// report store expects and writes into its CSVs verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct CarbonReport {
    pub task_name: String,
    pub region: String,
    pub carbon_intensity: f64,
    pub execution_time: String,
    pub energy_kwh: String,
    pub co2_grams: String,
    pub co2_saved: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    question: &'a str,
}

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    filename: &'a str,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous backend client. Cheap to construct, reused per command.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &GridwatchConfig) -> Self {
        Self::new(&config.api_base_url, Duration::from_millis(config.timeout_ms))
    }

    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// `GET /api/carbon-intensity?region=R` — current reading for a region.
    ///
    /// A null `carbon_intensity` in the payload (upstream lookup failure)
    /// is surfaced as an error; callers keep their previous displayed
    /// value rather than rendering a hole.
    pub fn carbon_intensity(&self, region: &str) -> Result<CarbonReading> {
        let url = format!("{}/api/carbon-intensity?region={region}", self.base_url);
        let wire: WireCarbon = self.get_json(&url, "carbon intensity")?;

        wire.into_reading(region)
            .with_context(|| format!("no carbon intensity available for region {region}"))
    }

    /// `POST /api/greenai` — single-turn assistant exchange.
    pub fn ask(&self, question: &str) -> Result<ChatReply> {
        let url = format!("{}/api/greenai", self.base_url);
        let result = ureq::post(&url)
            .timeout(self.timeout)
            .send_json(ChatRequest { question });
        let wire: WireChat = parse_json(result, "chat")?;

        if let Some(error) = wire.error {
            anyhow::bail!("{error}");
        }
        let answer = wire.answer.context("chat response carried no answer")?;
        let carbon = wire.carbon.and_then(|c| c.into_reading(""));

        Ok(ChatReply { answer, carbon })
    }

    /// `GET /api/get-reports` — full report listing, unsorted.
    pub fn reports(&self) -> Result<Vec<Report>> {
        let url = format!("{}/api/get-reports", self.base_url);
        self.get_json(&url, "report listing")
    }

    /// `GET /api/download-report/:name` — raw CSV body of one report.
    pub fn report_body(&self, filename: &str) -> Result<String> {
        let url = format!("{}/api/download-report/{filename}", self.base_url);
        let resp = ureq::get(&url)
            .timeout(self.timeout)
            .call()
            .with_context(|| format!("failed to download report {filename}"))?;
        resp.into_string()
            .with_context(|| format!("failed to read report {filename}"))
    }

    /// `POST /api/upload-task` — multipart upload of a local task archive.
    ///
    /// ureq carries no multipart support, so the body is assembled by
    /// hand (single `file` field, fixed boundary).
    pub fn upload_task(&self, path: &Path) -> Result<UploadReceipt> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .context("task path has no usable file name")?;
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let url = format!("{}/api/upload-task", self.base_url);
        let body = multipart_body("file", filename, &bytes, MULTIPART_BOUNDARY);
        let result = ureq::post(&url)
            .timeout(self.timeout)
            .set(
                "Content-Type",
                &format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .send_bytes(&body);
        let wire: WireUpload = parse_json(result, "upload")?;

        if !wire.success {
            anyhow::bail!("{}", wire.error.unwrap_or_else(|| "Upload failed".to_string()));
        }
        Ok(UploadReceipt {
            filename: wire.filename.context("upload succeeded without a filename")?,
            size: wire.size.unwrap_or(bytes.len() as u64),
        })
    }

    /// `POST /api/run-task` — execute a previously uploaded archive.
    pub fn run_task(&self, filename: &str) -> Result<RunOutcome> {
        let url = format!("{}/api/run-task", self.base_url);
        let result = ureq::post(&url)
            .timeout(self.timeout)
            .send_json(RunRequest { filename });
        let wire: WireRun = parse_json(result, "run")?;

        if !wire.success {
            anyhow::bail!(
                "{}",
                wire.error.unwrap_or_else(|| "Task execution failed".to_string())
            );
        }
        Ok(RunOutcome {
            logs: wire.logs.unwrap_or_default(),
            output_file: wire
                .output_file
                .context("run succeeded without an output file")?,
        })
    }

    /// Download link for a run's output archive.
    pub fn output_download_url(&self, output_file: &str) -> String {
        format!("{}/api/download-output/{output_file}", self.base_url)
    }

    /// `POST /api/save-carbon-report` — persist a post-run carbon report.
    pub fn save_carbon_report(&self, report: &CarbonReport) -> Result<()> {
        let url = format!("{}/api/save-carbon-report", self.base_url);
        ureq::post(&url)
            .timeout(self.timeout)
            .send_json(report)
            .context("failed to save carbon report")?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let result = ureq::get(url).timeout(self.timeout).call();
        parse_json(result, what)
    }
}

// ---------------------------------------------------------------------------
// Transport helpers
// ---------------------------------------------------------------------------

const MULTIPART_BOUNDARY: &str = "----gridwatch-upload-boundary";

/// Parse a JSON body out of a response, including error-status responses.
///
/// The backend's failure envelope may ride on a 4xx/5xx status; the body
/// is still the JSON the caller needs, so `Error::Status` is unwrapped
/// rather than short-circuited.
fn parse_json<T: DeserializeOwned>(
    result: Result<ureq::Response, ureq::Error>,
    what: &str,
) -> Result<T> {
    match result {
        Ok(resp) => resp
            .into_json::<T>()
            .with_context(|| format!("failed to parse {what} response")),
        Err(ureq::Error::Status(_, resp)) => resp
            .into_json::<T>()
            .with_context(|| format!("failed to parse {what} error response")),
        Err(e) => Err(e).with_context(|| format!("{what} request failed")),
    }
}

/// Assemble a single-field `multipart/form-data` body.
fn multipart_body(field: &str, filename: &str, bytes: &[u8], boundary: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/zip\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
