use std::time::Duration;

use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use linkpilot_core::JobHandle;
use pilot_logging::{pilot_debug, pilot_info};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use url::{form_urlencoded, Url};

use crate::ClientError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const EVENT_STREAM: &str = "text/event-stream";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub server_url: String,
    pub connect_timeout: Duration,
    /// Applies to job submission only; the progress channel is long-lived.
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Raw bytes of a job's server-sent event stream.
pub type ProgressBytes = BoxStream<'static, Result<Bytes, ClientError>>;

#[async_trait::async_trait]
pub trait JobBackend: Send + Sync {
    async fn submit(&self, links: &[String]) -> Result<JobHandle, ClientError>;

    async fn open_progress(&self, job: &JobHandle) -> Result<ProgressBytes, ClientError>;
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    job_id: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReqwestJobClient {
    base: Url,
    client: reqwest::Client,
    stream_client: reqwest::Client,
}

impl ReqwestJobClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let base = Url::parse(&settings.server_url)
            .map_err(|err| ClientError::InvalidBaseUrl(format!("{}: {err}", settings.server_url)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(settings.server_url));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::Build(err.to_string()))?;
        let stream_client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ClientError::Build(err.to_string()))?;

        Ok(Self {
            base,
            client,
            stream_client,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait::async_trait]
impl JobBackend for ReqwestJobClient {
    async fn submit(&self, links: &[String]) -> Result<JobHandle, ClientError> {
        let url = self.endpoint(&["process"])?;
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("links", &links.join("\n"))
            .finish();

        pilot_info!("Submitting job url={} links={}", url, links.len());
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        parse_submit_response(status, &bytes)
    }

    async fn open_progress(&self, job: &JobHandle) -> Result<ProgressBytes, ClientError> {
        let url = self.endpoint(&["status", job.as_str()])?;
        pilot_debug!("Opening progress channel url={}", url);

        let response = self
            .stream_client
            .get(url)
            .header(ACCEPT, EVENT_STREAM)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::HttpStatus(status.as_u16()));
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(map_reqwest_error))
            .boxed())
    }
}

fn parse_submit_response(
    status: reqwest::StatusCode,
    body: &[u8],
) -> Result<JobHandle, ClientError> {
    match serde_json::from_slice::<SubmitResponse>(body) {
        Ok(SubmitResponse {
            error: Some(error), ..
        }) => Err(ClientError::Rejected(error)),
        _ if !status.is_success() => Err(ClientError::HttpStatus(status.as_u16())),
        Ok(SubmitResponse {
            job_id: Some(job_id),
            ..
        }) if !job_id.trim().is_empty() => Ok(JobHandle::new(job_id)),
        Ok(_) => Err(ClientError::InvalidResponse("missing job_id".to_string())),
        Err(err) => Err(ClientError::InvalidResponse(err.to_string())),
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::Timeout;
    }
    ClientError::Network(err.to_string())
}
