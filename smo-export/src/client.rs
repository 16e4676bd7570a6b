use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, ORIGIN, REFERER};
use serde::{Deserialize, Serialize};
use smo_calendar::{DateSpan, Error, EventSource, RawEvent};
use tokio::time::Duration;
use tracing::debug;

const CALLS_PATH: &str = "/api/calls";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CallsRequest<'a> {
    bundle_version: &'a str,
    requests: [Call; 1],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Call {
    module_name: &'static str,
    endpoint_name: &'static str,
    parameters: EventQuery,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventQuery {
    institution_id: u64,
    start: String,
    end: String,
    include_holidays: bool,
}

#[derive(Deserialize)]
struct CallsResponse {
    #[serde(default)]
    results: Vec<CallResult>,
}

#[derive(Deserialize)]
struct CallResult {
    #[serde(default)]
    data: Option<EventData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventData {
    #[serde(default)]
    non_recurring_events: Option<Vec<RawEvent>>,
    #[serde(default)]
    recurring_events: Option<Vec<RawEvent>>,
}

/// Client for the public events endpoint of the Schulmanager calendar module.
pub struct SchulmanagerClient {
    http: reqwest::Client,
    calls_url: String,
    bundle_version: String,
    institution: u64,
}

impl SchulmanagerClient {
    pub fn new(
        base_url: &str,
        bundle_version: impl Into<String>,
        institution: u64,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ORIGIN, HeaderValue::from_str(base_url)?);
        headers.insert(REFERER, HeaderValue::from_str(&format!("{base_url}/"))?);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            calls_url: format!("{base_url}{CALLS_PATH}"),
            bundle_version: bundle_version.into(),
            institution,
        })
    }

    async fn request(&self, span: &DateSpan) -> reqwest::Result<Vec<RawEvent>> {
        let body = CallsRequest {
            bundle_version: &self.bundle_version,
            requests: [Call {
                module_name: "calendar",
                endpoint_name: "get-public-events",
                parameters: EventQuery {
                    institution_id: self.institution,
                    start: span.start.to_string(),
                    end: span.end.to_string(),
                    include_holidays: true,
                },
            }],
        };

        debug!(url = %self.calls_url, %span, "requesting events");

        let response: CallsResponse = self
            .http
            .post(&self.calls_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(data) = response.results.into_iter().next().and_then(|result| result.data) else {
            return Ok(Vec::new());
        };

        let mut events = data.non_recurring_events.unwrap_or_default();
        events.extend(data.recurring_events.unwrap_or_default());
        Ok(events)
    }
}

impl EventSource for SchulmanagerClient {
    async fn fetch(&self, span: &DateSpan) -> smo_calendar::Result<Vec<RawEvent>> {
        self.request(span)
            .await
            .map_err(|err| Error::fetch(*span, err))
    }
}
