use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::error::FetchError;
use crate::fetch::ResourceSource;
use crate::http_client::http_client;
use crate::state::{Records, View};

/// `{ "data": [...] }`, nothing else.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope<T> {
    data: Vec<T>,
}

/// Resource name relative to `/api/`, including query parameters.
pub fn resource_path(view: View, api: &ApiConfig) -> String {
    match view {
        View::Stats => format!(
            "{}?region={}&timespan={}",
            view.endpoint(),
            api.stats_region,
            api.stats_timespan
        ),
        View::Rankings => format!("{}?region={}", view.endpoint(), api.rankings_region),
        View::Matches | View::Past | View::Live | View::News => view.endpoint().to_string(),
    }
}

pub fn resource_url(view: View, api: &ApiConfig) -> String {
    format!(
        "{}/api/{}",
        api.base_url.trim_end_matches('/'),
        resource_path(view, api)
    )
}

pub fn parse_envelope<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, serde_json::Error> {
    let envelope: Envelope<T> = serde_json::from_str(raw.trim())?;
    Ok(envelope.data)
}

pub fn parse_records(view: View, raw: &str) -> Result<Records, serde_json::Error> {
    Ok(match view {
        View::Matches => Records::Upcoming(parse_envelope(raw)?),
        View::Past => Records::Past(parse_envelope(raw)?),
        View::Live => Records::Live(parse_envelope(raw)?),
        View::News => Records::News(parse_envelope(raw)?),
        View::Stats => Records::Stats(parse_envelope(raw)?),
        View::Rankings => Records::Rankings(parse_envelope(raw)?),
    })
}

/// Fetches from the dashboard backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    api: ApiConfig,
}

impl HttpSource {
    pub fn new(api: ApiConfig) -> Self {
        Self { api }
    }

    pub fn fetch_records(&self, view: View) -> Result<Records, FetchError> {
        let url = resource_url(view, &self.api);
        let client = http_client(self.api.timeout)
            .map_err(|err| FetchError::network(&url, format!("{err:#}")))?;

        let resp = client
            .get(&url)
            .send()
            .map_err(|err| self.request_error(&url, err))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                url,
                status: status.as_u16(),
            });
        }

        let body = resp.text().map_err(|err| self.request_error(&url, err))?;
        parse_records(view, &body).map_err(|err| FetchError::malformed(&url, err.to_string()))
    }

    fn request_error(&self, url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                secs: self.api.timeout.as_secs(),
            }
        } else if err.is_decode() {
            FetchError::malformed(url, err.to_string())
        } else {
            FetchError::network(url, err.to_string())
        }
    }
}

impl ResourceSource for HttpSource {
    fn fetch(&self, view: View) -> Result<Records, FetchError> {
        self.fetch_records(view)
    }

    fn describe(&self, view: View) -> String {
        resource_url(view, &self.api)
    }
}
