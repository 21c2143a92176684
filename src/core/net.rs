// src/core/net.rs
//
// HTTP fetching behind a trait so the pipeline never touches the network
// directly. Tests feed fixture payloads through the same seam.

use std::time::Duration;

use crate::config::consts::{HTTP_TIMEOUT_SECS, USER_AGENT};
use crate::error::{Error, Result};

/// The only thing the pipeline knows about the network.
pub trait Fetch: Send + Sync {
    /// GET `url` and return the response body as text.
    fn get(&self, url: &str) -> Result<String>;
}

/// Real client. One instance per run, shared across workers.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Fetch(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| classify(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Fetch(format!("HTTP {status} for {url}")));
        }
        resp.text().map_err(|e| classify(url, e))
    }
}

fn classify(url: &str, e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(format!("{url}: {e}"))
    } else {
        Error::Fetch(format!("{url}: {e}"))
    }
}
