//! The blocking HTTP client shared by every request of a run.

use crate::config::Config;
use crate::constants::{CONNECT_TIMEOUT_SECS, MAX_LISTING_PAGES, USER_AGENT};
use crate::errors::HostApiError;
use anyhow::Result;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, LINK};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Whether a request may carry the GitHub token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Attach the GitHub bearer token if one is configured.
    GitHubToken,
    /// Never attach credentials.
    Anonymous,
}

/// A `reqwest` blocking client plus the optional GitHub token.
///
/// Built once per run and shared by reference across worker threads. Not
/// `Debug`, so the token cannot leak into logs.
#[derive(Clone)]
pub struct HostClient {
    http: Client,
    github_token: Option<String>,
}

impl HostClient {
    /// Builds the client with default headers and the configured timeout.
    ///
    /// Without `--timeout` there is no overall request deadline, since a
    /// tarball download can legitimately take minutes.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, "application/vnd.github.v3+json, application/json, */*".parse()?);

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(config.timeout)
            .build()?;

        if config.github_token.is_some() {
            log::debug!("Using GitHub token for API authentication.");
        }

        Ok(Self {
            http: client,
            github_token: config.github_token.clone(),
        })
    }

    /// Starts a GET request, attaching the token when `auth` allows it.
    pub fn get(&self, url: &str, auth: Auth) -> RequestBuilder {
        let request = self.http.get(url);
        match (auth, &self.github_token) {
            (Auth::GitHubToken, Some(token)) => {
                request.header(AUTHORIZATION, format!("Bearer {}", token))
            }
            _ => request,
        }
    }

    /// Fetches and decodes one JSON document from a host API.
    pub fn get_json<T: DeserializeOwned>(&self, url: &str, auth: Auth) -> Result<T, HostApiError> {
        let response = self.send_api(url, auth)?;
        decode_body(url, response)
    }

    /// Fetches a JSON listing, following `Link: rel="next"` pagination.
    ///
    /// `decode` turns one page body into its items; pages are concatenated in
    /// order.
    pub fn get_json_pages<T, F>(
        &self,
        url: &str,
        auth: Auth,
        decode: F,
    ) -> Result<Vec<T>, HostApiError>
    where
        F: Fn(&str, Response) -> Result<Vec<T>, HostApiError>,
    {
        let mut items = Vec::new();
        let mut next = Some(url.to_string());
        let mut pages = 0;

        while let Some(page_url) = next.take() {
            pages += 1;
            if pages > MAX_LISTING_PAGES {
                log::warn!(
                    "Stopped following pagination for '{}' after {} pages",
                    url,
                    MAX_LISTING_PAGES
                );
                break;
            }
            let response = self.send_api(&page_url, auth)?;
            next = next_page_link(response.headers());
            items.extend(decode(&page_url, response)?);
        }
        Ok(items)
    }

    fn send_api(&self, url: &str, auth: Auth) -> Result<Response, HostApiError> {
        log::debug!("GET {}", url);
        let response = self
            .get(url, auth)
            .send()
            .map_err(|source| HostApiError::Request {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(HostApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

/// Reads a response body and decodes it as JSON.
pub(crate) fn decode_body<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, HostApiError> {
    let text = response.text().map_err(|source| HostApiError::Request {
        url: url.to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| HostApiError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Extracts the `rel="next"` target from a `Link` header.
pub(crate) fn next_page_link(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|part| {
            let mut pieces = part.split(';');
            let target = pieces.next()?.trim();
            let is_next = pieces.any(|param| {
                let param = param.trim();
                param == "rel=\"next\"" || param == "rel=next"
            });
            if is_next {
                Some(
                    target
                        .trim_start_matches('<')
                        .trim_end_matches('>')
                        .to_string(),
                )
            } else {
                None
            }
        })
}
