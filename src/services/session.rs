// src/services/session.rs

//! HTTP session against the portal.
//!
//! One session owns one client, so the cookie set by the login response is
//! sent with every later request. Failed requests are logged and reported
//! as `None`; the crawl treats them as empty pages.

use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::models::PortalConfig;
use crate::utils::http::create_client;

/// Login script
pub const PATH_LOGIN: &str = "login.pl";
/// Project, distribution and version listings
pub const PATH_DEPLOY: &str = "deploy.pl";
/// File downloads
pub const PATH_ATTACHMENT: &str = "attachment.pl";

/// Body of a successful response.
#[derive(Debug)]
pub enum Page {
    /// Response declared as HTML
    Html(Html),
    /// Any other content, e.g. a downloaded file
    Binary(Vec<u8>),
}

impl Page {
    pub fn into_html(self) -> Option<Html> {
        match self {
            Page::Html(html) => Some(html),
            Page::Binary(_) => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Page::Binary(bytes) => Some(bytes),
            Page::Html(_) => None,
        }
    }
}

/// Logged-in connection to the portal.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    base_url: Url,
}

impl Session {
    /// Create a session from portal settings.
    pub fn new(config: &PortalConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
            base_url: config.base_url()?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of a portal script with the given query parameters.
    pub fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.join(path)?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(key, value)| (*key, value.as_str())));
        }
        Ok(url)
    }

    /// Post the login form. The returned page lists the user's projects.
    pub fn login(&self, user: &str, password: &str) -> Result<Option<Page>> {
        let url = self.endpoint(PATH_LOGIN, &[])?;
        log::debug!("POST {url} (login as {user})");

        let form = [("Do", "LOGIN"), ("Al", user), ("Passwd", password)];
        let response = self.client.post(url.clone()).form(&form).send();

        Ok(Self::receive(&url, response))
    }

    /// GET a portal script with query parameters.
    pub fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Option<Page>> {
        let url = self.endpoint(path, params)?;
        Ok(self.fetch(&url))
    }

    /// GET an absolute URL.
    pub fn fetch(&self, url: &Url) -> Option<Page> {
        log::debug!("GET {url}");
        let response = self.client.get(url.clone()).send();
        Self::receive(url, response)
    }

    /// Classify a response: HTML for `text/html`-like content types,
    /// binary otherwise. Anything but `200 OK` yields `None`.
    fn receive(url: &Url, response: reqwest::Result<Response>) -> Option<Page> {
        let response = match response {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Request to {url} failed: {e}");
                return None;
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            log::warn!("Request to {url} returned {status}");
            return None;
        }

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.to_ascii_lowercase().contains("html"));

        let page = if is_html {
            response.text().map(|text| Page::Html(Html::parse_document(&text)))
        } else {
            response.bytes().map(|bytes| Page::Binary(bytes.to_vec()))
        };

        page.map_err(|e| log::warn!("Failed to read response from {url}: {e}"))
            .ok()
    }
}
