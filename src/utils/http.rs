// src/utils/http.rs

//! HTTP client utilities.

use reqwest::Proxy;
use reqwest::blocking::Client;

use crate::error::Result;
use crate::models::PortalConfig;

/// Create the blocking HTTP client shared by every request of a session.
///
/// Cookies set by the login response are kept for all later requests.
/// Certificate verification follows `accept_invalid_certs`, which is on by
/// default because the portal's certificate does not validate.
pub fn create_client(config: &PortalConfig) -> Result<Client> {
    let mut builder = Client::builder()
        .user_agent(&config.user_agent)
        .cookie_store(true)
        .danger_accept_invalid_certs(config.accept_invalid_certs);

    if let Some(proxy) = &config.proxy_http {
        builder = builder.proxy(Proxy::http(proxy)?);
    }
    if let Some(proxy) = &config.proxy_https {
        builder = builder.proxy(Proxy::https(proxy)?);
    }

    if config.accept_invalid_certs {
        log::debug!("TLS certificate verification is disabled");
    }

    Ok(builder.build()?)
}
