//! Data access layer: crawl archives and the external HTTP services.

pub mod html;
pub mod kb;
pub mod search;
pub mod warc;

use reqwest::Client;

use crate::{
    config::Settings,
    error::{LinkError, LinkResult},
};

pub(crate) fn http_client(settings: &Settings, service: &'static str) -> LinkResult<Client> {
    Client::builder()
        .user_agent(concat!("warc-linker/", env!("CARGO_PKG_VERSION")))
        .timeout(settings.http_timeout())
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|source| LinkError::Upstream { service, source })
}
