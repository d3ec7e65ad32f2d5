//! Request transport to the emulator backend.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::BackendError,
    protocol::{decode_reply, AssembleForm, Endpoint, Method, Reply},
};
use url::Url;

#[async_trait]
pub trait EmulatorTransport: Send + Sync {
    /// Performs one request and returns the raw body of a successful response.
    async fn send(&self, endpoint: Endpoint, form: Option<&AssembleForm>) -> Result<String>;
}

/// HTTP transport holding one cookie jar, so every request lands in the same
/// server-side emulator session.
pub struct HttpTransport {
    http: Client,
    server_url: String,
}

impl HttpTransport {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(server_url)
            .with_context(|| format!("invalid emulator server url '{server_url}'"))?;
        let http = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            http,
            server_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl EmulatorTransport for HttpTransport {
    async fn send(&self, endpoint: Endpoint, form: Option<&AssembleForm>) -> Result<String> {
        let url = format!("{}{}", self.server_url, endpoint.path());
        let request = match endpoint.method() {
            Method::Get => self.http.get(&url),
            Method::Post => {
                let request = self.http.post(&url);
                match form {
                    Some(form) => request.form(form),
                    None => request,
                }
            }
        };
        let res = request.send().await?.error_for_status()?;
        Ok(res.text().await?)
    }
}

/// Sends a request and decodes the outcome into the tagged reply, so callers
/// never look at the sentinel or at transport errors directly.
pub async fn exchange(
    transport: &dyn EmulatorTransport,
    endpoint: Endpoint,
    form: Option<&AssembleForm>,
) -> Reply {
    match transport.send(endpoint, form).await {
        Ok(body) => decode_reply(endpoint, body),
        Err(err) => Err(BackendError::transport(endpoint, format!("{err:#}"))),
    }
}
