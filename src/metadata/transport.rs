use super::ProviderError;
use std::time::Duration;
use tracing::debug;

/// Blocking HTTP GET seam used by the provider.
pub trait HttpTransport {
    fn get_text(&self, url: &str) -> Result<String, ProviderError>;
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ProviderError>;
}

pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Both the connect phase and the whole request are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, ProviderError> {
        debug!("GET {}", url);
        let response = self.client.get(url).send()?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

impl HttpTransport for ReqwestTransport {
    fn get_text(&self, url: &str) -> Result<String, ProviderError> {
        Ok(self.get(url)?.text()?)
    }

    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        Ok(self.get(url)?.bytes()?.to_vec())
    }
}
