use crate::config::FetchConfig;
use crate::error::AcquisitionError;
use log::debug;
use reqwest::Client;

/// Plain HTTP GET fetcher for generic recipe pages.
pub struct RequestFetcher {
    client: Client,
}

impl RequestFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, AcquisitionError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(AcquisitionError::Client)?;

        Ok(Self { client })
    }

    /// Fetch the page body. Non-2xx answers are errors.
    pub async fn fetch(&self, url: &str) -> Result<String, AcquisitionError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| AcquisitionError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AcquisitionError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| AcquisitionError::Transport {
                url: url.to_string(),
                source,
            })
    }
}
