use crate::config::InstagramConfig;
use crate::error::AcquisitionError;
use crate::url_to_text::instagram::shortcode_from_url;
use log::{debug, info};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

/// Query variables for a single post document. Field order is part of the
/// wire format.
#[derive(Serialize)]
struct PostVariables<'a> {
    shortcode: &'a str,
    fetch_tagged_user_count: Option<u32>,
    hoisted_comment_id: Option<&'a str>,
    hoisted_reply_id: Option<&'a str>,
}

/// Fetches a post through Instagram's internal GraphQL endpoint.
pub struct InstagramFetcher {
    client: Client,
    endpoint: String,
    doc_id: String,
}

impl InstagramFetcher {
    pub fn new(config: &InstagramConfig) -> Result<Self, AcquisitionError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(AcquisitionError::Client)?;

        Ok(Self {
            client,
            endpoint: config.graphql_url.clone(),
            doc_id: config.doc_id.clone(),
        })
    }

    /// Fetch the raw `xdt_shortcode_media` node for a post URL or shortcode.
    pub async fn fetch(&self, url_or_shortcode: &str) -> Result<Value, AcquisitionError> {
        let shortcode = shortcode_from_url(url_or_shortcode);
        info!("Fetching Instagram post {}", shortcode);

        let body = request_body(&shortcode, &self.doc_id);
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|source| AcquisitionError::Transport {
                url: url_or_shortcode.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AcquisitionError::Status {
                url: url_or_shortcode.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| AcquisitionError::Transport {
                url: url_or_shortcode.to_string(),
                source,
            })?;

        let mut data: Value =
            serde_json::from_slice(&bytes).map_err(|e| AcquisitionError::Malformed {
                url: url_or_shortcode.to_string(),
                reason: format!("response is not JSON: {e}"),
            })?;
        debug!("Instagram response for {}: {}", shortcode, data);

        match data
            .get_mut("data")
            .and_then(|d| d.get_mut("xdt_shortcode_media"))
            .map(Value::take)
        {
            Some(media) if !media.is_null() => Ok(media),
            _ => Err(AcquisitionError::MissingData {
                url: url_or_shortcode.to_string(),
                node: "data.xdt_shortcode_media",
            }),
        }
    }
}

/// Form-encoded request body: `variables=<percent-encoded JSON>&doc_id=<id>`.
pub fn request_body(shortcode: &str, doc_id: &str) -> String {
    let variables = PostVariables {
        shortcode,
        fetch_tagged_user_count: None,
        hoisted_comment_id: None,
        hoisted_reply_id: None,
    };
    // Serializing a struct of strings and options cannot fail
    let json = serde_json::to_string(&variables).unwrap_or_default();
    format!("variables={}&doc_id={}", urlencoding::encode(&json), doc_id)
}
