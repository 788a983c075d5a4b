//! Content acquisition: turn a URL into normalized text plus media URLs.

pub mod fetchers;
pub mod html;
pub mod instagram;

use log::info;
use reqwest::Url;
use serde::Serialize;

use crate::config::ExtractorConfig;
use crate::error::AcquisitionError;
use fetchers::{InstagramFetcher, RequestFetcher};
use instagram::{is_bare_shortcode, project_post};

/// Hosts served by the social post strategy (subdomains included).
const SOCIAL_HOSTS: &[&str] = &["instagram.com", "instagr.am"];

/// Acquisition strategy for a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    GenericPage,
    SocialPost,
}

/// Platform-agnostic text and media handed to the extraction engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedContent {
    pub source_url: String,
    pub source: SourceKind,
    pub text: String,
    pub media_urls: Vec<String>,
}

impl NormalizedContent {
    /// Content as sent to an extraction service: text, then the source URL and
    /// any media URLs the service may pick a photo from.
    pub fn to_prompt_input(&self) -> String {
        let mut input = self.text.clone();
        input.push_str("\n\nSource URL: ");
        input.push_str(&self.source_url);
        if !self.media_urls.is_empty() {
            input.push_str("\nMedia URLs:\n");
            for url in &self.media_urls {
                input.push_str("- ");
                input.push_str(url);
                input.push('\n');
            }
        }
        input
    }
}

/// Pick the acquisition strategy from the URL host.
///
/// Bare shortcodes (no scheme, only shortcode characters) are social posts.
pub fn classify(input: &str) -> SourceKind {
    match Url::parse(input) {
        Ok(url) => match url.host_str() {
            Some(host) if is_social_host(host) => SourceKind::SocialPost,
            _ => SourceKind::GenericPage,
        },
        Err(_) if is_bare_shortcode(input) => SourceKind::SocialPost,
        Err(_) => SourceKind::GenericPage,
    }
}

fn is_social_host(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_lowercase();
    SOCIAL_HOSTS.iter().any(|social| {
        host == *social
            || host
                .strip_suffix(social)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// Dispatches to the generic page or social post fetcher.
pub struct ContentAcquirer {
    page: RequestFetcher,
    instagram: InstagramFetcher,
}

impl ContentAcquirer {
    pub fn new(config: &ExtractorConfig) -> Result<Self, AcquisitionError> {
        Ok(Self {
            page: RequestFetcher::new(&config.fetch)?,
            instagram: InstagramFetcher::new(&config.instagram)?,
        })
    }

    pub async fn acquire(&self, url: &str) -> Result<NormalizedContent, AcquisitionError> {
        let url = url.trim();
        match classify(url) {
            SourceKind::GenericPage => self.acquire_page(url).await,
            SourceKind::SocialPost => self.acquire_post(url).await,
        }
    }

    async fn acquire_page(&self, url: &str) -> Result<NormalizedContent, AcquisitionError> {
        let parsed = Url::parse(url).map_err(|e| AcquisitionError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AcquisitionError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme `{}`", parsed.scheme()),
            });
        }

        let html = self.page.fetch(url).await?;
        let text = html::html_to_text(&html);
        info!("Fetched {} ({} characters of text)", url, text.len());

        if text.trim().is_empty() {
            return Err(AcquisitionError::Malformed {
                url: url.to_string(),
                reason: "page has no visible text".to_string(),
            });
        }

        Ok(NormalizedContent {
            source_url: url.to_string(),
            source: SourceKind::GenericPage,
            text,
            media_urls: Vec::new(),
        })
    }

    async fn acquire_post(&self, url: &str) -> Result<NormalizedContent, AcquisitionError> {
        let media = self.instagram.fetch(url).await?;
        let post = project_post(&media).map_err(|e| AcquisitionError::Malformed {
            url: url.to_string(),
            reason: format!("unexpected post shape: {e}"),
        })?;
        info!(
            "Fetched Instagram post {} ({} captions, {} owner comments)",
            post.shortcode.as_deref().unwrap_or(url),
            post.captions.len(),
            post.owner_comments.len()
        );

        let source_url = post.permalink().unwrap_or_else(|| url.to_string());
        Ok(NormalizedContent {
            source_url,
            source: SourceKind::SocialPost,
            text: post.to_text(),
            media_urls: post.media_urls(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_social_hosts() {
        assert_eq!(classify("https://instagram.com/p/ABC123/"), SourceKind::SocialPost);
        assert_eq!(
            classify("https://www.instagram.com/reel/XYZ_9/?x=1"),
            SourceKind::SocialPost
        );
        assert_eq!(classify("https://m.Instagram.com/p/A/"), SourceKind::SocialPost);
        assert_eq!(classify("https://instagr.am/p/A/"), SourceKind::SocialPost);
        assert_eq!(classify("ABC123"), SourceKind::SocialPost);
    }

    #[test]
    fn test_generic_hosts() {
        assert_eq!(
            classify("https://www.simplyrecipes.com/easy-brooklyn-blackout-cake-recipe-8745470"),
            SourceKind::GenericPage
        );
        assert_eq!(classify("https://notinstagram.com/p/A/"), SourceKind::GenericPage);
        assert_eq!(
            classify("https://instagram.com.evil.example/p/A/"),
            SourceKind::GenericPage
        );
        assert_eq!(classify("example.com/recipe"), SourceKind::GenericPage);
    }

    #[test]
    fn test_classification_is_deterministic() {
        for url in ["https://instagram.com/p/X/", "https://example.com/"] {
            assert_eq!(classify(url), classify(url));
        }
    }

    #[test]
    fn test_prompt_input_lists_media() {
        let content = NormalizedContent {
            source_url: "https://www.instagram.com/p/ABC123/".to_string(),
            source: SourceKind::SocialPost,
            text: "Lemon pasta".to_string(),
            media_urls: vec!["https://cdn.example.com/main.jpg".to_string()],
        };
        let input = content.to_prompt_input();
        assert!(input.starts_with("Lemon pasta"));
        assert!(input.contains("Source URL: https://www.instagram.com/p/ABC123/"));
        assert!(input.contains("- https://cdn.example.com/main.jpg"));
    }
}
