mod projection;
mod shortcode;

pub use projection::project_post;
pub use shortcode::{is_bare_shortcode, shortcode_from_url};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Flat view of an Instagram post, projected from the GraphQL response.
///
/// Every field is read leniently: a value of an unexpected JSON type leaves
/// that field empty instead of rejecting the post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialPost {
    #[serde(deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub shortcode: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub owner: Option<String>,
    #[serde(deserialize_with = "lenient::object")]
    pub dimensions: Option<Dimensions>,
    #[serde(deserialize_with = "lenient::text")]
    pub src: Option<String>,
    #[serde(deserialize_with = "lenient::texts")]
    pub src_attached: Vec<String>,
    #[serde(deserialize_with = "lenient::flag")]
    pub has_audio: Option<bool>,
    #[serde(deserialize_with = "lenient::text")]
    pub video_url: Option<String>,
    #[serde(deserialize_with = "lenient::count")]
    pub views: Option<u64>,
    #[serde(deserialize_with = "lenient::count")]
    pub plays: Option<u64>,
    #[serde(deserialize_with = "lenient::count")]
    pub likes: Option<u64>,
    #[serde(deserialize_with = "lenient::text")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub taken_at: Option<i64>,
    #[serde(deserialize_with = "lenient::texts")]
    pub related: Vec<String>,
    #[serde(rename = "type", deserialize_with = "lenient::text")]
    pub product_type: Option<String>,
    #[serde(deserialize_with = "lenient::float")]
    pub video_duration: Option<f64>,
    pub music: Option<Value>,
    #[serde(deserialize_with = "lenient::flag")]
    pub is_video: Option<bool>,
    #[serde(deserialize_with = "lenient::texts")]
    pub tagged_users: Vec<String>,
    #[serde(deserialize_with = "lenient::texts")]
    pub captions: Vec<String>,
    #[serde(deserialize_with = "lenient::texts")]
    pub related_profiles: Vec<String>,
    #[serde(deserialize_with = "lenient::count")]
    pub comments_count: Option<u64>,
    #[serde(deserialize_with = "lenient::flag")]
    pub comments_disabled: Option<bool>,
    #[serde(deserialize_with = "lenient::text")]
    pub comments_next_page: Option<String>,
    #[serde(deserialize_with = "lenient::objects")]
    pub owner_comments: Vec<PostComment>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    #[serde(deserialize_with = "lenient::pixels")]
    pub height: u32,
    #[serde(deserialize_with = "lenient::pixels")]
    pub width: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostComment {
    #[serde(deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub text: Option<String>,
    #[serde(deserialize_with = "lenient::timestamp")]
    pub created_at: Option<i64>,
    #[serde(deserialize_with = "lenient::text")]
    pub owner: Option<String>,
}

/// Field readers that map a mistyped value to "absent" rather than an error.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn as_text(value: Value) -> Option<String> {
        match value {
            Value::String(text) => Some(text),
            // Numeric ids show up as numbers in some responses
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    fn as_count(value: &Value) -> Option<u64> {
        value.as_u64().or_else(|| {
            value
                .as_f64()
                .filter(|n| n.is_finite() && *n >= 0.0)
                .map(|n| n.round() as u64)
        })
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(as_text(Value::deserialize(deserializer)?))
    }

    pub fn texts<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items.into_iter().filter_map(as_text).collect(),
            _ => Vec::new(),
        })
    }

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
        Ok(Value::deserialize(deserializer)?.as_bool())
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        Ok(as_count(&Value::deserialize(deserializer)?))
    }

    pub fn pixels<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(as_count(&value)
            .map(|n| n.min(u64::from(u32::MAX)) as u32)
            .unwrap_or_default())
    }

    pub fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value
            .as_i64()
            .or_else(|| value.as_f64().filter(|n| n.is_finite()).map(|n| n as i64)))
    }

    pub fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        Ok(Value::deserialize(deserializer)?.as_f64())
    }

    pub fn object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(deserializer)? {
            value @ Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        })
    }

    pub fn objects<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }
}

impl SocialPost {
    /// Canonical post URL, when the shortcode is known.
    pub fn permalink(&self) -> Option<String> {
        let shortcode = self.shortcode.as_deref()?;
        let marker = if self.product_type.as_deref() == Some("clips") {
            "reel"
        } else {
            "p"
        };
        Some(format!("https://www.instagram.com/{marker}/{shortcode}/"))
    }

    /// Display URLs of the post: primary image, carousel items, then video.
    pub fn media_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        let candidates = self
            .src
            .iter()
            .chain(self.src_attached.iter())
            .chain(self.video_url.iter());

        for url in candidates {
            if !url.is_empty() && !urls.contains(url) {
                urls.push(url.clone());
            }
        }
        urls
    }

    /// Caption followed by the owner's own comments, which often carry the
    /// rest of the recipe.
    pub fn to_text(&self) -> String {
        let mut sections = Vec::new();

        let mut header = Vec::new();
        if let Some(owner) = &self.owner {
            header.push(format!("Instagram post by @{owner}"));
        }
        if let Some(link) = self.permalink() {
            header.push(link);
        }
        if !header.is_empty() {
            sections.push(header.join("\n"));
        }

        for caption in &self.captions {
            let caption = caption.trim();
            if !caption.is_empty() {
                sections.push(caption.to_string());
            }
        }

        let comments: Vec<&str> = self
            .owner_comments
            .iter()
            .filter_map(|c| c.text.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        if !comments.is_empty() {
            let owner = self.owner.as_deref().unwrap_or("owner");
            sections.push(format!("Comments from @{owner}:\n{}", comments.join("\n")));
        }

        sections.join("\n\n")
    }
}
