//! Fixed projection of the `xdt_shortcode_media` node onto [`SocialPost`].
//!
//! Each target field is read from one source path. Paths that cross an
//! `edges` array are flattened; missing nodes yield an absent value rather
//! than an error.

use serde_json::{Map, Value};

use super::SocialPost;

/// A source location for one target field.
enum Source {
    /// Direct path from the media node
    Path(&'static [&'static str]),
    /// `edges` array at the first path, leaf value at the second path of each edge
    Edges(&'static [&'static str], &'static [&'static str]),
}

/// `(target field, source)` for every projected field except owner comments.
const FIELD_MAP: &[(&str, Source)] = &[
    ("id", Source::Path(&["id"])),
    ("shortcode", Source::Path(&["shortcode"])),
    ("owner", Source::Path(&["owner", "username"])),
    ("dimensions", Source::Path(&["dimensions"])),
    ("src", Source::Path(&["display_url"])),
    (
        "src_attached",
        Source::Edges(&["edge_sidecar_to_children"], &["node", "display_url"]),
    ),
    ("has_audio", Source::Path(&["has_audio"])),
    ("video_url", Source::Path(&["video_url"])),
    ("views", Source::Path(&["video_view_count"])),
    ("plays", Source::Path(&["video_play_count"])),
    ("likes", Source::Path(&["edge_media_preview_like", "count"])),
    ("location", Source::Path(&["location", "name"])),
    ("taken_at", Source::Path(&["taken_at_timestamp"])),
    (
        "related",
        Source::Edges(&["edge_web_media_to_related_media"], &["node", "shortcode"]),
    ),
    ("type", Source::Path(&["product_type"])),
    ("video_duration", Source::Path(&["video_duration"])),
    ("music", Source::Path(&["clips_music_attribution_info"])),
    ("is_video", Source::Path(&["is_video"])),
    (
        "tagged_users",
        Source::Edges(&["edge_media_to_tagged_user"], &["node", "user", "username"]),
    ),
    (
        "captions",
        Source::Edges(&["edge_media_to_caption"], &["node", "text"]),
    ),
    (
        "related_profiles",
        Source::Edges(&["edge_related_profiles"], &["node", "username"]),
    ),
    (
        "comments_count",
        Source::Path(&["edge_media_to_parent_comment", "count"]),
    ),
    ("comments_disabled", Source::Path(&["comments_disabled"])),
    (
        "comments_next_page",
        Source::Path(&["edge_media_to_parent_comment", "page_info", "end_cursor"]),
    ),
];

/// `(target field, path within a comment node)` for owner comments.
const COMMENT_MAP: &[(&str, &[&str])] = &[
    ("id", &["id"]),
    ("text", &["text"]),
    ("created_at", &["created_at"]),
    ("owner", &["owner", "username"]),
];

/// Project a raw media node into a [`SocialPost`].
pub fn project_post(media: &Value) -> Result<SocialPost, serde_json::Error> {
    let mut projected = Map::new();

    for (target, source) in FIELD_MAP {
        let value = match source {
            Source::Path(path) => lookup(media, path).cloned().unwrap_or(Value::Null),
            Source::Edges(edges, leaf) => Value::Array(
                edge_nodes(media, edges)
                    .filter_map(|edge| lookup(edge, leaf))
                    .filter(|value| !value.is_null())
                    .cloned()
                    .collect(),
            ),
        };
        projected.insert(target.to_string(), value);
    }

    let owner = lookup(media, &["owner", "username"]).and_then(Value::as_str);
    projected.insert(
        "owner_comments".to_string(),
        Value::Array(owner_comments(media, owner)),
    );

    serde_json::from_value(Value::Object(projected))
}

/// Top-level comments written by the post owner, in original order.
fn owner_comments(media: &Value, owner: Option<&str>) -> Vec<Value> {
    let Some(owner) = owner else {
        return Vec::new();
    };

    edge_nodes(media, &["edge_media_to_parent_comment"])
        .filter_map(|edge| lookup(edge, &["node"]))
        .filter(|node| is_authored_by(node, owner))
        .map(|node| {
            let mut comment = Map::new();
            for (target, path) in COMMENT_MAP {
                let value = lookup(node, path).cloned().unwrap_or(Value::Null);
                comment.insert(target.to_string(), value);
            }
            Value::Object(comment)
        })
        .collect()
}

fn is_authored_by(comment: &Value, owner: &str) -> bool {
    lookup(comment, &["owner", "username"]).and_then(Value::as_str) == Some(owner)
}

fn edge_nodes<'a>(media: &'a Value, path: &[&str]) -> impl Iterator<Item = &'a Value> {
    lookup(media, path)
        .and_then(|container| container.get("edges"))
        .and_then(Value::as_array)
        .map(|edges| edges.iter())
        .into_iter()
        .flatten()
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url_to_text::instagram::Dimensions;
    use serde_json::json;

    fn media() -> Value {
        json!({
            "id": "3312",
            "shortcode": "ABC123",
            "owner": {"username": "chef_anna"},
            "dimensions": {"height": 1350, "width": 1080},
            "display_url": "https://cdn.example.com/main.jpg",
            "edge_sidecar_to_children": {"edges": [
                {"node": {"display_url": "https://cdn.example.com/1.jpg"}},
                {"node": {"display_url": "https://cdn.example.com/2.jpg"}}
            ]},
            "is_video": false,
            "edge_media_preview_like": {"count": 120},
            "edge_media_to_caption": {"edges": [
                {"node": {"text": "Lemon pasta\n\n2 tablespoons butter"}}
            ]},
            "edge_media_to_parent_comment": {
                "count": 3,
                "page_info": {"end_cursor": "cursor-1"},
                "edges": [
                    {"node": {"id": "c1", "text": "Looks great!", "created_at": 1, "owner": {"username": "fan"}}},
                    {"node": {"id": "c2", "text": "Step 1: boil pasta", "created_at": 2, "owner": {"username": "chef_anna"}}},
                    {"node": {"id": "c3", "text": "Yum", "created_at": 3, "owner": {"username": "other"}}},
                    {"node": {"id": "c4", "text": "Step 2: toss", "created_at": 4, "owner": {"username": "chef_anna"}}}
                ]
            },
            "comments_disabled": false
        })
    }

    #[test]
    fn test_projects_fields() {
        let post = project_post(&media()).unwrap();
        assert_eq!(post.id.as_deref(), Some("3312"));
        assert_eq!(post.owner.as_deref(), Some("chef_anna"));
        assert_eq!(post.src.as_deref(), Some("https://cdn.example.com/main.jpg"));
        assert_eq!(post.src_attached.len(), 2);
        assert_eq!(post.likes, Some(120));
        assert_eq!(post.comments_count, Some(3));
        assert_eq!(post.comments_next_page.as_deref(), Some("cursor-1"));
        assert_eq!(post.dimensions.as_ref().map(|d| d.width), Some(1080));
        assert_eq!(post.captions, vec!["Lemon pasta\n\n2 tablespoons butter"]);
    }

    #[test]
    fn test_owner_comments_filter_preserves_order() {
        let post = project_post(&media()).unwrap();
        let ids: Vec<&str> = post
            .owner_comments
            .iter()
            .filter_map(|c| c.id.as_deref())
            .collect();
        assert_eq!(ids, vec!["c2", "c4"]);
        assert!(post
            .owner_comments
            .iter()
            .all(|c| c.owner.as_deref() == Some("chef_anna")));
    }

    #[test]
    fn test_missing_fields_are_absent() {
        let post = project_post(&json!({"shortcode": "ONLY"})).unwrap();
        assert_eq!(post.shortcode.as_deref(), Some("ONLY"));
        assert!(post.owner.is_none());
        assert!(post.src_attached.is_empty());
        assert!(post.captions.is_empty());
        assert!(post.owner_comments.is_empty());
        assert!(post.video_url.is_none());
    }

    #[test]
    fn test_numeric_id_is_kept_as_text() {
        let mut media = media();
        media["id"] = json!(3312);
        media["edge_media_to_parent_comment"]["edges"][1]["node"]["id"] = json!(17);

        let post = project_post(&media).unwrap();
        assert_eq!(post.id.as_deref(), Some("3312"));
        assert_eq!(post.owner_comments[0].id.as_deref(), Some("17"));
        assert_eq!(post.captions.len(), 1);
    }

    #[test]
    fn test_float_dimensions_are_rounded() {
        let mut media = media();
        media["dimensions"] = json!({"height": 1349.6, "width": 1080.0});

        let post = project_post(&media).unwrap();
        assert_eq!(post.dimensions, Some(Dimensions { height: 1350, width: 1080 }));
    }

    #[test]
    fn test_mistyped_fields_are_left_empty() {
        let mut media = media();
        media["dimensions"] = json!("1080x1350");
        media["edge_media_preview_like"]["count"] = json!("lots");
        media["is_video"] = json!("no");
        media["owner"]["username"] = json!(["chef_anna"]);

        let post = project_post(&media).unwrap();
        assert!(post.dimensions.is_none());
        assert!(post.likes.is_none());
        assert!(post.is_video.is_none());
        assert!(post.owner.is_none());
        assert_eq!(post.src.as_deref(), Some("https://cdn.example.com/main.jpg"));
        assert_eq!(post.captions, vec!["Lemon pasta\n\n2 tablespoons butter"]);
    }
}
