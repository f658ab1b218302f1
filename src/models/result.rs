use serde::Serialize;

/// What the provider handed back for one request. Never both kinds at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ImageryResult {
    /// A renderable download link.
    Download { url: String },
    /// An opaque pair allowing a client to fetch map tiles.
    TileReference {
        #[serde(rename = "mapId")]
        map_id: String,
        token: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_download_serializes_url_only() {
        let r = ImageryResult::Download {
            url: "https://example.com/a.png".into(),
        };
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({"url": "https://example.com/a.png"})
        );
    }

    #[test]
    fn test_tile_reference_serializes_pair() {
        let r = ImageryResult::TileReference {
            map_id: "projects/p/maps/abc".into(),
            token: String::new(),
        };
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({"mapId": "projects/p/maps/abc", "token": ""})
        );
    }
}
