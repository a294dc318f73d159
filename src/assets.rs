use rust_embed::RustEmbed;

/// Embedded static web assets (HTML, CSS, JS)
#[derive(RustEmbed)]
#[folder = "static/"]
#[prefix = "static/"]
pub struct StaticAssets;

impl StaticAssets {
    /// Get a static asset by path
    pub fn get_asset(path: &str) -> Option<rust_embed::EmbeddedFile> {
        Self::get(path)
    }

    /// Get the content type for a given file extension
    pub fn get_content_type(path: &str) -> &'static str {
        match path.rsplit('.').next() {
            Some("html") => "text/html; charset=utf-8",
            Some("css") => "text/css; charset=utf-8",
            Some("js") => "application/javascript; charset=utf-8",
            Some("json") => "application/json; charset=utf-8",
            Some("png") => "image/png",
            Some("svg") => "image/svg+xml; charset=utf-8",
            Some("ico") => "image/x-icon",
            _ => "application/octet-stream",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_detection() {
        assert_eq!(
            StaticAssets::get_content_type("index.html"),
            "text/html; charset=utf-8"
        );
        assert_eq!(
            StaticAssets::get_content_type("css/app.css"),
            "text/css; charset=utf-8"
        );
        assert_eq!(
            StaticAssets::get_content_type("js/app.js"),
            "application/javascript; charset=utf-8"
        );
        assert_eq!(
            StaticAssets::get_content_type("unknown"),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_page_assets_are_embedded() {
        let assets: Vec<_> = StaticAssets::iter().collect();
        for expected in ["static/index.html", "static/app.js", "static/app.css"] {
            assert!(
                assets.iter().any(|a| a == expected),
                "missing embedded asset {expected}"
            );
        }
    }
}
