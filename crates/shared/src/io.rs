use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::warn;
use url::Url;

/// Parse a feed list: one URL per line, `#` comments and blank lines ignored
pub fn parse_feed_urls(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| match Url::parse(line) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                warn!("Ignoring invalid feed URL {:?}: {}", line, e);
                None
            }
        })
        .collect()
}

/// Load the feed list from disk
pub fn load_feed_urls(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        anyhow::bail!(
            "Feed list not found: {}\n\n\
            Create it with one channel feed per line, e.g.:\n  \
            https://www.youtube.com/feeds/videos.xml?channel_id=<CHANNEL_ID>",
            path.display()
        );
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read feed list: {}", path.display()))?;

    Ok(parse_feed_urls(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feed_urls_skips_comments_and_blanks() {
        let content = "\
# Music
https://www.youtube.com/feeds/videos.xml?channel_id=A

   # Tech
https://www.youtube.com/feeds/videos.xml?channel_id=B
";
        let urls = parse_feed_urls(content);
        assert_eq!(
            urls,
            vec![
                "https://www.youtube.com/feeds/videos.xml?channel_id=A",
                "https://www.youtube.com/feeds/videos.xml?channel_id=B",
            ]
        );
    }

    #[test]
    fn test_parse_feed_urls_skips_invalid() {
        let urls = parse_feed_urls("not a url\nhttp://example.com/feed\n");
        assert_eq!(urls, vec!["http://example.com/feed"]);
    }

    #[test]
    fn test_load_feed_urls_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_feed_urls(&dir.path().join("urls")).unwrap_err();
        assert!(err.to_string().contains("Feed list not found"));
    }
}
