//! The visible list: what gets hidden, in what order, and how it is drawn.

use crossterm::style::Stylize;
use std::collections::HashMap;
use std::time::Duration;

use crate::models::Item;

/// Shorts are hidden; items whose duration is unknown are always shown
pub fn should_filter_out(item: &Item, shorts_threshold: Duration) -> bool {
    matches!(item.derived.duration, Some(d) if d < shorts_threshold)
}

/// Apply the inclusion policy and order newest first.
///
/// The sort is stable, so items published at the same instant keep their
/// relative order and the rendered layout does not shuffle between runs.
pub fn present(items: Vec<Item>, shorts_threshold: Duration) -> Vec<Item> {
    let mut visible: Vec<Item> = items
        .into_iter()
        .filter(|item| !should_filter_out(item, shorts_threshold))
        .collect();
    visible.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    visible
}

/// Lines for the selector plus a way back from a chosen line to its item
#[derive(Debug, Default)]
pub struct Rendered {
    /// Coloured lines, fed to the selector
    pub display: Vec<String>,
    /// The same lines without escape codes, in the same order
    pub plain: Vec<String>,
    lookup: HashMap<String, Item>,
}

impl Rendered {
    /// Selector input, one line per item
    pub fn display_text(&self) -> String {
        self.display.join("\n")
    }

    /// Find the item behind a plain line as printed by the selector
    pub fn item_for(&self, line: &str) -> Option<&Item> {
        self.lookup.get(line)
    }

    pub fn len(&self) -> usize {
        self.plain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plain.is_empty()
    }
}

fn format_duration(duration: Option<Duration>) -> String {
    match duration {
        Some(d) => {
            let secs = d.as_secs();
            format!("{:02}:{:02}", secs / 60, secs % 60)
        }
        None => "--:--".to_string(),
    }
}

/// Render already-presented items as `date | duration | author | title`
pub fn render(items: &[Item], author_name_padding: bool) -> Rendered {
    let width = if author_name_padding {
        items
            .iter()
            .map(|i| i.source_name.chars().count())
            .max()
            .unwrap_or(0)
    } else {
        0
    };

    let mut rendered = Rendered::default();
    for item in items {
        let date = item.published_at.format("%d %b").to_string();
        let duration = format_duration(item.derived.duration);
        let author = format!("{:<width$}", item.source_name, width = width);
        let title = item.display_title();

        let plain = format!("{} | {} | {} | {}", date, duration, author, title);
        let display = format!(
            "{} | {} | {} | {}",
            date.yellow(),
            duration.blue(),
            author.green(),
            title
        );

        // Identical lines can't be told apart by the selector; keep the first
        rendered
            .lookup
            .entry(plain.clone())
            .or_insert_with(|| item.clone());
        rendered.plain.push(plain);
        rendered.display.push(display);
    }

    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Derived;
    use chrono::{DateTime, TimeZone, Utc};

    fn item(id: &str, day: u32, duration: Option<u64>) -> Item {
        Item {
            id: id.to_string(),
            video_id: None,
            source_name: "Chan".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap().fixed_offset(),
            title: format!("Raw {}", id),
            media_url: format!("https://example.com/{}", id),
            derived: Derived {
                duration: duration.map(Duration::from_secs),
                normalized_title: None,
            },
        }
    }

    const THRESHOLD: Duration = Duration::from_secs(80);

    // ==================== Filter Tests ====================

    #[test]
    fn test_absent_duration_never_filtered() {
        assert!(!should_filter_out(&item("a", 1, None), THRESHOLD));
        assert!(!should_filter_out(&item("a", 1, None), Duration::MAX));
    }

    #[test]
    fn test_short_duration_filtered() {
        assert!(should_filter_out(&item("a", 1, Some(79)), THRESHOLD));
        assert!(should_filter_out(&item("a", 1, Some(0)), THRESHOLD));
    }

    #[test]
    fn test_threshold_duration_kept() {
        assert!(!should_filter_out(&item("a", 1, Some(80)), THRESHOLD));
        assert!(!should_filter_out(&item("a", 1, Some(3600)), THRESHOLD));
    }

    // ==================== Ordering Tests ====================

    #[test]
    fn test_present_orders_newest_first() {
        let items = vec![
            item("old", 1, Some(600)),
            item("short", 9, Some(30)),
            item("new", 5, None),
            item("mid", 3, Some(600)),
        ];

        let visible = present(items, THRESHOLD);
        let ids: Vec<&str> = visible.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);

        assert!(visible
            .windows(2)
            .all(|w| w[0].published_at >= w[1].published_at));
    }

    #[test]
    fn test_present_is_stable_for_equal_timestamps() {
        let items = vec![
            item("first", 2, None),
            item("later", 4, None),
            item("second", 2, None),
            item("third", 2, None),
        ];

        let visible = present(items, THRESHOLD);
        let ids: Vec<&str> = visible.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["later", "first", "second", "third"]);
    }

    // ==================== Rendering Tests ====================

    #[test]
    fn test_render_plain_line() {
        let mut it = item("a", 1, Some(185));
        it.derived.normalized_title = Some("Clean title".to_string());

        let rendered = render(&[it.clone()], false);
        assert_eq!(rendered.plain, vec!["01 Mar | 03:05 | Chan | Clean title"]);
        assert_eq!(rendered.item_for(&rendered.plain[0]), Some(&it));
    }

    #[test]
    fn test_render_unknown_duration_and_raw_title() {
        let rendered = render(&[item("a", 1, None)], false);
        assert_eq!(rendered.plain[0], "01 Mar | --:-- | Chan | Raw a");
    }

    #[test]
    fn test_render_pads_author_names() {
        let mut long = item("b", 2, Some(61));
        long.source_name = "Longer Channel".to_string();

        let rendered = render(&[item("a", 1, Some(61)), long], true);
        assert_eq!(rendered.plain[0], "01 Mar | 01:01 | Chan           | Raw a");
        assert_eq!(rendered.plain[1], "02 Mar | 01:01 | Longer Channel | Raw b");
    }

    #[test]
    fn test_render_display_matches_plain_layout() {
        let rendered = render(&[item("a", 1, Some(61))], false);
        assert!(rendered.display[0].contains("01 Mar"));
        assert!(rendered.display[0].ends_with("| Raw a"));
        assert_eq!(rendered.display_text().lines().count(), 1);
    }

    #[test]
    fn test_render_uses_feed_offset_for_date() {
        let mut it = item("a", 1, None);
        it.published_at = DateTime::parse_from_rfc3339("2024-03-02T00:30:00+01:00").unwrap();

        let rendered = render(&[it], false);
        assert_eq!(rendered.plain[0], "02 Mar | --:-- | Chan | Raw a");
    }

    #[test]
    fn test_render_unknown_line() {
        let rendered = render(&[item("a", 1, None)], false);
        assert!(rendered.item_for("nope").is_none());
    }
}
