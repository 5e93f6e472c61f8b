//! Extracts video entries from the Atom bodies YouTube pushes through the hub.

use chrono::{DateTime, Utc};

use crate::Error;
use ytlive_common::models::FeedEntry;

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const YT_NS: &str = "http://www.youtube.com/xml/schemas/2015";

/// Parses a pushed feed. Entries missing a video or channel id are skipped;
/// `at:deleted-entry` elements are ignored, so a deletion-only body yields
/// an empty list.
pub fn parse_feed(body: &str) -> Result<Vec<FeedEntry>, Error> {
    let doc = roxmltree::Document::parse(body)
        .map_err(|e| Error::Parse(format!("invalid Atom body: {}", e)))?;

    let mut entries = Vec::new();
    for entry in doc
        .descendants()
        .filter(|n| n.has_tag_name((ATOM_NS, "entry")))
    {
        let video_id = child_text(entry, (YT_NS, "videoId"));
        let channel_id = child_text(entry, (YT_NS, "channelId"));
        let (Some(video_id), Some(channel_id)) = (video_id, channel_id) else {
            continue;
        };

        entries.push(FeedEntry {
            video_id,
            channel_id,
            title: child_text(entry, (ATOM_NS, "title")).unwrap_or_default(),
            published_at: child_text(entry, (ATOM_NS, "published")).and_then(parse_time),
            updated_at: child_text(entry, (ATOM_NS, "updated")).and_then(parse_time),
        });
    }
    Ok(entries)
}

fn child_text(node: roxmltree::Node<'_, '_>, name: (&str, &str)) -> Option<String> {
    node.children()
        .find(|c| c.has_tag_name(name))
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
}

fn parse_time(raw: String) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
