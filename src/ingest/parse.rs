// src/ingest/parse.rs
//! Format-agnostic feed parsing (RSS 2.0, RSS 1.0/RDF, Atom) on top of the
//! quick-xml event reader.

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;
use regex::Regex;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

/// Snippets longer than this are cut (in chars).
pub const SNIPPET_MAX_CHARS: usize = 1500;

/// One `<item>`/`<entry>` with text already reduced to plain strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub published: Option<String>,
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Date { rank: u8 },
    Summary,
    Content,
}

fn field_for(local_name: &[u8]) -> Option<Field> {
    match local_name {
        b"title" => Some(Field::Title),
        b"link" => Some(Field::Link),
        b"pubDate" | b"published" | b"date" | b"issued" => Some(Field::Date { rank: 0 }),
        b"updated" | b"modified" => Some(Field::Date { rank: 1 }),
        b"description" | b"summary" => Some(Field::Summary),
        b"content" | b"encoded" => Some(Field::Content),
        _ => None,
    }
}

#[derive(Default)]
struct ItemBuilder {
    title: Option<String>,
    text_link: Option<String>,
    alternate_link: Option<String>,
    other_link: Option<String>,
    date: Option<(u8, String)>,
    summary: Option<String>,
    content: Option<String>,
}

impl ItemBuilder {
    fn set(&mut self, field: Field, raw: String) {
        let value = raw.trim();
        if value.is_empty() {
            return;
        }
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.text_link,
            Field::Summary => &mut self.summary,
            Field::Content => &mut self.content,
            Field::Date { rank } => {
                let better = self.date.as_ref().map_or(true, |(r, _)| rank < *r);
                if better {
                    self.date = Some((rank, value.to_string()));
                }
                return;
            }
        };
        if slot.is_none() {
            *slot = Some(value.to_string());
        }
    }

    /// Atom style `<link rel=".." href=".."/>`.
    fn offer_link(&mut self, e: &BytesStart<'_>) {
        let mut href = None;
        let mut rel = None;
        for attr in e.attributes().flatten() {
            let value = match attr.unescape_value() {
                Ok(v) => v.trim().to_string(),
                Err(_) => continue,
            };
            match attr.key.local_name().as_ref() {
                b"href" => href = Some(value),
                b"rel" => rel = Some(value),
                _ => {}
            }
        }
        let Some(href) = href.filter(|h| !h.is_empty()) else {
            return;
        };
        match rel.as_deref() {
            None | Some("alternate") => {
                self.alternate_link.get_or_insert(href);
            }
            Some(_) => {
                self.other_link.get_or_insert(href);
            }
        }
    }

    fn finish(self) -> FeedItem {
        FeedItem {
            title: self.title.map(|t| plain_text(&t)).filter(|t| !t.is_empty()),
            link: self.text_link.or(self.alternate_link).or(self.other_link),
            published: self.date.map(|(_, d)| d),
            snippet: self
                .summary
                .or(self.content)
                .map(|s| plain_text(&s))
                .filter(|s| !s.is_empty()),
        }
    }
}

fn is_feed_root(local_name: &[u8]) -> bool {
    matches!(local_name, b"rss" | b"RDF" | b"feed")
}

fn is_item(local_name: &[u8]) -> bool {
    matches!(local_name, b"item" | b"entry")
}

fn text_of(e: &BytesText<'_>) -> String {
    match e.unescape() {
        Ok(s) => s.into_owned(),
        // Malformed reference that survived repair: keep the raw text.
        Err(_) => html_escape::decode_html_entities(&String::from_utf8_lossy(&e[..])).into_owned(),
    }
}

/// Parse a (repaired) feed document into its items, in document order.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut root_seen = false;
    let mut item_depth: Option<usize> = None;
    let mut builder = ItemBuilder::default();
    let mut field: Option<(Field, usize)> = None;
    let mut buf = String::new();

    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("xml error near byte {}", reader.buffer_position()))?;
        match event {
            Event::Start(e) => {
                depth += 1;
                let local = e.local_name();
                let name = local.as_ref();
                if !root_seen {
                    if !is_feed_root(name) {
                        return Err(anyhow!(
                            "not a feed document (root <{}>)",
                            String::from_utf8_lossy(name)
                        ));
                    }
                    root_seen = true;
                    continue;
                }
                match item_depth {
                    None if is_item(name) => {
                        item_depth = Some(depth);
                        builder = ItemBuilder::default();
                    }
                    Some(d) if depth == d + 1 && field.is_none() => {
                        if name == b"link" {
                            builder.offer_link(&e);
                        }
                        if let Some(f) = field_for(name) {
                            field = Some((f, depth));
                            buf.clear();
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if item_depth == Some(depth) && e.local_name().as_ref() == b"link" {
                    builder.offer_link(&e);
                }
            }
            Event::Text(e) => {
                if field.is_some() {
                    buf.push_str(&text_of(&e));
                }
            }
            Event::CData(e) => {
                if field.is_some() {
                    buf.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => {
                if let Some((f, d)) = field {
                    if d == depth {
                        builder.set(f, std::mem::take(&mut buf));
                        field = None;
                    }
                }
                if item_depth == Some(depth) {
                    items.push(std::mem::take(&mut builder).finish());
                    item_depth = None;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !root_seen {
        return Err(anyhow!("empty document"));
    }
    Ok(items)
}

static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("ws regex"));

/// Reduce feed markup to display text: strip tags, decode entities,
/// collapse whitespace, cap length.
pub fn plain_text(s: &str) -> String {
    let stripped = RE_TAGS.replace_all(s, " ");
    let decoded = html_escape::decode_html_entities(&stripped);
    let collapsed = RE_WS.replace_all(&decoded, " ");
    let out = collapsed.trim();
    if out.chars().count() > SNIPPET_MAX_CHARS {
        out.chars().take(SNIPPET_MAX_CHARS).collect()
    } else {
        out.to_string()
    }
}

/// Zone-less shapes seen in Dublin Core dates. Read as UTC.
const NAIVE_DATETIME_FORMATS: [&str; 3] =
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Best-effort timestamp for sorting: RFC 2822 (RSS), RFC 3339 (Atom),
/// then naive datetimes and bare `YYYY-MM-DD` (Dublin Core) as UTC.
/// `None` sorts as oldest.
pub fn parse_published(ts: &str) -> Option<i64> {
    let ts = ts.trim();
    if let Ok(dt) = OffsetDateTime::parse(ts, &Rfc2822) {
        return Some(dt.unix_timestamp());
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc2822(ts) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = OffsetDateTime::parse(ts, &Rfc3339) {
        return Some(dt.unix_timestamp());
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(ts, fmt) {
            return Some(dt.and_utc().timestamp());
        }
    }
    NaiveDate::parse_from_str(ts, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}
