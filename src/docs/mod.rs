pub mod intake;
pub mod types;

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

use types::Document;

pub const EMPTY_PLACEHOLDER: &str = "No documents uploaded yet";

/// Localized short-form date (`M/D/YYYY`, local time) for a document timestamp.
/// Timestamps without an offset are read as local time.
pub fn short_date(created_at: &str) -> String {
    short_date_in(created_at, &Local)
}

fn short_date_in<Tz>(created_at: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    const FORMAT: &str = "%-m/%-d/%Y";

    if let Ok(ts) = DateTime::parse_from_rfc3339(created_at) {
        return ts.with_timezone(tz).format(FORMAT).to_string();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(created_at, "%Y-%m-%dT%H:%M:%S%.f") {
        if let Some(local) = tz.from_local_datetime(&naive).earliest() {
            return local.format(FORMAT).to_string();
        }
    }
    "Invalid Date".to_string()
}

/// One summary card: title, file type badge, page count and upload date.
pub fn render_card(doc: &Document) -> String {
    format!(
        "**{}**\n  `{}` {} pages • {}",
        doc.title,
        doc.file_type,
        doc.page_count,
        short_date(&doc.created_at)
    )
}

/// Render documents in the order given, or the placeholder when there are none.
pub fn render_documents(docs: &[Document]) -> String {
    if docs.is_empty() {
        return EMPTY_PLACEHOLDER.to_string();
    }
    docs.iter()
        .map(render_card)
        .collect::<Vec<_>>()
        .join("\n")
}
