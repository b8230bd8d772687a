//! Sub-document assembly: renders one metadata record plus one analysis
//! result into the fixed HTML shape the indexing host consumes. The output
//! is always well-formed; sections with nothing to say are omitted, never
//! left dangling.

use std::collections::BTreeSet;

use crate::analyzer::ImageAnalysis;
use crate::metadata::{keys, MetadataRecord};

/// Mimetype declared to the host alongside every rendered document.
pub const DOCUMENT_MIME_TYPE: &str = "text/html";

/// Escape free text for embedding in HTML content or attribute values.
/// Every piece of metadata or analyzer text goes through here.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// `YYYY:MM:DD HH:MM:SS` → `YYYY-MM-DD HH:MM:SS`: only the first two colons
/// become dashes, the time portion keeps its own.
fn reformat_date(value: &str) -> String {
    value.replacen(':', "-", 2)
}

/// Render the sub-document for one file.
pub fn render(record: &MetadataRecord, analysis: &ImageAnalysis) -> Vec<u8> {
    let mut doc = String::new();
    doc.push_str("<html><head>\n");

    // Title candidates are deduplicated and bracket/apostrophe-stripped.
    // No candidate, no <title> element.
    let mut candidates = BTreeSet::new();
    for key in keys::TITLE_KEYS {
        if let Some(value) = record.get(*key) {
            let stripped: String = value
                .chars()
                .filter(|c| !matches!(c, '[' | ']' | '\''))
                .collect();
            candidates.insert(escape_html(&stripped));
        }
    }
    if !candidates.is_empty() {
        doc.push_str("<title>");
        for candidate in &candidates {
            doc.push_str(candidate);
            doc.push(' ');
        }
        doc.push_str("</title>\n");
    }

    // First date key wins; at most one date element.
    for key in keys::DATE_KEYS {
        if let Some(value) = record.get(*key) {
            doc.push_str("<meta name=\"date\" content=\"");
            doc.push_str(&reformat_date(value));
            doc.push_str("\">\n");
            break;
        }
    }

    if let Some(value) = record.get(keys::TAG_LIST_KEY) {
        doc.push_str("<meta name=\"keywords\" content=\"");
        doc.push_str(&escape_html(value));
        doc.push_str("\">\n");
    }

    doc.push_str("</head><body><pre>\n");

    for (key, value) in record {
        if keys::INTERESTING_KEYS.contains(&key.as_str()) {
            doc.push_str(key);
            doc.push_str(" : ");
            doc.push_str(&escape_html(value));
            doc.push_str("<br />\n");
        }
    }

    for word in &analysis.ocr_words {
        doc.push_str(&escape_html(word));
        doc.push_str("<br />\n");
    }
    for keyword in &analysis.image_keywords {
        doc.push_str(&escape_html(keyword));
        doc.push_str("<br />\n");
    }

    doc.push_str("</pre></body></html>");
    doc.into_bytes()
}
