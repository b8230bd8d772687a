//! XMP packet extraction using quick-xml.
//!
//! The XMP block travels as a plain XML packet inside the container (JPEG
//! APP1 segment, TIFF tag, PNG iTXt chunk); scanning the raw bytes for the
//! `x:xmpmeta` envelope finds it regardless of the carrier. Properties are
//! keyed by their conventional prefix (`Xmp.dc.subject`,
//! `Xmp.digiKam.TagsList`); array values are flattened to a comma-joined
//! string.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::reader::MetadataRecord;

const PACKET_OPEN: &[u8] = b"<x:xmpmeta";
const PACKET_CLOSE: &[u8] = b"</x:xmpmeta>";

/// RDF/XML machinery, not metadata properties.
const STRUCTURAL_PREFIXES: &[&str] = &["rdf", "x", "xml", "xmlns"];

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Locate the XMP packet inside a raw container, if one is present.
pub fn packet(bytes: &[u8]) -> Option<&[u8]> {
    let start = find(bytes, PACKET_OPEN, 0)?;
    let end = find(bytes, PACKET_CLOSE, start)?;
    Some(&bytes[start..end + PACKET_CLOSE.len()])
}

fn key_for(name: &[u8]) -> Option<String> {
    let name = std::str::from_utf8(name).ok()?;
    let (prefix, local) = name.split_once(':')?;
    if STRUCTURAL_PREFIXES.contains(&prefix) {
        return None;
    }
    Some(format!("Xmp.{prefix}.{local}"))
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&apos;", "'")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

/// Parse one XMP packet into namespaced key/value pairs. Malformed XML
/// yields whatever was decoded before the error; a packet is advisory
/// content, never a reason to fail the file.
pub fn read_packet(xml: &str) -> MetadataRecord {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut record = MetadataRecord::new();
    let mut buf = Vec::new();
    // One open property at a time; XMP properties do not nest.
    let mut current: Option<String> = None;
    let mut items: Vec<String> = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.name().as_ref() == b"rdf:Description" {
                    collect_attributes(&e, &mut record);
                } else if current.is_none() {
                    if let Some(key) = key_for(e.name().as_ref()) {
                        current = Some(key);
                        items.clear();
                        text.clear();
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                if e.name().as_ref() == b"rdf:Description" {
                    collect_attributes(&e, &mut record);
                }
            }
            Ok(Event::Text(t)) => {
                if current.is_some() {
                    if let Ok(s) = std::str::from_utf8(t.as_ref()) {
                        text.push_str(&unescape_xml(s));
                    }
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"rdf:li" {
                    if current.is_some() && !text.trim().is_empty() {
                        items.push(text.trim().to_string());
                    }
                    text.clear();
                } else if let Some(key) = &current {
                    if key_for(e.name().as_ref()).as_deref() == Some(key.as_str()) {
                        let value = if items.is_empty() {
                            text.trim().to_string()
                        } else {
                            items.join(", ")
                        };
                        if !value.is_empty() {
                            record.insert(key.clone(), value);
                        }
                        current = None;
                        items.clear();
                        text.clear();
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    record
}

fn collect_attributes(e: &quick_xml::events::BytesStart<'_>, record: &mut MetadataRecord) {
    for attr in e.attributes().flatten() {
        if let Some(key) = key_for(attr.key.as_ref()) {
            if let Ok(val) = std::str::from_utf8(&attr.value) {
                record.insert(key, unescape_xml(val));
            }
        }
    }
}
