//! Shared fixtures: handcrafted TIFF files carrying chosen metadata fields,
//! plus mock analyzer endpoints.

#![allow(dead_code)]

use std::path::PathBuf;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lupe::config::AnalyzerConfig;

pub const TAG_MAKE: u16 = 0x010f;
pub const TAG_MODEL: u16 = 0x0110;
pub const TAG_DATETIME: u16 = 0x0132;
pub const TAG_DATETIME_ORIGINAL: u16 = 0x9003;
pub const TAG_DATETIME_DIGITIZED: u16 = 0x9004;
pub const TAG_MAKER_NOTE: u16 = 0x927c;
/// Not a registered EXIF tag; surfaces as a hex-suffixed key.
pub const TAG_VENDOR_BLOB: u16 = 0xeeee;

const TYPE_ASCII: u16 = 2;
const TYPE_LONG: u16 = 4;
const TAG_EXIF_IFD_POINTER: u16 = 0x8769;

fn ascii_value(s: &str) -> Vec<u8> {
    let mut v = s.as_bytes().to_vec();
    v.push(0);
    v
}

fn padded(len: usize) -> usize {
    len + (len & 1)
}

fn out_of_line(value: &[u8]) -> bool {
    value.len() > 4
}

fn ascii_entry(tag: u16, value: &[u8], data_cursor: &mut usize) -> Vec<u8> {
    let mut e = Vec::with_capacity(12);
    e.extend_from_slice(&tag.to_le_bytes());
    e.extend_from_slice(&TYPE_ASCII.to_le_bytes());
    e.extend_from_slice(&(value.len() as u32).to_le_bytes());
    if out_of_line(value) {
        e.extend_from_slice(&(*data_cursor as u32).to_le_bytes());
        *data_cursor += padded(value.len());
    } else {
        let mut inline = [0u8; 4];
        inline[..value.len()].copy_from_slice(value);
        e.extend_from_slice(&inline);
    }
    e
}

fn write_ifd(out: &mut Vec<u8>, entries: &mut Vec<Vec<u8>>, values: &[(u16, Vec<u8>)]) {
    entries.sort_by_key(|e| u16::from_le_bytes([e[0], e[1]]));
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for e in entries.iter() {
        out.extend_from_slice(e);
    }
    out.extend_from_slice(&0u32.to_le_bytes()); // no next IFD
    for (_, value) in values {
        if out_of_line(value) {
            out.extend_from_slice(value);
            if value.len() & 1 == 1 {
                out.push(0);
            }
        }
    }
}

/// Build a little-endian TIFF whose IFD0 holds the given ASCII fields and,
/// when `exif_ifd` is non-empty, an Exif sub-IFD holding the rest.
pub fn build_tiff(ifd0: &[(u16, &str)], exif_ifd: &[(u16, &str)]) -> Vec<u8> {
    let ifd0: Vec<(u16, Vec<u8>)> = ifd0.iter().map(|(t, s)| (*t, ascii_value(s))).collect();
    let sub: Vec<(u16, Vec<u8>)> = exif_ifd.iter().map(|(t, s)| (*t, ascii_value(s))).collect();

    let has_sub = !sub.is_empty();
    let n0 = ifd0.len() + usize::from(has_sub);
    let ifd0_off = 8usize;
    let ifd0_table = 2 + 12 * n0 + 4;
    let ifd0_data_len: usize = ifd0
        .iter()
        .filter(|(_, v)| out_of_line(v))
        .map(|(_, v)| padded(v.len()))
        .sum();
    let sub_off = ifd0_off + ifd0_table + ifd0_data_len;
    let sub_table = if has_sub { 2 + 12 * sub.len() + 4 } else { 0 };
    let sub_data_off = sub_off + sub_table;

    let mut out = Vec::new();
    out.extend_from_slice(b"II");
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&(ifd0_off as u32).to_le_bytes());

    let mut data_cursor = ifd0_off + ifd0_table;
    let mut entries: Vec<Vec<u8>> = ifd0
        .iter()
        .map(|(tag, value)| ascii_entry(*tag, value, &mut data_cursor))
        .collect();
    if has_sub {
        let mut e = Vec::with_capacity(12);
        e.extend_from_slice(&TAG_EXIF_IFD_POINTER.to_le_bytes());
        e.extend_from_slice(&TYPE_LONG.to_le_bytes());
        e.extend_from_slice(&1u32.to_le_bytes());
        e.extend_from_slice(&(sub_off as u32).to_le_bytes());
        entries.push(e);
    }
    write_ifd(&mut out, &mut entries, &ifd0);

    if has_sub {
        let mut sub_cursor = sub_data_off;
        let mut sub_entries: Vec<Vec<u8>> = sub
            .iter()
            .map(|(tag, value)| ascii_entry(*tag, value, &mut sub_cursor))
            .collect();
        write_ifd(&mut out, &mut sub_entries, &sub);
    }
    out
}

/// Wrap RDF description bodies in a complete XMP packet.
pub fn xmp_packet(descriptions: &str) -> String {
    format!(
        "<?xpacket begin=\"\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>\
         <x:xmpmeta xmlns:x=\"adobe:ns:meta/\">\
         <rdf:RDF xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">\
         {descriptions}</rdf:RDF></x:xmpmeta><?xpacket end=\"w\"?>"
    )
}

/// Minimal JPEG carrying an XMP packet in an APP1 segment and nothing else.
pub fn build_jpeg_with_xmp(packet: &str) -> Vec<u8> {
    let mut payload = b"http://ns.adobe.com/xap/1.0/\0".to_vec();
    payload.extend_from_slice(packet.as_bytes());

    let mut out = vec![0xFF, 0xD8]; // SOI
    out.extend_from_slice(&[0xFF, 0xE1]); // APP1
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&[0xFF, 0xD9]); // EOI
    out
}

/// Write `bytes` under `name` inside `dir` and return the path.
pub fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).expect("write fixture file");
    path
}

/// A readable image that carries no embedded metadata at all.
pub fn write_plain_png(dir: &TempDir, name: &str) -> PathBuf {
    use image::{DynamicImage, ImageFormat};
    let path = dir.path().join(name);
    let img = DynamicImage::new_rgb8(64, 64);
    img.save_with_format(&path, ImageFormat::Png)
        .expect("write png fixture");
    path
}

/// Analyzer config pointed at a mock server.
pub fn analyzer_config(base_url: &str) -> AnalyzerConfig {
    AnalyzerConfig {
        api_key: Some("test-key".to_string()),
        base_url: Some(base_url.to_string()),
        timeout_secs: 5,
        max_retries: 2,
        enabled: true,
    }
}

/// Analyzer config with no backend at all.
pub fn analyzer_disabled() -> AnalyzerConfig {
    AnalyzerConfig {
        api_key: None,
        base_url: None,
        timeout_secs: 5,
        max_retries: 1,
        enabled: false,
    }
}

pub fn ocr_body(words: &[&str]) -> serde_json::Value {
    let items: Vec<_> = words
        .iter()
        .map(|w| json!({"words": w, "probability": 0.97}))
        .collect();
    json!({ "words_result": items })
}

pub fn classify_body(keywords: &[&str]) -> serde_json::Value {
    let items: Vec<_> = keywords
        .iter()
        .map(|k| json!({"keyword": k, "score": 0.9}))
        .collect();
    json!({ "result": items })
}

/// Mount both analyzer endpoints with fixed, deterministic responses.
pub async fn mount_analyzer(server: &MockServer, words: &[&str], keywords: &[&str]) {
    Mock::given(method("POST"))
        .and(path("/v1/ocr/general"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ocr_body(words)))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/image/classify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(classify_body(keywords)))
        .mount(server)
        .await;
}
