use std::collections::BTreeMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::OnceLock;

use exif::{Context, In, Value};
use regex::Regex;

use crate::error::{LupeError, Result};
use crate::metadata::{keys, xmp};

/// Flat mapping from namespaced metadata key to display-string value.
/// BTreeMap keeps iteration order stable within and across runs.
pub type MetadataRecord = BTreeMap<String, String>;

/// Vendor blobs hide behind hex-literal tag names (`Foo.Bar.0x1a2b`);
/// stringifying them is unsafe.
fn hex_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.0[xX][0-9a-fA-F]+$").expect("valid literal regex"))
}

/// exiv2-style group prefix for a tag context.
fn group_prefix(context: Context) -> &'static str {
    match context {
        Context::Tiff => "Exif.Image",
        Context::Exif => "Exif.Photo",
        Context::Gps => "Exif.GPSInfo",
        Context::Interop => "Exif.Iop",
        _ => "Exif.Unknown",
    }
}

/// Namespaced key for a field. Tags without a registered name get a hex
/// suffix, which the filter below then drops.
fn field_key(tag: exif::Tag) -> String {
    let prefix = group_prefix(tag.context());
    match tag.description() {
        Some(_) => format!("{}.{}", prefix, tag),
        None => format!("{}.0x{:04x}", prefix, tag.number()),
    }
}

/// Display-string coercion. ASCII values are taken verbatim (the date
/// reformatting downstream depends on the raw `YYYY:MM:DD HH:MM:SS` form);
/// everything else uses the library's display formatting.
fn display_string(field: &exif::Field) -> String {
    match &field.value {
        Value::Ascii(items) => items
            .iter()
            .map(|item| {
                String::from_utf8_lossy(item)
                    .trim_end_matches('\0')
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join(" "),
        _ => field.display_value().to_string(),
    }
}

/// Read the embedded metadata out of a raw image container.
///
/// EXIF fields and the XMP packet both contribute; a container that parses
/// but carries neither yields an empty record. An unrecognizable container
/// is a `Metadata` error and aborts the extraction for that file.
pub fn from_bytes(bytes: &[u8]) -> Result<MetadataRecord> {
    let mut record = MetadataRecord::new();

    match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(parsed) => {
            for field in parsed.fields() {
                // Thumbnail IFDs duplicate primary keys; keep the primary copy only.
                if field.ifd_num != In::PRIMARY {
                    continue;
                }
                let key = field_key(field.tag);
                if key == keys::MAKER_NOTE_KEY || hex_suffix_re().is_match(&key) {
                    continue;
                }
                record.insert(key, display_string(field));
            }
        }
        Err(exif::Error::NotFound(_)) => {}
        Err(e) => {
            return Err(LupeError::Metadata(format!("cannot parse container: {e}")));
        }
    }

    if let Some(packet) = xmp::packet(bytes) {
        let xml = String::from_utf8_lossy(packet);
        record.extend(xmp::read_packet(&xml));
    }

    Ok(record)
}

/// `from_bytes` over the file at `path`.
pub fn read(path: &Path) -> Result<MetadataRecord> {
    let bytes = std::fs::read(path)
        .map_err(|e| LupeError::Metadata(format!("cannot open {}: {e}", path.display())))?;
    from_bytes(&bytes)
}

/// Minimal little-endian TIFF carrying a single Orientation field, used to
/// verify the metadata backend decodes before any host interaction starts.
const PROBE_EXIF: &[u8] = &[
    0x49, 0x49, 0x2a, 0x00, 0x08, 0x00, 0x00, 0x00, // II*\0, IFD0 at 8
    0x01, 0x00, // one entry
    0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, // Orientation, SHORT x1
    0x01, 0x00, 0x00, 0x00, // value 1
    0x00, 0x00, 0x00, 0x00, // no next IFD
];

/// Startup precondition: the process refuses to serve the host when the
/// metadata backend cannot decode a known-good blob.
pub fn capability_check() -> Result<()> {
    let parsed = exif::Reader::new()
        .read_raw(PROBE_EXIF.to_vec())
        .map_err(|e| LupeError::Metadata(format!("metadata backend probe failed: {e}")))?;
    if parsed.fields().count() == 0 {
        return Err(LupeError::Metadata(
            "metadata backend probe returned no fields".to_string(),
        ));
    }
    Ok(())
}
