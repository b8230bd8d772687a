//! Embedded image metadata: namespaced key/value extraction from the EXIF
//! fields and the XMP packet, with vendor binary noise filtered out.

pub mod keys;
mod reader;
mod xmp;

pub use reader::{capability_check, from_bytes, read, MetadataRecord};
