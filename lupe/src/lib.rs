//! lupe — image tag & text extraction filter for full-text indexers.
//!
//! Given an image path, lupe reads the embedded EXIF metadata, asks a remote
//! analyzer for OCR text fragments and classification keywords, and renders
//! one minimal HTML sub-document per file. An external indexing host drives
//! the extraction through the open/getnext/getipath iteration protocol over
//! stdin/stdout; at most one sub-document is produced per input file.

pub mod analyzer;
pub mod assemble;
pub mod config;
pub mod error;
pub mod host;
pub mod metadata;
pub mod session;
