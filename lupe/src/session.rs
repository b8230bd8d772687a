//! Per-file extraction state machine: open → one produced sub-document →
//! exhausted. The host drives it; nothing on this path panics or lets an
//! error escape across the host boundary.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::analyzer::AnalyzerProvider;
use crate::assemble;
use crate::metadata;

/// Iteration state for the current file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Opened,
    Exhausted,
}

/// Whether more sub-documents are immediately available, none remain after
/// the one being delivered, or none remain at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    More,
    EofNext,
    EofNow,
}

impl Continuation {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Continuation::More => "noeof",
            Continuation::EofNext => "eofnext",
            Continuation::EofNow => "eofnow",
        }
    }
}

/// Request parameter map sent by the host.
pub type Params = HashMap<String, String>;

/// Host-facing reply: the (ok, document, ipath, continuation) tuple plus the
/// mimetype declaration that accompanies a rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractReply {
    pub ok: bool,
    pub document: Vec<u8>,
    pub ipath: String,
    pub continuation: Continuation,
    pub mime_type: Option<String>,
}

impl ExtractReply {
    /// The uniform "nothing extracted" reply: empty payload, terminal signal.
    pub fn failure() -> Self {
        Self {
            ok: false,
            document: Vec::new(),
            ipath: String::new(),
            continuation: Continuation::EofNow,
            mime_type: None,
        }
    }
}

pub struct ExtractionSession {
    analyzer: AnalyzerProvider,
    index: usize,
    state: SessionState,
}

impl ExtractionSession {
    pub fn new(analyzer: AnalyzerProvider) -> Self {
        Self {
            analyzer,
            index: 0,
            state: SessionState::Opened,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Reset iteration for a new file. Never fails.
    pub fn open(&mut self, _params: &Params) -> bool {
        self.index = 0;
        self.state = SessionState::Opened;
        true
    }

    /// Extract the single sub-document for the file named in `params`.
    /// Every failure below the startup precondition is a normal "nothing
    /// extracted" reply, not an escalation.
    pub async fn produce(&mut self, params: &Params) -> ExtractReply {
        let Some(filename) = params.get("filename") else {
            warn!("produce: request carries no filename");
            return ExtractReply::failure();
        };

        // One read feeds metadata extraction and both analyzer passes.
        let bytes = match std::fs::read(filename) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(file = %filename, error = %e, "cannot read file");
                return ExtractReply::failure();
            }
        };

        let record = match metadata::from_bytes(&bytes) {
            Ok(record) => record,
            Err(e) => {
                warn!(file = %filename, error = %e, "metadata extraction failed");
                return ExtractReply::failure();
            }
        };

        let analysis = self.analyzer.analyze(&bytes).await;
        debug!(
            file = %filename,
            metadata_keys = record.len(),
            ocr_words = analysis.ocr_words.len(),
            image_keywords = analysis.image_keywords.len(),
            "rendering sub-document"
        );
        let document = assemble::render(&record, &analysis);

        ExtractReply {
            ok: true,
            document,
            ipath: String::new(),
            continuation: Continuation::EofNext,
            mime_type: Some(assemble::DOCUMENT_MIME_TYPE.to_string()),
        }
    }

    /// Advance the iteration: at most one sub-document per file, then an
    /// immediate "no more data" reply without touching the file again.
    pub async fn get_next(&mut self, params: &Params) -> ExtractReply {
        if self.index >= 1 {
            self.state = SessionState::Exhausted;
            return ExtractReply::failure();
        }
        let reply = self.produce(params).await;
        self.index += 1;
        self.state = SessionState::Exhausted;
        reply
    }

    /// Direct sub-item access: one extraction without consulting the
    /// iteration index.
    pub async fn get_ipath(&mut self, params: &Params) -> ExtractReply {
        self.produce(params).await
    }
}
