//! Remote image analysis: a general text-recognition pass and a general
//! classification pass over the same raw image payload. Both are fallible
//! network calls; each degrades independently.

mod api;
mod provider;

pub use api::AnalyzerClient;
pub use provider::{AnalyzerProvider, ImageAnalysis};
