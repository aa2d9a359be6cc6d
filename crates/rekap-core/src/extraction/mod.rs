//! Invoice extraction through an external vision model.

mod client;
mod fence;
mod prompt;

pub use client::{parse_completion, parse_record, ExtractionClient};
pub use fence::extract_json_payload;
pub use prompt::{SchemaVariant, AUDITED_PROMPT, ITEMIZED_PROMPT, SUMMARY_PROMPT};

use std::future::Future;

use crate::models::document::Document;
use crate::models::record::ExtractionResult;

/// Trait for document extractors.
///
/// Implementations never fail: errors are reported inside the returned
/// result so a batch can carry on.
pub trait InvoiceExtractor {
    /// Extract invoice data from one document.
    fn extract(&self, document: &Document) -> impl Future<Output = ExtractionResult>;
}
