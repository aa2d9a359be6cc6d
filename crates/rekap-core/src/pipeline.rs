//! Sequential batch processing.

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::error::RekapError;
use crate::extraction::InvoiceExtractor;
use crate::models::document::Document;
use crate::models::record::ExtractionResult;
use crate::table::{ResultRow, RowTable, Schema};

/// Progress notifications emitted while a batch runs.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// About to send document `index` (zero-based) of `total`.
    Started {
        index: usize,
        total: usize,
        filename: &'a str,
    },
    /// Document `index` has been extracted and flattened.
    Finished {
        index: usize,
        total: usize,
        result: &'a ExtractionResult,
    },
}

/// Everything produced by one batch run.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub schema: Schema,
    /// One result per document, in upload order.
    pub results: Vec<ExtractionResult>,
    /// Flattened rows, plus the grand-total row when enabled.
    pub rows: Vec<ResultRow>,
    /// Sum of the total column over data rows.
    pub total: Decimal,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| !r.is_error()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_error()).count()
    }
}

/// Runs documents through an extractor one at a time.
pub struct BatchProcessor<E> {
    extractor: E,
    schema: Schema,
    grand_total: bool,
    max_documents: usize,
}

impl<E: InvoiceExtractor> BatchProcessor<E> {
    pub fn new(extractor: E, schema: Schema) -> Self {
        Self {
            extractor,
            schema,
            grand_total: true,
            max_documents: 0,
        }
    }

    /// Set whether a grand-total row is appended.
    pub fn with_grand_total(mut self, enabled: bool) -> Self {
        self.grand_total = enabled;
        self
    }

    /// Set the batch size limit (0 = unlimited).
    pub fn with_max_documents(mut self, limit: usize) -> Self {
        self.max_documents = limit;
        self
    }

    /// Reject batches larger than the configured limit.
    pub fn check_batch_size(&self, count: usize) -> crate::Result<()> {
        if self.max_documents > 0 && count > self.max_documents {
            return Err(RekapError::BatchTooLarge {
                requested: count,
                limit: self.max_documents,
            });
        }
        Ok(())
    }

    /// Process every document in order.
    ///
    /// A failed document yields an error row and the loop carries on;
    /// only the batch-size check can fail the run, before any request.
    pub async fn run<F>(&self, documents: &[Document], mut on_event: F) -> crate::Result<BatchReport>
    where
        F: FnMut(BatchEvent<'_>),
    {
        self.check_batch_size(documents.len())?;

        let total = documents.len();
        let mut table = RowTable::new(self.schema);
        let mut results = Vec::with_capacity(total);

        info!(documents = total, "Starting batch extraction");

        for (index, document) in documents.iter().enumerate() {
            on_event(BatchEvent::Started {
                index,
                total,
                filename: document.filename(),
            });

            let result = self.extractor.extract(document).await;
            if let Some(error) = &result.error {
                warn!(file = %result.filename, error = %error, "Document produced an error row");
            }

            table.push_result(&result);
            on_event(BatchEvent::Finished {
                index,
                total,
                result: &result,
            });
            results.push(result);
        }

        let sum = table.total();
        let rows = table.finish(self.grand_total);

        info!(
            documents = total,
            rows = rows.len(),
            total = %sum,
            "Batch extraction complete"
        );

        Ok(BatchReport {
            schema: self.schema,
            results,
            rows,
            total: sum,
        })
    }
}
