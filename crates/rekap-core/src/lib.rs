//! Core library for batch invoice extraction.
//!
//! This crate provides:
//! - A client for OpenAI-compatible vision models that turns one invoice
//!   image into a structured record, capturing every failure as data
//! - Fence stripping and lenient parsing of the model's JSON output
//! - Row flattening into fixed spreadsheet schemas, with a grand total
//! - A strictly sequential batch pipeline

pub mod amounts;
pub mod audit;
pub mod error;
pub mod extraction;
pub mod models;
pub mod pipeline;
pub mod table;

pub use error::{ExtractionError, RekapError, Result};
pub use extraction::{ExtractionClient, InvoiceExtractor, SchemaVariant};
pub use models::config::RekapConfig;
pub use models::document::Document;
pub use models::record::{ExtractionResult, InvoiceRecord, LineItem};
pub use pipeline::{BatchEvent, BatchProcessor, BatchReport};
pub use table::{Cell, ResultRow, RowTable, Schema};
