//! Data models: configuration, input documents, extracted records.

pub mod config;
pub mod document;
pub mod record;
