//! Export utilities for catalog and review data.
//!
//! # Example
//!
//! ```ignore
//! use std::fs::File;
//! use wordwise_core::export::export_jsonl;
//!
//! let records = scheduler.store().all_records()?;
//! let stats = export_jsonl(records, File::create("backup.jsonl")?)?;
//! println!("Exported {} items", stats.exported);
//! ```

pub mod jsonl;

pub use jsonl::{export_jsonl, ExportStats, ExportableRecord};
