//! Import utilities for catalog data.
//!
//! Supports JSON Lines format with batched processing.
//!
//! # Example
//!
//! ```ignore
//! use std::fs::File;
//! use std::io::BufReader;
//! use wordwise_core::import::import_jsonl;
//!
//! let reader = BufReader::new(File::open("words.jsonl")?);
//! let stats = import_jsonl(reader, 100, |batch| scheduler.add_items(&batch))?;
//! println!("Imported {}/{}", stats.imported, stats.total);
//! ```

pub mod jsonl;

pub use jsonl::{import_jsonl, ImportStats, ImportableItem};
