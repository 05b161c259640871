//! Snapshot persistence: the file format lives in `metrix_core::snapshot`,
//! this module owns the file and the flush schedule.
//!
//! - `FileStore`: full-file rewrite (temp file + rename) and boot-time restore.
//! - `PersistenceWorker`: periodic flush plus one final flush on shutdown.

pub mod file;
pub mod worker;

pub use file::FileStore;
pub use worker::PersistenceWorker;
