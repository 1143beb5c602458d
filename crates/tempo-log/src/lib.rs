//! Binary frame-log format, writer, and offline decoder.
//!
//! The writer serializes one registry snapshot per simulation frame into a
//! compact record stream; the reader is a standalone two-pass batch decoder
//! that rebuilds the per-frame, per-timer time series and emits a CSV
//! report. Writer and reader never communicate directly; the on-disk
//! format is the whole contract between them.
//!
//! # Usage
//!
//! Writing, once per frame:
//!
//! ```
//! use tempo_log::LogWriter;
//! use tempo_timing::TimerRegistry;
//!
//! let mut registry = TimerRegistry::new();
//! let mut writer = LogWriter::new(Vec::<u8>::new());
//!
//! registry.timer("frame");
//! writer.write_frame(&registry).unwrap();
//! registry.reset_all();
//! ```
//!
//! Decoding offline:
//!
//! ```
//! use std::io::Cursor;
//! use tempo_log::LogReader;
//!
//! # let log: Vec<u8> = Vec::new();
//! let mut csv = Vec::<u8>::new();
//! let summary = LogReader::new(Cursor::new(log)).decode_into(&mut csv).unwrap();
//! # let _ = summary.frames;
//! ```

pub mod format;
mod reader;
mod report;
mod writer;

pub use format::REGISTRATION_SENTINEL;
pub use reader::{begins_new_frame, DecodeSummary, LogReader, NameTable};
pub use report::ReportEmitter;
pub use writer::LogWriter;
