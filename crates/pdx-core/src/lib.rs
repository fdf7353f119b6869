//! PDX Core - PDX script parsing and province history timelines
//!
//! # Architecture
//!
//! ```text
//! File bytes → Tokenizer → Parser → Block tree → build_timeline → Vec<TimelineEntry>
//! ```
//!
//! The parser handles the subset of PDX script that history files use:
//! scalars, dated and titled keys, blocks, unkeyed lists and color triples.
//! [`build_timeline`] folds one province's sparse, possibly out-of-order
//! dated updates into a minimal sequence of non-overlapping states.
//!
//! # Guarantees
//!
//! - **Deterministic**: same input always produces the same tree and timeline
//! - **Exact**: scalars re-serialise to their original spelling
//! - **Located**: lex and parse errors carry `line:column`, and the file path
//!   when parsed through [`parse_file`]

pub mod date;
pub mod error;
pub mod history;
pub mod parser;
pub mod title;

pub use date::Date;
pub use error::{Error, Location, Result};
pub use history::{build_timeline, HistoryOptions, TimelineEntry, UnplayableRanges};
pub use parser::ast::{Block, Color, KeyClass, KnownKey, List, Obj, Stmt};
pub use parser::{parse_document, parse_file};
pub use title::{Tier, Title};

/// Library version, as built
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
