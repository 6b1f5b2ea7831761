//! Newline-delimited JSON stream parsing.
//!
//! The search gateway streams one JSON object per line. A physical read
//! chunk may split a line or contain several, so consumers feed raw bytes
//! into [`NdjsonParser`] and get back only complete lines.

mod parser;

pub use parser::NdjsonParser;
