// src/pipeline/stages/mod.rs
//! Stage functions. Each takes its input view, calls tools, and returns the
//! output record for the fields it owns. None of them touch the state itself.

pub mod collector;
pub mod extractor;
pub mod impact;
pub mod writer;
