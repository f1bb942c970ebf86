//! OneRingDB Query Engine
//!
//! Provides ORQL parsing and batch execution.
//!
//! # Overview
//!
//! A batch flows through four stages:
//! - `lexer`: logos tokenizer for one line
//! - `grammar`: per-command syntax validation into a [`Statement`]
//! - `parser`: name resolution against the store into a [`Command`]
//! - `executor`: header pre-scan, sequential dispatch and result collection

pub mod executor;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod session;

pub use executor::{
    BatchOutcome, ExecutionStats, ExecutorOptions, QueryExecutor, QueryResult, ResultRows,
    clean_batch,
};
pub use grammar::{EdgePattern, NodePattern, PathSearch, Statement, Target, parse_statement};
pub use lexer::{Token, tokenize};
pub use parser::{Command, EdgeSelection, NodeSelection, parse_line};
pub use session::{DisplayFlag, DisplayFlags};
