//! inistore-core: INI settings reader/writer
//!
//! This crate loads INI-style files (`[Section]` headers and `key=value`
//! pairs) into an ordered, case-insensitive store, lets callers change
//! values, and writes the result back only when something changed.
//!
//! # Example
//!
//! ```rust
//! use inistore_core::{parse_str, LogSink, OverridePolicy};
//!
//! let ini = "key1=value1\n[Network]\nhost=localhost ; comment\nport=8080\n";
//!
//! let store = parse_str(ini, OverridePolicy::MoveToEnd, &LogSink);
//! assert_eq!(store.get("[Default]", "key1"), Some("value1"));
//! assert_eq!(store.get("[Network]", "HOST"), Some("localhost"));
//! ```

pub mod diagnostics;
pub mod error;
pub mod parser;
pub mod serializer;
pub mod store;

mod settings;

pub use diagnostics::{CollectingSink, DiagnosticSink, LogSink};
pub use error::{Diagnostic, DiagnosticKind, Error, ErrorKind, Result};
pub use parser::{parse_into, parse_str};
pub use serializer::KeyCase;
pub use settings::{Settings, SettingsOptions, DEFAULT_FILE_NAME};
pub use store::{Attribute, OverridePolicy, Section, SetOutcome, Store, DEFAULT_SECTION};
