//! INI serializer
//!
//! Writes every section header verbatim, followed by one `KEY=value` line per
//! attribute. Values are always written as stored; key casing follows
//! [`KeyCase`].

use std::io::{self, Write};

use crate::store::Store;

/// Casing applied to keys when writing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyCase {
    /// Upper-case every key
    #[default]
    Upper,
    /// Write keys as they were last defined
    Preserve,
}

impl KeyCase {
    fn apply(self, key: &str) -> std::borrow::Cow<'_, str> {
        match self {
            KeyCase::Upper => key.to_uppercase().into(),
            KeyCase::Preserve => key.into(),
        }
    }
}

/// Why a key/value pair would not read back the same after saving
///
/// The format has no escaping, so some content is lost on a round trip.
pub fn round_trip_loss(key: &str, value: &str) -> Option<&'static str> {
    let key = key.trim();
    if key.is_empty() {
        Some("empty key is skipped on load")
    } else if key.starts_with('[') {
        Some("key starting with '[' reads back as a section header")
    } else if key.contains('=') {
        Some("'=' in key moves text into the value")
    } else if key.contains(['\n', '\r']) || value.contains(['\n', '\r']) {
        Some("line break splits the pair across lines")
    } else if key.contains(';') || value.contains(';') {
        Some("';' may be read back as a comment")
    } else if value != value.trim() {
        Some("surrounding whitespace is trimmed on load")
    } else {
        None
    }
}

/// Write `store` as INI text, stopping at the first I/O error
pub fn write_store<W: Write>(store: &Store, key_case: KeyCase, writer: &mut W) -> io::Result<()> {
    for section in store.sections() {
        writeln!(writer, "{}", section.name())?;
        for attr in section {
            writeln!(writer, "{}={}", key_case.apply(&attr.key), attr.value)?;
        }
    }
    writer.flush()
}

/// Render `store` as INI text
pub fn to_ini_string(store: &Store, key_case: KeyCase) -> String {
    let mut buf = Vec::new();
    // writing into a Vec cannot fail
    let _ = write_store(store, key_case, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
