//! Settings facade
//!
//! `Settings` ties a file path to a [`Store`], tracks unsaved changes with a
//! dirty flag and routes diagnostics to a [`DiagnosticSink`].

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::diagnostics::{DiagnosticSink, LogSink};
use crate::error::{Diagnostic, DiagnosticKind, Error, ErrorKind, Result};
use crate::parser;
use crate::serializer::{self, KeyCase};
use crate::store::{OverridePolicy, Section, Store};

/// File used when no path is given
pub const DEFAULT_FILE_NAME: &str = "settings.ini";

/// Options controlling parsing and saving
#[derive(Debug, Clone, Default)]
pub struct SettingsOptions {
    /// Key casing used when saving
    pub key_case: KeyCase,
    /// Position of an attribute whose key is defined again
    pub override_policy: OverridePolicy,
    /// Write to a sibling `.tmp` file and rename it over the target on save
    pub atomic_save: bool,
}

/// An INI settings file loaded into memory
pub struct Settings {
    path: PathBuf,
    options: SettingsOptions,
    store: Store,
    dirty: bool,
    sink: Box<dyn DiagnosticSink>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(DEFAULT_FILE_NAME)
    }
}

impl Settings {
    /// Create empty settings bound to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_options(path, SettingsOptions::default())
    }

    /// Create empty settings with custom options
    pub fn with_options(path: impl Into<PathBuf>, options: SettingsOptions) -> Self {
        Self {
            path: path.into(),
            options,
            store: Store::new(),
            dirty: false,
            sink: Box::new(LogSink),
        }
    }

    /// Replace the diagnostic sink (defaults to [`LogSink`])
    pub fn with_diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Options in effect
    pub fn options(&self) -> &SettingsOptions {
        &self.options
    }

    /// Whether there are changes not yet saved
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read the backing file and merge it into the store
    ///
    /// The whole file is read before parsing, so a failed read leaves the
    /// store untouched. Repeated loads append to what is already there.
    pub fn load(&mut self) -> Result<()> {
        let content =
            fs::read_to_string(&self.path).map_err(|e| Error::load(&self.path, &e))?;

        let stats = parser::parse_into(
            &mut self.store,
            &content,
            self.options.override_policy,
            self.sink.as_ref(),
        );
        log::debug!(
            "Loaded {} pairs from '{}' ({} lines, {} skipped)",
            stats.pairs,
            self.path.display(),
            stats.lines,
            stats.skipped
        );

        self.dirty = false;
        Ok(())
    }

    /// Load, reporting any failure to the sink instead of returning it
    pub fn load_settings(&mut self) -> bool {
        match self.load() {
            Ok(()) => true,
            Err(e) => {
                self.report_failure(&e);
                false
            }
        }
    }

    /// Write the store to the backing file if it is dirty
    ///
    /// Without `atomic_save` a failed write can leave the file partially
    /// written. The dirty flag is only cleared on success.
    pub fn save(&mut self) -> Result<()> {
        if !self.dirty {
            log::trace!("'{}' unchanged, skipping save", self.path.display());
            return Ok(());
        }

        if self.options.atomic_save {
            self.write_atomic()?;
        } else {
            self.write_to(&self.path)?;
        }

        log::debug!(
            "Saved {} sections to '{}'",
            self.store.len(),
            self.path.display()
        );
        self.dirty = false;
        Ok(())
    }

    /// Save, reporting any failure to the sink instead of returning it
    pub fn save_settings(&mut self) -> bool {
        match self.save() {
            Ok(()) => true,
            Err(e) => {
                self.report_failure(&e);
                false
            }
        }
    }

    /// Define or override `key` in `section`
    ///
    /// A blank section name targets `[Default]`; a missing section is
    /// created. Always marks the settings dirty, even when the value is
    /// unchanged.
    ///
    /// The file format has no escaping: a `;` or line break in the value, or
    /// an empty key, is stored in memory as given but will not read back the
    /// same after a save. Such pairs are logged at warn level.
    pub fn set(&mut self, section: &str, key: &str, value: &str) -> bool {
        if let Some(reason) = serializer::round_trip_loss(key, value) {
            log::warn!(
                "{}.{} will not survive a save unchanged: {}",
                section,
                key,
                reason
            );
        }
        let outcome = self
            .store
            .set(section, key, value, self.options.override_policy);
        log::trace!("set {}.{} ({:?})", section, key, outcome);
        self.dirty = true;
        true
    }

    /// Exact-match section lookup
    pub fn get_section(&self, name: &str) -> Option<&Section> {
        self.store.get_section(name)
    }

    /// Look up a single value (case-insensitive key)
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.store.get(section, key)
    }

    /// Sections in file order
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.store.sections()
    }

    /// Every non-comment, non-blank line read so far
    pub fn configuration(&self) -> &[String] {
        self.store.raw_lines()
    }

    /// The underlying store
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Render the store as it would be saved
    pub fn to_ini_string(&self) -> String {
        serializer::to_ini_string(&self.store, self.options.key_case)
    }

    /// Dump sections and attributes as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.store).map_err(|e| Error::internal(e.to_string()))
    }

    fn write_to(&self, target: &Path) -> Result<()> {
        let file = File::create(target).map_err(|e| Error::save(&self.path, &e))?;
        let mut writer = BufWriter::new(file);
        serializer::write_store(&self.store, self.options.key_case, &mut writer)
            .map_err(|e| Error::save(&self.path, &e))
    }

    fn write_atomic(&self) -> Result<()> {
        let tmp = temp_path(&self.path);
        if let Err(e) = self.write_to(&tmp) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            Error::save(&self.path, &e)
        })
    }

    fn report_failure(&self, err: &Error) {
        let file = err
            .file
            .clone()
            .unwrap_or_else(|| self.path.display().to_string());
        let message = err.cause.clone().unwrap_or_else(|| err.to_string());
        let kind = match err.kind {
            ErrorKind::Save => DiagnosticKind::SaveFailed { file, message },
            _ => DiagnosticKind::LoadFailed { file, message },
        };
        self.sink.report(&Diagnostic::now(kind));
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
