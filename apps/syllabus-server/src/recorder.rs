//! Diagnostic recording of submitted form fields
//!
//! Recording is never part of document generation: failures are logged and
//! the request carries on.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Mutex;

use syllabus_core::FieldMap;
use tracing::debug;

/// Receives the fields of each generate request
///
/// Called from a blocking task, so implementations may do file I/O.
pub trait FieldRecorder: Send + Sync {
    fn record(&self, fields: &FieldMap) -> std::io::Result<()>;
}

/// Logs every field at debug level
#[derive(Debug, Default)]
pub struct TracingRecorder;

impl FieldRecorder for TracingRecorder {
    fn record(&self, fields: &FieldMap) -> std::io::Result<()> {
        for (key, value) in fields.iter() {
            debug!(field = key, value, "Form field");
        }
        Ok(())
    }
}

/// Overwrites a file with the latest request's fields, one `key: value` per
/// line. Blocking; call it off the async runtime.
#[derive(Debug)]
pub struct FileRecorder {
    path: PathBuf,
    // one writer at a time so concurrent requests never mix their lines
    write_lock: Mutex<()>,
}

impl FileRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }
}

impl FieldRecorder for FileRecorder {
    fn record(&self, fields: &FieldMap) -> std::io::Result<()> {
        let contents = format_fields(fields);
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| std::io::Error::other("field dump lock poisoned"))?;
        std::fs::write(&self.path, contents)
    }
}

fn format_fields(fields: &FieldMap) -> String {
    let mut out = String::new();
    for (key, value) in fields.iter() {
        // writing to a String cannot fail
        let _ = writeln!(out, "{}: {}", key, value);
    }
    out
}
