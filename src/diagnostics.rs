use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

const MAX_LOG_BYTES: u64 = 1_500_000;
pub const LOG_FILE_NAME: &str = "diagnostics.log";

#[derive(Debug, Serialize)]
pub struct LogEvent {
    pub ts: String,
    pub kind: String,
    pub message: String,
}

impl LogEvent {
    fn now(kind: &str, message: &str) -> Self {
        LogEvent {
            ts: Utc::now().to_rfc3339(),
            kind: kind.to_string(),
            message: sanitize(message),
        }
    }
}

/// Strips identifiers out of a diagnostic message. Lookup keys end up in
/// warnings, so phone numbers are dropped and uuids keep only their last
/// three characters.
pub fn sanitize(input: &str) -> String {
    input
        .split_whitespace()
        .map(|token| {
            let trimmed = token.trim_matches(|c: char| matches!(c, ',' | ';' | ':' | '(' | ')'));
            if Uuid::parse_str(trimmed).is_ok() && trimmed.len() >= 32 {
                let tail = &trimmed[trimmed.len() - 3..];
                return format!("[REDACTED]{}", tail);
            }
            let digits = token.chars().filter(|c| c.is_ascii_digit()).count();
            if digits >= 7 {
                "[REDACTED]".to_string()
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Append-only JSON-lines file of selector diagnostics.
///
/// Once the file grows past `max_bytes` it is cut down to roughly half that,
/// starting at a record boundary, so every remaining line is a whole event.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
    max_bytes: u64,
}

impl EventLog {
    pub fn in_dir(dir: &Path) -> Self {
        Self::with_limit(dir.join(LOG_FILE_NAME), MAX_LOG_BYTES)
    }

    pub fn with_limit(path: PathBuf, max_bytes: u64) -> Self {
        EventLog { path, max_bytes }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, kind: &str, message: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.compact()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        serde_json::to_writer(&mut file, &LogEvent::now(kind, message))?;
        file.write_all(b"\n")
    }

    fn compact(&self) -> io::Result<()> {
        let len = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err),
        };
        if len <= self.max_bytes {
            return Ok(());
        }
        let data = fs::read(&self.path)?;
        let start = data.len().saturating_sub((self.max_bytes / 2) as usize);
        let keep_from = if start == 0 || data[start - 1] == b'\n' {
            start
        } else {
            data[start..]
                .iter()
                .position(|byte| *byte == b'\n')
                .map_or(data.len(), |offset| start + offset + 1)
        };
        fs::write(&self.path, &data[keep_from..])
    }
}

/// Where selector warnings and failed development assertions go.
///
/// Selectors never fail their caller: a warning is emitted and a default value is
/// substituted. With `strict` set, failed assertions panic instead, which is how
/// tests catch invalid-state reads.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    log: Option<EventLog>,
    strict: bool,
}

impl Diagnostics {
    pub fn new(log_dir: Option<PathBuf>, strict: bool) -> Self {
        Diagnostics {
            log: log_dir.as_deref().map(EventLog::in_dir),
            strict,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn warn(&self, kind: &str, message: &str) {
        let message = sanitize(message);
        tracing::warn!(kind, "{}", message);
        self.persist(kind, &message);
    }

    pub fn assert_dev(&self, condition: bool, message: &str) {
        if condition {
            return;
        }
        if self.strict {
            panic!("assertion failed: {}", message);
        }
        let message = sanitize(message);
        tracing::error!(kind = "assertion", "{}", message);
        self.persist("assertion", &message);
    }

    fn persist(&self, kind: &str, message: &str) {
        if let Some(log) = &self.log {
            if let Err(err) = log.append(kind, message) {
                tracing::debug!("diagnostics log write failed: {}", err);
            }
        }
    }
}
