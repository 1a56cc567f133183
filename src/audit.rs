//! Audit logging for policy decisions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::answer::Answer;
use crate::input::{Query, QueryKind};

/// An audit log entry.
#[derive(Debug, Serialize)]
pub struct AuditEntry {
    /// Timestamp of the query.
    pub timestamp: DateTime<Utc>,
    /// The question asked.
    pub query: QueryKind,
    /// Whether the answer called for a ban.
    pub banned: bool,
    /// Rule that triggered the ban (if banned).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    /// Reason for the ban (if banned).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Summary of the subject (value, user name or log text).
    pub summary: String,
}

impl AuditEntry {
    /// Create a new audit entry from a query and its answer.
    pub fn new(query: &Query, answer: &Answer) -> Self {
        let (rule, reason) = match answer {
            Answer::Verdict(verdict) => match verdict.ban_info() {
                Some(info) => (Some(info.rule.clone()), Some(info.reason.clone())),
                None => (None, None),
            },
            _ => (None, None),
        };

        let summary = query
            .value
            .as_deref()
            .map(|v| match query.user_name.as_deref() {
                Some(user) => format!("{} ({})", v, user),
                None => v.to_string(),
            })
            .or_else(|| query.text.as_deref().map(String::from))
            .map(|s| truncate_string(&s, 200))
            .unwrap_or_else(|| "<none>".to_string());

        Self {
            timestamp: Utc::now(),
            query: query.query,
            banned: answer.is_ban(),
            rule,
            reason,
            summary,
        }
    }
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len - 3;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// Audit logger for writing entries to a file.
pub struct AuditLogger {
    file: File,
}

impl AuditLogger {
    /// Open or create an audit log file.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    /// Write an audit entry to the log.
    pub fn log(&mut self, entry: &AuditEntry) -> std::io::Result<()> {
        let json = serde_json::to_string(entry)?;
        writeln!(self.file, "{}", json)?;
        self.file.flush()
    }

    /// Log the answer to a query.
    pub fn log_answer(&mut self, query: &Query, answer: &Answer) -> std::io::Result<()> {
        let entry = AuditEntry::new(query, answer);
        self.log(&entry)
    }
}
