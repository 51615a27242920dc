/// Analysis log
///
/// Every stage of a spectrum analysis is recorded with:
/// - Sequential order
/// - Timestamp
/// - Stage name
/// - The numbers the stage produced
///
/// The log can be rendered as human-readable text or JSON. It lives only as
/// long as the session; nothing is written to disk.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A single log entry representing one analysis stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Sequential stage number (1-based)
    pub sequence: usize,
    pub timestamp: DateTime<Local>,
    pub stage: String,
    pub description: String,
}

impl LogEntry {
    /// Format as human-readable text line
    pub fn to_text(&self) -> String {
        format!(
            "[{:03}] {} | {} | {}",
            self.sequence,
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.stage,
            self.description,
        )
    }
}

/// The analysis log: records all stages in order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisLog {
    pub session_id: String,
    pub session_start: DateTime<Local>,
    pub source: String,
    pub software_version: String,
    pub entries: Vec<LogEntry>,
}

impl AnalysisLog {
    pub fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            session_start: Local::now(),
            source: String::new(),
            software_version: env!("CARGO_PKG_VERSION").to_string(),
            entries: Vec::new(),
        }
    }

    /// Set the spectrum source for this session
    pub fn set_source(&mut self, source: &str) {
        self.source = source.to_string();
    }

    /// Record a stage
    pub fn add_entry(&mut self, stage: &str, description: &str) {
        let seq = self.entries.len() + 1;
        self.entries.push(LogEntry {
            sequence: seq,
            timestamp: Local::now(),
            stage: stage.to_string(),
            description: description.to_string(),
        });
        log::info!("[{:03}] {}: {}", seq, stage, description);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stage names in recorded order
    pub fn stages(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.stage.as_str()).collect()
    }

    /// Export as human-readable text
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("═══════════════════════════════════════════════════════════════\n");
        out.push_str("  NMR Spectrum Analysis Log\n");
        out.push_str("═══════════════════════════════════════════════════════════════\n");
        out.push_str(&format!("  Session ID:  {}\n", self.session_id));
        out.push_str(&format!(
            "  Started:     {}\n",
            self.session_start.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!("  Source:      {}\n", self.source));
        out.push_str(&format!("  Software:    nmrplot v{}\n", self.software_version));
        out.push_str(&format!("  Stages:      {}\n", self.entries.len()));
        out.push_str("───────────────────────────────────────────────────────────────\n");

        for entry in &self.entries {
            out.push_str(&entry.to_text());
            out.push('\n');
        }

        out.push_str("═══════════════════════════════════════════════════════════════\n");
        out
    }

    /// Export as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for AnalysisLog {
    fn default() -> Self {
        Self::new()
    }
}
