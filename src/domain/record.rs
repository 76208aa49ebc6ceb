//! Lines of the append-only dedup log.
//!
//! Format: `<event_id>\t<RFC3339 timestamp>`. Older logs hold bare ids,
//! which load with no timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Proof that an announcement for `event_id` was delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedRecord {
    pub event_id: String,

    /// When the record was appended (absent for legacy lines)
    pub posted_at: Option<DateTime<Utc>>,
}

impl PostedRecord {
    /// Create a record stamped with the current time
    pub fn now(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            posted_at: Some(Utc::now()),
        }
    }

    /// Parse one log line. Blank lines yield `None`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (id, stamp) = match line.split_once('\t') {
            Some((id, stamp)) => (id.trim(), Some(stamp.trim())),
            None => (line, None),
        };

        let posted_at = stamp
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Some(Self {
            event_id: id.to_string(),
            posted_at,
        })
    }

    /// Render as a log line (without trailing newline)
    pub fn to_line(&self) -> String {
        match self.posted_at {
            Some(ts) => format!("{}\t{}", self.event_id, ts.to_rfc3339()),
            None => self.event_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legacy_line() {
        let record = PostedRecord::parse_line("745123\n").unwrap();
        assert_eq!(record.event_id, "745123");
        assert!(record.posted_at.is_none());
    }

    #[test]
    fn test_parse_stamped_line() {
        let record = PostedRecord::parse_line("745123\t2025-06-01T21:00:00+00:00").unwrap();
        assert_eq!(record.event_id, "745123");
        assert_eq!(
            record.posted_at.unwrap().to_rfc3339(),
            "2025-06-01T21:00:00+00:00"
        );
    }

    #[test]
    fn test_blank_line_skipped() {
        assert!(PostedRecord::parse_line("   ").is_none());
    }

    #[test]
    fn test_bad_timestamp_keeps_id() {
        let record = PostedRecord::parse_line("745123\tyesterday").unwrap();
        assert_eq!(record.event_id, "745123");
        assert!(record.posted_at.is_none());
    }

    #[test]
    fn test_to_line_matches_parse() {
        let record = PostedRecord::now("99");
        let line = record.to_line();
        assert!(line.starts_with("99\t"));
        assert_eq!(PostedRecord::parse_line(&line).unwrap().event_id, "99");
    }
}
