//! Classification of one line of restic stdout
//!
//! Restic's stdout is not fully trusted: a line that is not valid JSON is a
//! per-line error the caller logs and skips, and a JSON object with an
//! unknown (or missing) `message_type` is silently ignored so that new
//! event kinds from future restic versions pass through harmlessly.

use serde::Deserialize;
use serde_json::Value;

use resticmon_core::{ResticmonError, Result};

/// One classified line of restic stdout
#[derive(Debug, Clone, PartialEq)]
pub enum ResticEvent {
    /// In-progress report (`message_type: "status"`)
    StatusUpdate(StatusEvent),
    /// Terminal report (`message_type: "summary"`)
    Summary(SummaryEvent),
    /// Valid JSON, but nothing we project metrics from
    Ignored,
}

/// Fields of a `status` event; all optional on the wire
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatusEvent {
    pub percent_done: Option<f64>,
    pub elapsed_seconds: Option<u64>,
    pub seconds_remaining: Option<u64>,
    pub total_files: Option<u64>,
    pub files_done: Option<u64>,
    pub total_bytes: Option<u64>,
    pub bytes_done: Option<u64>,
}

/// Fields of a `summary` event; all optional on the wire
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SummaryEvent {
    pub files_new: Option<u64>,
    pub files_changed: Option<u64>,
    pub files_unmodified: Option<u64>,
    pub dirs_new: Option<u64>,
    pub dirs_changed: Option<u64>,
    pub dirs_unmodified: Option<u64>,
    pub data_added: Option<u64>,
    pub total_files_processed: Option<u64>,
    pub total_bytes_processed: Option<u64>,
    pub total_duration: Option<f64>,
    pub snapshot_id: Option<String>,
}

/// Classify one line of restic stdout
pub fn classify(line: &str) -> Result<ResticEvent> {
    let value: Value = serde_json::from_str(line)
        .map_err(|e| ResticmonError::EventParse(format!("{}: {:?}", e, line.trim_end())))?;

    let kind = value
        .get("message_type")
        .and_then(Value::as_str)
        .map(str::to_owned);

    match kind.as_deref() {
        Some("status") => {
            let event: StatusEvent = serde_json::from_value(value)
                .map_err(|e| ResticmonError::EventParse(format!("bad status event: {}", e)))?;
            Ok(ResticEvent::StatusUpdate(event))
        }
        Some("summary") => {
            let event: SummaryEvent = serde_json::from_value(value)
                .map_err(|e| ResticmonError::EventParse(format!("bad summary event: {}", e)))?;
            Ok(ResticEvent::Summary(event))
        }
        _ => Ok(ResticEvent::Ignored),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line() {
        let line = r#"{"message_type":"status","percent_done":0.25,"total_files":100,"files_done":25,"total_bytes":4096,"bytes_done":1024,"seconds_remaining":30}"#;

        match classify(line).unwrap() {
            ResticEvent::StatusUpdate(e) => {
                assert_eq!(e.percent_done, Some(0.25));
                assert_eq!(e.total_files, Some(100));
                assert_eq!(e.files_done, Some(25));
                assert_eq!(e.seconds_remaining, Some(30));
                assert_eq!(e.elapsed_seconds, None);
            }
            other => panic!("expected status update, got {:?}", other),
        }
    }

    #[test]
    fn test_summary_line() {
        let line = r#"{"message_type":"summary","files_new":3,"files_changed":1,"files_unmodified":96,"total_files_processed":100,"total_bytes_processed":4096,"total_duration":12.34,"snapshot_id":"abc123"}"#;

        match classify(line).unwrap() {
            ResticEvent::Summary(e) => {
                assert_eq!(e.files_new, Some(3));
                assert_eq!(e.total_duration, Some(12.34));
                assert_eq!(e.snapshot_id.as_deref(), Some("abc123"));
                assert_eq!(e.dirs_new, None);
            }
            other => panic!("expected summary, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_discriminator_ignored() {
        let line = r#"{"message_type":"verbose_status","item":"/home/x"}"#;
        assert_eq!(classify(line).unwrap(), ResticEvent::Ignored);
    }

    #[test]
    fn test_missing_discriminator_ignored() {
        let line = r#"{"percent_done":0.5}"#;
        assert_eq!(classify(line).unwrap(), ResticEvent::Ignored);
    }

    #[test]
    fn test_invalid_json_is_error() {
        let err = classify("restic: not json at all").unwrap_err();
        assert!(matches!(err, ResticmonError::EventParse(_)));
    }

    #[test]
    fn test_unknown_fields_tolerated() {
        let line = r#"{"message_type":"status","percent_done":0.5,"current_files":["/a","/b"]}"#;
        match classify(line).unwrap() {
            ResticEvent::StatusUpdate(e) => assert_eq!(e.percent_done, Some(0.5)),
            other => panic!("expected status update, got {:?}", other),
        }
    }
}
