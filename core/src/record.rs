//! Registry records: the persisted description of one detached process

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File-name suffix shared by every registry record.
///
/// The suffix is the sole discriminator used during enumeration, so it is
/// a fixed constant rather than configuration.
pub const PID_FILE_SUFFIX: &str = "detach.pid";

/// One detached process as tracked by the registry.
///
/// Records are write-once: created after a successful spawn, removed by
/// the process's own cleanup or by a stop action, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRecord {
    /// Process identifier, the primary key
    pub pid: i32,
    /// Command line the process was launched with, detach flag and
    /// action token already stripped
    pub args: Vec<String>,
    /// Timestamp taken immediately before the spawn call was issued
    pub start_time: DateTime<Utc>,
}

impl ProcessRecord {
    /// File name for this record: `<pid>_detach.pid`
    pub fn file_name(&self) -> String {
        format!("{}_{}", self.pid, PID_FILE_SUFFIX)
    }

    /// Wall-clock time elapsed since the process was spawned
    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.start_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_record(pid: i32) -> ProcessRecord {
        ProcessRecord {
            pid,
            args: vec!["myprog".to_string(), "--port=9090".to_string()],
            start_time: Utc::now(),
        }
    }

    #[test]
    fn test_file_name_format() {
        assert_eq!(mk_record(1234).file_name(), "1234_detach.pid");
    }

    #[test]
    fn test_serde_round_trip() {
        let record = mk_record(42);
        let data = serde_json::to_vec(&record).unwrap();
        let decoded: ProcessRecord = serde_json::from_slice(&data).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_serde_field_names() {
        let json = serde_json::to_string(&mk_record(7)).unwrap();
        assert!(json.contains("\"pid\":7"));
        assert!(json.contains("\"startTime\""));
    }

    #[test]
    fn test_elapsed_is_non_negative() {
        let record = mk_record(1);
        assert!(record.elapsed() >= chrono::Duration::zero());
    }
}
