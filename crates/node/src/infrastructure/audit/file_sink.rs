use crate::application::ports::{AuditEntry, AuditError, AuditSink};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends one human-readable line per entry to `<dir>/<Market>_Server.log`:
///
/// ```text
/// [2025-03-10 14:02:11] Purchase Share | Actor: NYKB0001 | Params: ... | Status: Successfully Completed
/// ```
#[derive(Debug)]
pub struct FileAuditSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileAuditSink {
    pub fn open(directory: impl AsRef<Path>, market: &str) -> Result<Self, AuditError> {
        std::fs::create_dir_all(directory.as_ref())?;
        let path = directory.as_ref().join(format!("{}_Server.log", market));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn format(entry: &AuditEntry) -> String {
        let status = if entry.success {
            "Successfully Completed"
        } else {
            "Failed"
        };
        format!(
            "[{}] {} | Actor: {} | Params: {} | Status: {}\n",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.action,
            entry.actor,
            entry.params,
            status
        )
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let line = Self::format(entry);
        let mut file = self.file.lock();
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(success: bool) -> AuditEntry {
        AuditEntry {
            actor: "NYKB0001".into(),
            action: "Purchase Share".into(),
            params: "ShareID: NYKM100325, ShareType: Equity, Quantity: 2".into(),
            success,
            timestamp: Utc.with_ymd_and_hms(2025, 3, 10, 14, 2, 11).unwrap(),
        }
    }

    #[test]
    fn test_line_format() {
        assert_eq!(
            FileAuditSink::format(&entry(true)),
            "[2025-03-10 14:02:11] Purchase Share | Actor: NYKB0001 | \
             Params: ShareID: NYKM100325, ShareType: Equity, Quantity: 2 | \
             Status: Successfully Completed\n"
        );
        assert!(FileAuditSink::format(&entry(false)).ends_with("Status: Failed\n"));
    }

    #[test]
    fn test_appends_to_market_log() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileAuditSink::open(dir.path().join("logs"), "NewYork").unwrap();
        sink.record(&entry(true)).unwrap();
        sink.record(&entry(false)).unwrap();

        assert!(sink.path().ends_with("NewYork_Server.log"));
        let content = std::fs::read_to_string(sink.path()).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
