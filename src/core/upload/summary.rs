//! Batch operation summaries and the correction audit trail

use crate::domain::Result;
use std::path::Path;

/// Outcome counts of a remediation sweep over failed tasks.
#[derive(Debug, Clone, Default)]
pub struct RemediationSummary {
    /// Failed tasks examined
    pub examined: usize,

    /// Tasks patched via the remediation table
    pub remediated: usize,

    /// Tasks with unrecognized logs, left for manual handling
    pub skipped: usize,

    /// Tasks whose patch itself failed
    pub failed: usize,
}

/// Outcome of a bulk dossier retarget run.
#[derive(Debug, Clone, Default)]
pub struct RetargetSummary {
    /// Dossier pairs processed
    pub total: usize,

    /// Dossiers fully migrated (both phases completed)
    pub migrated: usize,

    /// Dossiers skipped because nothing is registered under them
    pub skipped: usize,

    /// Dossiers where a phase failed
    pub failed: usize,

    /// Old dossier ids that now require manual deletion
    pub delete_ids: Vec<String>,
}

impl RetargetSummary {
    /// Persists the delete-ids audit trail as a one-column CSV.
    pub fn write_delete_ids_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = csv::Writer::from_path(path.as_ref())
            .map_err(|e| crate::domain::BrosyncError::Io(e.to_string()))?;
        writer
            .write_record(["broId"])
            .map_err(|e| crate::domain::BrosyncError::Io(e.to_string()))?;
        for bro_id in &self.delete_ids {
            writer
                .write_record([bro_id.as_str()])
                .map_err(|e| crate::domain::BrosyncError::Io(e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| crate::domain::BrosyncError::Io(e.to_string()))?;
        tracing::info!(
            path = %path.as_ref().display(),
            count = self.delete_ids.len(),
            "Wrote delete-ids audit trail"
        );
        Ok(())
    }
}

/// Totals over all delivered addition documents.
#[derive(Debug, Clone, Default)]
pub struct EventsDeliveredReport {
    /// Sum of time-value pair counts over completed addition tasks
    pub total_events: u64,

    /// Distinct GLD dossiers those tasks delivered into
    pub distinct_dossiers: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_delete_ids_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delete_ids.csv");

        let summary = RetargetSummary {
            total: 3,
            migrated: 2,
            skipped: 1,
            failed: 0,
            delete_ids: vec!["GLD000000001".to_string(), "GLD000000002".to_string()],
        };
        summary.write_delete_ids_csv(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("broId"));
        assert!(contents.contains("GLD000000001"));
        assert!(contents.contains("GLD000000002"));
    }

    #[test]
    fn test_empty_delete_ids_still_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delete_ids.csv");

        RetargetSummary::default().write_delete_ids_csv(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.trim(), "broId");
    }
}
