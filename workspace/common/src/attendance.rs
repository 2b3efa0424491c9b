use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One roster entry that could not be recorded.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AttendanceFailure {
    pub volunteer_id: String,
    pub reason: String,
}

/// Outcome of marking attendance for a roster.
///
/// Entries are recorded one by one, so a failure for one volunteer does not
/// undo the rows already written for others.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AttendanceSummary {
    /// Number of roster entries written
    pub processed: usize,
    pub failed: Vec<AttendanceFailure>,
}

impl AttendanceSummary {
    pub fn record_failure(&mut self, volunteer_id: impl Into<String>, reason: impl Into<String>) {
        self.failed.push(AttendanceFailure {
            volunteer_id: volunteer_id.into(),
            reason: reason.into(),
        });
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_serializes_failures() {
        let mut summary = AttendanceSummary {
            processed: 2,
            ..Default::default()
        };
        assert!(summary.is_complete());

        summary.record_failure("BE2025009", "volunteer not found");
        assert!(!summary.is_complete());

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["processed"], 2);
        assert_eq!(json["failed"][0]["volunteer_id"], "BE2025009");
        assert_eq!(json["failed"][0]["reason"], "volunteer not found");
    }
}
