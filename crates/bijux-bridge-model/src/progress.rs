// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MigrationStatus {
    Started,
    InProgress,
    Completed,
}

impl MigrationStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }
}

/// Record counts of both stores and the share already held by the new one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MigrationProgress {
    pub legacy_records: u64,
    pub modern_records: u64,
    pub total_records: u64,
    /// Percentage rounded to two decimals.
    pub migration_percentage: f64,
    pub status: MigrationStatus,
}

impl MigrationProgress {
    #[must_use]
    pub fn from_counts(legacy_records: u64, modern_records: u64) -> Self {
        let total_records = legacy_records.saturating_add(modern_records);
        let raw = if total_records == 0 {
            0.0
        } else {
            modern_records as f64 * 100.0 / total_records as f64
        };
        let migration_percentage = (raw * 100.0).round() / 100.0;
        let status = if migration_percentage >= 100.0 {
            MigrationStatus::Completed
        } else if migration_percentage >= 50.0 {
            MigrationStatus::InProgress
        } else {
            MigrationStatus::Started
        };
        Self {
            legacy_records,
            modern_records,
            total_records,
            migration_percentage,
            status,
        }
    }
}
