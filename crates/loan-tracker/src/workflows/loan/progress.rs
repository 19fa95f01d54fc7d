use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::domain::LoanApplication;
use super::stage::LoanStage;

const MAX_PERCENT: u8 = 100;

/// Placeholder offset for the letter-of-intent milestone. The dashboard this
/// engine backs never scheduled an LOI date, so this value is chosen to sit
/// between verification and underwriting rather than observed.
pub const LETTER_OF_INTENT_OFFSET_DAYS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressError {
    #[error("no progress percentage configured for stage '{0}'")]
    UnmappedStage(LoanStage),
    #[error("progress for stage '{stage}' must be within 0..=100 (found {percent})")]
    PercentOutOfRange { stage: LoanStage, percent: u16 },
    #[error("projecting {offset_days} days from {from} leaves the supported calendar range")]
    DateOutOfRange { from: NaiveDate, offset_days: u32 },
}

/// Stage to completion-percentage lookup supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageProgressTable {
    entries: BTreeMap<LoanStage, u8>,
}

impl StageProgressTable {
    pub fn from_entries<I>(entries: I) -> Result<Self, ProgressError>
    where
        I: IntoIterator<Item = (LoanStage, u16)>,
    {
        let mut table = BTreeMap::new();
        for (stage, percent) in entries {
            let percent = u8::try_from(percent)
                .ok()
                .filter(|value| *value <= MAX_PERCENT)
                .ok_or(ProgressError::PercentOutOfRange { stage, percent })?;
            table.insert(stage, percent);
        }
        Ok(Self { entries: table })
    }

    pub fn percent_for(&self, stage: LoanStage) -> Result<u8, ProgressError> {
        self.entries
            .get(&stage)
            .copied()
            .ok_or(ProgressError::UnmappedStage(stage))
    }

    pub fn entries(&self) -> impl Iterator<Item = (LoanStage, u8)> + '_ {
        self.entries.iter().map(|(stage, percent)| (*stage, *percent))
    }
}

impl Default for StageProgressTable {
    fn default() -> Self {
        Self {
            entries: BTreeMap::from([
                (LoanStage::Application, 25),
                (LoanStage::PreFlight, 45),
                (LoanStage::Loi, 65),
                (LoanStage::Underwriting, 85),
            ]),
        }
    }
}

pub fn compute_progress_percent(
    stage: LoanStage,
    table: &StageProgressTable,
) -> Result<u8, ProgressError> {
    table.percent_for(stage)
}

/// Adds whole calendar days; month and year rollovers come from chrono.
pub fn project_date(submitted: NaiveDate, offset_days: u32) -> Result<NaiveDate, ProgressError> {
    submitted
        .checked_add_days(Days::new(u64::from(offset_days)))
        .ok_or(ProgressError::DateOutOfRange {
            from: submitted,
            offset_days,
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineMilestone {
    Submitted,
    Verification,
    LetterOfIntent,
    Underwriting,
    FinalApproval,
}

impl TimelineMilestone {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Submitted,
            Self::Verification,
            Self::LetterOfIntent,
            Self::Underwriting,
            Self::FinalApproval,
        ]
    }

    /// Stage backing the milestone; the terminal approval has none.
    pub const fn stage(self) -> Option<LoanStage> {
        match self {
            Self::Submitted => Some(LoanStage::Application),
            Self::Verification => Some(LoanStage::PreFlight),
            Self::LetterOfIntent => Some(LoanStage::Loi),
            Self::Underwriting => Some(LoanStage::Underwriting),
            Self::FinalApproval => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Submitted => "Application Submitted",
            Self::Verification => "Document Verification",
            Self::LetterOfIntent => "Letter of Intent",
            Self::Underwriting => "Underwriting",
            Self::FinalApproval => "Final Approval",
        }
    }

    /// Days after submission. Every milestone is anchored on the submission
    /// date, not on the date the previous stage was entered.
    pub const fn offset_days(self) -> u32 {
        match self {
            Self::Submitted => 0,
            Self::Verification => 7,
            Self::LetterOfIntent => LETTER_OF_INTENT_OFFSET_DAYS,
            Self::Underwriting => 14,
            Self::FinalApproval => 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStatus {
    Actual,
    Estimated,
    Pending,
}

impl DateStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Actual => "Actual",
            Self::Estimated => "Estimated",
            Self::Pending => "Pending",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEvent {
    pub milestone: TimelineMilestone,
    pub label: &'static str,
    pub stage: Option<LoanStage>,
    pub is_complete: bool,
    pub is_active: bool,
    pub date: NaiveDate,
    pub date_status: DateStatus,
}

pub fn build_timeline(application: &LoanApplication) -> Result<Vec<TimelineEvent>, ProgressError> {
    let current = application.current_stage;

    TimelineMilestone::ordered()
        .into_iter()
        .map(|milestone| {
            let date = project_date(application.submitted_date, milestone.offset_days())?;
            let (is_complete, is_active, date_status) = match milestone.stage() {
                Some(stage) => {
                    let is_complete = stage.is_completed(current);
                    let is_active = stage.is_active(current);
                    let status = if is_complete || is_active {
                        DateStatus::Actual
                    } else {
                        DateStatus::Pending
                    };
                    (is_complete, is_active, status)
                }
                None if current == LoanStage::Underwriting => (false, false, DateStatus::Actual),
                None => (false, false, DateStatus::Estimated),
            };

            Ok(TimelineEvent {
                milestone,
                label: milestone.label(),
                stage: milestone.stage(),
                is_complete,
                is_active,
                date,
                date_status,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn default_table_matches_dashboard_values() {
        let table = StageProgressTable::default();
        let percents: Vec<u8> = LoanStage::ordered()
            .into_iter()
            .map(|stage| compute_progress_percent(stage, &table).expect("mapped"))
            .collect();
        assert_eq!(percents, vec![25, 45, 65, 85]);
    }

    #[test]
    fn unmapped_stage_is_an_error_not_zero() {
        let table = StageProgressTable::from_entries([(LoanStage::Application, 25)])
            .expect("valid table");
        assert_eq!(
            compute_progress_percent(LoanStage::Loi, &table),
            Err(ProgressError::UnmappedStage(LoanStage::Loi))
        );
    }

    #[test]
    fn table_rejects_values_above_one_hundred() {
        let err = StageProgressTable::from_entries([(LoanStage::Loi, 101)])
            .expect_err("101 percent rejected");
        assert_eq!(
            err,
            ProgressError::PercentOutOfRange {
                stage: LoanStage::Loi,
                percent: 101
            }
        );
    }

    #[test]
    fn project_date_rolls_over_months_and_years() {
        let submitted = date(2023, 11, 2);
        assert_eq!(project_date(submitted, 0), Ok(submitted));
        assert_eq!(project_date(submitted, 30), Ok(date(2023, 12, 2)));
        assert_eq!(project_date(date(2023, 12, 20), 14), Ok(date(2024, 1, 3)));
        assert_eq!(project_date(date(2024, 2, 22), 7), Ok(date(2024, 2, 29)));
    }

    #[test]
    fn letter_of_intent_uses_the_placeholder_offset() {
        let offsets: Vec<u32> = TimelineMilestone::ordered()
            .into_iter()
            .map(TimelineMilestone::offset_days)
            .collect();
        assert_eq!(offsets, vec![0, 7, LETTER_OF_INTENT_OFFSET_DAYS, 14, 30]);
        assert!(offsets.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn project_date_reports_calendar_overflow() {
        assert!(matches!(
            project_date(NaiveDate::MAX, 1),
            Err(ProgressError::DateOutOfRange { offset_days: 1, .. })
        ));
    }
}
