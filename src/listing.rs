use crate::record::{BirdCondition, StrikeReport};
use chrono::{NaiveDate, NaiveTime};
use clap::ValueEnum;

pub const TIME_PLACEHOLDER: &str = "time not recorded";
pub const REDACTED: &str = "***";

/// Condition selector for the report list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ConditionFilter {
    #[default]
    All,
    Deceased,
    Injured,
    Stunned,
}

impl ConditionFilter {
    pub fn matches(&self, condition: BirdCondition) -> bool {
        match self {
            ConditionFilter::All => true,
            ConditionFilter::Deceased => condition == BirdCondition::Deceased,
            ConditionFilter::Injured => condition == BirdCondition::Injured,
            ConditionFilter::Stunned => condition == BirdCondition::Stunned,
        }
    }
}

/// Keeps reports matching `filter`, in their original order.
pub fn filter_reports(reports: &[StrikeReport], filter: ConditionFilter) -> Vec<StrikeReport> {
    reports
        .iter()
        .filter(|r| filter.matches(r.bird_condition))
        .cloned()
        .collect()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn format_time(time: Option<NaiveTime>) -> String {
    match time {
        Some(t) => t.format("%-I:%M %p").to_string(),
        None => TIME_PLACEHOLDER.to_string(),
    }
}

/// Hides the mailbox part of an address: `a@b.edu` becomes `***@b.edu`.
/// Anything without an `@` is fully replaced by `***`.
pub fn redact_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((_, domain)) if !domain.is_empty() => format!("{}@{}", REDACTED, domain),
        _ => REDACTED.to_string(),
    }
}

/// Copy of `report` whose reporter email is redacted, for output leaving the terminal.
pub fn redact_report(report: &StrikeReport) -> StrikeReport {
    StrikeReport {
        reporter_email: report.reporter_email.as_deref().map(redact_email),
        ..report.clone()
    }
}

/// A report with every field rendered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub date: String,
    pub time: String,
    pub building: String,
    pub location: Option<String>,
    pub condition: String,
    pub species: Option<String>,
    pub reporter: Option<String>,
    pub notes: Option<String>,
}

impl ReportRow {
    pub fn from_report(report: &StrikeReport) -> Self {
        let present = |field: &Option<String>| {
            field
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            date: format_date(report.date),
            time: format_time(report.time),
            building: report.building.clone(),
            location: present(&report.location),
            condition: report.bird_condition.label(),
            species: present(&report.species),
            reporter: present(&report.reporter_email).map(|e| redact_email(&e)),
            notes: present(&report.notes),
        }
    }
}

pub fn rows(reports: &[StrikeReport], filter: ConditionFilter) -> Vec<ReportRow> {
    reports
        .iter()
        .filter(|r| filter.matches(r.bird_condition))
        .map(ReportRow::from_report)
        .collect()
}
