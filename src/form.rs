use crate::error::{Result, StoreError};
use crate::record::{BirdCondition, StrikeReport, parse_clock_time};
use crate::store::ReportStore;
use chrono::{Local, NaiveDate};
use log::{error, info};

/// Raw field values of the submission form, as entered by the reporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportForm {
    pub date: String,
    pub time: String,
    pub location: String,
    pub building: String,
    pub bird_condition: String,
    pub species: String,
    pub reporter_email: String,
    pub notes: String,
}

impl Default for ReportForm {
    /// Today's date and the current `HH:MM`, everything else blank.
    fn default() -> Self {
        let now = Local::now();
        Self {
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M").to_string(),
            location: String::new(),
            building: String::new(),
            bird_condition: String::new(),
            species: String::new(),
            reporter_email: String::new(),
            notes: String::new(),
        }
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl ReportForm {
    /// Builds the report to insert. Blank optional fields become `None`.
    pub fn to_report(&self) -> Result<StrikeReport> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|e| StoreError::Validation(format!("date '{}': {}", self.date, e)))?;

        let time = match optional(&self.time) {
            Some(raw) => Some(parse_clock_time(&raw).ok_or_else(|| {
                StoreError::Validation(format!("time '{}' is not HH:MM", raw))
            })?),
            None => None,
        };

        if self.bird_condition.trim().is_empty() {
            return Err(StoreError::Validation("bird condition is required".to_string()));
        }
        let bird_condition: BirdCondition = self.bird_condition.parse()?;

        let report = StrikeReport {
            id: None,
            date,
            time,
            location: optional(&self.location),
            building: self.building.trim().to_string(),
            bird_condition,
            species: optional(&self.species),
            reporter_email: optional(&self.reporter_email),
            notes: optional(&self.notes),
            created_at: None,
        };
        report.validate()?;
        Ok(report)
    }

    /// Sends the form to the store.
    ///
    /// On success the fields reset to their defaults and the stored rows are returned.
    /// On failure the entered values stay untouched so the reporter can retry.
    pub async fn submit<S: ReportStore + ?Sized>(&mut self, store: &S) -> Result<Vec<StrikeReport>> {
        let outcome = match self.to_report() {
            Ok(report) => store.create_report(&report).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(stored) => {
                info!("Report submitted ({} row(s) stored)", stored.len());
                *self = Self::default();
                Ok(stored)
            }
            Err(e) => {
                error!("Error submitting report: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::tests::MemoryStore;
    use chrono::NaiveTime;

    fn filled() -> ReportForm {
        ReportForm {
            date: "2025-09-14".to_string(),
            time: "07:45".to_string(),
            location: "North entrance".to_string(),
            building: "Egan Library".to_string(),
            bird_condition: "deceased".to_string(),
            species: "Varied Thrush".to_string(),
            reporter_email: "a@b.edu".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn test_defaults_are_today_and_blank() {
        let form = ReportForm::default();
        assert_eq!(form.date, Local::now().format("%Y-%m-%d").to_string());
        assert_eq!(form.time.len(), 5);
        assert!(form.building.is_empty());
        assert!(form.bird_condition.is_empty());
    }

    #[test]
    fn test_to_report_maps_blank_fields_to_none() {
        let mut form = filled();
        form.time = String::new();
        form.species = "  ".to_string();
        let report = form.to_report().unwrap();
        assert_eq!(report.time, None);
        assert_eq!(report.species, None);
        assert_eq!(report.notes, None);
        assert_eq!(report.location.as_deref(), Some("North entrance"));
        assert_eq!(report.id, None);
        assert_eq!(report.created_at, None);
    }

    #[test]
    fn test_to_report_rejects_bad_input() {
        let mut form = filled();
        form.bird_condition = String::new();
        assert!(matches!(form.to_report(), Err(StoreError::Validation(_))));

        let mut form = filled();
        form.date = "14/09/2025".to_string();
        assert!(form.to_report().is_err());

        let mut form = filled();
        form.time = "quarter past".to_string();
        assert!(form.to_report().is_err());
    }

    #[tokio::test]
    async fn test_submit_success_resets_form() {
        let store = MemoryStore::default();
        let mut form = filled();

        let stored = form.submit(&store).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].id.is_some());
        assert!(stored[0].created_at.is_some());
        assert_eq!(stored[0].time, NaiveTime::from_hms_opt(7, 45, 0));

        assert!(form.location.is_empty());
        assert!(form.building.is_empty());
        assert!(form.reporter_email.is_empty());
        assert_eq!(store.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_failure_preserves_form() {
        let store = MemoryStore {
            fail: true,
            ..MemoryStore::default()
        };
        let mut form = filled();

        assert!(form.submit(&store).await.is_err());
        assert_eq!(form, filled());
    }

    #[tokio::test]
    async fn test_submit_unknown_building_is_not_sent() {
        let store = MemoryStore::default();
        let mut form = filled();
        form.building = "Gym".to_string();

        assert!(form.submit(&store).await.is_err());
        assert_eq!(form.building, "Gym");
        assert!(store.rows.lock().unwrap().is_empty());
    }
}
