use crate::record::{BirdCondition, StrikeReport, capitalize};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

pub const TOP_BUILDINGS: usize = 12;
pub const TOP_SPECIES: usize = 8;
/// Report count from which the dashboard switches to detailed insights.
pub const DETAILED_INSIGHT_THRESHOLD: usize = 10;
/// A species is called out in summary insights only above this many reports.
pub const NOTABLE_SPECIES_COUNT: usize = 10;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// One chart bar: a group label and how many reports fell into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Count {
    pub label: String,
    pub count: usize,
}

/// Groups keys in first-seen order and counts them.
fn tally<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<Count> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<Count> = Vec::new();
    for key in keys {
        match index.get(key) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(key, counts.len());
                counts.push(Count {
                    label: key.to_string(),
                    count: 1,
                });
            }
        }
    }
    counts
}

fn top(mut counts: Vec<Count>, limit: usize) -> Vec<Count> {
    // stable: equal counts keep first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

pub fn counts_by_building(reports: &[StrikeReport]) -> Vec<Count> {
    top(
        tally(reports.iter().map(|r| r.building.as_str())),
        TOP_BUILDINGS,
    )
}

pub fn counts_by_condition(reports: &[StrikeReport]) -> Vec<Count> {
    tally(reports.iter().map(|r| r.bird_condition.as_str()))
        .into_iter()
        .map(|c| Count {
            label: capitalize(&c.label),
            count: c.count,
        })
        .collect()
}

/// Identified species only; `Unknown`, `Other` and missing values are skipped.
pub fn counts_by_species(reports: &[StrikeReport]) -> Vec<Count> {
    top(
        tally(reports.iter().filter_map(|r| r.identified_species())),
        TOP_SPECIES,
    )
}

/// Headline numbers shown above the charts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Statistics {
    pub total: usize,
    pub deceased: usize,
    pub injured: usize,
    pub stunned: usize,
    /// Percentage of reports where the bird died, rounded to a whole number.
    pub fatality_rate: u32,
    pub distinct_buildings: usize,
    /// Every non-empty species value, sentinels included.
    pub distinct_species: usize,
    /// Species eligible for the species chart.
    pub charted_species: usize,
    pub collection_days: i64,
}

impl Statistics {
    pub fn from_reports(reports: &[StrikeReport], now: DateTime<Utc>) -> Self {
        let with_condition =
            |condition: BirdCondition| reports.iter().filter(|r| r.bird_condition == condition).count();

        let total = reports.len();
        let deceased = with_condition(BirdCondition::Deceased);

        Self {
            total,
            deceased,
            injured: with_condition(BirdCondition::Injured),
            stunned: with_condition(BirdCondition::Stunned),
            fatality_rate: fatality_rate(deceased, total),
            distinct_buildings: reports
                .iter()
                .map(|r| r.building.as_str())
                .collect::<HashSet<_>>()
                .len(),
            distinct_species: reports
                .iter()
                .filter_map(|r| r.species.as_deref())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<HashSet<_>>()
                .len(),
            charted_species: reports
                .iter()
                .filter_map(|r| r.identified_species())
                .collect::<HashSet<_>>()
                .len(),
            collection_days: collection_days(reports, now),
        }
    }
}

impl Statistics {
    /// Stat-card lines; stunned birds count as recovered.
    pub fn headline(&self) -> Vec<String> {
        vec![
            format!("Total reports: {}", self.total),
            format!("Deceased: {}", self.deceased),
            format!("Injured: {}", self.injured),
            format!("Recovered: {}", self.stunned),
        ]
    }

    /// Notes for charts that were cut to their top entries.
    pub fn truncation_notes(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if self.distinct_buildings > TOP_BUILDINGS {
            notes.push(format!(
                "Showing top {} of {} buildings",
                TOP_BUILDINGS, self.distinct_buildings
            ));
        }
        if self.charted_species > TOP_SPECIES {
            notes.push(format!(
                "Showing top {} of {} species",
                TOP_SPECIES, self.charted_species
            ));
        }
        notes
    }
}

fn fatality_rate(deceased: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * deceased as f64 / total as f64).round() as u32
}

/// Whole days, rounded up, between the earliest report date (UTC midnight) and `now`.
pub fn collection_days(reports: &[StrikeReport], now: DateTime<Utc>) -> i64 {
    let Some(earliest) = reports.iter().map(|r| r.date).min() else {
        return 0;
    };
    let start = earliest.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
    let elapsed_ms = (now - start).num_milliseconds() as f64;
    (elapsed_ms / MILLIS_PER_DAY).ceil() as i64
}

/// Plain-language observations about the collected reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insights {
    pub lines: Vec<String>,
    /// Set while there is too little data for detailed insights.
    pub needs_more_data: bool,
}

impl Insights {
    pub fn from_reports(reports: &[StrikeReport], now: DateTime<Utc>) -> Self {
        let stats = Statistics::from_reports(reports, now);
        let top_building = counts_by_building(reports).into_iter().next();
        let top_species = counts_by_species(reports).into_iter().next();
        let mut lines = Vec::new();

        let detailed = stats.total >= DETAILED_INSIGHT_THRESHOLD;
        if detailed {
            if let Some(building) = &top_building {
                lines.push(format!(
                    "{} has the highest number of strikes ({} reports)",
                    building.label, building.count
                ));
            }
            lines.push(format!(
                "{}% of reported strikes were fatal",
                stats.fatality_rate
            ));
            if let Some(species) = &top_species {
                lines.push(format!(
                    "Most affected species: {} ({} reports)",
                    species.label, species.count
                ));
            }
        } else {
            lines.push(format!(
                "{} total incidents reported across campus",
                stats.total
            ));
            lines.push(format!(
                "{} fatalities, {} injuries, {} recoveries",
                stats.deceased, stats.injured, stats.stunned
            ));
            lines.push(format!(
                "Reports from {} different buildings",
                stats.distinct_buildings
            ));
            if let Some(species) = &top_species {
                lines.push(format!(
                    "{} different bird species affected",
                    stats.distinct_species
                ));
                if species.count > NOTABLE_SPECIES_COUNT {
                    lines.push(format!(
                        "{} is the most frequently reported species ({} reports)",
                        species.label, species.count
                    ));
                }
            }
        }
        lines.push(format!(
            "Data collection period: {} days",
            stats.collection_days
        ));

        Self {
            lines,
            needs_more_data: !detailed,
        }
    }
}
