//! Filter/search over projected rows, plus status tallies for the summary cards.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use opsboard_core::DomainError;

use crate::policy::ForecastStatus;
use crate::projection::ProjectedRow;

/// Status dropdown: everything, or exactly one status.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Only(ForecastStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: ForecastStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = DomainError;

    /// Accepts `"all"` or a status label such as `"needs review"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        ForecastStatus::from_label(s)
            .map(StatusFilter::Only)
            .ok_or_else(|| DomainError::validation(format!("unknown status filter: {s:?}")))
    }
}

/// Search box + status dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: StatusFilter,
}

impl FilterCriteria {
    pub fn new(search: impl Into<String>, status: StatusFilter) -> Self {
        Self {
            search: search.into(),
            status,
        }
    }

    pub fn matches(&self, row: &ProjectedRow) -> bool {
        self.status.matches(row.status) && matches_search(&self.search.trim().to_lowercase(), row)
    }
}

fn matches_search(needle: &str, row: &ProjectedRow) -> bool {
    needle.is_empty() || row.search_text().to_lowercase().contains(needle)
}

/// Narrow `rows` to those matching both the search text and the status filter.
///
/// Search is case-insensitive over part, display name, fragrance and status
/// label. Input order is preserved.
pub fn filter<'a>(rows: &'a [ProjectedRow], criteria: &FilterCriteria) -> Vec<&'a ProjectedRow> {
    let needle = criteria.search.trim().to_lowercase();
    rows.iter()
        .filter(|row| criteria.status.matches(row.status) && matches_search(&needle, row))
        .collect()
}

/// Row counts per status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusSummary {
    pub total: usize,
    pub healthy: usize,
    pub needs_review: usize,
    pub at_risk: usize,
    pub no_demand: usize,
}

impl StatusSummary {
    pub fn tally<'a>(rows: impl IntoIterator<Item = &'a ProjectedRow>) -> Self {
        rows.into_iter().fold(Self::default(), |mut acc, row| {
            acc.total += 1;
            match row.status {
                ForecastStatus::Healthy => acc.healthy += 1,
                ForecastStatus::NeedsReview => acc.needs_review += 1,
                ForecastStatus::AtRisk => acc.at_risk += 1,
                ForecastStatus::NoDemand => acc.no_demand += 1,
            }
            acc
        })
    }

    pub fn count(&self, status: ForecastStatus) -> usize {
        match status {
            ForecastStatus::Healthy => self.healthy,
            ForecastStatus::NeedsReview => self.needs_review,
            ForecastStatus::AtRisk => self.at_risk,
            ForecastStatus::NoDemand => self.no_demand,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use opsboard_core::PartId;

    use crate::model::ForecastRow;
    use crate::policy::ForecastPolicy;

    fn projected(
        part: &str,
        name: &str,
        fragrance: Option<&str>,
        on_hand: f64,
        avg: f64,
    ) -> ProjectedRow {
        let row = ForecastRow {
            part: PartId::new(part),
            display_name: name.to_string(),
            fragrance: fragrance.map(str::to_string),
            on_hand,
            on_order: 0.0,
            snapshot_id: None,
            avg_monthly_demand: avg,
            demand_override: 0.0,
            derived_demand: avg,
        };
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap();
        ProjectedRow::build(row, 6, now, &ForecastPolicy::default())
    }

    fn board() -> Vec<ProjectedRow> {
        vec![
            projected("LAV-250", "Lavender Candle", Some("Lavender"), 100.0, 30.0), // healthy
            projected("CED-100", "Cedar Diffuser", Some("Cedarwood"), 50.0, 30.0),  // needs review
            projected("CIT-050", "Citrus Soap", None, 40.0, 30.0),                  // at risk
            projected("GFT-BOX", "Gift Box", None, 10.0, 0.0),                       // no demand
        ]
    }

    fn parts(rows: &[&ProjectedRow]) -> Vec<String> {
        rows.iter().map(|r| r.row.part.to_string()).collect()
    }

    fn search(rows: &[ProjectedRow], text: &str) -> Vec<String> {
        parts(&filter(rows, &FilterCriteria::new(text, StatusFilter::All)))
    }

    #[test]
    fn empty_criteria_keeps_everything_in_order() {
        let rows = board();
        let visible = filter(&rows, &FilterCriteria::default());
        assert_eq!(parts(&visible), vec!["LAV-250", "CED-100", "CIT-050", "GFT-BOX"]);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let rows = board();

        assert_eq!(search(&rows, "lav"), vec!["LAV-250"]);
        assert_eq!(search(&rows, "CEDARWOOD"), vec!["CED-100"]);
        assert_eq!(search(&rows, "  soap "), vec!["CIT-050"]);
    }

    #[test]
    fn search_matches_status_label() {
        let rows = board();
        let visible = filter(&rows, &FilterCriteria::new("at risk", StatusFilter::All));
        assert_eq!(parts(&visible), vec!["CIT-050"]);
    }

    #[test]
    fn status_filter_is_exact_and_anded_with_search() {
        let rows = board();

        let needs_review = StatusFilter::Only(ForecastStatus::NeedsReview);
        let review = filter(&rows, &FilterCriteria::new("", needs_review));
        assert_eq!(parts(&review), vec!["CED-100"]);

        let at_risk = StatusFilter::Only(ForecastStatus::AtRisk);
        let none = filter(&rows, &FilterCriteria::new("lavender", at_risk));
        assert!(none.is_empty());
    }

    #[test]
    fn criteria_matches_agrees_with_filter() {
        let rows = board();
        let criteria = FilterCriteria::new("c", StatusFilter::Only(ForecastStatus::AtRisk));
        let direct: Vec<&ProjectedRow> = rows.iter().filter(|r| criteria.matches(r)).collect();
        assert_eq!(direct, filter(&rows, &criteria));
    }

    #[test]
    fn status_filter_parses_labels() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "Needs Review".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(ForecastStatus::NeedsReview)
        );
        assert!(matches!("critical".parse::<StatusFilter>(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn summary_counts_each_status() {
        let rows = board();
        let summary = StatusSummary::tally(&rows);

        assert_eq!(summary.total, 4);
        for status in ForecastStatus::ALL {
            assert_eq!(summary.count(status), 1);
        }
    }
}
