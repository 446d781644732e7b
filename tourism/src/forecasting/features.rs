//! Feature matrix construction shared by training and prediction.
//!
//! Rows are built from the same three pieces at both stages: calendar fields
//! derived from the date, lag and rolling-mean features read from a
//! [`VisitorHistory`], and the known-ahead covariates of the observation.
//! Categoricals go through a [`LabelEncoder`] that reserves one code past the
//! fitted classes for values never seen during training.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::calendar;
use crate::models::{PartialObservation, TimeSeriesObservation};

/// Ordered feature columns. The order is part of the persisted bundle format.
pub const FEATURE_COLUMNS: [&str; 23] = [
    "year",
    "month",
    "day",
    "day_of_week",
    "day_of_year",
    "week_of_year",
    "quarter",
    "is_summer",
    "is_winter",
    "is_spring",
    "is_fall",
    "temperature",
    "is_holiday",
    "is_weekend",
    "marketing_spend",
    "visitor_count_lag_1",
    "visitor_count_lag_7",
    "visitor_count_lag_30",
    "visitor_count_ma_7",
    "visitor_count_ma_30",
    "source_market",
    "weather_condition",
    "special_event",
];

pub const LAGS: [i64; 3] = [1, 7, 30];
pub const ROLLING_WINDOWS: [i64; 2] = [7, 30];

/// Days of history kept per business in a trained bundle.
pub const HISTORY_TAIL_DAYS: i64 = 60;

/// Stand-in for a missing categorical value.
pub const UNKNOWN_CATEGORY: &str = "unknown";

pub fn feature_columns() -> Vec<String> {
    FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect()
}

/// Maps category strings to dense integer codes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    /// Sorted, unique.
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut classes: Vec<String> = values
            .into_iter()
            .map(|v| v.unwrap_or(UNKNOWN_CATEGORY).to_string())
            .collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    /// Code reserved for categories absent at fit time.
    pub fn unseen_code(&self) -> usize {
        self.classes.len()
    }

    pub fn encode(&self, value: Option<&str>) -> usize {
        let value = value.unwrap_or(UNKNOWN_CATEGORY);
        self.classes
            .binary_search_by(|class| class.as_str().cmp(value))
            .unwrap_or_else(|_| self.unseen_code())
    }
}

/// One encoder per categorical column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryEncoders {
    pub source_market: LabelEncoder,
    pub weather_condition: LabelEncoder,
    pub special_event: LabelEncoder,
}

impl CategoryEncoders {
    pub fn fit(observations: &[TimeSeriesObservation]) -> Self {
        Self {
            source_market: LabelEncoder::fit(observations.iter().map(|o| o.source_market.as_deref())),
            weather_condition: LabelEncoder::fit(
                observations.iter().map(|o| o.weather_condition.as_deref()),
            ),
            special_event: LabelEncoder::fit(observations.iter().map(|o| o.special_event.as_deref())),
        }
    }
}

/// Per-column standardization: `(x - mean) / std` with population std.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

impl StandardScaler {
    /// Columns with zero variance get a scale of 1.0.
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let width = rows.first().map_or(0, Vec::len);
        let n = rows.len().max(1) as f64;

        let mut means = vec![0.0; width];
        for row in rows {
            for (mean, value) in means.iter_mut().zip(row) {
                *mean += value;
            }
        }
        for mean in &mut means {
            *mean /= n;
        }

        let mut scales = vec![0.0; width];
        for row in rows {
            for ((acc, value), mean) in scales.iter_mut().zip(row).zip(&means) {
                *acc += (value - mean).powi(2);
            }
        }
        for scale in &mut scales {
            let std = (*scale / n).sqrt();
            *scale = if std > 1e-12 && std.is_finite() { std } else { 1.0 };
        }

        Self { means, scales }
    }

    pub fn dims(&self) -> usize {
        self.means.len()
    }

    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(value, (mean, scale))| (value - mean) / scale)
            .collect()
    }

    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }
}

/// Daily visitor counts per business.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisitorHistory {
    series: BTreeMap<String, BTreeMap<NaiveDate, i64>>,
}

impl VisitorHistory {
    pub fn from_observations(observations: &[TimeSeriesObservation]) -> Self {
        let mut series: BTreeMap<String, BTreeMap<NaiveDate, i64>> = BTreeMap::new();
        for obs in observations {
            series
                .entry(obs.business_id.clone())
                .or_default()
                .entry(obs.date)
                .or_insert(obs.visitor_count);
        }
        Self { series }
    }

    pub fn businesses(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn len(&self, business_id: &str) -> usize {
        self.series.get(business_id).map_or(0, BTreeMap::len)
    }

    pub fn last_date(&self, business_id: &str) -> Option<NaiveDate> {
        self.series
            .get(business_id)
            .and_then(|days| days.keys().next_back().copied())
    }

    /// The last known count on or before `date`.
    pub fn value_at(&self, business_id: &str, date: NaiveDate) -> Option<f64> {
        self.series
            .get(business_id)?
            .range(..=date)
            .next_back()
            .map(|(_, count)| *count as f64)
    }

    /// Count `days` before `date`, or 0 with no earlier data.
    pub fn lag(&self, business_id: &str, date: NaiveDate, days: i64) -> f64 {
        self.value_at(business_id, date - Duration::days(days))
            .unwrap_or(0.0)
    }

    /// Mean over the `window` days before `date`, excluding `date` itself.
    /// Returns 0 unless the window start is covered by known data.
    pub fn rolling_mean(&self, business_id: &str, date: NaiveDate, window: i64) -> f64 {
        if window <= 0 || self.value_at(business_id, date - Duration::days(window)).is_none() {
            return 0.0;
        }
        let total: f64 = (1..=window)
            .filter_map(|back| self.value_at(business_id, date - Duration::days(back)))
            .sum();
        total / window as f64
    }

    /// Keeps the last `days` days of each business, counted from its own last date.
    pub fn tail(&self, days: i64) -> Self {
        let series = self
            .series
            .iter()
            .filter_map(|(business, counts)| {
                let last = *counts.keys().next_back()?;
                let cutoff = last - Duration::days(days - 1);
                let kept: BTreeMap<NaiveDate, i64> =
                    counts.range(cutoff..).map(|(d, c)| (*d, *c)).collect();
                Some((business.clone(), kept))
            })
            .collect();
        Self { series }
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Builds the unscaled feature row for one observation, in [`FEATURE_COLUMNS`] order.
pub fn feature_row(
    obs: &PartialObservation,
    encoders: &CategoryEncoders,
    history: &VisitorHistory,
) -> Vec<f64> {
    let date = obs.date;
    let business = obs.business_id.as_str();
    let mut row = Vec::with_capacity(FEATURE_COLUMNS.len());

    row.extend_from_slice(&calendar::calendar_features(date));
    row.push(obs.temperature.filter(|t| t.is_finite()).unwrap_or(0.0));
    row.push(flag(obs.is_holiday.unwrap_or_else(|| calendar::is_holiday(date))));
    row.push(flag(obs.is_weekend.unwrap_or_else(|| calendar::is_weekend(date))));
    row.push(obs.marketing_spend.filter(|m| m.is_finite()).unwrap_or(0.0));

    for lag in LAGS {
        row.push(history.lag(business, date, lag));
    }
    for window in ROLLING_WINDOWS {
        row.push(history.rolling_mean(business, date, window));
    }

    row.push(encoders.source_market.encode(obs.source_market.as_deref()) as f64);
    row.push(encoders.weather_condition.encode(obs.weather_condition.as_deref()) as f64);
    row.push(encoders.special_event.encode(obs.special_event.as_deref()) as f64);

    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(business: &str, start: NaiveDate, counts: &[i64]) -> Vec<TimeSeriesObservation> {
        counts
            .iter()
            .enumerate()
            .map(|(i, c)| TimeSeriesObservation::new(business, start + Duration::days(i as i64), *c))
            .collect()
    }

    #[test]
    fn test_label_encoder_reserves_unseen_bucket() {
        let encoder = LabelEncoder::fit([Some("US"), Some("DE"), None, Some("US")]);
        assert_eq!(encoder.classes, vec!["DE", "US", "unknown"]);
        assert_eq!(encoder.encode(Some("DE")), 0);
        assert_eq!(encoder.encode(None), 2);
        assert_eq!(encoder.encode(Some("FR")), 3);
        assert_eq!(encoder.unseen_code(), 3);
    }

    #[test]
    fn test_scaler_handles_constant_columns() {
        let rows = vec![vec![1.0, 5.0], vec![3.0, 5.0]];
        let scaler = StandardScaler::fit(&rows);
        assert_eq!(scaler.means, vec![2.0, 5.0]);
        assert_eq!(scaler.scales, vec![1.0, 1.0]);
        assert_eq!(scaler.transform_row(&[3.0, 5.0]), vec![1.0, 0.0]);
    }

    #[test]
    fn test_lags_use_previous_days_only() {
        let history = VisitorHistory::from_observations(&series(
            "b",
            date(2024, 1, 1),
            &[10, 20, 30, 40, 50, 60, 70, 80],
        ));
        let d = date(2024, 1, 8);
        assert_eq!(history.lag("b", d, 1), 70.0);
        assert_eq!(history.lag("b", d, 7), 10.0);
        assert_eq!(history.lag("b", d, 30), 0.0);
        assert_eq!(history.lag("other", d, 1), 0.0);
    }

    #[test]
    fn test_rolling_mean_requires_full_window() {
        let history = VisitorHistory::from_observations(&series(
            "b",
            date(2024, 1, 1),
            &[10, 20, 30, 40, 50, 60, 70, 80],
        ));
        // Jan 8: window Jan 1..=Jan 7, excludes the target day
        assert_eq!(history.rolling_mean("b", date(2024, 1, 8), 7), 40.0);
        // Jan 7: window would start Dec 31, before any data
        assert_eq!(history.rolling_mean("b", date(2024, 1, 7), 7), 0.0);
    }

    #[test]
    fn test_history_carries_last_value_forward() {
        let history = VisitorHistory::from_observations(&series("b", date(2024, 1, 1), &[10, 20]));
        assert_eq!(history.value_at("b", date(2024, 1, 20)), Some(20.0));
        assert_eq!(history.lag("b", date(2024, 1, 20), 7), 20.0);
        assert_eq!(history.rolling_mean("b", date(2024, 1, 10), 7), 20.0);
    }

    #[test]
    fn test_tail_keeps_last_days_per_business() {
        let mut obs = series("a", date(2024, 1, 1), &[1; 90]);
        obs.extend(series("b", date(2024, 3, 1), &[2; 5]));
        let tail = VisitorHistory::from_observations(&obs).tail(HISTORY_TAIL_DAYS);
        assert_eq!(tail.len("a"), 60);
        assert_eq!(tail.len("b"), 5);
        assert_eq!(tail.last_date("a"), Some(date(2024, 3, 30)));
    }

    #[test]
    fn test_feature_row_fills_missing_covariates() {
        let encoders = CategoryEncoders::fit(&series("b", date(2024, 1, 1), &[1]));
        let history = VisitorHistory::default();
        // Saturday, Independence Day
        let row = feature_row(&PartialObservation::new("b", date(2026, 7, 4)), &encoders, &history);

        assert_eq!(row.len(), FEATURE_COLUMNS.len());
        assert_eq!(row[11], 0.0); // temperature
        assert_eq!(row[12], 1.0); // is_holiday
        assert_eq!(row[13], 1.0); // is_weekend
        assert_eq!(row[14], 0.0); // marketing_spend
        // categoricals: all fitted as "unknown", so missing maps to code 0
        assert_eq!(&row[20..], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_feature_row_encodes_unseen_category() {
        let mut obs = series("b", date(2024, 1, 1), &[1, 2]);
        obs[0].weather_condition = Some("rainy".into());
        obs[1].weather_condition = Some("sunny".into());
        let encoders = CategoryEncoders::fit(&obs);

        let mut input = PartialObservation::new("b", date(2024, 2, 1));
        input.weather_condition = Some("blizzard".into());
        let row = feature_row(&input, &encoders, &VisitorHistory::default());
        assert_eq!(row[21], 2.0);
    }
}
