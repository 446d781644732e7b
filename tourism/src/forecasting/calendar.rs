use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::models::{BaseConditions, PartialObservation};

pub const DEFAULT_TEMPERATURE: f64 = 20.0;
pub const DEFAULT_WEATHER: &str = "clear";
pub const DEFAULT_MARKETING_SPEND: f64 = 0.0;

/// Fixed-date holidays as `(month, day)`. No observed-date shifting.
pub const HOLIDAYS: [(u32, u32); 4] = [
    (1, 1),   // New Year
    (12, 25), // Christmas
    (7, 4),   // Independence Day
    (11, 11), // Veterans Day
];

pub fn is_holiday(date: NaiveDate) -> bool {
    HOLIDAYS.contains(&(date.month(), date.day()))
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// year, month, day, day_of_week (Mon=0), day_of_year, ISO week, quarter and
/// the summer/winter/spring/fall one-hot flags.
pub fn calendar_features(date: NaiveDate) -> [f64; 11] {
    let month = date.month();
    [
        date.year() as f64,
        month as f64,
        date.day() as f64,
        date.weekday().num_days_from_monday() as f64,
        date.ordinal() as f64,
        date.iso_week().week() as f64,
        ((month - 1) / 3 + 1) as f64,
        flag(matches!(month, 6..=8)),
        flag(matches!(month, 12 | 1 | 2)),
        flag(matches!(month, 3..=5)),
        flag(matches!(month, 9..=11)),
    ]
}

/// Synthesizes `days` consecutive predict rows starting at `start`.
pub fn future_rows(
    business_id: &str,
    start: NaiveDate,
    days: u32,
    base: &BaseConditions,
) -> Vec<PartialObservation> {
    (0..days)
        .map(|offset| {
            let date = start + Duration::days(offset as i64);
            PartialObservation {
                business_id: business_id.to_string(),
                date,
                source_market: base.source_market.clone(),
                weather_condition: Some(
                    base.weather_condition
                        .clone()
                        .unwrap_or_else(|| DEFAULT_WEATHER.to_string()),
                ),
                temperature: Some(base.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
                is_holiday: Some(is_holiday(date)),
                is_weekend: Some(is_weekend(date)),
                special_event: base.special_event.clone(),
                marketing_spend: Some(base.marketing_spend.unwrap_or(DEFAULT_MARKETING_SPEND)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_holidays_are_exact_dates() {
        assert!(is_holiday(date(2024, 12, 25)));
        assert!(is_holiday(date(2025, 7, 4)));
        // July 4th 2026 is a Saturday; the Friday is not treated as observed
        assert!(!is_holiday(date(2026, 7, 3)));
        assert!(!is_holiday(date(2024, 11, 28)));
    }

    #[test]
    fn test_calendar_features() {
        // Sunday 2024-03-31
        let f = calendar_features(date(2024, 3, 31));
        assert_eq!(f[0], 2024.0);
        assert_eq!(f[1], 3.0);
        assert_eq!(f[2], 31.0);
        assert_eq!(f[3], 6.0);
        assert_eq!(f[4], 91.0);
        assert_eq!(f[5], 13.0);
        assert_eq!(f[6], 1.0);
        assert_eq!(&f[7..], &[0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_future_rows_apply_defaults() {
        let rows = future_rows("hotel-1", date(2024, 12, 24), 3, &BaseConditions::default());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, date(2024, 12, 24));
        assert_eq!(rows[1].is_holiday, Some(true));
        assert_eq!(rows[0].is_holiday, Some(false));
        assert_eq!(rows[0].temperature, Some(20.0));
        assert_eq!(rows[0].weather_condition.as_deref(), Some("clear"));
        assert_eq!(rows[0].marketing_spend, Some(0.0));
    }

    #[test]
    fn test_future_rows_flag_weekends() {
        let base = BaseConditions {
            temperature: Some(28.5),
            weather_condition: Some("sunny".into()),
            ..Default::default()
        };
        // Friday 2024-06-07
        let rows = future_rows("hotel-1", date(2024, 6, 7), 3, &base);
        let weekend: Vec<bool> = rows.iter().map(|r| r.is_weekend.unwrap()).collect();
        assert_eq!(weekend, vec![false, true, true]);
        assert_eq!(rows[2].temperature, Some(28.5));
        assert_eq!(rows[2].weather_condition.as_deref(), Some("sunny"));
    }
}
