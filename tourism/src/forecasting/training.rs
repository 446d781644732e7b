use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

use super::bundle::{TrainedModelSet, BUNDLE_FORMAT_VERSION};
use super::features::{
    feature_columns, feature_row, CategoryEncoders, StandardScaler, VisitorHistory,
    HISTORY_TAIL_DAYS,
};
use super::metrics::{self, cross_val_mae, select, train_test_split};
use super::regressors::{Estimator, ModelKind, TrainingParams};
use crate::error::{Result, TourismError};
use crate::models::{ModelMetrics, TimeSeriesObservation, TrainingReport};

/// Cleans the observations and fits every model kind on them.
///
/// Rows with a negative visitor count are dropped. Duplicate
/// `(business_id, date)` keys keep the first occurrence. The returned report
/// has `persisted = false`; the caller decides whether the bundle is stored.
pub fn fit_bundle(
    bundle_id: &str,
    observations: Vec<TimeSeriesObservation>,
    params: &TrainingParams,
) -> Result<(TrainedModelSet, TrainingReport)> {
    if observations.is_empty() {
        return Err(TourismError::Validation(
            "No observations provided for training".to_string(),
        ));
    }

    let received = observations.len();
    let mut seen = HashSet::new();
    let mut rows: Vec<TimeSeriesObservation> = observations
        .into_iter()
        .filter(|obs| obs.visitor_count >= 0)
        .filter(|obs| seen.insert((obs.business_id.clone(), obs.date)))
        .collect();

    if rows.is_empty() {
        return Err(TourismError::Validation(
            "All observations were dropped: visitor_count must be non-negative".to_string(),
        ));
    }
    if rows.len() < received {
        warn!(
            dropped = received - rows.len(),
            kept = rows.len(),
            "Dropped invalid or duplicate observations before training"
        );
    }

    rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.business_id.cmp(&b.business_id)));

    let encoders = CategoryEncoders::fit(&rows);
    let history = VisitorHistory::from_observations(&rows);
    let raw: Vec<Vec<f64>> = rows
        .iter()
        .map(|obs| feature_row(&obs.to_partial(), &encoders, &history))
        .collect();
    let targets: Vec<f64> = rows.iter().map(|obs| obs.visitor_count as f64).collect();

    let scaler = StandardScaler::fit(&raw);
    let matrix = scaler.transform(&raw);

    let (train_idx, test_idx) = train_test_split(rows.len(), params.seed);
    let (train_x, train_y) = select(&matrix, &targets, &train_idx);
    let (test_x, test_y) = select(&matrix, &targets, &test_idx);
    debug!(
        train = train_idx.len(),
        test = test_idx.len(),
        "Split feature matrix"
    );

    let mut models = BTreeMap::new();
    let mut performance = BTreeMap::new();
    for kind in ModelKind::ALL {
        let model = kind.fit(&train_x, &train_y, params)?;
        let predicted = model.predict(&test_x);
        let mae = metrics::mae(&test_y, &predicted);

        let cv_mae = match cross_val_mae(kind, &train_x, &train_y, params) {
            Ok(Some(score)) => score,
            Ok(None) => mae,
            Err(e) => {
                warn!(model = %kind, error = %e, "Cross-validation failed, using holdout MAE");
                mae
            }
        };

        let scores = ModelMetrics {
            mae,
            mse: metrics::mse(&test_y, &predicted),
            rmse: metrics::rmse(&test_y, &predicted),
            r2: metrics::r2(&test_y, &predicted),
            cv_mae,
        };
        info!(
            model = %kind,
            mae = scores.mae,
            rmse = scores.rmse,
            r2 = scores.r2,
            cv_mae = scores.cv_mae,
            "Trained model"
        );

        models.insert(kind.as_str().to_string(), model);
        performance.insert(kind.as_str().to_string(), scores);
    }

    let bundle = TrainedModelSet {
        bundle_id: bundle_id.to_string(),
        version: BUNDLE_FORMAT_VERSION,
        trained_at: Utc::now(),
        feature_columns: feature_columns(),
        scaler,
        encoders,
        models,
        performance,
        history: history.tail(HISTORY_TAIL_DAYS),
        training_samples: train_idx.len(),
        test_samples: test_idx.len(),
    };

    let best_model = bundle
        .best_model()
        .map(|kind| kind.as_str().to_string())
        .unwrap_or_default();

    let report = TrainingReport {
        bundle_id: bundle.bundle_id.clone(),
        trained_at: bundle.trained_at,
        training_samples: bundle.training_samples,
        test_samples: bundle.test_samples,
        models: bundle.performance.clone(),
        best_model,
        persisted: false,
        warning: None,
    };

    Ok((bundle, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn small_params() -> TrainingParams {
        TrainingParams {
            n_trees: 10,
            boosting_stages: 20,
            ..Default::default()
        }
    }

    fn observations(days: i64) -> Vec<TimeSeriesObservation> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..days)
            .map(|i| {
                let mut obs = TimeSeriesObservation::new("hotel-1", start + Duration::days(i), 100 + (i % 7) * 5);
                obs.weather_condition = Some(if i % 3 == 0 { "rainy" } else { "sunny" }.to_string());
                obs
            })
            .collect()
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let err = fit_bundle("b", Vec::new(), &small_params()).unwrap_err();
        assert!(matches!(err, TourismError::Validation(_)));
    }

    #[test]
    fn test_all_negative_rows_are_rejected() {
        let mut obs = observations(3);
        obs.iter_mut().for_each(|o| o.visitor_count = -1);
        let err = fit_bundle("b", obs, &small_params()).unwrap_err();
        assert!(matches!(err, TourismError::Validation(_)));
    }

    #[test]
    fn test_report_covers_every_model() {
        let (bundle, report) = fit_bundle("b", observations(40), &small_params()).unwrap();

        assert_eq!(report.models.len(), 3);
        assert_eq!(report.training_samples, 32);
        assert_eq!(report.test_samples, 8);
        assert!(!report.persisted);
        assert!(ModelKind::ALL.iter().any(|k| k.as_str() == report.best_model));
        for m in report.models.values() {
            assert!(m.mae.is_finite() && m.rmse.is_finite() && m.r2.is_finite() && m.cv_mae.is_finite());
        }
        assert!(bundle.validate().is_ok());
        assert_eq!(bundle.history.len("hotel-1"), 40);
    }

    #[test]
    fn test_duplicates_and_negatives_are_dropped() {
        let mut obs = observations(20);
        let mut dup = obs[3].clone();
        dup.visitor_count = 9999;
        obs.push(dup);
        obs[5].visitor_count = -10;

        let (bundle, report) = fit_bundle("b", obs, &small_params()).unwrap();
        assert_eq!(report.training_samples + report.test_samples, 19);
        assert_eq!(
            bundle.history.value_at("hotel-1", obs_date(3)),
            Some(115.0)
        );
    }

    fn obs_date(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset)
    }

    #[test]
    fn test_single_observation_trains() {
        let (bundle, report) = fit_bundle("b", observations(1), &small_params()).unwrap();
        assert_eq!(report.training_samples, 1);
        assert_eq!(report.test_samples, 1);
        assert_eq!(bundle.models.len(), 3);
    }
}
