use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::regressors::{Estimator, ModelKind, TrainingParams};
use crate::error::Result;

pub const TEST_FRACTION: f64 = 0.2;
pub const CV_FOLDS: usize = 5;

pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    mean(actual.iter().zip(predicted).map(|(a, p)| (a - p).abs()))
}

pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    mean(actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)))
}

pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    mse(actual, predicted).sqrt()
}

/// Coefficient of determination. A constant target scores 1.0 when matched exactly, else 0.0.
pub fn r2(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean_actual = mean(actual.iter().copied());
    let ss_res: f64 = actual.iter().zip(predicted).map(|(a, p)| (a - p).powi(2)).sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();
    if ss_tot <= f64::EPSILON {
        if ss_res <= f64::EPSILON {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Shuffled train/test index split. The test set takes `ceil(0.2 n)` rows.
/// When that would leave nothing to train on, both sets use every row.
pub fn train_test_split(n: usize, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let n_test = ((n as f64) * TEST_FRACTION).ceil() as usize;
    let test = indices[..n_test.min(n)].to_vec();
    let train = indices[n_test.min(n)..].to_vec();
    if train.is_empty() {
        return (indices.clone(), indices);
    }
    (train, test)
}

/// Contiguous, unshuffled folds. The first `n % k` folds take one extra row.
pub fn kfold(n: usize, k: usize) -> Vec<(Vec<usize>, Vec<usize>)> {
    if k < 2 || n < k {
        return Vec::new();
    }
    let base = n / k;
    let extra = n % k;
    let mut start = 0;
    (0..k)
        .map(|fold| {
            let size = base + usize::from(fold < extra);
            let test: Vec<usize> = (start..start + size).collect();
            let train: Vec<usize> = (0..start).chain(start + size..n).collect();
            start += size;
            (train, test)
        })
        .collect()
}

/// Mean MAE across up to five folds of the training rows.
/// Returns `None` when there are fewer than two rows to fold.
pub fn cross_val_mae(
    kind: ModelKind,
    x: &[Vec<f64>],
    y: &[f64],
    params: &TrainingParams,
) -> Result<Option<f64>> {
    let k = CV_FOLDS.min(y.len());
    let folds = kfold(y.len(), k);
    if folds.is_empty() {
        return Ok(None);
    }

    let mut scores = Vec::with_capacity(folds.len());
    for (train, test) in folds {
        let (train_x, train_y) = select(x, y, &train);
        let (test_x, test_y) = select(x, y, &test);
        let model = kind.fit(&train_x, &train_y, params)?;
        scores.push(mae(&test_y, &model.predict(&test_x)));
    }
    Ok(Some(mean(scores.into_iter())))
}

pub fn select(x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> (Vec<Vec<f64>>, Vec<f64>) {
    indices.iter().map(|&i| (x[i].clone(), y[i])).unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metrics() {
        let actual = [100.0, 110.0, 90.0];
        let predicted = [105.0, 100.0, 95.0];
        assert!((mae(&actual, &predicted) - 20.0 / 3.0).abs() < 1e-12);
        assert!((mse(&actual, &predicted) - 50.0).abs() < 1e-12);
        assert!((rmse(&actual, &predicted) - 50f64.sqrt()).abs() < 1e-12);
        assert!((r2(&actual, &predicted) - (1.0 - 150.0 / 200.0)).abs() < 1e-12);
    }

    #[test]
    fn test_r2_constant_target() {
        assert_eq!(r2(&[5.0, 5.0], &[5.0, 5.0]), 1.0);
        assert_eq!(r2(&[5.0, 5.0], &[4.0, 6.0]), 0.0);
    }

    #[test]
    fn test_split_sizes_and_determinism() {
        let (train, test) = train_test_split(90, 42);
        assert_eq!(test.len(), 18);
        assert_eq!(train.len(), 72);
        assert_eq!(train_test_split(90, 42), (train.clone(), test.clone()));

        let mut all: Vec<usize> = train.into_iter().chain(test).collect();
        all.sort();
        assert_eq!(all, (0..90).collect::<Vec<_>>());
    }

    #[test]
    fn test_single_row_split_reuses_row() {
        let (train, test) = train_test_split(1, 42);
        assert_eq!(train, vec![0]);
        assert_eq!(test, vec![0]);
    }

    #[test]
    fn test_kfold_is_contiguous() {
        let folds = kfold(7, 3);
        assert_eq!(folds.len(), 3);
        assert_eq!(folds[0].1, vec![0, 1, 2]);
        assert_eq!(folds[1].1, vec![3, 4]);
        assert_eq!(folds[2].1, vec![5, 6]);
        assert_eq!(folds[2].0, vec![0, 1, 2, 3, 4]);
        assert!(kfold(1, 1).is_empty());
    }

    #[test]
    fn test_cross_val_needs_two_rows() {
        let params = TrainingParams::default();
        let none = cross_val_mae(ModelKind::LinearRegression, &[vec![1.0]], &[1.0], &params).unwrap();
        assert_eq!(none, None);

        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| 2.0 * i as f64).collect();
        let score = cross_val_mae(ModelKind::LinearRegression, &x, &y, &params)
            .unwrap()
            .unwrap();
        assert!(score < 1e-3);
    }
}
