//! Multi-model consensus
//!
//! Same-quantity values from independent model runs are reduced to a median,
//! a weighted mean and a spread. All statistics are computed in m/s; knots
//! are applied once, when the result is reported.

use std::collections::BTreeMap;

use serde::Serialize;

/// Share of the primary provider when blending with the cross-check provider
pub const PRIMARY_SHARE: f64 = 0.6;
pub const SECONDARY_SHARE: f64 = 0.4;

/// Floor for the sustained wind in a gust factor
pub const MIN_GUST_BASE: f64 = 0.1;

/// `0.6 * primary + 0.4 * secondary`, or the primary alone
#[must_use]
pub fn combine(primary: f64, secondary: Option<f64>) -> f64 {
    match secondary {
        Some(secondary) => primary * PRIMARY_SHARE + secondary * SECONDARY_SHARE,
        None => primary,
    }
}

/// Median; the mean of the two middle values for even counts, 0 when empty
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Weighted mean as a convex combination.
///
/// Weights that do not line up with the values, include a negative or
/// non-finite weight, or sum to zero are replaced by equal weighting.
#[must_use]
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let total: f64 = weights.iter().sum();
    let usable = weights.len() == values.len()
        && weights.iter().all(|w| w.is_finite() && *w >= 0.0)
        && total > 0.0;
    if !usable {
        return values.iter().sum::<f64>() / values.len() as f64;
    }
    values.iter().zip(weights).map(|(v, w)| v * w).sum::<f64>() / total
}

/// `max - min` over at least two values, else 0
#[must_use]
pub fn spread(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    max - min
}

/// Ratio of gust to sustained wind, with the wind floored at 0.1.
///
/// Calm air (no sustained wind) counts as steady: 1.0.
#[must_use]
pub fn gust_factor(gust: f64, wind: f64) -> f64 {
    if wind <= 0.0 {
        return 1.0;
    }
    gust / wind.max(MIN_GUST_BASE)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConsensusStats {
    pub median: f64,
    pub weighted_mean: f64,
    pub spread: f64,
}

impl ConsensusStats {
    #[must_use]
    pub fn of(values: &[f64], weights: &[f64]) -> Self {
        Self {
            median: median(values),
            weighted_mean: weighted_mean(values, weights),
            spread: spread(values),
        }
    }

    /// Stats of a single known value, used when no model contributed
    #[must_use]
    pub fn single(value: f64) -> Self {
        Self {
            median: value,
            weighted_mean: value,
            spread: 0.0,
        }
    }
}

/// One contributing model run or provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSample {
    pub model: String,
    pub wind_speed_ms: f64,
    pub wind_gust_ms: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusResult {
    pub models_used: Vec<String>,
    pub weights_used: BTreeMap<String, f64>,
    pub wind: ConsensusStats,
    pub gust: ConsensusStats,
    /// Median gust over median wind, unitless
    pub gust_factor: f64,
}

impl ConsensusResult {
    /// Fold model samples into consensus statistics.
    ///
    /// With no samples the statistics collapse onto the reconciled snapshot
    /// values passed in as `wind_ms` and `gust_ms`.
    #[must_use]
    pub fn from_samples(samples: &[ModelSample], wind_ms: f64, gust_ms: f64) -> Self {
        let (wind, gust) = if samples.is_empty() {
            (ConsensusStats::single(wind_ms), ConsensusStats::single(gust_ms))
        } else {
            let weights: Vec<f64> = samples.iter().map(|s| s.weight).collect();
            let winds: Vec<f64> = samples.iter().map(|s| s.wind_speed_ms).collect();
            let gusts: Vec<f64> = samples.iter().map(|s| s.wind_gust_ms).collect();
            (ConsensusStats::of(&winds, &weights), ConsensusStats::of(&gusts, &weights))
        };

        Self {
            models_used: samples.iter().map(|s| s.model.clone()).collect(),
            weights_used: samples.iter().map(|s| (s.model.clone(), s.weight)).collect(),
            gust_factor: gust_factor(gust.median, wind.median),
            wind,
            gust,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(model: &str, wind: f64, gust: f64, weight: f64) -> ModelSample {
        ModelSample {
            model: model.to_string(),
            wind_speed_ms: wind,
            wind_gust_ms: gust,
            weight,
        }
    }

    #[test]
    fn test_combine() {
        assert!((combine(10.0, Some(5.0)) - 8.0).abs() < 1e-9);
        assert_eq!(combine(10.0, None), 10.0);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_weighted_mean_models() {
        let stats = ConsensusStats::of(&[10.0, 12.0, 14.0], &[1.0, 1.0, 2.0]);
        assert!((stats.weighted_mean - 12.5).abs() < 1e-9);
        assert_eq!(stats.median, 12.0);
        assert_eq!(stats.spread, 4.0);
    }

    #[test]
    fn test_weighted_mean_scale_invariant() {
        let values = [3.0, 7.5, 9.0, 4.2];
        let weights = [0.5, 2.0, 1.0, 3.0];
        let scaled: Vec<f64> = weights.iter().map(|w| w * 7.3).collect();
        assert!((weighted_mean(&values, &weights) - weighted_mean(&values, &scaled)).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_mean_non_positive_total_falls_back() {
        assert_eq!(weighted_mean(&[2.0, 4.0], &[0.0, 0.0]), 3.0);
        assert_eq!(weighted_mean(&[2.0, 4.0], &[1.0, -1.0]), 3.0);
        assert_eq!(weighted_mean(&[2.0, 4.0], &[1.0]), 3.0);
    }

    #[test]
    fn test_weighted_mean_negative_weight_stays_within_range() {
        // [2, -1] sums to 1 but would extrapolate to 0
        let mean = weighted_mean(&[10.0, 20.0], &[2.0, -1.0]);
        assert_eq!(mean, 15.0);
        assert!((10.0..=20.0).contains(&mean));

        let stats = ConsensusStats::of(&[10.0, 20.0, 14.0], &[3.0, -0.5, f64::INFINITY]);
        assert!((10.0..=20.0).contains(&stats.weighted_mean));
    }

    #[test]
    fn test_spread_needs_two_values() {
        assert_eq!(spread(&[5.0]), 0.0);
        assert_eq!(spread(&[5.0, 2.0, 9.0]), 7.0);
    }

    #[test]
    fn test_gust_factor_floor() {
        assert!((gust_factor(12.0, 10.0) - 1.2).abs() < 1e-9);
        assert!((gust_factor(1.0, 0.05) - 10.0).abs() < 1e-9);
        assert_eq!(gust_factor(2.0, 0.0), 1.0);
        assert_eq!(gust_factor(2.0, -1.0), 1.0);
    }

    #[test]
    fn test_consensus_result_from_samples() {
        let result = ConsensusResult::from_samples(
            &[
                sample("gfs_seamless", 10.0, 12.0, 1.0),
                sample("icon_seamless", 12.0, 15.0, 1.0),
                sample("ecmwf_ifs04", 14.0, 18.0, 2.0),
            ],
            0.0,
            0.0,
        );

        assert_eq!(result.models_used, vec!["gfs_seamless", "icon_seamless", "ecmwf_ifs04"]);
        assert_eq!(result.weights_used["ecmwf_ifs04"], 2.0);
        assert_eq!(result.wind.median, 12.0);
        assert!((result.gust_factor - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_consensus_without_models_uses_snapshot() {
        let result = ConsensusResult::from_samples(&[], 6.0, 9.0);
        assert!(result.models_used.is_empty());
        assert_eq!(result.wind.median, 6.0);
        assert_eq!(result.gust.weighted_mean, 9.0);
        assert_eq!(result.wind.spread, 0.0);
        assert!((result.gust_factor - 1.5).abs() < 1e-9);
    }
}
