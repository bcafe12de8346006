//! Additive time-series regression used for fare forecasting
//!
//! The model decomposes a series into a linear trend plus Fourier
//! seasonalities:
//!
//! ```text
//! y(t) = a + b * t' + Σ_s Σ_k [ c_sk * sin(2πkt / P_s) + d_sk * cos(2πkt / P_s) ]
//! ```
//!
//! where `t'` is time scaled to `[0, 1]` over the training span and `t` is
//! days since the Unix epoch. Yearly seasonality is only fitted with at least
//! two years of history, weekly seasonality only with two weeks of sub-weekly
//! observations. Coefficients come from ridge-regularised least squares, so
//! the fit is deterministic.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;
use tracing::{debug, instrument};

const YEAR_DAYS: f64 = 365.25;
const WEEK_DAYS: f64 = 7.0;
const MIN_YEARLY_SPAN_DAYS: f64 = 730.0;
const MIN_WEEKLY_SPAN_DAYS: f64 = 14.0;
const TREND_RIDGE: f64 = 1e-6;
const PIVOT_EPSILON: f64 = 1e-12;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("need at least {need} observations, got {got}")]
    NotEnoughObservations { got: usize, need: usize },

    #[error("observation on {0} has a non-finite value")]
    NonFiniteValue(NaiveDate),

    #[error("normal equations are singular")]
    SingularSystem,
}

/// One point of the training series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub ds: NaiveDate,
    pub y: f64,
}

impl Observation {
    pub fn new(ds: NaiveDate, y: f64) -> Self {
        Self { ds, y }
    }
}

/// A periodic component expressed as a truncated Fourier series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    pub name: String,
    pub period_days: f64,
    pub order: usize,
}

impl Seasonality {
    fn push_features(&self, t: f64, out: &mut Vec<f64>) {
        for k in 1..=self.order {
            let angle = 2.0 * PI * k as f64 * t / self.period_days;
            out.push(angle.sin());
            out.push(angle.cos());
        }
    }
}

/// Model configuration. Call [`AdditiveModel::fit`] for every forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct AdditiveModel {
    pub yearly_order: usize,
    pub weekly_order: usize,
    /// Standard deviation of the Gaussian prior on seasonal coefficients,
    /// in units of the scaled target
    pub seasonality_prior_scale: f64,
}

impl Default for AdditiveModel {
    fn default() -> Self {
        Self {
            yearly_order: 10,
            weekly_order: 3,
            seasonality_prior_scale: 10.0,
        }
    }
}

impl AdditiveModel {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(level = "debug", skip_all, fields(observations = observations.len()))]
    pub fn fit(&self, observations: &[Observation]) -> Result<FittedModel, ForecastError> {
        if observations.len() < 2 {
            return Err(ForecastError::NotEnoughObservations {
                got: observations.len(),
                need: 2,
            });
        }
        if let Some(bad) = observations.iter().find(|o| !o.y.is_finite()) {
            return Err(ForecastError::NonFiniteValue(bad.ds));
        }

        let mut days: Vec<f64> = observations.iter().map(|o| epoch_days(o.ds)).collect();
        let t_start = days.iter().copied().fold(f64::INFINITY, f64::min);
        let t_end = days.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = t_end - t_start;

        days.sort_by(f64::total_cmp);
        days.dedup();
        let min_gap = days
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold(f64::INFINITY, f64::min);

        let mut seasonalities = Vec::new();
        if self.yearly_order > 0 && span >= MIN_YEARLY_SPAN_DAYS {
            seasonalities.push(Seasonality {
                name: "yearly".to_string(),
                period_days: YEAR_DAYS,
                order: self.yearly_order,
            });
        }
        if self.weekly_order > 0 && span >= MIN_WEEKLY_SPAN_DAYS && min_gap < WEEK_DAYS {
            seasonalities.push(Seasonality {
                name: "weekly".to_string(),
                period_days: WEEK_DAYS,
                order: self.weekly_order,
            });
        }

        let y_scale = observations
            .iter()
            .map(|o| o.y.abs())
            .fold(0.0, f64::max);
        let mut model = FittedModel {
            t_start,
            t_scale: if span > 0.0 { span } else { 1.0 },
            y_scale: if y_scale > 0.0 { y_scale } else { 1.0 },
            seasonalities,
            coefficients: Vec::new(),
        };

        let width = model.width();
        let seasonal_ridge = 1.0 / (self.seasonality_prior_scale * self.seasonality_prior_scale);

        // Normal equations (XᵀX + Λ) β = Xᵀy
        let mut xtx = vec![vec![0.0; width]; width];
        let mut xty = vec![0.0; width];
        let mut row = Vec::with_capacity(width);
        for obs in observations {
            row.clear();
            model.features(epoch_days(obs.ds), &mut row);
            let y = obs.y / model.y_scale;
            for i in 0..width {
                xty[i] += row[i] * y;
                for j in 0..width {
                    xtx[i][j] += row[i] * row[j];
                }
            }
        }
        xtx[1][1] += TREND_RIDGE;
        for (i, xtx_row) in xtx.iter_mut().enumerate().skip(2) {
            xtx_row[i] += seasonal_ridge;
        }

        model.coefficients = solve(xtx, xty)?;
        debug!(
            span_days = span,
            seasonalities = ?model.seasonalities.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            "Additive model fitted"
        );
        Ok(model)
    }
}

/// Coefficients of a fitted [`AdditiveModel`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    t_start: f64,
    t_scale: f64,
    y_scale: f64,
    seasonalities: Vec<Seasonality>,
    coefficients: Vec<f64>,
}

impl FittedModel {
    pub fn predict(&self, ds: NaiveDate) -> f64 {
        let mut row = Vec::with_capacity(self.width());
        self.features(epoch_days(ds), &mut row);
        let scaled: f64 = row
            .iter()
            .zip(&self.coefficients)
            .map(|(x, beta)| x * beta)
            .sum();
        scaled * self.y_scale
    }

    pub fn seasonalities(&self) -> &[Seasonality] {
        &self.seasonalities
    }

    fn width(&self) -> usize {
        2 + self
            .seasonalities
            .iter()
            .map(|s| 2 * s.order)
            .sum::<usize>()
    }

    fn features(&self, t: f64, out: &mut Vec<f64>) {
        out.push(1.0);
        out.push((t - self.t_start) / self.t_scale);
        for seasonality in &self.seasonalities {
            seasonality.push_features(t, out);
        }
    }
}

fn epoch_days(date: NaiveDate) -> f64 {
    // 719_163 days separate 0001-01-01 from 1970-01-01
    (date.num_days_from_ce() - 719_163) as f64
}

/// Gaussian elimination with partial pivoting
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, ForecastError> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .ok_or(ForecastError::SingularSystem)?;
        if a[pivot][col].abs() < PIVOT_EPSILON {
            return Err(ForecastError::SingularSystem);
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}
