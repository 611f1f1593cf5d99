//! ADX: Average Directional Index, and +DI (Wilder).
//!
//! Steps, matching TA-Lib's `PLUS_DI` and `ADX`:
//! 1. Compute +DM and -DM from consecutive bars
//! 2. Smooth +DM, -DM, and TR with the Wilder running sum (`wilder_sum`)
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR)
//! 4. -DI = 100 * smoothed(-DM) / smoothed(TR)
//! 5. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 6. ADX = mean of the first `period` DX values, then
//!    `adx[t] = (adx[t-1] * (period - 1) + dx[t]) / period`
//!
//! +DI is defined from index `period`; ADX from index `2 * period - 1`.
//! A bar whose DX is undefined (+DI and -DI both zero) adds zero to the seed
//! and carries the previous ADX afterwards.

use super::wilder::{true_range, wilder_sum};

/// +DM and -DM series. Index 0 is NaN (no previous bar).
pub fn directional_movement(high: &[f64], low: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = high.len().min(low.len());
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];

    for i in 1..n {
        if high[i].is_nan() || low[i].is_nan() || high[i - 1].is_nan() || low[i - 1].is_nan() {
            continue;
        }
        let up = high[i] - high[i - 1];
        let down = low[i - 1] - low[i];

        plus_dm[i] = if up > down && up > 0.0 { up } else { 0.0 };
        minus_dm[i] = if down > up && down > 0.0 { down } else { 0.0 };
    }

    (plus_dm, minus_dm)
}

/// Directional indicator from a smoothed DM series and smoothed TR.
/// A flat range (TR of zero) reads as zero pressure rather than NaN.
fn directional_index(smooth_dm: &[f64], smooth_tr: &[f64]) -> Vec<f64> {
    smooth_dm
        .iter()
        .zip(smooth_tr)
        .map(|(&dm, &tr)| {
            if dm.is_nan() || tr.is_nan() {
                f64::NAN
            } else if tr == 0.0 {
                0.0
            } else {
                100.0 * dm / tr
            }
        })
        .collect()
}

/// Positive directional indicator (+DI).
pub fn plus_di(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let (plus_dm, _) = directional_movement(high, low);
    let tr = true_range(high, low, close);
    directional_index(&wilder_sum(&plus_dm, period), &wilder_sum(&tr, period))
}

/// DX from one bar's +DI and -DI. `None` when both are zero.
fn directional_spread(pdi: f64, mdi: f64) -> Option<f64> {
    let total = pdi + mdi;
    if total == 0.0 {
        None
    } else {
        Some(100.0 * (pdi - mdi).abs() / total)
    }
}

/// Average directional index.
pub fn adx(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let (plus_dm, minus_dm) = directional_movement(high, low);
    let smooth_tr = wilder_sum(&true_range(high, low, close), period);
    let pdi = directional_index(&wilder_sum(&plus_dm, period), &smooth_tr);
    let mdi = directional_index(&wilder_sum(&minus_dm, period), &smooth_tr);

    let mut out = vec![f64::NAN; pdi.len()];
    if period == 0 {
        return out;
    }
    let p = period as f64;
    let mut seen = 0;
    let mut sum_dx = 0.0;
    let mut prev = f64::NAN;

    for t in 0..pdi.len() {
        if pdi[t].is_nan() || mdi[t].is_nan() {
            if seen > 0 {
                break;
            }
            continue;
        }
        let dx = directional_spread(pdi[t], mdi[t]);
        if seen < period {
            sum_dx += dx.unwrap_or(0.0);
            seen += 1;
            if seen < period {
                continue;
            }
            prev = sum_dx / p;
        } else if let Some(dx) = dx {
            prev = (prev * (p - 1.0) + dx) / p;
        }
        out[t] = prev;
    }

    out
}
