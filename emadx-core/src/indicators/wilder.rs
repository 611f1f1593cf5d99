//! True range and Wilder running-sum smoothing.

/// True range from aligned high/low/close slices.
///
/// TR[0] is NaN (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let n = high.len().min(low.len()).min(close.len());
    let mut tr = vec![f64::NAN; n];

    for i in 1..n {
        let (h, l, pc) = (high[i], low[i], close[i - 1]);
        if h.is_nan() || l.is_nan() || pc.is_nan() {
            continue;
        }
        tr[i] = (h - l).max((h - pc).abs()).max((l - pc).abs());
    }

    tr
}

/// Wilder running-sum smoothing, as TA-Lib applies it to DM and TR.
///
/// The first `period - 1` defined values are summed without output. From the
/// next value on, `sum[t] = sum[t-1] - sum[t-1] / period + x[t]`. Leading NaN
/// is skipped; a NaN after the first defined value ends the series.
pub fn wilder_sum(values: &[f64], period: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if period == 0 {
        return result;
    }
    let Some(first) = values.iter().position(|v| !v.is_nan()) else {
        return result;
    };

    let p = period as f64;
    let mut acc = 0.0;
    for (i, &v) in values.iter().enumerate().skip(first) {
        if v.is_nan() {
            break;
        }
        if i - first < period - 1 {
            acc += v;
        } else {
            acc = acc - acc / p + v;
            result[i] = acc;
        }
    }

    result
}
