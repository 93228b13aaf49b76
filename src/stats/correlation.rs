use crate::error::{Error, Result};
use crate::na::NA;
use crate::temporal::{lag, Temporal, TimeSeries};

/// Ensure two series can be combined position by position.
///
/// Lengths must agree (`LengthMismatch`) and so must every timestamp
/// (`IndexMismatch` names the first differing position).
pub fn check_aligned<T: Temporal>(a: &TimeSeries<T>, b: &TimeSeries<T>) -> Result<()> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    if a.same_index(b) {
        return Ok(());
    }
    match a
        .timestamps()
        .iter()
        .zip(b.timestamps())
        .position(|(x, y)| x != y)
    {
        Some(position) => Err(Error::IndexMismatch { position }),
        None => Ok(()),
    }
}

/// Pearson correlation over the positions where both series are present.
///
/// `NA` when fewer than two complete pairs remain or either side has no spread.
pub fn pearson<T: Temporal>(a: &TimeSeries<T>, b: &TimeSeries<T>) -> Result<NA<f64>> {
    check_aligned(a, b)?;

    let pairs: Vec<(f64, f64)> = a
        .values()
        .iter()
        .zip(b.values())
        .filter_map(|(x, y)| Some((x.get()?, y.get()?)))
        .collect();
    if pairs.len() < 2 {
        return Ok(NA::NA);
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return Ok(NA::NA);
    }
    Ok(NA::Value(cov / (var_x.sqrt() * var_y.sqrt())))
}

/// Correlation between a series and itself `k` periods earlier.
///
/// Applied to first differences this asks whether the change `k` periods ago
/// predicts the current change.
pub fn lagged_correlation<T: Temporal>(series: &TimeSeries<T>, k: usize) -> Result<NA<f64>> {
    let lagged = lag(series, k)?;
    pearson(series, &lagged)
}

/// Sample autocorrelation for lags `0..=max_lag`.
///
/// The mean and the lag-0 denominator use every present value; each lag's
/// numerator sums over the pairs `(t, t + k)` where both ends are present.
/// Lags with no complete pair, or a series with no spread, give `NA`.
///
/// Lags are capped at `len - 1`, the longest lag that can still form a pair,
/// so the result has at most `len` entries (one for an empty series).
pub fn autocorrelation<T: Temporal>(series: &TimeSeries<T>, max_lag: usize) -> Vec<NA<f64>> {
    let values = series.values();
    let max_lag = max_lag.min(values.len().saturating_sub(1));
    log::debug!("acf up to lag {} over {} points", max_lag, values.len());

    let present = series.present_values();
    if present.is_empty() {
        return vec![NA::NA; max_lag + 1];
    }

    let mean = present.iter().sum::<f64>() / present.len() as f64;
    let denominator: f64 = present.iter().map(|x| (x - mean).powi(2)).sum();
    if denominator == 0.0 {
        return vec![NA::NA; max_lag + 1];
    }

    (0..=max_lag)
        .map(|k| {
            let mut numerator = 0.0;
            let mut pairs = 0usize;
            for t in k..values.len() {
                if let (Some(now), Some(then)) = (values[t].get(), values[t - k].get()) {
                    numerator += (now - mean) * (then - mean);
                    pairs += 1;
                }
            }
            if pairs == 0 {
                NA::NA
            } else {
                NA::Value(numerator / denominator)
            }
        })
        .collect()
}

/// Partial autocorrelation for lags `0..=max_lag`, capped like
/// [`autocorrelation`]; index 0 mirrors the lag-0 autocorrelation.
///
/// Computed from the sample autocorrelation with the Durbin-Levinson
/// recursion. Once a lag is undefined every later lag is `NA`.
pub fn partial_autocorrelation<T: Temporal>(
    series: &TimeSeries<T>,
    max_lag: usize,
) -> Result<Vec<NA<f64>>> {
    if max_lag == 0 {
        return Err(Error::InvalidConfiguration(
            "partial autocorrelation needs max_lag >= 1".to_string(),
        ));
    }
    Ok(durbin_levinson(&autocorrelation(series, max_lag)))
}

fn durbin_levinson(acf: &[NA<f64>]) -> Vec<NA<f64>> {
    let max_lag = acf.len() - 1;
    let mut pacf = vec![NA::NA; acf.len()];
    pacf[0] = acf[0];

    // Longest defined prefix of the autocorrelation
    let r: Vec<f64> = acf.iter().map_while(NA::get).collect();

    let mut phi: Vec<f64> = Vec::with_capacity(max_lag);
    for k in 1..r.len() {
        let numerator = r[k] - (1..k).map(|j| phi[j - 1] * r[k - j]).sum::<f64>();
        let denominator = 1.0 - (1..k).map(|j| phi[j - 1] * r[j]).sum::<f64>();
        if denominator.abs() < f64::EPSILON {
            break;
        }
        let phi_kk = numerator / denominator;

        let previous = phi.clone();
        for j in 1..k {
            phi[j - 1] = previous[j - 1] - phi_kk * previous[k - j - 1];
        }
        phi.push(phi_kk);
        pacf[k] = NA::Value(phi_kk);
    }
    pacf
}
