//! Indicator processor: raw bars → metric records with SMA50/SMA200

use super::error::AnalysisError;
use super::types::{MetricRecord, RawBar};

pub const SHORT_WINDOW: usize = 50;
pub const LONG_WINDOW: usize = 200;

/// Simple moving average over the trailing `period` values
///
/// Output has the same length as `values`. An index is `None` until a full
/// window is available, and stays `None` whenever any value inside its window
/// is missing or non-finite. Gaps are never skipped over.
///
/// A window holding one repeated value averages to exactly that value; other
/// windows use compensated summation so rounding does not drift with `period`.
pub fn simple_moving_average(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if period == 0 || period > values.len() {
        return result;
    }

    for end in period - 1..values.len() {
        result[end] = window_mean(&values[end + 1 - period..=end]);
    }

    result
}

fn window_mean(window: &[Option<f64>]) -> Option<f64> {
    let first = (*window.first()?).filter(|v| v.is_finite())?;

    let mut sum = 0.0_f64;
    let mut compensation = 0.0_f64;
    let mut constant = true;
    for value in window {
        let v = (*value).filter(|v| v.is_finite())?;
        constant &= v == first;

        // Neumaier
        let t = sum + v;
        if sum.abs() >= v.abs() {
            compensation += (sum - t) + v;
        } else {
            compensation += (v - t) + sum;
        }
        sum = t;
    }

    if constant {
        return Some(first);
    }
    Some((sum + compensation) / window.len() as f64)
}

/// Enrich an ascending raw series with SMA50 and SMA200
///
/// Fails on the first date that is not strictly after its predecessor; the
/// series is never reordered or deduplicated here.
pub fn process(raw_series: &[RawBar]) -> Result<Vec<MetricRecord>, AnalysisError> {
    for (index, pair) in raw_series.windows(2).enumerate() {
        if pair[1].date <= pair[0].date {
            return Err(AnalysisError::InputOrdering {
                index: index + 1,
                date: pair[1].date,
                previous: pair[0].date,
            });
        }
    }

    let closes: Vec<Option<f64>> = raw_series.iter().map(|bar| bar.close).collect();
    let sma50 = simple_moving_average(&closes, SHORT_WINDOW);
    let sma200 = simple_moving_average(&closes, LONG_WINDOW);

    let records: Vec<MetricRecord> = raw_series
        .iter()
        .zip(sma50.into_iter().zip(sma200))
        .map(|(bar, (short, long))| MetricRecord::from_bar(bar, short, long))
        .collect();

    log::debug!(
        "Processed {} bars ({} with SMA50, {} with SMA200)",
        records.len(),
        records.iter().filter(|r| r.sma50.is_some()).count(),
        records.iter().filter(|r| r.sma200.is_some()).count()
    );

    Ok(records)
}
