//! Crossover detection between SMA50 and SMA200
//!
//! Both detectors are edge-triggered: an event fires on the record where the
//! short average moves across the long one, never on records that merely sit
//! above or below it.

use super::types::{MetricRecord, SignalEvent, SignalType};
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

/// (sma50, sma200) at an index, only when both are defined
fn averages(record: &MetricRecord) -> Option<(f64, f64)> {
    Some((record.sma50?, record.sma200?))
}

fn detect_cross(series: &[MetricRecord], direction: Direction) -> Vec<NaiveDate> {
    series
        .windows(2)
        .filter_map(|pair| {
            let (prev_short, prev_long) = averages(&pair[0])?;
            let (short, long) = averages(&pair[1])?;
            let crossed = match direction {
                Direction::Up => prev_short <= prev_long && short > long,
                Direction::Down => prev_short >= prev_long && short < long,
            };
            crossed.then_some(pair[1].date)
        })
        .collect()
}

/// Dates where SMA50 crosses from at-or-below to strictly above SMA200
pub fn detect_golden_crossover(series: &[MetricRecord]) -> Vec<NaiveDate> {
    detect_cross(series, Direction::Up)
}

/// Dates where SMA50 crosses from at-or-above to strictly below SMA200
pub fn detect_death_cross(series: &[MetricRecord]) -> Vec<NaiveDate> {
    detect_cross(series, Direction::Down)
}

/// Build the events to persist for `ticker`
///
/// Golden crosses come first, then death crosses, each group ascending by
/// date. Every event starts with an empty `meta` object.
pub fn detect_signal_events(ticker: &str, series: &[MetricRecord]) -> Vec<SignalEvent> {
    let golden = detect_golden_crossover(series);
    let death = detect_death_cross(series);

    log::debug!(
        "{}: {} golden cross(es), {} death cross(es)",
        ticker,
        golden.len(),
        death.len()
    );

    golden
        .into_iter()
        .map(|date| SignalEvent::new(ticker, date, SignalType::GoldenCross))
        .chain(
            death
                .into_iter()
                .map(|date| SignalEvent::new(ticker, date, SignalType::DeathCross)),
        )
        .collect()
}
