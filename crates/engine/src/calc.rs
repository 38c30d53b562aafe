/// How the entry order should be executed, decided from the mark price's
/// position relative to the signalled entry band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryMode {
    Market,
    Limit(f64),
}

/// Inside the (inclusive) band the entry executes at market; outside it, at
/// a limit on whichever bound is strictly closer to the mark.
pub fn decide_entry_mode(mark_price: f64, entry_range: (f64, f64)) -> EntryMode {
    let (low, high) = (
        entry_range.0.min(entry_range.1),
        entry_range.0.max(entry_range.1),
    );

    if low <= mark_price && mark_price <= high {
        EntryMode::Market
    } else if (mark_price - low).abs() < (mark_price - high).abs() {
        EntryMode::Limit(low)
    } else {
        EntryMode::Limit(high)
    }
}

/// Mean percentage spacing of the target ladder, rounded to 2 decimals.
/// Fewer than two targets yields 0, not an error.
pub fn average_step_percent(targets: &[f64]) -> f64 {
    if targets.len() < 2 {
        return 0.0;
    }

    let total: f64 = targets
        .windows(2)
        .map(|pair| ((pair[1] - pair[0]) / pair[0]).abs() * 100.0)
        .sum();
    let mean = total / (targets.len() - 1) as f64;
    (mean * 100.0).round() / 100.0
}
