use crate::NavigationReport;

const BASIS_POINTS: u64 = 10_000;

/// Ratio between the king-move distance covered and the steps taken, in
/// basis points. A perfectly straight run scores 10 000.
///
/// Returns `None` until the agent has taken a step.
#[must_use]
pub fn path_efficiency_bps(report: &NavigationReport) -> Option<u32> {
    let (start, end) = report.start.zip(report.position)?;
    if report.steps == 0 {
        return None;
    }
    let direct = u64::from(start.chebyshev_distance(end));
    let bps = direct * BASIS_POINTS / u64::from(report.steps);
    Some(u32::try_from(bps).unwrap_or(u32::MAX))
}

/// Steps taken beyond the king-move distance between start and end.
#[must_use]
pub fn detour_steps(report: &NavigationReport) -> Option<u32> {
    let (start, end) = report.start.zip(report.position)?;
    Some(report.steps.saturating_sub(start.chebyshev_distance(end)))
}
