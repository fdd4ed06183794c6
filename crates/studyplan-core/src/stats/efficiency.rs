//! Actual vs planned study hours.

/// `round(actual_hours / planned_hours * 100)`, or 0 when nothing was
/// planned. Not capped: overshooting the plan yields values above 100.
pub fn efficiency(actual_hours: f64, planned_hours: f64) -> u32 {
    if planned_hours <= 0.0 || !planned_hours.is_finite() {
        return 0;
    }
    let ratio = (actual_hours.max(0.0) / planned_hours * 100.0).round();
    if ratio >= u32::MAX as f64 {
        u32::MAX
    } else {
        ratio as u32
    }
}
