//! Compact money labels for slider marks and entry summaries.

/// Format an amount the way the comparison sliders label their marks:
/// millions collapse to `M`, thousands to `K`, anything smaller keeps a
/// dollar prefix.
pub fn format_money(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{}M", shorten(value / 1_000_000.0))
    } else if value >= 1_000.0 {
        format!("{}K", shorten(value / 1_000.0))
    } else {
        format!("${}", shorten(value))
    }
}

/// One decimal of precision, dropping it again when it carries nothing:
/// a trailing zero floors, and anything wider than three characters is
/// rounded back to a whole number.
fn shorten(value: f64) -> String {
    let fixed = format!("{value:.1}");
    if fixed.ends_with('0') {
        format!("{}", value.floor() as i64)
    } else if fixed.len() > 3 {
        format!("{}", value.round() as i64)
    } else {
        fixed
    }
}
