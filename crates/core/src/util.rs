use time::OffsetDateTime;

/// Format the time elapsed between two timestamps, e.g. `1d 2h 3m 4s`.
///
/// Days, hours and minutes are omitted when zero; seconds are always shown.
/// Sub-second remainders are floored. `end` is expected to be after `start`.
pub fn compute_duration(start: OffsetDateTime, end: OffsetDateTime) -> String {
    let total = (end - start).whole_seconds();
    let days = total.div_euclid(86400);
    let hours = total.div_euclid(3600) % 24;
    let minutes = total.div_euclid(60) % 60;
    let seconds = total % 60;

    let mut out = String::new();
    for (value, unit) in [(days, 'd'), (hours, 'h'), (minutes, 'm')] {
        if value > 0 {
            out.push_str(&format!("{value}{unit} "));
        }
    }
    out.push_str(&format!("{seconds}s"));
    out
}
