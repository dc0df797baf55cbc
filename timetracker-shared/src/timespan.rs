/// Time helpers for entries: human-readable durations and day boundaries
///
/// Durations render as `2h0m0s`, `1m30s`, `45s`, `1.5ms`. Hours are only
/// shown when non-zero, minutes when hours or minutes are non-zero, and the
/// seconds field always closes the string with trailing fractional zeros
/// trimmed.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SEC: u64 = 1_000_000_000;
const NANOS_PER_MIN: u64 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: u64 = 60 * NANOS_PER_MIN;

/// Formats the span between two instants
///
/// # Example
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use timetracker_shared::timespan::pretty_duration;
///
/// let start = Utc.with_ymd_and_hms(2021, 8, 15, 21, 30, 45).unwrap();
/// assert_eq!(pretty_duration(start, start + Duration::hours(2)), "2h0m0s");
/// ```
pub fn pretty_duration<Tz: TimeZone>(start: DateTime<Tz>, end: DateTime<Tz>) -> String {
    format_duration(end.signed_duration_since(start))
}

/// Formats a signed duration
pub fn format_duration(d: Duration) -> String {
    let nanos = d.num_nanoseconds().unwrap_or(if d < Duration::zero() {
        i64::MIN
    } else {
        i64::MAX
    });

    if nanos == 0 {
        return "0s".to_string();
    }

    let abs = nanos.unsigned_abs();
    let mut out = String::new();

    if nanos < 0 {
        out.push('-');
    }

    if abs < NANOS_PER_SEC {
        let (scale, unit) = if abs < NANOS_PER_MICRO {
            (1, "ns")
        } else if abs < NANOS_PER_MILLI {
            (NANOS_PER_MICRO, "µs")
        } else {
            (NANOS_PER_MILLI, "ms")
        };
        out.push_str(&fixed_point(abs, scale));
        out.push_str(unit);
        return out;
    }

    let hours = abs / NANOS_PER_HOUR;
    let minutes = (abs % NANOS_PER_HOUR) / NANOS_PER_MIN;
    let seconds = abs % NANOS_PER_MIN;

    if hours > 0 {
        out.push_str(&format!("{}h", hours));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{}m", minutes));
    }
    out.push_str(&fixed_point(seconds, NANOS_PER_SEC));
    out.push('s');

    out
}

/// Renders `value / scale` with the fractional part trimmed of zeros
fn fixed_point(value: u64, scale: u64) -> String {
    let whole = value / scale;
    let frac = value % scale;

    if frac == 0 {
        return whole.to_string();
    }

    let width = scale.to_string().len() - 1;
    let digits = format!("{:0width$}", frac, width = width);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Returns `[00:00:00, 23:59:59]` of the given calendar day in UTC
pub fn day_interval(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::default());
    let end = day.and_hms_opt(23, 59, 59).unwrap_or(start);

    (Utc.from_utc_datetime(&start), Utc.from_utc_datetime(&end))
}
