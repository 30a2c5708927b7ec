use chrono::{LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::US::Eastern;

use crate::error::ScrapeError;

/// Status shown once a game has ended.
pub const STATUS_FINAL: &str = "FINAL";
/// Status shown while a game is live.
pub const STATUS_IN_PROGRESS: &str = "IN PROGRESS";

/// Convert a listed Eastern start time like "7:05 PM" into an ISO-8601 UTC
/// timestamp. The status strings "FINAL" and "IN PROGRESS" pass through
/// unchanged.
///
/// The board lists no calendar date, so the wall-clock time is anchored to
/// `today` (the process's local date at parse time). Known limitation: a
/// late Eastern start that crosses midnight UTC is stamped with today's
/// date plus the UTC rollover, which is only right while "today" is still
/// the date the board was published for.
pub fn normalize_event_time(raw: &str, today: NaiveDate) -> Result<String, ScrapeError> {
    if raw == STATUS_FINAL || raw == STATUS_IN_PROGRESS {
        return Ok(raw.to_string());
    }

    let mut parts = raw.split_whitespace();
    let (Some(clock), Some(meridiem)) = (parts.next(), parts.next()) else {
        return Err(ScrapeError::TimeParse(raw.to_string()));
    };

    let time = NaiveTime::parse_from_str(&format!("{} {}", clock, meridiem), "%I:%M %p")
        .map_err(|_| ScrapeError::TimeParse(raw.to_string()))?;

    let eastern = match Eastern.from_local_datetime(&today.and_time(time)) {
        LocalResult::Single(dt) => dt,
        // Fall-back hour during the DST switch; take the earlier mapping.
        LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => return Err(ScrapeError::TimeParse(raw.to_string())),
    };

    Ok(eastern.with_timezone(&Utc).to_rfc3339())
}
