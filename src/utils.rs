use time::{macros::format_description, OffsetDateTime};

/// Local wall-clock time, falling back to UTC when the local offset can't be determined.
pub fn now_local() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// `h:mm:ss AM/PM`, as shown in the activity feed.
pub fn display_time(at: OffsetDateTime) -> String {
    at.format(format_description!(
        "[hour repr:12 padding:none]:[minute]:[second] [period]"
    ))
    .unwrap_or_else(|_| at.time().to_string())
}
