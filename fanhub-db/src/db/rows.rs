use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Row;

use fanhub_types::{User, VerificationStatus};

/// Column list matching [`user_from_row`]
pub(crate) const USER_COLUMNS: &str = "id, username, display_name, email, password_hash, bio, \
     avatar_url, banner_image_url, is_verified, verification_status, created_at";

/// Timestamps are stored with millisecond precision and a `Z` suffix so that
/// text order equals time order.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn now_timestamp() -> String {
    format_timestamp(&Utc::now())
}

pub(crate) fn timestamp_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    raw.parse::<DateTime<Utc>>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn count_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let count: i64 = row.get(idx)?;
    Ok(count.max(0) as u64)
}

pub(crate) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let status: String = row.get(9)?;
    let verification_status = VerificationStatus::parse(&status).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            9,
            Type::Text,
            format!("unknown verification status: {}", status).into(),
        )
    })?;

    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        display_name: row.get(2)?,
        email: row.get(3)?,
        password_hash: row.get(4)?,
        bio: row.get(5)?,
        avatar_url: row.get(6)?,
        banner_image_url: row.get(7)?,
        is_verified: row.get::<_, i32>(8)? == 1,
        verification_status,
        created_at: timestamp_at(row, 10)?,
    })
}
