use chrono::{DateTime, Local, Utc};

/// Current UTC time, overridable with `VD_FIXED_TIME` for deterministic runs.
pub fn now_utc() -> DateTime<Utc> {
    if let Ok(value) = std::env::var("VD_FIXED_TIME") {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&value) {
            return dt.with_timezone(&Utc);
        }
    }
    Utc::now()
}

/// Human-readable local timestamp for table cells and PDF lines.
pub fn local_stamp(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
