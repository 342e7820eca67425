use chrono::{DateTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
