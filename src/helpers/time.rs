use chrono::{DateTime, Utc};

/// Parses the identity service `expires` field (RFC 3339) into unix seconds.
pub fn expires_to_unix(expires: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(expires)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).timestamp())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_keystone_expiry() {
        assert_eq!(expires_to_unix("2012-01-01T00:00:00Z"), Some(1325376000));
        assert_eq!(expires_to_unix("2012-01-01T00:00:00.000-06:00"), Some(1325397600));
        assert_eq!(expires_to_unix("tomorrow"), None);
    }
}
