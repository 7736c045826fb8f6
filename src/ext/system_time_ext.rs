use std::time::{Duration, SystemTime};

/// Builds a timestamp from seconds since the Unix epoch, as listings report it.
pub fn system_time_from_unix_seconds(seconds: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_from_epoch() {
        let time = system_time_from_unix_seconds(1_700_000_000);
        assert_eq!(
            time.duration_since(SystemTime::UNIX_EPOCH).map(|d| d.as_secs()).ok(),
            Some(1_700_000_000)
        );
    }
}
