//! Wall-clock helpers

use std::time::SystemTime;

/// Current time as Unix epoch milliseconds
///
/// Falls back to 0 if the system clock reads before the epoch.
#[must_use]
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_millis_is_recent() {
        // 2020-01-01 in millis; the clock should be past it
        assert!(epoch_millis() > 1_577_836_800_000);
    }
}
