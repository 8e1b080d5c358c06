pub mod client_rate_limit;
pub mod http;

use std::{num::NonZeroU32, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitWindow {
    PerSecond(NonZeroU32),
    PerMinute(NonZeroU32),
    Custom { period: Duration },
}

impl RateLimitWindow {
    /// - `<n>s` → PerSecond(n)
    /// - `<n>m` → PerMinute(n)
    /// - `<n>ms` → Custom { period = n milliseconds }, one request per period
    pub fn from_string(s: &str) -> Option<Self> {
        if let Some(millis) = s.strip_suffix("ms") {
            let number: u64 = millis.parse().ok().filter(|n| *n > 0)?;
            return Some(RateLimitWindow::Custom {
                period: Duration::from_millis(number),
            });
        }

        if s.is_empty() {
            return None;
        }

        let (num_str, unit) = s.split_at(s.len() - 1);
        let number: u32 = match num_str.parse() {
            Ok(n) if n > 0 => n,
            _ => return None,
        };
        let nonzero = NonZeroU32::new(number)?;

        match unit {
            "s" => Some(RateLimitWindow::PerSecond(nonzero)),
            "m" => Some(RateLimitWindow::PerMinute(nonzero)),
            _ => None,
        }
    }
}
