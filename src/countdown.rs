use chrono::NaiveDateTime;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Time left until a target instant, split for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// Both arguments are unix timestamps in seconds. A target in the past
    /// yields a completed countdown.
    pub fn until(target: i64, now: i64) -> Self {
        let left = target.saturating_sub(now).max(0);

        Countdown {
            days: left / DAY,
            hours: (left % DAY) / HOUR,
            minutes: (left % HOUR) / MINUTE,
            seconds: left % MINUTE,
        }
    }

    pub fn completed(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }

    pub fn go_live_label(&self) -> String {
        format!(
            "{} Days {} Hours {} Mins {} Secs",
            self.days, self.hours, self.minutes, self.seconds
        )
    }

    /// Label shown while an end date is pending. Minutes are rounded up so
    /// the last minute reads "1 minutes left".
    pub fn end_label(&self) -> String {
        let mut label = String::new();
        if self.days > 0 {
            label += &format!("{} days ", self.days);
        }
        if self.hours > 0 {
            label += &format!("{} hours ", self.hours);
        }
        label += &format!("{} minutes left to MINT.", self.minutes + 1);
        label
    }
}

pub fn format_timestamp(timestamp: i64) -> String {
    match NaiveDateTime::from_timestamp_opt(timestamp, 0) {
        Some(date) => date.format("%a %B %e %Y %H:%M:%S UTC").to_string(),
        None => timestamp.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_remaining_time() {
        let countdown = Countdown::until(2 * DAY + 3 * HOUR + 4 * MINUTE + 5, 0);

        assert_eq!(
            countdown,
            Countdown {
                days: 2,
                hours: 3,
                minutes: 4,
                seconds: 5
            }
        );
        assert!(!countdown.completed());
        assert_eq!(countdown.go_live_label(), "2 Days 3 Hours 4 Mins 5 Secs");
    }

    #[test]
    fn past_target_is_completed() {
        let countdown = Countdown::until(100, 500);
        assert!(countdown.completed());
        assert_eq!(countdown.go_live_label(), "0 Days 0 Hours 0 Mins 0 Secs");
    }

    #[test]
    fn end_label_skips_empty_units() {
        assert_eq!(
            Countdown::until(DAY + 2 * HOUR + 10 * MINUTE, 0).end_label(),
            "1 days 2 hours 11 minutes left to MINT."
        );
        assert_eq!(
            Countdown::until(30, 0).end_label(),
            "1 minutes left to MINT."
        );
        assert_eq!(
            Countdown::until(3 * HOUR, 0).end_label(),
            "3 hours 1 minutes left to MINT."
        );
    }

    #[test]
    fn formats_timestamp() {
        assert_eq!(format_timestamp(0), "Thu January  1 1970 00:00:00 UTC");
    }
}
