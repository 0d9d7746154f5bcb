use chrono::{Datelike, NaiveDateTime, Utc};

// Clock supplies "now"; validation reads the current year through it on every request
pub trait Clock: Sync + Send {
    fn now(&self) -> NaiveDateTime;

    fn current_year(&self) -> i32 {
        self.now().year()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

// FixedClock always reports the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: NaiveDateTime,
}

impl FixedClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self { at }
    }

    pub fn at_year(year: i32) -> Option<Self> {
        chrono::NaiveDate::from_ymd_opt(year, 6, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .map(Self::new)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.at
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Utc};
    use crate::core::clock::{Clock, FixedClock, SystemClock};

    #[tokio::test]
    async fn test_should_report_fixed_year() {
        let clock = FixedClock::at_year(2024).expect("valid date");
        assert_eq!(2024, clock.current_year());
    }

    #[tokio::test]
    async fn test_should_report_system_year() {
        let year = Utc::now().year();
        let reported = SystemClock.current_year();
        // tolerate a new-year rollover between the two reads
        assert!(reported == year || reported == year + 1);
    }
}
