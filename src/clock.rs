use chrono::{Local, NaiveDateTime};

/// Source of the generation time that is written into MOD_PAR
pub(crate) trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// local wall-clock time
pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// always returns the same point in time, so that the generated output is reproducible
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedClock(pub(crate) NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
pub(crate) fn test_clock() -> FixedClock {
    let timestamp = chrono::NaiveDate::from_ymd_opt(2024, 5, 17)
        .and_then(|date| date.and_hms_opt(8, 30, 0))
        .unwrap();
    FixedClock(timestamp)
}
