use std::convert::TryFrom;
use std::fmt;

use time::{Date, Month};

use crate::errors::BackendError;

/// The earliest year a recording can be dated.
pub const MIN_YEAR: i32 = 2000;

/// The latest year a recording can be dated.
pub const MAX_YEAR: i32 = 2050;

/// The calendar date a recording was made. The date is the
/// recording's identity within a word.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RecordingDate {
    year: i32,
    month: u8,
    day: u8,
}

impl RecordingDate {
    /// Creates a date after checking that it exists on the calendar
    /// and that the year falls within [`MIN_YEAR`]..=[`MAX_YEAR`].
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self, BackendError> {
        let invalid = || BackendError::InvalidDate { year, month, day };

        if year < MIN_YEAR || year > MAX_YEAR {
            return Err(invalid());
        }

        let calendar_month = Month::try_from(month).map_err(|_| invalid())?;
        Date::from_calendar_date(year, calendar_month, day).map_err(|_| invalid())?;

        Ok(RecordingDate { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }
}

impl fmt::Display for RecordingDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// One audio artifact for a word, keyed by calendar date. The
/// filename is a storage key relative to the word's audio directory,
/// never a full path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Recording {
    date: RecordingDate,
    filename: String,
}

impl Recording {
    pub fn new(date: RecordingDate, filename: impl Into<String>) -> Self {
        Recording {
            date,
            filename: filename.into(),
        }
    }

    pub fn date(&self) -> RecordingDate {
        self.date
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}
