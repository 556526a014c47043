//! The month a calendar displays

use std::fmt::{Display, Formatter};

use chrono::{Datelike, Local, NaiveDate};

/// A direction to navigate in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Previous,
    Next,
}

impl Step {
    pub fn delta(self) -> i32 {
        match self {
            Step::Previous => -1,
            Step::Next => 1,
        }
    }
}


/// A (year, month) pair.
///
/// It is always built from the first day of the month, so that moving from a 31-day month never skips a shorter month.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DisplayedMonth {
    first_day: NaiveDate,
}

impl DisplayedMonth {
    /// Returns `None` for a month outside `1..=12`, or a year chrono cannot represent
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    /// The month that contains the given date
    pub fn containing(date: NaiveDate) -> Self {
        Self { first_day: date.with_day(1).unwrap_or(date) }
    }

    /// The month we currently are in, in local time
    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn year(&self) -> i32           { self.first_day.year() }
    /// 1 for January
    pub fn month(&self) -> u32          { self.first_day.month() }
    pub fn first_day(&self) -> NaiveDate { self.first_day }

    pub fn last_day(&self) -> NaiveDate {
        self.day(self.days_in_month()).unwrap_or(self.first_day)
    }

    pub fn days_in_month(&self) -> u32 {
        (28..=31).rev()
            .find(|day| self.day(*day).is_some())
            .unwrap_or(28)
    }

    /// The given day of this month, if it exists
    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year(), self.month(), day)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// Move by `months` months, wrapping the year as needed
    pub fn shifted(&self, months: i32) -> Option<Self> {
        let index = self.year() as i64 * 12 + self.month0() as i64 + months as i64;
        let year = i32::try_from(index.div_euclid(12)).ok()?;
        let month = index.rem_euclid(12) as u32 + 1;
        Self::new(year, month)
    }

    pub fn step(&self, step: Step) -> Option<Self> {
        self.shifted(step.delta())
    }

    fn month0(&self) -> u32 {
        self.first_day.month0()
    }
}

impl Display for DisplayedMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.first_day.format("%B %Y"))
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn navigation_wraps_the_year() {
        let december = DisplayedMonth::new(2023, 12).unwrap();
        let january = december.step(Step::Next).unwrap();
        assert_eq!((january.year(), january.month()), (2024, 1));
        assert_eq!(january.step(Step::Previous), Some(december));

        let march = DisplayedMonth::new(2024, 3).unwrap();
        assert_eq!(march.shifted(-15), DisplayedMonth::new(2022, 12));
        assert_eq!(march.shifted(22), DisplayedMonth::new(2026, 1));
    }

    #[test]
    fn moving_from_a_long_month_does_not_skip_a_short_one() {
        let january = DisplayedMonth::containing(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        let next = january.step(Step::Next).unwrap();
        assert_eq!((next.year(), next.month()), (2024, 2));
    }

    #[test]
    fn there_and_back_again() {
        for year in [1999, 2000, 2023, 2024] {
            for month in 1..=12 {
                let start = DisplayedMonth::new(year, month).unwrap();
                let back = start.step(Step::Next).and_then(|m| m.step(Step::Previous));
                assert_eq!(back, Some(start));
            }
        }
    }

    #[test]
    fn month_lengths() {
        assert_eq!(DisplayedMonth::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(DisplayedMonth::new(2023, 2).unwrap().days_in_month(), 28);
        assert_eq!(DisplayedMonth::new(2024, 4).unwrap().days_in_month(), 30);
        assert_eq!(DisplayedMonth::new(2024, 12).unwrap().last_day(), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(DisplayedMonth::new(2024, 13), None);
        assert_eq!(DisplayedMonth::new(2024, 4).unwrap().day(31), None);
    }

    #[test]
    fn display() {
        assert_eq!(DisplayedMonth::new(2024, 3).unwrap().to_string(), "March 2024");
    }
}
