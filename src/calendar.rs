use crate::persistence::{PersistenceError, PersistenceResult};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::ops::{Bound, RangeBounds};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("work calendar requires at least one working day")]
    NoWorkingDays,
    #[error("working-day offset {offset} from {epoch} falls outside the supported date range")]
    OutOfRange { epoch: NaiveDate, offset: i64 },
}

/// Working-day calendar used to project integer offsets onto dates.
///
/// The schedule itself is computed in abstract time units; this type only
/// matters to the layers that print or export dates.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkCalendar {
    holidays: HashSet<NaiveDate>,
    non_working_days: HashSet<Weekday>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCalendarConfig {
    working_days: Vec<Weekday>,
    #[serde(default)]
    holidays: Vec<NaiveDate>,
}

impl Default for WorkCalendar {
    /// Monday to Friday, no holidays.
    fn default() -> Self {
        Self {
            holidays: HashSet::new(),
            non_working_days: HashSet::from([Weekday::Sat, Weekday::Sun]),
        }
    }
}

impl WorkCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Every day is a working day; offsets map onto consecutive dates.
    pub fn continuous() -> Self {
        Self {
            holidays: HashSet::new(),
            non_working_days: HashSet::new(),
        }
    }

    pub fn custom<I, J>(working_days: I, holidays: J) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        let config = WorkCalendarConfig::new(working_days, holidays);
        Self::from_config(&config)
    }

    pub fn from_config(config: &WorkCalendarConfig) -> Result<Self, CalendarError> {
        let working_set: HashSet<Weekday> = config.working_days.iter().copied().collect();
        if working_set.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        let non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !working_set.contains(day))
            .collect();

        Ok(Self {
            holidays: config.holidays.iter().copied().collect(),
            non_working_days,
        })
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> PersistenceResult<Self> {
        let file = File::open(path)?;
        let config: WorkCalendarConfig = serde_json::from_reader(file)?;
        Self::from_config(&config).map_err(|err| PersistenceError::InvalidData(err.to_string()))
    }

    pub fn to_config(&self) -> WorkCalendarConfig {
        WorkCalendarConfig::from(self)
    }

    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    /// Check if a date is available for scheduling
    pub fn is_available(&self, date: NaiveDate) -> bool {
        !self.holidays.contains(&date) && !self.non_working_days.contains(&date.weekday())
    }

    /// First available date on or after `date`, or `None` past the end of
    /// the supported date range.
    pub fn first_available_from(&self, date: NaiveDate) -> Option<NaiveDate> {
        let mut current = date;
        while !self.is_available(current) {
            current = current.succ_opt()?;
        }
        Some(current)
    }

    pub fn next_available(&self, from: NaiveDate) -> Option<NaiveDate> {
        self.first_available_from(from.succ_opt()?)
    }

    pub fn prev_available(&self, from: NaiveDate) -> Option<NaiveDate> {
        let mut current = from.pred_opt()?;
        while !self.is_available(current) {
            current = current.pred_opt()?;
        }
        Some(current)
    }

    fn working_days_per_week(&self) -> i64 {
        7 - self.non_working_days.len() as i64
    }

    /// Holidays inside `range` that fall on a working weekday.
    fn holidays_within(&self, range: impl RangeBounds<NaiveDate>) -> i64 {
        self.holidays
            .iter()
            .filter(|day| range.contains(*day) && !self.non_working_days.contains(&day.weekday()))
            .count() as i64
    }

    /// Date of working-day `offset` counted from `epoch`. Offset 0 is the first
    /// working day on or after the epoch; negative offsets walk backwards.
    ///
    /// Whole weeks are skipped in one step, so the cost grows with the number
    /// of holidays crossed rather than with the offset.
    pub fn offset_to_date(&self, epoch: NaiveDate, offset: i64) -> Result<NaiveDate, CalendarError> {
        let out_of_range = || CalendarError::OutOfRange { epoch, offset };
        let per_week = self.working_days_per_week();
        if per_week == 0 {
            return Err(CalendarError::NoWorkingDays);
        }

        let mut current = self.first_available_from(epoch).ok_or_else(out_of_range)?;
        let mut remaining = offset.unsigned_abs();
        let per_week = per_week as u64;
        while remaining > 0 {
            if remaining >= per_week {
                let weeks = remaining / per_week;
                let span = weeks.checked_mul(7).map(Days::new).ok_or_else(out_of_range)?;
                // `current` keeps its weekday, and every working day in the
                // skipped span counts except working-weekday holidays.
                let (target, holidays) = if offset > 0 {
                    let target = current.checked_add_days(span).ok_or_else(out_of_range)?;
                    let crossed = (Bound::Excluded(current), Bound::Included(target));
                    (target, self.holidays_within(crossed))
                } else {
                    let target = current.checked_sub_days(span).ok_or_else(out_of_range)?;
                    (target, self.holidays_within(target..current))
                };
                remaining = remaining - weeks * per_week + holidays as u64;
                current = target;
            } else {
                current = if offset > 0 {
                    self.next_available(current)
                } else {
                    self.prev_available(current)
                }
                .ok_or_else(out_of_range)?;
                remaining -= 1;
            }
        }
        Ok(current)
    }

    /// Last working day a task occupies. Finish offsets are exclusive, so a
    /// task with a positive duration ends the day before its finish offset;
    /// a milestone sits on its start day.
    pub fn finish_date(
        &self,
        epoch: NaiveDate,
        start: i64,
        finish: i64,
    ) -> Result<NaiveDate, CalendarError> {
        if finish > start {
            self.offset_to_date(epoch, finish - 1)
        } else {
            self.offset_to_date(epoch, finish)
        }
    }

    /// Count available days in a date range
    pub fn count_available_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        start
            .iter_days()
            .take_while(|day| *day <= end)
            .filter(|day| self.is_available(*day))
            .count() as i64
    }
}

impl WorkCalendarConfig {
    pub fn new<I, J>(working_days: I, holidays: J) -> Self
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = NaiveDate>,
    {
        let mut working: Vec<Weekday> = working_days.into_iter().collect();
        working.sort_by_key(|wd| wd.num_days_from_monday());
        working.dedup();

        let mut holidays: Vec<NaiveDate> = holidays.into_iter().collect();
        holidays.sort();
        holidays.dedup();

        Self {
            working_days: working,
            holidays,
        }
    }

    pub fn working_days(&self) -> &[Weekday] {
        &self.working_days
    }

    pub fn holidays(&self) -> &[NaiveDate] {
        &self.holidays
    }
}

impl Default for WorkCalendarConfig {
    fn default() -> Self {
        WorkCalendarConfig::from(&WorkCalendar::default())
    }
}

impl From<&WorkCalendar> for WorkCalendarConfig {
    fn from(calendar: &WorkCalendar) -> Self {
        let working = WorkCalendar::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !calendar.non_working_days.contains(day))
            .collect();

        let mut holidays: Vec<NaiveDate> = calendar.holidays.iter().copied().collect();
        holidays.sort();

        Self {
            working_days: working,
            holidays,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn empty_working_week_is_rejected() {
        let err = WorkCalendar::custom(Vec::new(), Vec::new()).unwrap_err();
        assert_eq!(err, CalendarError::NoWorkingDays);
    }

    #[test]
    fn config_round_trip_keeps_weekdays_sorted() {
        let calendar =
            WorkCalendar::custom([Weekday::Sat, Weekday::Mon, Weekday::Mon], [d(2025, 1, 6)]).unwrap();
        let config = calendar.to_config();
        assert_eq!(config.working_days(), &[Weekday::Mon, Weekday::Sat]);
        assert_eq!(config.holidays(), &[d(2025, 1, 6)]);
        assert_eq!(WorkCalendar::from_config(&config).unwrap(), calendar);
    }
}
