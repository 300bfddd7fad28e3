use crate::calendar::CalendarError;
use crate::report::DateProjection;
use crate::schedule::{ScheduleSnapshot, TaskSchedule};
use chrono::NaiveDate;
use polars::df;
use polars::prelude::PlSmallStr;
use polars::prelude::*;

impl ScheduleSnapshot {
    /// Column-per-field view of the snapshot, one row per task in network order.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let tasks = self.tasks();
        let column = |f: fn(&TaskSchedule) -> i64| -> Vec<i64> {
            tasks.iter().map(f).collect()
        };

        df!(
            "id" => tasks.iter().map(|t| t.id.to_string()).collect::<Vec<_>>(),
            "name" => tasks.iter().map(|t| t.name.clone()).collect::<Vec<_>>(),
            "duration" => column(|t| t.duration),
            "early_start" => column(|t| t.early_start),
            "early_finish" => column(|t| t.early_finish),
            "late_start" => column(|t| t.late_start),
            "late_finish" => column(|t| t.late_finish),
            "total_float" => column(|t| t.total_float),
            "free_float" => column(|t| t.free_float),
            "is_critical" => tasks.iter().map(|t| t.is_critical).collect::<Vec<_>>(),
            "is_near_critical" => tasks.iter().map(|t| t.is_near_critical).collect::<Vec<_>>()
        )
    }

    /// Same as [`to_dataframe`](Self::to_dataframe) plus `start_date` and
    /// `finish_date` columns projected through a work calendar. Offsets that
    /// leave the calendar's date range surface as a compute error.
    pub fn to_dataframe_with_dates(&self, projection: DateProjection<'_>) -> PolarsResult<DataFrame> {
        let mut df = self.to_dataframe()?;
        let starts: Vec<NaiveDate> = self
            .tasks()
            .iter()
            .map(|t| projection.start_date(t).map_err(calendar_error))
            .collect::<PolarsResult<_>>()?;
        let finishes: Vec<NaiveDate> = self
            .tasks()
            .iter()
            .map(|t| projection.finish_date(t).map_err(calendar_error))
            .collect::<PolarsResult<_>>()?;
        df.with_column(Series::new(PlSmallStr::from_static("start_date"), starts))?;
        df.with_column(Series::new(PlSmallStr::from_static("finish_date"), finishes))?;
        Ok(df)
    }
}

fn calendar_error(err: CalendarError) -> PolarsError {
    PolarsError::ComputeError(err.to_string().into())
}
