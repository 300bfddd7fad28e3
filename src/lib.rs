pub mod calculations;
pub mod calendar;
pub mod config;
#[cfg(feature = "dataframe")]
pub mod dataframe;
pub mod error;
pub mod graph;
#[cfg(feature = "http_api")]
pub mod http_api;
#[cfg(any(feature = "cli", feature = "http_api"))]
pub mod logging;
pub mod network;
pub mod persistence;
pub mod report;
pub mod schedule;
pub mod task;
mod task_validation;

pub use calendar::{CalendarError, WorkCalendar, WorkCalendarConfig};
pub use config::{ScheduleConfig, UnresolvedPredecessorPolicy};
pub use error::{ScheduleError, ScheduleResult};
pub use graph::{UnresolvedReference, detect_cycle};
pub use network::TaskNetwork;
pub use persistence::{
    PersistenceError, PersistenceResult, load_network_from_csv, load_network_from_json,
    save_network_to_json, save_snapshot_to_csv, save_snapshot_to_json,
};
pub use schedule::{CriticalEdge, ScheduleSnapshot, ScheduleSummary, TaskSchedule, compute_schedule};
pub use task::{DependencyEdge, DependencyType, ParseDependencyError, Task, TaskId};
