pub mod cycle;
pub mod plan;
pub mod schedule_dag;

pub use cycle::{detect_cycle, topological_order};
pub use plan::ExecutionPlan;
pub use schedule_dag::{DependencyLink, ScheduleDag, UnresolvedReference};
