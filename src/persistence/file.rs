use super::{PersistenceError, PersistenceResult};
use crate::network::TaskNetwork;
use crate::schedule::{ScheduleSnapshot, TaskSchedule};
use crate::task::{DependencyEdge, Task};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

/// Parses a network document: either `{"tasks": [...]}` or a bare task array.
pub fn parse_network_json(input: &str) -> PersistenceResult<TaskNetwork> {
    network_from_value(serde_json::from_str(input)?)
}

pub fn read_network_json<R: Read>(reader: R) -> PersistenceResult<TaskNetwork> {
    network_from_value(serde_json::from_reader(reader)?)
}

/// Interprets an already-parsed JSON document as a network.
pub fn network_from_value(value: Value) -> PersistenceResult<TaskNetwork> {
    match value {
        Value::Array(_) => {
            let tasks: Vec<Task> = serde_json::from_value(value)?;
            Ok(TaskNetwork::from_tasks(tasks))
        }
        Value::Object(_) => Ok(serde_json::from_value(value)?),
        other => Err(PersistenceError::InvalidData(format!(
            "expected a task array or an object with a tasks field, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub fn load_network_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<TaskNetwork> {
    let file = File::open(path)?;
    read_network_json(BufReader::new(file))
}

pub fn save_network_to_json<P: AsRef<Path>>(
    network: &TaskNetwork,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, network)?;
    Ok(())
}

#[derive(Default, Serialize, Deserialize)]
struct TaskCsvRecord {
    id: String,
    #[serde(default)]
    name: String,
    duration: i64,
    #[serde(default)]
    predecessors: String,
}

impl From<&Task> for TaskCsvRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            name: task.name.clone(),
            duration: task.duration,
            predecessors: DependencyEdge::format_list(&task.predecessors),
        }
    }
}

impl TaskCsvRecord {
    fn into_task(self, row: usize) -> PersistenceResult<Task> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(PersistenceError::InvalidData(format!(
                "row {row} has an empty task id"
            )));
        }
        let predecessors = DependencyEdge::parse_list(&self.predecessors)
            .map_err(|source| PersistenceError::Dependency { row, source })?;
        let mut task = Task::new(id, self.duration).named(self.name.trim());
        task.predecessors = predecessors;
        Ok(task)
    }
}

/// Reads a network from CSV with the columns `id,name,duration,predecessors`.
/// Rows are numbered from 1, excluding the header.
pub fn read_network_csv<R: Read>(reader: R) -> PersistenceResult<TaskNetwork> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut tasks = Vec::new();
    for (position, record) in reader.deserialize::<TaskCsvRecord>().enumerate() {
        tasks.push(record?.into_task(position + 1)?);
    }
    Ok(TaskNetwork::from_tasks(tasks))
}

pub fn load_network_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<TaskNetwork> {
    let file = File::open(path)?;
    read_network_csv(BufReader::new(file))
}

pub fn save_network_to_csv<P: AsRef<Path>>(
    network: &TaskNetwork,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for task in network.tasks() {
        writer.serialize(TaskCsvRecord::from(task))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_snapshot_json<W: Write>(snapshot: &ScheduleSnapshot, writer: W) -> PersistenceResult<()> {
    serde_json::to_writer_pretty(writer, snapshot)?;
    Ok(())
}

pub fn save_snapshot_to_json<P: AsRef<Path>>(
    snapshot: &ScheduleSnapshot,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    write_snapshot_json(snapshot, file)
}

#[derive(Serialize)]
struct SnapshotCsvRecord<'a> {
    id: &'a str,
    name: &'a str,
    duration: i64,
    early_start: i64,
    early_finish: i64,
    late_start: i64,
    late_finish: i64,
    total_float: i64,
    free_float: i64,
    is_critical: bool,
    is_near_critical: bool,
}

impl<'a> From<&'a TaskSchedule> for SnapshotCsvRecord<'a> {
    fn from(task: &'a TaskSchedule) -> Self {
        Self {
            id: task.id.as_str(),
            name: &task.name,
            duration: task.duration,
            early_start: task.early_start,
            early_finish: task.early_finish,
            late_start: task.late_start,
            late_finish: task.late_finish,
            total_float: task.total_float,
            free_float: task.free_float,
            is_critical: task.is_critical,
            is_near_critical: task.is_near_critical,
        }
    }
}

/// One row per task, in network order.
pub fn write_snapshot_csv<W: Write>(snapshot: &ScheduleSnapshot, writer: W) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for task in snapshot.tasks() {
        writer.serialize(SnapshotCsvRecord::from(task))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_snapshot_to_csv<P: AsRef<Path>>(
    snapshot: &ScheduleSnapshot,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    write_snapshot_csv(snapshot, file)
}
