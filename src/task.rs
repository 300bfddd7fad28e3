use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Opaque task identifier, stable across recomputation.
///
/// Deserializes from either a JSON string or an integer so that networks
/// exported with numeric ids load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "RawTaskId")]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for TaskId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Serialize for TaskId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTaskId {
    Text(String),
    Integer(i64),
}

impl From<RawTaskId> for TaskId {
    fn from(raw: RawTaskId) -> Self {
        match raw {
            RawTaskId::Text(text) => Self(text),
            RawTaskId::Integer(value) => Self(value.to_string()),
        }
    }
}

/// Precedence relationship between a predecessor and its successor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyType {
    #[default]
    #[serde(rename = "FS")]
    FinishToStart,
    #[serde(rename = "SS")]
    StartToStart,
    #[serde(rename = "FF")]
    FinishToFinish,
    #[serde(rename = "SF")]
    StartToFinish,
}

impl DependencyType {
    pub const ALL: [DependencyType; 4] = [
        DependencyType::FinishToStart,
        DependencyType::StartToStart,
        DependencyType::FinishToFinish,
        DependencyType::StartToFinish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyType::FinishToStart => "FS",
            DependencyType::StartToStart => "SS",
            DependencyType::FinishToFinish => "FF",
            DependencyType::StartToFinish => "SF",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyType {
    type Err = ParseDependencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FS" => Ok(DependencyType::FinishToStart),
            "SS" => Ok(DependencyType::StartToStart),
            "FF" => Ok(DependencyType::FinishToFinish),
            "SF" => Ok(DependencyType::StartToFinish),
            other => Err(ParseDependencyError::UnknownType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDependencyError {
    #[error("dependency is missing a predecessor id")]
    MissingPredecessor,
    #[error("unknown dependency type '{0}' (expected FS, SS, FF or SF)")]
    UnknownType(String),
    #[error("invalid lag '{0}'")]
    InvalidLag(String),
    #[error("unterminated quoted predecessor id")]
    UnterminatedQuote,
    #[error("unexpected text '{0}' after quoted predecessor id")]
    TrailingText(String),
}

/// A typed precedence constraint pointing at the predecessor task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub predecessor_id: TaskId,
    #[serde(rename = "type", default)]
    pub dependency_type: DependencyType,
    #[serde(default)]
    pub lag: i64,
}

impl DependencyEdge {
    pub fn new(predecessor_id: impl Into<TaskId>, dependency_type: DependencyType, lag: i64) -> Self {
        Self {
            predecessor_id: predecessor_id.into(),
            dependency_type,
            lag,
        }
    }

    pub fn finish_to_start(predecessor_id: impl Into<TaskId>) -> Self {
        Self::new(predecessor_id, DependencyType::FinishToStart, 0)
    }

    /// Parses a `;`-separated list in compact notation. Separators inside a
    /// quoted id do not split.
    pub fn parse_list(input: &str) -> Result<Vec<Self>, ParseDependencyError> {
        split_unquoted(input, ';')
            .into_iter()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect()
    }

    pub fn format_list(edges: &[Self]) -> String {
        edges
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Compact notation: `<predecessor_id>[:<TYPE>[(+|-)<lag>]]`, e.g. `pour:SS+2`.
///
/// Ids containing `:`, `;` or `"`, or with surrounding whitespace, are written
/// in double quotes with `""` standing for a literal quote: `"zone:1":SS+2`.
impl FromStr for DependencyEdge {
    type Err = ParseDependencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (id, spec) = match s.strip_prefix('"') {
            Some(quoted) => {
                let (id, rest) = unquote(quoted)?;
                let rest = rest.trim();
                let spec = if rest.is_empty() {
                    None
                } else {
                    let spec = rest
                        .strip_prefix(':')
                        .ok_or_else(|| ParseDependencyError::TrailingText(rest.to_string()))?;
                    Some(spec.trim())
                };
                (id, spec)
            }
            None => match s.rsplit_once(':') {
                Some((id, spec)) => (id.trim().to_string(), Some(spec.trim())),
                None => (s.to_string(), None),
            },
        };
        if id.is_empty() {
            return Err(ParseDependencyError::MissingPredecessor);
        }

        let Some(spec) = spec else {
            return Ok(Self::finish_to_start(id));
        };
        let split = spec
            .char_indices()
            .find(|(_, c)| *c == '+' || *c == '-')
            .map(|(idx, _)| idx)
            .unwrap_or(spec.len());
        let (code, lag) = spec.split_at(split);
        let dependency_type = code.parse::<DependencyType>()?;
        let lag = if lag.is_empty() {
            0
        } else {
            lag.trim_start_matches('+')
                .parse::<i64>()
                .map_err(|_| ParseDependencyError::InvalidLag(lag.to_string()))?
        };
        Ok(Self::new(id, dependency_type, lag))
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.predecessor_id.as_str();
        if needs_quoting(id) {
            write!(f, "\"{}\"", id.replace('"', "\"\""))?;
        } else {
            f.write_str(id)?;
        }
        if self.dependency_type == DependencyType::FinishToStart && self.lag == 0 {
            return Ok(());
        }
        write!(f, ":{}", self.dependency_type)?;
        if self.lag != 0 {
            write!(f, "{:+}", self.lag)?;
        }
        Ok(())
    }
}

fn needs_quoting(id: &str) -> bool {
    id.trim() != id || id.contains([':', ';', '"'])
}

/// Reads a quoted id up to its closing quote. `input` starts just after the
/// opening quote; returns the id and whatever follows the closing quote.
fn unquote(input: &str) -> Result<(String, &str), ParseDependencyError> {
    let mut id = String::new();
    let mut chars = input.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if c != '"' {
            id.push(c);
            continue;
        }
        if matches!(chars.peek(), Some((_, '"'))) {
            chars.next();
            id.push('"');
        } else {
            return Ok((id, &input[idx + 1..]));
        }
    }
    Err(ParseDependencyError::UnterminatedQuote)
}

fn split_unquoted(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    for (idx, c) in input.char_indices() {
        if c == '"' {
            quoted = !quoted;
        } else if c == separator && !quoted {
            parts.push(&input[start..idx]);
            start = idx + c.len_utf8();
        }
    }
    parts.push(&input[start..]);
    parts
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub duration: i64,
    #[serde(default)]
    pub predecessors: Vec<DependencyEdge>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, duration: i64) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            duration,
            predecessors: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_predecessor(mut self, edge: DependencyEdge) -> Self {
        self.predecessors.push(edge);
        self
    }

    /// Shorthand for a zero-lag finish-to-start predecessor.
    pub fn after(self, predecessor_id: impl Into<TaskId>) -> Self {
        self.with_predecessor(DependencyEdge::finish_to_start(predecessor_id))
    }
}
