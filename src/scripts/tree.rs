//! Task descriptors and task lookup over rendered trees.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Reserved keys of a descriptor object; every other key is a child task.
const DESCRIPTION_KEY: &str = "description";
const SCRIPT_KEY: &str = "script";

/// Child resolved when a group is invoked by its own name.
pub const DEFAULT_TASK: &str = "default";

/// A named unit of work.
///
/// Whether a node is a leaf or a group is fixed when it is built.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskDescriptor {
    /// A single command string.
    Script { description: String, script: String },
    /// Named variants, e.g. `build.default` and `build.watch`.
    Group {
        description: Option<String>,
        tasks: ScriptTree,
    },
}

impl TaskDescriptor {
    pub fn script(description: impl Into<String>, script: impl Into<String>) -> Self {
        TaskDescriptor::Script {
            description: description.into(),
            script: script.into(),
        }
    }

    pub fn group(tasks: ScriptTree) -> Self {
        TaskDescriptor::Group {
            description: None,
            tasks,
        }
    }

    /// Command string of a leaf, or of a group's `default` variant.
    pub fn command(&self) -> Option<&str> {
        match self {
            TaskDescriptor::Script { script, .. } => Some(script),
            TaskDescriptor::Group { tasks, .. } => {
                tasks.get(DEFAULT_TASK).and_then(TaskDescriptor::command)
            }
        }
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        match self {
            TaskDescriptor::Script {
                description,
                script,
            } => {
                map.insert(DESCRIPTION_KEY.to_string(), Value::from(description.as_str()));
                map.insert(SCRIPT_KEY.to_string(), Value::from(script.as_str()));
            }
            TaskDescriptor::Group { description, tasks } => {
                if let Some(description) = description {
                    map.insert(DESCRIPTION_KEY.to_string(), Value::from(description.as_str()));
                }
                for (name, task) in tasks.iter() {
                    map.insert(name.to_string(), task.to_value());
                }
            }
        }
        Value::Object(map)
    }
}

impl Serialize for TaskDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Ordered mapping from task name to descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptTree {
    tasks: Vec<(String, TaskDescriptor)>,
}

impl ScriptTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a task, replacing any existing task of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, task: TaskDescriptor) {
        let name = name.into();
        match self.tasks.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = task,
            None => self.tasks.push((name, task)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, task: TaskDescriptor) -> Self {
        self.insert(name, task);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TaskDescriptor> {
        self.tasks
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, task)| task)
    }

    /// Look up a task by dotted path, e.g. `bump.beta`.
    pub fn get_path(&self, path: &str) -> Option<&TaskDescriptor> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                TaskDescriptor::Group { tasks, .. } => tasks.get(segment)?,
                TaskDescriptor::Script { .. } => return None,
            };
        }
        Some(current)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TaskDescriptor)> {
        self.tasks.iter().map(|(name, task)| (name.as_str(), task))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.tasks
                .iter()
                .map(|(name, task)| (name.clone(), task.to_value()))
                .collect(),
        )
    }
}

impl Serialize for ScriptTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// A task found in a rendered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTask {
    /// Canonical dotted name, with any implied `default` spelled out.
    pub name: String,
    pub description: Option<String>,
    pub script: String,
}

/// Find a task by dotted name in a rendered `scripts` tree.
///
/// A string value is a script, an object with `script` is a leaf, and an
/// object without one resolves to its `default` child.
pub fn lookup(scripts: &Value, name: &str) -> Result<ResolvedTask> {
    let not_found = || Error::TaskNotFound(name.to_string());
    if name.is_empty() {
        return Err(not_found());
    }

    let mut node = scripts;
    let mut path: Vec<&str> = Vec::new();
    for segment in name.split('.') {
        if segment == DESCRIPTION_KEY || segment == SCRIPT_KEY {
            return Err(not_found());
        }
        node = node.get(segment).ok_or_else(not_found)?;
        path.push(segment);
    }

    loop {
        match node {
            Value::String(script) => {
                return Ok(ResolvedTask {
                    name: path.join("."),
                    description: None,
                    script: script.clone(),
                });
            }
            Value::Object(map) => {
                if let Some(script) = map.get(SCRIPT_KEY).and_then(Value::as_str) {
                    return Ok(ResolvedTask {
                        name: path.join("."),
                        description: map
                            .get(DESCRIPTION_KEY)
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        script: script.to_string(),
                    });
                }
                node = map.get(DEFAULT_TASK).ok_or_else(not_found)?;
                path.push(DEFAULT_TASK);
            }
            _ => return Err(not_found()),
        }
    }
}

/// One runnable entry of a rendered tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRow {
    pub name: String,
    pub description: Option<String>,
}

/// Flatten a rendered `scripts` tree into its runnable tasks, in tree order.
pub fn list_tasks(scripts: &Value) -> Vec<TaskRow> {
    let mut rows = Vec::new();
    if let Value::Object(map) = scripts {
        collect_rows(map, "", &mut rows);
    }
    rows
}

fn collect_rows(map: &Map<String, Value>, prefix: &str, rows: &mut Vec<TaskRow>) {
    for (key, value) in map {
        if key == DESCRIPTION_KEY || key == SCRIPT_KEY {
            continue;
        }
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::String(_) => rows.push(TaskRow {
                name,
                description: None,
            }),
            Value::Object(child) => {
                if child.get(SCRIPT_KEY).is_some_and(Value::is_string) {
                    rows.push(TaskRow {
                        name: name.clone(),
                        description: child
                            .get(DESCRIPTION_KEY)
                            .and_then(Value::as_str)
                            .map(str::to_string),
                    });
                }
                collect_rows(child, &name, rows);
            }
            _ => {}
        }
    }
}
