//! Task composition utilities.
//!
//! Steps are described, never run. A [`Series`] renders to a fail-fast
//! `a && b && c` chain; a [`Concurrent`] group renders to a single
//! `concurrently` invocation that fails if any labelled command fails.
//! User callables receive these through [`crate::scripts::ScriptContext`].

/// Task runner used to invoke named tasks from inside a command string.
pub const TASK_RUNNER: &str = "nps";

/// Process launcher used for concurrent groups.
pub const CONCURRENTLY: &str = "concurrently";

const PREFIX_COLORS: [&str; 8] = [
    "bgBlue.bold",
    "bgMagenta.bold",
    "bgGreen.bold",
    "bgBlack.bold",
    "bgCyan.bold",
    "bgRed.bold",
    "bgWhite.bold",
    "bgYellow.bold",
];

/// A single unit in a composed command.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A literal shell command.
    Command(String),
    /// A reference to another task, run through the task runner.
    Task(String),
    Series(Series),
    Concurrent(Concurrent),
}

impl Step {
    pub fn task(name: impl Into<String>) -> Self {
        Step::Task(name.into())
    }

    pub fn render(&self) -> String {
        match self {
            Step::Command(cmd) => cmd.clone(),
            Step::Task(name) => nps(name),
            Step::Series(series) => series.render(),
            Step::Concurrent(group) => group.render(),
        }
    }
}

impl From<String> for Step {
    fn from(cmd: String) -> Self {
        Step::Command(cmd)
    }
}

impl From<&str> for Step {
    fn from(cmd: &str) -> Self {
        Step::Command(cmd.to_string())
    }
}

impl From<Series> for Step {
    fn from(series: Series) -> Self {
        Step::Series(series)
    }
}

impl From<Concurrent> for Step {
    fn from(group: Concurrent) -> Self {
        Step::Concurrent(group)
    }
}

/// Ordered, fail-fast sequence of optional steps.
///
/// Absent (`None`) steps are dropped at render time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    steps: Vec<Option<Step>>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, step: impl Into<Step>) -> Self {
        self.steps.push(Some(step.into()));
        self
    }

    /// Append a step that may be absent.
    pub fn maybe(mut self, step: Option<Step>) -> Self {
        self.steps.push(step);
        self
    }

    /// Steps that will actually be rendered.
    pub fn present(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.render().is_empty()
    }

    /// Steps rendering to nothing (`""`, or nested groups with no present
    /// steps) are dropped along with the absent ones.
    pub fn render(&self) -> String {
        self.present()
            .map(Step::render)
            .filter(|cmd| !cmd.is_empty())
            .collect::<Vec<_>>()
            .join(" && ")
    }
}

/// Labelled commands started together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Concurrent {
    steps: Vec<(String, Step)>,
}

impl Concurrent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, label: impl Into<String>, step: impl Into<Step>) -> Self {
        self.steps.push((label.into(), step.into()));
        self
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|(label, _)| label.as_str())
    }

    /// Labelled steps that render to nothing are skipped; a group with no
    /// commands left renders to `""`.
    pub fn render(&self) -> String {
        let (names, scripts): (Vec<&str>, Vec<String>) = self
            .steps
            .iter()
            .map(|(label, step)| (label.as_str(), step.render()))
            .filter(|(_, cmd)| !cmd.is_empty())
            .map(|(label, cmd)| (label, quote(&cmd)))
            .unzip();
        if scripts.is_empty() {
            return String::new();
        }
        let colors: Vec<&str> = PREFIX_COLORS
            .iter()
            .copied()
            .cycle()
            .take(scripts.len())
            .collect();

        let mut parts = vec![
            CONCURRENTLY.to_string(),
            "--kill-others-on-fail".to_string(),
            format!("--prefix-colors \"{}\"", colors.join(",")),
            "--prefix \"[{name}]\"".to_string(),
            format!("--names \"{}\"", names.join(",")),
        ];
        parts.extend(scripts);
        parts.join(" ")
    }
}

/// Quote a command for use as one argument of another command.
///
/// Plain words pass through; anything else is double-quoted with the
/// characters the shell interprets inside double quotes escaped.
pub fn quote(script: &str) -> String {
    let plain = !script.is_empty()
        && script
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if plain {
        return script.to_string();
    }
    let mut out = String::with_capacity(script.len() + 2);
    out.push('"');
    for c in script.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Command that runs a named task through the task runner.
pub fn nps(task: &str) -> String {
    format!("{} {}", TASK_RUNNER, task)
}

/// Render steps as a fail-fast chain.
pub fn series<I, S>(steps: I) -> String
where
    I: IntoIterator<Item = S>,
    S: Into<Step>,
{
    steps
        .into_iter()
        .fold(Series::new(), |series, step| series.then(step))
        .render()
}

/// Render named tasks as a fail-fast chain of task runner calls.
pub fn series_nps(tasks: &[&str]) -> String {
    series(tasks.iter().map(|t| Step::task(*t)))
}

/// Render labelled steps as one concurrent group.
pub fn concurrent<I, L, S>(steps: I) -> String
where
    I: IntoIterator<Item = (L, S)>,
    L: Into<String>,
    S: Into<Step>,
{
    steps
        .into_iter()
        .fold(Concurrent::new(), |group, (label, step)| group.with(label, step))
        .render()
}

/// Render named tasks as a concurrent group labelled by task name.
pub fn concurrent_nps(tasks: &[&str]) -> String {
    concurrent(tasks.iter().map(|t| (*t, Step::task(*t))))
}

/// Recursively delete a path.
pub fn rimraf(path: &str) -> String {
    format!("rimraf {}", quote(path))
}

/// Create a directory and its parents.
pub fn mkdirp(path: &str) -> String {
    format!("mkdirp {}", quote(path))
}

/// Copy files, `copyfiles`-style: `sources` are globs, `dest` is the target dir.
pub fn copy(sources: &[&str], dest: &str) -> String {
    let mut parts = vec!["copyfiles".to_string()];
    parts.extend(sources.iter().map(|s| quote(s)));
    parts.push(quote(dest));
    parts.join(" ")
}

/// Prefix a command with environment assignments that work on every shell.
pub fn cross_env(command: &str) -> String {
    format!("cross-env {}", command)
}
