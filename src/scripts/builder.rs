//! Default task tree construction.

use serde_json::{json, Map, Value};

use crate::compose::{self, Concurrent, Series, Step};
use crate::config::{Config, Paths};
use crate::merge::deep_merge;
use crate::resolver::BinResolver;
use crate::scripts::tree::{ScriptTree, TaskDescriptor};
use crate::{ulog_debug, ulog_trace, ulog_warn, Result};

/// Lifecycle hooks recognised at the root of the user's `scripts`.
pub const HOOKS: [&str; 4] = ["prebuild", "postbuild", "prebump", "postbump"];

/// Runner verbosity placed in the generated `options` block.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

const ESLINT_FORMATTER: &str = "node_modules/eslint-codeframe-formatter";

/// A user function producing the user tree from the composition context.
pub type UserCallable<'a> = Box<dyn FnOnce(&ScriptContext<'_>) -> Result<Value> + 'a>;

/// What the package author supplied.
#[derive(Default)]
pub enum UserInput<'a> {
    Callable(UserCallable<'a>),
    Tree(Value),
    #[default]
    None,
}

impl<'a> UserInput<'a> {
    pub fn callable<F>(f: F) -> Self
    where
        F: FnOnce(&ScriptContext<'_>) -> Result<Value> + 'a,
    {
        UserInput::Callable(Box::new(f))
    }
}

impl From<Value> for UserInput<'_> {
    fn from(value: Value) -> Self {
        UserInput::Tree(value)
    }
}

impl From<Option<Value>> for UserInput<'_> {
    fn from(value: Option<Value>) -> Self {
        value.map_or(UserInput::None, UserInput::Tree)
    }
}

/// Handed to user callables: composition helpers plus binary resolution.
#[derive(Debug, Clone, Copy)]
pub struct ScriptContext<'a> {
    resolver: &'a BinResolver,
}

impl<'a> ScriptContext<'a> {
    pub fn new(resolver: &'a BinResolver) -> Self {
        Self { resolver }
    }

    /// Resolve a tool name for the current package.
    pub fn bin(&self, tool: &str) -> String {
        self.resolver.resolve(tool)
    }

    pub fn resolver(&self) -> &BinResolver {
        self.resolver
    }

    pub fn series<I, S>(&self, steps: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: Into<Step>,
    {
        compose::series(steps)
    }

    pub fn concurrent<I, L, S>(&self, steps: I) -> String
    where
        I: IntoIterator<Item = (L, S)>,
        L: Into<String>,
        S: Into<Step>,
    {
        compose::concurrent(steps)
    }

    pub fn nps(&self, task: &str) -> String {
        compose::nps(task)
    }

    pub fn rimraf(&self, path: &str) -> String {
        compose::rimraf(path)
    }

    pub fn mkdirp(&self, path: &str) -> String {
        compose::mkdirp(path)
    }

    pub fn copy(&self, sources: &[&str], dest: &str) -> String {
        compose::copy(sources, dest)
    }

    pub fn cross_env(&self, command: &str) -> String {
        compose::cross_env(command)
    }

    pub fn series_nps(&self, tasks: &[&str]) -> String {
        compose::series_nps(tasks)
    }

    pub fn concurrent_nps(&self, tasks: &[&str]) -> String {
        compose::concurrent_nps(tasks)
    }
}

/// Which lifecycle hooks the user defined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hooks {
    pub prebuild: bool,
    pub postbuild: bool,
    pub prebump: bool,
    pub postbump: bool,
}

impl Hooks {
    /// Inspect the root of the user's `scripts`; nested tasks never count.
    ///
    /// `null`, `false`, `0` and `""` leave a hook undefined.
    pub fn detect(user: &Value) -> Self {
        let defined = |name: &str| {
            user.get("scripts")
                .and_then(|scripts| scripts.get(name))
                .is_some_and(|value| match value {
                    Value::Null | Value::Bool(false) => false,
                    Value::Number(n) => n.as_f64() != Some(0.0),
                    Value::String(s) => !s.is_empty(),
                    _ => true,
                })
        };
        Self {
            prebuild: defined("prebuild"),
            postbuild: defined("postbuild"),
            prebump: defined("prebump"),
            postbump: defined("postbump"),
        }
    }

    /// Names of the hooks that are defined, in [`HOOKS`] order.
    pub fn defined(&self) -> Vec<&'static str> {
        let flags = [self.prebuild, self.postbuild, self.prebump, self.postbump];
        HOOKS
            .iter()
            .zip(flags)
            .filter_map(|(name, on)| on.then_some(*name))
            .collect()
    }

    fn step(defined: bool, name: &str) -> Option<Step> {
        defined.then(|| Step::task(name))
    }
}

/// Builds the default tree for one package layout.
#[derive(Debug, Clone, Default)]
pub struct ScriptBuilder {
    resolver: BinResolver,
    paths: Paths,
}

impl ScriptBuilder {
    pub fn new(resolver: BinResolver, paths: Paths) -> Self {
        Self { resolver, paths }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(BinResolver::new(config.self_build), config.paths.clone())
    }

    pub fn resolver(&self) -> &BinResolver {
        &self.resolver
    }

    /// Render `{ scripts, options }` with the user's input merged on top.
    ///
    /// Errors come only from a user callable and are returned untouched.
    pub fn build(&self, input: UserInput<'_>) -> Result<Value> {
        let user = self.normalize(input)?;
        let hooks = Hooks::detect(&user);
        ulog_debug!("Detected hooks: {:?}", hooks.defined());

        let generated = json!({
            "scripts": self.default_scripts(&hooks).to_value(),
            "options": { "logLevel": DEFAULT_LOG_LEVEL }
        });
        Ok(deep_merge(generated, user))
    }

    fn normalize(&self, input: UserInput<'_>) -> Result<Value> {
        let value = match input {
            UserInput::Callable(f) => f(&ScriptContext::new(&self.resolver))?,
            UserInput::Tree(value) => value,
            UserInput::None => return Ok(Value::Object(Map::new())),
        };
        if value.is_object() {
            Ok(value)
        } else {
            ulog_warn!("Ignoring user scripts that are not an object: {}", value);
            Ok(Value::Object(Map::new()))
        }
    }

    /// The generated tree before any user overrides.
    pub fn default_scripts(&self, hooks: &Hooks) -> ScriptTree {
        let mut scripts = ScriptTree::new();

        // ----- Misc -----
        scripts.insert(
            "checkDeps",
            TaskDescriptor::script(
                "Check for newer versions of installed dependencies.",
                "npm-check --skip-unused || true",
            ),
        );
        scripts.insert(
            "lint",
            TaskDescriptor::group(
                ScriptTree::new()
                    .with(
                        "default",
                        TaskDescriptor::script("Lint the project.", self.lint()),
                    )
                    .with(
                        "fix",
                        TaskDescriptor::script(
                            "Lint the project and automatically fix all fixable errors.",
                            format!("{} --fix", self.lint()),
                        ),
                    ),
            ),
        );

        // ----- Testing -----
        let jest = self.resolver.resolve("jest");
        scripts.insert(
            "test",
            TaskDescriptor::group(
                ScriptTree::new()
                    .with("default", TaskDescriptor::script("Run unit tests.", jest.as_str()))
                    .with(
                        "watch",
                        TaskDescriptor::script(
                            "Run unit tests in watch mode.",
                            format!("{} --watch", jest),
                        ),
                    )
                    .with(
                        "coverage",
                        TaskDescriptor::script(
                            "Run unit tests and generate a coverage report.",
                            format!("{} --coverage", jest),
                        ),
                    ),
            ),
        );

        // ----- Building -----
        let build = self.build_pipeline(hooks);
        scripts.insert(
            "typeCheck",
            TaskDescriptor::script(
                "Type-check the project.",
                format!("{} --noEmit", self.type_checker()),
            ),
        );
        scripts.insert(
            "build",
            TaskDescriptor::group(
                ScriptTree::new()
                    .with(
                        "default",
                        TaskDescriptor::script("Build the project.", build.render()),
                    )
                    .with(
                        "watch",
                        TaskDescriptor::script(
                            "Continuously build the project.",
                            self.watch_pipeline(hooks).render(),
                        ),
                    ),
            ),
        );

        // ----- Versioning -----
        let release = |flag: Option<&str>| {
            let standard_version = self.resolver.resolve("standard-version");
            let bump = match flag {
                Some(flag) => format!("{} {}", standard_version, flag),
                None => standard_version,
            };
            Series::new()
                .maybe(Hooks::step(hooks.prebump, "prebump"))
                .then(build.clone())
                .then(bump)
                .maybe(Hooks::step(hooks.postbump, "postbump"))
                .render()
        };
        scripts.insert(
            "bump",
            TaskDescriptor::group(
                ScriptTree::new()
                    .with(
                        "default",
                        TaskDescriptor::script(
                            "Generate a change log and tagged commit for a release.",
                            release(None),
                        ),
                    )
                    .with(
                        "beta",
                        TaskDescriptor::script(
                            "Generate a change log and tagged commit for a beta release.",
                            release(Some("--prerelease=beta")),
                        ),
                    )
                    .with(
                        "first",
                        TaskDescriptor::script(
                            "Generate a change log and tagged commit for a project's first release.",
                            release(Some("--first-release")),
                        ),
                    ),
            ),
        );

        // ----- Life cycles -----
        scripts.insert(
            "prepare",
            TaskDescriptor::script(
                "Runs after dependency installation to ensure the package compiles.",
                Series::new()
                    .then(build)
                    .then(format!("{} --passWithNoTests", jest))
                    .render(),
            ),
        );

        for (name, task) in scripts.iter() {
            ulog_trace!("{} -> {:?}", name, task.command());
        }
        scripts
    }

    /// prebuild? -> {lint, transpile, declarations} -> cleanup -> postbuild?
    fn build_pipeline(&self, hooks: &Hooks) -> Series {
        let group = Concurrent::new()
            .with("lint", self.lint())
            .with("babel", self.transpile())
            .with("tsc", format!("{} --emitDeclarationOnly", self.type_checker()));

        Series::new()
            .maybe(Hooks::step(hooks.prebuild, "prebuild"))
            .then(group)
            .then(self.cleanup())
            .maybe(Hooks::step(hooks.postbuild, "postbuild"))
    }

    /// Watch never finishes, so there is no cleanup or postbuild step.
    fn watch_pipeline(&self, hooks: &Hooks) -> Series {
        let group = Concurrent::new()
            .with(
                "tsc",
                format!(
                    "{} --emitDeclarationOnly --preserveWatchOutput --watch",
                    self.type_checker()
                ),
            )
            .with("babel", format!("{} --watch --verbose", self.transpile()));

        Series::new()
            .maybe(Hooks::step(hooks.prebuild, "prebuild"))
            .then(group)
    }

    fn lint(&self) -> String {
        format!(
            "{} {} --ext {} --format={}",
            self.resolver.resolve("eslint"),
            self.paths.src_dir,
            self.paths.lint_extensions().join(","),
            ESLINT_FORMATTER
        )
    }

    fn transpile(&self) -> String {
        [
            format!("{} {}", self.resolver.resolve("babel"), self.paths.src_dir),
            format!("--extensions=\"{}\"", self.paths.extensions.join(",")),
            "--ignore=\"**/*.d.ts\"".to_string(),
            format!("--out-dir=\"{}\"", self.paths.out_dir),
            "--copy-files".to_string(),
            "--source-maps=true".to_string(),
            "--delete-dir-on-start".to_string(),
        ]
        .join(" ")
    }

    fn type_checker(&self) -> String {
        format!("{} --pretty", self.resolver.resolve("ttsc"))
    }

    // The transpiler's ignore option is unreliable with several patterns, so
    // test files are removed from the output afterwards instead.
    fn cleanup(&self) -> String {
        format!(
            "{} \"{out}/**/*.spec.*\" \"{out}/**/*.test.*\"",
            self.resolver.resolve("del"),
            out = self.paths.out_dir
        )
    }
}

/// Build with the downstream resolver and the default layout.
pub fn build(input: UserInput<'_>) -> Result<Value> {
    ScriptBuilder::default().build(input)
}
