//! Script tree generation.
//!
//! [`ScriptBuilder`] produces the default task tree for a package, splices
//! in the user's lifecycle hooks and merges the user's own tree on top.
//! [`lookup`] and [`list_tasks`] read the rendered result the way the task
//! runner does.

mod builder;
mod file;
mod tree;

pub use builder::{
    build, Hooks, ScriptBuilder, ScriptContext, UserCallable, UserInput, DEFAULT_LOG_LEVEL, HOOKS,
};
pub use file::read_user_scripts;
pub use tree::{list_tasks, lookup, ResolvedTask, ScriptTree, TaskDescriptor, TaskRow, DEFAULT_TASK};
