pub mod compose;
pub mod config;
pub mod error;
pub mod log;
pub mod merge;
pub mod resolver;
pub mod scripts;

pub use config::{Config, Paths};
pub use error::{Error, Result};
pub use resolver::{BinResolver, NAMESPACE};
pub use scripts::{build, ScriptBuilder, ScriptContext, UserInput};
