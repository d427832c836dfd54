use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::Value;

use unified_scripts::log::LogLevel;
use unified_scripts::scripts::{list_tasks, lookup, read_user_scripts, ScriptBuilder};
use unified_scripts::{ulog, ulog_debug, ulog_error, ulog_warn, Config, Result, UserInput};

/// unified-scripts - generate the package's build and release task tree
#[derive(Parser, Debug)]
#[command(name = "unified-scripts")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    \
    UNIFIED_DEBUG=1         Enable debug logging (alternative to --debug)\n    \
    UNIFIED_SELF_BUILD=1    Render the generator's own scripts (alternative to --self-build)")]
pub struct Cli {
    /// Config file (defaults to ./unified.toml)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// User scripts file (.json or .toml)
    #[arg(short = 's', long, global = true)]
    pub scripts: Option<PathBuf>,

    /// Call tools by their plain names instead of the namespaced aliases
    #[arg(long, global = true)]
    pub self_build: bool,

    /// Enable debug logging (writes to ~/.unified/unified.log)
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the merged task tree as JSON
    Render {
        /// Single-line output
        #[arg(long)]
        compact: bool,
    },

    /// List every runnable task with its description
    List,

    /// Print the command string of a task, e.g. `build.watch`
    Show {
        /// Dotted task name
        task: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    unified_scripts::log::init_with_debug(cli.debug);
    if unified_scripts::log::is_debug() {
        ulog!("unified-scripts starting (debug mode enabled): {:?}", cli.command);
    } else {
        ulog!("unified-scripts starting: {:?}", cli.command);
    }

    let result = run(&cli);
    if let Err(e) = &result {
        ulog_error!("{}", e);
    }
    result
}

fn run(cli: &Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let mut config = Config::load_from(&config_path)?;
    if cli.self_build {
        config.self_build = true;
    }

    let base = config_path.parent().unwrap_or_else(|| Path::new(""));
    let tree = render_tree(&config, base, cli.scripts.as_deref())?;

    match &cli.command {
        Command::Render { compact } => {
            let out = if *compact {
                serde_json::to_string(&tree)?
            } else {
                serde_json::to_string_pretty(&tree)?
            };
            println!("{}", out);
        }
        Command::List => {
            let rows = list_tasks(&tree["scripts"]);
            let width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0);
            for row in rows {
                println!(
                    "{:<width$}  {}",
                    row.name,
                    row.description.as_deref().unwrap_or(""),
                    width = width
                );
            }
        }
        Command::Show { task } => {
            let task = lookup(&tree["scripts"], task)?;
            ulog_debug!("show {} -> {:?}", task.name, task.script);
            println!("{}", task.script);
        }
    }
    Ok(())
}

/// Build the merged tree from the config and the user scripts file, if any.
fn render_tree(config: &Config, base: &Path, scripts_arg: Option<&Path>) -> Result<Value> {
    let scripts_path = match scripts_arg {
        Some(path) => Some(path.to_path_buf()),
        None => config.scripts_path(base),
    };
    let input = match scripts_path {
        Some(path) => UserInput::Tree(read_user_scripts(&path)?),
        None => UserInput::None,
    };

    let tree = ScriptBuilder::from_config(config).build(input)?;

    match tree["options"]["logLevel"].as_str().map(str::parse::<LogLevel>) {
        Some(Ok(level)) => ulog!("Rendered task tree (runner log level {})", level.as_str()),
        Some(Err(e)) => ulog_warn!("Rendered task tree with unrecognised log level: {}", e),
        None => ulog_warn!("Rendered task tree without options.logLevel"),
    }
    Ok(tree)
}
