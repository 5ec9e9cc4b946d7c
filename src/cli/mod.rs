//! # Command-Line Interface
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `init`, `set-path`, `config` | Manage the config file |
//! | `list` | Scan, sort and filter projects |
//! | `jump` | Resolve a project name to its path |
//! | `actions`, `run` | Plugin actions for a project |
//! | `plugin list` | Show loaded plugins |
//!
//! All commands accept `--format text|json`, `--verbose` and `--config`.
//!
//! `jump` writes the path to the file named by `PROJ_CD_FILE` when set, so a
//! shell wrapper can `cd` into it:
//! ```bash
//! p() { f=$(mktemp); PROJ_CD_FILE=$f proj jump "$@" && cd "$(cat $f)"; rm -f $f; }
//! ```
//!
//! Logging is controlled by `PROJ_LOG` (an `EnvFilter` directive).

mod app;
mod config_cmd;
mod list;
mod output;
mod plugin_cmd;
mod session;

pub use app::{run, Cli, Commands, LOG_ENV};
pub use list::CD_FILE_ENV;
pub use output::{Output, OutputFormat};
pub use session::Session;
