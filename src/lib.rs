//! proj - a project navigator for a directory of code repositories
//!
//! proj scans a projects directory, recognizes project roots by their marker
//! files, enriches them with VCS, language and container metadata, and keeps
//! groups of related projects together when sorting. External plugins add
//! actions and language rules over a JSON-RPC stdio protocol.

pub mod cli;
pub mod discovery;
pub mod domain;
pub mod enrich;
pub mod plugin;
pub mod storage;

pub use discovery::{ScanOptions, Scanner, SortKey};
pub use domain::{Depth, Project};
pub use plugin::PluginRegistry;
pub use storage::Config;
