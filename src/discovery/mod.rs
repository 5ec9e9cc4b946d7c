//! # Project Discovery
//!
//! Finds projects under a root directory and orders them for display.
//!
//! ## Layout Rules
//!
//! ```text
//! ~/code/
//! ├── standalone/   (go.mod)        -> project, depth 0
//! ├── webdev/       (no markers)    -> group, depth 0
//! │   ├── frontend/ (package.json)  -> project, depth 1
//! │   ├── backend/  (go.mod)        -> project, depth 1
//! │   └── notes/    (no markers)    -> dropped
//! └── scratch/      (no markers)    -> dropped
//! ```
//!
//! Only one level below each top-level directory is inspected. A top-level
//! project that also holds child projects is a monorepo: selectable and a
//! container at once.
//!
//! ## Key Types
//!
//! - [`Scanner`] - Walks the root and enriches each project
//! - [`SortKey`] / [`sort`] - Group-aware ordering
//! - [`is_project_root`] - Marker-file classifier

mod classify;
mod filter;
mod scanner;
mod sort;

pub use classify::{is_project_listing, is_project_root, PROJECT_MARKERS};
pub use filter::{filter, find_by_name, selectable};
pub use scanner::{ScanError, ScanOptions, Scanner};
pub use sort::{sort, SortKey};
