//! # Plugin System
//!
//! Extension runtime for project actions and language detection.
//!
//! ## Overview
//!
//! Plugins are separate executables that speak JSON-RPC 2.0 over
//! stdin/stdout, one JSON object per line. Any language can implement a plugin.
//!
//! ## Plugin Layout
//!
//! ```text
//! <config dir>/plugins/
//! └── example/
//!     ├── plugin.json     # manifest: name, version, executable, capabilities, config
//!     └── example         # the executable named by the manifest
//! ```
//!
//! Only directories listed in `plugins.enabled` are loaded.
//!
//! ## Protocol
//!
//! ```text
//! Host                                   Plugin
//!  │── {"method":"init","params":{"config":{..}},"id":1} ──▶│
//!  │◀─ {"result":{"success":true},"id":1} ──────────────────│
//!  │── {"method":"actions","params":{project},"id":2} ─────▶│
//!  │◀─ {"result":[{"id":"..","label":".."}],"id":2} ────────│
//!  │── {"method":"executeAction","params":{..},"id":3} ────▶│
//!  │── {"method":"shutdown","id":4} ───────────────────────▶│
//! ```
//!
//! `actions` is only called on plugins declaring the `actions` capability,
//! `languages` only on those declaring `languages`.
//!
//! ## Key Types
//!
//! - [`PluginRegistry`] - Loads plugins and dispatches requests
//! - [`PluginManifest`] - Declares plugin metadata and capabilities
//! - [`Transport`] - One JSON-RPC connection to a plugin process

mod manifest;
mod protocol;
mod registry;
mod transport;

pub use manifest::{Capability, CapabilitySet, ManifestError, PluginManifest, MANIFEST_FILE};
pub use protocol::{method, RpcError, RpcRequest, RpcResponse, JSONRPC_VERSION};
pub use registry::{LoadedPlugin, PluginRegistry, RegistryError};
pub use transport::{Transport, TransportError, TransportState};
