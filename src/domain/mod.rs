//! # Domain Model
//!
//! Core types shared by discovery and the plugin runtime.
//!
//! ## Key Types
//!
//! - [`Project`] - A discovered project or group
//! - [`Depth`] - Nesting level in a scan result (0 or 1)
//! - [`PluginProject`] - Project view sent to plugins
//! - [`Action`] / [`ActionResult`] - Plugin-contributed actions

mod action;
mod project;

pub use action::{Action, ActionResult, LanguageRule, PluginProject};
pub use project::{ContainerInfo, Depth, Project, VcsStatus, UNKNOWN_LANGUAGE};
