//! Build and packaging helpers for a desktop application that ships a
//! Node.js service.
//!
//! Invoked from the build system as small subcommands: mirror a source tree,
//! stage the service for an offline dependency install, fetch the artifacts
//! listed in a dependency manifest, and run the post-install hooks.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: build environment, install layout, manifest and lock-file parsing
//! - **[`resources`]**: idempotent `check + apply` primitives (files, directories, links, artifacts)
//! - **[`tasks`]**: named, ordered units of work wired to resources
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod fetch;
pub mod logging;
pub mod resources;
pub mod sync;
pub mod tasks;
