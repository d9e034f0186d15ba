//! chatline is a terminal client for a session-based chat backend.
//!
//! The crate is organized in a few collaborating layers:
//! - [`api`] defines the wire types, the [`api::ChatBackend`] seam, and the
//!   HTTP gateway that implements it.
//! - [`core`] owns client-visible chat state ([`core::controller`]), the
//!   liveness poll ([`core::health`]) and configuration ([`core::config`]).
//! - [`ui`] renders the terminal interface and runs the interactive event loop.
//! - [`cli`] parses arguments and runs one-shot subcommands.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
