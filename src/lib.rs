//! Repartee is a line-oriented terminal chat client for Responses-style
//! text-generation APIs.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns conversation state (the ordered threads of messages and
//!   the active-thread pointer) and the single-flight request lifecycle that
//!   talks to the remote endpoint.
//! - [`api`] defines the wire payloads and the rules for extracting a reply
//!   from a response body.
//! - [`cli`] parses arguments and runs the interactive chat loop plus the
//!   one-shot `say` command.
//! - [`utils`] carries shared helpers: URL joining, unique id generation,
//!   and transcript logging.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod utils;
