//! Huddle is a terminal client for a conversational AI coaching service.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the session store, the conversation controller, OAuth
//!   callback handling, token storage, configuration and debug utilities.
//! - [`api`] defines the [`api::CoachApi`] seam and its reqwest-backed
//!   implementation.
//! - [`ui`] renders the chat screen and its controls (message input, edit
//!   draft modal, temperature slider, debug panel) and runs the event loop.
//! - [`utils`] holds logging setup and small helpers.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which prepares config, logging and token
//! storage before dispatching into [`ui::chat_loop`] for interactive sessions.

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
