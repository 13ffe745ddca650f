//! Agent Composer - author automation agents as raw JSON or step by step
//!
//! The editor core ([`editor`], [`actions`]) is synchronous and has no terminal
//! or network dependencies. [`ui`], [`app`] and [`submit`] are the collaborators
//! the `composer` binary wires around it.

pub mod actions;
pub mod app;
pub mod config;
pub mod editor;
pub mod locale;
pub mod logging;
pub mod submit;
pub mod ui;
