#![cfg_attr(not(test), forbid(unsafe_code))]
#![deny(warnings, clippy::pedantic)]
//! Shared building blocks for the Support Coach client: backend wire models,
//! the resource browser view state, the translation table, and client
//! configuration.

pub mod browser;
pub mod config;
pub mod language;
pub mod models;
