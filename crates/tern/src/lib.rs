//! Support code for the `tern` command-line tool: input handling, logging
//! setup, and building zones and filters from configuration.

pub mod input;
pub mod logging;
pub mod setup;
