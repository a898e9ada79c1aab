//! HTTP front end for the `knockout` tournament library.

pub mod api;
pub mod config;
pub mod logging;
