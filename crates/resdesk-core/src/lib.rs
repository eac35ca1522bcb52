//! Core resdesk library (API client, session store, config).

pub mod api;
pub mod config;
pub mod fence;
pub mod logging;
pub mod models;
pub mod report;
pub mod session;
