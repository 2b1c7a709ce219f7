//! Portico CMS Kernel Library
//!
//! View helpers (inline-edit permissions, pagination, spam filtering,
//! template responses, cookies) and the front-end routes built on them.
//! The main entry point for running the server is the `portico` binary.

pub mod config;
pub mod cookie;
pub mod error;
pub mod models;
pub mod pager;
pub mod permissions;
pub mod request;
pub mod routes;
pub mod session;
pub mod spam;
pub mod state;
pub mod theme;
