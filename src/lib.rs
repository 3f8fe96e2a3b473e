//! Extended M3U playlist parsing and IPTV channel cataloguing.
//!
//! The [`parser`] turns a playlist stream into typed [`models::Track`]s,
//! [`services`] groups them by country and language and caches parsed
//! playlists, and [`web`] exposes both over HTTP.

pub mod config;
pub mod errors;
pub mod models;
pub mod parser;
pub mod services;
pub mod utils;
pub mod web;
