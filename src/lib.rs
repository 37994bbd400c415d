//! valocache library
//!
//! Fetches Valorant player data from the HenrikDev API through a rate-limited
//! client and keeps it in an on-disk cache keyed by `Name#Tag`.

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
