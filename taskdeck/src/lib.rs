//! `TaskDeck`: personal task tracker library.

pub mod auth;
pub mod config;
pub mod session;
pub mod store;
pub mod tasks;
