//! Thin client for a hosted mail-cleanup script: Google sign-in, duplicate
//! removal and mass unsubscribe.

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod flow;
pub mod remote;
pub mod selection;
pub mod terminal;
