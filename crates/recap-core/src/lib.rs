//! # recap-core
//!
//! Core types, traits, configuration, and error handling for the Recap bot.

pub mod config;
pub mod error;
pub mod message;
pub mod profanity;
pub mod traits;
