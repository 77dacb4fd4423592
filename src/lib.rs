//! # repetask
//!
//! Task tracking backend with spaced-repetition scheduling.
//!
//! Completing a task moves it to the next stage of an ordered catalog of
//! repetition types, scheduling it again after that stage's interval, until
//! the catalog runs out and the task is completed for good.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod model;
pub mod store;
pub mod telemetry;
