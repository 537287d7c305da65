//! Podium: a faculty-review platform.
//!
//! Students rate faculty across four categories, comment, chat behind
//! anonymous handles, and get personalized recommendations and rankings.
//! A background job reconciles faculty against OpenAlex author records and
//! imports their publication titles.

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod logging;
pub mod openalex;
pub mod state;
pub mod web;
