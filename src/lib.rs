//! healthwire: a terminal health-news reader.
//!
//! Articles come from a bundled dataset; summaries, friendly rewrites,
//! health tips and sentiment labels come from Gemini and are cached in a
//! local SQLite key-value store together with the user's saved articles,
//! comments, reactions and settings.

pub mod ai;
pub mod app;
pub mod commands;
pub mod config;
pub mod news;
pub mod storage;
pub mod util;
