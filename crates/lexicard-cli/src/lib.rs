//! `lexi` command line front end
//!
//! Wires the SQLite stores, the OpenAI-compatible provider and the AnkiConnect
//! client into the digest pipeline and exposes admin commands over the stores.

pub mod cli;
pub mod commands;
pub mod context;
pub mod output;
