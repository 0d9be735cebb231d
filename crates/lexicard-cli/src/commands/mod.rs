pub mod config;
pub mod enrich;
pub mod entries;
pub mod files;
pub mod ingest;
pub mod push;
pub mod watch;
