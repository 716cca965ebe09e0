/// Code templates and sequencing settings from config.toml
pub mod codes;

/// Database configuration and connection management
pub mod database;
