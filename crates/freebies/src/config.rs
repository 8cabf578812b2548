//! Defaults for locating the database.

/// Database file used when neither `--db` nor [`DB_PATH_ENV`] is given.
pub const DB_FILE: &str = "freebies.db";

/// Environment variable that overrides the database path.
pub const DB_PATH_ENV: &str = "FREEBIES_DB";

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";
