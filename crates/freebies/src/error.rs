//! Error types for the data model, the store and the command-line
//! collaborators.

use std::io;

use thiserror::Error;

use crate::domain::{CompanyId, DevId, FreebieId};

/// A change the working set cannot apply.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ModelError {
    #[error("company {0} does not exist")]
    CompanyNotFound(CompanyId),
    #[error("dev {0} does not exist")]
    DevNotFound(DevId),
    #[error("freebie {0} does not exist")]
    FreebieNotFound(FreebieId),
    #[error("no {0} ids left to assign")]
    IdsExhausted(&'static str),
}

/// Failure talking to the `SQLite` store.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Failed to create runtime: {0}")]
    Runtime(#[source] io::Error),
    #[error("Failed to create database directory: {0}")]
    CreateDir(#[source] io::Error),
    #[error("Failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("Failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("Database query failed: {0}")]
    Query(#[from] sqlx::Error),
    #[error("Stored rows are inconsistent: {0}")]
    Integrity(#[from] ModelError),
}

/// Error surfaced by the seeding and inspection commands.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Command(String),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Failed to access terminal: {0}")]
    Io(#[from] io::Error),
}
