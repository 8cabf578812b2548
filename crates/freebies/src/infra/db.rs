//! Database layer for persisting companies, devs and freebies using `SQLite`
//! via `SQLx`.
//!
//! # Database Maintenance Guide
//!
//! ## Changing the schema
//! 1. Create a new migration file in `crates/freebies/migrations/` with the
//!    next sequence number (e.g., `002_add_email_to_devs.sql`).
//! 2. Name every foreign key `fk_<table>_<column>_<referenced_table>`;
//!    `cargo run -p xtask -- check-migrations` rejects anything else.
//! 3. Update the row mapping in [`Database`] and the upserts in
//!    [`FreebieStore::save`].
//!
//! ## Migration versioning
//! - Migrations are embedded at compile time via `sqlx::migrate!()`.
//! - `SQLx` tracks applied migrations in the `_sqlx_migrations` table.
//! - On each launch, [`Database::open`] runs any unapplied migrations.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqliteConnection, SqlitePool};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

use crate::domain::{
    Company, CompanyId, Dev, DevId, Freebie, FreebieGraph, FreebieId, NewFreebie,
};
use crate::error::DbError;

/// Loads and stores a whole [`FreebieGraph`].
#[cfg_attr(test, mockall::automock)]
pub trait FreebieStore {
    /// Reads every persisted record into a fresh working set.
    ///
    /// # Errors
    /// Returns an error if a query fails or the stored rows reference missing
    /// records.
    fn load(&self) -> Result<FreebieGraph, DbError>;

    /// Makes the stored rows match `graph` in a single transaction.
    ///
    /// # Errors
    /// Returns an error if a query fails or a constraint rejects a row. No
    /// partial changes are kept in that case.
    fn save(&self, graph: &FreebieGraph) -> Result<(), DbError>;
}

/// Synchronous handle to the `SQLite` store.
///
/// Owns a single-connection pool and the runtime that drives it. The pool is
/// closed when the handle is dropped.
pub struct Database {
    pool: SqlitePool,
    runtime: Runtime,
}

impl Database {
    /// Opens (and creates when missing) the database file at `db_path`.
    ///
    /// # Errors
    /// Returns an error if the directory, connection or migrations fail.
    pub fn open(db_path: &Path) -> Result<Self, DbError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(DbError::Runtime)?;

        let pool = runtime.block_on(async {
            if let Some(parent) = db_path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).map_err(DbError::CreateDir)?;
            }

            let options = SqliteConnectOptions::new()
                .filename(db_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .foreign_keys(true);

            connect(options).await
        })?;
        info!(path = %db_path.display(), "opened database");

        Ok(Self { pool, runtime })
    }

    /// Returns all companies ordered by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn load_companies(&self) -> Result<Vec<Company>, DbError> {
        self.runtime.block_on(async {
            let rows = sqlx::query("SELECT id, name, founding_year FROM companies ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

            Ok::<_, DbError>(
                rows.iter()
                    .map(|row| Company {
                        founding_year: row.get("founding_year"),
                        id: CompanyId(row.get("id")),
                        name: row.get("name"),
                    })
                    .collect(),
            )
        })
    }

    /// Returns all devs ordered by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn load_devs(&self) -> Result<Vec<Dev>, DbError> {
        self.runtime.block_on(async {
            let rows = sqlx::query("SELECT id, name FROM devs ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

            Ok::<_, DbError>(
                rows.iter()
                    .map(|row| Dev {
                        id: DevId(row.get("id")),
                        name: row.get("name"),
                    })
                    .collect(),
            )
        })
    }

    /// Returns all freebies ordered by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub fn load_freebies(&self) -> Result<Vec<Freebie>, DbError> {
        self.runtime.block_on(async {
            let rows = sqlx::query(
                "SELECT id, item_name, value, dev_id, company_id FROM freebies ORDER BY id",
            )
            .fetch_all(&self.pool)
            .await?;

            Ok::<_, DbError>(
                rows.iter()
                    .map(|row| {
                        Freebie::new(
                            FreebieId(row.get("id")),
                            NewFreebie::new(
                                row.get::<String, _>("item_name"),
                                row.get("value"),
                                DevId(row.get("dev_id")),
                                CompanyId(row.get("company_id")),
                            ),
                        )
                    })
                    .collect(),
            )
        })
    }
}

impl FreebieStore for Database {
    fn load(&self) -> Result<FreebieGraph, DbError> {
        let companies = self.load_companies()?;
        let devs = self.load_devs()?;
        let freebies = self.load_freebies()?;

        Ok(FreebieGraph::from_records(companies, devs, freebies)?)
    }

    fn save(&self, graph: &FreebieGraph) -> Result<(), DbError> {
        self.runtime.block_on(async {
            let mut tx = self.pool.begin().await?;

            delete_missing(&mut tx, "freebies", |id| {
                graph.freebie(FreebieId(id)).is_some()
            })
            .await?;
            delete_missing(&mut tx, "devs", |id| graph.dev(DevId(id)).is_some()).await?;
            delete_missing(&mut tx, "companies", |id| {
                graph.company(CompanyId(id)).is_some()
            })
            .await?;

            for company in graph.companies() {
                sqlx::query(
                    "INSERT INTO companies (id, name, founding_year) VALUES (?, ?, ?) \
                     ON CONFLICT(id) DO UPDATE SET name = excluded.name, \
                     founding_year = excluded.founding_year",
                )
                .bind(company.id.0)
                .bind(&company.name)
                .bind(company.founding_year)
                .execute(&mut *tx)
                .await?;
            }
            for dev in graph.devs() {
                sqlx::query(
                    "INSERT INTO devs (id, name) VALUES (?, ?) \
                     ON CONFLICT(id) DO UPDATE SET name = excluded.name",
                )
                .bind(dev.id.0)
                .bind(&dev.name)
                .execute(&mut *tx)
                .await?;
            }
            for freebie in graph.freebies() {
                sqlx::query(
                    "INSERT INTO freebies (id, item_name, value, dev_id, company_id) \
                     VALUES (?, ?, ?, ?, ?) \
                     ON CONFLICT(id) DO UPDATE SET item_name = excluded.item_name, \
                     value = excluded.value, dev_id = excluded.dev_id, \
                     company_id = excluded.company_id",
                )
                .bind(freebie.id.0)
                .bind(&freebie.item_name)
                .bind(freebie.value)
                .bind(freebie.dev().0)
                .bind(freebie.company().0)
                .execute(&mut *tx)
                .await?;
            }

            tx.commit().await?;

            Ok::<_, DbError>(())
        })
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
    }
}

async fn connect(options: SqliteConnectOptions) -> Result<SqlitePool, DbError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(DbError::Connect)?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Deletes rows of `table` whose id `keep` rejects.
async fn delete_missing(
    conn: &mut SqliteConnection,
    table: &str,
    keep: impl Fn(i64) -> bool,
) -> Result<(), DbError> {
    let select = format!("SELECT id FROM {table}");
    let delete = format!("DELETE FROM {table} WHERE id = ?");
    let stored: Vec<i64> = sqlx::query_scalar(&select).fetch_all(&mut *conn).await?;

    for id in stored.into_iter().filter(|id| !keep(*id)) {
        sqlx::query(&delete).bind(id).execute(&mut *conn).await?;
        debug!(table, id, "deleted row missing from working set");
    }

    Ok(())
}

#[cfg(test)]
impl Database {
    pub fn open_in_memory() -> Result<Self, DbError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(DbError::Runtime)?;

        let pool = runtime.block_on(async {
            let options = SqliteConnectOptions::new()
                .filename(":memory:")
                .journal_mode(SqliteJournalMode::Wal)
                .foreign_keys(true);

            connect(options).await
        })?;

        Ok(Self { pool, runtime })
    }

    /// Inserts a freebie row directly, bypassing the working set.
    fn insert_freebie(&self, freebie: &Freebie) -> Result<(), DbError> {
        self.runtime.block_on(async {
            sqlx::query(
                "INSERT INTO freebies (id, item_name, value, dev_id, company_id) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(freebie.id.0)
            .bind(&freebie.item_name)
            .bind(freebie.value)
            .bind(freebie.dev().0)
            .bind(freebie.company().0)
            .execute(&self.pool)
            .await?;

            Ok::<_, DbError>(())
        })
    }

    fn delete_company(&self, company: CompanyId) -> Result<(), DbError> {
        self.runtime.block_on(async {
            sqlx::query("DELETE FROM companies WHERE id = ?")
                .bind(company.0)
                .execute(&self.pool)
                .await?;

            Ok::<_, DbError>(())
        })
    }

    fn delete_dev(&self, dev: DevId) -> Result<(), DbError> {
        self.runtime.block_on(async {
            sqlx::query("DELETE FROM devs WHERE id = ?")
                .bind(dev.0)
                .execute(&self.pool)
                .await?;

            Ok::<_, DbError>(())
        })
    }

    fn foreign_key_definitions(&self) -> Result<String, DbError> {
        self.runtime.block_on(async {
            let sql: String =
                sqlx::query_scalar("SELECT sql FROM sqlite_master WHERE name = 'freebies'")
                    .fetch_one(&self.pool)
                    .await?;

            Ok::<_, DbError>(sql)
        })
    }
}
