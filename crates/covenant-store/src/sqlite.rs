//! SQLite-backed contract store.
//!
//! One connection guarded by a mutex; every call hops onto the blocking pool
//! and holds the lock only there. Multi-statement operations run inside a
//! [`rusqlite::Transaction`], which rolls back when dropped uncommitted, so an
//! early `?` return never leaves a half-written contract behind.
//!
//! ## Schema
//!
//! - `contracts`: one row per contract, services as a JSON array, RFC3339 times
//! - `resource_quota`: one row per contract (`contract_id` unique, foreign key)

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use covenant_core::{
    Change, Contract, ContractId, CreatorId, DEFAULT_CONTRACTOR_NAME, Error, NewContract,
    ResourceQuota, Result,
};

use crate::ContractStore;

const SCHEMA: &str = r"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS contracts (
    id                 TEXT PRIMARY KEY,
    contractor_name    TEXT NOT NULL UNIQUE,
    available_services TEXT NOT NULL,
    creator            TEXT,
    description        TEXT,
    created_at         TEXT NOT NULL,
    updated_at         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS resource_quota (
    id          TEXT PRIMARY KEY,
    contract_id TEXT NOT NULL UNIQUE REFERENCES contracts(id),
    cpu         INTEGER NOT NULL,
    memory      INTEGER NOT NULL,
    block       INTEGER NOT NULL,
    block_ssd   INTEGER NOT NULL,
    fs          INTEGER NOT NULL,
    fs_ssd      INTEGER NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
";

const SELECT_CONTRACT: &str = "
SELECT c.id, c.contractor_name, c.available_services, c.creator, c.description,
       c.created_at, c.updated_at,
       q.cpu, q.memory, q.block, q.block_ssd, q.fs, q.fs_ssd
FROM contracts c
LEFT JOIN resource_quota q ON q.contract_id = c.id";

/// Durable contract store backed by SQLite.
#[derive(Debug, Clone)]
pub struct SqliteContractStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteContractStore {
    /// Opens (or creates) a database file and ensures the schema exists.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the file cannot be opened or the schema cannot be
    /// created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .map_err(|e| Error::storage_with_source(format!("open {}", path.display()), e))?;
        Self::from_connection(conn)
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::storage_with_source("open in-memory database", e))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).map_err(sql_err("create schema"))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| Error::storage("connection mutex poisoned"))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| Error::Internal {
            message: format!("storage task failed: {e}"),
        })?
    }
}

#[async_trait]
impl ContractStore for SqliteContractStore {
    async fn create(&self, contract: NewContract) -> Result<ContractId> {
        self.with_conn(move |conn| {
            let id = ContractId::generate();
            let now = Utc::now().to_rfc3339();
            let services = encode_services(&contract.available_services)?;
            let quota = QuotaColumns::try_from(&contract.quota)?;

            let tx = conn.transaction().map_err(sql_err("begin"))?;
            tx.execute(
                "INSERT INTO contracts
                    (id, contractor_name, available_services, creator, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                params![
                    id.to_string(),
                    contract.contractor_name,
                    services,
                    contract.creator.map(|c| c.to_string()),
                    contract.description,
                    now,
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::AlreadyExists {
                        resource_type: "contract",
                        name: contract.contractor_name.clone(),
                    }
                } else {
                    Error::storage_with_source("insert contract", e)
                }
            })?;
            tx.execute(
                "INSERT INTO resource_quota
                    (id, contract_id, cpu, memory, block, block_ssd, fs, fs_ssd, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
                params![
                    uuid::Uuid::new_v4().to_string(),
                    id.to_string(),
                    quota.cpu,
                    quota.memory,
                    quota.block,
                    quota.block_ssd,
                    quota.fs,
                    quota.fs_ssd,
                    now,
                ],
            )
            .map_err(sql_err("insert resource quota"))?;
            tx.commit().map_err(sql_err("commit"))?;

            tracing::debug!(contract_id = %id, "contract row inserted");
            Ok(id)
        })
        .await
    }

    async fn delete(&self, id: &ContractId) -> Result<()> {
        let id = *id;
        self.with_conn(move |conn| {
            let tx = conn.transaction().map_err(sql_err("begin"))?;
            let quotas = tx
                .execute(
                    "DELETE FROM resource_quota WHERE contract_id = ?1",
                    params![id.to_string()],
                )
                .map_err(sql_err("delete resource quota"))?;
            if quotas == 0 {
                return Err(Error::resource_not_found("resource quota", id));
            }
            let contracts = tx
                .execute("DELETE FROM contracts WHERE id = ?1", params![id.to_string()])
                .map_err(sql_err("delete contract"))?;
            if contracts == 0 {
                return Err(Error::resource_not_found("contract", id));
            }
            tx.commit().map_err(sql_err("commit"))
        })
        .await
    }

    async fn get_contract(&self, id: &ContractId) -> Result<Contract> {
        let id = *id;
        self.with_conn(move |conn| {
            let row = conn
                .query_row(
                    &format!("{SELECT_CONTRACT} WHERE c.id = ?1"),
                    params![id.to_string()],
                    ContractRow::from_row,
                )
                .optional()
                .map_err(sql_err("select contract"))?;
            row.ok_or_else(|| Error::resource_not_found("contract", id))?
                .into_contract()
        })
        .await
    }

    async fn get_default_contract(&self) -> Result<Contract> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("{SELECT_CONTRACT} WHERE c.contractor_name = ?1"),
                    params![DEFAULT_CONTRACTOR_NAME],
                    ContractRow::from_row,
                )
                .optional()
                .map_err(sql_err("select default contract"))?;
            row.ok_or_else(|| Error::resource_not_found("contract", DEFAULT_CONTRACTOR_NAME))?
                .into_contract()
        })
        .await
    }

    async fn list(&self, offset: u32, limit: u32) -> Result<Vec<Contract>> {
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "{SELECT_CONTRACT} ORDER BY c.rowid LIMIT ?1 OFFSET ?2"
                ))
                .map_err(sql_err("prepare list"))?;
            let rows = stmt
                .query_map(
                    params![i64::from(limit), i64::from(offset)],
                    ContractRow::from_row,
                )
                .map_err(sql_err("list contracts"))?;

            rows.map(|row| row.map_err(sql_err("read contract row"))?.into_contract())
                .collect()
        })
        .await
    }

    async fn get_resource_quota(&self, id: &ContractId) -> Result<ResourceQuota> {
        let id = *id;
        self.with_conn(move |conn| select_quota(conn, &id)).await
    }

    async fn update_resource_quota(
        &self,
        id: &ContractId,
        patch: ResourceQuota,
    ) -> Result<Change<ResourceQuota>> {
        let id = *id;
        self.with_conn(move |conn| {
            let tx = conn.transaction().map_err(sql_err("begin"))?;
            let previous = select_quota(&tx, &id)?;
            let current = previous.merge(&patch);
            let cols = QuotaColumns::try_from(&current)?;

            let updated = tx
                .execute(
                    "UPDATE resource_quota
                     SET cpu = ?1, memory = ?2, block = ?3, block_ssd = ?4, fs = ?5, fs_ssd = ?6,
                         updated_at = ?7
                     WHERE contract_id = ?8",
                    params![
                        cols.cpu,
                        cols.memory,
                        cols.block,
                        cols.block_ssd,
                        cols.fs,
                        cols.fs_ssd,
                        Utc::now().to_rfc3339(),
                        id.to_string(),
                    ],
                )
                .map_err(sql_err("update resource quota"))?;
            if updated == 0 {
                return Err(Error::resource_not_found("resource quota", id));
            }
            tx.commit().map_err(sql_err("commit"))?;
            Ok(Change { previous, current })
        })
        .await
    }

    async fn update_available_services(
        &self,
        id: &ContractId,
        services: Vec<String>,
    ) -> Result<Change<Vec<String>>> {
        let id = *id;
        self.with_conn(move |conn| {
            let tx = conn.transaction().map_err(sql_err("begin"))?;
            let raw: String = tx
                .query_row(
                    "SELECT available_services FROM contracts WHERE id = ?1",
                    params![id.to_string()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(sql_err("select services"))?
                .ok_or_else(|| Error::resource_not_found("contract", id))?;
            let previous = decode_services(&raw)?;

            let updated = tx
                .execute(
                    "UPDATE contracts SET available_services = ?1, updated_at = ?2 WHERE id = ?3",
                    params![
                        encode_services(&services)?,
                        Utc::now().to_rfc3339(),
                        id.to_string()
                    ],
                )
                .map_err(sql_err("update services"))?;
            if updated == 0 {
                return Err(Error::resource_not_found("contract", id));
            }
            tx.commit().map_err(sql_err("commit"))?;
            Ok(Change {
                previous,
                current: services,
            })
        })
        .await
    }
}

fn select_quota(conn: &Connection, id: &ContractId) -> Result<ResourceQuota> {
    let cols = conn
        .query_row(
            "SELECT cpu, memory, block, block_ssd, fs, fs_ssd
             FROM resource_quota WHERE contract_id = ?1",
            params![id.to_string()],
            |row| {
                Ok(QuotaColumns {
                    cpu: row.get(0)?,
                    memory: row.get(1)?,
                    block: row.get(2)?,
                    block_ssd: row.get(3)?,
                    fs: row.get(4)?,
                    fs_ssd: row.get(5)?,
                })
            },
        )
        .optional()
        .map_err(sql_err("select resource quota"))?
        .ok_or_else(|| Error::resource_not_found("resource quota", id))?;
    cols.into_quota()
}

fn sql_err(context: &'static str) -> impl FnOnce(rusqlite::Error) -> Error {
    move |e| Error::storage_with_source(context, e)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn encode_services(services: &[String]) -> Result<String> {
    serde_json::to_string(services).map_err(|e| Error::Serialization {
        message: format!("encode services: {e}"),
    })
}

fn decode_services(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw).map_err(|e| Error::Serialization {
        message: format!("decode services: {e}"),
    })
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Integrity {
            message: format!("bad timestamp '{raw}': {e}"),
        })
}

/// Quota fields as SQLite integers.
struct QuotaColumns {
    cpu: i64,
    memory: i64,
    block: i64,
    block_ssd: i64,
    fs: i64,
    fs_ssd: i64,
}

impl TryFrom<&ResourceQuota> for QuotaColumns {
    type Error = Error;

    fn try_from(q: &ResourceQuota) -> Result<Self> {
        q.validate()?;
        let col = |name: &str, v: u64| {
            i64::try_from(v).map_err(|_| Error::InvalidInput(format!("{name} quota {v} too large")))
        };
        Ok(Self {
            cpu: col("cpu", q.cpu)?,
            memory: col("memory", q.memory)?,
            block: col("block", q.block)?,
            block_ssd: col("block_ssd", q.block_ssd)?,
            fs: col("fs", q.fs)?,
            fs_ssd: col("fs_ssd", q.fs_ssd)?,
        })
    }
}

impl QuotaColumns {
    fn into_quota(self) -> Result<ResourceQuota> {
        let col = |v: i64| {
            u64::try_from(v).map_err(|_| Error::Integrity {
                message: format!("negative quota value {v}"),
            })
        };
        Ok(ResourceQuota {
            cpu: col(self.cpu)?,
            memory: col(self.memory)?,
            block: col(self.block)?,
            block_ssd: col(self.block_ssd)?,
            fs: col(self.fs)?,
            fs_ssd: col(self.fs_ssd)?,
        })
    }
}

/// Raw joined row; decoded outside the rusqlite closure so domain errors
/// keep their own variants.
struct ContractRow {
    id: String,
    contractor_name: String,
    available_services: String,
    creator: Option<String>,
    description: Option<String>,
    created_at: String,
    updated_at: String,
    quota: Option<QuotaColumns>,
}

impl ContractRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let cpu: Option<i64> = row.get(7)?;
        let quota = match cpu {
            Some(cpu) => Some(QuotaColumns {
                cpu,
                memory: row.get(8)?,
                block: row.get(9)?,
                block_ssd: row.get(10)?,
                fs: row.get(11)?,
                fs_ssd: row.get(12)?,
            }),
            None => None,
        };
        Ok(Self {
            id: row.get(0)?,
            contractor_name: row.get(1)?,
            available_services: row.get(2)?,
            creator: row.get(3)?,
            description: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
            quota,
        })
    }

    fn into_contract(self) -> Result<Contract> {
        let id: ContractId = self.id.parse().map_err(|e| Error::Integrity {
            message: format!("stored contract id: {e}"),
        })?;
        let quota = self
            .quota
            .ok_or_else(|| Error::Integrity {
                message: format!("contract {id} has no resource quota"),
            })?
            .into_quota()?;
        let creator = self
            .creator
            .as_deref()
            .map(str::parse::<CreatorId>)
            .transpose()
            .map_err(|e| Error::Integrity {
                message: format!("stored creator: {e}"),
            })?;

        Ok(Contract {
            id,
            contractor_name: self.contractor_name,
            available_services: decode_services(&self.available_services)?,
            quota,
            creator,
            description: self.description,
            created_at: parse_time(&self.created_at)?,
            updated_at: parse_time(&self.updated_at)?,
        })
    }
}
