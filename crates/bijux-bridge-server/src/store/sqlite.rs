// SPDX-License-Identifier: Apache-2.0

use super::{LegacyCustomerStore, NewCustomerStore, StoreError};
use async_trait::async_trait;
use bijux_bridge_model::{
    AccountType, Address, Contact, Customer, CustomerDraft, CustomerId, LegacyCustomer,
};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const NEW_SCHEMA: &str = "
PRAGMA journal_mode=WAL;
CREATE TABLE IF NOT EXISTS customer (
  seq INTEGER PRIMARY KEY AUTOINCREMENT,
  id TEXT UNIQUE,
  name TEXT NOT NULL,
  email TEXT,
  phone TEXT,
  street TEXT,
  city TEXT,
  state TEXT,
  zip_code TEXT,
  account_type TEXT
);
";

const LEGACY_SCHEMA: &str = "
PRAGMA journal_mode=WAL;
CREATE TABLE IF NOT EXISTS legacy_customer (
  customer_id TEXT PRIMARY KEY,
  full_name TEXT NOT NULL,
  email TEXT,
  phone_number TEXT,
  address TEXT,
  account_type TEXT,
  created_date TEXT
);
";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

fn sqlite_error(op: &str, e: rusqlite::Error) -> StoreError {
    if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
        StoreError::rejected(format!("sqlite {op}: {e}"))
    } else {
        StoreError::unavailable(format!("sqlite {op}: {e}"))
    }
}

#[derive(Clone)]
struct SharedConnection(Arc<Mutex<Connection>>);

impl SharedConnection {
    fn open(path: &Path, schema: &str) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| sqlite_error("open", e))?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| sqlite_error("open", e))?;
        conn.execute_batch(schema)
            .map_err(|e| sqlite_error("schema", e))?;
        Ok(Self(Arc::new(Mutex::new(conn))))
    }

    async fn run<T, F>(&self, op: &'static str, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.0);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::unavailable(format!("sqlite {op}: connection poisoned")))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::unavailable(format!("sqlite {op}: worker failed: {e}")))?
    }
}

fn count_rows(conn: &Connection, table: &str) -> Result<u64, StoreError> {
    let n: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .map_err(|e| sqlite_error("count", e))?;
    u64::try_from(n).map_err(|_| StoreError::corrupt(format!("negative row count {n}")))
}

/// New-store adapter over a file-backed `customer` table.
///
/// Ids come from the AUTOINCREMENT sequence, so a deleted row never frees
/// its id for reuse.
pub struct SqliteNewStore {
    conn: SharedConnection,
}

impl SqliteNewStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            conn: SharedConnection::open(path, NEW_SCHEMA)?,
        })
    }
}

type CustomerRow = (
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn customer_from_row(row: CustomerRow) -> Result<Customer, StoreError> {
    let (id, name, email, phone, street, city, state, zip_code, account_type) = row;
    let id = CustomerId::parse(&id)
        .map_err(|e| StoreError::corrupt(format!("stored customer id {id:?}: {e}")))?;
    let account_type = match account_type {
        None => None,
        Some(raw) => Some(AccountType::parse_lenient(&raw).ok_or_else(|| {
            StoreError::corrupt(format!("stored account type {raw:?} for {id}"))
        })?),
    };
    Ok(Customer {
        id,
        name,
        contact: Contact { email, phone },
        address: Address {
            street,
            city,
            state,
            zip_code,
        },
        account_type,
    })
}

#[async_trait]
impl NewCustomerStore for SqliteNewStore {
    fn backend_tag(&self) -> &'static str {
        "sqlite"
    }

    async fn get(&self, id: &CustomerId) -> Result<Option<Customer>, StoreError> {
        let key = id.as_str().to_string();
        let row: Option<CustomerRow> = self
            .conn
            .run("get", move |conn| {
                conn.query_row(
                    "SELECT id, name, email, phone, street, city, state, zip_code, account_type \
                     FROM customer WHERE id = ?1",
                    params![key],
                    |r| {
                        Ok((
                            r.get(0)?,
                            r.get(1)?,
                            r.get(2)?,
                            r.get(3)?,
                            r.get(4)?,
                            r.get(5)?,
                            r.get(6)?,
                            r.get(7)?,
                            r.get(8)?,
                        ))
                    },
                )
                .optional()
                .map_err(|e| sqlite_error("get", e))
            })
            .await?;
        row.map(customer_from_row).transpose()
    }

    async fn put(&self, draft: CustomerDraft) -> Result<Customer, StoreError> {
        self.conn
            .run("put", move |conn| {
                let tx = conn.transaction().map_err(|e| sqlite_error("put", e))?;
                tx.execute(
                    "INSERT INTO customer (id, name, email, phone, street, city, state, zip_code, account_type) \
                     VALUES (NULL, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        draft.name,
                        draft.contact.email,
                        draft.contact.phone,
                        draft.address.street,
                        draft.address.city,
                        draft.address.state,
                        draft.address.zip_code,
                        draft.account_type.as_str(),
                    ],
                )
                .map_err(|e| sqlite_error("put", e))?;
                let seq = u64::try_from(tx.last_insert_rowid())
                    .map_err(|_| StoreError::corrupt("negative customer sequence"))?;
                let id = CustomerId::from_sequence(seq);
                tx.execute(
                    "UPDATE customer SET id = ?1 WHERE seq = ?2",
                    params![id.as_str(), seq as i64],
                )
                .map_err(|e| sqlite_error("put", e))?;
                tx.commit().map_err(|e| sqlite_error("commit", e))?;
                Ok(Customer::from_draft(id, draft))
            })
            .await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.conn
            .run("count", |conn| count_rows(conn, "customer"))
            .await
    }
}

type LegacyRow = (
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

pub struct SqliteLegacyStore {
    conn: SharedConnection,
}

impl SqliteLegacyStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            conn: SharedConnection::open(path, LEGACY_SCHEMA)?,
        })
    }
}

#[async_trait]
impl LegacyCustomerStore for SqliteLegacyStore {
    fn backend_tag(&self) -> &'static str {
        "sqlite"
    }

    async fn get(&self, id: &CustomerId) -> Result<Option<LegacyCustomer>, StoreError> {
        let key = id.as_str().to_string();
        let row: Option<LegacyRow> = self
            .conn
            .run("get", move |conn| {
                conn.query_row(
                    "SELECT customer_id, full_name, email, phone_number, address, account_type, created_date \
                     FROM legacy_customer WHERE customer_id = ?1",
                    params![key],
                    |r| {
                        Ok((
                            r.get(0)?,
                            r.get(1)?,
                            r.get(2)?,
                            r.get(3)?,
                            r.get(4)?,
                            r.get(5)?,
                            r.get(6)?,
                        ))
                    },
                )
                .optional()
                .map_err(|e| sqlite_error("get", e))
            })
            .await?;
        let Some((customer_id, full_name, email, phone_number, address, account_type, created_date)) = row
        else {
            return Ok(None);
        };
        let customer_id = CustomerId::parse(&customer_id).map_err(|e| {
            StoreError::corrupt(format!("stored legacy id {customer_id:?}: {e}"))
        })?;
        Ok(Some(LegacyCustomer {
            customer_id,
            full_name,
            email,
            phone_number,
            address,
            account_type,
            created_date,
        }))
    }

    async fn put(&self, record: LegacyCustomer) -> Result<(), StoreError> {
        self.conn
            .run("put", move |conn| {
                conn.execute(
                    "INSERT INTO legacy_customer \
                     (customer_id, full_name, email, phone_number, address, account_type, created_date) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
                     ON CONFLICT(customer_id) DO UPDATE SET \
                     full_name = excluded.full_name, email = excluded.email, \
                     phone_number = excluded.phone_number, address = excluded.address, \
                     account_type = excluded.account_type, created_date = excluded.created_date",
                    params![
                        record.customer_id.as_str(),
                        record.full_name,
                        record.email,
                        record.phone_number,
                        record.address,
                        record.account_type,
                        record.created_date,
                    ],
                )
                .map_err(|e| sqlite_error("put", e))?;
                Ok(())
            })
            .await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.conn
            .run("count", |conn| count_rows(conn, "legacy_customer"))
            .await
    }
}
