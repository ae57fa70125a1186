//! Review state persistence store.
//!
//! SQLite-backed storage for catalog items and their memory states. Every
//! review runs its read-modify-write inside one `IMMEDIATE` transaction, so
//! a failure at any step leaves the stored state exactly as it was.

use crate::cognitive::selector::{clamp_index, SelectionSource};
use crate::config::StoreConfig;
use crate::error::{ErrorCode, WordwiseError, WordwiseResult};
use crate::types::{Item, MemoryState, ReviewStats};
use chrono::{DateTime, Duration, NaiveTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

const ITEM_COLUMNS: &str = "i.key, i.word, i.meaning, i.deck, i.phonetic, i.example_sentence";

const STATE_COLUMNS: &str = "m.item_key, m.stability, m.difficulty, m.last_review_at, \
     m.next_review_at, m.review_count, m.total_reviews, m.consecutive_correct";

/// SQLite-backed store for items and their memory states.
///
/// Cloning is cheap and shares the underlying connection.
#[derive(Clone)]
pub struct ReviewStore {
    conn: Arc<Mutex<Connection>>,
}

impl ReviewStore {
    /// Open (or create) the database at `path`.
    ///
    /// Missing parent directories are created.
    pub fn new<P: AsRef<Path>>(path: P) -> WordwiseResult<Self> {
        Self::open_with_timeout(path.as_ref(), DEFAULT_BUSY_TIMEOUT_MS)
    }

    /// Open the database described by a [`StoreConfig`].
    pub fn open(config: &StoreConfig) -> WordwiseResult<Self> {
        Self::open_with_timeout(&config.db_path, config.busy_timeout_ms)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> WordwiseResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, DEFAULT_BUSY_TIMEOUT_MS)
    }

    fn open_with_timeout(path: &Path, busy_timeout_ms: u64) -> WordwiseResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(|e| WordwiseError::Persistence {
            message: format!("failed to open {}: {}", path.display(), e),
            code: ErrorCode::DbConnectionFailed,
            source: Some(Box::new(e)),
        })?;
        tracing::debug!(path = %path.display(), "Opened review store");
        Self::from_connection(conn, busy_timeout_ms)
    }

    fn from_connection(conn: Connection, busy_timeout_ms: u64) -> WordwiseResult<Self> {
        conn.busy_timeout(std::time::Duration::from_millis(busy_timeout_ms))?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> WordwiseResult<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS items (
                key TEXT PRIMARY KEY,
                word TEXT NOT NULL,
                meaning TEXT,
                deck TEXT,
                phonetic TEXT,
                example_sentence TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS memory_states (
                item_key TEXT PRIMARY KEY REFERENCES items(key) ON DELETE CASCADE,
                stability REAL NOT NULL,
                difficulty REAL NOT NULL,
                last_review_at TEXT,
                next_review_at TEXT,
                review_count INTEGER NOT NULL DEFAULT 0,
                total_reviews INTEGER NOT NULL DEFAULT 0,
                consecutive_correct INTEGER NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_memory_states_next_review_at ON memory_states(next_review_at);
            CREATE INDEX IF NOT EXISTS idx_memory_states_difficulty ON memory_states(difficulty);
            ",
        )?;

        Ok(())
    }

    fn lock(&self) -> WordwiseResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| WordwiseError::persistence(e.to_string()))
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Insert an item, or update its fields if the key already exists.
    ///
    /// An existing memory state is kept.
    pub fn upsert_item(&self, item: &Item) -> WordwiseResult<()> {
        item.validate()?;
        let conn = self.lock()?;
        upsert_item_with(&conn, item, &format_timestamp(Utc::now()))
    }

    /// Upsert a batch of items in a single transaction.
    pub fn upsert_items(&self, items: &[Item]) -> WordwiseResult<usize> {
        for item in items {
            item.validate()?;
        }

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let now = format_timestamp(Utc::now());
        for item in items {
            upsert_item_with(&tx, item, &now)?;
        }
        tx.commit()?;

        Ok(items.len())
    }

    /// Look up an item by key.
    pub fn get_item(&self, key: &str) -> WordwiseResult<Option<Item>> {
        let conn = self.lock()?;

        let item = conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM items i WHERE i.key = ?1"),
                params![key],
                |row| item_from_row(row, 0),
            )
            .optional()?;

        Ok(item)
    }

    /// Remove an item together with its memory state.
    pub fn remove_item(&self, key: &str) -> WordwiseResult<bool> {
        let conn = self.lock()?;

        let deleted = conn.execute("DELETE FROM items WHERE key = ?1", params![key])?;

        Ok(deleted > 0)
    }

    /// Number of items in the catalog.
    pub fn item_count(&self) -> WordwiseResult<u64> {
        let conn = self.lock()?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;

        Ok(count as u64)
    }

    // =========================================================================
    // Memory states
    // =========================================================================

    /// Get the memory state for an item, if it has one.
    pub fn get_state(&self, item_key: &str) -> WordwiseResult<Option<MemoryState>> {
        let conn = self.lock()?;
        load_state(&conn, item_key)
    }

    /// Delete the memory state for an item.
    ///
    /// Returns whether a state existed.
    pub fn delete_state(&self, item_key: &str) -> WordwiseResult<bool> {
        let conn = self.lock()?;

        let deleted = conn.execute(
            "DELETE FROM memory_states WHERE item_key = ?1",
            params![item_key],
        )?;

        Ok(deleted > 0)
    }

    /// Run one review as an atomic read-modify-write.
    ///
    /// Checks that the item exists, loads its current state, hands it to
    /// `apply`, and persists the returned state. Nothing is written unless
    /// every step succeeds; an error from `apply` or from SQLite rolls the
    /// transaction back.
    pub fn transact_review<F>(&self, item_key: &str, apply: F) -> WordwiseResult<MemoryState>
    where
        F: FnOnce(Option<&MemoryState>) -> WordwiseResult<MemoryState>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists = tx
            .query_row("SELECT 1 FROM items WHERE key = ?1", params![item_key], |_| Ok(()))
            .optional()?
            .is_some();
        if !exists {
            return Err(WordwiseError::item_not_found(item_key));
        }

        let prior = load_state(&tx, item_key)?;
        let next = apply(prior.as_ref())?;
        if next.item_key != item_key {
            return Err(WordwiseError::internal(format!(
                "review of '{}' produced a state for '{}'",
                item_key, next.item_key
            )));
        }

        save_state(&tx, &next)?;
        tx.commit()?;

        Ok(next)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Items due at `now`, oldest due first (ties by key).
    pub fn due_items(&self, now: DateTime<Utc>, limit: usize) -> WordwiseResult<Vec<Item>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS}
             FROM memory_states m JOIN items i ON i.key = m.item_key
             WHERE m.next_review_at <= ?1
             ORDER BY m.next_review_at ASC, i.key ASC
             LIMIT ?2"
        ))?;

        let items = stmt
            .query_map(params![format_timestamp(now), to_sql_limit(limit)], |row| {
                item_from_row(row, 0)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Number of items due at `now`.
    pub fn due_count(&self, now: DateTime<Utc>) -> WordwiseResult<u64> {
        let conn = self.lock()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM memory_states WHERE next_review_at <= ?1",
            params![format_timestamp(now)],
            |row| row.get(0),
        )?;

        Ok(count as u64)
    }

    /// Reviewed items whose difficulty lies in `[min, max]`, in key order.
    pub fn items_by_difficulty(&self, min: f64, max: f64) -> WordwiseResult<Vec<Item>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS}
             FROM memory_states m JOIN items i ON i.key = m.item_key
             WHERE m.next_review_at IS NOT NULL
               AND m.difficulty >= ?1 AND m.difficulty <= ?2
             ORDER BY i.key ASC"
        ))?;

        let items = stmt
            .query_map(params![min, max], |row| item_from_row(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Aggregate counts and averages at `now`.
    pub fn stats(&self, now: DateTime<Utc>) -> WordwiseResult<ReviewStats> {
        let conn = self.lock()?;

        let total_items: i64 = conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;

        let day_start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let day_end = day_start + Duration::days(1);

        let (with_memory, due, due_within_day, reviewed_today, avg_stability, avg_difficulty) = conn
            .query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN next_review_at <= ?1 THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN next_review_at <= ?2 THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(CASE WHEN last_review_at >= ?3 AND last_review_at < ?4 THEN 1 ELSE 0 END), 0),
                        COALESCE(AVG(stability), 0.0),
                        COALESCE(AVG(difficulty), 0.0)
                 FROM memory_states
                 WHERE next_review_at IS NOT NULL",
                params![
                    format_timestamp(now),
                    format_timestamp(now + Duration::days(1)),
                    format_timestamp(day_start),
                    format_timestamp(day_end),
                ],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, f64>(4)?,
                        row.get::<_, f64>(5)?,
                    ))
                },
            )?;

        let memorization_rate = if total_items > 0 {
            with_memory as f64 / total_items as f64
        } else {
            0.0
        };

        Ok(ReviewStats {
            due_count: due as u64,
            due_within_day: due_within_day as u64,
            total_items: total_items as u64,
            items_with_memory: with_memory as u64,
            reviewed_today: reviewed_today as u64,
            avg_stability,
            avg_difficulty,
            memorization_rate,
        })
    }

    /// Every item joined with its memory state, in key order.
    pub fn all_records(&self) -> WordwiseResult<Vec<(Item, Option<MemoryState>)>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS}, {STATE_COLUMNS}
             FROM items i LEFT JOIN memory_states m ON m.item_key = i.key
             ORDER BY i.key ASC"
        ))?;

        let rows = stmt
            .query_map([], |row| {
                let item = item_from_row(row, 0)?;
                let state = match row.get::<_, Option<String>>(6)? {
                    Some(_) => Some(StateRow::from_row(row, 6)?),
                    None => None,
                };
                Ok((item, state))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(item, state)| -> WordwiseResult<(Item, Option<MemoryState>)> {
                Ok((item, state.map(StateRow::into_state).transpose()?))
            })
            .collect()
    }

    fn first_item(&self, sql: &str, param: Option<String>) -> WordwiseResult<Option<Item>> {
        let conn = self.lock()?;

        let item = match param {
            Some(value) => conn.query_row(sql, params![value], |row| item_from_row(row, 0)),
            None => conn.query_row(sql, [], |row| item_from_row(row, 0)),
        }
        .optional()?;

        Ok(item)
    }
}

impl SelectionSource for ReviewStore {
    fn oldest_due(&self, now: DateTime<Utc>) -> WordwiseResult<Option<Item>> {
        self.first_item(
            &format!(
                "SELECT {ITEM_COLUMNS}
                 FROM memory_states m JOIN items i ON i.key = m.item_key
                 WHERE m.next_review_at <= ?1
                 ORDER BY m.next_review_at ASC, i.key ASC
                 LIMIT 1"
            ),
            Some(format_timestamp(now)),
        )
    }

    fn pick_new(&self, choose: &mut dyn FnMut(u64) -> u64) -> WordwiseResult<Option<Item>> {
        let mut conn = self.lock()?;
        // Count and fetch inside one read transaction so both see the same snapshot.
        let tx = conn.transaction()?;

        let count: i64 = tx.query_row(
            "SELECT COUNT(*)
             FROM items i LEFT JOIN memory_states m ON m.item_key = i.key
             WHERE m.next_review_at IS NULL",
            [],
            |row| row.get(0),
        )?;
        let len = usize::try_from(count).unwrap_or(0);
        if len == 0 {
            return Ok(None);
        }

        let index = clamp_index(choose(len as u64), len);
        let item = tx
            .query_row(
                &format!(
                    "SELECT {ITEM_COLUMNS}
                     FROM items i LEFT JOIN memory_states m ON m.item_key = i.key
                     WHERE m.next_review_at IS NULL
                     ORDER BY i.key ASC
                     LIMIT 1 OFFSET ?1"
                ),
                params![to_sql_limit(index)],
                |row| item_from_row(row, 0),
            )
            .optional()?;
        tx.commit()?;

        Ok(item)
    }

    fn earliest_scheduled(&self) -> WordwiseResult<Option<Item>> {
        self.first_item(
            &format!(
                "SELECT {ITEM_COLUMNS}
                 FROM memory_states m JOIN items i ON i.key = m.item_key
                 WHERE m.next_review_at IS NOT NULL
                 ORDER BY m.next_review_at ASC, i.key ASC
                 LIMIT 1"
            ),
            None,
        )
    }
}

/// Fixed-width RFC 3339 in UTC, so string order matches time order.
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str, item_key: &str) -> WordwiseResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            WordwiseError::corrupt_record(format!(
                "bad timestamp '{}' for item '{}': {}",
                raw, item_key, e
            ))
        })
}

fn to_sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

// Plain upsert: INSERT OR REPLACE would delete the row and cascade into memory_states.
fn upsert_item_with(conn: &Connection, item: &Item, now: &str) -> WordwiseResult<()> {
    conn.execute(
        "INSERT INTO items (key, word, meaning, deck, phonetic, example_sentence, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
         ON CONFLICT(key) DO UPDATE SET
             word = excluded.word,
             meaning = excluded.meaning,
             deck = excluded.deck,
             phonetic = excluded.phonetic,
             example_sentence = excluded.example_sentence,
             updated_at = excluded.updated_at",
        params![
            item.key,
            item.word,
            item.meaning,
            item.deck,
            item.phonetic,
            item.example_sentence,
            now,
        ],
    )?;
    Ok(())
}

fn item_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Item> {
    Ok(Item {
        key: row.get(offset)?,
        word: row.get(offset + 1)?,
        meaning: row.get(offset + 2)?,
        deck: row.get(offset + 3)?,
        phonetic: row.get(offset + 4)?,
        example_sentence: row.get(offset + 5)?,
    })
}

fn load_state(conn: &Connection, item_key: &str) -> WordwiseResult<Option<MemoryState>> {
    let row = conn
        .query_row(
            &format!("SELECT {STATE_COLUMNS} FROM memory_states m WHERE m.item_key = ?1"),
            params![item_key],
            |row| StateRow::from_row(row, 0),
        )
        .optional()?;

    row.map(StateRow::into_state).transpose()
}

fn save_state(conn: &Connection, state: &MemoryState) -> WordwiseResult<()> {
    conn.execute(
        "INSERT INTO memory_states
         (item_key, stability, difficulty, last_review_at, next_review_at,
          review_count, total_reviews, consecutive_correct, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
         ON CONFLICT(item_key) DO UPDATE SET
             stability = excluded.stability,
             difficulty = excluded.difficulty,
             last_review_at = excluded.last_review_at,
             next_review_at = excluded.next_review_at,
             review_count = excluded.review_count,
             total_reviews = excluded.total_reviews,
             consecutive_correct = excluded.consecutive_correct,
             updated_at = excluded.updated_at",
        params![
            state.item_key,
            state.stability,
            state.difficulty,
            state.last_review_at.map(format_timestamp),
            state.next_review_at.map(format_timestamp),
            state.review_count,
            state.total_reviews,
            state.consecutive_correct,
            format_timestamp(Utc::now()),
        ],
    )?;
    Ok(())
}

/// Raw memory state columns; timestamps are decoded outside the row callback
/// so a bad value surfaces as a corrupt-record error.
struct StateRow {
    item_key: String,
    stability: f64,
    difficulty: f64,
    last_review_at: Option<String>,
    next_review_at: Option<String>,
    review_count: u32,
    total_reviews: u32,
    consecutive_correct: u32,
}

impl StateRow {
    fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            item_key: row.get(offset)?,
            stability: row.get(offset + 1)?,
            difficulty: row.get(offset + 2)?,
            last_review_at: row.get(offset + 3)?,
            next_review_at: row.get(offset + 4)?,
            review_count: row.get(offset + 5)?,
            total_reviews: row.get(offset + 6)?,
            consecutive_correct: row.get(offset + 7)?,
        })
    }

    fn into_state(self) -> WordwiseResult<MemoryState> {
        let last_review_at = self
            .last_review_at
            .as_deref()
            .map(|raw| parse_timestamp(raw, &self.item_key))
            .transpose()?;
        let next_review_at = self
            .next_review_at
            .as_deref()
            .map(|raw| parse_timestamp(raw, &self.item_key))
            .transpose()?;

        Ok(MemoryState {
            item_key: self.item_key,
            stability: self.stability,
            difficulty: self.difficulty,
            last_review_at,
            next_review_at,
            review_count: self.review_count,
            total_reviews: self.total_reviews,
            consecutive_correct: self.consecutive_correct,
        })
    }
}
