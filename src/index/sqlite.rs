//! SQLite-backed attribute index
//!
//! Every value reaches SQLite as a bound parameter. Word sets (candidate
//! lists, `IN` lists) travel as one JSON array expanded with `json_each`.

use crate::error::{LexiconError, Result};
use crate::index::AttributeIndex;
use crate::index::types::{IndexQuery, Predicate, WordInfo};
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, Row, params, params_from_iter};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS words (
    word TEXT PRIMARY KEY,
    length INTEGER NOT NULL,
    probability_order INTEGER NOT NULL,
    min_probability_order INTEGER NOT NULL,
    max_probability_order INTEGER NOT NULL,
    num_vowels INTEGER NOT NULL,
    num_unique_letters INTEGER NOT NULL,
    num_anagrams INTEGER NOT NULL,
    point_value INTEGER NOT NULL,
    front_hooks TEXT NOT NULL,
    back_hooks TEXT NOT NULL,
    is_front_hook INTEGER NOT NULL,
    is_back_hook INTEGER NOT NULL,
    lexicon_symbols TEXT NOT NULL,
    definition TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS words_length ON words(length);
CREATE INDEX IF NOT EXISTS words_probability ON words(length, probability_order);
";

const INFO_COLUMNS: &str = "word, length, probability_order, min_probability_order, \
     max_probability_order, num_vowels, num_unique_letters, num_anagrams, point_value, \
     front_hooks, back_hooks, is_front_hook, is_back_hook, lexicon_symbols, definition";

/// Attribute index stored in a SQLite database
pub struct SqliteIndex {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for SqliteIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteIndex").field("path", &self.path).finish()
    }
}

impl SqliteIndex {
    /// Open an existing database read-only
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            LexiconError::IndexUnavailable(format!("{}: {}", path.display(), e))
        })?;

        let has_words: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'words')",
            [],
            |row| row.get(0),
        )?;
        if !has_words {
            return Err(LexiconError::IndexUnavailable(format!(
                "{}: no words table",
                path.display()
            )));
        }

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Create (or reuse) a database file with the `words` schema
    pub fn create(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Empty in-memory index, mostly for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert or replace rows in one transaction
    pub fn insert(&self, infos: &[WordInfo]) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT OR REPLACE INTO words ({}) VALUES \
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                INFO_COLUMNS
            ))?;
            for info in infos {
                stmt.execute(params![
                    info.word,
                    info.length,
                    info.probability_order,
                    info.min_probability_order,
                    info.max_probability_order,
                    info.num_vowels,
                    info.num_unique_letters,
                    info.num_anagrams,
                    info.point_value,
                    info.front_hooks,
                    info.back_hooks,
                    info.is_front_hook,
                    info.is_back_hook,
                    info.lexicon_symbols,
                    info.definition,
                ])?;
            }
        }
        tx.commit()?;
        debug!(rows = infos.len(), "inserted attribute rows");
        Ok(())
    }

    /// Number of rows in the `words` table
    pub fn len(&self) -> Result<usize> {
        let conn = self.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl AttributeIndex for SqliteIndex {
    fn search(&self, query: &IndexQuery, candidates: Option<&[String]>) -> Result<Vec<String>> {
        let mut sql = String::from("SELECT word FROM words WHERE 1");
        let mut values: Vec<Value> = Vec::new();

        for predicate in &query.predicates {
            sql.push_str(" AND ");
            render(predicate, &mut sql, &mut values)?;
        }

        if let Some(words) = candidates {
            let upper: Vec<String> = words.iter().map(|w| w.to_ascii_uppercase()).collect();
            sql.push_str(" AND word IN (SELECT value FROM json_each(?))");
            values.push(Value::Text(json_array(&upper)?));
        }
        sql.push_str(" ORDER BY word");

        debug!(%sql, params = values.len(), "attribute index search");

        let conn = self.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), |row| row.get::<_, String>(0))?;
        let mut words = Vec::new();
        for row in rows {
            words.push(row?);
        }
        Ok(words)
    }

    fn word_infos(&self, words: &[String]) -> Result<Vec<WordInfo>> {
        if words.is_empty() {
            return Ok(Vec::new());
        }
        let upper: Vec<String> = words.iter().map(|w| w.to_ascii_uppercase()).collect();
        let sql = format!(
            "SELECT {} FROM words WHERE word IN (SELECT value FROM json_each(?1))",
            INFO_COLUMNS
        );

        let conn = self.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([json_array(&upper)?], read_info)?;
        let mut infos = Vec::new();
        for row in rows {
            infos.push(row?);
        }
        Ok(infos)
    }
}

fn read_info(row: &Row<'_>) -> rusqlite::Result<WordInfo> {
    Ok(WordInfo {
        word: row.get(0)?,
        length: row.get(1)?,
        probability_order: row.get(2)?,
        min_probability_order: row.get(3)?,
        max_probability_order: row.get(4)?,
        num_vowels: row.get(5)?,
        num_unique_letters: row.get(6)?,
        num_anagrams: row.get(7)?,
        point_value: row.get(8)?,
        front_hooks: row.get(9)?,
        back_hooks: row.get(10)?,
        is_front_hook: row.get(11)?,
        is_back_hook: row.get(12)?,
        lexicon_symbols: row.get(13)?,
        definition: row.get(14)?,
    })
}

fn json_array(words: &[String]) -> Result<String> {
    serde_json::to_string(words).map_err(|e| LexiconError::IndexUnavailable(e.to_string()))
}

/// Append the SQL for one predicate, pushing its parameters
fn render(predicate: &Predicate, sql: &mut String, values: &mut Vec<Value>) -> Result<()> {
    match predicate {
        Predicate::Range { column, range } => {
            let name = column.name();
            if range.min == range.max {
                sql.push_str(&format!("{} = ?", name));
                values.push(Value::Integer(range.min.into()));
            } else if range.max == u32::MAX {
                sql.push_str(&format!("{} >= ?", name));
                values.push(Value::Integer(range.min.into()));
            } else {
                sql.push_str(&format!("({0} >= ? AND {0} <= ?)", name));
                values.push(Value::Integer(range.min.into()));
                values.push(Value::Integer(range.max.into()));
            }
        }
        Predicate::Like {
            column,
            pattern,
            negated,
        } => {
            let not = if *negated { "NOT " } else { "" };
            sql.push_str(&format!("{} {}LIKE ? ESCAPE '\\'", column.name(), not));
            values.push(Value::Text(pattern.clone()));
        }
        Predicate::Flag { column, value } => {
            sql.push_str(&format!("{} = ?", column.name()));
            values.push(Value::Integer(i64::from(*value)));
        }
        Predicate::InList {
            column,
            values: list,
            negated,
        } => {
            let not = if *negated { "NOT " } else { "" };
            sql.push_str(&format!(
                "{} {}IN (SELECT value FROM json_each(?))",
                column.name(),
                not
            ));
            values.push(Value::Text(json_array(list)?));
        }
        Predicate::Any(options) => {
            if options.is_empty() {
                sql.push('0');
                return Ok(());
            }
            sql.push('(');
            for (i, option) in options.iter().enumerate() {
                if i > 0 {
                    sql.push_str(" OR ");
                }
                render(option, sql, values)?;
            }
            sql.push(')');
        }
        Predicate::Not(inner) => {
            sql.push_str("NOT (");
            render(inner, sql, values)?;
            sql.push(')');
        }
    }
    Ok(())
}
