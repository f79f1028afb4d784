//! Schemaless JSON collections on top of SQLite's JSON1 functions.
//!
//! Every document is one row of the `documents` table, tagged with its
//! collection name. Ids are assigned by the table and are unique across
//! collections. Filters and updates compile to `json_extract`, `json_each`,
//! `json_set` and friends, so all matching runs inside the engine.

use std::path::{Path, PathBuf};

use cadence_domain::{CadenceError, Result};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::errors::InfraError;

const DOCUMENTS_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    body TEXT NOT NULL CHECK (json_valid(body))
);
CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection, id);
";

/// A stored document with its assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Row id
    pub id: i64,
    /// Parsed JSON body
    pub body: Value,
}

/// Document selector. Field names address top-level keys.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document in the collection
    All,
    /// Documents with one of these ids
    Ids(Vec<i64>),
    /// `field` equals a scalar value
    Eq { field: String, value: Value },
    /// `field` equals one of the scalar values
    In { field: String, values: Vec<Value> },
    /// Array `field` holds a scalar value
    Contains { field: String, value: Value },
    /// Array `field` holds at least one of the scalar values
    ContainsAny { field: String, values: Vec<Value> },
    /// Every inner filter matches
    And(Vec<Filter>),
    /// At least one inner filter matches
    Or(Vec<Filter>),
}

impl Filter {
    /// Documents with one of `ids`.
    pub fn ids(ids: impl IntoIterator<Item = i64>) -> Self {
        Self::Ids(ids.into_iter().collect())
    }

    /// `field` equals `value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq { field: field.into(), value: value.into() }
    }

    /// `field` equals one of `values`.
    pub fn is_in<V: Into<Value>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::In { field: field.into(), values: values.into_iter().map(Into::into).collect() }
    }

    /// Array `field` holds `value`.
    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Contains { field: field.into(), value: value.into() }
    }

    /// Array `field` holds at least one of `values`.
    pub fn contains_any<V: Into<Value>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::ContainsAny {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// In-place document modification.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Overwrite (or add) top-level fields
    Set(Vec<(String, Value)>),
    /// Append a value to array `field`
    Push { field: String, value: Value },
    /// Remove every occurrence of a scalar value from array `field`
    Pull { field: String, value: Value },
    /// Remove every occurrence of any of the scalar values from array `field`
    PullAll { field: String, values: Vec<Value> },
}

impl Update {
    /// Set one field.
    pub fn set(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Set(vec![(field.into(), value.into())])
    }

    /// Append `value` to array `field`.
    pub fn push(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Push { field: field.into(), value: value.into() }
    }

    /// Remove `value` from array `field`.
    pub fn pull(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Pull { field: field.into(), value: value.into() }
    }

    /// Remove every one of `values` from array `field`.
    pub fn pull_all<V: Into<Value>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::PullAll { field: field.into(), values: values.into_iter().map(Into::into).collect() }
    }
}

/// SQLite file holding any number of document collections.
#[derive(Debug)]
pub struct DocumentDb {
    conn: Connection,
    path: PathBuf,
}

impl DocumentDb {
    /// Open or create the database at `path` in WAL mode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(map_sql_error)?;
        let _: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(map_sql_error)?;
        conn.pragma_update(None, "synchronous", "NORMAL").map_err(map_sql_error)?;
        conn.execute_batch(DOCUMENTS_SCHEMA).map_err(map_sql_error)?;

        info!(db_path = %path.display(), "document database opened");
        Ok(Self { conn, path })
    }

    /// Database file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Handle on a collection outside any explicit transaction; every call
    /// commits on its own.
    pub fn collection<'c>(&'c self, name: &'c str) -> Collection<'c> {
        Collection::on(&self.conn, name)
    }

    /// Run `f` in one transaction. The transaction rolls back when `f`
    /// returns an error.
    pub fn with_transaction<T>(&mut self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let tx = self.conn.transaction().map_err(map_sql_error)?;
        let value = f(&tx)?;
        tx.commit().map_err(map_sql_error)?;
        Ok(value)
    }

    /// Close the connection, reporting any pending error.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| map_sql_error(err))
    }
}

/// Operations on one named collection.
#[derive(Debug, Clone, Copy)]
pub struct Collection<'c> {
    conn: &'c Connection,
    name: &'c str,
}

impl<'c> Collection<'c> {
    /// Bind a collection to `conn`, which may be a transaction.
    pub fn on(conn: &'c Connection, name: &'c str) -> Self {
        Self { conn, name }
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Insert one document and return its id.
    pub fn insert_one<T: Serialize>(&self, document: &T) -> Result<i64> {
        let body = serde_json::to_string(document).map_err(map_json_error)?;
        self.conn
            .prepare_cached("INSERT INTO documents (collection, body) VALUES (?1, ?2)")
            .and_then(|mut stmt| stmt.execute(params![self.name, body]))
            .map_err(map_sql_error)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert `documents` in order and return their ids.
    pub fn insert_many<T: Serialize>(&self, documents: &[T]) -> Result<Vec<i64>> {
        documents.iter().map(|document| self.insert_one(document)).collect()
    }

    /// Document `id` of this collection.
    pub fn get(&self, id: i64) -> Result<Option<Value>> {
        let body: Option<String> = self
            .conn
            .prepare_cached("SELECT body FROM documents WHERE collection = ?1 AND id = ?2")
            .and_then(|mut stmt| {
                stmt.query_row(params![self.name, id], |row| row.get(0)).optional()
            })
            .map_err(map_sql_error)?;
        body.map(|body| parse_body(&body)).transpose()
    }

    /// Document `id` decoded into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, id: i64) -> Result<Option<T>> {
        self.get(id)?.map(decode).transpose()
    }

    /// Matching documents in id order.
    pub fn find(&self, filter: &Filter, limit: Option<usize>) -> Result<Vec<Document>> {
        let mut query = Query::new(self.name);
        let predicate = query.predicate(filter)?;
        query.bind(SqlValue::Integer(limit_value(limit)));

        let sql = format!(
            "SELECT id, body FROM documents WHERE collection = ? AND {predicate} ORDER BY id LIMIT ?"
        );
        let mut stmt = self.conn.prepare_cached(&sql).map_err(map_sql_error)?;
        let rows = stmt
            .query_map(params_from_iter(query.params), |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(map_sql_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_sql_error)?;

        rows.into_iter().map(|(id, body)| Ok(Document { id, body: parse_body(&body)? })).collect()
    }

    /// Matching documents decoded into `T`, paired with their ids.
    pub fn find_as<T: DeserializeOwned>(
        &self,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<(i64, T)>> {
        self.find(filter, limit)?
            .into_iter()
            .map(|document| Ok((document.id, decode(document.body)?)))
            .collect()
    }

    /// Ids of matching documents in id order.
    pub fn ids(&self, filter: &Filter, limit: Option<usize>) -> Result<Vec<i64>> {
        let mut query = Query::new(self.name);
        let predicate = query.predicate(filter)?;
        query.bind(SqlValue::Integer(limit_value(limit)));

        let sql = format!(
            "SELECT id FROM documents WHERE collection = ? AND {predicate} ORDER BY id LIMIT ?"
        );
        let mut stmt = self.conn.prepare_cached(&sql).map_err(map_sql_error)?;
        let ids = stmt
            .query_map(params_from_iter(query.params), |row| row.get(0))
            .map_err(map_sql_error)?
            .collect::<rusqlite::Result<Vec<i64>>>()
            .map_err(map_sql_error)?;
        Ok(ids)
    }

    /// Apply `update` to the first `limit` matching documents (all when
    /// `None`). Returns the number of documents rewritten.
    pub fn update_many(
        &self,
        filter: &Filter,
        update: &Update,
        limit: Option<usize>,
    ) -> Result<u64> {
        let mut query = Query::new_unbound();
        let expression = query.update_expression(update)?;
        query.bind(SqlValue::Text(self.name.to_string()));
        let predicate = query.predicate(filter)?;
        query.bind(SqlValue::Integer(limit_value(limit)));

        let sql = format!(
            "UPDATE documents SET body = {expression} WHERE id IN (
                SELECT id FROM documents WHERE collection = ? AND {predicate} ORDER BY id LIMIT ?
            )"
        );
        let changed = self
            .conn
            .prepare_cached(&sql)
            .and_then(|mut stmt| stmt.execute(params_from_iter(query.params)))
            .map_err(map_sql_error)?;
        Ok(changed as u64)
    }

    /// Delete the first `limit` matching documents (all when `None`).
    pub fn delete_many(&self, filter: &Filter, limit: Option<usize>) -> Result<u64> {
        let mut query = Query::new(self.name);
        let predicate = query.predicate(filter)?;
        query.bind(SqlValue::Integer(limit_value(limit)));

        let sql = format!(
            "DELETE FROM documents WHERE id IN (
                SELECT id FROM documents WHERE collection = ? AND {predicate} ORDER BY id LIMIT ?
            )"
        );
        let deleted = self
            .conn
            .prepare_cached(&sql)
            .and_then(|mut stmt| stmt.execute(params_from_iter(query.params)))
            .map_err(map_sql_error)?;
        Ok(deleted as u64)
    }

    /// Number of matching documents.
    pub fn count(&self, filter: &Filter) -> Result<u64> {
        let mut query = Query::new(self.name);
        let predicate = query.predicate(filter)?;

        let sql = format!("SELECT COUNT(*) FROM documents WHERE collection = ? AND {predicate}");
        let count: i64 = self
            .conn
            .prepare_cached(&sql)
            .and_then(|mut stmt| stmt.query_row(params_from_iter(query.params), |row| row.get(0)))
            .map_err(map_sql_error)?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// Remove `values` from array `field` of every document holding any of
    /// them. Returns the number of documents rewritten.
    pub fn pull_all(&self, field: &str, values: &[Value]) -> Result<u64> {
        if values.is_empty() {
            return Ok(0);
        }
        let holding = Filter::ContainsAny { field: field.to_string(), values: values.to_vec() };
        let update = Update::PullAll { field: field.to_string(), values: values.to_vec() };
        self.update_many(&holding, &update, None)
    }

    /// Total number of elements across array `field` of every document.
    pub fn sum_array_lengths(&self, field: &str) -> Result<u64> {
        let total: i64 = self
            .conn
            .prepare_cached(
                "SELECT COALESCE(SUM(json_array_length(body, ?2)), 0)
                 FROM documents WHERE collection = ?1",
            )
            .and_then(|mut stmt| {
                stmt.query_row(params![self.name, field_path(field)?], |row| row.get(0))
            })
            .map_err(map_sql_error)?;
        Ok(u64::try_from(total).unwrap_or_default())
    }
}

/// Positional parameters collected while compiling filters and updates.
struct Query {
    params: Vec<SqlValue>,
}

impl Query {
    fn new(collection: &str) -> Self {
        Self { params: vec![SqlValue::Text(collection.to_string())] }
    }

    fn new_unbound() -> Self {
        Self { params: Vec::new() }
    }

    fn bind(&mut self, value: SqlValue) {
        self.params.push(value);
    }

    fn predicate(&mut self, filter: &Filter) -> Result<String> {
        Ok(match filter {
            Filter::All => "1".to_string(),
            Filter::Ids(ids) => {
                self.bind(SqlValue::Text(json_text(ids)?));
                "documents.id IN (SELECT value FROM json_each(?))".to_string()
            }
            Filter::Eq { field, value } => {
                self.bind(SqlValue::Text(checked_path(field)?));
                self.bind(scalar(value)?);
                "json_extract(documents.body, ?) IS ?".to_string()
            }
            Filter::In { field, values } => {
                for value in values {
                    scalar(value)?;
                }
                self.bind(SqlValue::Text(checked_path(field)?));
                self.bind(SqlValue::Text(json_text(values)?));
                "json_extract(documents.body, ?) IN (SELECT value FROM json_each(?))".to_string()
            }
            Filter::Contains { field, value } => {
                self.bind(SqlValue::Text(checked_path(field)?));
                self.bind(scalar(value)?);
                "EXISTS (SELECT 1 FROM json_each(documents.body, ?) AS e WHERE e.value IS ?)"
                    .to_string()
            }
            Filter::ContainsAny { field, values } => {
                for value in values {
                    scalar(value)?;
                }
                // Bound once as an array; SQLite caps expression depth at 1000.
                self.bind(SqlValue::Text(checked_path(field)?));
                self.bind(SqlValue::Text(json_text(values)?));
                "EXISTS (SELECT 1 FROM json_each(documents.body, ?) AS e
                    WHERE e.value IN (SELECT value FROM json_each(?)))"
                    .to_string()
            }
            Filter::And(filters) => self.combine(filters, " AND ", "1")?,
            Filter::Or(filters) => self.combine(filters, " OR ", "0")?,
        })
    }

    fn combine(&mut self, filters: &[Filter], joiner: &str, empty: &str) -> Result<String> {
        if filters.is_empty() {
            return Ok(empty.to_string());
        }
        let parts = filters
            .iter()
            .map(|inner| self.predicate(inner).map(|part| format!("({part})")))
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.join(joiner))
    }

    fn update_expression(&mut self, update: &Update) -> Result<String> {
        match update {
            Update::Set(fields) => {
                if fields.is_empty() {
                    return Err(CadenceError::InvalidInput("empty $set update".into()));
                }
                let mut expression = String::from("json_set(body");
                for (field, value) in fields {
                    self.bind(SqlValue::Text(checked_path(field)?));
                    self.bind(SqlValue::Text(json_text(value)?));
                    expression.push_str(", ?, json(?)");
                }
                expression.push(')');
                Ok(expression)
            }
            Update::Push { field, value } => {
                self.bind(SqlValue::Text(format!("{}[#]", checked_path(field)?)));
                self.bind(SqlValue::Text(json_text(value)?));
                Ok("json_insert(body, ?, json(?))".to_string())
            }
            Update::Pull { field, value } => {
                let path = checked_path(field)?;
                self.bind(SqlValue::Text(path.clone()));
                self.bind(SqlValue::Text(path));
                self.bind(scalar(value)?);
                Ok("json_set(body, ?, json((
                    SELECT json_group_array(
                        CASE WHEN e.type IN ('object', 'array') THEN json(e.value) ELSE e.value END
                    )
                    FROM json_each(documents.body, ?) AS e
                    WHERE e.value IS NOT ?
                )))"
                .to_string())
            }
            Update::PullAll { field, values } => {
                for value in values {
                    scalar(value)?;
                }
                let path = checked_path(field)?;
                self.bind(SqlValue::Text(path.clone()));
                self.bind(SqlValue::Text(path));
                self.bind(SqlValue::Text(json_text(values)?));
                Ok("json_set(body, ?, json((
                    SELECT json_group_array(
                        CASE WHEN e.type IN ('object', 'array') THEN json(e.value) ELSE e.value END
                    )
                    FROM json_each(documents.body, ?) AS e
                    WHERE e.value NOT IN (SELECT value FROM json_each(?))
                )))"
                .to_string())
            }
        }
    }
}

/// `$.field` for a plain top-level key.
fn checked_path(field: &str) -> Result<String> {
    field_path(field)
        .map_err(|_| CadenceError::InvalidInput(format!("invalid field name '{field}'")))
}

fn field_path(field: &str) -> rusqlite::Result<String> {
    let valid = !field.is_empty() && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(format!("$.{field}"))
    } else {
        Err(rusqlite::Error::InvalidParameterName(field.to_string()))
    }
}

fn scalar(value: &Value) -> Result<SqlValue> {
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Bool(flag) => Ok(SqlValue::Integer(i64::from(*flag))),
        Value::Number(number) => number
            .as_i64()
            .map(SqlValue::Integer)
            .or_else(|| number.as_f64().map(SqlValue::Real))
            .ok_or_else(|| CadenceError::InvalidInput(format!("unsupported number {number}"))),
        Value::String(text) => Ok(SqlValue::Text(text.clone())),
        Value::Array(_) | Value::Object(_) => {
            Err(CadenceError::InvalidInput("filters only compare scalar values".into()))
        }
    }
}

fn json_text<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(map_json_error)
}

fn parse_body(body: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(map_json_error)
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(map_json_error)
}

fn limit_value(limit: Option<usize>) -> i64 {
    limit.map_or(-1, |limit| i64::try_from(limit).unwrap_or(i64::MAX))
}

fn map_sql_error(err: rusqlite::Error) -> CadenceError {
    CadenceError::from(InfraError::from(err))
}

fn map_json_error(err: serde_json::Error) -> CadenceError {
    CadenceError::from(InfraError::from(err))
}
