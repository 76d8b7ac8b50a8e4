//! Storage engine
//!
//! One relation lives in one backing file, `<table>.csv`, under a working
//! directory validated at construction. There is no in-memory cache: every
//! operation reloads the relation from its file, and every mutation
//! rewrites the file as a whole. That full read-then-rewrite cycle is the
//! engine's durability and concurrency boundary; concurrent writers are
//! out of scope.

use std::path::PathBuf;

use indexmap::IndexMap;
use tracing::debug;

use super::table::{Relation, Row};
use super::value::Value;
use crate::error::{Error, Result};

/// The persistent mapping from table name to relation
pub struct Storage {
    working_dir: PathBuf,
}

impl Storage {
    /// Create a storage engine rooted at `working_dir`.
    ///
    /// The directory must already exist: its absence is a configuration
    /// error raised here, once, not a per-operation error.
    pub fn new(working_dir: impl Into<PathBuf>) -> Result<Self> {
        let working_dir = working_dir.into();
        if !working_dir.is_dir() {
            return Err(Error::WorkingDirNotFound(
                working_dir.display().to_string(),
            ));
        }
        Ok(Self { working_dir })
    }

    /// Backing file for a table name
    fn path(&self, name: &str) -> PathBuf {
        self.working_dir.join(format!("{}.csv", name))
    }

    /// Check whether a table's backing file exists
    fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    /// Reload a table from its backing file
    fn load(&self, name: &str) -> Result<Relation> {
        if !self.exists(name) {
            return Err(Error::TableNotFound(name.to_string()));
        }
        Relation::load(name, &self.path(name))
    }

    /// Create a table with the schema `[primary_key] + columns` and zero
    /// rows. Returns false, without mutating anything, when the name is
    /// already taken; that is not an error.
    pub fn create(&self, name: &str, primary_key: &str, columns: &[String]) -> Result<bool> {
        if self.exists(name) {
            debug!(table = name, "create skipped, table already exists");
            return Ok(false);
        }
        Relation::new(primary_key, columns.to_vec()).save(&self.path(name))?;
        debug!(table = name, primary_key, "table created");
        Ok(true)
    }

    /// The ordered schema of a table, primary key first
    pub fn describe(&self, name: &str) -> Result<Vec<String>> {
        Ok(self.load(name)?.schema())
    }

    /// Append one row built from `assignments` and rewrite the backing
    /// file.
    ///
    /// Every assignment column must be part of the schema, the primary key
    /// must be assigned, non-empty and distinct from every existing key.
    /// All checks run before the rewrite, so a failed insert leaves the
    /// file byte-for-byte as it was. Columns without an assignment are
    /// stored as empty text.
    pub fn insert(&self, name: &str, assignments: &[(String, Value)]) -> Result<()> {
        let mut relation = self.load(name)?;

        let mut given: IndexMap<&str, &Value> = IndexMap::new();
        for (column, value) in assignments {
            if !relation.column_exists(column) {
                return Err(Error::UnknownColumn(name.to_string(), column.clone()));
            }
            given.insert(column.as_str(), value);
        }

        let key = *given
            .get(relation.primary_key())
            .ok_or_else(|| Error::MissingPrimaryKey(relation.primary_key().to_string()))?;
        if key.is_empty() {
            return Err(Error::EmptyPrimaryKey);
        }
        if relation
            .rows()
            .iter()
            .any(|row| &row[relation.primary_key()] == key)
        {
            return Err(Error::DuplicatePrimaryKey(key.to_string()));
        }

        let row: Row = relation
            .schema()
            .into_iter()
            .map(|column| {
                let value = given
                    .get(column.as_str())
                    .map(|value| (*value).clone())
                    .unwrap_or_else(|| Value::Text(String::new()));
                (column, value)
            })
            .collect();

        relation.insert_row(row);
        relation.save(&self.path(name))?;
        debug!(table = name, rows = relation.rows().len(), "row inserted");
        Ok(())
    }

    /// Evaluate a query: validate every named column against the schema,
    /// then delegate to the relation's filter/order/project/limit pipeline.
    pub fn select(
        &self,
        name: &str,
        result_columns: &[String],
        conditions: &[(String, Value)],
        order: Option<(&str, bool)>,
        limit: Option<u64>,
    ) -> Result<Vec<Vec<Value>>> {
        let relation = self.load(name)?;

        for column in result_columns {
            if !relation.column_exists(column) {
                return Err(Error::UnknownColumn(name.to_string(), column.clone()));
            }
        }
        for (column, _) in conditions {
            if !relation.column_exists(column) {
                return Err(Error::UnknownColumn(name.to_string(), column.clone()));
            }
        }
        if let Some((column, _)) = order {
            if !relation.column_exists(column) {
                return Err(Error::UnknownColumn(name.to_string(), column.to_string()));
            }
        }

        let rows = relation.select(result_columns, conditions, order, limit);
        debug!(table = name, rows = rows.len(), "select evaluated");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_missing_working_dir() {
        let result = Storage::new("no/such/dir");
        assert!(matches!(result, Err(Error::WorkingDirNotFound(_))));
    }

    #[test]
    fn test_create_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();

        assert!(storage.create("foobar", "uid", &[]).unwrap());
        assert!(!storage.create("foobar", "uid", &[]).unwrap());

        // The second call must not have clobbered the schema.
        let storage_schema = storage.describe("foobar").unwrap();
        assert_eq!(storage_schema, vec!["uid"]);
    }

    #[test]
    fn test_describe_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();

        assert!(matches!(
            storage.describe("foobar"),
            Err(Error::TableNotFound(name)) if name == "foobar"
        ));
    }

    #[test]
    fn test_describe_returns_schema_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();

        storage
            .create("foobar", "uid", &columns(&["foo", "bar"]))
            .unwrap();
        assert_eq!(storage.describe("foobar").unwrap(), vec!["uid", "foo", "bar"]);
    }

    #[test]
    fn test_insert_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();

        let result = storage.insert("foobar", &[("a".to_string(), Value::Integer(1))]);
        assert!(matches!(result, Err(Error::TableNotFound(_))));
    }

    #[test]
    fn test_insert_unknown_column() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();
        storage
            .create("foobar", "uid", &columns(&["foo", "bar"]))
            .unwrap();

        let result = storage.insert("foobar", &[("a".to_string(), Value::Integer(1))]);
        assert!(matches!(
            result,
            Err(Error::UnknownColumn(table, column)) if table == "foobar" && column == "a"
        ));
    }

    #[test]
    fn test_insert_requires_primary_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();
        storage
            .create("foobar", "uid", &columns(&["foo", "bar"]))
            .unwrap();

        let result = storage.insert(
            "foobar",
            &[
                ("foo".to_string(), Value::Integer(1)),
                ("bar".to_string(), Value::Integer(1)),
            ],
        );
        assert!(matches!(
            result,
            Err(Error::MissingPrimaryKey(key)) if key == "uid"
        ));
    }

    #[test]
    fn test_insert_rejects_empty_primary_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();
        storage.create("foobar", "uid", &columns(&["foo"])).unwrap();

        let result = storage.insert(
            "foobar",
            &[
                ("uid".to_string(), Value::Text(String::new())),
                ("foo".to_string(), Value::Integer(1)),
            ],
        );
        assert!(matches!(result, Err(Error::EmptyPrimaryKey)));
    }

    #[test]
    fn test_insert_rejects_duplicate_primary_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();
        storage.create("foobar", "uid", &columns(&["foo"])).unwrap();

        storage
            .insert(
                "foobar",
                &[
                    ("uid".to_string(), Value::Integer(1)),
                    ("foo".to_string(), Value::Integer(1)),
                ],
            )
            .unwrap();

        let result = storage.insert("foobar", &[("uid".to_string(), Value::Integer(1))]);
        assert!(matches!(
            result,
            Err(Error::DuplicatePrimaryKey(key)) if key == "1"
        ));

        // The failed insert must not be observable.
        let rows = storage
            .select("foobar", &columns(&["uid"]), &[], None, None)
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_insert_fills_omitted_columns_with_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();
        storage
            .create("foobar", "uid", &columns(&["foo", "bar"]))
            .unwrap();

        storage
            .insert(
                "foobar",
                &[
                    ("uid".to_string(), Value::Integer(1)),
                    ("bar".to_string(), Value::Integer(7)),
                ],
            )
            .unwrap();

        let rows = storage
            .select("foobar", &columns(&["uid", "foo", "bar"]), &[], None, None)
            .unwrap();
        assert_eq!(
            rows,
            vec![vec![
                Value::Integer(1),
                Value::Text(String::new()),
                Value::Integer(7),
            ]]
        );
    }

    #[test]
    fn test_select_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();

        let result = storage.select("foobar", &columns(&["uid"]), &[], None, None);
        assert!(matches!(result, Err(Error::TableNotFound(_))));
    }

    #[test]
    fn test_select_validates_every_column_position() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path()).unwrap();
        storage.create("foobar", "uid", &columns(&["foo"])).unwrap();

        // Projection.
        let result = storage.select("foobar", &columns(&["a"]), &[], None, None);
        assert!(matches!(result, Err(Error::UnknownColumn(..))));

        // Where.
        let result = storage.select(
            "foobar",
            &columns(&["uid"]),
            &[("a".to_string(), Value::Integer(1))],
            None,
            None,
        );
        assert!(matches!(result, Err(Error::UnknownColumn(..))));

        // Order.
        let result = storage.select("foobar", &columns(&["uid"]), &[], Some(("a", true)), None);
        assert!(matches!(result, Err(Error::UnknownColumn(..))));
    }
}
