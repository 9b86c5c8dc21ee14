//! Statement text for the gateway operations.
//!
//! Identifiers are interpolated only after `Table::check_column`; values are
//! always placeholders.

use crate::error::StorageError;
use crate::schema::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    fn placeholder(self, n: usize) -> String {
        match self {
            Self::Postgres => format!("${n}"),
            Self::Sqlite => "?".to_owned(),
        }
    }
}

fn where_clause(dialect: Dialect, table: Table, columns: &[&str]) -> Result<String, StorageError> {
    if columns.is_empty() {
        return Err(StorageError::ArityMismatch { table, columns: 0, values: 0 });
    }
    let mut predicates = Vec::with_capacity(columns.len());
    for (i, column) in columns.iter().enumerate() {
        table.check_column(column)?;
        predicates.push(format!("{column} = {}", dialect.placeholder(i + 1)));
    }
    Ok(predicates.join(" AND "))
}

pub(crate) fn exists_sql(
    dialect: Dialect,
    table: Table,
    columns: &[&str],
) -> Result<String, StorageError> {
    let predicate = where_clause(dialect, table, columns)?;
    Ok(format!("SELECT 1 FROM {} WHERE {predicate} LIMIT 1", table.name()))
}

pub(crate) fn find_id_sql(
    dialect: Dialect,
    table: Table,
    column: &str,
) -> Result<String, StorageError> {
    let predicate = where_clause(dialect, table, &[column])?;
    Ok(format!("SELECT id FROM {} WHERE {predicate} ORDER BY id LIMIT 1", table.name()))
}

/// `INSERT` statement; PostgreSQL variant returns the row id.
pub(crate) fn insert_sql(
    dialect: Dialect,
    table: Table,
    columns: &[&str],
    values: usize,
) -> Result<String, StorageError> {
    if columns.is_empty() || columns.len() != values {
        return Err(StorageError::ArityMismatch { table, columns: columns.len(), values });
    }
    for column in columns {
        table.check_column(column)?;
    }
    let placeholders: Vec<String> = (1..=columns.len()).map(|n| dialect.placeholder(n)).collect();
    let returning = match dialect {
        Dialect::Postgres => " RETURNING id",
        Dialect::Sqlite => "",
    };
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({}){returning}",
        table.name(),
        columns.join(", "),
        placeholders.join(", ")
    ))
}

pub(crate) fn count_sql(table: Table) -> String {
    format!("SELECT COUNT(*) AS n FROM {}", table.name())
}

pub(crate) const MODEL_CATEGORIES_SQL: &str = "SELECT id, categories FROM models ORDER BY id";
