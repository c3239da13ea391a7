//! Reads the live schema of a SQLite database.
//!
//! Tables come from `sqlite_master`, everything else from the `PRAGMA`
//! table-valued functions. Indexes SQLite creates on its own for PRIMARY KEY
//! and UNIQUE constraints are left out, as are SQLite's internal tables.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use sqlx::sqlite::SqliteConnection;
use tracing::debug;

use dbschema_core::builder::SchemaBuilder;
use dbschema_core::error::DbError;
use dbschema_core::platform::{Platform, SqlitePlatform};
use dbschema_core::schema::{
    Column, DefaultValue, ForeignKey, ForeignKeyAction, Index, Schema, Table,
};

const LIST_TABLES_SQL: &str = "SELECT name, sql FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' ORDER BY name";

static STRING_LITERAL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"'(?:[^']|'')*'").ok());

// AUTOINCREMENT is only accepted right after the column's PRIMARY KEY clause.
static AUTOINCREMENT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bPRIMARY\s+KEY\s+(?:(?:ASC|DESC)\s+)?(?:ON\s+CONFLICT\s+\w+\s+)?AUTOINCREMENT\b",
    )
    .ok()
});

/// `PRAGMA table_info`: cid, name, type, notnull, dflt_value, pk.
type ColumnRow = (i64, String, String, i64, Option<String>, i64);
/// `PRAGMA index_list`: seq, name, unique, origin, partial.
type IndexRow = (i64, String, i64, String, i64);
/// `PRAGMA index_info`: seqno, cid, name.
type IndexColumnRow = (i64, i64, Option<String>);
/// `PRAGMA foreign_key_list`: id, seq, table, from, to, on_update, on_delete, match.
type ForeignKeyRow = (i64, i64, String, String, Option<String>, String, String, String);

/// Lists user tables, ordered by name.
pub async fn table_names(conn: &mut SqliteConnection) -> Result<Vec<String>, DbError> {
    Ok(list_tables(conn)
        .await?
        .into_iter()
        .map(|(name, _)| name)
        .collect())
}

/// Reads every user table with its columns, primary key, indexes and
/// foreign keys.
pub async fn read_schema(
    conn: &mut SqliteConnection,
    platform: &SqlitePlatform,
) -> Result<Schema, DbError> {
    let mut tables = Vec::new();
    for (name, sql) in list_tables(conn).await? {
        let autoincrement = sql.as_deref().is_some_and(declares_autoincrement);
        let mut table = read_columns(conn, platform, &name, autoincrement).await?;
        table.indexes = read_indexes(conn, &name).await?;
        table.foreign_keys = read_foreign_keys(conn, &name).await?;
        tables.push(table);
    }

    resolve_implicit_references(&mut tables);

    let mut builder = SchemaBuilder::new();
    for table in tables {
        builder.add_table(table).map_err(DbError::driver)?;
    }
    let schema = builder.build();
    debug!(tables = schema.table_names().len(), "Introspected schema");
    Ok(schema)
}

async fn list_tables(
    conn: &mut SqliteConnection,
) -> Result<Vec<(String, Option<String>)>, DbError> {
    sqlx::query_as(LIST_TABLES_SQL)
        .fetch_all(conn)
        .await
        .map_err(DbError::driver)
}

async fn read_columns(
    conn: &mut SqliteConnection,
    platform: &SqlitePlatform,
    table: &str,
    autoincrement: bool,
) -> Result<Table, DbError> {
    let rows: Vec<ColumnRow> = sqlx::query_as(&format!("PRAGMA table_info({})", literal(table)))
        .fetch_all(conn)
        .await
        .map_err(DbError::driver)?;

    let mut result = Table::new(table);
    let mut primary_key = Vec::new();

    for (_, name, declared, not_null, default, pk) in rows {
        let mut column = Column::new(&name, platform.parse_native_type(&declared));
        column.nullable = not_null == 0 && pk == 0;
        column.default = default.as_deref().map(DefaultValue::from_sql);
        if pk > 0 {
            primary_key.push((pk, name));
        }
        result.columns.push(column);
    }

    primary_key.sort();
    result.primary_key = primary_key.into_iter().map(|(_, name)| name).collect();

    // Only a lone INTEGER PRIMARY KEY can carry AUTOINCREMENT.
    if autoincrement {
        if let [only] = result.primary_key.as_slice() {
            let only = only.clone();
            if let Some(column) = result.columns.iter_mut().find(|c| c.name == only) {
                column.auto_increment = column.sql_type.is_integer();
            }
        }
    }

    Ok(result)
}

async fn read_indexes(conn: &mut SqliteConnection, table: &str) -> Result<Vec<Index>, DbError> {
    let rows: Vec<IndexRow> = sqlx::query_as(&format!("PRAGMA index_list({})", literal(table)))
        .fetch_all(&mut *conn)
        .await
        .map_err(DbError::driver)?;

    let mut indexes = Vec::new();
    for (_, name, unique, origin, _) in rows {
        if origin != "c" || name.starts_with("sqlite_autoindex_") {
            continue;
        }

        let mut columns: Vec<IndexColumnRow> =
            sqlx::query_as(&format!("PRAGMA index_info({})", literal(&name)))
                .fetch_all(&mut *conn)
                .await
                .map_err(DbError::driver)?;
        columns.sort_by_key(|(seqno, _, _)| *seqno);

        // Expression indexes have no column names and cannot be modeled.
        let Some(columns) = columns
            .into_iter()
            .map(|(_, _, column)| column)
            .collect::<Option<Vec<_>>>()
        else {
            debug!(table, index = %name, "Skipping expression index");
            continue;
        };

        indexes.push(Index {
            name,
            columns,
            unique: unique != 0,
        });
    }

    indexes.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(indexes)
}

async fn read_foreign_keys(
    conn: &mut SqliteConnection,
    table: &str,
) -> Result<Vec<ForeignKey>, DbError> {
    let rows: Vec<ForeignKeyRow> =
        sqlx::query_as(&format!("PRAGMA foreign_key_list({})", literal(table)))
            .fetch_all(conn)
            .await
            .map_err(DbError::driver)?;

    // SQLite does not keep constraint names; the id is stable per table.
    let mut grouped: BTreeMap<i64, Vec<ForeignKeyRow>> = BTreeMap::new();
    for row in rows {
        grouped.entry(row.0).or_default().push(row);
    }

    let mut foreign_keys = Vec::new();
    for (id, mut rows) in grouped {
        rows.sort_by_key(|row| row.1);
        let Some(first) = rows.first() else {
            continue;
        };
        let on_update = ForeignKeyAction::from_sql(&first.5);
        let on_delete = ForeignKeyAction::from_sql(&first.6);
        let referenced_table = first.2.clone();

        let columns: Vec<String> = rows.iter().map(|row| row.3.clone()).collect();
        // Empty when the key implicitly references the primary key.
        let referenced_columns: Vec<String> =
            rows.iter().filter_map(|row| row.4.clone()).collect();

        foreign_keys.push(ForeignKey {
            name: format!("fk_{table}_{id}"),
            columns,
            referenced_table,
            referenced_columns,
            on_delete,
            on_update,
        });
    }

    Ok(foreign_keys)
}

/// Fills in referenced columns of keys declared as `REFERENCES parent`
/// without a column list.
fn resolve_implicit_references(tables: &mut [Table]) {
    let primary_keys: BTreeMap<String, Vec<String>> = tables
        .iter()
        .map(|t| (t.name.to_ascii_lowercase(), t.primary_key.clone()))
        .collect();

    for table in tables.iter_mut() {
        for fk in &mut table.foreign_keys {
            if fk.referenced_columns.len() < fk.columns.len() {
                if let Some(pk) = primary_keys.get(&fk.referenced_table.to_ascii_lowercase()) {
                    fk.referenced_columns.clone_from(pk);
                }
            }
        }
    }
}

/// Returns whether a `CREATE TABLE` statement declares an AUTOINCREMENT
/// primary key, ignoring string literals.
fn declares_autoincrement(sql: &str) -> bool {
    let stripped = match STRING_LITERAL.as_ref() {
        Some(re) => re.replace_all(sql, "''"),
        None => sql.into(),
    };
    AUTOINCREMENT
        .as_ref()
        .is_some_and(|re| re.is_match(&stripped))
}

fn literal(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}
