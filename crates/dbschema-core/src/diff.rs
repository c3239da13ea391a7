//! Schema diff engine.
//!
//! Compares a `current` [`Schema`] (usually introspected from the live
//! database) with a `desired` one and produces an ordered [`ChangeSet`]
//! transforming the former into the latter.
//!
//! The order is fixed by category so that referential integrity holds at
//! every step:
//!
//! 1. foreign keys and indexes that go away are dropped first,
//! 2. sequences and new tables (without foreign keys) are created,
//! 3. columns are added, changed and dropped, then primary keys replaced,
//! 4. new indexes are created and obsolete tables dropped,
//! 5. new foreign keys are added last, so references between new tables
//!    resolve regardless of declaration order. Platforms declaring foreign
//!    keys inline create new tables together with their foreign keys.
//!
//! Inside a category, operations are sorted by table name, then by member
//! name. Renames are never inferred: a renamed column shows up as a drop
//! plus an add.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Result, SchemaError, ValidationError};
use crate::operations::{ChangeOperation, ColumnProperty};
use crate::platform::{NameCase, Platform};
use crate::schema::{Column, ForeignKey, Index, Schema, Table};

// ================================================================
// Change sets
// ================================================================

/// An ordered list of schema changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    operations: Vec<ChangeOperation>,
}

impl ChangeSet {
    /// Returns `true` if there is nothing to change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Number of operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// The operations, in application order.
    #[must_use]
    pub fn operations(&self) -> &[ChangeOperation] {
        &self.operations
    }

    /// Iterates the operations in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, ChangeOperation> {
        self.operations.iter()
    }

    /// Consumes the change set.
    #[must_use]
    pub fn into_operations(self) -> Vec<ChangeOperation> {
        self.operations
    }
}

impl IntoIterator for ChangeSet {
    type Item = ChangeOperation;
    type IntoIter = std::vec::IntoIter<ChangeOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a ChangeOperation;
    type IntoIter = std::slice::Iter<'a, ChangeOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

// ================================================================
// Ordering
// ================================================================

/// Application order of operation categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    DropForeignKey,
    DropIndex,
    DropSequence,
    RenameTable,
    CreateSequence,
    CreateTable,
    RenameColumn,
    AddColumn,
    ModifyColumn,
    DropColumn,
    DropPrimaryKey,
    AddPrimaryKey,
    AddIndex,
    DropTable,
    AddForeignKey,
}

impl Phase {
    const fn of(operation: &ChangeOperation) -> Self {
        match operation {
            ChangeOperation::DropForeignKey { .. } => Self::DropForeignKey,
            ChangeOperation::DropIndex { .. } => Self::DropIndex,
            ChangeOperation::DropSequence { .. } => Self::DropSequence,
            ChangeOperation::RenameTable { .. } => Self::RenameTable,
            ChangeOperation::CreateSequence { .. } => Self::CreateSequence,
            ChangeOperation::CreateTable { .. } => Self::CreateTable,
            ChangeOperation::RenameColumn { .. } => Self::RenameColumn,
            ChangeOperation::AddColumn { .. } => Self::AddColumn,
            ChangeOperation::ModifyColumn { .. } => Self::ModifyColumn,
            ChangeOperation::DropColumn { .. } => Self::DropColumn,
            ChangeOperation::DropPrimaryKey { .. } => Self::DropPrimaryKey,
            ChangeOperation::AddPrimaryKey { .. } => Self::AddPrimaryKey,
            ChangeOperation::AddIndex { .. } => Self::AddIndex,
            ChangeOperation::DropTable { .. } => Self::DropTable,
            ChangeOperation::AddForeignKey { .. } => Self::AddForeignKey,
        }
    }
}

/// Collects operations and sorts them into application order.
struct Plan {
    case: NameCase,
    entries: Vec<(Phase, String, String, ChangeOperation)>,
}

impl Plan {
    const fn new(case: NameCase) -> Self {
        Self {
            case,
            entries: Vec::new(),
        }
    }

    fn push(&mut self, operation: ChangeOperation) {
        let phase = Phase::of(&operation);
        let table = self.case.key(operation.subject());
        let member = self.case.key(operation.member());
        self.entries.push((phase, table, member, operation));
    }

    fn finish(mut self) -> ChangeSet {
        self.entries
            .sort_by(|a, b| (a.0, &a.1, &a.2).cmp(&(b.0, &b.1, &b.2)));
        ChangeSet {
            operations: self.entries.into_iter().map(|(_, _, _, op)| op).collect(),
        }
    }
}

// ================================================================
// Comparator
// ================================================================

/// Computes change sets between two schemas.
///
/// Names are matched with the platform's [`NameCase`] policy and column
/// definitions are compared in the platform's rendered form, so a schema
/// introspected from a database compares equal to the definition it was
/// created from.
pub struct Comparator<'p> {
    platform: &'p dyn Platform,
}

impl<'p> Comparator<'p> {
    /// Creates a comparator for the given platform.
    #[must_use]
    pub fn new(platform: &'p dyn Platform) -> Self {
        Self { platform }
    }

    /// Computes the operations transforming `current` into `desired`.
    ///
    /// Neither schema is modified.
    pub fn compare(&self, current: &Schema, desired: &Schema) -> Result<ChangeSet> {
        let case = self.platform.name_case();
        let current_tables = self.tables_by_key(current)?;
        let desired_tables = self.tables_by_key(desired)?;

        for table in desired_tables.values() {
            self.check_local_columns(table)?;
        }

        let mut plan = Plan::new(case);

        for (key, table) in &desired_tables {
            if current_tables.contains_key(key) {
                continue;
            }
            if self.platform.supports_inline_foreign_keys() {
                plan.push(ChangeOperation::create_table_with_foreign_keys(table));
            } else {
                plan.push(ChangeOperation::create_table(table));
                for fk in &table.foreign_keys {
                    plan.push(ChangeOperation::add_foreign_key(&table.name, fk.clone()));
                }
            }
        }

        for (key, table) in &current_tables {
            if !desired_tables.contains_key(key) {
                for fk in &table.foreign_keys {
                    plan.push(ChangeOperation::drop_foreign_key(&table.name, &fk.name));
                }
                plan.push(ChangeOperation::drop_table(&table.name));
            }
        }

        for (key, desired_table) in &desired_tables {
            if let Some(current_table) = current_tables.get(key) {
                self.diff_table(&mut plan, current_table, desired_table);
            }
        }

        self.diff_sequences(&mut plan, current, desired);
        self.check_references(&desired_tables)?;

        let changes = plan.finish();
        debug!(
            platform = self.platform.name(),
            operations = changes.len(),
            "Computed schema diff"
        );
        Ok(changes)
    }

    fn tables_by_key<'s>(&self, schema: &'s Schema) -> Result<BTreeMap<String, &'s Table>> {
        let case = self.platform.name_case();
        let mut tables = BTreeMap::new();
        for table in schema.tables() {
            if tables.insert(case.key(&table.name), table).is_some() {
                return Err(ValidationError::DuplicateTable(table.name.clone()).into());
            }
        }
        Ok(tables)
    }

    // ---- Tables ----

    fn diff_table(&self, plan: &mut Plan, current: &Table, desired: &Table) {
        let case = self.platform.name_case();
        let table = desired.name.as_str();

        for column in &desired.columns {
            match find_column(case, current, &column.name) {
                None => plan.push(ChangeOperation::add_column(table, column.clone())),
                Some(existing) => {
                    let changes = self.column_changes(existing, column);
                    if !changes.is_empty() {
                        plan.push(ChangeOperation::ModifyColumn {
                            table: table.to_string(),
                            from: existing.clone(),
                            to: column.clone(),
                            changes,
                        });
                    }
                }
            }
        }

        for column in &current.columns {
            if find_column(case, desired, &column.name).is_none() {
                plan.push(ChangeOperation::drop_column(table, &column.name));
            }
        }

        if !same_names(case, &current.primary_key, &desired.primary_key) {
            if current.has_primary_key() {
                plan.push(ChangeOperation::DropPrimaryKey {
                    table: table.to_string(),
                });
            }
            if desired.has_primary_key() {
                plan.push(ChangeOperation::AddPrimaryKey {
                    table: table.to_string(),
                    columns: desired.primary_key.clone(),
                });
            }
        }

        self.diff_indexes(plan, current, desired);
        self.diff_foreign_keys(plan, current, desired);
    }

    // ---- Columns ----

    /// The properties that differ between two versions of a column.
    #[must_use]
    pub fn column_changes(&self, from: &Column, to: &Column) -> Vec<ColumnProperty> {
        let platform = self.platform;
        let mut changes = Vec::new();

        if platform.comparable_type(&from.sql_type) != platform.comparable_type(&to.sql_type) {
            changes.push(ColumnProperty::Type);
        }
        if from.nullable != to.nullable {
            changes.push(ColumnProperty::Nullable);
        }
        let rendered = |c: &Column| c.default.as_ref().map(|d| platform.render_default(d));
        if rendered(from) != rendered(to) {
            changes.push(ColumnProperty::Default);
        }
        if from.auto_increment != to.auto_increment {
            changes.push(ColumnProperty::AutoIncrement);
        }

        changes
    }

    // ---- Indexes ----

    fn diff_indexes(&self, plan: &mut Plan, current: &Table, desired: &Table) {
        let case = self.platform.name_case();
        let mut unmatched: Vec<&Index> = sorted_by_name(&desired.indexes, |i| &i.name);

        for index in sorted_by_name(&current.indexes, |i| &i.name) {
            match unmatched
                .iter()
                .position(|candidate| indexes_equivalent(case, index, candidate))
            {
                Some(pos) => {
                    unmatched.remove(pos);
                }
                None => plan.push(ChangeOperation::drop_index(&desired.name, &index.name)),
            }
        }

        for index in unmatched {
            plan.push(ChangeOperation::add_index(&desired.name, index.clone()));
        }
    }

    // ---- Foreign keys ----

    fn diff_foreign_keys(&self, plan: &mut Plan, current: &Table, desired: &Table) {
        let case = self.platform.name_case();
        let mut unmatched: Vec<&ForeignKey> = sorted_by_name(&desired.foreign_keys, |fk| &fk.name);

        for fk in sorted_by_name(&current.foreign_keys, |fk| &fk.name) {
            let matched = unmatched
                .iter()
                .position(|candidate| fks_equivalent(case, fk, candidate));
            match matched {
                Some(pos) if same_actions(fk, unmatched[pos]) => {
                    unmatched.remove(pos);
                }
                Some(pos) => {
                    let replacement = unmatched.remove(pos);
                    plan.push(ChangeOperation::drop_foreign_key(&desired.name, &fk.name));
                    plan.push(ChangeOperation::add_foreign_key(
                        &desired.name,
                        replacement.clone(),
                    ));
                }
                None => plan.push(ChangeOperation::drop_foreign_key(&desired.name, &fk.name)),
            }
        }

        for fk in unmatched {
            plan.push(ChangeOperation::add_foreign_key(&desired.name, fk.clone()));
        }
    }

    // ---- Sequences ----

    fn diff_sequences(&self, plan: &mut Plan, current: &Schema, desired: &Schema) {
        let case = self.platform.name_case();
        let current_sequences: BTreeMap<String, _> =
            current.sequences().map(|s| (case.key(&s.name), s)).collect();
        let desired_sequences: BTreeMap<String, _> =
            desired.sequences().map(|s| (case.key(&s.name), s)).collect();

        for (key, sequence) in &desired_sequences {
            match current_sequences.get(key) {
                None => plan.push(ChangeOperation::CreateSequence {
                    sequence: (*sequence).clone(),
                }),
                Some(existing)
                    if existing.allocation_size != sequence.allocation_size
                        || existing.initial_value != sequence.initial_value =>
                {
                    plan.push(ChangeOperation::DropSequence {
                        name: existing.name.clone(),
                    });
                    plan.push(ChangeOperation::CreateSequence {
                        sequence: (*sequence).clone(),
                    });
                }
                Some(_) => {}
            }
        }

        for (key, sequence) in &current_sequences {
            if !desired_sequences.contains_key(key) {
                plan.push(ChangeOperation::DropSequence {
                    name: sequence.name.clone(),
                });
            }
        }
    }

    // ---- Validation ----

    fn check_local_columns(&self, table: &Table) -> Result<()> {
        let case = self.platform.name_case();
        for fk in &table.foreign_keys {
            if let Some(missing) = fk
                .columns
                .iter()
                .find(|c| find_column(case, table, c).is_none())
            {
                return Err(ValidationError::UnknownColumn {
                    table: table.name.clone(),
                    column: missing.clone(),
                    context: format!("Foreign key '{}'", fk.name),
                }
                .into());
            }
        }
        Ok(())
    }

    fn check_references(&self, tables: &BTreeMap<String, &Table>) -> Result<()> {
        let case = self.platform.name_case();
        for table in tables.values() {
            for fk in &table.foreign_keys {
                let unresolved = |target: String| SchemaError::UnresolvedReference {
                    table: table.name.clone(),
                    foreign_key: fk.name.clone(),
                    target,
                };
                let Some(referenced) = tables.get(&case.key(&fk.referenced_table)) else {
                    return Err(unresolved(format!("table '{}'", fk.referenced_table)));
                };
                if let Some(missing) = fk
                    .referenced_columns
                    .iter()
                    .find(|c| find_column(case, referenced, c).is_none())
                {
                    return Err(unresolved(format!(
                        "column '{}.{missing}'",
                        fk.referenced_table
                    )));
                }
            }
        }
        Ok(())
    }
}

// ================================================================
// Helpers
// ================================================================

fn find_column<'t>(case: NameCase, table: &'t Table, name: &str) -> Option<&'t Column> {
    table.columns.iter().find(|c| case.matches(&c.name, name))
}

fn same_names(case: NameCase, a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| case.matches(x, y))
}

fn sorted_by_name<T>(items: &[T], name: impl Fn(&T) -> &String) -> Vec<&T> {
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by(|a, b| name(*a).cmp(name(*b)));
    sorted
}

/// Indexes are equivalent when they cover the same columns in the same order
/// with the same uniqueness. Names are ignored.
fn indexes_equivalent(case: NameCase, a: &Index, b: &Index) -> bool {
    a.unique == b.unique && same_names(case, &a.columns, &b.columns)
}

/// Foreign keys are equivalent when they link the same columns to the same
/// table. Names and actions are ignored.
fn fks_equivalent(case: NameCase, a: &ForeignKey, b: &ForeignKey) -> bool {
    same_names(case, &a.columns, &b.columns)
        && case.matches(&a.referenced_table, &b.referenced_table)
        && same_names(case, &a.referenced_columns, &b.referenced_columns)
}

fn same_actions(a: &ForeignKey, b: &ForeignKey) -> bool {
    a.on_delete == b.on_delete && a.on_update == b.on_update
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SchemaBuilder;
    use crate::platform::{PostgresPlatform, SqlitePlatform};
    use crate::schema::{DefaultValue, ForeignKeyAction, Sequence, SqlType};

    fn users_and_posts() -> Schema {
        let mut builder = SchemaBuilder::new();
        builder
            .create_table("users")
            .unwrap()
            .add_column(Column::new("id", SqlType::Integer))
            .unwrap()
            .add_column(Column::new("email", SqlType::string()))
            .unwrap()
            .set_primary_key(["id"])
            .unwrap()
            .add_index(Index::unique("uniq_email", ["email"]))
            .unwrap();
        builder
            .create_table("posts")
            .unwrap()
            .add_column(Column::new("id", SqlType::Integer))
            .unwrap()
            .add_column(Column::new("author_id", SqlType::Integer))
            .unwrap()
            .set_primary_key(["id"])
            .unwrap()
            .add_foreign_key(ForeignKey::new("fk_author", ["author_id"], "users", ["id"]))
            .unwrap();
        builder.build()
    }

    fn pg() -> PostgresPlatform {
        PostgresPlatform::new()
    }

    #[test]
    fn test_identical_schemas_have_no_changes() {
        let platform = pg();
        let schema = users_and_posts();
        let changes = Comparator::new(&platform).compare(&schema, &schema).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_create_tables_before_foreign_keys() {
        let platform = pg();
        let changes = Comparator::new(&platform)
            .compare(&Schema::new(), &users_and_posts())
            .unwrap();

        let descriptions: Vec<String> = changes.iter().map(ChangeOperation::description).collect();
        assert_eq!(
            descriptions,
            vec![
                "Create table 'posts'",
                "Create table 'users'",
                "Add foreign key 'fk_author' to table 'posts'",
            ]
        );
    }

    #[test]
    fn test_inline_foreign_keys_stay_on_new_tables() {
        let platform = SqlitePlatform::new();
        let changes = Comparator::new(&platform)
            .compare(&Schema::new(), &users_and_posts())
            .unwrap();

        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|op| !op.is_foreign_key()));
        let ChangeOperation::CreateTable { table } = &changes.operations()[0] else {
            panic!("expected CreateTable, got {:?}", changes.operations()[0]);
        };
        assert_eq!(table.name, "posts");
        assert_eq!(table.foreign_keys.len(), 1);
    }

    #[test]
    fn test_drop_foreign_keys_before_tables() {
        let platform = pg();
        let changes = Comparator::new(&platform)
            .compare(&users_and_posts(), &Schema::new())
            .unwrap();

        let descriptions: Vec<String> = changes.iter().map(ChangeOperation::description).collect();
        assert_eq!(
            descriptions,
            vec![
                "Drop foreign key 'fk_author' from table 'posts'",
                "Drop table 'posts'",
                "Drop table 'users'",
            ]
        );
    }

    #[test]
    fn test_column_changes() {
        let platform = pg();
        let current = users_and_posts();
        let mut builder = SchemaBuilder::new();
        builder
            .create_table("users")
            .unwrap()
            .add_column(Column::new("id", SqlType::Integer))
            .unwrap()
            .add_column(Column::new("email", SqlType::String(320)).nullable())
            .unwrap()
            .add_column(Column::new("age", SqlType::Integer).default(DefaultValue::Integer(0)))
            .unwrap()
            .set_primary_key(["id"])
            .unwrap()
            .add_index(Index::unique("uniq_email", ["email"]))
            .unwrap();
        builder
            .create_table("posts")
            .unwrap()
            .add_column(Column::new("id", SqlType::Integer))
            .unwrap()
            .set_primary_key(["id"])
            .unwrap();
        let desired = builder.build();

        let changes = Comparator::new(&platform).compare(&current, &desired).unwrap();
        let descriptions: Vec<String> = changes.iter().map(ChangeOperation::description).collect();
        assert_eq!(
            descriptions,
            vec![
                "Drop foreign key 'fk_author' from table 'posts'",
                "Add column 'age' to table 'users'",
                "Change type, nullability of column 'email' in table 'users'",
                "Drop column 'author_id' from table 'posts'",
            ]
        );
    }

    #[test]
    fn test_index_matched_by_definition_not_name() {
        let platform = pg();
        let current = users_and_posts();
        let mut builder = SchemaBuilder::new();
        builder.add_table(current.table("posts").unwrap().clone()).unwrap();
        let users = builder.create_table("users").unwrap();
        users
            .add_column(Column::new("id", SqlType::Integer))
            .unwrap()
            .add_column(Column::new("email", SqlType::string()))
            .unwrap()
            .set_primary_key(["id"])
            .unwrap()
            .add_index(Index::unique("users_email_key", ["email"]))
            .unwrap();
        let desired = builder.build();

        assert!(Comparator::new(&platform)
            .compare(&current, &desired)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_changed_index_is_dropped_and_added() {
        let platform = pg();
        let current = users_and_posts();
        let mut builder = SchemaBuilder::new();
        builder.add_table(current.table("posts").unwrap().clone()).unwrap();
        let mut users = current.table("users").unwrap().clone();
        users.indexes = vec![Index::new("uniq_email", ["email"])];
        builder.add_table(users).unwrap();
        let desired = builder.build();

        let ops = Comparator::new(&platform)
            .compare(&current, &desired)
            .unwrap()
            .into_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[0], ChangeOperation::DropIndex { name, .. } if name == "uniq_email"));
        assert!(
            matches!(&ops[1], ChangeOperation::AddIndex { index, .. } if !index.unique)
        );
    }

    #[test]
    fn test_changed_foreign_key_action_is_dropped_and_added() {
        let platform = pg();
        let current = users_and_posts();
        let mut builder = SchemaBuilder::new();
        builder.add_table(current.table("users").unwrap().clone()).unwrap();
        let mut posts = current.table("posts").unwrap().clone();
        posts.foreign_keys[0] = posts.foreign_keys[0]
            .clone()
            .on_delete(ForeignKeyAction::Cascade);
        builder.add_table(posts).unwrap();
        let desired = builder.build();

        let ops = Comparator::new(&platform)
            .compare(&current, &desired)
            .unwrap()
            .into_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], ChangeOperation::DropForeignKey { .. }));
        assert!(matches!(
            &ops[1],
            ChangeOperation::AddForeignKey { foreign_key, .. }
                if foreign_key.on_delete == ForeignKeyAction::Cascade
        ));
    }

    #[test]
    fn test_primary_key_change_follows_column_changes() {
        let platform = pg();
        let mut builder = SchemaBuilder::new();
        builder
            .create_table("tags")
            .unwrap()
            .add_column(Column::new("id", SqlType::Integer))
            .unwrap()
            .set_primary_key(["id"])
            .unwrap();
        let current = builder.build();

        let mut builder = SchemaBuilder::new();
        builder
            .create_table("tags")
            .unwrap()
            .add_column(Column::new("slug", SqlType::String(64)))
            .unwrap()
            .set_primary_key(["slug"])
            .unwrap();
        let desired = builder.build();

        let ops = Comparator::new(&platform)
            .compare(&current, &desired)
            .unwrap()
            .into_operations();
        assert!(matches!(ops[0], ChangeOperation::AddColumn { .. }));
        assert!(matches!(ops[1], ChangeOperation::DropColumn { .. }));
        assert!(matches!(ops[2], ChangeOperation::DropPrimaryKey { .. }));
        assert!(matches!(&ops[3], ChangeOperation::AddPrimaryKey { columns, .. } if columns == &["slug"]));
    }

    #[test]
    fn test_unresolved_reference() {
        let platform = pg();
        let mut builder = SchemaBuilder::new();
        builder
            .create_table("posts")
            .unwrap()
            .add_column(Column::new("author_id", SqlType::Integer))
            .unwrap()
            .add_foreign_key(ForeignKey::new("fk_author", ["author_id"], "users", ["id"]))
            .unwrap();
        let desired = builder.build();

        let err = Comparator::new(&platform)
            .compare(&Schema::new(), &desired)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Foreign key 'fk_author' on table 'posts' references unknown table 'users'"
        );
    }

    #[test]
    fn test_name_case_policy() {
        let mut builder = SchemaBuilder::new();
        builder
            .create_table("Users")
            .unwrap()
            .add_column(Column::new("ID", SqlType::Integer))
            .unwrap();
        let current = builder.build();

        let mut builder = SchemaBuilder::new();
        builder
            .create_table("users")
            .unwrap()
            .add_column(Column::new("id", SqlType::Integer))
            .unwrap();
        let desired = builder.build();

        let sqlite = SqlitePlatform::new();
        assert!(Comparator::new(&sqlite)
            .compare(&current, &desired)
            .unwrap()
            .is_empty());

        let postgres = pg();
        let changes = Comparator::new(&postgres).compare(&current, &desired).unwrap();
        assert_eq!(changes.len(), 2);
    }

    #[test]
    fn test_sqlite_integer_family_is_not_a_change() {
        let platform = SqlitePlatform::new();
        let comparator = Comparator::new(&platform);
        let from = Column::new("id", SqlType::Integer);
        let to = Column::new("id", SqlType::BigInt);
        assert!(comparator.column_changes(&from, &to).is_empty());
    }

    #[test]
    fn test_sequences() {
        let platform = pg();
        let mut builder = SchemaBuilder::new();
        builder.create_sequence(Sequence::new("a_seq")).unwrap();
        builder.create_sequence(Sequence::new("b_seq")).unwrap();
        let current = builder.build();

        let mut builder = SchemaBuilder::new();
        builder
            .create_sequence(Sequence::new("a_seq").allocation_size(5))
            .unwrap();
        let desired = builder.build();

        let ops = Comparator::new(&platform)
            .compare(&current, &desired)
            .unwrap()
            .into_operations();
        let descriptions: Vec<String> = ops.iter().map(ChangeOperation::description).collect();
        assert_eq!(
            descriptions,
            vec![
                "Drop sequence 'a_seq'",
                "Drop sequence 'b_seq'",
                "Create sequence 'a_seq'",
            ]
        );
    }
}
