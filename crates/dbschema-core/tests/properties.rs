//! Properties every change set must satisfy, checked by replaying change
//! sets in memory.

use dbschema_core::prelude::*;

fn blog_v1() -> Schema {
    let mut builder = SchemaBuilder::new();
    builder
        .create_table("users")
        .unwrap()
        .add_column(Column::new("id", SqlType::Integer))
        .unwrap()
        .add_column(Column::new("email", SqlType::string()))
        .unwrap()
        .add_column(Column::new("name", SqlType::String(100)).nullable())
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
        .add_column(Column::new("title", SqlType::string()))
        .unwrap()
        .set_primary_key(["id"])
        .unwrap()
        .add_index(Index::new("idx_title", ["title"]))
        .unwrap()
        .add_foreign_key(ForeignKey::new("fk_author", ["author_id"], "users", ["id"]))
        .unwrap();
    builder
        .create_table("legacy")
        .unwrap()
        .add_column(Column::new("user_id", SqlType::Integer))
        .unwrap()
        .add_foreign_key(ForeignKey::new("fk_legacy_user", ["user_id"], "users", ["id"]))
        .unwrap();
    builder
        .create_sequence(Sequence::new("order_seq"))
        .unwrap();
    builder.build()
}

fn blog_v2() -> Schema {
    let mut builder = SchemaBuilder::new();
    builder
        .create_table("users")
        .unwrap()
        .add_column(Column::new("id", SqlType::BigInt))
        .unwrap()
        .add_column(Column::new("email", SqlType::string()))
        .unwrap()
        .add_column(
            Column::new("age", SqlType::Integer)
                .nullable()
                .default(DefaultValue::Integer(0)),
        )
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
        .add_column(Column::new("author_id", SqlType::BigInt))
        .unwrap()
        .add_column(Column::new("title", SqlType::Text))
        .unwrap()
        .add_column(Column::new("slug", SqlType::String(120)))
        .unwrap()
        .set_primary_key(["id", "slug"])
        .unwrap()
        .add_index(Index::unique("uniq_slug", ["slug"]))
        .unwrap()
        .add_foreign_key(
            ForeignKey::new("fk_author", ["author_id"], "users", ["id"])
                .on_delete(ForeignKeyAction::Cascade),
        )
        .unwrap();
    builder
        .create_table("comments")
        .unwrap()
        .add_column(Column::new("id", SqlType::Integer))
        .unwrap()
        .add_column(Column::new("post_id", SqlType::Integer))
        .unwrap()
        .set_primary_key(["id"])
        .unwrap()
        .add_foreign_key(ForeignKey::new("fk_post", ["post_id"], "posts", ["id"]))
        .unwrap();
    builder
        .create_sequence(Sequence::new("order_seq").allocation_size(10))
        .unwrap();
    builder.build()
}

fn platforms() -> Vec<Box<dyn Platform>> {
    vec![
        Box::new(SqlitePlatform::new()),
        Box::new(PostgresPlatform::new()),
        Box::new(MySqlPlatform::new()),
    ]
}

fn replay(start: &Schema, changes: &ChangeSet) -> Schema {
    let mut state = SchemaState::new(start.clone());
    state.apply_all(changes).unwrap();
    state.into_schema()
}

#[test]
fn test_applying_a_diff_reaches_the_target() {
    for platform in platforms() {
        let comparator = Comparator::new(platform.as_ref());
        let changes = comparator.compare(&blog_v1(), &blog_v2()).unwrap();
        assert!(!changes.is_empty());

        let reached = replay(&blog_v1(), &changes);
        let rest = comparator.compare(&reached, &blog_v2()).unwrap();
        assert!(rest.is_empty(), "{}: {:?}", platform.name(), rest);
    }
}

#[test]
fn test_diff_is_deterministic() {
    for platform in platforms() {
        let comparator = Comparator::new(platform.as_ref());
        let first = comparator.compare(&blog_v1(), &blog_v2()).unwrap();
        let second = comparator.compare(&blog_v1(), &blog_v2()).unwrap();
        assert_eq!(first, second);

        let renderer = SqlRenderer::new(platform.as_ref());
        if platform.supports_alter_column() {
            assert_eq!(
                renderer.render_all(&first).unwrap(),
                renderer.render_all(&second).unwrap()
            );
        }
    }
}

#[test]
fn test_round_trip_returns_to_the_start() {
    for platform in platforms() {
        let comparator = Comparator::new(platform.as_ref());
        let forward = comparator.compare(&blog_v1(), &blog_v2()).unwrap();
        let there = replay(&blog_v1(), &forward);

        let backward = comparator.compare(&there, &blog_v1()).unwrap();
        let back = replay(&there, &backward);

        assert!(comparator.compare(&back, &blog_v1()).unwrap().is_empty());
    }
}

#[test]
fn test_schema_against_itself_is_empty() {
    for platform in platforms() {
        let comparator = Comparator::new(platform.as_ref());
        for schema in [Schema::new(), blog_v1(), blog_v2()] {
            assert!(comparator.compare(&schema, &schema).unwrap().is_empty());
        }
    }
}

#[test]
fn test_foreign_keys_are_dropped_before_their_table() {
    let platform = PostgresPlatform::new();
    let changes = Comparator::new(&platform)
        .compare(&blog_v1(), &blog_v2())
        .unwrap();
    let operations = changes.operations();

    let position = |wanted: &ChangeOperation| {
        operations
            .iter()
            .position(|op| op == wanted)
            .unwrap_or_else(|| panic!("missing {wanted}"))
    };

    let drop_fk = position(&ChangeOperation::drop_foreign_key("legacy", "fk_legacy_user"));
    let drop_table = position(&ChangeOperation::drop_table("legacy"));
    assert!(drop_fk < drop_table);

    for (i, op) in operations.iter().enumerate() {
        if let ChangeOperation::DropTable { name } = op {
            assert!(operations[i..]
                .iter()
                .all(|later| !matches!(later, ChangeOperation::DropForeignKey { table, .. } if table == name)));
        }
    }
}

#[test]
fn test_renamed_column_is_dropped_and_added() {
    let platform = PostgresPlatform::new();
    let mut v2 = Table::new("users");
    v2.columns.push(Column::new("id", SqlType::Integer));
    v2.columns.push(Column::new("mail", SqlType::string()));

    let mut builder = SchemaBuilder::new();
    builder
        .create_table("users")
        .unwrap()
        .add_column(Column::new("id", SqlType::Integer))
        .unwrap()
        .add_column(Column::new("email", SqlType::string()))
        .unwrap();
    let v1 = builder.build();

    let mut builder = SchemaBuilder::new();
    builder.add_table(v2).unwrap();
    let v2 = builder.build();

    let changes = Comparator::new(&platform).compare(&v1, &v2).unwrap();
    assert_eq!(
        changes.operations(),
        [
            ChangeOperation::add_column("users", Column::new("mail", SqlType::string())),
            ChangeOperation::drop_column("users", "email"),
        ]
    );
}
