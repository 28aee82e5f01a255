//! Insert, update, delete and select-by-id statements.

use pretty_assertions::assert_eq;

use super::builder;
use crate::builder::{StatementBuilder, StatementKind};
use crate::dialect::Dialect;
use crate::error::MappingError;
use crate::metadata::{EntityDef, FieldDef, GenerationDef, MetadataModel, ModelConfig, SqlType};

#[test]
fn test_insert_identity_excludes_id_column() {
    let statement = builder(Dialect::Postgres).insert("Person").unwrap();
    assert_eq!(
        statement.sql,
        "INSERT INTO person (name, age, active, version, team_id) VALUES (\
         #{name,jdbcType=VARCHAR}, #{age,jdbcType=INTEGER}, \
         #{active,jdbcType=BOOLEAN}, #{version,jdbcType=INTEGER}, \
         #{team.id,jdbcType=BIGINT})"
    );
    assert_eq!(statement.kind, StatementKind::Insert);
    let keygen = statement.key_generation.unwrap();
    assert_eq!(keygen.property, "id");
    assert_eq!(keygen.column, "id");
    assert!(!keygen.before);
    assert_eq!(keygen.sql, "SELECT lastval()");
}

#[test]
fn test_insert_sequence_includes_id_column() {
    let statement = builder(Dialect::Oracle).insert("Person").unwrap();
    assert!(statement.sql.starts_with(
        "INSERT INTO person (id, name, age, active, version, team_id) VALUES (#{id,jdbcType=BIGINT}, "
    ));
    let keygen = statement.key_generation.unwrap();
    assert!(keygen.before);
    assert_eq!(keygen.sql, "SELECT default_sequence.NEXTVAL FROM DUAL");
}

#[test]
fn test_insert_without_generation_has_no_keygen() {
    let statement = builder(Dialect::Postgres).insert("Role").unwrap();
    assert_eq!(
        statement.sql,
        "INSERT INTO role (id, name) VALUES (#{id,jdbcType=BIGINT}, #{name,jdbcType=VARCHAR})"
    );
    assert!(statement.key_generation.is_none());
}

#[test]
fn test_sequence_generation_rejected_without_sequence_support() {
    let ticket = EntityDef::new("Ticket").field(
        FieldDef::new("id", SqlType::BigInt)
            .id()
            .generated(GenerationDef::Sequence { generator: None }),
    );
    let model = MetadataModel::build(
        vec![ticket],
        vec![],
        ModelConfig::default(),
        Dialect::MySql,
    )
    .unwrap();
    let builder = StatementBuilder::new(std::sync::Arc::new(model));
    assert!(matches!(
        builder.insert("Ticket"),
        Err(MappingError::UnsupportedGeneration { .. })
    ));
}

#[test]
fn test_update_by_id_bumps_version() {
    let statement = builder(Dialect::Postgres)
        .update_by_id("Person", false)
        .unwrap();
    assert_eq!(
        statement.sql,
        "UPDATE person SET name = #{name,jdbcType=VARCHAR}, \
         age = #{age,jdbcType=INTEGER}, active = #{active,jdbcType=BOOLEAN}, \
         team_id = #{team.id,jdbcType=BIGINT}, version = version + 1 \
         WHERE id = #{id,jdbcType=BIGINT} AND version = #{version,jdbcType=INTEGER}"
    );
    assert_eq!(statement.kind, StatementKind::Update);
}

#[test]
fn test_partial_update_wraps_assignments_in_null_checks() {
    let statement = builder(Dialect::Postgres)
        .update_by_id("Person", true)
        .unwrap();
    assert!(
        statement
            .sql
            .contains("<if test=\"name != null\">name = #{name,jdbcType=VARCHAR}, </if>")
    );
    assert!(
        statement
            .sql
            .contains("<if test=\"team != null\">team_id = #{team.id,jdbcType=BIGINT}, </if>")
    );
    assert!(statement.sql.contains("version = version + 1 WHERE "));
}

#[test]
fn test_delete_by_id() {
    let statement = builder(Dialect::Postgres).delete_by_id("Person").unwrap();
    assert_eq!(
        statement.sql,
        "DELETE FROM person WHERE id = #{id,jdbcType=BIGINT}"
    );
    assert_eq!(statement.kind, StatementKind::Delete);
}

#[test]
fn test_logic_delete_rewrites_to_update() {
    let statement = builder(Dialect::Postgres).delete_by_id("Doc").unwrap();
    assert_eq!(
        statement.sql,
        "UPDATE doc SET deleted = true WHERE id = #{id,jdbcType=BIGINT}"
    );
    assert_eq!(statement.kind, StatementKind::Update);
}

#[test]
fn test_select_by_id_projects_all_scalars() {
    let statement = builder(Dialect::Postgres)
        .select_by_id("Person", false)
        .unwrap();
    assert_eq!(
        statement.sql,
        "SELECT person.id AS id, person.name AS name, person.age AS age, \
         person.active AS active, person.version AS version \
         FROM person person WHERE person.id = #{id,jdbcType=BIGINT}"
    );
    assert_eq!(statement.result_type.as_deref(), Some("Person"));
}

#[test]
fn test_joined_select_by_id_fetches_to_one_targets() {
    let statement = builder(Dialect::Postgres)
        .select_by_id("Person", true)
        .unwrap();
    assert!(
        statement
            .sql
            .contains(", team.id AS team_id, team.name AS team_name")
    );
    assert!(
        statement
            .sql
            .contains(" LEFT OUTER JOIN team team ON team.id = person.team_id")
    );
}

#[test]
fn test_missing_id_is_rejected() {
    let blob = EntityDef::new("Blob").field(FieldDef::new("data", SqlType::Blob));
    let model = MetadataModel::build(
        vec![blob],
        vec![],
        ModelConfig::default(),
        Dialect::Postgres,
    )
    .unwrap();
    let builder = StatementBuilder::new(std::sync::Arc::new(model));
    assert!(matches!(
        builder.delete_by_id("Blob"),
        Err(MappingError::MissingId(_))
    ));
}
