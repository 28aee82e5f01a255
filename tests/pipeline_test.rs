//! End-to-end pipeline: definitions -> model -> derived query -> registered
//! statement.

use std::sync::Arc;

use sqlmapper::builder::StatementBuilder;
use sqlmapper::derive::{self, ReturnHint};
use sqlmapper::dialect::Dialect;
use sqlmapper::metadata::{
    AssociationKind, EntityDef, FieldDef, GenerationDef, MetadataModel, ModelConfig, RelationDef,
    SqlType,
};
use sqlmapper::registry::{StatementRegistry, statement_id};

fn model() -> Arc<MetadataModel> {
    let account = EntityDef::new("Account")
        .field(
            FieldDef::new("id", SqlType::BigInt)
                .id()
                .generated(GenerationDef::Auto),
        )
        .field(FieldDef::new("email", SqlType::Varchar))
        .field(FieldDef::new("age", SqlType::Integer))
        .field(
            FieldDef::new("plan", SqlType::Other)
                .relation(RelationDef::new(AssociationKind::ManyToOne, "Plan")),
        );
    let plan = EntityDef::new("Plan")
        .field(FieldDef::new("id", SqlType::BigInt).id())
        .field(FieldDef::new("title", SqlType::Varchar));
    Arc::new(
        MetadataModel::build(
            vec![account, plan],
            vec![],
            ModelConfig::default(),
            Dialect::Postgres,
        )
        .unwrap(),
    )
}

#[test]
fn derived_statement_registers_once_and_is_shared() {
    let model = model();
    let builder = StatementBuilder::new(model.clone());
    let registry = StatementRegistry::new();

    let query = derive::parse(
        &model,
        "Account",
        "findByPlanTitleAndAgeGreaterThan",
        ReturnHint::Collection,
    )
    .unwrap();
    query.verify_arity(2).unwrap();

    let id = statement_id("Account", &query.source);
    let first = registry
        .ensure_registered(&id, || builder.derived(&query))
        .unwrap();
    let second = registry
        .ensure_registered(&id, || builder.derived(&query))
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(
        first
            .sql
            .contains("LEFT OUTER JOIN plan plan ON plan.id = account.plan_id")
    );
    assert!(first.sql.contains("plan.title = #{p0,jdbcType=VARCHAR}"));
    assert!(first.sql.contains("account.age > #{p1,jdbcType=INTEGER}"));
}

#[test]
fn crud_statements_round_trip_through_registry() {
    let model = model();
    let builder = StatementBuilder::new(model);
    let registry = StatementRegistry::new();

    let insert = registry
        .ensure_registered("Account.insert", || builder.insert("Account"))
        .unwrap();
    assert!(insert.sql.starts_with("INSERT INTO account (email, age"));
    assert_eq!(
        insert.key_generation.as_ref().unwrap().sql,
        "SELECT lastval()"
    );

    let select = registry
        .ensure_registered("Account.selectById", || builder.select_by_id("Account", false))
        .unwrap();
    assert!(select.sql.ends_with("WHERE account.id = #{id,jdbcType=BIGINT}"));
    assert_eq!(registry.len(), 2);
}
