//! Statement builder tests, grouped by statement family.

mod crud;

use std::sync::Arc;

use crate::builder::StatementBuilder;
use crate::dialect::Dialect;
use crate::metadata::{
    AssociationKind, EntityDef, FieldDef, GenerationDef, MetadataModel, ModelConfig, RelationDef,
    SqlType,
};

/// Person/Team/Role graph plus a logic-delete entity, built fresh per test.
pub(crate) fn model(dialect: Dialect) -> Arc<MetadataModel> {
    let person = EntityDef::new("Person")
        .field(
            FieldDef::new("id", SqlType::BigInt)
                .id()
                .generated(GenerationDef::Auto),
        )
        .field(FieldDef::new("name", SqlType::Varchar))
        .field(FieldDef::new("age", SqlType::Integer))
        .field(FieldDef::new("active", SqlType::Boolean))
        .field(FieldDef::new("version", SqlType::Integer).version())
        .field(
            FieldDef::new("team", SqlType::Other)
                .relation(RelationDef::new(AssociationKind::ManyToOne, "Team")),
        )
        .field(
            FieldDef::new("roles", SqlType::Other)
                .relation(RelationDef::new(AssociationKind::ManyToMany, "Role")),
        );
    let team = EntityDef::new("Team")
        .field(FieldDef::new("id", SqlType::BigInt).id())
        .field(FieldDef::new("name", SqlType::Varchar))
        .field(
            FieldDef::new("members", SqlType::Other).relation(
                RelationDef::new(AssociationKind::OneToMany, "Person").mapped_by("team"),
            ),
        );
    let role = EntityDef::new("Role")
        .field(FieldDef::new("id", SqlType::BigInt).id())
        .field(FieldDef::new("name", SqlType::Varchar));
    let doc = EntityDef::new("Doc")
        .logic_delete("deleted")
        .field(FieldDef::new("id", SqlType::BigInt).id())
        .field(FieldDef::new("deleted", SqlType::Boolean));
    Arc::new(
        MetadataModel::build(
            vec![person, team, role, doc],
            vec![],
            ModelConfig::default(),
            dialect,
        )
        .unwrap(),
    )
}

pub(crate) fn builder(dialect: Dialect) -> StatementBuilder {
    StatementBuilder::new(model(dialect))
}
