//! Metadata model and association resolver tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;

use super::*;
use crate::dialect::{Dialect, GenerationStrategy};
use crate::error::{AssociationError, MappingError};

fn user_def() -> EntityDef {
    EntityDef::new("User")
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
        )
}

fn team_def() -> EntityDef {
    EntityDef::new("Team")
        .field(FieldDef::new("id", SqlType::BigInt).id())
        .field(FieldDef::new("name", SqlType::Varchar))
        .field(
            FieldDef::new("users", SqlType::Other).relation(
                RelationDef::new(AssociationKind::OneToMany, "User").mapped_by("team"),
            ),
        )
}

fn role_def() -> EntityDef {
    EntityDef::new("Role")
        .field(FieldDef::new("id", SqlType::BigInt).id())
        .field(FieldDef::new("name", SqlType::Varchar))
}

fn build_model() -> MetadataModel {
    MetadataModel::build(
        vec![user_def(), team_def(), role_def()],
        vec![],
        ModelConfig::default(),
        Dialect::Postgres,
    )
    .unwrap()
}

struct CountingNaming(AtomicUsize);

impl NamingStrategy for CountingNaming {
    fn column_name(&self, property: &str) -> String {
        self.0.fetch_add(1, Ordering::SeqCst);
        SnakeCase.column_name(property)
    }
}

#[test]
fn test_column_names_resolved_exactly_once() {
    let naming = Arc::new(CountingNaming(AtomicUsize::new(0)));
    let config = ModelConfig {
        naming: naming.clone(),
        ..Default::default()
    };
    let model = MetadataModel::build(
        vec![user_def(), team_def(), role_def()],
        vec![],
        config,
        Dialect::Postgres,
    )
    .unwrap();

    let after_build = naming.0.load(Ordering::SeqCst);
    assert!(after_build > 0);
    for _ in 0..5 {
        let user = model.entity("User").unwrap();
        assert_eq!(user.property("name").unwrap().column, "name");
        let _ = model.entity("Team").unwrap();
    }
    assert_eq!(naming.0.load(Ordering::SeqCst), after_build);
}

#[test]
fn test_annotated_column_wins_over_strategy() {
    let def = EntityDef::new("Audit")
        .field(FieldDef::new("id", SqlType::BigInt).id())
        .field(FieldDef::new("createdAt", SqlType::Timestamp).column("CREATION_TS"));
    let model = MetadataModel::build(
        vec![def],
        vec![],
        ModelConfig::default(),
        Dialect::Postgres,
    )
    .unwrap();
    let audit = model.entity("Audit").unwrap();
    assert_eq!(audit.property("createdAt").unwrap().column, "CREATION_TS");
}

#[test]
fn test_unknown_entity_is_mapping_error() {
    let model = build_model();
    assert!(matches!(
        model.entity("Order"),
        Err(MappingError::UnknownEntity(_))
    ));
}

#[test]
fn test_many_to_one_foreign_key_defaults() {
    let model = build_model();
    let user = model.entity("User").unwrap();
    let team = user.association("team").unwrap();
    assert!(team.is_owning());
    assert_eq!(team.join_columns.len(), 1);
    assert_eq!(team.join_columns[0].column, "team_id");
    assert_eq!(team.join_columns[0].referenced, "id");
    assert_eq!(team.join_columns[0].referenced_property.as_deref(), Some("id"));
    assert!(team.join_table.is_none());
}

#[test]
fn test_mapped_by_side_is_exact_role_swap() {
    let model = build_model();
    let owning = &model
        .entity("User")
        .unwrap()
        .association("team")
        .unwrap()
        .join_columns;
    let inverse = &model
        .entity("Team")
        .unwrap()
        .association("users")
        .unwrap()
        .join_columns;
    assert_eq!(inverse.len(), owning.len());
    for (o, i) in owning.iter().zip(inverse) {
        assert_eq!(i.column, o.referenced);
        assert_eq!(i.referenced, o.column);
    }
    // No foreign-key property exists for the FK column on the target; the
    // best-effort binding stays unset and consumers must tolerate that.
    assert_eq!(inverse[0].referenced_property, None);
    // Owning side is a plain many-to-one, so the one-to-many side carries no
    // join table either.
    assert!(
        model
            .entity("Team")
            .unwrap()
            .association("users")
            .unwrap()
            .join_table
            .is_none()
    );
}

#[test]
fn test_both_sides_marked_bidirectional() {
    let model = build_model();
    assert!(model.entity("User").unwrap().association("team").unwrap().bidirectional);
    assert!(model.entity("Team").unwrap().association("users").unwrap().bidirectional);
}

#[test]
fn test_join_table_synthesis_with_convention_defaults() {
    let model = build_model();
    let roles = model.entity("User").unwrap().association("roles").unwrap();
    assert!(roles.join_columns.is_empty());
    let jt = roles.join_table.as_ref().unwrap();
    assert_eq!(jt.table, "user_role");
    assert_eq!(jt.owning.len(), 1);
    assert_eq!(jt.owning[0].column, "user_id");
    assert_eq!(jt.owning[0].referenced, "id");
    assert_eq!(jt.inverse.len(), 1);
    assert_eq!(jt.inverse[0].column, "roles_id");
    assert_eq!(jt.inverse[0].referenced, "id");
    assert_eq!(jt.inverse[0].referenced_property.as_deref(), Some("id"));
}

#[test]
fn test_join_table_prefix() {
    let config = ModelConfig {
        table_prefix: Some("app_".to_string()),
        ..Default::default()
    };
    let model = MetadataModel::build(
        vec![user_def(), team_def(), role_def()],
        vec![],
        config,
        Dialect::Postgres,
    )
    .unwrap();
    let roles = model.entity("User").unwrap().association("roles").unwrap();
    assert_eq!(roles.join_table.as_ref().unwrap().table, "app_user_app_role");
}

#[test]
fn test_unknown_association_target() {
    let def = EntityDef::new("Orphan")
        .field(FieldDef::new("id", SqlType::BigInt).id())
        .field(
            FieldDef::new("ghost", SqlType::Other)
                .relation(RelationDef::new(AssociationKind::ManyToOne, "Nowhere")),
        );
    let err = MetadataModel::build(
        vec![def],
        vec![],
        ModelConfig::default(),
        Dialect::Postgres,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        MappingError::Association(AssociationError::UnknownTarget { .. })
    ));
}

#[test]
fn test_mapped_by_cycle_detected() {
    let a = EntityDef::new("A")
        .field(FieldDef::new("id", SqlType::BigInt).id())
        .field(
            FieldDef::new("b", SqlType::Other)
                .relation(RelationDef::new(AssociationKind::OneToOne, "B").mapped_by("a")),
        );
    let b = EntityDef::new("B")
        .field(FieldDef::new("id", SqlType::BigInt).id())
        .field(
            FieldDef::new("a", SqlType::Other)
                .relation(RelationDef::new(AssociationKind::OneToOne, "A").mapped_by("b")),
        );
    let err = MetadataModel::build(
        vec![a, b],
        vec![],
        ModelConfig::default(),
        Dialect::Postgres,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        MappingError::Association(AssociationError::Cycle { .. })
    ));
}

#[test]
fn test_missing_mapped_by_property() {
    let a = EntityDef::new("A")
        .field(FieldDef::new("id", SqlType::BigInt).id())
        .field(
            FieldDef::new("bs", SqlType::Other)
                .relation(RelationDef::new(AssociationKind::OneToMany, "B").mapped_by("missing")),
        );
    let b = EntityDef::new("B").field(FieldDef::new("id", SqlType::BigInt).id());
    let err = MetadataModel::build(
        vec![a, b],
        vec![],
        ModelConfig::default(),
        Dialect::Postgres,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        MappingError::Association(AssociationError::MissingMappedBy { .. })
    ));
}

#[test]
fn test_generation_strategy_resolution() {
    let model = build_model();
    let user = model.entity("User").unwrap();
    // AUTO resolves to the Postgres native strategy.
    assert_eq!(
        model.generation_strategy(user).unwrap(),
        GenerationStrategy::Identity
    );
    let role = model.entity("Role").unwrap();
    assert_eq!(
        model.generation_strategy(role).unwrap(),
        GenerationStrategy::None
    );
}

#[test]
fn test_auto_resolves_to_sequence_on_oracle() {
    let model = MetadataModel::build(
        vec![user_def(), team_def(), role_def()],
        vec![],
        ModelConfig::default(),
        Dialect::Oracle,
    )
    .unwrap();
    let user = model.entity("User").unwrap();
    assert_eq!(
        model.generation_strategy(user).unwrap(),
        GenerationStrategy::Sequence
    );
}

#[test]
fn test_composite_id_with_generation_rejected() {
    let def = EntityDef::new("Pair")
        .field(
            FieldDef::new("left", SqlType::BigInt)
                .id()
                .generated(GenerationDef::Identity),
        )
        .field(FieldDef::new("right", SqlType::BigInt).id());
    let model = MetadataModel::build(
        vec![def],
        vec![],
        ModelConfig::default(),
        Dialect::Postgres,
    )
    .unwrap();
    let pair = model.entity("Pair").unwrap();
    assert!(pair.is_composite_id());
    assert!(matches!(
        model.generation_strategy(pair),
        Err(MappingError::CompositeKeyGeneration(_))
    ));
}

#[test]
fn test_duplicate_generator_rejected() {
    let gens = vec![
        GeneratorDef {
            name: "ids".into(),
            sequence: "seq_a".into(),
        },
        GeneratorDef {
            name: "ids".into(),
            sequence: "seq_b".into(),
        },
    ];
    let err = MetadataModel::build(
        vec![role_def()],
        gens,
        ModelConfig::default(),
        Dialect::Postgres,
    )
    .unwrap_err();
    assert!(matches!(err, MappingError::DuplicateGenerator(_)));
}

#[test]
fn test_sequence_name_lookup_and_default() {
    let gens = vec![GeneratorDef {
        name: "order_ids".into(),
        sequence: "seq_orders".into(),
    }];
    let def = EntityDef::new("Order").table("orders").field(
        FieldDef::new("id", SqlType::BigInt)
            .id()
            .generated(GenerationDef::Sequence {
                generator: Some("order_ids".into()),
            }),
    );
    let other = EntityDef::new("Note").field(
        FieldDef::new("id", SqlType::BigInt)
            .id()
            .generated(GenerationDef::Sequence { generator: None }),
    );
    let model =
        MetadataModel::build(vec![def, other], gens, ModelConfig::default(), Dialect::Oracle)
            .unwrap();
    let order_id = model.entity("Order").unwrap().id_property().unwrap();
    assert_eq!(model.sequence_name(order_id), "seq_orders");
    let note_id = model.entity("Note").unwrap().id_property().unwrap();
    assert_eq!(model.sequence_name(note_id), DEFAULT_SEQUENCE);
}

#[test]
fn test_transient_fields_dropped() {
    let def = EntityDef::new("Cacheable")
        .field(FieldDef::new("id", SqlType::BigInt).id())
        .field(FieldDef::new("cached", SqlType::Other).transient());
    let model = MetadataModel::build(
        vec![def],
        vec![],
        ModelConfig::default(),
        Dialect::Postgres,
    )
    .unwrap();
    assert!(model.entity("Cacheable").unwrap().property("cached").is_none());
}

#[test]
fn test_logic_delete_property() {
    let def = EntityDef::new("Doc")
        .logic_delete("deleted")
        .field(FieldDef::new("id", SqlType::BigInt).id())
        .field(FieldDef::new("deleted", SqlType::Boolean));
    let model = MetadataModel::build(
        vec![def],
        vec![],
        ModelConfig::default(),
        Dialect::Postgres,
    )
    .unwrap();
    let doc = model.entity("Doc").unwrap();
    assert_eq!(doc.logic_delete_property().unwrap().name, "deleted");
}

#[test]
fn test_basic_entity_flag() {
    let model = build_model();
    assert!(model.entity("Role").unwrap().is_basic());
    assert!(!model.entity("User").unwrap().is_basic());
}

#[test]
fn test_model_debug_output() {
    // Build results must be usable with unwrap_err and assertion messages.
    let rendered = format!("{:?}", build_model());
    assert!(rendered.contains("MetadataModel"));
    assert!(rendered.contains("User"));
}
