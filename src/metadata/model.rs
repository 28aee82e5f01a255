//! Two-phase metadata model build and lookups.

use std::collections::HashMap;

use tracing::debug;

use super::association::Association;
use super::entity::{Entity, Property, TableIdent};
use super::resolver::AssociationResolver;
use super::{EntityDef, GenerationDef, GeneratorDef, ModelConfig, RelationDef};
use crate::dialect::{Dialect, GenerationStrategy};
use crate::error::{MappingError, MappingResult};

/// Sequence used when a SEQUENCE strategy names no generator and no generator
/// table entry matches.
pub const DEFAULT_SEQUENCE: &str = "default_sequence";

/// The resolved, immutable metadata model: an arena of entities keyed by
/// logical name.
///
/// Built once at startup; every lookup afterwards is a plain map read, so the
/// model is shared across threads without locking.
#[derive(Debug)]
pub struct MetadataModel {
    dialect: Dialect,
    config: ModelConfig,
    entities: HashMap<String, Entity>,
    /// Declaration order, kept so association resolution and iteration are
    /// deterministic.
    order: Vec<String>,
    generators: HashMap<String, String>,
}

impl MetadataModel {
    /// Build the model from raw declarative definitions.
    ///
    /// Phase 1 ingests every entity's fields, deriving each column identifier
    /// exactly once (annotated name first, naming strategy otherwise). Phase 2
    /// resolves association join shapes, owning sides before mapped-by sides.
    pub fn build(
        defs: Vec<EntityDef>,
        generators: Vec<GeneratorDef>,
        config: ModelConfig,
        dialect: Dialect,
    ) -> MappingResult<Self> {
        let mut generator_table = HashMap::new();
        for g in generators {
            if generator_table.insert(g.name.clone(), g.sequence).is_some() {
                return Err(MappingError::DuplicateGenerator(g.name));
            }
        }

        // Phase 2 needs the raw relationship declarations (explicit join
        // columns, join tables) that phase 1 does not carry into the arena.
        let mut relations: HashMap<(String, String), RelationDef> = HashMap::new();
        for def in &defs {
            for field in &def.fields {
                if let Some(relation) = &field.relation {
                    relations.insert((def.name.clone(), field.name.clone()), relation.clone());
                }
            }
        }

        let mut entities = HashMap::new();
        let mut order = Vec::with_capacity(defs.len());
        for def in defs {
            let entity = ingest(def, &config)?;
            debug!(entity = %entity.name, table = %entity.table, "ingested entity");
            order.push(entity.name.clone());
            entities.insert(entity.name.clone(), entity);
        }

        AssociationResolver::new(&mut entities, &order, &relations, &config).resolve_all()?;
        debug!(entities = order.len(), "metadata model built");

        Ok(Self {
            dialect,
            config,
            entities,
            order,
            generators: generator_table,
        })
    }

    /// Look up an entity; fails when the type carries no mapping declaration.
    pub fn entity(&self, name: &str) -> MappingResult<&Entity> {
        self.entities
            .get(name)
            .ok_or_else(|| MappingError::UnknownEntity(name.to_string()))
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|name| self.entities.get(name))
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Resolve the entity's id-generation strategy.
    ///
    /// AUTO resolves to the dialect's native strategy. Composite ids never
    /// combine with generation; both violations are [`MappingError`]s.
    pub fn generation_strategy(&self, entity: &Entity) -> MappingResult<GenerationStrategy> {
        let generated: Vec<&Property> = entity
            .id_properties
            .iter()
            .filter_map(|idx| entity.properties.get(*idx))
            .filter(|p| p.generation.is_some())
            .collect();
        if generated.is_empty() {
            return Ok(GenerationStrategy::None);
        }
        if entity.is_composite_id() {
            return Err(MappingError::CompositeKeyGeneration(entity.name.clone()));
        }
        match generated[0].generation.as_ref() {
            Some(GenerationDef::Identity) => Ok(GenerationStrategy::Identity),
            Some(GenerationDef::Sequence { .. }) => Ok(GenerationStrategy::Sequence),
            Some(GenerationDef::Auto) => self
                .dialect
                .strategy()
                .native_generation()
                .ok_or_else(|| MappingError::UnresolvedAutoStrategy {
                    entity: entity.name.clone(),
                    dialect: self.dialect.strategy().name().to_string(),
                }),
            None => Ok(GenerationStrategy::None),
        }
    }

    /// Sequence name for a SEQUENCE-generated property: the explicit generator
    /// name through the generator table, else the fixed default.
    pub fn sequence_name(&self, property: &Property) -> String {
        let generator = match property.generation.as_ref() {
            Some(GenerationDef::Sequence { generator }) => generator.as_deref(),
            _ => None,
        };
        generator
            .and_then(|name| self.generators.get(name))
            .cloned()
            .unwrap_or_else(|| DEFAULT_SEQUENCE.to_string())
    }
}

/// Phase 1: one entity definition into a resolved [`Entity`] with associations
/// left unresolved (empty join shapes).
fn ingest(def: EntityDef, config: &ModelConfig) -> MappingResult<Entity> {
    let table_name = match def.table {
        Some(table) => table,
        None => {
            let derived = config.naming.table_name(&def.name);
            match &config.table_prefix {
                Some(prefix) => format!("{prefix}{derived}"),
                None => derived,
            }
        }
    };
    let table = TableIdent {
        schema: def.schema,
        name: table_name,
    };

    let mut properties = Vec::new();
    let mut associations = Vec::new();
    let mut id_properties = Vec::new();
    let mut logic_delete = None;

    for field in def.fields {
        if field.transient {
            continue;
        }
        if let Some(relation) = field.relation {
            associations.push(Association {
                name: field.name,
                kind: relation.kind,
                target: relation.target,
                bidirectional: relation.mapped_by.is_some(),
                mapped_by: relation.mapped_by,
                join_columns: Vec::new(),
                join_table: None,
            });
            continue;
        }

        // The single place a column identifier is derived.
        let column = field
            .column
            .unwrap_or_else(|| config.naming.column_name(&field.name));
        if field.id {
            id_properties.push(properties.len());
        }
        if def.logic_delete_field.as_deref() == Some(field.name.as_str()) {
            logic_delete = Some(properties.len());
        }
        properties.push(Property {
            name: field.name,
            column,
            sql_type: field.sql_type,
            id: field.id,
            version: field.version,
            nullable: field.nullable,
            updatable: field.updatable,
            converter: field.converter,
            generation: field.generation,
        });
    }

    Ok(Entity {
        name: def.name,
        table,
        properties,
        associations,
        id_properties,
        logic_delete,
    })
}
