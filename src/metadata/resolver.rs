//! Association resolver: infers join-column and join-table shapes.
//!
//! Runs as phase 2 of the model build, walking associations in declaration
//! order. Owning sides resolve first; mapped-by sides derive their shape by
//! role-swapping the owning side's columns. A currently-resolving marker set
//! guards against declaration cycles (two mapped-by sides pointing at each
//! other).
//!
//! Join column orientation is uniform: `column` lives on the table of the
//! entity holding the association, `referenced` on the target side. The
//! best-effort `referenced_property` binding therefore always searches the
//! target entity.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::association::{AssociationKind, JoinColumn, JoinTable};
use super::entity::Entity;
use super::{JoinColumnDef, ModelConfig, RelationDef};
use crate::error::{AssociationError, MappingError, MappingResult};

pub(crate) struct AssociationResolver<'a> {
    entities: &'a mut HashMap<String, Entity>,
    order: &'a [String],
    relations: &'a HashMap<(String, String), RelationDef>,
    config: &'a ModelConfig,
    resolving: HashSet<(String, String)>,
    resolved: HashSet<(String, String)>,
}

impl<'a> AssociationResolver<'a> {
    pub(crate) fn new(
        entities: &'a mut HashMap<String, Entity>,
        order: &'a [String],
        relations: &'a HashMap<(String, String), RelationDef>,
        config: &'a ModelConfig,
    ) -> Self {
        Self {
            entities,
            order,
            relations,
            config,
            resolving: HashSet::new(),
            resolved: HashSet::new(),
        }
    }

    pub(crate) fn resolve_all(&mut self) -> MappingResult<()> {
        for entity in self.order {
            let names: Vec<String> = self.entities[entity]
                .associations
                .iter()
                .map(|a| a.name.clone())
                .collect();
            for property in names {
                self.resolve(entity, &property)?;
            }
        }
        Ok(())
    }

    fn resolve(&mut self, entity: &str, property: &str) -> MappingResult<()> {
        let key = (entity.to_string(), property.to_string());
        if self.resolved.contains(&key) {
            return Ok(());
        }
        if !self.resolving.insert(key.clone()) {
            return Err(AssociationError::Cycle {
                entity: entity.to_string(),
                property: property.to_string(),
            }
            .into());
        }

        let assoc = self
            .entities
            .get(entity)
            .and_then(|e| e.association(property))
            .cloned()
            .ok_or_else(|| MappingError::UnknownProperty {
                entity: entity.to_string(),
                property: property.to_string(),
            })?;

        let shape = if assoc.kind == AssociationKind::ElementCollection {
            self.collection_table(entity, property)?
        } else {
            if !self.entities.contains_key(&assoc.target) {
                return Err(AssociationError::UnknownTarget {
                    entity: entity.to_string(),
                    property: property.to_string(),
                    target: assoc.target.clone(),
                }
                .into());
            }
            match &assoc.mapped_by {
                Some(mapped_by) => {
                    self.mapped_by_side(entity, property, &assoc.target, mapped_by)?
                }
                None => self.owning_side(entity, property, &assoc.target, assoc.kind)?,
            }
        };

        let slot = self
            .entities
            .get_mut(entity)
            .and_then(|e| e.associations.iter_mut().find(|a| a.name == property))
            .expect("association present");
        slot.join_columns = shape.join_columns;
        slot.join_table = shape.join_table;
        if shape.bidirectional {
            slot.bidirectional = true;
        }
        debug!(entity, property, "resolved association");

        self.resolving.remove(&key);
        self.resolved.insert(key);
        Ok(())
    }

    /// Case 1: non-owning side. Resolve the owning property first, then swap
    /// column/referenced roles.
    fn mapped_by_side(
        &mut self,
        entity: &str,
        property: &str,
        target: &str,
        mapped_by: &str,
    ) -> MappingResult<Shape> {
        if self.entities[target].association(mapped_by).is_none() {
            return Err(AssociationError::MissingMappedBy {
                entity: entity.to_string(),
                property: property.to_string(),
                target: target.to_string(),
                mapped_by: mapped_by.to_string(),
            }
            .into());
        }
        self.resolve(target, mapped_by)?;
        self.mark_bidirectional(target, mapped_by);

        let owning = self.entities[target]
            .association(mapped_by)
            .cloned()
            .expect("owning side resolved");

        if let Some(jt) = owning.join_table {
            // Same link table, seen from the other side.
            return Ok(Shape {
                join_columns: Vec::new(),
                join_table: Some(JoinTable {
                    table: jt.table,
                    owning: jt.inverse,
                    inverse: jt.owning,
                }),
                bidirectional: true,
            });
        }

        if owning.join_columns.is_empty() {
            return Err(AssociationError::InconsistentMappedBy {
                entity: entity.to_string(),
                property: property.to_string(),
                target: target.to_string(),
                mapped_by: mapped_by.to_string(),
            }
            .into());
        }

        // Owning side is a plain foreign key; this side is represented purely
        // through it, so no join table here either.
        let join_columns = owning
            .join_columns
            .iter()
            .map(|jc| {
                let mut swapped = jc.swapped();
                swapped.referenced_property = self.entities[target]
                    .property_by_column(&swapped.referenced)
                    .map(|p| p.name.clone());
                swapped
            })
            .collect();
        Ok(Shape {
            join_columns,
            join_table: None,
            bidirectional: true,
        })
    }

    /// Cases 2 and 3: owning side, explicit declarations honored, blanks
    /// defaulted, join table synthesized for unmatched to-many relations.
    fn owning_side(
        &mut self,
        entity: &str,
        property: &str,
        target: &str,
        kind: AssociationKind,
    ) -> MappingResult<Shape> {
        let key = (entity.to_string(), property.to_string());
        let relation = self.relations.get(&key).cloned().unwrap_or(RelationDef {
            kind,
            target: target.to_string(),
            mapped_by: None,
            join_columns: Vec::new(),
            join_table: None,
        });

        let wants_join_table = relation.join_table.is_some()
            || kind == AssociationKind::ManyToMany
            || (kind.is_collection() && relation.join_columns.is_empty());

        if kind.is_collection() && relation.join_columns.is_empty() && relation.join_table.is_none()
        {
            // A matching inverse many-to-one carries the foreign key; no join
            // table is synthesized then.
            let inverse = self.entities[target]
                .associations
                .iter()
                .find(|a| {
                    a.kind == AssociationKind::ManyToOne
                        && a.target == entity
                        && a.mapped_by.is_none()
                })
                .map(|a| a.name.clone());
            if let Some(inverse_name) = inverse {
                self.resolve(target, &inverse_name)?;
                self.mark_bidirectional(target, &inverse_name);
                let owning = self.entities[target]
                    .association(&inverse_name)
                    .cloned()
                    .expect("inverse side resolved");
                let join_columns = owning
                    .join_columns
                    .iter()
                    .map(|jc| {
                        let mut swapped = jc.swapped();
                        swapped.referenced_property = self.entities[target]
                            .property_by_column(&swapped.referenced)
                            .map(|p| p.name.clone());
                        swapped
                    })
                    .collect();
                return Ok(Shape {
                    join_columns,
                    join_table: None,
                    bidirectional: true,
                });
            }
        }

        if wants_join_table && kind.is_collection() {
            return self.join_table_shape(entity, property, target, &relation);
        }

        if kind.is_to_one() {
            return self.foreign_key_shape(property, target, &relation);
        }

        // To-many with explicit join columns: the foreign key lives on the
        // target table and points back at the owner's id.
        let owner_id = self.id_column(entity)?;
        let owner_entity_name = self.entities[entity].name.clone();
        let default_fk = format!(
            "{}_{}",
            self.config.naming.column_name(&owner_entity_name),
            owner_id
        );
        let join_columns = relation
            .join_columns
            .iter()
            .map(|def| {
                let fk = def.name.clone().unwrap_or_else(|| default_fk.clone());
                let local = def.referenced.clone().unwrap_or_else(|| owner_id.clone());
                let mut jc = JoinColumn::new(local, fk);
                jc.referenced_property = self.entities[target]
                    .property_by_column(&jc.referenced)
                    .map(|p| p.name.clone());
                jc
            })
            .collect();
        Ok(Shape {
            join_columns,
            join_table: None,
            bidirectional: false,
        })
    }

    /// Owning to-one: foreign key on the owner's table referencing the
    /// target's id.
    fn foreign_key_shape(
        &self,
        property: &str,
        target: &str,
        relation: &RelationDef,
    ) -> MappingResult<Shape> {
        let target_id = self.id_column(target)?;
        let default_fk = format!("{}_{}", self.config.naming.column_name(property), target_id);
        let defs: &[JoinColumnDef] = if relation.join_columns.is_empty() {
            &[JoinColumnDef {
                name: None,
                referenced: None,
            }]
        } else {
            &relation.join_columns
        };
        let join_columns = defs
            .iter()
            .map(|def| {
                let column = def.name.clone().unwrap_or_else(|| default_fk.clone());
                let referenced = def.referenced.clone().unwrap_or_else(|| target_id.clone());
                let mut jc = JoinColumn::new(column, referenced);
                jc.referenced_property = self.entities[target]
                    .property_by_column(&jc.referenced)
                    .map(|p| p.name.clone());
                jc
            })
            .collect();
        Ok(Shape {
            join_columns,
            join_table: None,
            bidirectional: false,
        })
    }

    /// Case 3: synthesize (or honor) a join table. Owning pairs reference the
    /// owner's id, inverse pairs the target's, both defaulting per convention.
    fn join_table_shape(
        &mut self,
        entity: &str,
        property: &str,
        target: &str,
        relation: &RelationDef,
    ) -> MappingResult<Shape> {
        let owner_id = self.id_column(entity)?;
        let target_id = self.id_column(target)?;
        let owner = &self.entities[entity];
        let target_entity = &self.entities[target];
        let naming = &self.config.naming;

        // Component table names already carry any configured prefix.
        let decl = relation.join_table.clone().unwrap_or_default();
        let table = decl
            .name
            .clone()
            .unwrap_or_else(|| format!("{}_{}", owner.table.name, target_entity.table.name));

        let default_owning = format!("{}_{}", naming.column_name(&owner.name), owner_id);
        let default_inverse = format!("{}_{}", naming.column_name(property), target_id);

        let fill = |defs: &[JoinColumnDef],
                    default_name: &str,
                    default_ref: &str,
                    referenced_entity: &Entity| {
            let defaults = [JoinColumnDef::default()];
            let defs = if defs.is_empty() { &defaults[..] } else { defs };
            defs.iter()
                .map(|def| {
                    let column = def
                        .name
                        .clone()
                        .unwrap_or_else(|| default_name.to_string());
                    let referenced = def
                        .referenced
                        .clone()
                        .unwrap_or_else(|| default_ref.to_string());
                    let mut jc = JoinColumn::new(column, referenced);
                    jc.referenced_property = referenced_entity
                        .property_by_column(&jc.referenced)
                        .map(|p| p.name.clone());
                    jc
                })
                .collect::<Vec<_>>()
        };

        let owning = fill(&decl.join_columns, &default_owning, &owner_id, owner);
        let inverse = fill(
            &decl.inverse_join_columns,
            &default_inverse,
            &target_id,
            target_entity,
        );

        Ok(Shape {
            join_columns: Vec::new(),
            join_table: Some(JoinTable {
                table,
                owning,
                inverse,
            }),
            bidirectional: false,
        })
    }

    /// Element collections get a collection table carrying the owner's key
    /// and no inverse side.
    fn collection_table(&mut self, entity: &str, property: &str) -> MappingResult<Shape> {
        let owner_id = self.id_column(entity)?;
        let owner = &self.entities[entity];
        let naming = &self.config.naming;
        let table = format!("{}_{}", owner.table.name, naming.column_name(property));
        let mut owning_col = JoinColumn::new(
            format!("{}_{}", naming.column_name(&owner.name), owner_id),
            owner_id.clone(),
        );
        owning_col.referenced_property = owner
            .property_by_column(&owning_col.referenced)
            .map(|p| p.name.clone());
        Ok(Shape {
            join_columns: Vec::new(),
            join_table: Some(JoinTable {
                table,
                owning: vec![owning_col],
                inverse: Vec::new(),
            }),
            bidirectional: false,
        })
    }

    /// Column of the entity's (first) identifier property. Convention
    /// defaults are impossible without one.
    fn id_column(&self, entity: &str) -> MappingResult<String> {
        let e = &self.entities[entity];
        e.id_properties
            .first()
            .and_then(|idx| e.properties.get(*idx))
            .map(|p| p.column.clone())
            .ok_or_else(|| MappingError::MissingId(entity.to_string()))
    }

    fn mark_bidirectional(&mut self, entity: &str, property: &str) {
        if let Some(a) = self
            .entities
            .get_mut(entity)
            .and_then(|e| e.associations.iter_mut().find(|a| a.name == property))
        {
            a.bidirectional = true;
        }
    }
}

struct Shape {
    join_columns: Vec<JoinColumn>,
    join_table: Option<JoinTable>,
    bidirectional: bool,
}
