//! Relationship resolution.
//!
//! Derives relationship records from the foreign keys and relation fields
//! declared in a [`SchemaRegistry`]. Entities never hold live references to
//! each other; every record points at its endpoints by [`EntityId`], so
//! self-referential entities resolve like any other.

mod graph;

pub use graph::*;

use crate::error::{Result, SchemaError};
use crate::schema::{Entity, EntityId, Field, FieldRef, RelationField, SchemaRegistry};
use ahash::{AHashMap, AHashSet};
use serde::Serialize;
use std::fmt;

/// Relationship cardinality, read from the source side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    #[default]
    ManyToOne, // Most common: the entity holding the FK is the "many" side
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl Cardinality {
    /// The same relationship read from the other side
    pub fn inverse(self) -> Self {
        match self {
            Cardinality::ManyToOne => Cardinality::OneToMany,
            Cardinality::OneToMany => Cardinality::ManyToOne,
            Cardinality::OneToOne => Cardinality::OneToOne,
            Cardinality::ManyToMany => Cardinality::ManyToMany,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Cardinality::ManyToOne => "many-to-one",
            Cardinality::OneToOne => "one-to-one",
            Cardinality::OneToMany => "one-to-many",
            Cardinality::ManyToMany => "many-to-many",
        }
    }

    /// Mermaid ERD notation
    pub fn as_mermaid(self) -> &'static str {
        match self {
            Cardinality::ManyToOne => "}o--||",
            Cardinality::OneToOne => "||--||",
            Cardinality::OneToMany => "||--o{",
            Cardinality::ManyToMany => "}o--o{",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reciprocal relation declared on the target entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackReference {
    /// Relation field name on the target
    pub name: String,
    /// Cardinality read from the target side
    pub cardinality: Cardinality,
}

/// A resolved relationship, one per foreign key field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Forward relation name, or the FK field name when none is declared
    pub name: String,
    /// Entity holding the foreign key
    pub source: EntityId,
    /// Foreign key field
    pub source_field: String,
    /// Referenced entity
    pub target: EntityId,
    /// Referenced field (usually the primary key)
    pub target_field: String,
    pub cardinality: Cardinality,
    /// FK field is nullable
    pub is_optional: bool,
    pub back_reference: Option<BackReference>,
}

impl Relationship {
    pub fn is_self_reference(&self) -> bool {
        self.source == self.target
    }

    pub fn is_bidirectional(&self) -> bool {
        self.back_reference.is_some()
    }

    /// The target-side view of a bidirectional relationship
    pub fn reciprocal(&self) -> Option<Relationship> {
        let back = self.back_reference.as_ref()?;
        Some(Relationship {
            name: back.name.clone(),
            source: self.target,
            source_field: self.target_field.clone(),
            target: self.source,
            target_field: self.source_field.clone(),
            cardinality: back.cardinality,
            is_optional: true,
            back_reference: Some(BackReference {
                name: self.name.clone(),
                cardinality: self.cardinality,
            }),
        })
    }
}

/// Resolution settings.
///
/// By default a foreign key is paired with a collection on the target only
/// when one side names the other through `back_populates`. A foreign key
/// whose target merely declares a matching collection resolves one-way.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Pair a foreign key with an undeclared collection on the target when
    /// it is the only collection pointing back at the source
    pub infer_back_references: bool,
}

/// Resolve every foreign key in the registry into a relationship record.
///
/// Records are ordered by source declaration order, then field order.
/// Every declared `back_populates` must name an existing reciprocal that
/// points back at its owner; no records are returned otherwise.
pub fn resolve(registry: &SchemaRegistry, options: &ResolveOptions) -> Result<Vec<Relationship>> {
    let explicit = explicit_reciprocals(registry);
    let mut claimed: AHashSet<(EntityId, String)> = AHashSet::new();
    let mut used: AHashSet<(EntityId, String)> = AHashSet::new();
    let mut relationships = Vec::new();

    for (entity_id, entity) in registry.iter() {
        let bindings = bind_forward_relations(entity)?;

        for (field, reference) in entity.foreign_keys() {
            let (target_id, target) = registry.lookup(&reference.entity).map_err(|_| {
                SchemaError::UnknownEntity {
                    name: reference.entity.clone(),
                    referenced_by: Some(format!("{}.{}", entity.name, field.name)),
                }
            })?;
            let target_field = target
                .field(&reference.field)
                .ok_or_else(|| SchemaError::UnknownField {
                    entity: target.name.clone(),
                    field: reference.field.clone(),
                })?;

            let forward = bindings.get(field.name.as_str()).copied();
            if let Some(forward) = forward {
                check_forward(entity, forward, reference)?;
                used.insert((entity_id, forward.name.clone()));
            }

            let reciprocal = match find_reciprocal(entity, forward, target)? {
                Some(reciprocal) => Some(reciprocal),
                None if options.infer_back_references => {
                    infer_reciprocal(entity, target_id, target, &explicit, &claimed)
                }
                None => None,
            };

            let relationship = build_relationship(
                (entity_id, field, forward),
                (target_id, target_field),
                reciprocal,
            );
            if let Some(reciprocal) = reciprocal {
                claimed.insert((target_id, reciprocal.name.clone()));
                used.insert((target_id, reciprocal.name.clone()));
            }

            tracing::debug!(
                source = %entity.name,
                target = %target.name,
                field = %field.name,
                cardinality = %relationship.cardinality,
                bidirectional = relationship.is_bidirectional(),
                "resolved relationship"
            );
            relationships.push(relationship);
        }
    }

    check_back_references(registry)?;

    for (entity_id, entity) in registry.iter() {
        for relation in &entity.relations {
            if !used.contains(&(entity_id, relation.name.clone())) {
                tracing::warn!(
                    entity = %entity.name,
                    relation = %relation.name,
                    target = %relation.target,
                    "relation field is not backed by any foreign key"
                );
            }
        }
    }

    Ok(relationships)
}

fn build_relationship(
    (source, field, forward): (EntityId, &Field, Option<&RelationField>),
    (target, target_field): (EntityId, &Field),
    reciprocal: Option<&RelationField>,
) -> Relationship {
    let cardinality = match reciprocal {
        Some(r) if !r.is_many() => Cardinality::OneToOne,
        _ => Cardinality::ManyToOne,
    };

    Relationship {
        name: forward
            .map(|r| r.name.clone())
            .unwrap_or_else(|| field.name.clone()),
        source,
        source_field: field.name.clone(),
        target,
        target_field: target_field.name.clone(),
        cardinality,
        is_optional: field.is_nullable,
        back_reference: reciprocal.map(|r| BackReference {
            name: r.name.clone(),
            cardinality: cardinality.inverse(),
        }),
    }
}

/// Validate every relation that names a reciprocal, from either side.
///
/// The reciprocal must exist on the target, point back at the owner, name
/// the owner (or nothing) as its own partner, and at most one of the two
/// sides may be a collection.
fn check_back_references(registry: &SchemaRegistry) -> Result<()> {
    for entity in registry.all() {
        for relation in &entity.relations {
            let target = registry
                .get(&relation.target)
                .map_err(|_| SchemaError::UnknownEntity {
                    name: relation.target.clone(),
                    referenced_by: Some(format!("{}.{}", entity.name, relation.name)),
                })?;
            let Some(name) = relation.back_populates.as_deref() else {
                continue;
            };

            let reciprocal = target
                .relation(name)
                .ok_or_else(|| SchemaError::UnknownField {
                    entity: target.name.clone(),
                    field: name.to_string(),
                })?;

            let inconsistent = |expected: String, found: String| SchemaError::InconsistentCardinality {
                entity: target.name.clone(),
                relation: reciprocal.name.clone(),
                expected,
                found,
            };

            if reciprocal.target != entity.name {
                return Err(inconsistent(
                    format!("relation to {}", entity.name),
                    format!("relation to {}", reciprocal.target),
                ));
            }
            if let Some(other) = reciprocal.back_populates.as_deref() {
                if other != relation.name {
                    return Err(inconsistent(
                        format!("back_populates '{}'", relation.name),
                        format!("back_populates '{}'", other),
                    ));
                }
            }
            if relation.is_many() && reciprocal.is_many() {
                return Err(inconsistent(
                    format!(
                        "single-valued reciprocal of collection {}.{}",
                        entity.name, relation.name
                    ),
                    "collection".to_string(),
                ));
            }
        }
    }
    Ok(())
}

/// Map each foreign key field to the relation field that navigates it.
///
/// Explicit `foreign_key` bindings win, then the `<relation>_id` naming
/// convention, then the single remaining relation to the same target.
fn bind_forward_relations(entity: &Entity) -> Result<AHashMap<&str, &RelationField>> {
    let mut bindings: AHashMap<&str, &RelationField> = AHashMap::new();
    let mut bound: AHashSet<&str> = AHashSet::new();

    for relation in &entity.relations {
        if let Some(fk) = relation.foreign_key.as_deref() {
            let field = entity
                .field(fk)
                .filter(|f| f.references().is_some())
                .ok_or_else(|| SchemaError::UnknownField {
                    entity: entity.name.clone(),
                    field: fk.to_string(),
                })?;
            bindings.insert(field.name.as_str(), relation);
            bound.insert(relation.name.as_str());
        }
    }

    for (field, reference) in entity.foreign_keys() {
        if bindings.contains_key(field.name.as_str()) {
            continue;
        }
        let Some(stem) = field.name.strip_suffix("_id") else {
            continue;
        };
        if let Some(relation) = entity
            .relation(stem)
            .filter(|r| !r.is_many() && r.target == reference.entity && !bound.contains(r.name.as_str()))
        {
            bindings.insert(field.name.as_str(), relation);
            bound.insert(relation.name.as_str());
        }
    }

    let unbound: Vec<(&Field, &FieldRef)> = entity
        .foreign_keys()
        .filter(|(f, _)| !bindings.contains_key(f.name.as_str()))
        .collect();

    for &(field, reference) in &unbound {
        let same_target = unbound
            .iter()
            .filter(|(_, r)| r.entity == reference.entity)
            .count();
        let candidates: Vec<&RelationField> = entity
            .relations_to(&reference.entity)
            .filter(|r| !r.is_many() && r.foreign_key.is_none() && !bound.contains(r.name.as_str()))
            .collect();

        if same_target == 1 && candidates.len() == 1 {
            bindings.insert(field.name.as_str(), candidates[0]);
            bound.insert(candidates[0].name.as_str());
        }
    }

    Ok(bindings)
}

fn check_forward(entity: &Entity, forward: &RelationField, reference: &FieldRef) -> Result<()> {
    if forward.is_many() {
        return Err(SchemaError::InconsistentCardinality {
            entity: entity.name.clone(),
            relation: forward.name.clone(),
            expected: "single-valued relation for a foreign key".to_string(),
            found: "collection".to_string(),
        });
    }
    if forward.target != reference.entity {
        return Err(SchemaError::InconsistentCardinality {
            entity: entity.name.clone(),
            relation: forward.name.clone(),
            expected: format!("relation to {}", reference.entity),
            found: format!("relation to {}", forward.target),
        });
    }
    Ok(())
}

/// Find the reciprocal relation declared on the target.
fn find_reciprocal<'a>(
    source: &Entity,
    forward: Option<&RelationField>,
    target: &'a Entity,
) -> Result<Option<&'a RelationField>> {
    let Some(forward) = forward else {
        return Ok(None);
    };

    if let Some(name) = forward.back_populates.as_deref() {
        let reciprocal = target
            .relation(name)
            .ok_or_else(|| SchemaError::UnknownField {
                entity: target.name.clone(),
                field: name.to_string(),
            })?;

        if reciprocal.target != source.name {
            return Err(SchemaError::InconsistentCardinality {
                entity: target.name.clone(),
                relation: reciprocal.name.clone(),
                expected: format!("relation to {}", source.name),
                found: format!("relation to {}", reciprocal.target),
            });
        }
        if let Some(other) = reciprocal.back_populates.as_deref() {
            if other != forward.name {
                return Err(SchemaError::InconsistentCardinality {
                    entity: target.name.clone(),
                    relation: reciprocal.name.clone(),
                    expected: format!("back_populates '{}'", forward.name),
                    found: format!("back_populates '{}'", other),
                });
            }
        }
        return Ok(Some(reciprocal));
    }

    Ok(target
        .relations_to(&source.name)
        .find(|r| r.back_populates.as_deref() == Some(forward.name.as_str())))
}

/// Type-matching fallback: the single unclaimed collection on the target
/// that points back at the source.
fn infer_reciprocal<'a>(
    source: &Entity,
    target_id: EntityId,
    target: &'a Entity,
    explicit: &AHashSet<(String, String)>,
    claimed: &AHashSet<(EntityId, String)>,
) -> Option<&'a RelationField> {
    let candidates: Vec<&RelationField> = target
        .relations_to(&source.name)
        .filter(|r| {
            r.is_many()
                && r.back_populates.is_none()
                && !explicit.contains(&(target.name.clone(), r.name.clone()))
                && !claimed.contains(&(target_id, r.name.clone()))
        })
        .collect();

    match candidates.as_slice() {
        [only] => Some(*only),
        _ => None,
    }
}

/// Every (entity, relation) named by some `back_populates`
fn explicit_reciprocals(registry: &SchemaRegistry) -> AHashSet<(String, String)> {
    registry
        .all()
        .iter()
        .flat_map(|e| e.relations.iter())
        .filter_map(|r| {
            r.back_populates
                .as_ref()
                .map(|name| (r.target.clone(), name.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    fn registry(entities: Vec<Entity>) -> SchemaRegistry {
        SchemaRegistry::from_entities(entities).unwrap()
    }

    fn user() -> Entity {
        Entity::builder("User")
            .primary_key("user_id", FieldType::Integer)
            .relation(RelationField::many("orders", "Order"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_cardinality_inverse() {
        assert_eq!(Cardinality::ManyToOne.inverse(), Cardinality::OneToMany);
        assert_eq!(Cardinality::OneToOne.inverse(), Cardinality::OneToOne);
        assert_eq!(Cardinality::ManyToMany.to_string(), "many-to-many");
    }

    #[test]
    fn test_naming_convention_binds_relation() {
        let session = Entity::builder("UserSession")
            .primary_key("session_id", FieldType::Integer)
            .foreign_key("user_id", FieldType::Integer, "User", "user_id")
            .relation(RelationField::one("user", "User"))
            .build()
            .unwrap();

        let bindings = bind_forward_relations(&session).unwrap();
        assert_eq!(bindings["user_id"].name, "user");
    }

    #[test]
    fn test_sole_relation_binds_unconventional_fk() {
        let brand = Entity::builder("Brand")
            .primary_key("brand_id", FieldType::Integer)
            .foreign_key("headquarters_country_id", FieldType::Integer, "Country", "country_id")
            .relation(RelationField::one("country", "Country"))
            .build()
            .unwrap();

        let bindings = bind_forward_relations(&brand).unwrap();
        assert_eq!(bindings["headquarters_country_id"].name, "country");
    }

    #[test]
    fn test_ambiguous_fks_stay_unbound() {
        let order = Entity::builder("Order")
            .primary_key("order_id", FieldType::Integer)
            .foreign_key("billing_id", FieldType::Integer, "Address", "address_id")
            .foreign_key("shipping_id", FieldType::Integer, "Address", "address_id")
            .relation(RelationField::one("address", "Address"))
            .build()
            .unwrap();

        assert!(bind_forward_relations(&order).unwrap().is_empty());
    }

    #[test]
    fn test_collection_bound_to_fk_is_inconsistent() {
        let order = Entity::builder("Order")
            .primary_key("order_id", FieldType::Integer)
            .foreign_key("user_id", FieldType::Integer, "User", "user_id")
            .relation(RelationField::many("users", "User").via("user_id"))
            .build()
            .unwrap();

        let err = resolve(&registry(vec![user(), order]), &ResolveOptions::default()).unwrap_err();
        assert!(matches!(err, SchemaError::InconsistentCardinality { ref relation, .. } if relation == "users"));
    }

    #[test]
    fn test_missing_target_field() {
        let order = Entity::builder("Order")
            .primary_key("order_id", FieldType::Integer)
            .foreign_key("user_id", FieldType::Integer, "User", "id")
            .build()
            .unwrap();

        let err = resolve(&registry(vec![user(), order]), &ResolveOptions::default()).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownField { ref entity, ref field } if entity == "User" && field == "id"));
    }

    #[test]
    fn test_reciprocal_view() {
        let rel = Relationship {
            name: "country".to_string(),
            source: EntityId(1),
            source_field: "headquarters_country_id".to_string(),
            target: EntityId(0),
            target_field: "country_id".to_string(),
            cardinality: Cardinality::ManyToOne,
            is_optional: false,
            back_reference: Some(BackReference {
                name: "brands".to_string(),
                cardinality: Cardinality::OneToMany,
            }),
        };

        let back = rel.reciprocal().unwrap();
        assert_eq!(back.name, "brands");
        assert_eq!(back.source, EntityId(0));
        assert_eq!(back.target, EntityId(1));
        assert_eq!(back.cardinality, Cardinality::OneToMany);
        assert_eq!(back.back_reference.unwrap().name, "country");
    }
}
