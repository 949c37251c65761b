//! Tests for the built-in e-commerce catalog, resolved end to end.

use pretty_assertions::assert_eq;
use schema_erd::catalog;
use schema_erd::graph::{find_cycles, to_dot, to_mermaid, Layout};
use schema_erd::resolver::{resolve, Cardinality, Relationship, RelationshipGraph, ResolveOptions};
use schema_erd::schema::{SchemaDocument, SchemaRegistry};
use schema_erd::{build_diagram, generate, Error, FileExporter, OutputFormat, SchemaError};
use tempfile::TempDir;

fn resolved() -> (SchemaRegistry, Vec<Relationship>) {
    let registry = catalog::ecommerce().unwrap();
    let relationships = resolve(&registry, &ResolveOptions::default()).unwrap();
    (registry, relationships)
}

fn find<'a>(
    registry: &SchemaRegistry,
    relationships: &'a [Relationship],
    entity: &str,
    field: &str,
) -> &'a Relationship {
    let id = registry.entity_id(entity).unwrap();
    relationships
        .iter()
        .find(|r| r.source == id && r.source_field == field)
        .unwrap()
}

#[test]
fn test_catalog_entities() {
    let registry = catalog::ecommerce().unwrap();
    let names: Vec<&str> = registry.all().iter().map(|e| e.name.as_str()).collect();

    assert_eq!(
        names,
        vec![
            "User",
            "UserSession",
            "UserActivity",
            "Country",
            "Brand",
            "ProductCategory",
            "Certification",
            "Product",
            "ProductCertification",
            "BrandCertification",
            "Address",
            "PaymentMethod",
            "Order",
            "OrderItem",
            "ProductReview",
            "DatabaseAuditLog",
            "PerformanceMetric",
        ]
    );
    assert_eq!(registry.field_count(), 107);
}

#[test]
fn test_every_foreign_key_resolves_once() {
    let (registry, relationships) = resolved();

    let fk_count: usize = registry.all().iter().map(|e| e.foreign_keys().count()).sum();
    assert_eq!(relationships.len(), fk_count);
    assert_eq!(relationships.len(), 20);

    for (id, entity) in registry.iter() {
        for (field, reference) in entity.foreign_keys() {
            let matching: Vec<&Relationship> = relationships
                .iter()
                .filter(|r| r.source == id && r.source_field == field.name)
                .collect();
            assert_eq!(matching.len(), 1, "{}.{}", entity.name, field.name);
            assert_eq!(
                registry.entity(matching[0].target).unwrap().name,
                reference.entity
            );
        }
    }
}

#[test]
fn test_brand_headquarters_country() {
    let (registry, relationships) = resolved();
    let rel = find(&registry, &relationships, "Brand", "headquarters_country_id");

    assert_eq!(rel.name, "country");
    assert_eq!(rel.target, registry.entity_id("Country").unwrap());
    assert_eq!(rel.cardinality, Cardinality::ManyToOne);

    let back = rel.reciprocal().unwrap();
    assert_eq!(back.name, "brands");
    assert_eq!(back.cardinality, Cardinality::OneToMany);
}

#[test]
fn test_category_self_loop() {
    let (registry, relationships) = resolved();
    let loops: Vec<&Relationship> = relationships
        .iter()
        .filter(|r| r.is_self_reference())
        .collect();

    assert_eq!(loops.len(), 1);
    assert_eq!(loops[0].source, registry.entity_id("ProductCategory").unwrap());
    assert_eq!(loops[0].name, "parent_category");
    assert!(loops[0].is_optional);
}

#[test]
fn test_unidirectional_links() {
    let (registry, relationships) = resolved();

    let unidirectional: Vec<String> = relationships
        .iter()
        .filter(|r| !r.is_bidirectional())
        .map(|r| {
            format!(
                "{}.{}",
                registry.entity(r.source).unwrap().name,
                r.source_field
            )
        })
        .collect();

    assert_eq!(
        unidirectional,
        vec!["Address.country_id", "PaymentMethod.user_id"]
    );
}

#[test]
fn test_back_reference_symmetry() {
    let (_, relationships) = resolved();

    for rel in relationships.iter().filter(|r| r.is_bidirectional()) {
        let back = rel.reciprocal().unwrap();
        assert_eq!(back.cardinality, rel.cardinality.inverse());
        assert_eq!((back.source, back.target), (rel.target, rel.source));

        let forward = back.reciprocal().unwrap();
        assert_eq!(forward.name, rel.name);
        assert_eq!(forward.cardinality, rel.cardinality);
    }
}

#[test]
fn test_associations() {
    let (registry, relationships) = resolved();
    let graph = RelationshipGraph::new(&registry, &relationships);
    let name = |id| graph.entity_name(id).unwrap();

    let associations: Vec<String> = graph
        .associations()
        .iter()
        .map(|a| format!("{} <-> {} via {}", name(a.left), name(a.right), name(a.via)))
        .collect();

    assert_eq!(
        associations,
        vec![
            "Product <-> Certification via ProductCertification",
            "Brand <-> Certification via BrandCertification",
            "Order <-> Product via OrderItem",
            "Product <-> User via ProductReview",
        ]
    );
}

#[test]
fn test_dependency_order_is_acyclic() {
    let (registry, relationships) = resolved();
    let graph = RelationshipGraph::new(&registry, &relationships);
    let sorted = graph.dependency_order();

    assert!(sorted.cyclic.is_empty());
    assert_eq!(sorted.order.len(), registry.len());

    let position = |name: &str| {
        let id = registry.entity_id(name).unwrap();
        sorted.order.iter().position(|&o| o == id).unwrap()
    };
    assert!(position("Country") < position("Brand"));
    assert!(position("Brand") < position("Product"));
    assert!(position("Order") < position("OrderItem"));
}

#[test]
fn test_catalog_document_round_trip() {
    let registry = catalog::ecommerce().unwrap();
    let yaml = serde_yaml_ng::to_string(&SchemaDocument::from_registry(&registry)).unwrap();
    let reloaded: SchemaDocument = serde_yaml_ng::from_str(&yaml).unwrap();

    assert_eq!(reloaded.into_registry().unwrap().all(), registry.all());
}

#[test]
fn test_catalog_diagram_outputs() {
    let registry = catalog::ecommerce().unwrap();
    let diagram = build_diagram(&registry, &ResolveOptions::default()).unwrap();

    assert_eq!(diagram.entity_count(), 17);
    assert_eq!(diagram.edge_count(), 20);
    assert_eq!(diagram.associations.len(), 4);

    let dot = to_dot(&diagram, Layout::LR);
    assert!(dot.contains(
        "Brand:headquarters_country_id -> Country:country_id [label=\"country / brands\", arrowtail=crow, arrowhead=teetee];"
    ));
    assert!(dot.contains(
        "ProductCategory:parent_category_id -> ProductCategory:category_id [label=\"parent_category / subcategories\", arrowtail=crow, arrowhead=teeodot];"
    ));

    let mermaid = to_mermaid(&diagram);
    assert!(mermaid.contains("Brand }o--|| Country : \"country\""));
    assert!(mermaid.contains("datetime last_login \"nullable\""));

    // The only cycle in the catalog is the category hierarchy
    let cycles = find_cycles(&diagram);
    assert_eq!(cycles.len(), 1);
    assert!(cycles[0].is_self_reference());
}

#[test]
fn test_registry_returns_declared_entities() {
    let declared = catalog::entities().unwrap();
    let registry = catalog::ecommerce().unwrap();

    for entity in &declared {
        assert_eq!(registry.get(&entity.name).unwrap(), entity);
    }
}

#[test]
fn test_unregistered_target_fails_whole_resolution() {
    let mut entities = catalog::entities().unwrap();
    entities.retain(|e| e.name != "Country");
    let registry = SchemaRegistry::from_entities(entities).unwrap();

    let err = build_diagram(&registry, &ResolveOptions::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "unknown entity 'Country' (referenced by Brand.headquarters_country_id)"
    );
    assert!(matches!(err, SchemaError::UnknownEntity { .. }));
}

#[test]
fn test_generate_writes_requested_formats() {
    let dir = TempDir::new().unwrap();
    let registry = catalog::ecommerce().unwrap();
    let exporter = FileExporter::new(dir.path(), catalog::DEFAULT_BASENAME);

    let artifacts = generate(
        &registry,
        &ResolveOptions::default(),
        &exporter,
        &[OutputFormat::Json, OutputFormat::Mermaid],
    )
    .unwrap();

    assert_eq!(
        artifacts,
        vec![
            dir.path().join("sustainable_ecommerce_erd.json"),
            dir.path().join("sustainable_ecommerce_erd.mmd"),
        ]
    );
}

#[test]
fn test_generate_emits_nothing_on_schema_error() {
    let dir = TempDir::new().unwrap();
    let mut entities = catalog::entities().unwrap();
    entities.retain(|e| e.name != "User");
    let registry = SchemaRegistry::from_entities(entities).unwrap();
    let exporter = FileExporter::new(dir.path().join("out"), "shop");

    let err = generate(
        &registry,
        &ResolveOptions::default(),
        &exporter,
        &[OutputFormat::Dot],
    )
    .unwrap_err();

    assert!(matches!(err, Error::Schema(SchemaError::UnknownEntity { ref name, .. }) if name == "User"));
    assert!(!dir.path().join("out").exists());
}
