//! Built-in sustainable e-commerce schema.
//!
//! Entities are declared in diagram order. Collections on the "one" side
//! name their reciprocal through `back_populates` on the foreign key side.

use crate::error::Result;
use crate::schema::{Entity, FieldType::*, RelationField, SchemaRegistry};

/// Default artifact basename
pub const DEFAULT_BASENAME: &str = "sustainable_ecommerce_erd";

/// Build the registry of all e-commerce entities
pub fn ecommerce() -> Result<SchemaRegistry> {
    SchemaRegistry::from_entities(entities()?)
}

/// The e-commerce entities in declaration order
pub fn entities() -> Result<Vec<Entity>> {
    Ok(vec![
        Entity::builder("User")
            .primary_key("user_id", Integer)
            .field("email", String)
            .field("password_hash", String)
            .field("first_name", String)
            .field("last_name", String)
            .field("created_at", Timestamp)
            .optional("last_login", Timestamp)
            .field("sustainability_preferences", Mapping)
            .has_many("sessions", "UserSession")
            .has_many("activities", "UserActivity")
            .has_many("orders", "Order")
            .has_many("reviews", "ProductReview")
            .has_many("audit_logs", "DatabaseAuditLog")
            .build()?,
        Entity::builder("UserSession")
            .primary_key("session_id", Integer)
            .foreign_key("user_id", Integer, "User", "user_id")
            .field("login_time", Timestamp)
            .field("last_activity", Timestamp)
            .field("ip_address", String)
            .field("device_info", String)
            .relation(RelationField::one("user", "User").back_populates("sessions"))
            .build()?,
        Entity::builder("UserActivity")
            .primary_key("activity_id", Integer)
            .foreign_key("user_id", Integer, "User", "user_id")
            .field("activity_type", String)
            .field("timestamp", Timestamp)
            .field("details", Mapping)
            .relation(RelationField::one("user", "User").back_populates("activities"))
            .build()?,
        Entity::builder("Country")
            .primary_key("country_id", Integer)
            .field("name", String)
            .has_many("brands", "Brand")
            .build()?,
        Entity::builder("Brand")
            .primary_key("brand_id", Integer)
            .field("name", String)
            .field("description", String)
            .field("founded_year", Integer)
            .field("sustainability_statement", String)
            .foreign_key("headquarters_country_id", Integer, "Country", "country_id")
            .has_many("products", "Product")
            .has_many("certifications", "BrandCertification")
            .relation(RelationField::one("country", "Country").back_populates("brands"))
            .build()?,
        Entity::builder("ProductCategory")
            .primary_key("category_id", Integer)
            .optional_foreign_key("parent_category_id", Integer, "ProductCategory", "category_id")
            .field("name", String)
            .field("description", String)
            .has_many("products", "Product")
            .has_many("subcategories", "ProductCategory")
            .relation(
                RelationField::one("parent_category", "ProductCategory")
                    .back_populates("subcategories"),
            )
            .build()?,
        Entity::builder("Certification")
            .primary_key("certification_id", Integer)
            .field("name", String)
            .field("issuing_organization", String)
            .field("description", String)
            .field("verification_process", String)
            .field("website_url", String)
            .has_many("product_certifications", "ProductCertification")
            .has_many("brand_certifications", "BrandCertification")
            .build()?,
        Entity::builder("Product")
            .primary_key("product_id", Integer)
            .foreign_key("brand_id", Integer, "Brand", "brand_id")
            .foreign_key("category_id", Integer, "ProductCategory", "category_id")
            .field("name", String)
            .field("description", String)
            .field("price", Decimal)
            .field("cost", Decimal)
            .field("stock_quantity", Integer)
            .field("carbon_footprint", Decimal)
            .field("created_at", Timestamp)
            .field("updated_at", Timestamp)
            .relation(RelationField::one("brand", "Brand").back_populates("products"))
            .relation(RelationField::one("category", "ProductCategory").back_populates("products"))
            .has_many("certifications", "ProductCertification")
            .has_many("order_items", "OrderItem")
            .has_many("reviews", "ProductReview")
            .build()?,
        certification_link("ProductCertification", "product", "Product", "certifications")?,
        certification_link("BrandCertification", "brand", "Brand", "certifications")?,
        Entity::builder("Address")
            .primary_key("address_id", Integer)
            .field("address_line1", String)
            .optional("address_line2", String)
            .field("city", String)
            .field("state", String)
            .field("postal_code", String)
            .foreign_key("country_id", Integer, "Country", "country_id")
            .has_many("orders", "Order")
            .build()?,
        Entity::builder("PaymentMethod")
            .primary_key("payment_method_id", Integer)
            .foreign_key("user_id", Integer, "User", "user_id")
            .field("method_type", String)
            .field("details", Mapping)
            .has_many("orders", "Order")
            .build()?,
        Entity::builder("Order")
            .primary_key("order_id", Integer)
            .foreign_key("user_id", Integer, "User", "user_id")
            .field("order_date", Timestamp)
            .foreign_key("shipping_address_id", Integer, "Address", "address_id")
            .foreign_key("payment_method_id", Integer, "PaymentMethod", "payment_method_id")
            .field("status", String)
            .field("total_amount", Decimal)
            .field("carbon_offset_amount", Decimal)
            .relation(RelationField::one("user", "User").back_populates("orders"))
            .relation(RelationField::one("shipping_address", "Address").back_populates("orders"))
            .relation(RelationField::one("payment_method", "PaymentMethod").back_populates("orders"))
            .has_many("items", "OrderItem")
            .build()?,
        Entity::builder("OrderItem")
            .primary_key("order_item_id", Integer)
            .foreign_key("order_id", Integer, "Order", "order_id")
            .foreign_key("product_id", Integer, "Product", "product_id")
            .field("quantity", Integer)
            .field("unit_price", Decimal)
            .field("subtotal", Decimal)
            .relation(RelationField::one("order", "Order").back_populates("items"))
            .relation(RelationField::one("product", "Product").back_populates("order_items"))
            .build()?,
        Entity::builder("ProductReview")
            .primary_key("review_id", Integer)
            .foreign_key("product_id", Integer, "Product", "product_id")
            .foreign_key("user_id", Integer, "User", "user_id")
            .field("rating", Integer)
            .field("sustainability_rating", Integer)
            .field("review_text", String)
            .field("created_at", Timestamp)
            .field("helpful_votes", Integer)
            .relation(RelationField::one("product", "Product").back_populates("reviews"))
            .relation(RelationField::one("user", "User").back_populates("reviews"))
            .build()?,
        Entity::builder("DatabaseAuditLog")
            .primary_key("log_id", Integer)
            .foreign_key("user_id", Integer, "User", "user_id")
            .field("action_type", String)
            .field("table_affected", String)
            .field("record_id", Integer)
            .field("timestamp", Timestamp)
            .field("ip_address", String)
            .relation(RelationField::one("user", "User").back_populates("audit_logs"))
            .build()?,
        Entity::builder("PerformanceMetric")
            .primary_key("metric_id", Integer)
            .field("metric_type", String)
            .field("value", Decimal)
            .field("timestamp", Timestamp)
            .field("details", Mapping)
            .build()?,
    ])
}

/// Product and brand certifications share one shape
fn certification_link(
    name: &str,
    owner_relation: &str,
    owner: &str,
    owner_collection: &str,
) -> Result<Entity> {
    let owner_fk = format!("{}_id", owner_relation);
    let owner_pk = format!("{}_id", owner_relation);
    let link_collection = format!("{}_certifications", owner_relation);

    Entity::builder(name)
        .primary_key(&format!("{}_certification_id", owner_relation), Integer)
        .foreign_key(&owner_fk, Integer, owner, &owner_pk)
        .foreign_key("certification_id", Integer, "Certification", "certification_id")
        .field("issue_date", Timestamp)
        .field("expiration_date", Timestamp)
        .field("verification_document_url", String)
        .field("verification_status", String)
        .relation(RelationField::one(owner_relation, owner).back_populates(owner_collection))
        .relation(RelationField::one("certification", "Certification").back_populates(link_collection))
        .build()
}
