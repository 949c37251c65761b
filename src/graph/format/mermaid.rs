//! Mermaid erDiagram format output.

use crate::graph::diagram::Diagram;

/// Generate Mermaid erDiagram from a diagram
pub fn to_mermaid(diagram: &Diagram) -> String {
    let mut output = String::new();

    output.push_str("erDiagram\n");

    for entity in &diagram.entities {
        output.push_str(&format!("    {} {{\n", escape_mermaid_id(&entity.name)));

        for field in &entity.fields {
            let key_marker = if field.is_primary_key {
                "PK"
            } else if field.is_foreign_key {
                "FK"
            } else {
                ""
            };

            let field_type = escape_mermaid_id(&field.field_type);
            let field_name = escape_mermaid_id(&field.name);

            match (key_marker.is_empty(), field.is_nullable) {
                (true, false) => output.push_str(&format!("        {} {}\n", field_type, field_name)),
                (true, true) => output.push_str(&format!(
                    "        {} {} \"nullable\"\n",
                    field_type, field_name
                )),
                (false, _) => output.push_str(&format!(
                    "        {} {} {}\n",
                    field_type, field_name, key_marker
                )),
            }
        }

        output.push_str("    }\n");
    }

    if !diagram.edges.is_empty() {
        output.push('\n');
    }

    for edge in &diagram.edges {
        output.push_str(&format!(
            "    {} {} {} : \"{}\"\n",
            escape_mermaid_id(&edge.from_entity),
            edge.cardinality.as_mermaid(),
            escape_mermaid_id(&edge.to_entity),
            edge.name.replace('"', "'")
        ));
    }

    output
}

/// Escape a string for use as a Mermaid identifier
fn escape_mermaid_id(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::diagram::fixtures::user_orders;

    #[test]
    fn test_mermaid_er_diagram() {
        let output = to_mermaid(&user_orders());

        assert!(output.starts_with("erDiagram\n"));
        assert!(output.contains("    User {"));
        assert!(output.contains("    Order {"));
    }

    #[test]
    fn test_mermaid_fields() {
        let output = to_mermaid(&user_orders());

        assert!(output.contains("int user_id PK"));
        assert!(output.contains("int user_id FK"));
        assert!(output.contains("str email\n"));
    }

    #[test]
    fn test_mermaid_relationships() {
        let output = to_mermaid(&user_orders());
        assert!(output.contains("Order }o--|| User : \"user\""));
    }
}
