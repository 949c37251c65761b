//! Graphviz DOT format output for ERD diagrams.

use crate::graph::diagram::{Diagram, EdgeInfo, EntityInfo};
use crate::graph::format::Layout;
use crate::resolver::Cardinality;

/// Generate DOT output with ERD-style entities showing all fields
pub fn to_dot(diagram: &Diagram, layout: Layout) -> String {
    let mut output = String::new();

    output.push_str("digraph ERD {\n");
    output.push_str("  graph [pad=\"0.5\", nodesep=\"1\", ranksep=\"1.5\"];\n");

    let rankdir = match layout {
        Layout::LR => "LR",
        Layout::TB => "TB",
    };
    output.push_str(&format!("  rankdir={};\n", rankdir));

    output.push_str("  node [shape=none, margin=0];\n");
    output.push_str("  edge [dir=both];\n\n");

    for entity in &diagram.entities {
        output.push_str(&format!(
            "  {} [label=<{}>];\n",
            escape_dot_id(&entity.name),
            entity_label(entity)
        ));
    }

    if !diagram.edges.is_empty() {
        output.push('\n');
    }

    for edge in &diagram.edges {
        let (tail, head) = arrowheads(edge);
        output.push_str(&format!(
            "  {}:{} -> {}:{} [label=\"{}\", arrowtail={}, arrowhead={}];\n",
            escape_dot_id(&edge.from_entity),
            escape_dot_id(&edge.from_field),
            escape_dot_id(&edge.to_entity),
            escape_dot_id(&edge.to_field),
            edge_label(edge).replace('"', "\\\""),
            tail,
            head
        ));
    }

    if !diagram.associations.is_empty() {
        output.push('\n');
    }

    for assoc in &diagram.associations {
        output.push_str(&format!(
            "  {} -> {} [style=dashed, arrowtail=crow, arrowhead=crow, constraint=false, label=\"via {}\"];\n",
            escape_dot_id(&assoc.left),
            escape_dot_id(&assoc.right),
            assoc.via.replace('"', "\\\"")
        ));
    }

    output.push_str("}\n");
    output
}

/// Crow's foot markers for the (source, target) ends
fn arrowheads(edge: &EdgeInfo) -> (&'static str, &'static str) {
    let one = if edge.is_optional { "teeodot" } else { "teetee" };
    match edge.cardinality {
        Cardinality::ManyToOne => ("crow", one),
        Cardinality::OneToOne => ("teetee", one),
        Cardinality::OneToMany => (one, "crow"),
        Cardinality::ManyToMany => ("crow", "crow"),
    }
}

fn edge_label(edge: &EdgeInfo) -> String {
    match &edge.back_reference {
        Some(back) => format!("{} / {}", edge.name, back),
        None => edge.name.clone(),
    }
}

/// Generate HTML-like entity label for DOT
fn entity_label(entity: &EntityInfo) -> String {
    let mut html = String::new();

    html.push_str("<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\" CELLPADDING=\"4\">");
    html.push_str(&format!(
        "<TR><TD BGCOLOR=\"#4a5568\" COLSPAN=\"3\"><FONT COLOR=\"white\"><B>{}</B></FONT></TD></TR>",
        escape_html(&entity.name)
    ));

    for field in &entity.fields {
        let key_marker = if field.is_primary_key {
            "PK"
        } else if field.is_foreign_key {
            "FK"
        } else {
            ""
        };

        let field_type = if field.is_nullable {
            format!("{}?", field.field_type)
        } else {
            field.field_type.clone()
        };

        html.push_str("<TR>");
        html.push_str(&format!(
            "<TD ALIGN=\"LEFT\" PORT=\"{}\">{}</TD>",
            escape_html(&field.name),
            escape_html(&field.name)
        ));
        html.push_str(&format!(
            "<TD ALIGN=\"LEFT\"><FONT COLOR=\"#666666\">{}</FONT></TD>",
            escape_html(&field_type)
        ));
        html.push_str(&format!("<TD ALIGN=\"CENTER\">{}</TD>", key_marker));
        html.push_str("</TR>");
    }

    for relation in &entity.relations {
        html.push_str("<TR>");
        html.push_str(&format!(
            "<TD ALIGN=\"LEFT\"><I>{}</I></TD>",
            escape_html(&relation.name)
        ));
        html.push_str(&format!(
            "<TD ALIGN=\"LEFT\" COLSPAN=\"2\"><FONT COLOR=\"#888888\">{}</FONT></TD>",
            escape_html(&relation.type_label())
        ));
        html.push_str("</TR>");
    }

    html.push_str("</TABLE>");
    html
}

/// Escape a string for use in DOT HTML labels
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Escape a string for use as a DOT node ID
fn escape_dot_id(s: &str) -> String {
    if s.chars().all(|c| c.is_alphanumeric() || c == '_') && !s.is_empty() {
        s.to_string()
    } else {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    }
}
