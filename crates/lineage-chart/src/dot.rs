//! DOT emission for a [`FamilyGraph`].
//!
//! Two label flavours are supported. [`LabelMode::Html`] draws each person as
//! a small table (photo on top when available, bold name and birth year
//! below). [`LabelMode::Plain`] is a filled box with a quoted text label; it
//! is the fallback when a backend refuses the HTML markup.

use std::fmt::Write as _;

use lineage_core::graph::{Edge, FamilyGraph, LineStyle, Node};
use quick_xml::escape::escape;

/// Side of the square photo cell, in points.
const PHOTO_CELL: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMode {
  Html,
  Plain,
}

/// Escape text for a double-quoted DOT string.
fn dot_escape(s: &str) -> String {
  s.replace('\\', "\\\\")
    .replace('"', "\\\"")
    .replace('\r', "")
    .replace('\n', "\\n")
}

fn quoted(s: &str) -> String { format!("\"{}\"", dot_escape(s)) }

fn html_label(node: &Node) -> String {
  let mut rows = String::new();
  if let Some(photo) = &node.label.photo {
    let src = photo.to_string_lossy();
    let _ = write!(
      rows,
      "<TR><TD FIXEDSIZE=\"TRUE\" WIDTH=\"{PHOTO_CELL}\" HEIGHT=\"{PHOTO_CELL}\">\
       <IMG SRC=\"{}\"/></TD></TR>",
      escape(&*src)
    );
  }
  let _ = write!(
    rows,
    "<TR><TD><B>{}</B><BR/>{}</TD></TR>",
    escape(node.label.name.as_str()),
    node.label.birth_year
  );
  format!(
    "<<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\" BGCOLOR=\"{}\">{rows}</TABLE>>",
    node.fill
  )
}

fn node_line(node: &Node, mode: LabelMode) -> String {
  let id = quoted(&node.key());
  match mode {
    LabelMode::Html => format!("  {id} [shape=none, label={}];\n", html_label(node)),
    LabelMode::Plain => format!(
      "  {id} [shape=box, style=filled, fillcolor={}, label={}];\n",
      quoted(node.fill),
      quoted(&node.label.text())
    ),
  }
}

fn edge_line(edge: &Edge) -> String {
  let style = edge.style();
  let mut attrs: Vec<String> = Vec::new();
  if style.line == LineStyle::Dashed {
    attrs.push("style=dashed".to_string());
  }
  if let Some(color) = style.color {
    attrs.push(format!("color={}", quoted(color)));
  }
  if !style.constraint {
    attrs.push("constraint=false".to_string());
  }
  if !style.directed {
    attrs.push("dir=none".to_string());
  }

  let from = quoted(&edge.from.to_string());
  let to = quoted(&edge.to.to_string());
  if attrs.is_empty() {
    format!("  {from} -> {to};\n")
  } else {
    format!("  {from} -> {to} [{}];\n", attrs.join(", "))
  }
}

/// Render `graph` as a Graphviz digraph.
pub fn render_dot(graph: &FamilyGraph, mode: LabelMode) -> String {
  let mut out = String::new();
  out.push_str("digraph lineage {\n");
  out.push_str("  rankdir=TB;\n");
  out.push_str("  splines=ortho;\n");
  out.push_str("  node [fontname=\"Helvetica\"];\n\n");

  for node in &graph.nodes {
    out.push_str(&node_line(node, mode));
  }

  if !graph.edges.is_empty() {
    out.push('\n');
  }
  for edge in &graph.edges {
    out.push_str(&edge_line(edge));
  }

  if !graph.same_rank.is_empty() {
    out.push('\n');
  }
  for [a, b] in &graph.same_rank {
    let _ = writeln!(
      out,
      "  {{ rank=same; {}; {}; }}",
      quoted(&a.to_string()),
      quoted(&b.to_string())
    );
  }

  out.push_str("}\n");
  out
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use chrono::Utc;
  use lineage_core::{
    graph::NoPhotos,
    person::{Gender, NewPerson, PersonId, PersonRecord},
  };

  use super::*;

  fn person(id: u64, name: &str, gender: Gender, parent: &str, spouse: &str) -> PersonRecord {
    let input = NewPerson::new(name, gender, 1370 - id as i32)
      .with_parent(parent)
      .with_spouse(spouse);
    PersonRecord::from_new(PersonId(id), input, Utc::now())
  }

  fn family() -> FamilyGraph {
    FamilyGraph::build(
      &[
        person(1, "Hasan", Gender::Male, "", ""),
        person(2, "Zahra", Gender::Female, "", "1"),
        person(3, "Ali", Gender::Male, "1", ""),
      ],
      &NoPhotos,
    )
  }

  #[test]
  fn header_sets_top_to_bottom_orthogonal_layout() {
    let dot = render_dot(&FamilyGraph::default(), LabelMode::Html);
    assert!(dot.starts_with("digraph lineage {\n"));
    assert!(dot.contains("rankdir=TB;"));
    assert!(dot.contains("splines=ortho;"));
    assert!(dot.trim_end().ends_with('}'));
  }

  #[test]
  fn html_nodes_carry_fill_name_and_year() {
    let dot = render_dot(&family(), LabelMode::Html);
    assert!(dot.contains(
      "\"2\" [shape=none, label=<<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\" \
       BGCOLOR=\"#FFD1DC\"><TR><TD><B>Zahra</B><BR/>1368</TD></TR></TABLE>>];"
    ));
    assert!(dot.contains("BGCOLOR=\"#ADD8E6\""));
    assert!(!dot.contains("<IMG"));
  }

  #[test]
  fn photo_row_is_added_when_resolved() {
    let lookup = |_: &str| Some(PathBuf::from("/srv/photos/1_circle.png"));
    let mut rec = person(1, "Hasan", Gender::Male, "", "");
    rec.photo_path = Some("photos/1_circle.png".into());
    let graph = FamilyGraph::build(&[rec], &lookup);

    let dot = render_dot(&graph, LabelMode::Html);
    assert!(dot.contains(
      "<TR><TD FIXEDSIZE=\"TRUE\" WIDTH=\"60\" HEIGHT=\"60\"><IMG SRC=\"/srv/photos/1_circle.png\"/></TD></TR>"
    ));
  }

  #[test]
  fn edges_are_styled_by_kind() {
    let dot = render_dot(&family(), LabelMode::Html);
    assert!(dot.contains("  \"1\" -> \"3\";\n"));
    assert!(dot.contains(
      "  \"1\" -> \"2\" [style=dashed, color=\"red\", constraint=false, dir=none];\n"
    ));
    assert!(dot.contains("  { rank=same; \"1\"; \"2\"; }\n"));
  }

  #[test]
  fn markup_in_names_is_escaped() {
    let graph = FamilyGraph::build(
      &[person(1, "<b>Tom & \"Jerry\"</b>", Gender::Male, "", "")],
      &NoPhotos,
    );

    let html = render_dot(&graph, LabelMode::Html);
    assert!(html.contains("&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;"));
    assert!(!html.contains("<b>Tom"));

    let plain = render_dot(&graph, LabelMode::Plain);
    assert!(plain.contains("label=\"<b>Tom & \\\"Jerry\\\"</b>\\n1369\""));
  }

  #[test]
  fn plain_nodes_are_filled_boxes() {
    let dot = render_dot(&family(), LabelMode::Plain);
    assert!(dot.contains(
      "  \"3\" [shape=box, style=filled, fillcolor=\"#ADD8E6\", label=\"Ali\\n1367\"];\n"
    ));
    assert!(!dot.contains("<TABLE"));
  }
}
