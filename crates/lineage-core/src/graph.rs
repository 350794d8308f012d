//! Relationship graph construction.
//!
//! [`FamilyGraph::build`] turns the flat record list into a renderer-neutral
//! description: one node per record, a directed descent edge per resolvable
//! parent reference and one undirected spousal edge per resolvable spouse
//! pair, with same-rank hints for the spouses.
//!
//! The builder is a single pass over the records per concern and never
//! follows references transitively, so cyclic data cannot make it loop.

use std::{
  collections::HashSet,
  path::PathBuf,
};

use serde::Serialize;

use crate::person::{Gender, PersonId, PersonRecord};

// ─── Styling constants ───────────────────────────────────────────────────────

pub const FEMALE_FILL: &str = "#FFD1DC";
pub const MALE_FILL: &str = "#ADD8E6";
pub const SPOUSAL_COLOR: &str = "red";

pub fn fill_for(gender: Gender) -> &'static str {
  match gender {
    Gender::Female => FEMALE_FILL,
    Gender::Male => MALE_FILL,
  }
}

// ─── Photo lookup ────────────────────────────────────────────────────────────

/// Resolves the thumbnail path stored on a record to a file that can be
/// embedded in a node, or `None` if there is nothing usable there.
///
/// Implementations own the I/O; the builder only asks.
pub trait PhotoLookup {
  fn resolve(&self, stored: &str) -> Option<PathBuf>;
}

/// Resolves nothing; every node gets the text-only label.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPhotos;

impl PhotoLookup for NoPhotos {
  fn resolve(&self, _: &str) -> Option<PathBuf> { None }
}

impl<F> PhotoLookup for F
where
  F: Fn(&str) -> Option<PathBuf>,
{
  fn resolve(&self, stored: &str) -> Option<PathBuf> { self(stored) }
}

// ─── Graph types ─────────────────────────────────────────────────────────────

/// The two-row node label. The photo row is present only when the stored
/// thumbnail resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeLabel {
  pub photo:      Option<PathBuf>,
  pub name:       String,
  pub birth_year: i32,
}

impl NodeLabel {
  /// Text row: name and birth year separated by a line break.
  pub fn text(&self) -> String { format!("{}\n{}", self.name, self.birth_year) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
  pub id:    PersonId,
  pub fill:  &'static str,
  pub label: NodeLabel,
}

impl Node {
  /// Identity in the rendering backend's string id space.
  pub fn key(&self) -> String { self.id.to_string() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
  /// Parent → child; drives generational ranking.
  Descent,
  /// Between spouses; same generation, excluded from ranking.
  Spousal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
  Solid,
  Dashed,
}

/// How an edge should be drawn and whether it participates in ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdgeStyle {
  pub line:       LineStyle,
  /// `None` keeps the backend's default color.
  pub color:      Option<&'static str>,
  pub directed:   bool,
  pub constraint: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
  pub from: PersonId,
  pub to:   PersonId,
  pub kind: EdgeKind,
}

impl Edge {
  pub fn style(&self) -> EdgeStyle {
    match self.kind {
      EdgeKind::Descent => EdgeStyle {
        line:       LineStyle::Solid,
        color:      None,
        directed:   true,
        constraint: true,
      },
      EdgeKind::Spousal => EdgeStyle {
        line:       LineStyle::Dashed,
        color:      Some(SPOUSAL_COLOR),
        directed:   false,
        constraint: false,
      },
    }
  }
}

/// A renderer-neutral description of the family chart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FamilyGraph {
  /// One per record, in record order.
  pub nodes:     Vec<Node>,
  /// Descent edges in record order, then spousal edges in first-seen order.
  pub edges:     Vec<Edge>,
  /// Pairs of nodes the layout should keep on the same tier.
  pub same_rank: Vec<[PersonId; 2]>,
}

impl FamilyGraph {
  /// Build the graph for `records`.
  ///
  /// References that do not coerce to an id, or whose id is not among
  /// `records`, contribute no edge. A spouse pair referenced from both sides
  /// is one edge, drawn from the record that mentioned it first.
  pub fn build(records: &[PersonRecord], photos: &impl PhotoLookup) -> Self {
    let known: HashSet<PersonId> = records.iter().map(|r| r.id).collect();

    let nodes = records
      .iter()
      .map(|r| Node {
        id:    r.id,
        fill:  fill_for(r.gender),
        label: NodeLabel {
          photo:      r
            .photo_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .and_then(|p| photos.resolve(p)),
          name:       r.name.clone(),
          birth_year: r.birth_year,
        },
      })
      .collect();

    let mut edges = Vec::new();

    for r in records {
      if let Some(parent) = r.parent.id()
        && known.contains(&parent)
      {
        edges.push(Edge { from: parent, to: r.id, kind: EdgeKind::Descent });
      }
    }

    let mut same_rank = Vec::new();
    let mut pairs = HashSet::new();

    for r in records {
      if let Some(spouse) = r.spouse.id()
        && known.contains(&spouse)
        && pairs.insert((spouse.min(r.id), spouse.max(r.id)))
      {
        edges.push(Edge { from: spouse, to: r.id, kind: EdgeKind::Spousal });
        same_rank.push([spouse, r.id]);
      }
    }

    Self { nodes, edges, same_rank }
  }

  pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

  pub fn descent_edges(&self) -> impl Iterator<Item = &Edge> {
    self.edges.iter().filter(|e| e.kind == EdgeKind::Descent)
  }

  pub fn spousal_edges(&self) -> impl Iterator<Item = &Edge> {
    self.edges.iter().filter(|e| e.kind == EdgeKind::Spousal)
  }
}
