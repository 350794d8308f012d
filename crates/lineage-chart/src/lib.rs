//! Chart rendering for Lineage.
//!
//! Turns a [`FamilyGraph`](lineage_core::graph::FamilyGraph) into Graphviz
//! DOT and hands it to a [`ChartRenderer`] backend. The backend's layout is a
//! black box: top-to-bottom ranks by descent, same-rank hints for spouses,
//! orthogonal edge routing.

pub mod dot;
pub mod error;
pub mod etag;
pub mod render;

pub use dot::{LabelMode, render_dot};
pub use error::{Error, Result};
pub use etag::chart_etag;
pub use render::{Chart, ChartFormat, ChartRenderer, GraphvizRenderer, render_chart};
