//! Rendering backends.
//!
//! [`ChartRenderer`] is the seam between Lineage and whatever draws the
//! chart. [`GraphvizRenderer`] pipes DOT into the `dot` program and reads the
//! image back from its stdout.

use std::{future::Future, path::PathBuf, process::Stdio};

use lineage_core::graph::FamilyGraph;
use tokio::{io::AsyncWriteExt as _, process::Command};

use crate::{
  Error, Result,
  dot::{LabelMode, render_dot},
  etag::chart_etag,
};

// ─── Formats ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartFormat {
  Png,
  Svg,
  /// The DOT source itself; never sent to a backend.
  Dot,
}

impl ChartFormat {
  pub fn extension(self) -> &'static str {
    match self {
      Self::Png => "png",
      Self::Svg => "svg",
      Self::Dot => "dot",
    }
  }

  pub fn content_type(self) -> &'static str {
    match self {
      Self::Png => "image/png",
      Self::Svg => "image/svg+xml",
      Self::Dot => "text/vnd.graphviz; charset=utf-8",
    }
  }

  pub fn from_extension(ext: &str) -> Option<Self> {
    match ext {
      "png" => Some(Self::Png),
      "svg" => Some(Self::Svg),
      "dot" | "gv" => Some(Self::Dot),
      _ => None,
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Something that turns DOT into an image.
///
/// Implementations report a refusal of the input as [`Error::Rejected`] so
/// callers can retry with simpler markup.
pub trait ChartRenderer: Send + Sync {
  fn render<'a>(
    &'a self,
    dot: &'a str,
    format: ChartFormat,
  ) -> impl Future<Output = Result<Vec<u8>>> + Send + 'a;
}

// ─── Graphviz ────────────────────────────────────────────────────────────────

/// Runs the Graphviz `dot` executable (or a compatible program).
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
  program: PathBuf,
}

impl GraphvizRenderer {
  pub fn new(program: impl Into<PathBuf>) -> Self { Self { program: program.into() } }

  pub fn program(&self) -> &std::path::Path { &self.program }
}

impl Default for GraphvizRenderer {
  fn default() -> Self { Self::new("dot") }
}

impl ChartRenderer for GraphvizRenderer {
  async fn render(&self, dot: &str, format: ChartFormat) -> Result<Vec<u8>> {
    let mut child = Command::new(&self.program)
      .arg(format!("-T{}", format.extension()))
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true)
      .spawn()
      .map_err(|source| Error::Spawn { program: self.program.clone(), source })?;

    let mut stdin = child
      .stdin
      .take()
      .ok_or_else(|| Error::Io(std::io::Error::other("renderer stdin unavailable")))?;

    // Feed stdin while collecting output so a large chart cannot deadlock on
    // a full pipe. Dropping stdin closes it and lets the renderer finish.
    let (written, output) = tokio::join!(
      async move {
        let res = stdin.write_all(dot.as_bytes()).await;
        drop(stdin);
        res
      },
      child.wait_with_output(),
    );
    let output = output?;

    if !output.status.success() {
      return Err(Error::Rejected {
        status: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      });
    }
    written?;

    Ok(output.stdout)
  }
}

// ─── Chart ───────────────────────────────────────────────────────────────────

/// A rendered chart ready to serve.
#[derive(Debug, Clone)]
pub struct Chart {
  pub bytes:  Vec<u8>,
  pub format: ChartFormat,
  pub etag:   String,
  /// Which label flavour the backend accepted.
  pub labels: LabelMode,
}

/// Render `graph` as `format`.
///
/// HTML labels are tried first; if the backend rejects them the chart is
/// rendered again with plain labels. [`ChartFormat::Dot`] returns the
/// HTML-label source without touching the backend.
pub async fn render_chart<R: ChartRenderer>(
  renderer: &R,
  graph: &FamilyGraph,
  format: ChartFormat,
) -> Result<Chart> {
  let dot = render_dot(graph, LabelMode::Html);
  let etag = chart_etag(&dot, format);

  if format == ChartFormat::Dot {
    return Ok(Chart { bytes: dot.into_bytes(), format, etag, labels: LabelMode::Html });
  }

  tracing::debug!(
    nodes = graph.nodes.len(),
    edges = graph.edges.len(),
    format = format.extension(),
    "rendering chart"
  );

  match renderer.render(&dot, format).await {
    Ok(bytes) => Ok(Chart { bytes, format, etag, labels: LabelMode::Html }),
    Err(Error::Rejected { status, stderr }) => {
      tracing::warn!(?status, %stderr, "renderer rejected HTML labels, retrying with plain labels");
      let plain = render_dot(graph, LabelMode::Plain);
      let bytes = renderer.render(&plain, format).await?;
      Ok(Chart { bytes, format, etag: chart_etag(&plain, format), labels: LabelMode::Plain })
    }
    Err(e) => Err(e),
  }
}
