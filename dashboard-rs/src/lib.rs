//! # PGHD Dashboard Core
//!
//! Data core for a personal-generated-health-data dashboard: imports patient
//! health instances (blood pressure, Fitbit metrics) from a CEDAR-style
//! metadata repository, materializes them into an in-memory RDF graph, runs a
//! fixed catalog of per-metric SPARQL queries, and builds time-series chart
//! descriptions for an interactive shell to render.
//!
//! ## Data flow
//!
//! ```text
//! ┌──────────────┐   list/fetch   ┌───────────┐   SELECT    ┌────────────┐
//! │ CEDAR API    │ ─────────────▶ │ GraphStore│ ──────────▶ │  Charts    │
//! │ (remote)     │    Importer    │ (oxigraph)│ Query layer │ (serde)    │
//! └──────────────┘                └───────────┘             └────────────┘
//! ```
//!
//! The importer result is memoized process-wide in a single-snapshot cache
//! and only re-fetched after an explicit invalidation (the shell's "Reload
//! Data" action). All I/O is single-threaded and sequential.

pub mod chart;
pub mod config;
pub mod document;
pub mod errors;
pub mod graph;
pub mod importer;
pub mod query;
pub mod source;
pub mod vocab;

pub use chart::{build_charts, Chart, HoverNote, MetricToggles, PlotRequest, Point, Series};
pub use config::{ApiConfig, AuthConfig, DashboardConfig};
pub use document::StructuredDocument;
pub use errors::{DashboardError, Result};
pub use graph::{GraphStore, QueryRow};
pub use importer::{ImportReport, Importer, SnapshotCache, IMPORT_CACHE};
pub use query::{patient_ids, run as run_metric_query, MetricFamily, MetricRow, SparqlQuery};
pub use source::{CedarClient, InstanceSource};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
