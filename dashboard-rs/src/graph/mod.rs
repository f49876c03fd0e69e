/**
 * graph/mod.rs
 * In-memory RDF graph over Oxigraph: merge structured documents, run SELECTs.
 *
 * One importer pass owns the store mutably; afterwards it is shared
 * read-only behind an Arc. A reload builds a fresh store instead of
 * mutating this one.
 */

use std::collections::HashMap;

use oxigraph::model::Term;
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;

use crate::document::StructuredDocument;
use crate::errors::{DashboardError, Result};

/// One SELECT solution: variable name to bound term.
pub type QueryRow = HashMap<String, Term>;

pub struct GraphStore {
    store: Store,
}

impl GraphStore {
    pub fn new() -> Result<Self> {
        let store = Store::new().map_err(|e| DashboardError::Store(e.to_string()))?;
        Ok(Self { store })
    }

    /// Merge a document's triples into the graph. Returns the number of
    /// triples the document expanded to (inserted or already present).
    pub fn merge(&mut self, document: &StructuredDocument) -> Result<usize> {
        let quads = document.triples()?;
        for quad in &quads {
            self.store
                .insert(quad)
                .map_err(|e| DashboardError::Store(e.to_string()))?;
        }
        Ok(quads.len())
    }

    /// Execute a SPARQL SELECT, preserving the engine's solution order.
    pub fn select(&self, sparql: &str) -> Result<Vec<QueryRow>> {
        let results = self
            .store
            .query(sparql)
            .map_err(|e| DashboardError::Query(e.to_string()))?;

        match results {
            QueryResults::Solutions(solutions) => {
                let mut rows = Vec::new();
                for solution in solutions {
                    let solution = solution.map_err(|e| DashboardError::Query(e.to_string()))?;
                    let mut row = QueryRow::new();
                    for (var, term) in solution.iter() {
                        row.insert(var.as_str().to_string(), term.clone());
                    }
                    rows.push(row);
                }
                Ok(rows)
            }
            _ => Err(DashboardError::Query(
                "expected a SELECT result".to_string(),
            )),
        }
    }

    /// Total triples currently in the graph.
    pub fn len(&self) -> Result<usize> {
        self.store
            .len()
            .map_err(|e| DashboardError::Store(e.to_string()))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore").finish_non_exhaustive()
    }
}
