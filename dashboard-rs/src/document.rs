//! Structured documents fetched from the metadata repository.
//!
//! A template instance arrives as a self-describing JSON document: an `@id`,
//! an `@context` mapping field names to predicate IRIs, measurement fields,
//! and optionally a nested `Patient` reference. Decoding is explicit - a
//! malformed document fails with [`DashboardError::Decode`] instead of a deep
//! attribute-access fault - and expansion into triples follows the document's
//! own schema linkage.

use std::collections::HashMap;

use oxigraph::model::{BlankNode, GraphName, Literal, NamedNode, Quad, Subject, Term};
use serde_json::{Map, Value};

use crate::errors::{DashboardError, Result};
use crate::vocab;

type Context = HashMap<String, String>;

/// One decoded template instance (metric entry or patient record).
#[derive(Debug, Clone)]
pub struct StructuredDocument {
    id: String,
    context: Context,
    body: Map<String, Value>,
}

impl StructuredDocument {
    /// Decode a fetched JSON body. Requires a string `@id`.
    pub fn from_value(value: Value) -> Result<Self> {
        let body = match value {
            Value::Object(map) => map,
            other => {
                return Err(DashboardError::Decode(format!(
                    "expected a JSON object, got {other}"
                )))
            }
        };

        let id = body
            .get("@id")
            .and_then(Value::as_str)
            .ok_or_else(|| DashboardError::Decode("document has no @id".to_string()))?
            .to_string();

        let context = parse_context(body.get("@context"));

        Ok(Self { id, context, body })
    }

    /// The instance identifier (IRI-shaped, as listed by the folder endpoint).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Nested patient reference, if the instance carries one.
    pub fn patient_ref(&self) -> Option<&str> {
        self.body
            .get("Patient")
            .and_then(|p| p.get("@id"))
            .and_then(Value::as_str)
    }

    /// Expand the document into triples according to its `@context`.
    ///
    /// Supported subset: context-mapped keys become predicates;
    /// `{"@value": v}` objects become literals (datatype resolved through the
    /// context or the fixed namespace table), `{"@id": iri}` and bare nested
    /// objects become node references that are recursed into, arrays fan out,
    /// and `@type` becomes `rdf:type`. Keys with no IRI mapping are skipped.
    pub fn triples(&self) -> Result<Vec<Quad>> {
        let subject = Subject::NamedNode(named_node(&self.id)?);
        let mut out = Vec::new();
        expand_node(&subject, &self.body, &self.context, &mut out)?;
        Ok(out)
    }
}

fn parse_context(value: Option<&Value>) -> Context {
    let mut context = Context::new();
    if let Some(Value::Object(entries)) = value {
        for (name, target) in entries {
            let iri = match target {
                Value::String(iri) => Some(iri.clone()),
                Value::Object(obj) => obj.get("@id").and_then(Value::as_str).map(str::to_string),
                _ => None,
            };
            if let Some(iri) = iri {
                context.insert(name.clone(), iri);
            }
        }
    }
    context
}

fn named_node(iri: &str) -> Result<NamedNode> {
    NamedNode::new(iri).map_err(|e| DashboardError::Decode(format!("invalid IRI {iri}: {e}")))
}

/// Resolve a document key to a predicate IRI: context first, then the fixed
/// namespace table for CURIE-style keys such as `rdfs:label`.
fn resolve_key(key: &str, context: &Context) -> Option<NamedNode> {
    if key.starts_with('@') {
        return None;
    }
    let iri = context
        .get(key)
        .cloned()
        .or_else(|| vocab::expand_curie(key))?;
    NamedNode::new(iri).ok()
}

fn node_context(parent: &Context, map: &Map<String, Value>) -> Context {
    let mut merged = parent.clone();
    merged.extend(parse_context(map.get("@context")));
    merged
}

fn expand_node(
    subject: &Subject,
    map: &Map<String, Value>,
    context: &Context,
    out: &mut Vec<Quad>,
) -> Result<()> {
    let context = node_context(context, map);

    if let Some(types) = map.get("@type") {
        expand_types(subject, types, &context, out)?;
    }

    for (key, value) in map {
        let Some(predicate) = resolve_key(key, &context) else {
            continue;
        };
        expand_value(subject, &predicate, value, &context, out)?;
    }

    Ok(())
}

fn expand_types(
    subject: &Subject,
    types: &Value,
    context: &Context,
    out: &mut Vec<Quad>,
) -> Result<()> {
    let rdf_type = named_node(&format!("{}type", vocab::RDF))?;
    let entries = match types {
        Value::Array(items) => items.clone(),
        single => vec![single.clone()],
    };
    for entry in entries {
        if let Some(curie) = entry.as_str() {
            let iri = context
                .get(curie)
                .cloned()
                .or_else(|| vocab::expand_curie(curie));
            if let Some(iri) = iri {
                out.push(Quad::new(
                    subject.clone(),
                    rdf_type.clone(),
                    named_node(&iri)?,
                    GraphName::DefaultGraph,
                ));
            }
        }
    }
    Ok(())
}

fn expand_value(
    subject: &Subject,
    predicate: &NamedNode,
    value: &Value,
    context: &Context,
    out: &mut Vec<Quad>,
) -> Result<()> {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                expand_value(subject, predicate, item, context, out)?;
            }
        }
        Value::String(s) => {
            push_quad(subject, predicate, Literal::new_simple_literal(s), out);
        }
        Value::Bool(b) => {
            let datatype = named_node(&format!("{}boolean", vocab::XSD))?;
            push_quad(
                subject,
                predicate,
                Literal::new_typed_literal(b.to_string(), datatype),
                out,
            );
        }
        Value::Number(n) => {
            let datatype = if n.is_i64() || n.is_u64() {
                named_node(&format!("{}integer", vocab::XSD))?
            } else {
                named_node(&format!("{}double", vocab::XSD))?
            };
            push_quad(
                subject,
                predicate,
                Literal::new_typed_literal(n.to_string(), datatype),
                out,
            );
        }
        Value::Object(obj) => {
            if obj.contains_key("@value") {
                if let Some(literal) = value_object_literal(obj, context)? {
                    push_quad(subject, predicate, literal, out);
                }
            } else if let Some(iri) = obj.get("@id").and_then(Value::as_str) {
                let node = named_node(iri)?;
                out.push(Quad::new(
                    subject.clone(),
                    predicate.clone(),
                    node.clone(),
                    GraphName::DefaultGraph,
                ));
                expand_node(&Subject::NamedNode(node), obj, context, out)?;
            } else {
                let blank = BlankNode::default();
                out.push(Quad::new(
                    subject.clone(),
                    predicate.clone(),
                    blank.clone(),
                    GraphName::DefaultGraph,
                ));
                expand_node(&Subject::BlankNode(blank), obj, context, out)?;
            }
        }
    }
    Ok(())
}

/// Build a literal from a `{"@value": ..., "@type": ...}` object.
/// A null `@value` yields no triple (the field is present but empty).
fn value_object_literal(obj: &Map<String, Value>, context: &Context) -> Result<Option<Literal>> {
    let raw = match obj.get("@value") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => {
            return Err(DashboardError::Decode(format!(
                "unsupported @value shape: {other}"
            )))
        }
    };

    let datatype = obj
        .get("@type")
        .and_then(Value::as_str)
        .and_then(|curie| {
            context
                .get(curie)
                .cloned()
                .or_else(|| vocab::expand_curie(curie))
        });

    let literal = match datatype {
        Some(iri) => Literal::new_typed_literal(raw, named_node(&iri)?),
        None => Literal::new_simple_literal(raw),
    };
    Ok(Some(literal))
}

fn push_quad(subject: &Subject, predicate: &NamedNode, literal: Literal, out: &mut Vec<Quad>) {
    out.push(Quad::new(
        subject.clone(),
        predicate.clone(),
        Term::Literal(literal),
        GraphName::DefaultGraph,
    ));
}
