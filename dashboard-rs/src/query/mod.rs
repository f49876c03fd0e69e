/**
 * query/mod.rs
 * Metric query catalog and SPARQL builders.
 *
 * Each metric family is described by a join descriptor (collection event ->
 * patient by integer patientID -> measurement node) plus a field table, and
 * one generator turns the descriptor into a SELECT. This keeps the
 * optional-field policy in a single code path: a malformed numeric value in
 * any family decodes to NaN instead of dropping the row or aborting.
 */

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use oxigraph::model::Term;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{DashboardError, Result};
use crate::graph::{GraphStore, QueryRow};
use crate::vocab;

/// The five fixed metric families the dashboard can plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricFamily {
    BloodPressure,
    RestingHeartRate,
    StepCount,
    Activity,
    Sleep,
}

impl MetricFamily {
    pub const ALL: [MetricFamily; 5] = [
        MetricFamily::BloodPressure,
        MetricFamily::RestingHeartRate,
        MetricFamily::StepCount,
        MetricFamily::Activity,
        MetricFamily::Sleep,
    ];

    /// Field table for this family. Date is implicit (`dc:date`, required).
    pub fn fields(&self) -> &'static [FieldSpec] {
        const BLOOD_PRESSURE: &[FieldSpec] = &[
            FieldSpec::numeric("pulse", "smash:hasPulseRate"),
            FieldSpec::numeric("sys_bp", "smash:hasSystolicBloodPressureValue"),
            FieldSpec::numeric("dia_bp", "smash:hasDiastolicBloodPressureValue"),
            FieldSpec::label("loc", "bp_aux:CollectionLocation"),
            FieldSpec::label("person", "bp_aux:CollectionPerson"),
            FieldSpec::label("pos", "bp_aux:CollectionPosition"),
        ];
        const HEART_RATE: &[FieldSpec] =
            &[FieldSpec::numeric("heartrate", "fitbit:resting_heart_rate")];
        const STEPS: &[FieldSpec] = &[FieldSpec::numeric("steps", "fitbit:steps")];
        const ACTIVITY: &[FieldSpec] = &[
            FieldSpec::numeric("sedentary", "fitbit:sedentary_minutes"),
            FieldSpec::numeric("light", "fitbit:lightly_active_minutes"),
            FieldSpec::numeric("fairly", "fitbit:fairly_active_minutes"),
            FieldSpec::numeric("very", "fitbit:very_active_minutes"),
        ];
        const SLEEP: &[FieldSpec] = &[
            FieldSpec::numeric("efficiency", "fitbit:sleep_efficiency"),
            FieldSpec::numeric("duration", "fitbit:sleep_duration"),
        ];

        match self {
            MetricFamily::BloodPressure => BLOOD_PRESSURE,
            MetricFamily::RestingHeartRate => HEART_RATE,
            MetricFamily::StepCount => STEPS,
            MetricFamily::Activity => ACTIVITY,
            MetricFamily::Sleep => SLEEP,
        }
    }
}

impl fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricFamily::BloodPressure => "blood-pressure",
            MetricFamily::RestingHeartRate => "heart-rate",
            MetricFamily::StepCount => "steps",
            MetricFamily::Activity => "activity",
            MetricFamily::Sleep => "sleep",
        };
        f.write_str(name)
    }
}

impl FromStr for MetricFamily {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "blood-pressure" | "bp" => Ok(MetricFamily::BloodPressure),
            "heart-rate" | "heartrate" => Ok(MetricFamily::RestingHeartRate),
            "steps" | "step-count" => Ok(MetricFamily::StepCount),
            "activity" => Ok(MetricFamily::Activity),
            "sleep" => Ok(MetricFamily::Sleep),
            other => Err(DashboardError::Query(format!(
                "unknown metric family: {other}"
            ))),
        }
    }
}

/// What a field binds to on the measurement node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Direct numeric value; malformed values decode to NaN.
    Numeric,
    /// A node reference whose `rdfs:label` carries the displayed text.
    Label,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub var: &'static str,
    pub predicate: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn numeric(var: &'static str, predicate: &'static str) -> Self {
        Self {
            var,
            predicate,
            kind: FieldKind::Numeric,
        }
    }

    const fn label(var: &'static str, predicate: &'static str) -> Self {
        Self {
            var,
            predicate,
            kind: FieldKind::Label,
        }
    }
}

pub struct SparqlQuery {
    query: String,
}

impl SparqlQuery {
    pub fn as_str(&self) -> &str {
        &self.query
    }

    /// Distinct patient identifiers present in the graph (no patient filter).
    pub fn patient_listing() -> Self {
        Self {
            query: format!(
                "{}SELECT DISTINCT ?id\nWHERE {{\n    ?p pghdc:patientID ?id .\n}}",
                vocab::prefix_block()
            ),
        }
    }

    /// SELECT for one metric family, bound to one patient.
    ///
    /// Joins collection events to the patient by exact integer match and to
    /// the measurement node carrying the family's fields; label fields pull
    /// the annotation node's `rdfs:label`.
    pub fn metric(family: MetricFamily, patient_id: i64) -> Self {
        let fields = family.fields();

        let mut select = String::new();
        for field in fields {
            select.push_str(&format!("?{} ", field.var));
        }

        let mut measurement = String::new();
        for field in fields {
            match field.kind {
                FieldKind::Numeric => {
                    measurement.push_str(&format!(
                        "               {} ?{} ;\n",
                        field.predicate, field.var
                    ));
                }
                FieldKind::Label => {
                    measurement.push_str(&format!(
                        "               {} ?{}_uri ;\n",
                        field.predicate, field.var
                    ));
                }
            }
        }

        let mut labels = String::new();
        for field in fields.iter().filter(|f| f.kind == FieldKind::Label) {
            labels.push_str(&format!(
                "    ?{var}_uri rdfs:label ?{var} .\n",
                var = field.var
            ));
        }

        Self {
            query: format!(
                "{prefixes}\
                 SELECT {select}?date\n\
                 WHERE {{\n\
                 \x20   ?event pghdc:patient ?who ;\n\
                 \x20          pghdc:collected_PGHD ?measurement .\n\
                 \x20   ?who pghdc:patientID '{patient_id}'^^xsd:int .\n\
                 \x20   ?measurement\n{measurement}\
                 \x20              dc:date ?date .\n\
                 {labels}\
                 }}",
                prefixes = vocab::prefix_block(),
            ),
        }
    }
}

/// One decoded solution of a metric query.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub date: NaiveDate,
    /// Numeric fields keyed by field name; NaN marks a malformed value.
    pub values: BTreeMap<&'static str, f64>,
    /// Label fields keyed by field name (blood pressure annotations).
    pub labels: BTreeMap<&'static str, String>,
}

/// All distinct patient identifiers in the graph, ascending.
/// Non-integer identifiers are skipped with a warning.
pub fn patient_ids(graph: &GraphStore) -> Result<Vec<i64>> {
    let rows = graph.select(SparqlQuery::patient_listing().as_str())?;
    let mut ids = Vec::new();
    for row in rows {
        match row.get("id") {
            Some(Term::Literal(lit)) => match lit.value().parse::<i64>() {
                Ok(id) => ids.push(id),
                Err(_) => warn!(value = lit.value(), "skipping non-integer patient id"),
            },
            _ => warn!("skipping non-literal patient id binding"),
        }
    }
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

/// Run one family's query for one patient and decode the rows.
///
/// Rows keep the engine's order; the presentation layer sorts by date.
pub fn run(graph: &GraphStore, family: MetricFamily, patient_id: i64) -> Result<Vec<MetricRow>> {
    let sparql = SparqlQuery::metric(family, patient_id);
    let rows = graph.select(sparql.as_str())?;
    rows.into_iter()
        .map(|row| decode_row(family, &row))
        .collect()
}

fn decode_row(family: MetricFamily, row: &QueryRow) -> Result<MetricRow> {
    let date = decode_date(row)?;

    let mut values = BTreeMap::new();
    let mut labels = BTreeMap::new();
    for field in family.fields() {
        match field.kind {
            FieldKind::Numeric => {
                values.insert(field.var, decode_numeric(row.get(field.var)));
            }
            FieldKind::Label => {
                labels.insert(field.var, decode_text(row.get(field.var)));
            }
        }
    }

    Ok(MetricRow {
        date,
        values,
        labels,
    })
}

fn decode_date(row: &QueryRow) -> Result<NaiveDate> {
    let raw = match row.get("date") {
        Some(Term::Literal(lit)) => lit.value(),
        other => {
            return Err(DashboardError::Query(format!(
                "row has no date binding: {other:?}"
            )))
        }
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| DashboardError::Decode(format!("bad ISO date {raw:?}: {e}")))
}

/// Uniform defensive policy: anything that does not parse as a number
/// becomes NaN, keeping the row.
fn decode_numeric(term: Option<&Term>) -> f64 {
    match term {
        Some(Term::Literal(lit)) => lit.value().trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn decode_text(term: Option<&Term>) -> String {
    match term {
        Some(Term::Literal(lit)) => lit.value().to_string(),
        Some(Term::NamedNode(node)) => node.as_str().to_string(),
        _ => String::new(),
    }
}
