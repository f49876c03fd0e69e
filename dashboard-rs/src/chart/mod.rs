//! Chart construction for the interactive shell.
//!
//! For each metric family with at least one enabled sub-metric, the rows are
//! sorted ascending by date (stable, ties keep engine order) and turned into
//! one serializable chart description. Rendering itself is delegated to the
//! shell; this layer only decides titles, axes, series, and hover notes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::graph::GraphStore;
use crate::query::{self, MetricFamily, MetricRow};

/// Sidebar checkbox state, grouped as the shell presents it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MetricToggles {
    // Blood Pressure Values
    pub pulse: bool,
    pub systolic: bool,
    pub diastolic: bool,
    // Fitbit Values
    pub resting_heart_rate: bool,
    pub activity: bool,
    pub step_count: bool,
    pub sleep: bool,
}

impl MetricToggles {
    pub fn any_blood_pressure(&self) -> bool {
        self.pulse || self.systolic || self.diastolic
    }

    pub fn all() -> Self {
        Self {
            pulse: true,
            systolic: true,
            diastolic: true,
            resting_heart_rate: true,
            activity: true,
            step_count: true,
            sleep: true,
        }
    }
}

/// One render request: built fresh by the shell on every redraw,
/// carries no identity or persistence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlotRequest {
    pub patient_id: i64,
    pub toggles: MetricToggles,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    /// Sleep duration plots against a secondary axis.
    pub on_secondary_axis: bool,
    pub points: Vec<Point>,
}

impl Series {
    fn new(name: &str, points: Vec<Point>) -> Self {
        Self {
            name: name.to_string(),
            on_secondary_axis: false,
            points,
        }
    }

    fn secondary(name: &str, points: Vec<Point>) -> Self {
        Self {
            name: name.to_string(),
            on_secondary_axis: true,
            points,
        }
    }
}

/// Collection metadata shown on hover for blood pressure points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoverNote {
    pub date: NaiveDate,
    pub location: String,
    pub person: String,
    pub position: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chart {
    pub family: MetricFamily,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub secondary_y_label: Option<String>,
    pub markers: bool,
    pub series: Vec<Series>,
    pub hover: Vec<HoverNote>,
}

impl Chart {
    fn new(family: MetricFamily, title: &str, y_label: &str) -> Self {
        Self {
            family,
            title: title.to_string(),
            x_label: "Date".to_string(),
            y_label: y_label.to_string(),
            secondary_y_label: None,
            markers: true,
            series: Vec::new(),
            hover: Vec::new(),
        }
    }
}

/// Sort rows ascending by date. `sort_by_key` is stable, so rows sharing a
/// date keep their relative query-engine order.
pub fn sort_by_date(mut rows: Vec<MetricRow>) -> Vec<MetricRow> {
    rows.sort_by_key(|row| row.date);
    rows
}

fn series_points(rows: &[MetricRow], field: &str) -> Vec<Point> {
    rows.iter()
        .map(|row| Point {
            date: row.date,
            value: row.values.get(field).copied().unwrap_or(f64::NAN),
        })
        .collect()
}

/// Build every chart the request asks for. Families with no enabled
/// sub-metric produce no chart; an enabled family with zero rows still
/// produces an (empty) chart.
pub fn build_charts(graph: &GraphStore, request: &PlotRequest) -> Result<Vec<Chart>> {
    let mut charts = Vec::new();
    let toggles = &request.toggles;

    if toggles.any_blood_pressure() {
        charts.push(blood_pressure_chart(graph, request)?);
    }
    if toggles.resting_heart_rate {
        charts.push(heart_rate_chart(graph, request.patient_id)?);
    }
    if toggles.activity {
        charts.push(activity_chart(graph, request.patient_id)?);
    }
    if toggles.step_count {
        charts.push(steps_chart(graph, request.patient_id)?);
    }
    if toggles.sleep {
        charts.push(sleep_chart(graph, request.patient_id)?);
    }

    Ok(charts)
}

fn blood_pressure_chart(graph: &GraphStore, request: &PlotRequest) -> Result<Chart> {
    let rows = sort_by_date(query::run(
        graph,
        MetricFamily::BloodPressure,
        request.patient_id,
    )?);

    let mut chart = Chart::new(
        MetricFamily::BloodPressure,
        "IVR Blood Pressure Monitor Data",
        "Pulse / Blood Pressure",
    );

    if request.toggles.pulse {
        chart
            .series
            .push(Series::new("pulse", series_points(&rows, "pulse")));
    }
    if request.toggles.systolic {
        chart
            .series
            .push(Series::new("sys_bp", series_points(&rows, "sys_bp")));
    }
    if request.toggles.diastolic {
        chart
            .series
            .push(Series::new("dia_bp", series_points(&rows, "dia_bp")));
    }

    chart.hover = rows
        .iter()
        .map(|row| HoverNote {
            date: row.date,
            location: row.labels.get("loc").cloned().unwrap_or_default(),
            person: row.labels.get("person").cloned().unwrap_or_default(),
            position: row.labels.get("pos").cloned().unwrap_or_default(),
        })
        .collect();

    Ok(chart)
}

fn heart_rate_chart(graph: &GraphStore, patient_id: i64) -> Result<Chart> {
    let rows = sort_by_date(query::run(graph, MetricFamily::RestingHeartRate, patient_id)?);
    let mut chart = Chart::new(
        MetricFamily::RestingHeartRate,
        "Fitbit - Heartrate",
        "Resting Heart Rate",
    );
    chart
        .series
        .push(Series::new("heartrate", series_points(&rows, "heartrate")));
    Ok(chart)
}

fn steps_chart(graph: &GraphStore, patient_id: i64) -> Result<Chart> {
    let rows = sort_by_date(query::run(graph, MetricFamily::StepCount, patient_id)?);
    let mut chart = Chart::new(MetricFamily::StepCount, "Fitbit - Steps", "Step Count");
    chart
        .series
        .push(Series::new("steps", series_points(&rows, "steps")));
    Ok(chart)
}

fn activity_chart(graph: &GraphStore, patient_id: i64) -> Result<Chart> {
    let rows = sort_by_date(query::run(graph, MetricFamily::Activity, patient_id)?);
    let mut chart = Chart::new(
        MetricFamily::Activity,
        "Fitbit - Activity",
        "Time spent (Minutes)",
    );
    for (name, field) in [
        ("Sedentary", "sedentary"),
        ("Light", "light"),
        ("Fairly", "fairly"),
        ("Very", "very"),
    ] {
        chart
            .series
            .push(Series::new(name, series_points(&rows, field)));
    }
    Ok(chart)
}

fn sleep_chart(graph: &GraphStore, patient_id: i64) -> Result<Chart> {
    let rows = sort_by_date(query::run(graph, MetricFamily::Sleep, patient_id)?);
    let mut chart = Chart::new(
        MetricFamily::Sleep,
        "Fitbit - Sleep Data",
        "Sleep Efficiency",
    );
    chart.secondary_y_label = Some("Sleep Duration (ms)".to_string());
    chart.series.push(Series::new(
        "Sleep Efficiency",
        series_points(&rows, "efficiency"),
    ));
    chart.series.push(Series::secondary(
        "Sleep Duration",
        series_points(&rows, "duration"),
    ));
    Ok(chart)
}
