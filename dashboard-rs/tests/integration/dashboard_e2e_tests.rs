//! End-to-end tests over merged fixture documents: metric queries, date
//! ordering, the NaN policy for malformed values, and chart construction.

use chrono::NaiveDate;
use serde_json::{json, Value};

use pghd_core::{
    build_charts, patient_ids, run_metric_query, vocab, GraphStore, MetricFamily, MetricToggles,
    PlotRequest, StructuredDocument,
};

fn graph_with(documents: &[Value]) -> GraphStore {
    let mut graph = GraphStore::new().unwrap();
    for value in documents {
        let document = StructuredDocument::from_value(value.clone()).unwrap();
        graph.merge(&document).unwrap();
    }
    graph
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn patient_record(patient: &str, id: u32) -> Value {
    json!({
        "@id": patient,
        "@context": {"patientID": format!("{}patientID", vocab::PGHDC)},
        "patientID": {"@value": id.to_string(), "@type": "xsd:int"}
    })
}

fn event_context() -> Value {
    json!({
        "Patient": format!("{}patient", vocab::PGHDC),
        "collected_PGHD": format!("{}collected_PGHD", vocab::PGHDC),
        "date": format!("{}date", vocab::DC),
        "steps": format!("{}steps", vocab::FITBIT),
        "heartrate": format!("{}resting_heart_rate", vocab::FITBIT),
        "sedentary": format!("{}sedentary_minutes", vocab::FITBIT),
        "light": format!("{}lightly_active_minutes", vocab::FITBIT),
        "fairly": format!("{}fairly_active_minutes", vocab::FITBIT),
        "very": format!("{}very_active_minutes", vocab::FITBIT),
        "efficiency": format!("{}sleep_efficiency", vocab::FITBIT),
        "duration": format!("{}sleep_duration", vocab::FITBIT),
        "pulse": format!("{}hasPulseRate", vocab::SMASH),
        "sys": format!("{}hasSystolicBloodPressureValue", vocab::SMASH),
        "dia": format!("{}hasDiastolicBloodPressureValue", vocab::SMASH),
        "loc": format!("{}CollectionLocation", vocab::BP_AUX),
        "person": format!("{}CollectionPerson", vocab::BP_AUX),
        "pos": format!("{}CollectionPosition", vocab::BP_AUX)
    })
}

fn event(id: &str, patient: &str, date: &str, measurement: Value) -> Value {
    let mut body = json!({
        "@id": format!("https://repo.example.org/template-instances/{id}"),
        "@context": event_context(),
        "Patient": {"@id": patient},
        "collected_PGHD": measurement
    });
    let m = body["collected_PGHD"].as_object_mut().unwrap();
    m.insert(
        "@id".to_string(),
        json!(format!("https://repo.example.org/template-instances/{id}/m")),
    );
    m.insert(
        "date".to_string(),
        json!({"@value": date, "@type": "xsd:date"}),
    );
    body
}

fn steps_event(id: &str, patient: &str, date_s: &str, steps: &str) -> Value {
    event(
        id,
        patient,
        date_s,
        json!({"steps": {"@value": steps, "@type": "xsd:int"}}),
    )
}

fn labelled(id: &str, text: &str) -> Value {
    json!({
        "@id": format!("https://repo.example.org/annotations/{id}"),
        "rdfs:label": {"@value": text}
    })
}

const P1: &str = "https://repo.example.org/template-instances/patient-1";
const P2: &str = "https://repo.example.org/template-instances/patient-2";

#[test]
fn test_step_rows_sorted_ascending_by_date() {
    let graph = graph_with(&[
        patient_record(P1, 1),
        steps_event("s1", P1, "2024-01-02", "500"),
        steps_event("s2", P1, "2024-01-01", "300"),
    ]);

    let request = PlotRequest {
        patient_id: 1,
        toggles: MetricToggles {
            step_count: true,
            ..MetricToggles::default()
        },
    };
    let charts = build_charts(&graph, &request).unwrap();

    assert_eq!(charts.len(), 1);
    let points = &charts[0].series[0].points;
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].date, date("2024-01-01"));
    assert_eq!(points[0].value, 300.0);
    assert_eq!(points[1].date, date("2024-01-02"));
    assert_eq!(points[1].value, 500.0);
}

#[test]
fn test_queries_isolate_patients() {
    let graph = graph_with(&[
        patient_record(P1, 1),
        patient_record(P2, 2),
        steps_event("s1", P1, "2024-01-01", "300"),
        steps_event("s2", P2, "2024-01-01", "9000"),
    ]);

    assert_eq!(patient_ids(&graph).unwrap(), vec![1, 2]);

    let rows = run_metric_query(&graph, MetricFamily::StepCount, 1).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].values["steps"], 300.0);

    let rows = run_metric_query(&graph, MetricFamily::StepCount, 2).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].values["steps"], 9000.0);
}

#[test]
fn test_unknown_patient_yields_empty_rows() {
    let graph = graph_with(&[
        patient_record(P1, 1),
        steps_event("s1", P1, "2024-01-01", "300"),
    ]);

    for family in MetricFamily::ALL {
        let rows = run_metric_query(&graph, family, 42).unwrap();
        assert!(rows.is_empty(), "{family}");
    }
}

#[test]
fn test_malformed_heart_rate_becomes_nan_row() {
    let graph = graph_with(&[
        patient_record(P1, 1),
        event(
            "h1",
            P1,
            "2024-01-01",
            json!({"heartrate": {"@value": "N/A"}}),
        ),
        event(
            "h2",
            P1,
            "2024-01-02",
            json!({"heartrate": {"@value": "61.5"}}),
        ),
    ]);

    let mut rows = run_metric_query(&graph, MetricFamily::RestingHeartRate, 1).unwrap();
    rows.sort_by_key(|row| row.date);

    assert_eq!(rows.len(), 2);
    assert!(rows[0].values["heartrate"].is_nan());
    assert_eq!(rows[0].date, date("2024-01-01"));
    assert_eq!(rows[1].values["heartrate"], 61.5);
}

#[test]
fn test_malformed_sleep_duration_becomes_nan_row() {
    let graph = graph_with(&[
        patient_record(P1, 1),
        event(
            "n1",
            P1,
            "2024-01-01",
            json!({
                "efficiency": {"@value": "93", "@type": "xsd:int"},
                "duration": {"@value": "unknown"}
            }),
        ),
    ]);

    let rows = run_metric_query(&graph, MetricFamily::Sleep, 1).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].values["efficiency"], 93.0);
    assert!(rows[0].values["duration"].is_nan());
}

#[test]
fn test_blood_pressure_chart_series_and_hover() {
    let graph = graph_with(&[
        patient_record(P1, 1),
        labelled("loc-home", "Home"),
        labelled("person-self", "Self"),
        labelled("pos-sitting", "Sitting"),
        event(
            "bp1",
            P1,
            "2024-01-01",
            json!({
                "pulse": {"@value": "72", "@type": "xsd:int"},
                "sys": {"@value": "120", "@type": "xsd:int"},
                "dia": {"@value": "80", "@type": "xsd:int"},
                "loc": {"@id": "https://repo.example.org/annotations/loc-home"},
                "person": {"@id": "https://repo.example.org/annotations/person-self"},
                "pos": {"@id": "https://repo.example.org/annotations/pos-sitting"}
            }),
        ),
    ]);

    let request = PlotRequest {
        patient_id: 1,
        toggles: MetricToggles {
            pulse: true,
            systolic: true,
            diastolic: true,
            ..MetricToggles::default()
        },
    };
    let charts = build_charts(&graph, &request).unwrap();

    assert_eq!(charts.len(), 1);
    let chart = &charts[0];
    assert_eq!(chart.title, "IVR Blood Pressure Monitor Data");
    let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["pulse", "sys_bp", "dia_bp"]);
    assert_eq!(chart.series[0].points[0].value, 72.0);
    assert_eq!(chart.series[1].points[0].value, 120.0);
    assert_eq!(chart.series[2].points[0].value, 80.0);

    assert_eq!(chart.hover.len(), 1);
    assert_eq!(chart.hover[0].location, "Home");
    assert_eq!(chart.hover[0].person, "Self");
    assert_eq!(chart.hover[0].position, "Sitting");
}

#[test]
fn test_blood_pressure_subset_toggle_limits_series() {
    let graph = graph_with(&[
        patient_record(P1, 1),
        labelled("loc-home", "Home"),
        labelled("person-self", "Self"),
        labelled("pos-sitting", "Sitting"),
        event(
            "bp1",
            P1,
            "2024-01-01",
            json!({
                "pulse": {"@value": "72", "@type": "xsd:int"},
                "sys": {"@value": "120", "@type": "xsd:int"},
                "dia": {"@value": "80", "@type": "xsd:int"},
                "loc": {"@id": "https://repo.example.org/annotations/loc-home"},
                "person": {"@id": "https://repo.example.org/annotations/person-self"},
                "pos": {"@id": "https://repo.example.org/annotations/pos-sitting"}
            }),
        ),
    ]);

    let request = PlotRequest {
        patient_id: 1,
        toggles: MetricToggles {
            diastolic: true,
            ..MetricToggles::default()
        },
    };
    let charts = build_charts(&graph, &request).unwrap();

    assert_eq!(charts.len(), 1);
    assert_eq!(charts[0].series.len(), 1);
    assert_eq!(charts[0].series[0].name, "dia_bp");
}

#[test]
fn test_activity_chart_has_four_named_series() {
    let graph = graph_with(&[
        patient_record(P1, 1),
        event(
            "a1",
            P1,
            "2024-01-01",
            json!({
                "sedentary": {"@value": "600", "@type": "xsd:int"},
                "light": {"@value": "180", "@type": "xsd:int"},
                "fairly": {"@value": "45", "@type": "xsd:int"},
                "very": {"@value": "30", "@type": "xsd:int"}
            }),
        ),
    ]);

    let request = PlotRequest {
        patient_id: 1,
        toggles: MetricToggles {
            activity: true,
            ..MetricToggles::default()
        },
    };
    let charts = build_charts(&graph, &request).unwrap();

    assert_eq!(charts.len(), 1);
    let names: Vec<&str> = charts[0].series.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Sedentary", "Light", "Fairly", "Very"]);
    assert_eq!(charts[0].series[0].points[0].value, 600.0);
}

#[test]
fn test_sleep_duration_plots_on_secondary_axis() {
    let graph = graph_with(&[
        patient_record(P1, 1),
        event(
            "n1",
            P1,
            "2024-01-01",
            json!({
                "efficiency": {"@value": "93", "@type": "xsd:int"},
                "duration": {"@value": "25560000", "@type": "xsd:int"}
            }),
        ),
    ]);

    let request = PlotRequest {
        patient_id: 1,
        toggles: MetricToggles {
            sleep: true,
            ..MetricToggles::default()
        },
    };
    let charts = build_charts(&graph, &request).unwrap();

    assert_eq!(charts.len(), 1);
    let chart = &charts[0];
    assert_eq!(chart.secondary_y_label.as_deref(), Some("Sleep Duration (ms)"));
    assert!(!chart.series[0].on_secondary_axis);
    assert!(chart.series[1].on_secondary_axis);
    assert_eq!(chart.series[1].points[0].value, 25_560_000.0);
}

#[test]
fn test_no_toggles_means_no_charts() {
    let graph = graph_with(&[
        patient_record(P1, 1),
        steps_event("s1", P1, "2024-01-01", "300"),
    ]);

    let request = PlotRequest {
        patient_id: 1,
        toggles: MetricToggles::default(),
    };
    assert!(build_charts(&graph, &request).unwrap().is_empty());
}

#[test]
fn test_enabled_family_with_no_rows_yields_empty_chart() {
    let graph = graph_with(&[patient_record(P1, 1)]);

    let request = PlotRequest {
        patient_id: 1,
        toggles: MetricToggles {
            step_count: true,
            ..MetricToggles::default()
        },
    };
    let charts = build_charts(&graph, &request).unwrap();

    assert_eq!(charts.len(), 1);
    assert_eq!(charts[0].series.len(), 1);
    assert!(charts[0].series[0].points.is_empty());
}

#[test]
fn test_all_toggles_yield_five_charts() {
    let graph = graph_with(&[patient_record(P1, 1)]);

    let request = PlotRequest {
        patient_id: 1,
        toggles: MetricToggles::all(),
    };
    let charts = build_charts(&graph, &request).unwrap();

    let families: Vec<MetricFamily> = charts.iter().map(|c| c.family).collect();
    assert_eq!(
        families,
        vec![
            MetricFamily::BloodPressure,
            MetricFamily::RestingHeartRate,
            MetricFamily::Activity,
            MetricFamily::StepCount,
            MetricFamily::Sleep,
        ]
    );
}
