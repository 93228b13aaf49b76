mod common;

use std::fs;

use common::{assert_values_close, daily};
use tempfile::tempdir;
use tempolag::datasets::air_passengers;
use tempolag::temporal::{difference, exponential_moving_average, rolling, Aggregation, Window};
use tempolag::{Decay, Error, Pipeline, PipelineConfig, Step, Transform, Transformer};

const FEATURES: &str = r#"
[[steps]]
name = "monthly_change"
transforms = [{ op = "difference", order = 1 }]

[[steps]]
name = "smoothed_change"
transforms = [
    { op = "difference", order = 1 },
    { op = "rolling", window = { size = 3 }, method = "mean" },
]

[[steps]]
name = "yearly_growth"
transforms = [
    { op = "log" },
    { op = "seasonal_difference", period = 12 },
]

[[steps]]
name = "trend"
transforms = [{ op = "ewma", decay = { alpha = 0.3 } }]
"#;

#[test]
fn test_pipeline_from_toml_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("features.toml");
    fs::write(&path, FEATURES).unwrap();

    let pipeline = Pipeline::new(PipelineConfig::from_path(&path).unwrap()).unwrap();
    assert_eq!(pipeline.steps().len(), 4);

    let ts = air_passengers().unwrap();
    let outputs = pipeline.run(&ts).unwrap();

    let names: Vec<_> = outputs.iter().map(|s| s.name().unwrap()).collect();
    assert_eq!(
        names,
        vec!["monthly_change", "smoothed_change", "yearly_growth", "trend"]
    );
    for output in &outputs {
        assert_eq!(output.len(), ts.len());
        assert!(output.same_index(&ts));
    }

    // matches calling the transforms directly
    let direct = rolling(
        &difference(&ts, 1).unwrap(),
        &Window::new(3).unwrap(),
        Aggregation::Mean,
    );
    assert_eq!(outputs[1].values(), direct.values());
    assert_eq!(outputs[1].na_count(), 3);

    assert_eq!(outputs[2].na_count(), 12);
    let growth = outputs[2].values()[12].get().unwrap();
    assert!((growth - (115.0f64 / 112.0).ln()).abs() < 1e-12);

    let trend = exponential_moving_average(&ts, 0.3).unwrap();
    assert_eq!(outputs[3].values(), trend.values());
}

#[test]
fn test_parallel_run_matches_sequential_run() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("features.toml");
    fs::write(&path, FEATURES).unwrap();
    let pipeline = Pipeline::new(PipelineConfig::from_path(&path).unwrap()).unwrap();

    let ts = air_passengers().unwrap();
    let sequential = pipeline.run(&ts).unwrap();
    let parallel = pipeline.run_parallel(&ts).unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn test_pipeline_from_json_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("features.json");
    fs::write(
        &path,
        r#"{"steps": [{"name": "ema", "transforms": [{"op": "ewma", "decay": {"span": 3}}]}]}"#,
    )
    .unwrap();

    let pipeline = Pipeline::new(PipelineConfig::from_path(&path).unwrap()).unwrap();
    let ts = daily(&[10.0, 20.0, 30.0]);
    let out = pipeline.run(&ts).unwrap();

    // span 3 gives alpha 0.5
    assert_values_close(
        out[0].values(),
        exponential_moving_average(&ts, 0.5).unwrap().values(),
        1e-12,
    );
}

#[test]
fn test_unsupported_file_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("features.yaml");
    fs::write(&path, "steps: []").unwrap();

    assert!(matches!(
        PipelineConfig::from_path(&path),
        Err(Error::InvalidConfiguration(_))
    ));
}

#[test]
fn test_invalid_parameters_are_rejected_before_running() {
    let config = PipelineConfig::from_toml_str(
        r#"
        [[steps]]
        name = "bad"
        transforms = [{ op = "lag", periods = 0 }]
        "#,
    )
    .unwrap();
    assert!(matches!(
        Pipeline::new(config),
        Err(Error::InvalidConfiguration(_))
    ));

    let unknown_op = PipelineConfig::from_toml_str(
        r#"
        [[steps]]
        name = "bad"
        transforms = [{ op = "forward_fill" }]
        "#,
    );
    assert!(matches!(unknown_op, Err(Error::InvalidConfiguration(_))));

    let zero_window = PipelineConfig::from_toml_str(
        r#"
        [[steps]]
        name = "bad"
        transforms = [{ op = "rolling", window = { size = 0 }, method = "mean" }]
        "#,
    );
    assert!(matches!(zero_window, Err(Error::InvalidConfiguration(_))));
}

#[test]
fn test_failing_step_aborts_the_run() {
    let pipeline = Pipeline::from_steps(vec![
        Step::new("change", vec![Transform::Difference { order: 1 }]),
        Step::new(
            "geo",
            vec![Transform::GeometricMean {
                window: Window::new(2).unwrap(),
            }],
        ),
    ])
    .unwrap();

    let ts = daily(&[4.0, 2.0, -1.0, 3.0]);
    assert!(matches!(
        pipeline.run(&ts),
        Err(Error::DomainError { index: 2, .. })
    ));
    assert!(matches!(
        pipeline.run_parallel(&ts),
        Err(Error::DomainError { index: 2, .. })
    ));
}

#[test]
fn test_single_transform_as_transformer() {
    let ts = daily(&[1.0, 2.0, 4.0]);
    let ema = Transform::Ewma {
        decay: Decay::Alpha(1.0),
    };
    let out = ema.transform(&ts).unwrap();
    assert_eq!(out.values(), ts.values());
}
