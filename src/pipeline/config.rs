use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pipeline::Step;

/// Serializable pipeline definition.
///
/// ```toml
/// [[steps]]
/// name = "monthly_change"
/// transforms = [{ op = "difference", order = 1 }]
///
/// [[steps]]
/// name = "smoothed"
/// transforms = [{ op = "rolling", window = { size = 7 }, method = "mean" }]
/// ```
///
/// Unknown fields, unknown operations and non-right window alignments are
/// rejected while parsing and surface as `InvalidConfiguration`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl PipelineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a `.toml` or `.json` file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        log::debug!("loading pipeline definition from {}", path.display());

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            _ => Err(Error::InvalidConfiguration(format!(
                "unsupported pipeline file {}: expected .toml or .json",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Transform;
    use crate::temporal::{Aggregation, Decay, Window};

    #[test]
    fn parses_every_operation_from_toml() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [[steps]]
            name = "everything"
            transforms = [
                { op = "log" },
                { op = "difference", order = 1 },
                { op = "seasonal_difference", period = 12 },
                { op = "lag", periods = 1 },
                { op = "rolling", window = { size = 3 }, method = "median" },
                { op = "ewma", decay = { span = 5 } },
                { op = "geometric_mean", window = { size = 2, alignment = "right" } },
            ]
            "#,
        )
        .unwrap();

        let transforms = &config.steps[0].transforms;
        assert_eq!(transforms.len(), 7);
        assert_eq!(transforms[0], Transform::Log {});
        assert_eq!(
            transforms[4],
            Transform::Rolling {
                window: Window::new(3).unwrap(),
                method: Aggregation::Median
            }
        );
        assert_eq!(
            transforms[5],
            Transform::Ewma {
                decay: Decay::Span(5)
            }
        );
    }

    #[test]
    fn centred_windows_do_not_parse() {
        let err = PipelineConfig::from_toml_str(
            r#"
            [[steps]]
            name = "leaky"
            transforms = [{ op = "rolling", window = { size = 3, alignment = "center" }, method = "mean" }]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn stray_transform_keys_do_not_parse() {
        let typo = PipelineConfig::from_toml_str(
            r#"
            [[steps]]
            name = "change"
            transforms = [{ op = "difference", order = 1, typo = 7 }]
            "#,
        );
        assert!(matches!(typo, Err(Error::InvalidConfiguration(_))));

        // alignment belongs inside the window table
        let misplaced = PipelineConfig::from_toml_str(
            r#"
            [[steps]]
            name = "leaky"
            transforms = [{ op = "rolling", window = { size = 3 }, method = "mean", alignment = "center" }]
            "#,
        );
        assert!(matches!(misplaced, Err(Error::InvalidConfiguration(_))));

        let log = PipelineConfig::from_toml_str(
            r#"
            [[steps]]
            name = "logged"
            transforms = [{ op = "log", base = 10 }]
            "#,
        );
        assert!(matches!(log, Err(Error::InvalidConfiguration(_))));

        let json = PipelineConfig::from_json_str(
            r#"{"steps": [{"name": "d", "transforms": [{"op": "lag", "periods": 1, "fill": 0}]}]}"#,
        );
        assert!(matches!(json, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn json_definitions_are_accepted() {
        let config = PipelineConfig::from_json_str(
            r#"{"steps": [{"name": "d", "transforms": [{"op": "difference", "order": 2}]}]}"#,
        )
        .unwrap();
        assert_eq!(
            config.steps[0].transforms,
            vec![Transform::Difference { order: 2 }]
        );
    }
}
