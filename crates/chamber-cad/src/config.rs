use std::path::Path;

use chamber_types::{InputParameters, ParamValue};
use file_format::{Mesher, OutputSettings};
use serde::Deserialize;

use crate::cli::CliError;

/// One sweep read from a run file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SweepConfig {
    pub variable: String,
    pub values: Vec<serde_json::Value>,
}

/// Output options a run file may set. Anything left out falls through to
/// the command line or the model's defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputOverrides {
    pub mesher: Option<Mesher>,
    pub accuracy: Option<u32>,
    pub just_cad: Option<bool>,
}

impl OutputOverrides {
    /// Apply the fields that are set on top of `settings`.
    pub fn apply(&self, settings: &mut OutputSettings) {
        if let Some(mesher) = self.mesher {
            settings.mesher = mesher;
        }
        if let Some(accuracy) = self.accuracy {
            settings.accuracy = accuracy;
        }
        if let Some(just_cad) = self.just_cad {
            settings.just_cad = just_cad;
        }
    }
}

/// Optional JSON run file:
///
/// ```json
/// {
///   "parameters": { "cavity_radius": "30mm", "insert_angles": ["0deg", "90deg"] },
///   "sweeps": [ { "variable": "pipe_radius", "values": ["8mm", "12mm"] } ],
///   "output": { "mesher": "fineness", "accuracy": 20 }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub parameters: serde_json::Map<String, serde_json::Value>,
    pub sweeps: Vec<SweepConfig>,
    pub output: OutputOverrides,
}

impl RunConfig {
    pub fn from_json(text: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parameter overrides, in file order.
    pub fn overrides(&self) -> Result<InputParameters, CliError> {
        let object = serde_json::Value::Object(self.parameters.clone());
        Ok(InputParameters::from_json_value(&object)?)
    }

    /// Sweeps with each value read the way a parameter value is read.
    pub fn sweeps(&self) -> Result<Vec<(String, Vec<ParamValue>)>, CliError> {
        let mut out = Vec::with_capacity(self.sweeps.len());
        for sweep in &self.sweeps {
            let mut values = Vec::with_capacity(sweep.values.len());
            for value in &sweep.values {
                let mut single = serde_json::Map::new();
                single.insert(sweep.variable.clone(), value.clone());
                let parsed = InputParameters::from_json_value(&serde_json::Value::Object(single))?;
                values.extend(parsed.get(&sweep.variable).cloned());
            }
            out.push((sweep.variable.clone(), values));
        }
        Ok(out)
    }
}
