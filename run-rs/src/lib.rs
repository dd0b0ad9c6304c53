mod error;
pub mod logging;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};

pub use error::RunError;

/// A single model run: the model input plus the seed, replicate number and
/// output location that came with it.
pub struct Environment<I = ()> {
    input_json: serde_json::Map<String, Value>,
    pub input: Option<I>,
    pub seed: u64,
    pub replicate: u64,
    output: Value,
}

impl Environment {
    pub fn from_json(data: Value) -> Self {
        let mut input_json = data
            .get("input")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default();

        let seed = input_json
            .remove("seed")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        let replicate = input_json
            .remove("replicate")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        let output = data.get("output").cloned().unwrap_or(Value::Null);

        Self {
            input_json,
            input: None,
            seed,
            replicate,
            output,
        }
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, RunError> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        if raw.trim().is_empty() {
            return Err(RunError::EmptyInput);
        }
        let data: Value = serde_json::from_str(&raw)?;
        Ok(Self::from_json(data))
    }

    pub fn from_stdin() -> Result<Self, RunError> {
        Self::from_reader(io::stdin().lock())
    }

    /// Reads an envelope from a config file. Files ending in `.toml` are parsed
    /// as TOML, anything else as JSON.
    pub fn from_config_file(path: &Path) -> Result<Self, RunError> {
        let raw = fs::read_to_string(path)?;
        if raw.trim().is_empty() {
            return Err(RunError::EmptyInput);
        }
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let data: Value = if is_toml {
            toml::from_str(&raw)?
        } else {
            serde_json::from_str(&raw)?
        };
        debug!("loaded run envelope from {}", path.display());
        Ok(Self::from_json(data))
    }

    pub fn with_input_type<I: DeserializeOwned>(self) -> Result<Environment<I>, RunError> {
        let input_value = Value::Object(self.input_json.clone());
        let input = serde_json::from_value(input_value)?;
        Ok(Environment {
            input_json: self.input_json,
            input: Some(input),
            seed: self.seed,
            replicate: self.replicate,
            output: self.output,
        })
    }
}

impl<I> Environment<I> {
    pub fn input(&self) -> Result<&I, RunError> {
        self.input.as_ref().ok_or(RunError::MissingInput)
    }

    /// Sends all outputs of this run to `dir`, replacing whatever the envelope
    /// specified.
    pub fn set_output_dir(&mut self, dir: &Path) {
        self.output = json!({
            "spec": "filesystem",
            "dir": dir.to_string_lossy(),
        });
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        let output = &self.output;

        // Flat output
        if output.get("spec").and_then(|v| v.as_str()) == Some("filesystem") {
            return output
                .get("dir")
                .and_then(|v| v.as_str())
                .map(PathBuf::from);
        }

        // Profiled output: the default profile wins, otherwise the first one
        let profile = output
            .get("profile")
            .and_then(|v| v.as_object())
            .and_then(|profiles| profiles.get("default").or_else(|| profiles.values().next()))?;
        if profile.get("spec").and_then(|v| v.as_str()) == Some("filesystem") {
            return profile
                .get("dir")
                .and_then(|v| v.as_str())
                .map(PathBuf::from);
        }

        None
    }

    fn create_output_file(&self, filename: &str) -> Result<Option<fs::File>, RunError> {
        let Some(dir) = self.output_dir() else {
            return Ok(None);
        };
        fs::create_dir_all(&dir)?;
        let path = dir.join(filename);
        debug!("writing {}", path.display());
        Ok(Some(fs::File::create(path)?))
    }

    pub fn write(&self, filename: &str, data: &[u8]) -> Result<(), RunError> {
        match self.create_output_file(filename)? {
            Some(mut file) => file.write_all(data)?,
            None => io::stdout().lock().write_all(data)?,
        }
        Ok(())
    }

    pub fn write_csv(
        &self,
        filename: &str,
        headers: &[&str],
        rows: &[Vec<String>],
    ) -> Result<(), RunError> {
        match self.create_output_file(filename)? {
            Some(file) => write_records(file, headers, rows),
            None => write_records(io::stdout().lock(), headers, rows),
        }
    }

    pub fn write_json<T: Serialize>(&self, filename: &str, value: &T) -> Result<(), RunError> {
        let mut data = serde_json::to_vec_pretty(value)?;
        data.push(b'\n');
        self.write(filename, &data)
    }
}

fn write_records<W: Write>(
    writer: W,
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<(), RunError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(headers)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// SHA-256 digest (hex) identifying a model input together with its seed.
pub fn fingerprint<T: Serialize>(input: &T, seed: u64) -> Result<String, RunError> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(input)?);
    hasher.update(seed.to_le_bytes());
    Ok(hex::encode(hasher.finalize()))
}
