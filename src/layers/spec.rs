use serde::{Serialize, Deserialize};

use crate::error::NnResult;
use super::{Layer, MaxPoolLayer, PoolAlignment};

/// Serializable description of a layer's shape parameters.
///
/// Stored as JSON with a `"type"` tag, e.g.
/// `{"type":"max_pool","width":28,"height":28,"channels":1,"size":2,"stride":2}`.
/// Builds a fresh layer with empty caches; no trained state is carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerSpec {
    MaxPool {
        width: usize,
        height: usize,
        channels: usize,
        size: usize,
        stride: usize,
        #[serde(default)]
        alignment: PoolAlignment,
    },
}

impl LayerSpec {
    /// Validates the parameters and constructs the layer.
    pub fn build(&self) -> NnResult<Box<dyn Layer>> {
        match *self {
            LayerSpec::MaxPool { width, height, channels, size, stride, alignment } => {
                let layer = MaxPoolLayer::with_alignment(width, height, channels, size, stride, alignment)?;
                Ok(Box::new(layer))
            }
        }
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<LayerSpec> {
        serde_json::from_str(json)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a `LayerSpec` from a JSON file written by `save_json`.
    pub fn load_json(path: &str) -> std::io::Result<LayerSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}
