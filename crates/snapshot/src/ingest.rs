use crate::{Result, SnapshotError};
use flate2::read::GzDecoder;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const GAMESTATES_KEY: &str = "gamestates";

/// Decoded savegame: collection documents plus top-level scalar fields.
#[derive(Debug, Clone, Default)]
pub struct Savegame {
    pub gamestates: BTreeMap<String, Value>,
    pub scalars: BTreeMap<String, String>,
}

impl Savegame {
    pub fn from_gamestates(gamestates: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            gamestates: gamestates.into_iter().collect(),
            scalars: BTreeMap::new(),
        }
    }

    /// Parses a decompressed savegame document. A leading byte-order mark is ignored.
    pub fn from_json_bytes(bytes: &[u8], origin: &Path) -> Result<Self> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let document: Value = serde_json::from_slice(bytes)?;
        let Value::Object(mut root) = document else {
            return Err(SnapshotError::MalformedSource {
                path: origin.to_path_buf(),
            });
        };
        let Some(Value::Object(gamestates)) = root.remove(GAMESTATES_KEY) else {
            return Err(SnapshotError::MalformedSource {
                path: origin.to_path_buf(),
            });
        };

        Ok(Self {
            gamestates: gamestates.into_iter().collect(),
            scalars: scalar_fields(root),
        })
    }

    #[must_use]
    pub fn collection_count(&self) -> usize {
        self.gamestates.len()
    }
}

/// Reads a gzip-compressed savegame from disk.
pub fn read_savegame(path: &Path) -> Result<Savegame> {
    log::info!("Loading {}...", path.display());
    let file = std::fs::File::open(path)?;
    let mut decoder = GzDecoder::new(std::io::BufReader::new(file));
    let mut bytes = Vec::new();
    decoder.read_to_end(&mut bytes)?;
    #[allow(clippy::cast_precision_loss)]
    let megabytes = bytes.len() as f64 / 1024.0 / 1024.0;
    log::info!("Loaded {megabytes:.1}MB JSON");
    Savegame::from_json_bytes(&bytes, path)
}

fn scalar_fields(root: Map<String, Value>) -> BTreeMap<String, String> {
    root.into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            Value::Number(n) => Some((key, n.to_string())),
            Value::Bool(b) => Some((key, b.to_string())),
            _ => None,
        })
        .collect()
}
