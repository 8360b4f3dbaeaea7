use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf}
};
use thiserror::Error;
use tracing::info;

use crate::model::structures::{
    match_data::{Match, Player},
    model_weights::ModelWeights
};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error
    }
}

/// Players, the ordered match history and the current model, if any.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub players: Vec<Player>,
    pub matches: Vec<Match>,
    #[serde(default)]
    pub weights: Option<ModelWeights>
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source
    })
}

pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let dataset: Dataset = read_json(path)?;
    info!(
        "Loaded {} players and {} matches from {}",
        dataset.players.len(),
        dataset.matches.len(),
        path.display()
    );

    Ok(dataset)
}

/// Writes `value` as pretty JSON to `path`, or to stdout when no path is given.
pub fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> Result<(), DatasetError> {
    let io_error = |source| DatasetError::Io {
        path: path.map_or_else(|| PathBuf::from("<stdout>"), Path::to_path_buf),
        source
    };
    let json_error = |source| DatasetError::Json {
        path: path.map_or_else(|| PathBuf::from("<stdout>"), Path::to_path_buf),
        source
    };

    match path {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
            serde_json::to_writer_pretty(&mut writer, value).map_err(json_error)?;
            writer.flush().map_err(io_error)
        }
        None => {
            let mut writer = std::io::stdout().lock();
            serde_json::to_writer_pretty(&mut writer, value).map_err(json_error)?;
            writeln!(writer).map_err(io_error)
        }
    }
}
