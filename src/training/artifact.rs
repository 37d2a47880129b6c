//! Persistence of the trained model artifact
//!
//! The artifact is a postcard-encoded envelope written next to its final
//! location and renamed into place, so readers only ever see a complete file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::TrainedModel;
use crate::{ClimateError, Result};

/// Bumped whenever the encoded layout of [`TrainedModel`] changes
const FORMAT_VERSION: u16 = 1;

#[derive(Serialize, Deserialize)]
struct ArtifactEnvelope {
    format_version: u16,
    model: TrainedModel,
}

/// Location of the single model artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStore {
    path: PathBuf,
}

impl ArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Replace the artifact with `model`
    #[instrument(level = "debug", skip(self, model))]
    pub fn save(&self, model: &TrainedModel) -> Result<()> {
        let envelope = ArtifactEnvelope {
            format_version: FORMAT_VERSION,
            model: model.clone(),
        };
        let bytes = postcard::to_stdvec(&envelope)
            .map_err(|e| ClimateError::artifact(format!("failed to encode model: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let staging = self.staging_path();
        fs::write(&staging, &bytes)?;
        if let Err(e) = fs::rename(&staging, &self.path) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }

        info!(
            "Saved {} model ({} bytes) to {}",
            model.model_kind,
            bytes.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Read the artifact back
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self) -> Result<TrainedModel> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ClimateError::model_not_trained(self.path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let envelope: ArtifactEnvelope = postcard::from_bytes(&bytes)
            .map_err(|e| ClimateError::artifact(format!("failed to decode model: {e}")))?;
        if envelope.format_version != FORMAT_VERSION {
            return Err(ClimateError::artifact(format!(
                "unsupported artifact version {} (expected {FORMAT_VERSION})",
                envelope.format_version
            )));
        }

        debug!(
            "Loaded {} model trained at {}",
            envelope.model.model_kind, envelope.model.trained_at
        );
        Ok(envelope.model)
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "model".into());
        name.push(format!(".{}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}
