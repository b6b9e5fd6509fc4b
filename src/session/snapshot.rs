use crate::catalog::WizardType;
use crate::error::StoreError;
use crate::model::ConfigState;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};

/// A suspended session: enough to rebuild its state machine from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub wizard: WizardType,
    pub variant: String,
    pub state: ConfigState,
}

impl SessionSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError> {
        encode_to_vec(self, standard()).map_err(|e| StoreError::Encode(e.to_string()))
    }

    /// Saves the snapshot to a file using the bincode format.
    pub fn save(&self, path: &str) -> Result<(), StoreError> {
        let bytes = self.to_bytes()?;
        let mut file = fs::File::create(path).map_err(|e| StoreError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        file.write_all(&bytes).map_err(|e| StoreError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    pub fn from_file(path: &str) -> Result<Self, StoreError> {
        let mut file = fs::File::open(path).map_err(|e| StoreError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| StoreError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StoreError> {
        decode_from_slice(bytes, standard())
            .map(|(snapshot, _)| snapshot)
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}
