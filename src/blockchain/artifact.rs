//! Hardhat build artifact lookup.
//!
//! Hardhat writes one JSON file per contract at
//! `artifacts/<source path>/<Name>.json` holding the ABI and creation bytecode,
//! next to `<Name>.dbg.json` debug files and a `build-info/` directory.

use std::fs;
use std::path::{Path, PathBuf};

use alloy::json_abi::JsonAbi;
use alloy::primitives::Bytes;
use serde::Deserialize;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// The parts of a Hardhat artifact needed to deploy and call a contract.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    pub contract_name: String,
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    /// Find and parse the artifact for `name` anywhere under `artifacts_dir`.
    pub fn find(artifacts_dir: &Path, name: &str) -> BlockchainResult<Self> {
        let path = locate(artifacts_dir, name)?.ok_or_else(|| BlockchainError::ArtifactNotFound {
            name: name.to_string(),
            dir: artifacts_dir.display().to_string(),
        })?;

        let artifact = Self::from_file(&path)?;
        tracing::debug!(
            contract = %artifact.contract_name,
            path = %path.display(),
            bytecode_len = artifact.bytecode.len(),
            "Loaded contract artifact"
        );
        Ok(artifact)
    }

    /// Parse a single artifact file.
    pub fn from_file(path: &Path) -> BlockchainResult<Self> {
        let invalid = |reason: String| BlockchainError::Artifact {
            path: path.display().to_string(),
            reason,
        };

        let content = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let artifact: Self = serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;

        if artifact.bytecode.is_empty() {
            return Err(invalid("empty bytecode (abstract contract or interface?)".to_string()));
        }
        Ok(artifact)
    }
}

fn locate(dir: &Path, name: &str) -> BlockchainResult<Option<PathBuf>> {
    let wanted = format!("{}.json", name);

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(BlockchainError::Artifact {
                path: dir.display().to_string(),
                reason: e.to_string(),
            })
        }
    };

    let mut subdirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if entry.file_name() != "build-info" {
                subdirs.push(path);
            }
        } else if entry.file_name().to_str() == Some(wanted.as_str()) {
            return Ok(Some(path));
        }
    }

    subdirs.sort();
    for sub in subdirs {
        if let Some(found) = locate(&sub, name)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}
