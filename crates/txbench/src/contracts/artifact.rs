//! Loading deploy bytecode from compiler output.

use std::{fs, path::Path};

use alloy_primitives::{Bytes, hex};
use alloy_sol_types::{SolType, SolValue, abi::TokenSeq};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while reading a contract artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The artifact file could not be read.
    #[error("failed to read artifact {path}: {source}")]
    Io {
        /// Path of the artifact.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// The artifact is not valid JSON or lacks a bytecode field.
    #[error("malformed artifact {path}: {source}")]
    Json {
        /// Path of the artifact.
        path: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// The bytecode is not valid hex.
    #[error("invalid bytecode hex in {path}: {source}")]
    Hex {
        /// Path of the artifact.
        path: String,
        /// Underlying hex error.
        source: hex::FromHexError,
    },
    /// The bytecode field is empty, which is what abstract contracts compile to.
    #[error("artifact {0} has no deploy bytecode")]
    Empty(String),
}

/// Foundry writes `{"bytecode": {"object": "0x.."}}`, Hardhat writes `{"bytecode": "0x.."}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Foundry { object: String },
    Hardhat(String),
}

#[derive(Deserialize)]
struct RawArtifact {
    bytecode: RawBytecode,
}

/// Deploy bytecode of a compiled contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractArtifact {
    bytecode: Bytes,
}

impl ContractArtifact {
    /// Reads a Foundry or Hardhat artifact JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let contents = fs::read_to_string(path)
            .map_err(|source| ArtifactError::Io { path: display.clone(), source })?;
        Self::from_json(&contents, &display)
    }

    /// Parses artifact JSON. `origin` is only used in error messages.
    pub fn from_json(json: &str, origin: &str) -> Result<Self, ArtifactError> {
        let raw: RawArtifact = serde_json::from_str(json)
            .map_err(|source| ArtifactError::Json { path: origin.to_string(), source })?;
        let encoded = match raw.bytecode {
            RawBytecode::Foundry { object } => object,
            RawBytecode::Hardhat(code) => code,
        };
        let bytecode: Bytes = hex::decode(encoded.trim())
            .map_err(|source| ArtifactError::Hex { path: origin.to_string(), source })?
            .into();
        if bytecode.is_empty() {
            return Err(ArtifactError::Empty(origin.to_string()));
        }
        Ok(Self { bytecode })
    }

    /// Raw init code without constructor arguments.
    pub const fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }

    /// Init code followed by the ABI-encoded constructor arguments.
    pub fn deploy_code<T: SolValue>(&self, constructor_args: T) -> Bytes
    where
        for<'a> <T::SolType as SolType>::Token<'a>: TokenSeq<'a>,
    {
        let mut code = self.bytecode.to_vec();
        code.extend_from_slice(&constructor_args.abi_encode_params());
        code.into()
    }
}
