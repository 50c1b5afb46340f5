//! Keypair files
//!
//! Solana CLI format (JSON array of the 64 secret-key bytes). Loading also
//! accepts a bare base58 secret key, the format browser wallets export.

use std::fs;
use std::io::Write;
use std::path::Path;

use solana_sdk::signature::Keypair;
use thiserror::Error;

use crate::domain::mint::MintIdentity;

#[derive(Debug, Error)]
pub enum KeyfileError {
    #[error("Failed to load keypair from file: {0}")]
    LoadError(String),
    #[error("Invalid keypair bytes: {0}")]
    InvalidKeypair(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Load a keypair from a JSON byte array or base58 secret file
pub fn load_keypair<P: AsRef<Path>>(path: P) -> Result<Keypair, KeyfileError> {
    let contents = fs::read_to_string(path.as_ref())
        .map_err(|e| KeyfileError::LoadError(format!("Failed to read file: {}", e)))?;
    let trimmed = contents.trim();

    let bytes: Vec<u8> = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed)
            .map_err(|e| KeyfileError::LoadError(format!("Invalid JSON format: {}", e)))?
    } else {
        bs58::decode(trimmed)
            .into_vec()
            .map_err(|e| KeyfileError::LoadError(format!("Invalid base58 secret: {}", e)))?
    };

    keypair_from_bytes(&bytes)
}

pub fn keypair_from_bytes(bytes: &[u8]) -> Result<Keypair, KeyfileError> {
    Keypair::try_from(bytes).map_err(|e| KeyfileError::InvalidKeypair(e.to_string()))
}

/// Save keypair to file (JSON array format)
pub fn save_keypair<P: AsRef<Path>>(path: P, keypair: &Keypair) -> Result<(), KeyfileError> {
    let bytes = keypair.to_bytes().to_vec();
    let json = serde_json::to_string(&bytes)
        .map_err(|e| KeyfileError::LoadError(format!("Failed to serialize: {}", e)))?;

    let mut file = secret_file(path.as_ref())?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

/// Open for writing, owner read/write only
#[cfg(unix)]
fn secret_file(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on create; tighten a pre-existing file too
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn secret_file(path: &Path) -> std::io::Result<fs::File> {
    fs::File::create(path)
}

pub fn load_mint<P: AsRef<Path>>(path: P) -> Result<MintIdentity, KeyfileError> {
    load_keypair(path).map(MintIdentity::new)
}

pub fn save_mint<P: AsRef<Path>>(path: P, mint: &MintIdentity) -> Result<(), KeyfileError> {
    save_keypair(path, mint.keypair())
}
