//! Authentication gate for headtrack.
//!
//! A single shared password guards the whole system. The credential is a
//! salted SHA-256 hash persisted to a JSON sidecar file, so password
//! resets survive restarts; the first run seeds the file from the
//! configured default password. Session state itself lives in a signed
//! cookie (see the server module) and is untouched by a reset, so
//! already-authenticated sessions stay valid.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Punctuation set the password policy requires one character from.
const SPECIAL_CHARACTERS: &str = "!@#$%^&*()";

/// Minimum password length accepted by a reset.
const MIN_PASSWORD_LENGTH: usize = 8;

/// A salt and the salted hash of the current shared password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Hex-encoded random salt.
    pub salt: String,
    /// Hex-encoded `sha256(password + salt)`.
    pub hash: String,
}

impl Credentials {
    /// Generate fresh credentials for the given password with a new salt.
    #[must_use]
    pub fn generate(password: &str) -> Self {
        let salt = generate_salt();
        let hash = hash_password(password, &salt);
        Self { salt, hash }
    }

    /// Check a password against these credentials.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        hash_password(password, &self.salt) == self.hash
    }
}

/// Hash a password with the given salt.
///
/// The digest input is the password concatenated with the salt, matching
/// the persisted credential format.
#[must_use]
pub fn hash_password(password: &str, salt: &str) -> String {
    let digest = Sha256::digest(format!("{password}{salt}").as_bytes());
    hex::encode(digest)
}

/// Generate a random hex-encoded salt.
#[must_use]
pub fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}

/// Validate a candidate password against the strength policy.
///
/// The policy requires at least [`MIN_PASSWORD_LENGTH`] characters, at
/// least one ASCII digit, and at least one of [`SPECIAL_CHARACTERS`].
///
/// # Errors
///
/// Returns [`Error::PasswordPolicy`] if any requirement is not met.
pub fn validate_password_policy(password: &str) -> Result<()> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LENGTH;
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| SPECIAL_CHARACTERS.contains(c));

    if long_enough && has_digit && has_special {
        Ok(())
    } else {
        Err(Error::PasswordPolicy)
    }
}

/// File-backed store for the shared credential.
///
/// All verification and reset traffic goes through this store; the
/// in-memory copy and the sidecar file are kept in sync under a lock.
#[derive(Debug)]
pub struct CredentialStore {
    /// Path to the credential file.
    path: PathBuf,
    /// The current credentials.
    current: Mutex<Credentials>,
}

impl CredentialStore {
    /// Open the credential store at the given path.
    ///
    /// Loads existing credentials, or seeds the file from
    /// `default_password` when it is missing or unreadable.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory or a seeded credential
    /// file cannot be written.
    pub fn open(path: impl AsRef<Path>, default_password: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let existing = fs::read_to_string(&path)
            .ok()
            .and_then(|contents| serde_json::from_str::<Credentials>(&contents).ok());

        let credentials = match existing {
            Some(credentials) => {
                debug!("Loaded credentials from {}", path.display());
                credentials
            }
            None => {
                info!(
                    "No credentials at {}, seeding from the default password",
                    path.display()
                );
                let credentials = Credentials::generate(default_password);
                write_credentials(&path, &credentials)?;
                credentials
            }
        };

        Ok(Self {
            path,
            current: Mutex::new(credentials),
        })
    }

    /// Get the path to the credential file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check a login attempt against the current password.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        self.current.lock().verify(password)
    }

    /// Replace the shared password.
    ///
    /// Succeeds only if `old` matches the current password, `new` equals
    /// `confirm`, and `new` passes the strength policy. On success the
    /// credential is re-salted, re-hashed, and persisted.
    ///
    /// # Errors
    ///
    /// Returns a validation error describing the first failed check, or a
    /// write error if the credential file cannot be updated.
    pub fn reset(&self, old: &str, new: &str, confirm: &str) -> Result<()> {
        let mut current = self.current.lock();

        if !current.verify(old) {
            return Err(Error::IncorrectOldPassword);
        }
        if new != confirm {
            return Err(Error::PasswordMismatch);
        }
        validate_password_policy(new)?;

        let credentials = Credentials::generate(new);
        write_credentials(&self.path, &credentials)?;
        *current = credentials;

        info!("Shared password reset");
        Ok(())
    }
}

/// Persist credentials as JSON, via a temp file renamed over the target.
fn write_credentials(path: &Path, credentials: &Credentials) -> Result<()> {
    let json = serde_json::to_string_pretty(credentials)?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|source| Error::CredentialsWrite {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| Error::CredentialsWrite {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
