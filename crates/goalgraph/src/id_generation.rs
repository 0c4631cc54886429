//! Hash-based goal id allocation.
//!
//! Ids have the form `{prefix}-{hash}` (e.g. `goal-a3f8`), where the hash is
//! SHA-256 over the title, the creation sequence number, the current time and
//! a retry nonce, base36-encoded.
//!
//! # Features
//!
//! - **Adaptive length**: the hash grows with graph size (4-6 characters)
//! - **Collision resistant**: nonce retry, then one extra character
//! - **Never reused**: every id handed out or registered stays reserved for
//!   the generator's lifetime, including ids of deleted goals
//!
//! # Example
//!
//! ```
//! use goalgraph::id_generation::{IdGenerator, IdGeneratorConfig};
//!
//! let mut generator = IdGenerator::new(IdGeneratorConfig {
//!     prefix: "goal".to_string(),
//! });
//!
//! let id = generator.generate("Learn Rust", 1, 0).unwrap();
//! assert!(id.starts_with("goal-"));
//! ```

use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const MAX_NONCE: u32 = 100;
const MAX_ID_LENGTH: usize = 6;

/// Errors that can occur during ID generation
#[derive(Debug, Error)]
pub enum IdGenerationError {
    /// Unable to generate a unique ID after exhausting all nonces and length increases
    #[error("Unable to generate unique ID after {attempts} attempts")]
    CollisionExhausted {
        /// Number of nonces tried
        attempts: u32,
    },

    /// Invalid length parameter
    #[error("Length must be greater than 0")]
    InvalidLength,
}

/// Configuration for ID generation
#[derive(Debug, Clone)]
pub struct IdGeneratorConfig {
    /// Prefix for all IDs (e.g., "goal")
    pub prefix: String,
}

/// Hash-based ID generator with collision detection.
///
/// The reserved set only grows. Ids of deleted goals are never released, which
/// is what keeps a goal id from ever being handed out twice.
#[derive(Debug)]
pub struct IdGenerator {
    config: IdGeneratorConfig,
    reserved: HashSet<String>,
}

impl IdGenerator {
    /// Create a new ID generator with the given configuration
    pub fn new(config: IdGeneratorConfig) -> Self {
        Self {
            config,
            reserved: HashSet::new(),
        }
    }

    /// The configured id prefix.
    pub fn prefix(&self) -> &str {
        &self.config.prefix
    }

    /// Reserve an existing ID so it is never generated
    pub fn register_id(&mut self, id: String) {
        self.reserved.insert(id);
    }

    /// Whether `id` has been handed out or registered.
    pub fn is_reserved(&self, id: &str) -> bool {
        self.reserved.contains(id)
    }

    /// Generate a new unique ID.
    ///
    /// # Arguments
    ///
    /// * `title` - Goal title
    /// * `sequence` - Creation sequence number of the new goal
    /// * `graph_size` - Current number of goals (drives the adaptive length)
    ///
    /// # Errors
    ///
    /// Returns an error if every nonce collides at the maximum length.
    pub fn generate(
        &mut self,
        title: &str,
        sequence: u64,
        graph_size: usize,
    ) -> Result<String, IdGenerationError> {
        let mut id_length = adaptive_length(graph_size);

        loop {
            for nonce in 0..MAX_NONCE {
                let id = self.generate_hash_id(title, sequence, nonce, id_length)?;

                if !self.reserved.contains(&id) {
                    if nonce > 0 {
                        debug!(
                            nonce,
                            id_length, "Generated unique ID after {} collision retries", nonce
                        );
                    }
                    self.reserved.insert(id.clone());
                    return Ok(id);
                }
            }

            if id_length >= MAX_ID_LENGTH {
                return Err(IdGenerationError::CollisionExhausted {
                    attempts: MAX_NONCE,
                });
            }

            warn!(
                id_length,
                max_nonce = MAX_NONCE,
                "All nonces exhausted, increasing ID length to {}",
                id_length + 1
            );
            id_length += 1;
        }
    }

    /// Generate a hash-based ID with the given parameters
    fn generate_hash_id(
        &self,
        title: &str,
        sequence: u64,
        nonce: u32,
        length: usize,
    ) -> Result<String, IdGenerationError> {
        let timestamp = Utc::now().timestamp_micros();
        let content = format!("{}|{}|{}|{}", title, sequence, timestamp, nonce);

        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let hash_bytes = hasher.finalize();

        let hash_str = encode_base36(&hash_bytes[..8], length)?;

        Ok(format!("{}-{}", self.config.prefix, hash_str))
    }
}

/// Determine ID length based on graph size
///
/// - 0-500 goals: 4 chars
/// - 501-1,500: 5 chars
/// - 1,500+: 6 chars
fn adaptive_length(graph_size: usize) -> usize {
    match graph_size {
        0..=500 => 4,
        501..=1500 => 5,
        _ => 6,
    }
}

/// Encode bytes as a base36 string of exactly `length` characters.
///
/// Only the first 8 bytes fit in the u64 accumulator; callers pass a
/// truncated hash, and wrapping keeps the result deterministic regardless.
fn encode_base36(bytes: &[u8], length: usize) -> Result<String, IdGenerationError> {
    if length == 0 {
        return Err(IdGenerationError::InvalidLength);
    }

    let mut num: u64 = 0;
    for &byte in bytes {
        num = num.wrapping_shl(8).wrapping_add(u64::from(byte));
    }

    let mut result = Vec::with_capacity(length);
    let mut n = num;
    while result.len() < length {
        let remainder = (n % 36) as usize;
        result.push(char::from(BASE36_CHARS[remainder]));
        n /= 36;
    }

    result.reverse();
    Ok(result.into_iter().collect())
}

/// Check that `id` has the form `{prefix}-{hash}` with a 4-6 character
/// alphanumeric hash.
pub fn validate_id(id: &str, prefix: &str) -> bool {
    let Some(hash) = id
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
    else {
        return false;
    };

    (4..=MAX_ID_LENGTH).contains(&hash.len()) && hash.chars().all(|c| c.is_ascii_alphanumeric())
}
