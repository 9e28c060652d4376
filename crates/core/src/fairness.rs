//! Seed derivation for upgrade draws.
//!
//! A client may contribute a seed, but it is always mixed with fresh server
//! entropy, so a client can influence the draw without predicting it. The
//! SHA-256 of the server entropy is exposed as a commitment for audit logs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

/// Maximum accepted length of a client seed, in bytes.
pub const MAX_CLIENT_SEED_LEN: usize = 64;

/// Server entropy plus the optional client contribution for one draw.
#[derive(Debug, Clone)]
pub struct FairnessSeed {
    server_seed: [u8; 32],
    client_seed: Option<String>,
}

impl FairnessSeed {
    /// Build a seed from fresh thread-local entropy.
    pub fn generate(client_seed: Option<&str>) -> Self {
        let mut server_seed = [0u8; 32];
        rand::rng().fill(&mut server_seed[..]);
        Self::from_parts(server_seed, client_seed)
    }

    /// Build a seed from explicit parts (used for replaying an audited draw).
    pub fn from_parts(server_seed: [u8; 32], client_seed: Option<&str>) -> Self {
        Self {
            server_seed,
            client_seed: client_seed
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
        }
    }

    /// Hex SHA-256 of the server entropy.
    pub fn commitment(&self) -> String {
        hex::encode(Sha256::digest(self.server_seed))
    }

    pub fn client_seed(&self) -> Option<&str> {
        self.client_seed.as_deref()
    }

    /// Deterministic RNG for this seed.
    pub fn rng(&self) -> StdRng {
        let mut hasher = Sha256::new();
        hasher.update(self.server_seed);
        if let Some(client) = &self.client_seed {
            hasher.update(client.as_bytes());
        }
        StdRng::from_seed(hasher.finalize().into())
    }
}
