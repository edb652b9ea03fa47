//! Service password generation
//!
//! The generator is injected into [`ManifestGenerator`](crate::ManifestGenerator)
//! so tests can substitute a deterministic one.

use crate::error::{AdapterError, Result};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

/// Number of random bytes behind each password
pub const PASSWORD_BYTES: usize = 20;

/// Strategy producing a fresh service password
pub trait PasswordGenerator: Send + Sync {
    fn generate(&self) -> Result<String>;
}

/// Default generator: OS randomness encoded as URL-safe base64
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPasswordGenerator;

impl PasswordGenerator for RandomPasswordGenerator {
    fn generate(&self) -> Result<String> {
        let mut bytes = [0u8; PASSWORD_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| AdapterError::PasswordGeneration(e.to_string()).logged())?;
        Ok(URL_SAFE.encode(bytes))
    }
}

impl<F> PasswordGenerator for F
where
    F: Fn() -> Result<String> + Send + Sync,
{
    fn generate(&self) -> Result<String> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_passwords_are_url_safe() {
        let password = RandomPasswordGenerator.generate().unwrap();
        // 20 bytes encode to 28 characters with padding
        assert_eq!(password.len(), 28);
        assert!(!password.contains('+'));
        assert!(!password.contains('/'));
        assert_eq!(URL_SAFE.decode(&password).unwrap().len(), PASSWORD_BYTES);
    }

    #[test]
    fn random_passwords_differ() {
        let a = RandomPasswordGenerator.generate().unwrap();
        let b = RandomPasswordGenerator.generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn closures_are_generators() {
        let fixed = || -> Result<String> { Ok("fixed".to_string()) };
        assert_eq!(fixed.generate().unwrap(), "fixed");
    }
}
