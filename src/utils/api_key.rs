use rand::Rng;
use rand::distributions::Alphanumeric;
use sha2::{Digest, Sha256};

const KEY_SECRET_LEN: usize = 32;
const PREFIX_LEN: usize = 8;

/// A freshly minted API key. The plaintext is shown to the caller exactly
/// once; only the hash and the display prefix are persisted.
pub struct GeneratedKey {
    pub plaintext: String,
    pub prefix: String,
    pub hash: String,
}

pub fn generate_api_key() -> GeneratedKey {
    let mut rng = rand::thread_rng();
    let prefix: String = (&mut rng)
        .sample_iter(&Alphanumeric)
        .take(PREFIX_LEN)
        .map(char::from)
        .collect();
    let secret: String = (&mut rng)
        .sample_iter(&Alphanumeric)
        .take(KEY_SECRET_LEN)
        .map(char::from)
        .collect();

    let plaintext = format!("sw_{}_{}", prefix, secret);
    let hash = hash_api_key(&plaintext);

    GeneratedKey {
        plaintext,
        prefix,
        hash,
    }
}

pub fn hash_api_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_unique() {
        let a = generate_api_key();
        let b = generate_api_key();
        assert_ne!(a.plaintext, b.plaintext);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn plaintext_carries_prefix() {
        let key = generate_api_key();
        assert!(key.plaintext.starts_with(&format!("sw_{}_", key.prefix)));
        assert_eq!(key.prefix.len(), 8);
    }

    #[test]
    fn hash_is_stable_and_hex() {
        let key = generate_api_key();
        assert_eq!(hash_api_key(&key.plaintext), key.hash);
        assert_eq!(key.hash.len(), 64);
        assert!(key.hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_inputs_hash_differently() {
        assert_ne!(hash_api_key("sw_aaaa_bbbb"), hash_api_key("sw_aaaa_bbbc"));
    }
}
