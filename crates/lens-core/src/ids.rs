use rand::Rng;

const SUFFIX_LEN: usize = 8;
const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a human-readable document id
///
/// Layout is `<prefix>_<YYYYMMDDHHMMSS>_<rand8>`, e.g.
/// `session_20260125143005_a1b2c3d4`. The timestamp is UTC; the suffix
/// keeps ids unique within the same second.
pub fn generate_doc_id(prefix: &str) -> String {
    let stamp = jiff::Timestamp::now().strftime("%Y%m%d%H%M%S");

    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| {
            let idx = rng.random_range(0..SUFFIX_ALPHABET.len());
            SUFFIX_ALPHABET[idx] as char
        })
        .collect();

    format!("{prefix}_{stamp}_{suffix}")
}

/// Document id for a user profile, derived from the auth uid
pub fn user_doc_id(uid: &str) -> String {
    format!("user_{uid}")
}
