//! Identifier generation

use rand::Rng;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn random_code(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// 8-character traveler id handed out at registration.
pub fn traveler_id() -> String {
    random_code(8)
}

/// 6-character group invite code.
pub fn group_code() -> String {
    random_code(6)
}

/// Incident case number, e.g. `INC483920`.
pub fn case_number() -> String {
    let mut rng = rand::thread_rng();
    format!("INC{}", rng.gen_range(100_000..1_000_000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_have_expected_shape() {
        let id = traveler_id();
        assert_eq!(id.len(), 8);
        assert!(id.bytes().all(|b| CODE_ALPHABET.contains(&b)));

        let code = group_code();
        assert_eq!(code.len(), 6);

        let case = case_number();
        assert!(case.starts_with("INC"));
        assert_eq!(case.len(), 9);
    }
}
