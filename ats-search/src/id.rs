use nanoid::nanoid;

/// Identifier alphabet without ambiguous glyphs (no `0/O`, `1/l/I`, `i/k/o`).
const ID_ALPHABET: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y',
    'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'j', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];
const ID_LENGTH: usize = 20;

/// New candidate identifier.
pub fn generate_candidate_id() -> String {
    nanoid!(ID_LENGTH, ID_ALPHABET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_has_expected_length_and_charset() {
        let id = generate_candidate_id();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.chars().all(|c| ID_ALPHABET.contains(&c)));
        assert_ne!(id, generate_candidate_id());
    }
}
