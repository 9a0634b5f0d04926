use chrono::{NaiveDate, Utc};
use rand::Rng;

pub const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SLUG_MAX: usize = 20;

/// Join token drawn from an alphabet without look-alike characters.
/// Not deduplicated; collisions are for the storage layer to retry.
pub fn generate_token(length: usize) -> String {
    generate_token_with(&mut rand::thread_rng(), length)
}

pub fn generate_token_with<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

pub fn generate_quiz_id(title: &str) -> String {
    generate_quiz_id_with(&mut rand::thread_rng(), title, Utc::now().date_naive())
}

pub fn generate_quiz_id_with<R: Rng + ?Sized>(rng: &mut R, title: &str, date: NaiveDate) -> String {
    let suffix: String = (0..3)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{}-{}", slugify(title), date.format("%Y%m%d"), suffix)
}

/// Lower-cased, hyphen-joined, at most 20 characters.
pub fn slugify(title: &str) -> String {
    let mut slug = String::new();
    let mut pending_hyphen = false;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    slug.truncate(SLUG_MAX);
    if slug.is_empty() {
        "quiz".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn token_uses_alphabet() {
        for _ in 0..200 {
            let token = generate_token(8);
            assert_eq!(token.len(), 8);
            assert!(token.bytes().all(|b| TOKEN_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn alphabet_skips_ambiguous_characters() {
        assert_eq!(TOKEN_ALPHABET.len(), 32);
        for c in [b'0', b'1', b'I', b'O'] {
            assert!(!TOKEN_ALPHABET.contains(&c));
        }
    }

    #[test]
    fn seeded_tokens_repeat() {
        let a = generate_token_with(&mut StdRng::seed_from_u64(7), 12);
        let b = generate_token_with(&mut StdRng::seed_from_u64(7), 12);
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
    }

    #[test]
    fn slug_collapses_separators() {
        assert_eq!(slugify("  Week 3: Cell Biology!! "), "week-3-cell-biology");
        assert_eq!(slugify("A very long quiz title indeed"), "a-very-long-quiz-tit");
        assert_eq!(slugify("???"), "quiz");
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
    }

    #[test]
    fn quiz_id_layout() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let id = generate_quiz_id_with(&mut StdRng::seed_from_u64(1), "Chemistry Basics", date);
        assert!(id.starts_with("chemistry-basics-20261018-"));
        let suffix = id.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 3);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)));
    }
}
