//! # Flavor
//!
//! Deterministic "random" copy for effect pages. The same title always lands on the same phrase,
//! so the backend and any cached page agree without storing anything.
//!
//! Hash must be reproducible bit for bit: 32-bit signed wrap, UTF-16 code units.

pub const FLAVOR_PHRASES: [&str; 8] = [
    "Half the internet remembers it the other way.",
    "Check your childhood memories before you vote.",
    "This one splits families at the dinner table.",
    "Your brain may be filling in the gaps.",
    "The archives say one thing, people say another.",
    "Say it out loud, then decide.",
    "Most people are sure, until they look it up.",
    "A classic case of collective misremembering.",
];

pub fn string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(unit as i32))
}

/// Stable index into a table of `len` entries, `len` must be non-zero.
pub fn pick_index(seed: &str, len: usize) -> usize {
    string_hash(seed).unsigned_abs() as usize % len
}

pub fn flavor_text(seed: &str) -> &'static str {
    FLAVOR_PHRASES[pick_index(seed, FLAVOR_PHRASES.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_hash() {
        assert_eq!(string_hash(""), 0);
    }

    #[test]
    fn test_known_values() {
        assert_eq!(string_hash("a"), 97);
        assert_eq!(string_hash("ab"), 97 * 31 + 98);
        // wraps like a 32-bit signed int
        assert_eq!(string_hash("hello world"), 1794106052);
        assert_eq!(string_hash("Berenstain Bears"), string_hash("Berenstain Bears"));
    }

    #[test]
    fn test_hash_uses_utf16_units() {
        // one astral char is two UTF-16 units
        let expected = 0xD83Di32.wrapping_mul(31).wrapping_add(0xDE00);
        assert_eq!(string_hash("\u{1F600}"), expected);
    }

    #[test]
    fn test_flavor_is_stable() {
        let first = flavor_text("Fruit of the Loom");
        assert_eq!(first, flavor_text("Fruit of the Loom"));
        assert!(FLAVOR_PHRASES.contains(&first));
        assert_eq!(flavor_text(""), FLAVOR_PHRASES[0]);
    }

    #[test]
    fn test_pick_index_handles_min_hash() {
        assert!(pick_index("polygenelubricants", 7) < 7);
    }
}
