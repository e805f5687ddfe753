//! Seeded pseudo-random number generation.
//!
//! A seed string is folded into 32 bits with FNV-1a over its UTF-16 code
//! units, then drives a Mulberry32 generator. The same seed yields the same
//! sequence on every platform, which is what replayable chaos tests need.

/// FNV-1a 32-bit offset basis.
pub const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;

/// FNV-1a 32-bit prime.
pub const FNV_PRIME: u32 = 0x0100_0193;

const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;

/// Fold a seed string into a 32-bit state.
///
/// Operates on UTF-16 code units so that non-ASCII seeds hash the same way
/// they do in JavaScript hosts.
pub fn hash_seed(seed: &str) -> u32 {
    seed.encode_utf16().fold(FNV_OFFSET_BASIS, |hash, unit| {
        (hash ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    })
}

/// Mulberry32 generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rng {
    state: u32,
}

impl Rng {
    /// Create a generator from a seed string.
    pub fn seed(seed: &str) -> Self {
        Self::from_state(hash_seed(seed))
    }

    /// Create a generator from a raw 32-bit state.
    pub fn from_state(state: u32) -> Self {
        Self { state }
    }

    /// Current internal state.
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Next raw 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next draw in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }

    /// Next integer in `[0, max)`. Returns 0 when `max` is 0.
    pub fn next_int(&mut self, max: u32) -> u32 {
        (self.next_f64() * f64::from(max)).floor() as u32
    }

    /// Pick one element uniformly.
    ///
    /// Always consumes exactly one draw, even for an empty slice, so the
    /// sequence position does not depend on the input length.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        let r = self.next_f64();
        if items.is_empty() {
            return None;
        }
        let idx = (r * items.len() as f64).floor() as usize;
        items.get(idx.min(items.len() - 1))
    }

    /// Return a shuffled copy using Fisher-Yates from the end.
    ///
    /// The input is left untouched.
    pub fn shuffle<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut out = items.to_vec();
        for i in (1..out.len()).rev() {
            let j = (self.next_f64() * (i + 1) as f64).floor() as usize;
            out.swap(i, j.min(i));
        }
        out
    }
}

impl Iterator for Rng {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}

/// Shorthand for [`Rng::seed`].
pub fn seed(seed: &str) -> Rng {
    Rng::seed(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use super::Rng;

    #[test]
    fn test_hash_seed_known_values() {
        assert_eq!(hash_seed(""), 2_166_136_261);
        assert_eq!(hash_seed("reach"), 1_291_669_624);
        assert_eq!(hash_seed("chaos-seed-42"), 2_456_316_268);
        assert_eq!(hash_seed("\u{e9}\u{2713}"), 1_825_020_405);
    }

    #[test]
    fn test_known_sequence() {
        let draws: Vec<f64> = Rng::seed("reach").take(5).collect();
        assert_eq!(
            draws,
            vec![
                0.7765786545351148,
                0.00750793656334281,
                0.5604566945694387,
                0.1252922450657934,
                0.6739479769021273,
            ]
        );

        let draws: Vec<f64> = Rng::seed("").take(5).collect();
        assert_eq!(
            draws,
            vec![
                0.6112444521859288,
                0.4935242917854339,
                0.7740248835179955,
                0.4122861116193235,
                0.8122657814528793,
            ]
        );
    }

    #[test]
    fn test_non_ascii_seed_sequence() {
        let draws: Vec<f64> = Rng::seed("\u{e9}\u{2713}").take(5).collect();
        assert_eq!(
            draws,
            vec![
                0.7390731847845018,
                0.4579893553163856,
                0.7856014724820852,
                0.624719699844718,
                0.031542829470708966,
            ]
        );
    }

    #[test]
    fn test_next_int() {
        let mut rng = Rng::seed("reach");
        let ints: Vec<u32> = (0..5).map(|_| rng.next_int(100)).collect();
        assert_eq!(ints, vec![77, 0, 56, 12, 67]);
    }

    #[test]
    fn test_shuffle_known_permutation() {
        let input = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let shuffled = Rng::seed("shuffle").shuffle(&input);
        assert_eq!(shuffled, vec![5, 2, 3, 8, 6, 7, 1, 4]);
        assert_eq!(input, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_pick_empty_consumes_draw() {
        let mut a = Rng::seed("pick");
        let mut b = Rng::seed("pick");
        let empty: [u8; 0] = [];
        assert_eq!(a.pick(&empty), None);
        b.next_f64();
        assert_eq!(a.next_f64(), b.next_f64());
    }

    #[test]
    fn test_pick_uses_draw() {
        let items = ["a", "b", "c", "d"];
        let mut a = Rng::seed("reach");
        // first draw is 0.776..., 0.776 * 4 = 3.1
        assert_eq!(a.pick(&items), Some(&"d"));
    }

    #[test]
    fn test_clone_continues_identically() {
        let mut a = Rng::seed("fork");
        a.next_f64();
        let mut b = a.clone();
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    proptest! {
        #[test]
        fn prop_same_seed_same_sequence(s in ".{0,24}") {
            let a: Vec<f64> = Rng::seed(&s).take(1000).collect();
            let b: Vec<f64> = Rng::seed(&s).take(1000).collect();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_draws_in_unit_interval(state in any::<u32>()) {
            for f in Rng::from_state(state).take(64) {
                prop_assert!((0.0..1.0).contains(&f));
            }
        }

        #[test]
        fn prop_shuffle_is_permutation(items in prop::collection::vec(any::<u16>(), 0..40), s in "[a-z]{0,8}") {
            let mut shuffled = Rng::seed(&s).shuffle(&items);
            let mut sorted = items.clone();
            shuffled.sort_unstable();
            sorted.sort_unstable();
            prop_assert_eq!(shuffled, sorted);
        }
    }
}
