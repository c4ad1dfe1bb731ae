//! Replacement policy bookkeeping over a single set of lines

use rand::Rng;

use super::line::Line;
use super::ReplacementPolicy;

impl ReplacementPolicy {
    /// Record a hit on `set[way]`.
    /// FIFO and random replacement ignore hits.
    pub fn on_hit(self, set: &mut [Line], way: usize) {
        match self {
            ReplacementPolicy::Lru => promote(set, way),
            ReplacementPolicy::Lfu => set[way].use_bits += 1,
            ReplacementPolicy::Fifo | ReplacementPolicy::Random => {}
        }
    }

    /// Pick the way to evict from a set and reset its use bits
    /// for the incoming block
    pub fn select_victim(self, set: &mut [Line], rng: &mut impl Rng) -> usize {
        match self {
            ReplacementPolicy::Lru | ReplacementPolicy::Lfu => {
                let way = least_used(set);
                set[way].use_bits = 0;
                way
            }
            ReplacementPolicy::Fifo => {
                let way = least_used(set);
                set[way].use_bits = 0;
                // Ordered by insertion, so the newcomer is promoted once here
                promote(set, way);
                way
            }
            ReplacementPolicy::Random => rng.gen_range(0..set.len()),
        }
    }
}

/// Move `set[way]` to the top of the recency stack.
///
/// The top value is the set's associativity. Lines that were above the
/// touched line's old position slide down by one, so relative order among
/// the rest is preserved.
pub fn promote(set: &mut [Line], way: usize) {
    let top = set.len();
    let old = set[way].use_bits;
    if old >= top {
        return;
    }

    set[way].use_bits = top;
    for (i, line) in set.iter_mut().enumerate() {
        if i != way && line.use_bits > old {
            line.use_bits -= 1;
        }
    }
}

/// Leftmost way holding the strictly smallest use value
pub fn least_used(set: &[Line]) -> usize {
    let mut victim = 0;
    for (i, line) in set.iter().enumerate() {
        if line.use_bits < set[victim].use_bits {
            victim = i;
        }
    }
    victim
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn make_set(uses: &[usize]) -> Vec<Line> {
        uses.iter()
            .map(|u| {
                let mut line = Line::make(4);
                line.use_bits = *u;
                line
            })
            .collect()
    }

    fn uses(set: &[Line]) -> Vec<usize> {
        set.iter().map(|line| line.use_bits).collect()
    }

    #[test]
    fn test_promote_keeps_relative_order() {
        let mut set = make_set(&[4, 3, 2, 1]);
        promote(&mut set, 2);
        assert_eq!(uses(&set), vec![3, 2, 4, 1]);
    }

    #[test]
    fn test_promote_top_is_noop() {
        let mut set = make_set(&[4, 3, 2, 1]);
        promote(&mut set, 0);
        assert_eq!(uses(&set), vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_promote_from_zero() {
        let mut set = make_set(&[0, 0]);
        promote(&mut set, 0);
        assert_eq!(uses(&set), vec![2, 0]);
        promote(&mut set, 1);
        assert_eq!(uses(&set), vec![1, 2]);
    }

    #[test]
    fn test_promote_stays_bounded() {
        let mut set = make_set(&[0, 0, 0, 0]);
        for way in [0, 1, 2, 3, 1, 1, 0, 3, 2, 2] {
            promote(&mut set, way);
            assert!(set.iter().all(|line| line.use_bits <= 4));
            assert_eq!(set[way].use_bits, 4);
        }
    }

    #[test]
    fn test_least_used_leftmost_wins() {
        assert_eq!(least_used(&make_set(&[2, 1, 1, 3])), 1);
        assert_eq!(least_used(&make_set(&[0, 0, 0, 0])), 0);
        assert_eq!(least_used(&make_set(&[3, 2, 1, 0])), 3);
        assert_eq!(least_used(&make_set(&[5])), 0);
    }

    #[test]
    fn test_lru_hit_promotes() {
        let mut set = make_set(&[2, 1]);
        ReplacementPolicy::Lru.on_hit(&mut set, 1);
        assert_eq!(uses(&set), vec![1, 2]);
    }

    #[test]
    fn test_lfu_hit_counts() {
        let mut set = make_set(&[2, 1]);
        ReplacementPolicy::Lfu.on_hit(&mut set, 1);
        ReplacementPolicy::Lfu.on_hit(&mut set, 1);
        ReplacementPolicy::Lfu.on_hit(&mut set, 1);
        // Unbounded, unlike the LRU counters
        assert_eq!(uses(&set), vec![2, 4]);
    }

    #[test]
    fn test_fifo_and_random_ignore_hits() {
        let mut set = make_set(&[2, 1]);
        ReplacementPolicy::Fifo.on_hit(&mut set, 1);
        ReplacementPolicy::Random.on_hit(&mut set, 1);
        assert_eq!(uses(&set), vec![2, 1]);
    }

    #[test]
    fn test_lru_victim_reset() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut set = make_set(&[2, 1]);
        assert_eq!(ReplacementPolicy::Lru.select_victim(&mut set, &mut rng), 1);
        assert_eq!(uses(&set), vec![2, 0]);
    }

    #[test]
    fn test_fifo_victim_promoted() {
        let mut rng = StdRng::seed_from_u64(0);
        let fifo = ReplacementPolicy::Fifo;
        let mut set = make_set(&[0, 0, 0]);
        assert_eq!(fifo.select_victim(&mut set, &mut rng), 0);
        assert_eq!(uses(&set), vec![3, 0, 0]);
        assert_eq!(fifo.select_victim(&mut set, &mut rng), 1);
        assert_eq!(uses(&set), vec![2, 3, 0]);
        assert_eq!(fifo.select_victim(&mut set, &mut rng), 2);
        assert_eq!(uses(&set), vec![1, 2, 3]);
        assert_eq!(fifo.select_victim(&mut set, &mut rng), 0);
        assert_eq!(uses(&set), vec![3, 1, 2]);
    }

    #[test]
    fn test_random_victim_in_set() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut set = make_set(&[7, 7, 7, 7]);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let way =
                ReplacementPolicy::Random.select_victim(&mut set, &mut rng);
            assert!(way < 4);
            seen[way] = true;
        }
        assert!(seen.iter().all(|s| *s));
        // Random replacement keeps no use bits
        assert_eq!(uses(&set), vec![7, 7, 7, 7]);
    }
}
