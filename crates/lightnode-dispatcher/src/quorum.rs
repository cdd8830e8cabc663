//! Quorum arithmetic shared by the aggregator.

/// `⌈(2n+1)/3⌉`, the agreement threshold for `n` peers addressed.
pub fn threshold(n: usize) -> usize {
    (2 * n + 1).div_ceil(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_spec_example() {
        // 8 peers, threshold 6 per the worked example in the seeded scenario.
        assert_eq!(threshold(8), 6);
    }

    #[test]
    fn single_peer_needs_itself() {
        assert_eq!(threshold(1), 1);
    }

    #[test]
    fn zero_peers_needs_nothing() {
        assert_eq!(threshold(0), 1);
    }
}
