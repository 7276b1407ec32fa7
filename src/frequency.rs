//! Byte frequency counting

/// Occurrence count for each of the 256 byte values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
}

impl FrequencyTable {
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counter = FrequencyCounter::new();
        counter.update(data);
        counter.finish()
    }

    pub fn get(&self, byte: u8) -> u64 {
        self.counts[byte as usize]
    }

    /// Byte values that occurred at least once, with their counts, in ascending byte order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(|(b, &c)| (b as u8, c))
    }

    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Accumulates byte counts chunk by chunk.
#[derive(Debug, Clone)]
pub struct FrequencyCounter {
    counts: [u64; 256],
}

impl Default for FrequencyCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self { counts: [0u64; 256] }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        for &b in chunk {
            self.counts[b as usize] += 1;
        }
    }

    pub fn finish(self) -> FrequencyTable {
        FrequencyTable { counts: self.counts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_every_byte() {
        let table = FrequencyTable::from_bytes(&[0x41, 0x42, 0x41, 0x41, 0x43]);
        assert_eq!(table.get(b'A'), 3);
        assert_eq!(table.get(b'B'), 1);
        assert_eq!(table.get(b'C'), 1);
        assert_eq!(table.distinct(), 3);
        assert_eq!(table.total(), 5);
    }

    #[test]
    fn test_chunked_matches_whole() {
        let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let mut counter = FrequencyCounter::new();
        for chunk in data.chunks(7) {
            counter.update(chunk);
        }
        assert_eq!(counter.finish(), FrequencyTable::from_bytes(&data));
    }

    #[test]
    fn test_iter_is_sorted_and_skips_zero() {
        let table = FrequencyTable::from_bytes(b"zza");
        let entries: Vec<_> = table.iter().collect();
        assert_eq!(entries, vec![(b'a', 1), (b'z', 2)]);
    }

    #[test]
    fn test_empty() {
        let table = FrequencyTable::from_bytes(b"");
        assert!(table.is_empty());
        assert_eq!(table.iter().count(), 0);
    }
}
