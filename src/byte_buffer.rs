const MSB_MASK: u64 = 0x8080_8080_8080_8080;
const LOW_MASK: u64 = 0x7F7F_7F7F_7F7F_7F7F;
const LSB_MASK: u64 = 0x0101_0101_0101_0101;

/// Word-at-a-time byte search over a byte slice.
pub trait ByteBuffer {
    /// Index of the first occurrence of `needle`.
    fn byte_position(&self, needle: u8) -> Option<usize>;

    /// Index of the last occurrence of `needle`.
    fn last_byte_position(&self, needle: u8) -> Option<usize>;
}

#[inline(always)]
fn load(bytes: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(word)
}

// High bit of every byte of `word` that equals `needle`. Exact: no carries
// cross byte lanes, so every flagged byte is a real match.
#[inline(always)]
fn matching_bytes(word: u64, needle: u8) -> u64 {
    let xored = word ^ (LSB_MASK * needle as u64);
    !((((xored & LOW_MASK) + LOW_MASK) | xored) | LOW_MASK) & MSB_MASK
}

impl ByteBuffer for [u8] {
    #[inline(always)]
    fn byte_position(&self, needle: u8) -> Option<usize> {
        let mut i = 0;

        while i + 8 <= self.len() {
            let matches = matching_bytes(load(&self[i..]), needle);

            if matches != 0 {
                return Some(i + (matches.trailing_zeros() / 8) as usize);
            }

            i += 8;
        }

        while i < self.len() {
            if self[i] == needle {
                return Some(i);
            }
            i += 1;
        }

        None
    }

    #[inline(always)]
    fn last_byte_position(&self, needle: u8) -> Option<usize> {
        let mut end = self.len();

        while end >= 8 {
            let matches = matching_bytes(load(&self[end - 8..]), needle);

            if matches != 0 {
                let j = 7 - (matches.leading_zeros() / 8) as usize;
                return Some(end - 8 + j);
            }

            end -= 8;
        }

        self[..end].iter().rposition(|&b| b == needle)
    }
}
