//! The Poly1305 one-time authenticator (RFC 8439).
//!
//! Arithmetic is over five 26-bit limbs modulo 2^130 - 5. Key material, the
//! accumulator and the partial-block buffer live in page-locked storage and
//! are wiped when the instance is finalized or dropped.

use zeroize::Zeroize;

use crate::secret::SecretBox;
use crate::TAG_SIZE;

const MASK_26: u64 = 0x03ff_ffff;

#[derive(Zeroize)]
struct Inner {
    r: [u64; 5],
    s: [u64; 2],
    acc: [u64; 5],
    partial: [u8; Poly1305::BLOCK_SIZE],
    partial_len: usize,
}

/// The Poly1305 one-time MAC.
///
/// An instance is keyed with material that must be used for exactly one
/// message. [`finalize`](Self::finalize) consumes the instance, so no
/// further data can be absorbed after the tag is produced.
pub struct Poly1305 {
    inner: SecretBox<Inner>,
}

impl Poly1305 {
    /// Size of the one-time key in bytes.
    pub const KEY_SIZE: usize = 32;

    /// Size of the produced tag in bytes.
    pub const TAG_SIZE: usize = TAG_SIZE;

    /// Size of an absorbed block in bytes.
    pub const BLOCK_SIZE: usize = 16;

    /// Key the authenticator with a 32-byte one-time key.
    ///
    /// The first half becomes the clamped multiplier `r`, the second half
    /// the additive mask `s`.
    pub fn new(key: &[u8; Self::KEY_SIZE]) -> Self {
        let b0 = u64::from(u32::from_le_bytes(key[0..4].try_into().unwrap()) & 0x0fff_ffff);
        let b1 = u64::from(u32::from_le_bytes(key[4..8].try_into().unwrap()) & 0x0fff_fffc);
        let b2 = u64::from(u32::from_le_bytes(key[8..12].try_into().unwrap()) & 0x0fff_fffc);
        let b3 = u64::from(u32::from_le_bytes(key[12..16].try_into().unwrap()) & 0x0fff_fffc);

        let r = [
            b0 & MASK_26,
            ((b0 >> 26) | (b1 << 6)) & MASK_26,
            ((b1 >> 20) | (b2 << 12)) & MASK_26,
            ((b2 >> 14) | (b3 << 18)) & MASK_26,
            (b3 >> 8) & MASK_26,
        ];

        let s = [
            u64::from_le_bytes(key[16..24].try_into().unwrap()),
            u64::from_le_bytes(key[24..32].try_into().unwrap()),
        ];

        Self {
            inner: SecretBox::new(Inner {
                r,
                s,
                acc: [0; 5],
                partial: [0; Self::BLOCK_SIZE],
                partial_len: 0,
            }),
        }
    }

    /// Absorb `data`, buffering any trailing partial block.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Whether the MAC state's backing pages were successfully page-locked.
    pub fn memory_locked(&self) -> bool {
        self.inner.is_locked()
    }

    /// Process any buffered partial block, add `s`, and produce the tag.
    pub fn finalize(mut self) -> [u8; TAG_SIZE] {
        self.inner.finalize()
    }
}

impl Inner {
    fn update(&mut self, data: &[u8]) {
        let mut offset = 0;

        if self.partial_len > 0 {
            let take = usize::min(data.len(), Poly1305::BLOCK_SIZE - self.partial_len);
            self.partial[self.partial_len..self.partial_len + take].copy_from_slice(&data[..take]);
            self.partial_len += take;
            offset = take;

            if self.partial_len == Poly1305::BLOCK_SIZE {
                let mut block = self.partial;
                self.partial_len = 0;
                self.process_block(&block, Poly1305::BLOCK_SIZE);
                block.zeroize();
            }
        }

        while offset + Poly1305::BLOCK_SIZE <= data.len() {
            let block = data[offset..offset + Poly1305::BLOCK_SIZE].try_into().unwrap();
            self.process_block(&block, Poly1305::BLOCK_SIZE);
            offset += Poly1305::BLOCK_SIZE;
        }

        if offset < data.len() {
            self.partial_len = data.len() - offset;
            self.partial[..self.partial_len].copy_from_slice(&data[offset..]);
        }
    }

    // Interpret `block` little-endian with the implicit high bit at position
    // 8 * len, add to the accumulator, multiply by r.
    fn process_block(&mut self, block: &[u8; Poly1305::BLOCK_SIZE], len: usize) {
        let mut limbs = block_limbs(block, len);
        self.add_limbs(&limbs);
        self.mul_mod_p();
        limbs.zeroize();
    }

    fn add_limbs(&mut self, limbs: &[u64; 5]) {
        let mut carry = 0;
        for (acc, limb) in self.acc.iter_mut().zip(limbs) {
            *acc += limb + carry;
            carry = *acc >> 26;
            *acc &= MASK_26;
        }

        self.acc[0] += carry * 5;
        let carry = self.acc[0] >> 26;
        self.acc[0] &= MASK_26;
        self.acc[1] += carry;
    }

    // Schoolbook multiply with the limbs past 2^130 folded back times 5.
    // No intermediate product overflows u64 for clamped r and 26-bit limbs.
    fn mul_mod_p(&mut self) {
        let [a0, a1, a2, a3, a4] = self.acc;
        let [r0, r1, r2, r3, r4] = self.r;

        let r1_5 = r1 * 5;
        let r2_5 = r2 * 5;
        let r3_5 = r3 * 5;
        let r4_5 = r4 * 5;

        let t0 = a0 * r0 + a1 * r4_5 + a2 * r3_5 + a3 * r2_5 + a4 * r1_5;
        let mut t1 = a0 * r1 + a1 * r0 + a2 * r4_5 + a3 * r3_5 + a4 * r2_5;
        let mut t2 = a0 * r2 + a1 * r1 + a2 * r0 + a3 * r4_5 + a4 * r3_5;
        let mut t3 = a0 * r3 + a1 * r2 + a2 * r1 + a3 * r0 + a4 * r4_5;
        let mut t4 = a0 * r4 + a1 * r3 + a2 * r2 + a3 * r1 + a4 * r0;

        let mut carry = t0 >> 26;
        self.acc[0] = t0 & MASK_26;
        t1 += carry;
        carry = t1 >> 26;
        self.acc[1] = t1 & MASK_26;
        t2 += carry;
        carry = t2 >> 26;
        self.acc[2] = t2 & MASK_26;
        t3 += carry;
        carry = t3 >> 26;
        self.acc[3] = t3 & MASK_26;
        t4 += carry;
        carry = t4 >> 26;
        self.acc[4] = t4 & MASK_26;

        self.acc[0] += carry * 5;
        carry = self.acc[0] >> 26;
        self.acc[0] &= MASK_26;
        self.acc[1] += carry;
    }

    fn finalize(&mut self) -> [u8; TAG_SIZE] {
        if self.partial_len > 0 {
            let mut block = [0u8; Poly1305::BLOCK_SIZE];
            block[..self.partial_len].copy_from_slice(&self.partial[..self.partial_len]);
            let len = self.partial_len;
            self.partial_len = 0;
            self.process_block(&block, len);
            block.zeroize();
        }

        let mut carry = 0;
        for limb in self.acc.iter_mut() {
            *limb += carry;
            carry = *limb >> 26;
            *limb &= MASK_26;
        }

        // Serialize the low 128 bits of the accumulator; bits 128..130 are
        // discarded and the subsequent s addition absorbs the discrepancy
        // modulo 2^128.
        let low = self.acc[0] | (self.acc[1] << 26) | (self.acc[2] << 52);
        let high = (self.acc[2] >> 12) | (self.acc[3] << 14) | (self.acc[4] << 40);

        let (low, overflow) = low.overflowing_add(self.s[0]);
        let high = high.wrapping_add(self.s[1]).wrapping_add(u64::from(overflow));

        let mut tag = [0u8; TAG_SIZE];
        tag[..8].copy_from_slice(&low.to_le_bytes());
        tag[8..].copy_from_slice(&high.to_le_bytes());
        tag
    }
}

fn block_limbs(block: &[u8; Poly1305::BLOCK_SIZE], len: usize) -> [u64; 5] {
    debug_assert!(len >= 1 && len <= Poly1305::BLOCK_SIZE);

    let low = u64::from_le_bytes(block[..8].try_into().unwrap());
    let high = u64::from_le_bytes(block[8..].try_into().unwrap());

    let mut limbs = [
        low & MASK_26,
        (low >> 26) & MASK_26,
        ((low >> 52) | (high << 12)) & MASK_26,
        (high >> 14) & MASK_26,
        high >> 40,
    ];

    let bit = 8 * len;
    limbs[bit / 26] |= 1 << (bit % 26);
    limbs
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn tag(key: &[u8; 32], msg: &[u8]) -> [u8; TAG_SIZE] {
        let mut mac = Poly1305::new(key);
        mac.update(msg);
        mac.finalize()
    }

    //
    // Poly1305 test vector from:
    // <https://datatracker.ietf.org/doc/html/rfc8439#section-2.5.2>
    //
    #[test]
    fn rfc8439_tag() {
        let key = hex!("85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b");
        assert_eq!(
            tag(&key, b"Cryptographic Forum Research Group"),
            hex!("a8061dc1305136c6c22b8baf0c0127a9")
        );
    }

    #[test]
    fn zero_key_gives_zero_tag() {
        assert_eq!(tag(&[0u8; 32], b"arbitrary data"), [0u8; TAG_SIZE]);
    }

    #[test]
    fn zero_r_returns_s() {
        let mut key = [0u8; 32];
        key[16..].copy_from_slice(&hex!("0102030405060708090a0b0c0d0e0f10"));
        assert_eq!(
            tag(&key, b"ignored by a zero multiplier"),
            hex!("0102030405060708090a0b0c0d0e0f10")
        );
    }

    #[test]
    fn empty_message_returns_s() {
        let key = hex!("85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b");
        assert_eq!(tag(&key, &[])[..], key[16..]);
    }

    #[test]
    fn split_updates_match_one_shot() {
        let key = hex!("85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b");
        let msg: Vec<u8> = (0u16..=200).map(|i| (i * 7 + 13) as u8).collect();
        let expected = tag(&key, &msg);

        for split in [1usize, 5, 15, 16, 17, 32, 100] {
            let mut mac = Poly1305::new(&key);
            for chunk in msg.chunks(split) {
                mac.update(chunk);
            }
            assert_eq!(mac.finalize(), expected, "split {split}");
        }
    }

    #[test]
    fn all_ones_block_with_unit_multiplier() {
        // key[0] = 1 clamps to r = 1 and s = 0. One all-ones block absorbs
        // the value 2^128 + (2^128 - 1) = 2^129 - 1, which must survive the
        // limb split, the multiply and serialization untouched.
        let mut key = [0u8; 32];
        key[0] = 1;
        assert_eq!(tag(&key, &[0xff; 16]), [0xff; TAG_SIZE]);
    }

    #[test]
    fn high_bit_distinguishes_short_blocks() {
        // A 15-byte message and the same message zero-extended to 16 bytes
        // differ only in the marker position; their tags must differ.
        let key = hex!("85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b");
        let short = [0u8; 15];
        let padded = [0u8; 16];
        assert_ne!(tag(&key, &short), tag(&key, &padded));
    }
}
