//! Packing of buffer fragments into the FIFO slots and back.
//!
//! The core shifts the most significant bit of the highest used slot out
//! first, so each word goes on the wire big-endian: for 64 and 128 bit
//! words the first four buffer bytes land in the highest slot.
//!
//! The last burst of a transfer may carry less than a word. Its bytes are
//! sent first and the rest of the word is zero.

use super::layout::offsets;
use super::register::{RegisterAccess, RegisterIo};
use crate::config::{FIFO_BYTES, FIFO_SLOT_BYTES};

/// Word size classes the FIFO can carry in one burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordWidth {
    W8,
    W16,
    W32,
    W64,
    W128,
}

impl WordWidth {
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            8 => Some(WordWidth::W8),
            16 => Some(WordWidth::W16),
            32 => Some(WordWidth::W32),
            64 => Some(WordWidth::W64),
            128 => Some(WordWidth::W128),
            _ => None,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            WordWidth::W8 => 8,
            WordWidth::W16 => 16,
            WordWidth::W32 => 32,
            WordWidth::W64 => 64,
            WordWidth::W128 => 128,
        }
    }

    /// Bytes consumed from the buffer per burst.
    pub fn bytes(self) -> usize {
        self.bits() as usize / 8
    }

    fn slots(self) -> usize {
        (self.bytes() / FIFO_SLOT_BYTES).max(1)
    }

    /// Write one word from `src` into the Tx slots, zero-padded when `src`
    /// is shorter. Returns the bytes consumed.
    pub fn push<I: RegisterIo>(self, regs: &mut RegisterAccess<I>, src: &[u8]) -> usize {
        let n = self.bytes();
        let used = src.len().min(n);
        if used == 0 {
            return 0;
        }
        let mut buf = [0u8; FIFO_BYTES];
        buf[..used].copy_from_slice(&src[..used]);
        let word = &buf[..n];

        match self {
            WordWidth::W8 => regs.write(offsets::tx(0), word[0] as u32),
            WordWidth::W16 => {
                regs.write(offsets::tx(0), u16::from_be_bytes([word[0], word[1]]) as u32)
            }
            WordWidth::W32 => regs.write(offsets::tx(0), be32(word)),
            WordWidth::W64 | WordWidth::W128 => {
                let top = self.slots() - 1;
                for (k, chunk) in word.chunks_exact(FIFO_SLOT_BYTES).enumerate() {
                    regs.write(offsets::tx(top - k), be32(chunk));
                }
            }
        }
        used
    }

    /// Read one word from the Rx slots into `dst`, keeping only the
    /// leading bytes when `dst` is shorter. Returns the bytes produced.
    pub fn pop<I: RegisterIo>(self, regs: &RegisterAccess<I>, dst: &mut [u8]) -> usize {
        let n = self.bytes();
        let used = dst.len().min(n);
        if used == 0 {
            return 0;
        }
        let mut buf = [0u8; FIFO_BYTES];
        let word = &mut buf[..n];

        match self {
            WordWidth::W8 => word[0] = (regs.read(offsets::rx(0)) & 0xFF) as u8,
            WordWidth::W16 => {
                let data = (regs.read(offsets::rx(0)) & 0xFFFF) as u16;
                word.copy_from_slice(&data.to_be_bytes());
            }
            WordWidth::W32 => word.copy_from_slice(&regs.read(offsets::rx(0)).to_be_bytes()),
            WordWidth::W64 | WordWidth::W128 => {
                let top = self.slots() - 1;
                for (k, chunk) in word.chunks_exact_mut(FIFO_SLOT_BYTES).enumerate() {
                    chunk.copy_from_slice(&regs.read(offsets::rx(top - k)).to_be_bytes());
                }
            }
        }
        dst[..used].copy_from_slice(&buf[..used]);
        used
    }
}

fn be32(chunk: &[u8]) -> u32 {
    let mut bytes = [0u8; FIFO_SLOT_BYTES];
    bytes.copy_from_slice(chunk);
    u32::from_be_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ByteOrder;
    use crate::spi::testing::FakeCore;

    const ALL: [WordWidth; 5] = [
        WordWidth::W8,
        WordWidth::W16,
        WordWidth::W32,
        WordWidth::W64,
        WordWidth::W128,
    ];

    fn pattern(n: usize) -> Vec<u8> {
        (0..n as u8).map(|i| 0xA0 ^ (i * 17)).collect()
    }

    #[test]
    fn only_the_five_widths_are_known() {
        for bits in 0..=255u8 {
            let known = matches!(bits, 8 | 16 | 32 | 64 | 128);
            assert_eq!(WordWidth::from_bits(bits).is_some(), known, "{} bits", bits);
        }
        for width in ALL {
            assert_eq!(WordWidth::from_bits(width.bits()), Some(width));
        }
    }

    #[test]
    fn pop_restores_what_push_wrote() {
        for order in [ByteOrder::Native, ByteOrder::Swapped] {
            for width in ALL {
                let core = FakeCore::new();
                let mut regs = RegisterAccess::new(core.clone(), order);
                let src = pattern(width.bytes());
                assert_eq!(width.push(&mut regs, &src), width.bytes());

                let mut dst = vec![0u8; width.bytes()];
                assert_eq!(width.pop(&regs, &mut dst), width.bytes());
                assert_eq!(dst, src, "{:?} {:?}", width, order);
            }
        }
    }

    #[test]
    fn words_go_on_the_wire_big_endian() {
        let core = FakeCore::new();
        let mut regs = RegisterAccess::new(core.clone(), ByteOrder::Native);
        let src: Vec<u8> = (1..=16).collect();

        WordWidth::W16.push(&mut regs, &src);
        assert_eq!(regs.read(offsets::tx(0)), 0x0102);

        WordWidth::W32.push(&mut regs, &src);
        assert_eq!(regs.read(offsets::tx(0)), 0x0102_0304);

        WordWidth::W64.push(&mut regs, &src);
        assert_eq!(regs.read(offsets::tx(1)), 0x0102_0304);
        assert_eq!(regs.read(offsets::tx(0)), 0x0506_0708);

        WordWidth::W128.push(&mut regs, &src);
        assert_eq!(regs.read(offsets::tx(3)), 0x0102_0304);
        assert_eq!(regs.read(offsets::tx(2)), 0x0506_0708);
        assert_eq!(regs.read(offsets::tx(1)), 0x090A_0B0C);
        assert_eq!(regs.read(offsets::tx(0)), 0x0D0E_0F10);
    }

    #[test]
    fn narrow_pop_masks_unused_bits() {
        let core = FakeCore::new();
        let mut regs = RegisterAccess::new(core.clone(), ByteOrder::Native);
        regs.write(offsets::rx(0), 0xFFFF_ABCD);

        let mut byte = [0u8; 1];
        WordWidth::W8.pop(&regs, &mut byte);
        assert_eq!(byte, [0xCD]);

        let mut half = [0u8; 2];
        WordWidth::W16.pop(&regs, &mut half);
        assert_eq!(half, [0xAB, 0xCD]);
    }

    #[test]
    fn short_fragments_are_padded_and_trimmed() {
        let core = FakeCore::new();
        let mut regs = RegisterAccess::new(core.clone(), ByteOrder::Native);
        assert_eq!(WordWidth::W32.push(&mut regs, &[1, 2, 3]), 3);
        assert_eq!(regs.read(offsets::tx(0)), 0x0102_0300);

        assert_eq!(WordWidth::W128.push(&mut regs, &[9, 8, 7, 6, 5, 4]), 6);
        assert_eq!(regs.read(offsets::tx(3)), 0x0908_0706);
        assert_eq!(regs.read(offsets::tx(2)), 0x0504_0000);
        assert_eq!(regs.read(offsets::tx(1)), 0);
        assert_eq!(regs.read(offsets::tx(0)), 0);

        let mut dst = [0u8; 6];
        assert_eq!(WordWidth::W128.pop(&regs, &mut dst), 6);
        assert_eq!(dst, [9, 8, 7, 6, 5, 4]);
    }

    #[test]
    fn empty_fragments_touch_nothing() {
        let core = FakeCore::new();
        let mut regs = RegisterAccess::new(core.clone(), ByteOrder::Native);
        assert_eq!(WordWidth::W64.push(&mut regs, &[]), 0);
        assert!(core.writes().is_empty());
        assert_eq!(WordWidth::W64.pop(&regs, &mut []), 0);
    }
}
