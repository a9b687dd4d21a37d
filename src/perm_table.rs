//! Compaction permutations, one entry per comparison mask.
//!
//! Entry `m` holds the source lanes of the compacted register: first every lane whose bit in `m`
//! is clear, then every lane whose bit is set, both groups in ascending lane order. Entries are
//! written as 32-bit sub-lane indices (a 64-bit lane `l` becomes the pair `2l, 2l + 1`) so that one
//! cross-lane 32-bit permute serves both lane widths.
//!
//! The AVX2 backend reads an entry with a 16 byte load and widens the low 8 bytes, so every table
//! is followed by guard bytes keeping the read of the last entry inside the table.

/// Bytes per table entry, one per 32-bit sub-lane of a 256-bit register.
pub(crate) const ENTRY_BYTES: usize = 8;

const GUARD_BYTES: usize = 8;

/// Permutations for 8 lanes of 32 bits.
pub(crate) static PERM_TABLE_32: [u8; (1 << 8) * ENTRY_BYTES + GUARD_BYTES] = build_table(8);

/// Permutations for 4 lanes of 64 bits.
pub(crate) static PERM_TABLE_64: [u8; (1 << 4) * ENTRY_BYTES + GUARD_BYTES] = build_table(4);

const fn build_table<const LEN: usize>(lanes: usize) -> [u8; LEN] {
    assert!(LEN == (1 << lanes) * ENTRY_BYTES + GUARD_BYTES);

    let sub_lanes = ENTRY_BYTES / lanes;
    let mut table = [0u8; LEN];

    let mut mask = 0;
    while mask < (1 << lanes) {
        let entry = mask * ENTRY_BYTES;
        let mut out = 0;

        let mut group = 0;
        while group < 2 {
            let mut lane = 0;
            while lane < lanes {
                if (mask >> lane) & 1 == group {
                    let mut sub = 0;
                    while sub < sub_lanes {
                        table[entry + out] = (lane * sub_lanes + sub) as u8;
                        out += 1;
                        sub += 1;
                    }
                }
                lane += 1;
            }
            group += 1;
        }

        mask += 1;
    }

    table
}

/// The entry for `mask` in the table of a register with `lanes` lanes.
#[inline(always)]
pub(crate) fn entry(lanes: usize, mask: u32) -> &'static [u8] {
    let table: &'static [u8] = if lanes == 8 {
        &PERM_TABLE_32
    } else {
        &PERM_TABLE_64
    };
    let start = mask as usize * ENTRY_BYTES;
    &table[start..start + ENTRY_BYTES]
}

/// Straightforward compaction, the reference the tables and backends are checked against.
#[cfg(test)]
pub(crate) fn model_compact<L: Copy>(v: &[L], mask: u32) -> Vec<L> {
    let kept = (0..v.len()).filter(|i| (mask >> i) & 1 == 0);
    let moved = (0..v.len()).filter(|i| (mask >> i) & 1 == 1);
    kept.chain(moved).map(|i| v[i]).collect()
}
