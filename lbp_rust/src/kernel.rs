//! 8-neighbour Local Binary Pattern kernel.
//!
//! Neighbours are visited clockwise from the top-left; bit `i` is set when the
//! centre is strictly brighter than neighbour `i`.

use crate::grid::GridView;

/// (row, col) offsets in bit order.
pub const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
];

/// Descriptor of local pixel `(row, col)`.
///
/// Caller guarantees `1 <= row < view.rows() - 1` and `1 <= col < view.width() - 1`.
#[inline]
pub fn pattern<G: GridView + ?Sized>(view: &G, row: usize, col: usize) -> u8 {
    pattern_in_rows(view.row(row - 1), view.row(row), view.row(row + 1), col)
}

/// Same as `pattern`, with the three rows already fetched.
#[inline(always)]
pub fn pattern_in_rows(above: &[u8], center: &[u8], below: &[u8], col: usize) -> u8 {
    let c = center[col];
    let ring = [
        above[col - 1],
        above[col],
        above[col + 1],
        center[col + 1],
        below[col + 1],
        below[col],
        below[col - 1],
        center[col - 1],
    ];
    ring.iter()
        .enumerate()
        .fold(0u8, |acc, (i, &n)| if c > n { acc | (1 << i) } else { acc })
}

/// Append the descriptors of columns `1..width-1` of one row to `out`.
pub fn row_patterns(above: &[u8], center: &[u8], below: &[u8], out: &mut Vec<u8>) {
    let w = center.len();
    out.extend((1..w.saturating_sub(1)).map(|col| pattern_in_rows(above, center, below, col)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::PixelGrid;

    fn grid3(center: u8, ring: [u8; 8]) -> PixelGrid {
        let mut s = vec![0u8; 9];
        s[4] = center;
        for (i, (dr, dc)) in NEIGHBORS.iter().enumerate() {
            let r = (1 + dr) as usize;
            let c = (1 + dc) as usize;
            s[r * 3 + c] = ring[i];
        }
        PixelGrid::new(3, 3, s).unwrap()
    }

    #[test]
    fn brighter_centre_sets_every_bit() {
        assert_eq!(pattern(&grid3(200, [10; 8]), 1, 1), 0xFF);
    }

    #[test]
    fn darker_centre_sets_no_bit() {
        assert_eq!(pattern(&grid3(5, [10; 8]), 1, 1), 0x00);
    }

    #[test]
    fn equal_intensity_leaves_bit_unset() {
        assert_eq!(pattern(&grid3(50, [50; 8]), 1, 1), 0x00);
    }

    #[test]
    fn bit_positions_follow_clockwise_order() {
        for i in 0..8 {
            let mut ring = [255u8; 8];
            ring[i] = 0;
            assert_eq!(pattern(&grid3(100, ring), 1, 1), 1 << i, "neighbour {i}");
        }
    }

    #[test]
    fn row_patterns_skips_border_columns() {
        let above = [9, 9, 9, 9, 9];
        let center = [0, 10, 1, 10, 0];
        let below = [9, 9, 9, 9, 9];
        let mut out = Vec::new();
        row_patterns(&above, &center, &below, &mut out);
        assert_eq!(out.len(), 3);
        // col 1: brighter than above/below rows and both side neighbours
        assert_eq!(out[0], 0xFF);
        assert_eq!(out[1], 0x00);
    }
}
