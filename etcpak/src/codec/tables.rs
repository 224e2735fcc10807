//! Constant tables defined by the ETC and EAC formats.

/// ETC1 luminance modifier tables, indexed by pixel index
/// (0 → +a, 1 → +b, 2 → −a, 3 → −b).
pub const ETC_MODIFIERS: [[i32; 4]; 8] = [
    [2, 8, -2, -8],
    [5, 17, -5, -17],
    [9, 29, -9, -29],
    [13, 42, -13, -42],
    [18, 60, -18, -60],
    [24, 80, -24, -80],
    [33, 106, -33, -106],
    [47, 183, -47, -183],
];

/// Distances used by the ETC2 T and H modes.
pub const ETC2_DISTANCES: [i32; 8] = [3, 6, 11, 16, 23, 32, 41, 64];

/// EAC alpha modifier tables.
pub const ALPHA_MODIFIERS: [[i32; 8]; 16] = [
    [-3, -6, -9, -15, 2, 5, 8, 14],
    [-3, -7, -10, -13, 2, 6, 9, 12],
    [-2, -5, -8, -13, 1, 4, 7, 12],
    [-2, -4, -6, -13, 1, 3, 5, 12],
    [-3, -6, -8, -12, 2, 5, 7, 11],
    [-3, -7, -9, -11, 2, 6, 8, 10],
    [-4, -7, -8, -11, 3, 6, 7, 10],
    [-3, -5, -8, -11, 2, 4, 7, 10],
    [-2, -6, -8, -10, 1, 5, 7, 9],
    [-2, -5, -8, -10, 1, 4, 7, 9],
    [-2, -4, -8, -10, 1, 3, 7, 9],
    [-2, -5, -7, -10, 1, 4, 6, 9],
    [-3, -4, -7, -10, 2, 3, 6, 9],
    [-1, -2, -3, -10, 0, 1, 2, 9],
    [-4, -6, -8, -9, 3, 5, 7, 8],
    [-3, -5, -7, -9, 2, 4, 6, 8],
];

/// 4×4 ordered dither matrix, row-major, values 0..16.
pub const BAYER_4X4: [[i32; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_etc_tables_are_symmetric() {
        for row in ETC_MODIFIERS {
            assert_eq!(row[0], -row[2]);
            assert_eq!(row[1], -row[3]);
        }
    }

    #[test]
    fn test_alpha_tables_span_zero() {
        for row in ALPHA_MODIFIERS {
            assert!(row[3] < 0 && row[7] > 0);
        }
        assert!(ALPHA_MODIFIERS[13].contains(&0));
    }

    #[test]
    fn test_bayer_is_permutation() {
        let mut seen: Vec<i32> = BAYER_4X4.iter().flatten().copied().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..16).collect::<Vec<_>>());
    }
}
