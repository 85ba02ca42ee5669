//! Analysis/synthesis window tables.
//!
//! Hybrid windows in Q14: a sine rise over the lookahead, a flat top over
//! the frame hop, and a cosine fall. Rise and fall are power complements
//! at the hop distance, so applying the window on analysis and again on
//! synthesis overlap-adds back to unity.

/// Window for the 128-sample block (80-sample frames, 48 lookahead).
/// `round(16384 * w[i])` with `w` rising as `sin(pi * i / 96)`.
pub(crate) const WINDOW_128: [i16; 128] = [
    0, 536, 1072, 1606, 2139, 2669, 3196, 3720, 4240, 4756, //
    5266, 5771, 6270, 6762, 7246, 7723, 8192, 8652, 9102, 9543, //
    9974, 10394, 10803, 11200, 11585, 11958, 12318, 12665, 12998, 13318, //
    13623, 13913, 14189, 14449, 14694, 14924, 15137, 15334, 15515, 15679, //
    15826, 15956, 16069, 16165, 16244, 16305, 16349, 16375, 16384, 16384, //
    16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, //
    16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, //
    16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, //
    16384, 16375, 16349, 16305, 16244, 16165, 16069, 15956, 15826, 15679, //
    15515, 15334, 15137, 14924, 14694, 14449, 14189, 13913, 13623, 13318, //
    12998, 12665, 12318, 11958, 11585, 11200, 10803, 10394, 9974, 9543, //
    9102, 8652, 8192, 7723, 7246, 6762, 6270, 5771, 5266, 4756, //
    4240, 3720, 3196, 2669, 2139, 1606, 1072, 536, //
];

/// Window for the 256-sample block (160-sample frames, 96 lookahead).
/// `round(16384 * w[i])` with `w` rising as `sin(pi * i / 192)`.
pub(crate) const WINDOW_256: [i16; 256] = [
    0, 268, 536, 804, 1072, 1339, 1606, 1872, 2139, 2404, //
    2669, 2933, 3196, 3459, 3720, 3981, 4240, 4499, 4756, 5012, //
    5266, 5520, 5771, 6021, 6270, 6517, 6762, 7005, 7246, 7486, //
    7723, 7959, 8192, 8423, 8652, 8878, 9102, 9324, 9543, 9760, //
    9974, 10185, 10394, 10600, 10803, 11003, 11200, 11394, 11585, 11773, //
    11958, 12140, 12318, 12493, 12665, 12833, 12998, 13160, 13318, 13472, //
    13623, 13770, 13913, 14053, 14189, 14321, 14449, 14574, 14694, 14811, //
    14924, 15032, 15137, 15237, 15334, 15426, 15515, 15599, 15679, 15754, //
    15826, 15893, 15956, 16015, 16069, 16119, 16165, 16207, 16244, 16277, //
    16305, 16329, 16349, 16364, 16375, 16382, 16384, 16384, 16384, 16384, //
    16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, //
    16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, //
    16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, //
    16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, //
    16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, //
    16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, 16384, //
    16384, 16382, 16375, 16364, 16349, 16329, 16305, 16277, 16244, 16207, //
    16165, 16119, 16069, 16015, 15956, 15893, 15826, 15754, 15679, 15599, //
    15515, 15426, 15334, 15237, 15137, 15032, 14924, 14811, 14694, 14574, //
    14449, 14321, 14189, 14053, 13913, 13770, 13623, 13472, 13318, 13160, //
    12998, 12833, 12665, 12493, 12318, 12140, 11958, 11773, 11585, 11394, //
    11200, 11003, 10803, 10600, 10394, 10185, 9974, 9760, 9543, 9324, //
    9102, 8878, 8652, 8423, 8192, 7959, 7723, 7486, 7246, 7005, //
    6762, 6517, 6270, 6021, 5771, 5520, 5266, 5012, 4756, 4499, //
    4240, 3981, 3720, 3459, 3196, 2933, 2669, 2404, 2139, 1872, //
    1606, 1339, 1072, 804, 536, 268, //
];

/// Window table for a supported block length.
///
/// # Panics
///
/// Panics on block lengths without a table.
pub(crate) fn for_block_len(block_len: usize) -> &'static [i16] {
    match block_len {
        128 => &WINDOW_128,
        256 => &WINDOW_256,
        _ => panic!("no window table for block length {block_len}"),
    }
}
