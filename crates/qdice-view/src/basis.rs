//! Basis-state index conversion between the engine and the display.
//!
//! The external engine numbers basis states little-endian: qubit 0 is bit 0
//! of the native index. Tables shown to people read big-endian, most
//! significant bit on the left. Reversing the zero-padded native bitstring
//! gives the display bitstring, and sorting native indices by the decimal
//! value of that string gives the canonical row order.
//!
//! ```rust
//! use qdice_view::basis::{canonical_order, display_value, to_display_bitstring};
//!
//! // Native index 6 on 3 qubits is "110"; the display string is "011".
//! assert_eq!(to_display_bitstring(6, 3), "011");
//! assert_eq!(display_value(6, 3), 3);
//! assert_eq!(canonical_order(3)[3], 6);
//! ```

/// Number of basis states for `num_qubits` qubits.
#[inline]
pub fn state_count(num_qubits: u32) -> usize {
    1usize << num_qubits
}

/// Display bitstring of a native basis index.
///
/// The native index is written as a `num_qubits`-wide binary string and
/// reversed, so native bit 0 becomes the leftmost character.
pub fn to_display_bitstring(index: usize, num_qubits: u32) -> String {
    debug_assert!(num_qubits >= 1, "num_qubits must be at least 1");
    let width = num_qubits as usize;
    format!("{index:0width$b}").chars().rev().collect()
}

/// Decimal value of the display bitstring of `index`.
///
/// Equivalent to parsing [`to_display_bitstring`] as binary, computed by
/// reversing the low `num_qubits` bits.
#[inline]
pub fn display_value(index: usize, num_qubits: u32) -> usize {
    debug_assert!(
        num_qubits >= 1 && num_qubits <= usize::BITS,
        "num_qubits out of range"
    );
    index.reverse_bits() >> (usize::BITS - num_qubits)
}

/// All native indices `0..2^num_qubits`, ordered by display value.
///
/// Adjacent entries need not be adjacent native indices.
pub fn canonical_order(num_qubits: u32) -> Vec<usize> {
    let mut order: Vec<usize> = (0..state_count(num_qubits)).collect();
    order.sort_by_key(|&index| display_value(index, num_qubits));
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_bitstring_reverses_native_bits() {
        assert_eq!(to_display_bitstring(6, 3), "011");
        assert_eq!(to_display_bitstring(1, 3), "100");
        assert_eq!(to_display_bitstring(0, 2), "00");
        assert_eq!(to_display_bitstring(1, 1), "1");
    }

    #[test]
    fn test_display_value_matches_bitstring() {
        for n in 1..=5 {
            for i in 0..state_count(n) {
                let parsed = usize::from_str_radix(&to_display_bitstring(i, n), 2).unwrap();
                assert_eq!(display_value(i, n), parsed, "index {i}, {n} qubits");
            }
        }
    }

    #[test]
    fn test_canonical_order_three_qubits() {
        // Native indices sorted by the reversed bit pattern.
        assert_eq!(canonical_order(3), vec![0, 4, 2, 6, 1, 5, 3, 7]);
    }

    #[test]
    fn test_native_six_lands_at_position_three() {
        let order = canonical_order(3);
        assert_eq!(order.iter().position(|&i| i == 6), Some(3));
    }

    #[test]
    fn test_single_qubit_order_is_identity() {
        assert_eq!(canonical_order(1), vec![0, 1]);
    }
}
