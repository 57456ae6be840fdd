//! Amplitude/probability table for the current step.

use std::fmt;

use num_complex::Complex64;

use crate::basis::{canonical_order, display_value, to_display_bitstring};
use crate::trace::CircuitStep;

/// One row of the state table.
#[derive(Debug, Clone, PartialEq)]
pub struct StateRow {
    /// Index into the engine's amplitude array.
    pub native_index: usize,
    /// Big-endian display bitstring.
    pub bits: String,
    /// Decimal value of `bits`.
    pub value: usize,
    pub amplitude: Complex64,
    pub probability: f64,
}

impl fmt::Display for StateRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})  {:.3} + {:.3}i  {:.4}",
            self.bits, self.value, self.amplitude.re, self.amplitude.im, self.probability
        )
    }
}

/// Rows for `step` in canonical display order.
///
/// Rows whose native index is missing from the step's arrays are skipped;
/// a validated trace never has any.
pub fn state_rows(step: &CircuitStep, num_qubits: u32) -> Vec<StateRow> {
    if num_qubits == 0 {
        return Vec::new();
    }

    canonical_order(num_qubits)
        .into_iter()
        .filter_map(|native_index| {
            let amplitude = *step.amplitudes.get(native_index)?;
            let probability = *step.probabilities.get(native_index)?;
            Some(StateRow {
                native_index,
                bits: to_display_bitstring(native_index, num_qubits),
                value: display_value(native_index, num_qubits),
                amplitude,
                probability,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basis_step(num_qubits: u32, native_index: usize) -> CircuitStep {
        let states = 1usize << num_qubits;
        let mut step = CircuitStep::initial(num_qubits);
        step.gate_id = "x".into();
        step.amplitudes = vec![Complex64::new(0.0, 0.0); states];
        step.probabilities = vec![0.0; states];
        step.amplitudes[native_index] = Complex64::new(1.0, 0.0);
        step.probabilities[native_index] = 1.0;
        step
    }

    #[test]
    fn test_rows_are_in_display_order() {
        let rows = state_rows(&basis_step(3, 6), 3);
        let values: Vec<usize> = rows.iter().map(|r| r.value).collect();
        assert_eq!(values, (0..8).collect::<Vec<_>>());
        assert_eq!(rows[3].native_index, 6);
        assert_eq!(rows[3].bits, "011");
        assert_eq!(rows[3].probability, 1.0);
    }

    #[test]
    fn test_row_display_format() {
        let rows = state_rows(&basis_step(2, 1), 2);
        let row = rows.iter().find(|r| r.native_index == 1).unwrap();
        assert_eq!(row.to_string(), "10 (2)  1.000 + 0.000i  1.0000");
    }

    #[test]
    fn test_short_arrays_are_skipped() {
        let mut step = basis_step(2, 0);
        step.amplitudes.truncate(2);
        let rows = state_rows(&step, 2);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.native_index < 2));
    }
}
