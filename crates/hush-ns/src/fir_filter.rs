//! Block FIR filter with a delay line carried across blocks.

/// FIR filter applied block by block.
///
/// The filter keeps the last `num_taps - 1` input samples of every block and
/// uses them as history for the next one, so filtering consecutive blocks is
/// equivalent to filtering one continuous stream.
#[derive(derive_more::Debug, Clone)]
pub struct FirFilter {
    num_taps: usize,
    #[debug(skip)]
    delay_line: Vec<f32>,
}

impl FirFilter {
    /// Create a filter for `num_taps` coefficients with a silent history.
    ///
    /// # Panics
    ///
    /// Panics if `num_taps` is zero.
    pub fn new(num_taps: usize) -> Self {
        assert!(num_taps > 0, "num_taps must be > 0");
        Self {
            num_taps,
            delay_line: vec![0.0; num_taps - 1],
        }
    }

    /// Number of coefficients this filter expects.
    pub fn num_taps(&self) -> usize {
        self.num_taps
    }

    /// The trailing `num_taps - 1` samples of the previous input block.
    pub fn delay_line(&self) -> &[f32] {
        &self.delay_line
    }

    /// Clear the history.
    pub fn reset(&mut self) {
        self.delay_line.fill(0.0);
    }

    /// Filter `input` into `output`:
    ///
    /// ```text
    /// output[i] = sum_{j < num_taps} coeffs[j] * x[i - j]
    /// ```
    ///
    /// Samples before the start of `input` come from the delay line, which is
    /// then replaced by the tail of `input`.
    ///
    /// # Panics
    ///
    /// Panics if `coeffs.len() != num_taps`, if `output` and `input` differ in
    /// length, or if `input` is shorter than the delay line.
    pub fn apply(&mut self, coeffs: &[f32], input: &[f32], output: &mut [f32]) {
        assert_eq!(coeffs.len(), self.num_taps, "coeffs length");
        assert_eq!(input.len(), output.len(), "input/output length");
        let history = self.delay_line.len();
        assert!(
            input.len() >= history,
            "block of {} samples is shorter than the delay line ({history})",
            input.len()
        );

        // Head: the first `history` outputs reach back into the delay line.
        // delay_line[history - k] holds x[-k].
        for (i, out) in output[..history].iter_mut().enumerate() {
            let mut y = 0.0f32;
            for (j, &c) in coeffs.iter().enumerate() {
                let x = if j <= i {
                    input[i - j]
                } else {
                    self.delay_line[history + i - j]
                };
                y += c * x;
            }
            *out = y;
        }

        // Body: only the current block is needed.
        for (i, out) in output.iter_mut().enumerate().skip(history) {
            let mut y = 0.0f32;
            for (j, &c) in coeffs.iter().enumerate() {
                y += c * input[i - j];
            }
            *out = y;
        }

        self.delay_line.copy_from_slice(&input[input.len() - history..]);
    }
}
