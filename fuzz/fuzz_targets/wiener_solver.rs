#![no_main]

use arbitrary::Arbitrary;
use hush_ns::levinson::WienerSolver;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    signal_corr: Vec<f32>,
    noise_corr: Vec<f32>,
}

fuzz_target!(|input: FuzzInput| {
    let num_taps = input.signal_corr.len().min(input.noise_corr.len()).min(256);
    if num_taps == 0 {
        return;
    }

    let mut solver = WienerSolver::new(num_taps);
    let mut coeffs = vec![0.0f32; num_taps];
    // Arbitrary bit patterns, NaN and infinities included: the solver must
    // either succeed with finite coefficients or report an error.
    if solver
        .solve(
            &input.signal_corr[..num_taps],
            &input.noise_corr[..num_taps],
            &mut coeffs,
        )
        .is_ok()
    {
        assert!(coeffs.iter().all(|c| c.is_finite()));
    }
});
