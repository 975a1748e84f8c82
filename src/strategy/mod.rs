// Signal generation: two independent detectors plus the gate that
// requires them to agree.
pub mod momentum;
pub mod oscillator;

pub use momentum::MomentumDetector;
pub use oscillator::OscillatorDetector;

use crate::models::Signal;

/// Conjunction gate: both detectors must agree on a direction for a
/// trade to be authorized. This is the only risk control in the
/// pipeline; there is no confidence weighting or partial agreement.
pub fn combine(momentum: Signal, oscillator: Signal) -> Signal {
    if momentum == oscillator && momentum != Signal::Wait {
        momentum
    } else {
        Signal::Wait
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_full_table() {
        use Signal::*;
        for a in [Long, Short, Wait] {
            for b in [Long, Short, Wait] {
                let combined = combine(a, b);
                if a == b && a != Wait {
                    assert_eq!(combined, a);
                } else {
                    assert_eq!(combined, Wait, "combine({a}, {b}) should gate to WAIT");
                }
            }
        }
    }

    #[test]
    fn test_disagreement_gates_to_wait() {
        assert_eq!(combine(Signal::Long, Signal::Short), Signal::Wait);
        assert_eq!(combine(Signal::Short, Signal::Long), Signal::Wait);
    }
}
