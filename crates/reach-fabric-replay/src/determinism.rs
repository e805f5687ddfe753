//! Repeated-trial determinism check.

use std::fmt::Display;

use reach_fabric_core::Sha256Hash;

use crate::error::{ReplayError, Result};

/// Run `trial` `trials` times and require every hash to match the first.
///
/// Returns the agreed hash. Stops at the first failing or drifting trial.
pub fn verify_determinism<F, E>(trials: usize, mut trial: F) -> Result<Sha256Hash>
where
    F: FnMut(usize) -> std::result::Result<Sha256Hash, E>,
    E: Display,
{
    if trials < 2 {
        return Err(ReplayError::TooFewTrials(trials));
    }

    let mut first: Option<Sha256Hash> = None;
    for i in 0..trials {
        let hash = trial(i).map_err(|e| ReplayError::TrialFailed {
            trial: i,
            message: e.to_string(),
        })?;
        tracing::trace!(trial = i, hash = %hash, "determinism trial");

        match first {
            None => first = Some(hash),
            Some(expected) if expected != hash => {
                tracing::warn!(trial = i, expected = %expected, actual = %hash, "nondeterminism detected");
                return Err(ReplayError::Nondeterministic {
                    trial: i,
                    expected: expected.to_hex(),
                    actual: hash.to_hex(),
                });
            }
            Some(_) => {}
        }
    }
    first.ok_or(ReplayError::TooFewTrials(trials))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reach_fabric_core::hash_string;

    #[test]
    fn test_stable_trials_pass() {
        let hash = verify_determinism(5, |_| Ok::<_, String>(hash_string("same"))).unwrap();
        assert_eq!(hash, hash_string("same"));
    }

    #[test]
    fn test_requires_two_trials() {
        let r = verify_determinism(1, |_| Ok::<_, String>(hash_string("x")));
        assert!(matches!(r, Err(ReplayError::TooFewTrials(1))));
    }

    #[test]
    fn test_drift_detected() {
        let r = verify_determinism(4, |i| Ok::<_, String>(hash_string(if i == 2 { "b" } else { "a" })));
        assert!(matches!(r, Err(ReplayError::Nondeterministic { trial: 2, .. })));
    }

    #[test]
    fn test_trial_error_propagates() {
        let r = verify_determinism(3, |i| {
            if i == 1 {
                Err("boom")
            } else {
                Ok(hash_string("a"))
            }
        });
        match r {
            Err(ReplayError::TrialFailed { trial, message }) => {
                assert_eq!(trial, 1);
                assert_eq!(message, "boom");
            }
            other => panic!("expected trial failure, got {other:?}"),
        }
    }
}
