//! Simulated third-party approval for putting a product into a bin.

use log::debug;

use crate::prng::Pcg32;

/// Stream reserved for approval draws so they never perturb bin sampling.
const APPROVAL_STREAM: u64 = 0xA11;

/// A request to store a product on a shelf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinInsertion<'a> {
    pub product: &'a str,
    pub shelf: &'a str,
    /// The requested bin, or `None` when any free bin will do.
    pub bin: Option<(usize, usize)>,
}

/// Decides whether a bin insertion may go ahead.
pub trait ApprovalPolicy {
    fn approve(&mut self, request: &BinInsertion<'_>) -> bool;
}

impl<F> ApprovalPolicy for F
where
    F: FnMut(&BinInsertion<'_>) -> bool,
{
    fn approve(&mut self, request: &BinInsertion<'_>) -> bool {
        self(request)
    }
}

/// A fair coin per request.
#[derive(Debug, Clone)]
pub struct RandomApproval {
    rng: Pcg32,
}

impl RandomApproval {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::new(seed, APPROVAL_STREAM),
        }
    }
}

impl ApprovalPolicy for RandomApproval {
    fn approve(&mut self, request: &BinInsertion<'_>) -> bool {
        // Heads (0) approves.
        let approved = !self.rng.next_bool();
        debug!(
            "approval for {} on shelf {}: {}",
            request.product,
            request.shelf,
            if approved { "granted" } else { "rejected" }
        );
        approved
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysApprove;

impl ApprovalPolicy for AlwaysApprove {
    fn approve(&mut self, _request: &BinInsertion<'_>) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReject;

impl ApprovalPolicy for AlwaysReject {
    fn approve(&mut self, _request: &BinInsertion<'_>) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST: BinInsertion<'static> = BinInsertion {
        product: "P1",
        shelf: "S1",
        bin: None,
    };

    #[test]
    fn random_approval_is_deterministic() {
        let mut a = RandomApproval::new(11);
        let mut b = RandomApproval::new(11);
        for _ in 0..50 {
            assert_eq!(a.approve(&REQUEST), b.approve(&REQUEST));
        }
    }

    #[test]
    fn random_approval_gives_both_answers() {
        let mut policy = RandomApproval::new(3);
        let approved = (0..200).filter(|_| policy.approve(&REQUEST)).count();
        assert!(approved > 60 && approved < 140, "approved {approved} of 200");
    }

    #[test]
    fn closures_are_policies() {
        let mut seen = Vec::new();
        let mut policy = |req: &BinInsertion<'_>| {
            seen.push(req.bin);
            req.bin.is_some()
        };
        assert!(!policy.approve(&REQUEST));
        assert!(policy.approve(&BinInsertion {
            bin: Some((1, 0)),
            ..REQUEST
        }));
        assert_eq!(seen, vec![None, Some((1, 0))]);
    }

    #[test]
    fn fixed_policies() {
        assert!(AlwaysApprove.approve(&REQUEST));
        assert!(!AlwaysReject.approve(&REQUEST));
    }
}
