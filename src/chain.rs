/// Ordered composite of controllers combined by logical OR.
///
/// Members are queried front to back and evaluation stops at the first
/// `true`, so later members (and any reconciliation they would do) are
/// skipped once an earlier one answers.
use crate::controller::Controller;

#[derive(Default)]
pub struct ChainController {
    members: Vec<Box<dyn Controller>>,
}

impl ChainController {
    /// Create a chain from members in evaluation order. An empty chain
    /// answers `false` to everything.
    pub fn new(members: Vec<Box<dyn Controller>>) -> Self {
        Self { members }
    }

    /// Append a member after the existing ones.
    pub fn push(&mut self, controller: impl Controller + 'static) {
        self.members.push(Box::new(controller));
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Controller for ChainController {
    fn should_stop(&self) -> bool {
        self.members.iter().any(|c| c.should_stop())
    }

    fn should_pause(&self) -> bool {
        self.members.iter().any(|c| c.should_pause())
    }
}
