/// Halt latch shared between the step loop and the HLT instruction
/// Owned by the caller and passed into each step, so every CPU instance has its own
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct RunControl {
    halted: bool,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch the halt; repeated calls are harmless
    pub fn signal_halt(&mut self) {
        self.halted = true;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Clear the latch for another run
    pub fn reset(&mut self) {
        self.halted = false;
    }
}

#[cfg(test)]
mod control_tests {
    use super::*;

    #[test]
    fn test_halt_latch() {
        let mut ctl = RunControl::new();
        assert!(!ctl.is_halted());
        ctl.signal_halt();
        ctl.signal_halt();
        assert!(ctl.is_halted());
        ctl.reset();
        assert!(!ctl.is_halted());
    }
}
