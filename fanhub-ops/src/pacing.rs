use std::time::Duration;

/// A fixed sleep used to throttle database writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pause(pub Duration);

impl Pause {
    pub const NONE: Pause = Pause(Duration::ZERO);

    pub const fn millis(ms: u64) -> Self {
        Pause(Duration::from_millis(ms))
    }

    pub const fn secs(s: u64) -> Self {
        Pause(Duration::from_secs(s))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn wait(&self) {
        if !self.is_zero() {
            std::thread::sleep(self.0);
        }
    }
}
