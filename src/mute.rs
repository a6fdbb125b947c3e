use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// A shared "mute all captions" flag.
///
/// Clones share one flag. Engines hold a handle and consult it whenever they render, so muting
/// blanks text without touching any timing state. [`MuteGate::global`] is the process-wide gate
/// engines use unless another one is injected.
#[derive(Debug, Clone, Default)]
pub struct MuteGate {
    muted: Arc<AtomicBool>,
}

impl MuteGate {
    /// A fresh gate, unmuted and shared with nobody.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide gate.
    pub fn global() -> Self {
        static GLOBAL: OnceLock<MuteGate> = OnceLock::new();
        GLOBAL.get_or_init(MuteGate::new).clone()
    }

    /// Set the flag.
    ///
    /// This does not re-render anything by itself; use [`crate::Captions::set_muted`] to also
    /// refresh an engine's sink immediately.
    pub fn set(&self, muted: bool) {
        self.muted.store(muted, Ordering::Relaxed);
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let gate = MuteGate::new();
        let other = gate.clone();
        assert!(!other.is_muted());

        gate.set(true);
        assert!(other.is_muted());
    }

    #[test]
    fn fresh_gates_are_independent() {
        let a = MuteGate::new();
        let b = MuteGate::new();
        a.set(true);
        assert!(!b.is_muted());
    }

    #[test]
    fn global_handles_share_one_flag() {
        let gate = MuteGate::global();
        let other = MuteGate::global();
        assert!(Arc::ptr_eq(&gate.muted, &other.muted));
    }
}
