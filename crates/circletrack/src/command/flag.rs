use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The process-wide "armed" flag.
///
/// One writer (the command poller) and one reader (the frame loop); clones
/// share the same cell.
#[derive(Clone, Debug, Default)]
pub struct EnabledFlag(Arc<AtomicBool>);

impl EnabledFlag {
    pub fn new(armed: bool) -> Self {
        Self(Arc::new(AtomicBool::new(armed)))
    }

    #[inline]
    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Store a new value, returning the previous one.
    #[inline]
    pub fn set(&self, armed: bool) -> bool {
        self.0.swap(armed, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let flag = EnabledFlag::default();
        let reader = flag.clone();
        assert!(!reader.get());
        assert!(!flag.set(true));
        assert!(reader.get());
    }

    #[test]
    fn visible_across_threads() {
        let flag = EnabledFlag::new(false);
        let writer = flag.clone();
        std::thread::spawn(move || {
            writer.set(true);
        })
        .join()
        .expect("writer thread");
        assert!(flag.get());
    }
}
