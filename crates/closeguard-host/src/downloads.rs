use crate::journal::{Event, Journal};
use closeguard_core::Profile;
use closeguard_core::services::DownloadService;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// In-progress download counts per profile name
#[derive(Debug)]
pub struct DownloadTracker {
    counts: RefCell<BTreeMap<String, usize>>,
    journal: Rc<Journal>,
}

impl DownloadTracker {
    pub fn new(journal: Rc<Journal>) -> Self {
        Self {
            counts: RefCell::new(BTreeMap::new()),
            journal,
        }
    }

    pub fn start(&self, profile: &str) {
        *self
            .counts
            .borrow_mut()
            .entry(profile.to_string())
            .or_default() += 1;
    }

    /// Mark one download of `profile` as done. Returns `false` if it had none.
    pub fn finish(&self, profile: &str) -> bool {
        let mut counts = self.counts.borrow_mut();
        match counts.get_mut(profile) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn count(&self, profile: &str) -> usize {
        self.counts.borrow().get(profile).copied().unwrap_or(0)
    }
}

impl DownloadService for DownloadTracker {
    fn total_in_progress(&self) -> usize {
        self.counts.borrow().values().sum()
    }

    fn in_progress_for_profile(&self, profile: &Profile) -> usize {
        self.count(profile.name())
    }

    fn cancel_all(&self) {
        let count = self.total_in_progress();
        self.counts.borrow_mut().clear();
        if count > 0 {
            self.journal.record(Event::DownloadsCancelled { count });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_per_profile() {
        let tracker = DownloadTracker::new(Rc::new(Journal::new()));
        tracker.start("default");
        tracker.start("default");
        tracker.start("private");

        assert_eq!(tracker.total_in_progress(), 3);
        assert_eq!(tracker.in_progress_for_profile(&Profile::incognito("private")), 1);

        assert!(tracker.finish("private"));
        assert!(!tracker.finish("private"));
        assert!(!tracker.finish("missing"));
        assert_eq!(tracker.total_in_progress(), 2);
    }

    #[test]
    fn test_cancel_all_records_count() {
        let journal = Rc::new(Journal::new());
        let tracker = DownloadTracker::new(journal.clone());
        tracker.start("default");
        tracker.start("work");

        tracker.cancel_all();

        assert_eq!(tracker.total_in_progress(), 0);
        assert_eq!(journal.events(), vec![Event::DownloadsCancelled { count: 2 }]);

        // Nothing left to cancel, nothing recorded
        tracker.cancel_all();
        assert_eq!(journal.events().len(), 1);
    }
}
