//! When to re-publish accumulated data to consumers.
//!
//! Progress counters go out on every page, but the record list is only
//! re-published when a milestone percentage is first crossed, plus once at
//! completion. A page that crosses several milestones publishes once.

/// Milestone percentages, ascending and unique, each in 1..=100.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPolicy {
    milestones: Vec<u8>,
}

impl PublishPolicy {
    /// Out-of-range values are dropped; order and duplicates do not matter.
    pub fn new(percentages: impl IntoIterator<Item = u8>) -> Self {
        let mut milestones: Vec<u8> = percentages
            .into_iter()
            .filter(|p| (1..=100).contains(p))
            .collect();
        milestones.sort_unstable();
        milestones.dedup();
        Self { milestones }
    }

    pub fn quartiles() -> Self {
        Self::new([25, 50, 75, 100])
    }

    /// Publish only at completion.
    pub fn completion_only() -> Self {
        Self::new([])
    }

    pub fn milestones(&self) -> &[u8] {
        &self.milestones
    }

    pub(crate) fn tracker(&self) -> MilestoneTracker {
        MilestoneTracker {
            milestones: self.milestones.clone(),
            next: 0,
        }
    }
}

impl Default for PublishPolicy {
    fn default() -> Self {
        Self::quartiles()
    }
}

/// Per-session cursor over the policy's milestones.
#[derive(Debug, Clone)]
pub(crate) struct MilestoneTracker {
    milestones: Vec<u8>,
    next: usize,
}

impl MilestoneTracker {
    /// Highest milestone newly crossed by `loaded` of `total`, if any.
    /// Every crossed milestone is consumed, so none fires twice.
    pub(crate) fn observe(&mut self, loaded: u64, total: Option<u64>) -> Option<u8> {
        let total = total.filter(|t| *t > 0)?;
        let mut crossed = None;
        while let Some(&m) = self.milestones.get(self.next) {
            if u128::from(loaded) * 100 < u128::from(total) * u128::from(m) {
                break;
            }
            crossed = Some(m);
            self.next += 1;
        }
        crossed
    }
}
