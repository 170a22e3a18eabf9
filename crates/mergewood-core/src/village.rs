//! Village repair progression: star-priced tasks grouped into areas.
//!
//! Areas unlock in registry order. Finishing every task of an area opens
//! the next one; the session pairs that with unlocking the next producer.
//! Tasks are identified by their index in the area's registry task list.

use crate::economy::Economy;
use crate::error::ActionError;
use crate::id::AreaId;
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Result of a successful task build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskBuilt {
    pub star_cost: u64,
    /// Whether this task finished its area.
    pub area_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Village {
    completed: BTreeMap<AreaId, BTreeSet<usize>>,
    unlocked: Vec<AreaId>,
}

impl Village {
    /// A fresh village with only the first area open.
    pub fn new(first_area: AreaId) -> Self {
        Self {
            completed: BTreeMap::new(),
            unlocked: vec![first_area],
        }
    }

    pub fn from_saved(
        completed: BTreeMap<AreaId, BTreeSet<usize>>,
        unlocked: Vec<AreaId>,
    ) -> Self {
        let unlocked = if unlocked.is_empty() {
            vec![AreaId(0)]
        } else {
            unlocked
        };
        Self { completed, unlocked }
    }

    pub fn is_unlocked(&self, area: AreaId) -> bool {
        self.unlocked.contains(&area)
    }

    pub fn unlocked_areas(&self) -> &[AreaId] {
        &self.unlocked
    }

    pub fn completed_tasks(&self) -> &BTreeMap<AreaId, BTreeSet<usize>> {
        &self.completed
    }

    pub fn is_task_completed(&self, area: AreaId, task: usize) -> bool {
        self.completed
            .get(&area)
            .is_some_and(|tasks| tasks.contains(&task))
    }

    /// `(done, total)` task counts for an area.
    pub fn progress(&self, area: AreaId, registry: &Registry) -> (usize, usize) {
        let total = registry.area(area).map(|a| a.tasks.len()).unwrap_or(0);
        let done = self.completed.get(&area).map(|t| t.len()).unwrap_or(0);
        (done, total)
    }

    pub fn is_area_complete(&self, area: AreaId, registry: &Registry) -> bool {
        let (done, total) = self.progress(area, registry);
        total > 0 && done >= total
    }

    /// Every area fully repaired?
    pub fn all_complete(&self, registry: &Registry) -> bool {
        (0..registry.area_count() as u32).all(|i| self.is_area_complete(AreaId(i), registry))
    }

    /// Spend stars to complete one task. Fails with no change when the area
    /// is locked, the task is unknown or already built, or stars run short.
    pub fn build_task(
        &mut self,
        area: AreaId,
        task: usize,
        registry: &Registry,
        economy: &mut Economy,
    ) -> Result<TaskBuilt, ActionError> {
        if !self.is_unlocked(area) {
            return Err(ActionError::InvalidTarget);
        }
        let def = registry
            .area(area)
            .and_then(|a| a.tasks.get(task))
            .ok_or(ActionError::InvalidTarget)?;
        if self.is_task_completed(area, task) {
            return Err(ActionError::InvalidTarget);
        }
        economy.spend_stars(def.star_cost)?;
        self.completed.entry(area).or_default().insert(task);
        Ok(TaskBuilt {
            star_cost: def.star_cost,
            area_completed: self.is_area_complete(area, registry),
        })
    }

    /// Open the area after `area`, if there is one and it is still closed.
    pub fn unlock_next_area(&mut self, area: AreaId, registry: &Registry) -> Option<AreaId> {
        let next = registry.next_area(area)?;
        if self.is_unlocked(next) {
            return None;
        }
        self.unlocked.push(next);
        Some(next)
    }
}
