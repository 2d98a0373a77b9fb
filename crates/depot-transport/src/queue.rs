//! Per-room transport job queue.
//!
//! Controllers publish jobs with [`TransportQueue::add`] and gate
//! republication with [`TransportQueue::has_pending`]. Only the carrier
//! executing a job removes it. A job is not a lock: several carriers may
//! work the same job at once.

use crate::job::{Job, JobId, JobKind};
use depot_core::id::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// A job plus its queue bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedJob {
    pub id: JobId,
    pub job: Job,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportQueue {
    next_id: u64,
    /// Pending jobs in publication order.
    jobs: Vec<QueuedJob>,
    /// Which job each carrier is working.
    assignments: BTreeMap<AgentId, JobId>,
}

impl TransportQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Publication
    // -----------------------------------------------------------------------

    /// Publish a job. If an equivalent job is pending, a singleton is left
    /// untouched and a list job has its payload replaced. Either way the
    /// existing id is returned.
    pub fn add(&mut self, job: Job) -> JobId {
        let key = job.key();
        if let Some(existing) = self.jobs.iter_mut().find(|q| q.job.key() == key) {
            if key.kind.is_list() && existing.job != job {
                debug!(job = %existing.id, kind = %key.kind, "job payload replaced");
                existing.job = job;
            }
            return existing.id;
        }

        let id = JobId(self.next_id);
        self.next_id += 1;
        debug!(job = %id, kind = %key.kind, "job published");
        self.jobs.push(QueuedJob { id, job });
        id
    }

    /// Remove a job and release every carrier working it.
    pub fn remove(&mut self, id: JobId) -> Option<Job> {
        let index = self.jobs.iter().position(|q| q.id == id)?;
        let removed = self.jobs.remove(index);
        self.assignments.retain(|_, job| *job != id);
        debug!(job = %id, kind = %removed.job.kind(), "job removed");
        Some(removed.job)
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    pub fn has_pending(&self, kind: JobKind) -> bool {
        self.jobs.iter().any(|q| q.job.kind() == kind)
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|q| q.id == id).map(|q| &q.job)
    }

    /// The pending job of `kind`, if any.
    pub fn find(&self, kind: JobKind) -> Option<(JobId, &Job)> {
        self.jobs
            .iter()
            .find(|q| q.job.kind() == kind)
            .map(|q| (q.id, &q.job))
    }

    pub fn jobs(&self) -> impl Iterator<Item = &QueuedJob> {
        self.jobs.iter()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    // -----------------------------------------------------------------------
    // Assignment
    // -----------------------------------------------------------------------

    /// The job `agent` should work this tick. A carrier keeps its job until
    /// the job is removed; otherwise it takes the highest-priority job,
    /// preferring the one with the fewest carriers, then the oldest.
    pub fn assign(&mut self, agent: AgentId) -> Option<JobId> {
        if let Some(&current) = self.assignments.get(&agent) {
            if self.get(current).is_some() {
                return Some(current);
            }
        }

        let best = self
            .jobs
            .iter()
            .min_by_key(|q| {
                (
                    std::cmp::Reverse(q.job.kind().priority()),
                    self.assigned_count(q.id),
                    q.id,
                )
            })
            .map(|q| q.id);

        match best {
            Some(id) => {
                self.assignments.insert(agent, id);
            }
            None => {
                self.assignments.remove(&agent);
            }
        }
        best
    }

    pub fn assigned(&self, agent: AgentId) -> Option<JobId> {
        self.assignments.get(&agent).copied()
    }

    pub fn assigned_count(&self, id: JobId) -> usize {
        self.assignments.values().filter(|job| **job == id).count()
    }

    /// Forget a carrier's assignment (it retired or vanished).
    pub fn release(&mut self, agent: AgentId) {
        self.assignments.remove(&agent);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
