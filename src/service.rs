//! Ties the scheduler to a store and a clock: load, schedule, save.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::{
    clock::{Clock, SystemClock},
    error::Result,
    fsrs::Grade,
    id::CardId,
    scheduler::{ScheduledReview, Scheduler},
    store::CardStore,
};

pub struct ReviewService<S, C = SystemClock> {
    scheduler: Scheduler,
    store: S,
    clock: C,
}

impl<S: CardStore> ReviewService<S> {
    pub fn new(scheduler: Scheduler, store: S) -> Self {
        Self::with_clock(scheduler, store, SystemClock)
    }
}

impl<S: CardStore, C: Clock> ReviewService<S, C> {
    pub fn with_clock(scheduler: Scheduler, store: S, clock: C) -> Self {
        Self {
            scheduler,
            store,
            clock,
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Reviews `card` with a raw 1-4 grade. The grade is checked before the
    /// store is touched, and nothing is written unless scheduling succeeds.
    pub fn review(
        &mut self,
        card: CardId,
        grade: u8,
        reviewed_at: Option<DateTime<Utc>>,
    ) -> Result<ScheduledReview> {
        let grade = Grade::try_from(grade).inspect_err(|err| warn!(%card, %err, "rejected grade"))?;
        self.review_grade(card, grade, reviewed_at)
    }

    pub fn review_grade(
        &mut self,
        card: CardId,
        grade: Grade,
        reviewed_at: Option<DateTime<Utc>>,
    ) -> Result<ScheduledReview> {
        let reviewed_at = reviewed_at.unwrap_or_else(|| self.clock.now());
        let current = self.store.load_memory_state(card)?;
        let outcome = self
            .scheduler
            .review(current.as_ref(), grade, reviewed_at)?;
        self.store
            .save_memory_state_and_log(card, &outcome.card, &outcome.log)?;
        Ok(outcome)
    }

    /// What each grade would do to `card` right now.
    pub fn preview(&self, card: CardId) -> Result<[ScheduledReview; 4]> {
        let current = self.store.load_memory_state(card)?;
        Ok(self.scheduler.preview(current.as_ref(), self.clock.now())?)
    }
}
