//! Shared handle over the pool, content generator and clock.

use std::sync::Arc;

use sqlx::PgPool;

use crate::clock::Clock;
use crate::generator::ContentGenerator;
use crate::review::DayFinalizer;
use crate::roadmap::RoadmapManager;
use crate::schedule::DailyScheduler;
use crate::tasks::TaskBook;

/// Owns the collaborators and hands out per-request components.
///
/// Cheap to clone; every clone shares the same pool, generator and clock.
#[derive(Clone)]
pub struct Engine {
    pool: PgPool,
    generator: Arc<dyn ContentGenerator>,
    clock: Arc<dyn Clock>,
}

impl Engine {
    pub fn new(pool: PgPool, generator: Arc<dyn ContentGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            generator,
            clock,
        }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn roadmap(&self) -> RoadmapManager<'_> {
        RoadmapManager::new(&self.pool, self.generator.as_ref())
    }

    pub fn scheduler(&self) -> DailyScheduler<'_> {
        DailyScheduler::new(&self.pool, self.generator.as_ref(), self.clock.as_ref())
    }

    pub fn finalizer(&self) -> DayFinalizer<'_> {
        DayFinalizer::new(&self.pool, self.generator.as_ref(), self.clock.as_ref())
    }

    pub fn tasks(&self) -> TaskBook<'_> {
        TaskBook::new(&self.pool, self.clock.as_ref())
    }
}
