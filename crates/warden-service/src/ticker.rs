//! Evaluation ticker
//!
//! Drives [`ActivityCheckService::try_run_once`] on a fixed interval until
//! shutdown is signalled. The first tick fires immediately so checks left
//! over from a previous process are picked up at startup.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::services::{ActivityCheckService, ServiceContext};

/// Periodic evaluation driver
pub struct EvaluationTicker {
    ctx: Arc<ServiceContext>,
    period: Duration,
    shutdown: watch::Receiver<bool>,
}

impl EvaluationTicker {
    /// Create a ticker using the configured tick interval
    pub fn new(ctx: Arc<ServiceContext>, shutdown: watch::Receiver<bool>) -> Self {
        let period = ctx.activity().tick_interval();
        Self {
            ctx,
            period,
            shutdown,
        }
    }

    /// Override the tick interval
    #[must_use]
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Run until the shutdown channel flips to `true` or its sender is dropped
    pub async fn run(mut self) {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(period_secs = self.period.as_secs(), "Evaluation ticker started");

        loop {
            tokio::select! {
                _ = interval.tick() => self.tick().await,
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Evaluation ticker stopped");
    }

    async fn tick(&self) {
        let now = Utc::now().timestamp();
        match ActivityCheckService::new(&self.ctx).try_run_once(now).await {
            Ok(Some(_)) => {}
            Ok(None) => debug!("Evaluation already in progress; tick skipped"),
            Err(e) => error!(code = e.error_code(), error = %e, "Evaluation pass failed"),
        }
    }
}
