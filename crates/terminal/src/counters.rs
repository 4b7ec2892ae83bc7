//! Client-local daily sales counters.
//!
//! A best-effort tally of today's completed sales, keyed by calendar date.
//! Counters dated any other day are reset to zero on load, before recording
//! a sale, and by a periodic rollover check. Storage failures are logged and
//! treated as "no data".

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use tillpoint_core::Money;

use crate::storage::{DAILY_COUNTERS_KEY, SharedStore, load_json, save_json};

/// Errors from recording a sale.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CountersError {
    /// Sale amounts cannot be negative.
    #[error("sale amount cannot be negative: {0}")]
    NegativeAmount(Money),
}

/// Today's running totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCounters {
    pub date: NaiveDate,
    pub sale_count: u64,
    pub total_revenue: Money,
}

impl DailyCounters {
    /// Zeroed counters for `date`.
    #[must_use]
    pub const fn zeroed(date: NaiveDate) -> Self {
        Self {
            date,
            sale_count: 0,
            total_revenue: Money::ZERO,
        }
    }
}

/// Today's date on the terminal's local clock.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Persistent holder of the [`DailyCounters`].
pub struct CountersStore {
    current: DailyCounters,
    store: SharedStore,
}

impl std::fmt::Debug for CountersStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountersStore")
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl CountersStore {
    /// Load the stored counters, resetting them if they are not dated today.
    #[must_use]
    pub fn load_or_reset_for_today(store: SharedStore) -> Self {
        Self::load_or_reset_for(store, today())
    }

    /// Load the stored counters, resetting them if they are not dated `date`.
    #[must_use]
    pub fn load_or_reset_for(store: SharedStore, date: NaiveDate) -> Self {
        let stored = match load_json::<DailyCounters>(store.as_ref(), DAILY_COUNTERS_KEY) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Stored daily counters are unreadable, starting from zero");
                None
            }
        };

        let mut counters = Self {
            current: stored.clone().unwrap_or_else(|| DailyCounters::zeroed(date)),
            store,
        };
        if stored.is_none_or(|c| c.date != date) {
            counters.reset_for(date);
        }
        counters
    }

    /// Current counters.
    #[must_use]
    pub const fn counters(&self) -> &DailyCounters {
        &self.current
    }

    /// Record one completed sale of `amount` today.
    ///
    /// # Errors
    ///
    /// Returns [`CountersError::NegativeAmount`] if `amount` is below zero.
    pub fn record_sale(&mut self, amount: Money) -> Result<&DailyCounters, CountersError> {
        self.record_sale_on(amount, today())
    }

    /// Record one completed sale of `amount` on `date`.
    ///
    /// Counters still dated an earlier day are reset first.
    ///
    /// # Errors
    ///
    /// Returns [`CountersError::NegativeAmount`] if `amount` is below zero.
    pub fn record_sale_on(
        &mut self,
        amount: Money,
        date: NaiveDate,
    ) -> Result<&DailyCounters, CountersError> {
        if amount.is_negative() {
            return Err(CountersError::NegativeAmount(amount));
        }
        self.check_rollover(date);

        self.current.sale_count += 1;
        self.current.total_revenue += amount;
        self.persist();
        debug!(
            sale_count = self.current.sale_count,
            total_revenue = %self.current.total_revenue,
            "Daily counters updated"
        );
        Ok(&self.current)
    }

    /// Zero the counters, dated today.
    pub fn reset(&mut self) {
        self.reset_for(today());
    }

    /// Zero the counters, dated `date`.
    pub fn reset_for(&mut self, date: NaiveDate) {
        self.current = DailyCounters::zeroed(date);
        self.persist();
    }

    /// Reset if the counters are not dated `date`. Returns whether they were.
    pub fn check_rollover(&mut self, date: NaiveDate) -> bool {
        if self.current.date == date {
            return false;
        }
        info!(
            previous = %self.current.date,
            today = %date,
            "Date changed, resetting daily counters"
        );
        self.reset_for(date);
        true
    }

    fn persist(&self) {
        if let Err(e) = save_json(self.store.as_ref(), DAILY_COUNTERS_KEY, &self.current) {
            warn!(error = %e, "Failed to persist daily counters");
        }
    }
}

/// Spawn a task that checks for a date change every `period`.
///
/// The task runs until aborted or until the runtime shuts down.
#[must_use]
pub fn spawn_rollover_watch(
    counters: Arc<Mutex<CountersStore>>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            counters
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .check_rollover(today());
        }
    })
}
