use crate::prescription::expand_reminders::{ExpandRemindersUseCase, ExpansionReport};
use crate::reminder::{
    delete_old_reminders::{CleanupReport, DeleteOldRemindersUseCase},
    process_due_reminders::{DispatchReport, ProcessDueRemindersUseCase},
};
use crate::shared::usecase::execute;
use dosewatch_api_structs::dtos::{SchedulerState, SchedulerStatusDTO};
use dosewatch_infra::DosewatchContext;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

pub fn get_start_delay(now_ts: usize, secs_before_min: usize) -> usize {
    let secs_to_next_minute = 60 - (now_ts / 1000) % 60;
    if secs_to_next_minute > secs_before_min {
        secs_to_next_minute - secs_before_min
    } else {
        secs_to_next_minute + (60 - secs_before_min)
    }
}

#[derive(Debug, Default)]
struct SchedulerStats {
    last_run_at: Option<i64>,
    last_batch_size: Option<usize>,
    last_cleanup_at: Option<i64>,
    last_cleanup_deleted: Option<i64>,
    last_expansion_at: Option<i64>,
    last_expansion_created: Option<usize>,
}

struct SchedulerInner {
    ctx: DosewatchContext,
    /// Held for the whole duration of a processing pass
    pass_lock: tokio::sync::Mutex<()>,
    pass_running: AtomicBool,
    started: AtomicBool,
    stats: Mutex<SchedulerStats>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    shutdown: Mutex<Option<watch::Sender<bool>>>,
}

/// Drives the periodic jobs of the reminder engine:
/// - the processing tick, dispatching due reminders
/// - the retention cleanup
/// - the expansion of active medication plans
///
/// At most one processing pass runs at a time. A tick that fires while a
/// pass is still running is skipped.
#[derive(Clone)]
pub struct ReminderScheduler {
    inner: Arc<SchedulerInner>,
}

impl ReminderScheduler {
    pub fn new(ctx: DosewatchContext) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                ctx,
                pass_lock: tokio::sync::Mutex::new(()),
                pass_running: AtomicBool::new(false),
                started: AtomicBool::new(false),
                stats: Mutex::new(SchedulerStats::default()),
                handles: Mutex::new(Vec::new()),
                shutdown: Mutex::new(None),
            }),
        }
    }

    /// Spawns the timers on the current actix runtime. Calling it on a
    /// started scheduler does nothing.
    pub fn start(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return;
        }

        let config = &self.inner.ctx.config;
        let tick = Duration::from_secs(config.reminder_tick_secs.max(1));
        // Whole minute ticks are aligned to the start of a minute
        let tick_delay = if config.reminder_tick_secs % 60 == 0 {
            let now = self.inner.ctx.sys.get_timestamp_millis().max(0) as usize;
            Duration::from_secs(get_start_delay(now, 0) as u64)
        } else {
            tick
        };
        let cleanup_interval = Duration::from_secs(config.cleanup_interval_secs.max(1));
        let expansion_interval = Duration::from_secs(config.expansion_interval_secs.max(1));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handles = vec![
            self.spawn_job(tick, tick_delay, shutdown_rx.clone(), |scheduler| async move {
                // A pass may outlive the tick, the next tick is skipped then
                actix_web::rt::spawn(async move {
                    scheduler.run_pass().await;
                });
            }),
            self.spawn_job(
                cleanup_interval,
                Duration::ZERO,
                shutdown_rx.clone(),
                |scheduler| async move {
                    scheduler.run_cleanup().await;
                },
            ),
            self.spawn_job(
                expansion_interval,
                Duration::ZERO,
                shutdown_rx,
                |scheduler| async move {
                    scheduler.run_expansion().await;
                },
            ),
        ];

        if let Ok(mut shutdown) = self.inner.shutdown.lock() {
            *shutdown = Some(shutdown_tx);
        }
        if let Ok(mut current) = self.inner.handles.lock() {
            current.extend(handles);
        }
        info!(
            "Reminder scheduler started with a tick every {} seconds",
            tick.as_secs()
        );
    }

    /// Cancels the future ticks and waits for the in-flight pass to finish
    pub async fn stop(&self) {
        if !self.inner.started.swap(false, Ordering::SeqCst) {
            return;
        }

        let shutdown = self
            .inner
            .shutdown
            .lock()
            .ok()
            .and_then(|mut shutdown| shutdown.take());
        if let Some(shutdown) = shutdown {
            let _ = shutdown.send(true);
        }

        let handles = self
            .inner
            .handles
            .lock()
            .map(|mut handles| std::mem::take(&mut *handles))
            .unwrap_or_default();
        for handle in handles {
            let _ = handle.await;
        }

        let _in_flight = self.inner.pass_lock.lock().await;
        info!("Reminder scheduler stopped");
    }

    pub fn status(&self) -> SchedulerStatusDTO {
        let state = if !self.inner.started.load(Ordering::SeqCst) {
            SchedulerState::Stopped
        } else if self.inner.pass_running.load(Ordering::SeqCst) {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        };

        let stats = match self.inner.stats.lock() {
            Ok(stats) => stats,
            Err(poisoned) => poisoned.into_inner(),
        };
        SchedulerStatusDTO {
            state,
            last_run_at: stats.last_run_at,
            last_batch_size: stats.last_batch_size,
            last_cleanup_at: stats.last_cleanup_at,
            last_cleanup_deleted: stats.last_cleanup_deleted,
            last_expansion_at: stats.last_expansion_at,
            last_expansion_created: stats.last_expansion_created,
        }
    }

    /// Runs one processing pass now. Returns `None` if another pass is
    /// still running or the due reminders could not be fetched.
    pub async fn run_pass(&self) -> Option<DispatchReport> {
        let _pass = match self.inner.pass_lock.try_lock() {
            Ok(pass) => pass,
            Err(_) => {
                warn!("The previous reminder processing pass is still running, skipping this tick");
                return None;
            }
        };

        self.inner.pass_running.store(true, Ordering::SeqCst);
        let started_at = self.inner.ctx.sys.get_timestamp_millis();
        let res = execute(ProcessDueRemindersUseCase {}, &self.inner.ctx).await;
        self.inner.pass_running.store(false, Ordering::SeqCst);

        let report = res.ok()?;
        self.update_stats(|stats| {
            stats.last_run_at = Some(started_at);
            stats.last_batch_size = Some(report.batch_size);
        });
        Some(report)
    }

    pub async fn run_cleanup(&self) -> Option<CleanupReport> {
        let started_at = self.inner.ctx.sys.get_timestamp_millis();
        let report = execute(DeleteOldRemindersUseCase {}, &self.inner.ctx)
            .await
            .ok()?;
        self.update_stats(|stats| {
            stats.last_cleanup_at = Some(started_at);
            stats.last_cleanup_deleted = Some(report.reminders_deleted);
        });
        Some(report)
    }

    pub async fn run_expansion(&self) -> Option<ExpansionReport> {
        let started_at = self.inner.ctx.sys.get_timestamp_millis();
        let report = execute(ExpandRemindersUseCase {}, &self.inner.ctx)
            .await
            .ok()?;
        self.update_stats(|stats| {
            stats.last_expansion_at = Some(started_at);
            stats.last_expansion_created = Some(report.created);
        });
        Some(report)
    }

    fn update_stats<F: FnOnce(&mut SchedulerStats)>(&self, update: F) {
        match self.inner.stats.lock() {
            Ok(mut stats) => update(&mut *stats),
            Err(poisoned) => update(&mut *poisoned.into_inner()),
        }
    }

    fn spawn_job<F, Fut>(
        &self,
        period: Duration,
        start_delay: Duration,
        mut shutdown: watch::Receiver<bool>,
        job: F,
    ) -> JoinHandle<()>
    where
        F: Fn(ReminderScheduler) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let scheduler = self.clone();
        actix_web::rt::spawn(async move {
            let mut ticks = interval_at(Instant::now() + start_delay, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticks.tick() => job(scheduler.clone()).await,
                    _ = shutdown.changed() => break,
                }
            }
        })
    }
}
