//! The polling loop supervisor
//!
//! Owns the single recurring poll loop. Starting is guarded so at most
//! one loop exists per process no matter how many trigger calls arrive,
//! and the next cycle is scheduled only after the current one completes,
//! so cycles can never overlap. Because the loop thread is the only
//! owner of the replied-sender set, the read-decide-write sequence needs
//! no further serialization.

use log::{debug, error, info};
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::ResponderSettings;
use crate::models::LabelId;
use crate::responder::{MailGateway, run_cycle};
use crate::storage::RepliedSet;

/// Supervisor for the poll loop
pub struct Supervisor {
    gateway: Arc<dyn MailGateway>,
    settings: ResponderSettings,
    label_id: LabelId,
    store_path: PathBuf,
    started: AtomicBool,
    shutdown: Mutex<bool>,
    wake: Condvar,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Supervisor {
    pub fn new(
        gateway: Arc<dyn MailGateway>,
        settings: ResponderSettings,
        label_id: LabelId,
        store_path: PathBuf,
    ) -> Self {
        Self {
            gateway,
            settings,
            label_id,
            store_path,
            started: AtomicBool::new(false),
            shutdown: Mutex::new(false),
            wake: Condvar::new(),
            handle: Mutex::new(None),
        }
    }

    /// Start the poll loop if it is not already running
    ///
    /// Returns true if a new loop was started, false if one already
    /// exists. The loop loads the replied-sender set, then runs cycles
    /// until [`stop`](Self::stop) or process exit.
    pub fn start(self: &Arc<Self>) -> bool {
        if self
            .started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("Poll loop already running; ignoring start request");
            return false;
        }

        // Jitter is drawn once per process lifetime, not per cycle
        let delay = self.cycle_delay();
        let supervisor = Arc::clone(self);
        let spawned = std::thread::Builder::new()
            .name("autoreply-poll".to_string())
            .spawn(move || supervisor.run_loop(delay));

        match spawned {
            Ok(handle) => {
                *self.handle.lock().unwrap() = Some(handle);
                true
            }
            Err(e) => {
                error!("Failed to spawn poll loop: {}", e);
                self.started.store(false, Ordering::SeqCst);
                false
            }
        }
    }

    /// Stop the poll loop and wait for the in-flight cycle to finish
    ///
    /// Wakes the loop out of its inter-cycle wait, so stopping does not
    /// block for the remainder of the delay.
    pub fn stop(&self) {
        *self.shutdown.lock().unwrap() = true;
        self.wake.notify_all();
        if let Some(handle) = self.handle.lock().unwrap().take() {
            handle.join().ok();
        }
    }

    /// Whether the poll loop has been started
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Delay between the end of one cycle and the start of the next
    fn cycle_delay(&self) -> Duration {
        let (min, max) = self.settings.jitter_range_seconds;
        Duration::from_millis(self.settings.poll_interval_ms)
            + Duration::from_secs(jitter_seconds(min, max))
    }

    fn run_loop(&self, delay: Duration) {
        let mut replied = RepliedSet::load(&self.store_path);
        info!(
            "Poll loop started; {} replied senders known, cycle delay {:?}",
            replied.len(),
            delay
        );

        loop {
            if *self.shutdown.lock().unwrap() {
                break;
            }

            match run_cycle(
                self.gateway.as_ref(),
                &mut replied,
                &self.settings,
                &self.label_id,
            ) {
                Ok(stats) => debug!("{:?}", stats),
                Err(e) => error!("Poll cycle failed: {:#}", e),
            }

            // Self-rescheduling: wait only after the cycle completed,
            // so cycles cannot overlap. stop() cuts the wait short.
            let stopped = self.shutdown.lock().unwrap();
            let (stopped, _) = self
                .wake
                .wait_timeout_while(stopped, delay, |stopped| !*stopped)
                .unwrap();
            if *stopped {
                break;
            }
        }

        info!("Poll loop stopped");
    }
}

/// Draw a jitter duration in whole seconds from [min, max] inclusive
fn jitter_seconds(min: u64, max: u64) -> u64 {
    if max <= min {
        return min;
    }
    let hasher = RandomState::new().build_hasher();
    min + hasher.finish() % (max - min + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_within_range() {
        for _ in 0..100 {
            let jitter = jitter_seconds(45, 120);
            assert!((45..=120).contains(&jitter));
        }
    }

    #[test]
    fn test_jitter_degenerate_range() {
        assert_eq!(jitter_seconds(30, 30), 30);
        assert_eq!(jitter_seconds(0, 0), 0);
    }
}
