//! Polling loop + subscriber broadcast.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, mpsc};
use std::thread;
use std::time::Duration;

use tourledger_core::Versioned;
use tourledger_finance::FinanceSnapshot;

use crate::jitter::Jitter;

/// Default polling interval for production wiring.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(15);

/// Handle returned by [`RealtimeSimulator::on_snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&FinanceSnapshot) -> anyhow::Result<()> + Send + Sync>;

/// Simulated realtime channel over one owned snapshot.
///
/// Each tick produces a successor snapshot: a cheap clone with only
/// `kpis.net` replaced and the generation bumped. The `Arc`'d collections
/// (`shows`/`expenses`/`forecasts`) stay shared with the predecessor, so
/// subscribers can skip re-rendering unchanged sub-objects via pointer
/// equality.
///
/// State is owned by this instance — independent simulators (e.g. in tests)
/// never interfere.
pub struct RealtimeSimulator {
    shared: Arc<Shared>,
    worker: Mutex<Option<Worker>>,
}

struct Shared {
    current: Mutex<Versioned<FinanceSnapshot>>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_subscription: AtomicU64,
    jitter: Mutex<Box<dyn Jitter>>,
}

struct Worker {
    shutdown: mpsc::Sender<()>,
    handle: thread::JoinHandle<()>,
}

/// Recover the guard even if a listener panicked while holding the lock;
/// the data itself is always a valid snapshot.
fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl RealtimeSimulator {
    pub fn new(initial: Versioned<FinanceSnapshot>, jitter: Box<dyn Jitter>) -> Self {
        Self {
            shared: Arc::new(Shared {
                current: Mutex::new(initial),
                listeners: Mutex::new(Vec::new()),
                next_subscription: AtomicU64::new(0),
                jitter: Mutex::new(jitter),
            }),
            worker: Mutex::new(None),
        }
    }

    /// The latest snapshot (initial or last tick's successor).
    pub fn current(&self) -> Versioned<FinanceSnapshot> {
        lock(&self.shared.current).clone()
    }

    /// Replace the owned snapshot (e.g. after a facade refresh).
    pub fn set_current(&self, snapshot: Versioned<FinanceSnapshot>) {
        *lock(&self.shared.current) = snapshot;
    }

    /// Register a listener; invoked in registration order on every tick.
    pub fn on_snapshot<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&FinanceSnapshot) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.shared.next_subscription.fetch_add(1, Ordering::Relaxed));
        lock(&self.shared.listeners).push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Unknown ids are a no-op. Safe to call from inside
    /// a listener; removal mid-tick takes effect from the next tick.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        lock(&self.shared.listeners).retain(|(sid, _)| *sid != id);
    }

    /// Start the polling loop. Idempotent: calling while running is a no-op
    /// (single active timer).
    pub fn start(&self, interval: Duration) {
        let mut worker = lock(&self.worker);
        if worker.is_some() {
            tracing::debug!("realtime simulator already running");
            return;
        }

        let (shutdown, ticks) = mpsc::channel::<()>();
        let shared = Arc::clone(&self.shared);

        let handle = thread::spawn(move || {
            tracing::info!(interval_ms = interval.as_millis() as u64, "realtime simulator started");
            loop {
                match ticks.recv_timeout(interval) {
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        shared.tick();
                    }
                    // Shutdown signal or simulator dropped.
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }
            tracing::info!("realtime simulator stopped");
        });

        *worker = Some(Worker { shutdown, handle });
    }

    /// Stop the polling loop. Safe to call when not running; synchronous
    /// (ticks never suspend, so the worker joins promptly).
    pub fn stop(&self) {
        let worker = lock(&self.worker).take();
        if let Some(worker) = worker {
            let _ = worker.shutdown.send(());
            let _ = worker.handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.worker).is_some()
    }

    /// Run exactly one tick synchronously and return the successor snapshot.
    ///
    /// This is the deterministic entry point tests use together with a
    /// seeded [`Jitter`].
    pub fn tick_once(&self) -> Versioned<FinanceSnapshot> {
        self.shared.tick()
    }
}

impl Drop for RealtimeSimulator {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Shared {
    fn tick(&self) -> Versioned<FinanceSnapshot> {
        let next = {
            let mut current = lock(&self.current);
            let delta = lock(&self.jitter).delta();
            let net = (current.value.kpis.net * (1.0 + delta)).round();
            let next = current.next(current.value.with_net(net));
            *current = next.clone();
            next
        };

        tracing::debug!(
            generation = next.generation,
            net = next.value.kpis.net,
            "realtime tick"
        );

        // Broadcast outside both locks: a listener may call back into the
        // simulator (unsubscribe itself, register another listener), so the
        // registry lock must be released before any callback runs. One
        // failing listener must not stop delivery to the rest.
        let listeners: Vec<(SubscriptionId, Listener)> = lock(&self.listeners)
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect();
        for (id, listener) in listeners {
            if let Err(error) = listener(&next.value) {
                tracing::warn!(subscription = id.0, %error, "snapshot listener failed");
            }
        }

        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jitter::SeededJitter;
    use chrono::NaiveDate;
    use tourledger_finance::{EventRecord, EventStatus, InMemoryLedger, SnapshotBuilder};

    fn initial() -> Versioned<FinanceSnapshot> {
        let date = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let ledger = Arc::new(InMemoryLedger::new().with_event(
            EventRecord::new("s1", date, 4500.0, EventStatus::Confirmed),
            vec![],
        ));
        let snapshot = SnapshotBuilder::new(ledger.clone(), ledger).build(date);
        Versioned::new(0, snapshot)
    }

    fn seeded(seed: u64) -> RealtimeSimulator {
        RealtimeSimulator::new(initial(), Box::new(SeededJitter::new(seed)))
    }

    #[test]
    fn tick_replaces_only_net_and_bumps_generation() {
        let sim = seeded(42);
        let before = sim.current();
        let after = sim.tick_once();

        assert_eq!(after.generation, before.generation + 1);
        assert!(Arc::ptr_eq(&before.value.shows, &after.value.shows));
        assert!(Arc::ptr_eq(&before.value.forecasts, &after.value.forecasts));
        assert!(Arc::ptr_eq(&before.value.expenses, &after.value.expenses));
        assert_eq!(after.value.kpis.income, before.value.kpis.income);
        assert_eq!(after.value.kpis.net, after.value.kpis.net.round());
        // Successor becomes current.
        assert_eq!(sim.current(), after);
    }

    #[test]
    fn same_seed_yields_identical_tick_sequences() {
        let a = seeded(7);
        let b = seeded(7);
        for _ in 0..5 {
            assert_eq!(a.tick_once().value.kpis.net, b.tick_once().value.kpis.net);
        }
    }

    #[test]
    fn net_moves_at_most_one_percent_per_tick() {
        let sim = seeded(3);
        let mut last = sim.current().value.kpis.net;
        for _ in 0..50 {
            let next = sim.tick_once().value.kpis.net;
            assert!((next - last).abs() <= last.abs() * 0.01 + 0.5); // + rounding
            last = next;
        }
    }

    #[test]
    fn failing_listener_does_not_block_later_listeners() {
        let sim = seeded(1);
        let delivered = Arc::new(Mutex::new(Vec::new()));

        sim.on_snapshot(|_| anyhow::bail!("listener exploded"));
        let sink = Arc::clone(&delivered);
        sim.on_snapshot(move |s| {
            sink.lock().unwrap().push(s.kpis.net);
            Ok(())
        });

        sim.tick_once();
        sim.tick_once();
        assert_eq!(delivered.lock().unwrap().len(), 2);
    }

    #[test]
    fn listener_may_unsubscribe_itself_mid_tick() {
        let sim = Arc::new(seeded(1));
        let own_id = Arc::new(Mutex::new(None));
        let count = Arc::new(Mutex::new(0usize));

        let (s, slot, sink) = (Arc::clone(&sim), Arc::clone(&own_id), Arc::clone(&count));
        let id = sim.on_snapshot(move |_| {
            *sink.lock().unwrap() += 1;
            if let Some(id) = *slot.lock().unwrap() {
                s.unsubscribe(id);
            }
            Ok(())
        });
        *own_id.lock().unwrap() = Some(id);

        // Must complete (no registry lock held during the callback) and the
        // second tick must not deliver to the removed listener.
        sim.tick_once();
        sim.tick_once();
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn listener_may_register_another_listener_mid_tick() {
        let sim = Arc::new(seeded(1));
        let late_count = Arc::new(Mutex::new(0usize));

        let (s, sink) = (Arc::clone(&sim), Arc::clone(&late_count));
        let id = sim.on_snapshot(move |_| {
            let inner = Arc::clone(&sink);
            s.on_snapshot(move |_| {
                *inner.lock().unwrap() += 1;
                Ok(())
            });
            Ok(())
        });

        sim.tick_once();
        // Registration mid-tick takes effect from the next tick.
        assert_eq!(*late_count.lock().unwrap(), 0);
        sim.unsubscribe(id);
        sim.tick_once();
        assert_eq!(*late_count.lock().unwrap(), 1);
    }

    #[test]
    fn listeners_are_invoked_in_registration_order() {
        let sim = seeded(1);
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let sink = Arc::clone(&order);
            sim.on_snapshot(move |_| {
                sink.lock().unwrap().push(tag);
                Ok(())
            });
        }

        sim.tick_once();
        assert_eq!(*order.lock().unwrap(), ["first", "second", "third"]);
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let sim = seeded(1);
        let count = Arc::new(Mutex::new(0usize));

        let sink = Arc::clone(&count);
        let id = sim.on_snapshot(move |_| {
            *sink.lock().unwrap() += 1;
            Ok(())
        });

        sim.tick_once();
        sim.unsubscribe(id);
        sim.tick_once();
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn start_is_idempotent_and_stop_is_safe_when_idle() {
        let sim = seeded(9);
        sim.stop(); // not running: no-op

        sim.start(Duration::from_secs(60));
        assert!(sim.is_running());
        sim.start(Duration::from_secs(60)); // second start: no-op
        assert!(sim.is_running());

        sim.stop();
        assert!(!sim.is_running());
        sim.stop(); // already stopped: no-op
    }

    #[test]
    fn double_start_delivers_a_single_broadcast_stream() {
        let sim = seeded(5);
        let count = Arc::new(Mutex::new(0usize));

        let sink = Arc::clone(&count);
        sim.on_snapshot(move |_| {
            *sink.lock().unwrap() += 1;
            Ok(())
        });

        sim.start(Duration::from_millis(20));
        sim.start(Duration::from_millis(20));
        thread::sleep(Duration::from_millis(110));
        sim.stop();

        // One timer: ~5 ticks. A duplicated timer would roughly double this.
        let delivered = *count.lock().unwrap();
        assert!(
            (2..=8).contains(&delivered),
            "expected a single tick stream, got {delivered} broadcasts"
        );
    }
}
