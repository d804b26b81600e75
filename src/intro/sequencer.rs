//! Async driver for the intro [`Timeline`].
//!
//! One tokio task per run sleeps through each dwell, racing a
//! [`CancellationToken`]. Publishing a phase, completing, and cancelling all
//! go through the same mutex, so once [`IntroHandle::cancel`] returns the run
//! can no longer publish a phase or reach `on_complete`.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use super::phase::Phase;
use super::timeline::{Step, Timeline};
use crate::logging::{log, log_phase, obj, v_str, Domain, Level};

/// What the render layer observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "phase", rename_all = "snake_case")]
pub enum IntroStatus {
    Idle,
    Playing(Phase),
    Completed,
    Cancelled,
}

impl IntroStatus {
    pub fn phase(&self) -> Option<Phase> {
        match self {
            IntroStatus::Playing(p) => Some(*p),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroOutcome {
    Completed,
    Cancelled,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequencerError {
    #[error("intro timeline already running")]
    AlreadyRunning,
    #[error("no tokio runtime to drive the intro")]
    NoRuntime,
}

type PhaseListener = Box<dyn Fn(Phase) + Send + Sync>;

struct RunSlot {
    generation: u64,
    live: bool,
    listeners: Vec<PhaseListener>,
}

struct Shared {
    slot: Mutex<RunSlot>,
    status: watch::Sender<IntroStatus>,
}

impl Shared {
    fn slot(&self) -> MutexGuard<'_, RunSlot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn enter(&self, slot: &RunSlot, phase: Phase) {
        self.status.send_replace(IntroStatus::Playing(phase));
        for listener in &slot.listeners {
            listener(phase);
        }
        log_phase(phase, phase.dwell());
    }

    /// Publish `phase` for run `generation`; false if that run was stopped.
    fn publish(&self, generation: u64, phase: Phase) -> bool {
        let slot = self.slot();
        if !slot.live || slot.generation != generation {
            return false;
        }
        self.enter(&slot, phase);
        true
    }

    /// Close run `generation` with `end`; false if it was already closed.
    fn close(&self, generation: u64, end: IntroStatus) -> bool {
        let mut slot = self.slot();
        if !slot.live || slot.generation != generation {
            return false;
        }
        slot.live = false;
        self.status.send_replace(end);
        true
    }

    /// Close run `generation` as completed and call `done` before the run
    /// lock is released. A racing cancel either closes the run first or
    /// returns after `done` has run.
    fn finish<F: FnOnce()>(&self, generation: u64, done: F) -> bool {
        let mut slot = self.slot();
        if !slot.live || slot.generation != generation {
            return false;
        }
        slot.live = false;
        self.status.send_replace(IntroStatus::Completed);
        log(
            Level::Info,
            Domain::Intro,
            "completed",
            obj(&[("msg", v_str("intro finished"))]),
        );
        done();
        true
    }
}

/// Plays the intro timeline. At most one run is active per instance.
pub struct Sequencer {
    shared: Arc<Shared>,
}

impl Sequencer {
    pub fn new() -> Self {
        let (status, _) = watch::channel(IntroStatus::Idle);
        Self {
            shared: Arc::new(Shared {
                slot: Mutex::new(RunSlot {
                    generation: 0,
                    live: false,
                    listeners: Vec::new(),
                }),
                status,
            }),
        }
    }

    pub fn status(&self) -> IntroStatus {
        *self.shared.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<IntroStatus> {
        self.shared.status.subscribe()
    }

    /// Register a phase-changed callback. Listeners run while the run lock is
    /// held and must not call back into the sequencer or its handle.
    pub fn on_phase<F>(&self, listener: F)
    where
        F: Fn(Phase) + Send + Sync + 'static,
    {
        self.shared.slot().listeners.push(Box::new(listener));
    }

    /// Start a run on the current tokio runtime. `on_complete` is called once,
    /// after the final dwell, unless the run is cancelled first. Like the phase
    /// listeners it runs under the run lock.
    pub fn start<F>(&self, on_complete: F) -> Result<IntroHandle, SequencerError>
    where
        F: FnOnce() + Send + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| SequencerError::NoRuntime)?;
        let generation = {
            let mut slot = self.shared.slot();
            if slot.live {
                return Err(SequencerError::AlreadyRunning);
            }
            slot.generation += 1;
            slot.live = true;
            self.shared.enter(&slot, Phase::first());
            slot.generation
        };

        log(
            Level::Info,
            Domain::Intro,
            "started",
            obj(&[("generation", serde_json::json!(generation))]),
        );

        let token = CancellationToken::new();
        let task = runtime.spawn(drive(
            Arc::clone(&self.shared),
            generation,
            Instant::now(),
            token.clone(),
            on_complete,
        ));

        Ok(IntroHandle {
            shared: Arc::clone(&self.shared),
            generation,
            token,
            task: Some(task),
        })
    }

    /// `start` and wait for the outcome.
    pub async fn run<F>(&self, on_complete: F) -> Result<IntroOutcome, SequencerError>
    where
        F: FnOnce() + Send + 'static,
    {
        Ok(self.start(on_complete)?.wait().await)
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

async fn drive<F>(
    shared: Arc<Shared>,
    generation: u64,
    started: Instant,
    token: CancellationToken,
    on_complete: F,
) -> IntroOutcome
where
    F: FnOnce() + Send + 'static,
{
    let mut on_complete = Some(on_complete);
    let mut timeline = Timeline::new();
    // Deadlines accumulate from the start so late wakeups don't stretch the intro.
    let mut deadline = started;

    loop {
        let wait = timeline.remaining();
        deadline += wait;
        tokio::select! {
            biased;
            () = token.cancelled() => return IntroOutcome::Cancelled,
            () = sleep_until(deadline) => {}
        }

        for step in timeline.advance(wait) {
            match step {
                Step::Entered(phase) => {
                    if !shared.publish(generation, phase) {
                        return IntroOutcome::Cancelled;
                    }
                }
                Step::Finished => {
                    let done = on_complete.take();
                    let finished = shared.finish(generation, || {
                        if let Some(done) = done {
                            done();
                        }
                    });
                    return if finished {
                        IntroOutcome::Completed
                    } else {
                        IntroOutcome::Cancelled
                    };
                }
            }
        }
    }
}

/// Owner of one run. Dropping it before the run ends cancels the run.
pub struct IntroHandle {
    shared: Arc<Shared>,
    generation: u64,
    token: CancellationToken,
    task: Option<JoinHandle<IntroOutcome>>,
}

impl IntroHandle {
    /// Stop the run. No phase is published and `on_complete` is not called
    /// after this returns. No-op if the run already ended.
    pub fn cancel(&self) {
        if self.shared.close(self.generation, IntroStatus::Cancelled) {
            log(
                Level::Info,
                Domain::Intro,
                "cancelled",
                obj(&[("msg", v_str("intro cancelled"))]),
            );
        }
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        let slot = self.shared.slot();
        !slot.live || slot.generation != self.generation
    }

    pub async fn wait(mut self) -> IntroOutcome {
        let outcome = match self.task.as_mut() {
            // A panicking on_complete surfaces here as a JoinError.
            Some(task) => task.await.unwrap_or(IntroOutcome::Cancelled),
            None => IntroOutcome::Cancelled,
        };
        self.task = None;
        outcome
    }
}

impl Drop for IntroHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intro::phase::TOTAL_RUNTIME;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::time::Duration;

    fn recorder(seq: &Sequencer) -> Arc<Mutex<Vec<Phase>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        seq.on_phase(move |p| sink.lock().unwrap().push(p));
        seen
    }

    #[tokio::test(start_paused = true)]
    async fn plays_every_phase_then_completes_once() {
        let seq = Sequencer::new();
        let seen = recorder(&seq);
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);

        let began = Instant::now();
        let outcome = seq.run(move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

        assert_eq!(outcome, IntroOutcome::Completed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*seen.lock().unwrap(), Phase::ALL.to_vec());
        let took = began.elapsed();
        let slack = Duration::from_millis(10);
        assert!(took >= TOTAL_RUNTIME && took < TOTAL_RUNTIME + slack, "{:?}", took);
        assert_eq!(seq.status(), IntroStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn completion_waits_for_last_dwell() {
        let seq = Sequencer::new();
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let handle = seq
            .start(move || {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        tokio::time::sleep(TOTAL_RUNTIME - Duration::from_millis(1)).await;
        assert_eq!(seq.status(), IntroStatus::Playing(Phase::Final));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(handle.wait().await, IntroOutcome::Completed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_phases_and_completion() {
        let seq = Sequencer::new();
        let seen = recorder(&seq);
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let handle = seq
            .start(move || {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        // inside write_1 (starts at 2300ms)
        tokio::time::sleep(Duration::from_millis(3000)).await;
        handle.cancel();
        let frozen = seen.lock().unwrap().clone();
        assert_eq!(frozen, vec![Phase::Entering, Phase::Ready1, Phase::Write1]);
        assert_eq!(seq.status(), IntroStatus::Cancelled);

        tokio::time::sleep(TOTAL_RUNTIME).await;
        assert_eq!(*seen.lock().unwrap(), frozen);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(handle.wait().await, IntroOutcome::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_while_running_is_rejected() {
        let seq = Sequencer::new();
        let handle = seq.start(|| {}).unwrap();
        assert_eq!(seq.start(|| {}).err(), Some(SequencerError::AlreadyRunning));

        assert_eq!(handle.wait().await, IntroOutcome::Completed);
        // finished runs free the slot
        let again = seq.start(|| {}).unwrap();
        again.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_cancels_run() {
        let seq = Sequencer::new();
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let handle = seq
            .start(move || {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(handle);

        assert_eq!(seq.status(), IntroStatus::Cancelled);
        tokio::time::sleep(TOTAL_RUNTIME).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_current_phase() {
        let seq = Sequencer::new();
        let rx = seq.subscribe();
        assert_eq!(*rx.borrow(), IntroStatus::Idle);

        let handle = seq.start(|| {}).unwrap();
        assert_eq!(rx.borrow().phase(), Some(Phase::Entering));

        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert_eq!(rx.borrow().phase(), Some(Phase::Ready1));
        handle.cancel();
        assert_eq!(rx.borrow().phase(), None);
    }

    #[test]
    fn start_outside_runtime_leaves_instance_reusable() {
        let seq = Sequencer::new();
        assert_eq!(seq.start(|| {}).err(), Some(SequencerError::NoRuntime));
        assert_eq!(seq.status(), IntroStatus::Idle);

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        rt.block_on(async {
            let handle = seq.start(|| {}).unwrap();
            assert_eq!(seq.status(), IntroStatus::Playing(Phase::Entering));
            handle.cancel();
        });
    }

    #[test]
    fn cancel_racing_completion_returns_after_on_complete() {
        let seq = Sequencer::new();
        let shared = Arc::clone(&seq.shared);
        {
            let mut slot = shared.slot();
            slot.generation = 1;
            slot.live = true;
        }

        let (entered_tx, entered_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let completed = Arc::new(AtomicBool::new(false));

        let finisher = {
            let shared = Arc::clone(&shared);
            let completed = Arc::clone(&completed);
            std::thread::spawn(move || {
                shared.finish(1, move || {
                    entered_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    completed.store(true, Ordering::SeqCst);
                })
            })
        };
        entered_rx.recv().unwrap();

        let canceller = {
            let shared = Arc::clone(&shared);
            let completed = Arc::clone(&completed);
            std::thread::spawn(move || {
                let closed = shared.close(1, IntroStatus::Cancelled);
                (closed, completed.load(Ordering::SeqCst))
            })
        };
        std::thread::sleep(Duration::from_millis(20));
        assert!(!canceller.is_finished());

        release_tx.send(()).unwrap();
        assert!(finisher.join().unwrap());
        // cancel lost the race and only returned once on_complete was done
        assert_eq!(canceller.join().unwrap(), (false, true));
        assert_eq!(seq.status(), IntroStatus::Completed);
    }

    #[test]
    fn status_serializes_for_render_layer() {
        let json = serde_json::to_value(IntroStatus::Playing(Phase::Write2)).unwrap();
        assert_eq!(json, serde_json::json!({"status": "playing", "phase": "write_2"}));
    }
}
