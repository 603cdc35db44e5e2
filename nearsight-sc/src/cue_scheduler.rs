//! Self-repeating proximity cue
//!
//! Each repeat is a one-shot timer armed when the previous playback ends,
//! so a retime takes effect on the very next cycle. All mutations go through
//! one mutex; every armed timer carries the generation it was armed under
//! and does nothing once that generation is stale. Each playback gets its
//! own id, and only the completion of the playback in flight counts.

use crate::config::CueConfig;
use crate::error::CueError;
use crate::playback::{AudioPlayer, CueAsset, PlaybackId};
use nearsight_core::CueSchedule;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Delay before retrying after the player refused to start.
const PLAYBACK_RETRY_FLOOR: Duration = Duration::from_millis(250);

struct CueState {
    schedule: CueSchedule,
    generation: u64,
    last_playback: u64,
    in_flight: Option<PlaybackId>,
    pending: Option<JoinHandle<()>>,
}

struct Inner {
    player: Arc<dyn AudioPlayer>,
    cue: CueAsset,
    max_interval_secs: f32,
    runtime: Handle,
    state: Mutex<CueState>,
}

/// Repeats a fixed cue at an externally supplied interval, one playback at a time.
///
/// Cheap to clone; clones drive the same cue. `start`, `stop` and `retime`
/// may be called at frame rate; `on_playback_finished` may arrive from the
/// audio thread.
#[derive(Clone)]
pub struct AudioCueScheduler {
    inner: Arc<Inner>,
}

impl AudioCueScheduler {
    pub fn new(
        config: &CueConfig,
        player: Arc<dyn AudioPlayer>,
        runtime: Handle,
    ) -> Result<Self, CueError> {
        config.validate().map_err(CueError::Config)?;

        let schedule = CueSchedule {
            interval_seconds: config.initial_interval_secs,
            is_active: false,
        };

        Ok(Self {
            inner: Arc::new(Inner {
                player,
                cue: CueAsset::new(config.asset.clone()),
                max_interval_secs: config.max_interval_secs,
                runtime,
                state: Mutex::new(CueState {
                    schedule,
                    generation: 0,
                    last_playback: 0,
                    in_flight: None,
                    pending: None,
                }),
            }),
        })
    }

    /// Play now and keep repeating. No-op while already active.
    pub fn start(&self) {
        let mut state = self.inner.state.lock();
        if state.schedule.is_active {
            return;
        }

        state.schedule.is_active = true;
        state.generation += 1;
        info!(interval = state.schedule.interval_seconds, "proximity cue started");
        self.inner.play_locked(&mut state);
    }

    /// Set the interval for the next repeat. A playback underway is not interrupted.
    pub fn retime(&self, interval_seconds: f32) {
        if !interval_seconds.is_finite() || interval_seconds < 0.0 {
            warn!(interval_seconds, "ignoring invalid cue interval");
            return;
        }

        let interval = interval_seconds.min(self.inner.max_interval_secs);
        self.inner.state.lock().schedule.interval_seconds = interval;
    }

    /// Cancel the pending repeat and halt playback. Idempotent.
    pub fn stop(&self) {
        let mut state = self.inner.state.lock();
        let was_active = state.schedule.is_active;

        state.schedule.is_active = false;
        state.generation += 1;

        if let Some(pending) = state.pending.take() {
            pending.abort();
        }

        if let Some(playback) = state.in_flight.take() {
            debug!(%playback, "halting cue playback");
            self.inner.player.halt();
        }

        if was_active {
            info!("proximity cue stopped");
        }
    }

    /// Completion callback from the audio subsystem.
    ///
    /// Arms the next repeat if `playback` is the one in flight and the cue is
    /// still active. Completions of halted or already finished playbacks are
    /// ignored.
    pub fn on_playback_finished(&self, playback: PlaybackId) {
        let mut state = self.inner.state.lock();
        if state.in_flight != Some(playback) {
            debug!(%playback, "ignoring completion of a playback no longer in flight");
            return;
        }
        state.in_flight = None;

        let delay = Duration::from_secs_f32(state.schedule.interval_seconds);
        Inner::arm_locked(&self.inner, &mut state, delay);
    }

    pub fn schedule(&self) -> CueSchedule {
        self.inner.state.lock().schedule
    }

    pub fn is_active(&self) -> bool {
        self.inner.state.lock().schedule.is_active
    }

    /// True between a successful `play` and its completion or `stop`.
    pub fn is_playing(&self) -> bool {
        self.inner.state.lock().in_flight.is_some()
    }
}

impl Inner {
    fn play_locked(self: &Arc<Self>, state: &mut CueState) {
        if state.in_flight.is_some() {
            return;
        }

        state.last_playback += 1;
        let playback = PlaybackId(state.last_playback);
        match self.player.play(&self.cue, playback) {
            Ok(()) => {
                state.in_flight = Some(playback);
            }
            Err(e) => {
                warn!("Cue playback failed, retrying on next cycle: {}", e);
                let delay = Duration::from_secs_f32(state.schedule.interval_seconds)
                    .max(PLAYBACK_RETRY_FLOOR);
                Self::arm_locked(self, state, delay);
            }
        }
    }

    fn arm_locked(this: &Arc<Self>, state: &mut CueState, delay: Duration) {
        state.generation += 1;
        let generation = state.generation;

        if let Some(previous) = state.pending.take() {
            previous.abort();
        }

        let inner = Arc::clone(this);
        state.pending = Some(this.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            inner.fire(generation);
        }));
    }

    fn fire(self: &Arc<Self>, generation: u64) {
        let mut state = self.state.lock();
        if state.generation != generation || !state.schedule.is_active {
            return;
        }

        state.pending = None;
        self.play_locked(&mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Tracks which playbacks are audible. `halt` silences everything.
    #[derive(Default)]
    struct CountingPlayer {
        plays: AtomicUsize,
        halts: AtomicUsize,
        max_audible: AtomicUsize,
        fail_next: AtomicBool,
        audible: parking_lot::Mutex<Vec<PlaybackId>>,
    }

    impl AudioPlayer for CountingPlayer {
        fn play(&self, _cue: &CueAsset, playback: PlaybackId) -> Result<(), CueError> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(CueError::Playback("device busy".to_string()));
            }
            self.plays.fetch_add(1, Ordering::SeqCst);
            let mut audible = self.audible.lock();
            audible.push(playback);
            self.max_audible.fetch_max(audible.len(), Ordering::SeqCst);
            Ok(())
        }

        fn halt(&self) {
            self.halts.fetch_add(1, Ordering::SeqCst);
            self.audible.lock().clear();
        }
    }

    impl CountingPlayer {
        fn plays(&self) -> usize {
            self.plays.load(Ordering::SeqCst)
        }

        fn halts(&self) -> usize {
            self.halts.load(Ordering::SeqCst)
        }

        fn max_audible(&self) -> usize {
            self.max_audible.load(Ordering::SeqCst)
        }

        fn current(&self) -> PlaybackId {
            *self.audible.lock().last().unwrap()
        }

        /// Let the newest playback run out and report it.
        fn finish(&self, scheduler: &AudioCueScheduler) {
            let playback = self.current();
            self.audible.lock().retain(|p| *p != playback);
            scheduler.on_playback_finished(playback);
        }
    }

    fn scheduler() -> (AudioCueScheduler, Arc<CountingPlayer>) {
        let player = Arc::new(CountingPlayer::default());
        let scheduler =
            AudioCueScheduler::new(&CueConfig::default(), player.clone(), Handle::current())
                .unwrap();
        (scheduler, player)
    }

    async fn advance(secs: f32) {
        tokio::time::sleep(Duration::from_secs_f32(secs)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_plays_immediately() {
        let (scheduler, player) = scheduler();
        scheduler.start();
        assert_eq!(player.plays(), 1);
        assert!(scheduler.is_active());
        assert!(scheduler.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_is_idempotent() {
        let (scheduler, player) = scheduler();
        scheduler.start();
        scheduler.start();
        assert_eq!(player.plays(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeat_after_interval() {
        let (scheduler, player) = scheduler();
        scheduler.retime(0.5);
        scheduler.start();
        player.finish(&scheduler);

        advance(0.4).await;
        assert_eq!(player.plays(), 1);

        advance(0.2).await;
        assert_eq!(player.plays(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retime_applies_to_next_cycle_only() {
        let (scheduler, player) = scheduler();
        scheduler.retime(1.0);
        scheduler.start();
        player.finish(&scheduler);
        scheduler.retime(5.0);

        advance(1.1).await;
        assert_eq!(player.plays(), 2);

        player.finish(&scheduler);
        advance(4.0).await;
        assert_eq!(player.plays(), 2);

        advance(1.2).await;
        assert_eq!(player.plays(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_then_late_completion_does_not_resume() {
        let (scheduler, player) = scheduler();
        scheduler.retime(0.1);
        scheduler.start();
        let first = player.current();
        scheduler.stop();
        scheduler.on_playback_finished(first);

        advance(10.0).await;
        assert_eq!(player.plays(), 1);
        assert_eq!(player.halts(), 1);
        assert!(!scheduler.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_completion_after_restart_keeps_single_playback() {
        let (scheduler, player) = scheduler();
        scheduler.retime(0.12);
        scheduler.start();
        let halted = player.current();
        scheduler.stop();
        scheduler.start();

        // the halted playback reports after the new one has begun
        scheduler.on_playback_finished(halted);
        assert!(scheduler.is_playing());

        advance(0.2).await;
        assert_eq!(player.plays(), 2);
        assert_eq!(player.max_audible(), 1);

        // the real completion still drives the repeat
        player.finish(&scheduler);
        advance(0.2).await;
        assert_eq!(player.plays(), 3);
        assert_eq!(player.max_audible(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_pending_repeat() {
        let (scheduler, player) = scheduler();
        scheduler.retime(1.0);
        scheduler.start();
        player.finish(&scheduler);
        scheduler.stop();

        advance(3.0).await;
        assert_eq!(player.plays(), 1);
        // nothing in flight when stopped, so nothing to halt
        assert_eq!(player.halts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let (scheduler, player) = scheduler();
        scheduler.start();
        scheduler.stop();
        scheduler.stop();
        assert_eq!(player.halts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop() {
        let (scheduler, player) = scheduler();
        scheduler.start();
        scheduler.stop();
        scheduler.start();
        assert_eq!(player.plays(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_retime_ignored() {
        let (scheduler, _player) = scheduler();
        scheduler.retime(0.6);
        scheduler.retime(f32::NAN);
        scheduler.retime(-1.0);
        assert!((scheduler.schedule().interval_seconds - 0.6).abs() < 1e-6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retime_clamped_to_max() {
        let (scheduler, _player) = scheduler();
        scheduler.retime(1000.0);
        assert_eq!(scheduler.schedule().interval_seconds, 60.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_playback_retries() {
        let (scheduler, player) = scheduler();
        player.fail_next.store(true, Ordering::SeqCst);
        scheduler.retime(0.1);
        scheduler.start();
        assert_eq!(player.plays(), 0);
        assert!(!scheduler.is_playing());

        advance(0.3).await;
        assert_eq!(player.plays(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_completion_arms_single_repeat() {
        let (scheduler, player) = scheduler();
        scheduler.retime(0.5);
        scheduler.start();
        let first = player.current();
        player.finish(&scheduler);
        scheduler.on_playback_finished(first);

        advance(0.6).await;
        assert_eq!(player.plays(), 2);
        assert_eq!(player.max_audible(), 1);
    }
}
