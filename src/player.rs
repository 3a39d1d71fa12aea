//! Real-time playback scheduler
//!
//! The [`Player`] is pull-based: the owner calls [`Player::update`] as often
//! as it can, and each call executes every command that is due according to
//! the elapsed time on the player's [`Clock`]. Nothing runs between calls,
//! so a late poll simply catches up on the next one.

use crate::chips::ChipSink;
use crate::clock::{self, Clock, SystemClock};
use crate::error::Result;
use crate::source::{DataSource, Input, VgmSource};
use crate::vgm::header::VgmHeader;
use crate::vgm::interpreter::Interpreter;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Nothing loaded
    #[default]
    Stopped,
    Playing,
    Paused,
    /// Reached the end of the log without looping
    Finished,
}

pub struct Player<S: ChipSink, C: Clock = SystemClock> {
    sink: S,
    clock: C,
    source: Option<VgmSource>,
    interpreter: Interpreter,
    state: PlaybackState,
    looping: bool,
    max_loops: Option<u32>,
    samples_played: u64,
    waiting_samples: u64,
    /// Clock reading that corresponds to sample 0
    start: Duration,
    paused_at: Duration,
    /// `samples_played` when the current pass through the loop began
    pass_start: u64,
}

impl<S: ChipSink> Player<S> {
    /// Player driven by the system clock
    pub fn new(sink: S) -> Self {
        Self::with_clock(sink, SystemClock::new())
    }
}

impl<S: ChipSink, C: Clock> Player<S, C> {
    pub fn with_clock(sink: S, clock: C) -> Self {
        Self {
            sink,
            clock,
            source: None,
            interpreter: Interpreter::new(),
            state: PlaybackState::Stopped,
            looping: false,
            max_loops: None,
            samples_played: 0,
            waiting_samples: 0,
            start: Duration::ZERO,
            paused_at: Duration::ZERO,
            pass_start: 0,
        }
    }

    /// Stop whatever is playing and start `input` from the beginning.
    ///
    /// On error nothing is loaded and the player stays stopped.
    pub fn play(&mut self, input: impl Into<Input>) -> Result<()> {
        self.stop();

        let mut source = VgmSource::for_input(input.into());
        self.interpreter.bind();
        if let Err(e) = Self::load(&mut self.interpreter, &mut source) {
            tracing::warn!("failed to load VGM: {}", e);
            source.close();
            self.interpreter.bind();
            return Err(e);
        }

        self.source = Some(source);
        self.samples_played = 0;
        self.waiting_samples = 0;
        self.pass_start = 0;
        self.start = self.clock.now();
        self.state = PlaybackState::Playing;
        tracing::info!(
            "playing {:.2}s{}",
            self.duration().as_secs_f64(),
            if self.has_loop() { " (loop point)" } else { "" }
        );
        Ok(())
    }

    fn load(interpreter: &mut Interpreter, source: &mut VgmSource) -> Result<()> {
        source.open()?;
        interpreter.parse_header(source)?;
        Ok(())
    }

    pub fn play_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.play(path.as_ref())
    }

    /// Play a log held in memory, raw or gzip-compressed
    pub fn play_data(&mut self, data: impl Into<Vec<u8>>) -> Result<()> {
        self.play(Input::Bytes(data.into()))
    }

    /// Execute every command due by now
    pub fn update(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        let Some(source) = self.source.as_mut() else {
            return;
        };

        let elapsed = self.clock.now().saturating_sub(self.start);
        let target = clock::samples_for(elapsed);

        while self.samples_played < target {
            if self.waiting_samples > 0 {
                let step = self.waiting_samples.min(target - self.samples_played);
                self.waiting_samples -= step;
                self.samples_played += step;
                continue;
            }

            if self.interpreter.is_finished() {
                let limit_reached = self
                    .max_loops
                    .is_some_and(|max| self.interpreter.loop_count() >= max);
                if !self.looping || !self.interpreter.has_loop() || limit_reached {
                    tracing::info!("finished after {} samples", self.samples_played);
                    self.state = PlaybackState::Finished;
                    return;
                }
                if self.samples_played == self.pass_start {
                    tracing::warn!("loop pass played no samples, stopping");
                    self.state = PlaybackState::Finished;
                    return;
                }
                if !self.interpreter.seek_to_loop(source) {
                    self.state = PlaybackState::Finished;
                    return;
                }
                self.pass_start = self.samples_played;
                tracing::info!("loop {}", self.interpreter.loop_count());
            }

            self.waiting_samples =
                self.interpreter.process_until_wait(source, &mut self.sink) as u64;
        }
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.paused_at = self.clock.now();
            self.state = PlaybackState::Paused;
            tracing::debug!("paused at sample {}", self.samples_played);
        }
    }

    pub fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            let paused_for = self.clock.now().saturating_sub(self.paused_at);
            self.start += paused_for;
            self.state = PlaybackState::Playing;
            tracing::debug!("resumed after {:?}", paused_for);
        }
    }

    /// Silence the chips and release the log. Safe in any state.
    pub fn stop(&mut self) {
        self.sink.mute_all();
        if let Some(mut source) = self.source.take() {
            source.close();
            tracing::debug!("stopped at sample {}", self.samples_played);
        }
        self.state = PlaybackState::Stopped;
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    /// Limit the number of loop restarts; `None` loops forever
    pub fn set_max_loops(&mut self, max: Option<u32>) {
        self.max_loops = max;
    }

    pub fn max_loops(&self) -> Option<u32> {
        self.max_loops
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.state == PlaybackState::Paused
    }

    pub fn is_stopped(&self) -> bool {
        self.state == PlaybackState::Stopped
    }

    pub fn is_finished(&self) -> bool {
        self.state == PlaybackState::Finished
    }

    pub fn samples_played(&self) -> u64 {
        self.samples_played
    }

    pub fn position(&self) -> Duration {
        clock::duration_for(self.samples_played)
    }

    /// Length of one pass through the log, from the header
    pub fn duration(&self) -> Duration {
        clock::duration_for(self.header().map_or(0, |h| h.total_samples as u64))
    }

    pub fn loop_count(&self) -> u32 {
        self.interpreter.loop_count()
    }

    pub fn has_loop(&self) -> bool {
        self.interpreter.has_loop()
    }

    pub fn has_ym2612(&self) -> bool {
        self.header().is_some_and(VgmHeader::has_ym2612)
    }

    pub fn has_sn76489(&self) -> bool {
        self.header().is_some_and(VgmHeader::has_sn76489)
    }

    pub fn header(&self) -> Option<&VgmHeader> {
        self.interpreter.header()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Consume the player, returning its sink
    pub fn into_sink(self) -> S {
        self.sink
    }
}
