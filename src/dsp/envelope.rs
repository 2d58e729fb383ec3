use crate::{
    graph::node::RenderCtx,
    params::{ATTACK, DECAY, RELEASE, SUSTAIN},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Amplitude Envelope
==================

Gain curve for one note: up to full level, down to a held level, and down
to silence once the key is let go. Every moving part is a straight line.

Terms
-----

  level     Gain in [0, 1] that the voice output is multiplied by.

  gate      Key state. note_on raises it, note_off lowers it. Gate changes
            are latched in order and take effect one per sample, so a
            note_on and note_off in the same block give a short blip.

  ramp      Linear move between two levels over a whole number of samples.
            Attack, Decay and Release are each one ramp.

Shape over one note
-------------------

   gain
    1 ┤   ╱╲
      │  ╱  ╲
  sus ┤ ╱    ╲───────────╮
      │╱                  ╲
    0 ┼────────────────────╲────→ t
       ├A─┼─D─┼────S──────┼─R─┤
             gate high ──→│← gate low


Stages
------

    Idle ──note_on──→ Attack ──level=1──→ Decay ──level=S──→ Sustain
     ↑                  ↑                                       │
     │                  └──────── note_on (any stage) ──────────┤
     │                                                          │
     └──level=0── Release ←──────── note_off (any stage but Idle)

  - note_on from ANY stage restarts Attack. From mid-Release this is a
    legato retrigger: the attack climbs from the current level instead of
    dropping to zero first, so there is no click and no pass through Idle.
  - note_off from any non-Idle stage starts Release from the CURRENT level.


Ramp Snapshots
--------------

Each stage computes its ramp (start level, end level, length in samples)
once, when the stage begins, from the parameters in effect at that moment.
Changing attack/decay/sustain/release while a ramp is running does not
bend that ramp; the new values are picked up by the next stage that
starts. Sustain is the exception: it is a hold, not a ramp, and always
holds the current sustain level.

Attack length scales with the distance still to climb. A full 0 → 1
attack takes `attack` seconds; a retrigger from 0.6 takes 0.4 × attack.
The slope is the same either way.

Release length is always `release` seconds regardless of starting level.
*/

/// Where the envelope is in the note's lifetime.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // silent, level 0
    Attack,  // rising to 1
    Decay,   // falling to the sustain level
    Sustain, // holding while the key is down
    Release, // falling to 0 after note_off
}

impl EnvelopeState {
    pub fn label(self) -> &'static str {
        match self {
            EnvelopeState::Idle => "Idle",
            EnvelopeState::Attack => "Attack",
            EnvelopeState::Decay => "Decay",
            EnvelopeState::Sustain => "Sustain",
            EnvelopeState::Release => "Release",
        }
    }
}

/// Envelope shape: three times in seconds and a sustain level.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl AdsrParams {
    /// Build parameters, clamping every field into its range.
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
        .clamped()
    }

    pub fn clamped(self) -> Self {
        Self {
            attack: ATTACK.clamp(self.attack),
            decay: DECAY.clamp(self.decay),
            sustain: SUSTAIN.clamp(self.sustain),
            release: RELEASE.clamp(self.release),
        }
    }
}

impl Default for AdsrParams {
    fn default() -> Self {
        Self {
            attack: ATTACK.default,
            decay: DECAY.default,
            sustain: SUSTAIN.default,
            release: RELEASE.default,
        }
    }
}

/// A linear segment, snapshotted when its stage begins.
#[derive(Debug, Clone, Copy)]
struct Ramp {
    from: f32,
    to: f32,
    total_samples: u32,
    elapsed_samples: u32,
}

impl Ramp {
    const DONE: Self = Self {
        from: 0.0,
        to: 0.0,
        total_samples: 1,
        elapsed_samples: 1,
    };

    fn new(from: f32, to: f32, seconds: f32, ctx: &RenderCtx) -> Self {
        Self {
            from,
            to,
            total_samples: ctx.samples_for(seconds),
            elapsed_samples: 0,
        }
    }

    /// Advance one sample; returns the new level.
    #[inline]
    fn step(&mut self) -> f32 {
        self.elapsed_samples = self.elapsed_samples.saturating_add(1).min(self.total_samples);
        let progress = self.elapsed_samples as f32 / self.total_samples as f32;
        self.from + (self.to - self.from) * progress
    }

    #[inline]
    fn is_done(&self) -> bool {
        self.elapsed_samples >= self.total_samples
    }
}

pub struct Envelope {
    // Shape used by the next stage that starts
    params: AdsrParams,

    // Runtime state (changes every sample)
    stage: EnvelopeState,
    level: f32,
    ramp: Ramp,

    // Gate events are latched in order and applied one per sample. The
    // second slot keeps a note_off that arrives behind a note_on.
    pending: Option<Gate>,
    queued: Option<Gate>,
}

#[derive(Debug, Clone, Copy)]
enum Gate {
    On,
    Off,
}

impl Envelope {
    pub fn new() -> Self {
        Self::with_params(AdsrParams::default())
    }

    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self::with_params(AdsrParams::new(attack, decay, sustain, release))
    }

    pub fn with_params(params: AdsrParams) -> Self {
        Self {
            params: params.clamped(),
            stage: EnvelopeState::Idle,
            level: 0.0,
            ramp: Ramp::DONE,
            pending: None,
            queued: None,
        }
    }

    /// Gate high: (re)start the attack stage on the next sample.
    pub fn note_on(&mut self) {
        self.latch(Gate::On);
    }

    /// Gate low: start the release stage on the next sample, or the one
    /// after if a note_on is still waiting.
    pub fn note_off(&mut self) {
        self.latch(Gate::Off);
    }

    fn latch(&mut self, gate: Gate) {
        if self.pending.is_none() {
            self.pending = Some(gate);
        } else {
            // Later events replace the second slot; the final gate still wins
            self.queued = Some(gate);
        }
    }

    /// Replace the shape. Running ramps keep the values they started with.
    pub fn set_params(&mut self, params: AdsrParams) {
        self.params = params.clamped();
    }

    pub fn set_attack(&mut self, seconds: f32) {
        self.params.attack = ATTACK.clamp(seconds);
    }

    pub fn set_decay(&mut self, seconds: f32) {
        self.params.decay = DECAY.clamp(seconds);
    }

    pub fn set_sustain(&mut self, level: f32) {
        self.params.sustain = SUSTAIN.clamp(level);
    }

    pub fn set_release(&mut self, seconds: f32) {
        self.params.release = RELEASE.clamp(seconds);
    }

    pub fn params(&self) -> AdsrParams {
        self.params
    }

    fn start_attack(&mut self, ctx: &RenderCtx) {
        let remaining = (1.0 - self.level).max(0.0);
        self.ramp = Ramp::new(self.level, 1.0, self.params.attack * remaining, ctx);
        self.stage = EnvelopeState::Attack;
    }

    fn start_decay(&mut self, ctx: &RenderCtx) {
        self.ramp = Ramp::new(1.0, self.params.sustain, self.params.decay, ctx);
        self.stage = EnvelopeState::Decay;
    }

    fn start_release(&mut self, ctx: &RenderCtx) {
        self.ramp = Ramp::new(self.level, 0.0, self.params.release, ctx);
        self.stage = EnvelopeState::Release;
    }

    fn apply_gate(&mut self, ctx: &RenderCtx) {
        let gate = self.pending.take();
        self.pending = self.queued.take();
        match gate {
            Some(Gate::On) => self.start_attack(ctx),
            Some(Gate::Off) if self.stage != EnvelopeState::Idle => self.start_release(ctx),
            _ => {}
        }
    }

    /// Advance the envelope by one sample and return the new level.
    pub fn next_sample(&mut self, ctx: &RenderCtx) -> f32 {
        self.apply_gate(ctx);

        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.level = self.ramp.step();
                if self.ramp.is_done() {
                    self.level = 1.0;
                    self.start_decay(ctx);
                }
            }

            EnvelopeState::Decay => {
                self.level = self.ramp.step();
                if self.ramp.is_done() {
                    self.stage = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.params.sustain;
            }

            EnvelopeState::Release => {
                self.level = self.ramp.step();
                if self.ramp.is_done() {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Fill `buffer` with consecutive levels.
    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(ctx);
        }
    }

    /// False once the release has finished and no note is pending.
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeState::Idle
            || matches!(self.pending, Some(Gate::On))
            || matches!(self.queued, Some(Gate::On))
    }

    /// Silence immediately and forget any latched gate.
    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.ramp = Ramp::DONE;
        self.pending = None;
        self.queued = None;
    }

    /// Current envelope level (0.0 to 1.0), the gain applied to the voice.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Current envelope stage
    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn ctx() -> RenderCtx {
        RenderCtx::new(SAMPLE_RATE)
    }

    fn render_samples(env: &mut Envelope, samples: usize) {
        let ctx = ctx();
        for _ in 0..samples {
            env.next_sample(&ctx);
        }
    }

    #[test]
    fn note_on_waits_for_next_sample() {
        let mut env = Envelope::adsr(0.1, 0.1, 0.5, 0.1);
        env.note_on();
        assert_eq!(env.state(), EnvelopeState::Idle);
        render_samples(&mut env, 1);
        assert_eq!(env.state(), EnvelopeState::Attack);
    }

    #[test]
    fn walks_attack_decay_sustain() {
        let mut env = Envelope::adsr(0.02, 0.05, 0.6, 0.2);
        env.note_on();

        render_samples(&mut env, 10);
        assert_eq!(env.state(), EnvelopeState::Attack);
        assert!((env.level() - 0.5).abs() < 0.01, "halfway up, got {}", env.level());

        render_samples(&mut env, 10);
        assert_eq!(env.state(), EnvelopeState::Decay);
        assert!((env.level() - 1.0).abs() < 1e-6);

        render_samples(&mut env, 50);
        assert_eq!(env.state(), EnvelopeState::Sustain);

        render_samples(&mut env, 100);
        assert_eq!(env.state(), EnvelopeState::Sustain);
        assert!((env.level() - 0.6).abs() < 1e-6, "sustain level should be held");
    }

    #[test]
    fn release_falls_back_to_idle() {
        let release = 0.03;
        let mut env = Envelope::adsr(0.01, 0.05, 0.5, release);
        env.note_on();
        render_samples(&mut env, 100);
        assert_eq!(env.state(), EnvelopeState::Sustain);

        env.note_off();
        render_samples(&mut env, 1);
        assert_eq!(env.state(), EnvelopeState::Release);

        render_samples(&mut env, (release * SAMPLE_RATE) as usize);
        assert_eq!(env.level(), 0.0);
        assert_eq!(env.state(), EnvelopeState::Idle);
    }

    #[test]
    fn release_starts_from_current_level() {
        let mut env = Envelope::adsr(0.1, 0.1, 0.5, 0.1);
        env.note_on();
        render_samples(&mut env, 40); // partway up the attack
        let before = env.level();
        assert!(before > 0.3 && before < 0.5);

        env.note_off();
        render_samples(&mut env, 1);
        assert!(env.level() < before);
        assert!(before - env.level() < 0.02, "no jump at release start");
    }

    #[test]
    fn note_on_in_release_retriggers_without_idle() {
        let mut env = Envelope::adsr(0.1, 0.1, 0.8, 0.5);
        env.note_on();
        render_samples(&mut env, 300);
        env.note_off();
        render_samples(&mut env, 100);
        assert_eq!(env.state(), EnvelopeState::Release);
        let level = env.level();
        assert!(level > 0.1);

        env.note_on();
        render_samples(&mut env, 1);
        assert_eq!(env.state(), EnvelopeState::Attack);
        assert!(env.level() >= level, "attack climbs from the release level");
    }

    #[test]
    fn quick_tap_plays_attack_then_release() {
        let mut env = Envelope::adsr(0.1, 0.1, 0.5, 0.1);
        env.note_on();
        env.note_off();
        assert!(env.is_active());

        render_samples(&mut env, 1);
        assert_eq!(env.state(), EnvelopeState::Attack);
        let peak = env.level();
        assert!(peak > 0.0);

        render_samples(&mut env, 1);
        assert_eq!(env.state(), EnvelopeState::Release);
        assert!(env.level() <= peak);
    }

    #[test]
    fn last_of_several_gate_events_wins() {
        let mut env = Envelope::adsr(0.1, 0.1, 0.5, 0.1);
        env.note_on();
        env.note_off();
        env.note_on();
        render_samples(&mut env, 50);
        assert_eq!(env.state(), EnvelopeState::Attack);
    }

    #[test]
    fn note_off_while_idle_is_ignored() {
        let mut env = Envelope::new();
        env.note_off();
        render_samples(&mut env, 5);
        assert_eq!(env.state(), EnvelopeState::Idle);
        assert!(!env.is_active());
    }

    #[test]
    fn parameter_change_does_not_bend_running_ramp() {
        let mut env = Envelope::adsr(0.1, 0.1, 0.5, 0.1);
        env.note_on();
        render_samples(&mut env, 50);
        let halfway = env.level();

        // A much faster attack must not snap the running ramp to the top
        env.set_attack(0.01);
        render_samples(&mut env, 10);
        assert_eq!(env.state(), EnvelopeState::Attack);
        assert!((env.level() - (halfway + 0.1)).abs() < 0.01);

        // The next attack uses the new value
        env.note_off();
        render_samples(&mut env, 200);
        env.note_on();
        render_samples(&mut env, 11);
        assert_ne!(env.state(), EnvelopeState::Attack);
    }

    #[test]
    fn setters_clamp_to_range() {
        let mut env = Envelope::new();
        env.set_attack(0.0);
        env.set_decay(99.0);
        env.set_sustain(1.5);
        env.set_release(-1.0);

        let params = env.params();
        assert_eq!(params.attack, 0.01);
        assert_eq!(params.decay, 5.0);
        assert_eq!(params.sustain, 1.0);
        assert_eq!(params.release, 0.01);
    }
}
