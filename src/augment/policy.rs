//! The fixed-order augmentation chain.
//!
//! [`AugmentationPolicy::apply`] interleaves *deciding* (Bernoulli + uniform
//! draws from the injected RNG) with *applying* (pure buffer transforms),
//! because the trim window is a fraction of the duration left after speed
//! and pitch have run.  The step functions are public so a recorded
//! [`AugmentationDecision`] can be replayed with
//! [`AugmentationPolicy::apply_decision`].
//!
//! ## Known imprecision
//!
//! Both speed and pitch work by reinterpreting the sample rate and resampling
//! back to 16 kHz.  Speed therefore shifts pitch too, and a pitch shift of
//! `n` semitones also scales the clip duration by `2^(-n/12)`.  This is the
//! intended behaviour; clip-duration statistics of existing datasets depend
//! on it.

use log::debug;
use rand::Rng;

use crate::audio::{AudioError, WaveformBuffer, CANONICAL_SAMPLE_RATE};

use super::{AugmentConfig, AugmentError, AugmentationDecision, TrimWindow};

// ---------------------------------------------------------------------------
// Step functions
// ---------------------------------------------------------------------------

/// Declare the rate as `round(rate * ratio)` and convert back to 16 kHz.
fn reinterpret_and_normalise(
    buffer: &WaveformBuffer,
    ratio: f64,
) -> Result<WaveformBuffer, AudioError> {
    let rate = ((buffer.sample_rate() as f64 * ratio).round() as u32).max(1);
    buffer
        .clone()
        .with_sample_rate(rate)?
        .resample(CANONICAL_SAMPLE_RATE)
}

/// Play `buffer` `factor` times faster (pitch rises with it).
pub fn change_speed(buffer: &WaveformBuffer, factor: f64) -> Result<WaveformBuffer, AudioError> {
    reinterpret_and_normalise(buffer, factor)
}

/// Shift pitch by `semitones`; duration scales by the inverse ratio.
pub fn shift_pitch(buffer: &WaveformBuffer, semitones: f64) -> Result<WaveformBuffer, AudioError> {
    reinterpret_and_normalise(buffer, 2f64.powf(semitones / 12.0))
}

pub fn change_volume(buffer: &WaveformBuffer, delta_db: f64) -> WaveformBuffer {
    buffer.gain_db(delta_db)
}

/// `None` when `window` selects no whole frame of `buffer`.
pub fn trim(buffer: &WaveformBuffer, window: TrimWindow) -> Option<WaveformBuffer> {
    buffer.try_slice_ms(window.start_ms, window.end_ms)
}

/// Draw a trim window for a clip lasting `duration_ms`.
///
/// `start ∈ [0, ⌊max_start · d⌋]`, `end ∈ [⌊min_end · d⌋, d]` (integer ms).
/// Returns `None` when the clip is too short for `start < end`.
pub fn draw_trim_window<R: Rng + ?Sized>(
    duration_ms: u64,
    (max_start, min_end): (f64, f64),
    rng: &mut R,
) -> Option<TrimWindow> {
    if duration_ms == 0 {
        return None;
    }
    let d = duration_ms as f64;
    let start_ms = rng.gen_range(0..=(d * max_start).floor() as u64);
    let end_lo = ((d * min_end).floor() as u64).min(duration_ms);
    let end_ms = rng.gen_range(end_lo..=duration_ms);

    (start_ms < end_ms).then_some(TrimWindow { start_ms, end_ms })
}

// ---------------------------------------------------------------------------
// AugmentationPolicy
// ---------------------------------------------------------------------------

/// Output of one pass through the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Augmented {
    pub buffer: WaveformBuffer,
    pub decision: AugmentationDecision,
}

/// Applies speed → pitch → volume → trim with independent random draws.
#[derive(Debug, Clone, Copy)]
pub struct AugmentationPolicy {
    config: AugmentConfig,
}

impl AugmentationPolicy {
    /// # Errors
    ///
    /// [`AugmentError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: AugmentConfig) -> Result<Self, AugmentError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run the chain on `buffer`, drawing every decision from `rng`.
    ///
    /// The input is never modified.  With every probability at zero the
    /// returned buffer equals the input exactly.
    ///
    /// # Errors
    ///
    /// * [`AudioError::InvalidBuffer`] (wrapped) when `buffer` has no
    ///   samples — checked before any draw.
    /// * [`AudioError::Resample`] (wrapped) if rate conversion fails.
    pub fn apply<R: Rng + ?Sized>(
        &self,
        buffer: &WaveformBuffer,
        rng: &mut R,
    ) -> Result<Augmented, AugmentError> {
        ensure_not_empty(buffer)?;

        let cfg = &self.config;
        let mut decision = AugmentationDecision::default();
        let mut current = buffer.clone();

        if cfg.speed.fires(rng) {
            let factor = cfg.speed.sample(rng);
            current = change_speed(&current, factor)?;
            decision.speed_factor = Some(factor);
            debug!("speed x{factor:.2}");
        }

        if cfg.pitch.fires(rng) {
            let semitones = cfg.pitch.sample(rng);
            current = shift_pitch(&current, semitones)?;
            decision.semitone_shift = Some(semitones);
            debug!("pitch {semitones:+.2} semitones");
        }

        if cfg.volume.fires(rng) {
            let delta_db = cfg.volume.sample(rng);
            current = change_volume(&current, delta_db);
            decision.volume_delta_db = Some(delta_db);
            debug!("volume {delta_db:+.2} dB");
        }

        if cfg.trim.fires(rng) {
            let duration_ms = current.duration_ms();
            let trimmed = draw_trim_window(duration_ms, cfg.trim.range, rng)
                .and_then(|window| Some((window, trim(&current, window)?)));
            match trimmed {
                Some((window, sliced)) => {
                    current = sliced;
                    decision.trim = Some(window);
                    debug!("trim {}-{} ms", window.start_ms, window.end_ms);
                }
                None => debug!("trim skipped: {duration_ms} ms clip too short"),
            }
        }

        Ok(Augmented {
            buffer: current,
            decision,
        })
    }

    /// Replay `decision` on `buffer` without drawing anything.
    pub fn apply_decision(
        buffer: &WaveformBuffer,
        decision: &AugmentationDecision,
    ) -> Result<WaveformBuffer, AugmentError> {
        ensure_not_empty(buffer)?;

        let mut current = buffer.clone();
        if let Some(factor) = decision.speed_factor {
            current = change_speed(&current, factor)?;
        }
        if let Some(semitones) = decision.semitone_shift {
            current = shift_pitch(&current, semitones)?;
        }
        if let Some(delta_db) = decision.volume_delta_db {
            current = change_volume(&current, delta_db);
        }
        if let Some(trimmed) = decision.trim.and_then(|w| trim(&current, w)) {
            current = trimmed;
        }
        Ok(current)
    }
}

fn ensure_not_empty(buffer: &WaveformBuffer) -> Result<(), AudioError> {
    if buffer.is_empty() {
        return Err(AudioError::InvalidBuffer(
            "cannot augment an empty buffer".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioCodec, WavCodec};
    use crate::augment::EffectConfig;
    use rand::{rngs::StdRng, SeedableRng};

    /// Mono ramp whose sample value equals its frame index (unique < 32 768).
    fn ramp(frames: usize, rate: u32) -> WaveformBuffer {
        let samples = (0..frames).map(|i| i as i16).collect();
        WaveformBuffer::new(samples, rate, 1).unwrap()
    }

    fn tone(ms: u64, rate: u32) -> WaveformBuffer {
        let frames = (ms * rate as u64 / 1_000) as usize;
        let samples = (0..frames)
            .map(|i| {
                let t = i as f64 / rate as f64;
                ((2.0 * std::f64::consts::PI * 440.0 * t).sin() * 8_000.0) as i16
            })
            .collect();
        WaveformBuffer::new(samples, rate, 1).unwrap()
    }

    fn only(f: impl FnOnce(&mut AugmentConfig)) -> AugmentationPolicy {
        let mut cfg = AugmentConfig::disabled();
        f(&mut cfg);
        AugmentationPolicy::new(cfg).unwrap()
    }

    // ---- Construction / input validation -----------------------------------

    #[test]
    fn new_rejects_invalid_config() {
        let mut cfg = AugmentConfig::default();
        cfg.speed.probability = -0.1;
        assert!(matches!(
            AugmentationPolicy::new(cfg),
            Err(AugmentError::InvalidConfig(_))
        ));
    }

    #[test]
    fn empty_buffer_is_rejected_before_any_step() {
        let policy = AugmentationPolicy::new(AugmentConfig::disabled()).unwrap();
        let empty = WaveformBuffer::new(Vec::new(), 16_000, 1).unwrap();
        let err = policy
            .apply(&empty, &mut StdRng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(err, AugmentError::Audio(AudioError::InvalidBuffer(_))));
    }

    #[test]
    fn replay_rejects_empty_buffer() {
        let empty = WaveformBuffer::new(Vec::new(), 16_000, 1).unwrap();
        let err =
            AugmentationPolicy::apply_decision(&empty, &AugmentationDecision::default())
                .unwrap_err();
        assert!(matches!(err, AugmentError::Audio(AudioError::InvalidBuffer(_))));
    }

    // ---- No-op invariant ---------------------------------------------------

    #[test]
    fn zero_probabilities_are_byte_identical() {
        let policy = AugmentationPolicy::new(AugmentConfig::disabled()).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        for input in [tone(300, 22_050), ramp(5, 16_000), tone(1_000, 44_100)] {
            let out = policy.apply(&input, &mut rng).unwrap();
            assert!(out.decision.is_identity());
            assert_eq!(out.buffer, input);
            assert_eq!(
                WavCodec.encode(&out.buffer).unwrap(),
                WavCodec.encode(&input).unwrap()
            );
        }
    }

    #[test]
    fn zero_db_volume_is_noop() {
        let input = tone(200, 16_000);
        let decision = AugmentationDecision {
            volume_delta_db: Some(0.0),
            ..Default::default()
        };
        let out = AugmentationPolicy::apply_decision(&input, &decision).unwrap();
        assert_eq!(out, input);
    }

    // ---- Trim --------------------------------------------------------------

    #[test]
    fn trim_only_yields_contiguous_shorter_subrange() {
        let policy = only(|c| c.trim = c.trim.always());
        let input = ramp(16_000, 16_000); // 1 s
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..50 {
            let out = policy.apply(&input, &mut rng).unwrap();
            let d = out.buffer.duration_ms();
            assert!(d > 0 && d <= input.duration_ms(), "duration {d}");

            let offset = out.buffer.samples()[0] as usize;
            let len = out.buffer.samples().len();
            assert_eq!(out.buffer.samples(), &input.samples()[offset..offset + len]);

            let w = out.decision.trim.expect("trim fired");
            assert!(w.start_ms <= 200 && w.end_ms >= 800 && w.end_ms <= 1_000);
        }
    }

    #[test]
    fn trim_is_recorded_only_when_frames_are_removed() {
        let policy = only(|c| c.trim = c.trim.always());
        // 1 Hz: most windows fall inside frame 0 and select nothing.
        let input = WaveformBuffer::new(vec![7], 1, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(21);

        let mut skipped = 0;
        for _ in 0..50 {
            let out = policy.apply(&input, &mut rng).unwrap();
            match out.decision.trim {
                Some(w) => assert_eq!(trim(&input, w), Some(out.buffer)),
                None => {
                    assert_eq!(out.buffer, input);
                    skipped += 1;
                }
            }
        }
        assert!(skipped > 0);
    }

    #[test]
    fn trim_window_between_frames_is_none() {
        let input = ramp(10, 100); // 10 ms per frame
        let window = TrimWindow {
            start_ms: 1,
            end_ms: 5,
        };
        assert_eq!(trim(&input, window), None);
    }

    #[test]
    fn trim_on_zero_ms_clip_leaves_buffer_unchanged() {
        let policy = only(|c| c.trim = c.trim.always());
        let input = ramp(10, 16_000); // 0.625 ms → 0 ms
        assert_eq!(input.duration_ms(), 0);

        let out = policy.apply(&input, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(out.buffer, input);
        assert!(out.decision.trim.is_none());
    }

    #[test]
    fn trim_window_draw_respects_bounds() {
        let mut rng = StdRng::seed_from_u64(9);
        for d in [1_u64, 2, 5, 10, 999] {
            for _ in 0..100 {
                if let Some(w) = draw_trim_window(d, (0.2, 0.8), &mut rng) {
                    assert!(w.start_ms < w.end_ms && w.end_ms <= d);
                }
            }
        }
        assert!(draw_trim_window(0, (0.2, 0.8), &mut rng).is_none());
    }

    // ---- Rate normalisation ------------------------------------------------

    #[test]
    fn speed_and_pitch_always_return_canonical_rate() {
        let speed = only(|c| c.speed = c.speed.always());
        let pitch = only(|c| c.pitch = c.pitch.always());
        let mut rng = StdRng::seed_from_u64(21);

        for rate in [16_000, 22_050, 24_000, 44_100] {
            let input = tone(250, rate);
            for policy in [&speed, &pitch] {
                let out = policy.apply(&input, &mut rng).unwrap();
                assert!(out.decision.changes_rate());
                assert_eq!(out.buffer.sample_rate(), CANONICAL_SAMPLE_RATE);
            }
        }
    }

    #[test]
    fn speed_factor_scales_duration() {
        let input = tone(1_000, 16_000);
        let faster = change_speed(&input, 1.25).unwrap();
        assert!(faster.duration_ms().abs_diff(800) <= 1, "{}", faster.duration_ms());
        let slower = change_speed(&input, 0.8).unwrap();
        assert!(slower.duration_ms().abs_diff(1_250) <= 1, "{}", slower.duration_ms());
    }

    #[test]
    fn octave_pitch_shift_halves_duration() {
        let input = tone(1_000, 16_000);
        let out = shift_pitch(&input, 12.0).unwrap();
        assert_eq!(out.sample_rate(), CANONICAL_SAMPLE_RATE);
        assert!(out.duration_ms().abs_diff(500) <= 1, "{}", out.duration_ms());
    }

    #[test]
    fn speed_from_other_rate_uses_rounded_reinterpreted_rate() {
        // 22 050 × 1.1 = 24 255 Hz; 2 205 frames → round(2 205 × 16 000 / 24 255)
        let input = tone(100, 22_050);
        let out = change_speed(&input, 1.1).unwrap();
        let expected = (2_205.0_f64 * 16_000.0 / 24_255.0).round() as usize;
        assert_eq!(out.frames(), expected);
    }

    // ---- Ordering ----------------------------------------------------------

    #[test]
    fn trim_is_relative_to_speed_altered_duration() {
        let input = tone(1_000, 16_000);
        let decision = AugmentationDecision {
            speed_factor: Some(2.0),
            trim: Some(TrimWindow {
                start_ms: 100,
                end_ms: 400,
            }),
            ..Default::default()
        };
        let out = AugmentationPolicy::apply_decision(&input, &decision).unwrap();
        assert_eq!(out.duration_ms(), 300);
    }

    #[test]
    fn sampled_trim_fits_post_speed_duration() {
        let policy = only(|c| {
            c.speed = EffectConfig::new(1.0, 1.2, 1.2);
            c.trim = c.trim.always();
        });
        let input = tone(1_200, 16_000);
        let out = policy.apply(&input, &mut StdRng::seed_from_u64(4)).unwrap();
        let w = out.decision.trim.unwrap();
        // 1 200 ms at ×1.2 → 1 000 ms before trimming
        assert!(w.end_ms <= 1_000 && w.end_ms >= 800, "{w:?}");
    }

    // ---- Determinism / replay ----------------------------------------------

    #[test]
    fn same_seed_same_result() {
        let policy = AugmentationPolicy::new(AugmentConfig::default()).unwrap();
        let input = tone(400, 22_050);
        let a = policy.apply(&input, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = policy.apply(&input, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn replaying_decision_reproduces_output() {
        let policy = AugmentationPolicy::new(AugmentConfig::default()).unwrap();
        let input = tone(400, 24_000);
        let mut rng = StdRng::seed_from_u64(123);
        for _ in 0..10 {
            let out = policy.apply(&input, &mut rng).unwrap();
            let replayed = AugmentationPolicy::apply_decision(&input, &out.decision).unwrap();
            assert_eq!(replayed, out.buffer);
        }
    }

    #[test]
    fn input_buffer_is_not_modified() {
        let policy = AugmentationPolicy::new(AugmentConfig::default()).unwrap();
        let input = tone(300, 16_000);
        let snapshot = input.clone();
        let _ = policy.apply(&input, &mut StdRng::seed_from_u64(8)).unwrap();
        assert_eq!(input, snapshot);
    }
}
