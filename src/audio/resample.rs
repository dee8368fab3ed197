//! Sample-rate conversion.
//!
//! Every speed / pitch augmentation ends by converting the reinterpreted
//! buffer back to the **canonical 16 kHz** rate.  The conversion runs a
//! windowed-sinc resampler from `rubato` (`SincFixedIn` + `BlackmanHarris2`)
//! over the whole clip in a single chunk, then flushes the filter tail and
//! strips the filter delay so the output lines up with the input in time.
//!
//! The output length is `round(frames * target_rate / source_rate)`, never
//! less than one frame.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use super::AudioError;

/// Rate every speed- or pitch-altered clip is normalised to.
pub const CANONICAL_SAMPLE_RATE: u32 = 16_000;

fn sinc_params() -> SincInterpolationParameters {
    SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    }
}

// ---------------------------------------------------------------------------
// resample_channels
// ---------------------------------------------------------------------------

/// Resample planar (one `Vec` per channel) `f32` audio from `source_rate`
/// to `target_rate` Hz.
///
/// * Equal rates return a copy of the input (no filtering performed).
/// * Empty channels return empty channels.
///
/// # Errors
///
/// [`AudioError::Resample`] for zero rates, ragged channels, or a failure
/// reported by `rubato`.
pub fn resample_channels(
    planar: &[Vec<f32>],
    source_rate: u32,
    target_rate: u32,
) -> Result<Vec<Vec<f32>>, AudioError> {
    if source_rate == 0 || target_rate == 0 {
        return Err(AudioError::Resample("sample rates must be > 0".into()));
    }
    if source_rate == target_rate {
        return Ok(planar.to_vec());
    }

    let frames = planar.first().map_or(0, Vec::len);
    if planar.iter().any(|c| c.len() != frames) {
        return Err(AudioError::Resample("channels differ in length".into()));
    }
    if frames == 0 {
        return Ok(vec![Vec::new(); planar.len()]);
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let expected = ((frames as f64 * ratio).round() as usize).max(1);

    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, sinc_params(), frames, planar.len())
        .map_err(|e| AudioError::Resample(e.to_string()))?;
    let delay = resampler.output_delay();
    let wanted = expected + delay;

    let mut output = resampler
        .process(planar, None)
        .map_err(|e| AudioError::Resample(e.to_string()))?;

    // Each flush pushes one chunk of zeros through the filter.
    let max_flushes = (wanted as f64 / (frames as f64 * ratio)).ceil() as usize + 2;
    for _ in 0..max_flushes {
        if output[0].len() >= wanted {
            break;
        }
        let tail = resampler
            .process_partial(None::<&[Vec<f32>]>, None)
            .map_err(|e| AudioError::Resample(e.to_string()))?;
        for (channel, rest) in output.iter_mut().zip(tail) {
            channel.extend(rest);
        }
    }

    for channel in &mut output {
        channel.drain(..delay.min(channel.len()));
        channel.resize(expected, 0.0);
    }

    Ok(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn mono(samples: Vec<f32>) -> Vec<Vec<f32>> {
        vec![samples]
    }

    #[test]
    fn same_rate_is_noop() {
        let input: Vec<f32> = (0..160).map(|i| i as f32 / 160.0).collect();
        let out = resample_channels(&mono(input.clone()), 16_000, 16_000).unwrap();
        assert_eq!(out[0], input);
    }

    #[test]
    fn empty_input() {
        let out = resample_channels(&mono(Vec::new()), 48_000, 16_000).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].is_empty());
    }

    #[test]
    fn zero_rate_rejected() {
        let err = resample_channels(&mono(vec![0.0; 10]), 0, 16_000).unwrap_err();
        assert!(matches!(err, AudioError::Resample(_)));
    }

    #[test]
    fn ragged_channels_rejected() {
        let planar = vec![vec![0.0; 10], vec![0.0; 9]];
        assert!(resample_channels(&planar, 48_000, 16_000).is_err());
    }

    #[test]
    fn downsample_48k_output_length() {
        // 480 samples @ 48 kHz = 10 ms → 160 samples @ 16 kHz
        let out = resample_channels(&mono(vec![0.5; 480]), 48_000, 16_000).unwrap();
        assert_eq!(out[0].len(), 160);
    }

    #[test]
    fn downsample_44100_output_length() {
        let out = resample_channels(&mono(vec![0.0; 44_100]), 44_100, 16_000).unwrap();
        assert_eq!(out[0].len(), 16_000);
    }

    #[test]
    fn upsample_8k_output_length() {
        let out = resample_channels(&mono(vec![0.0; 80]), 8_000, 16_000).unwrap();
        assert_eq!(out[0].len(), 160);
    }

    #[test]
    fn tiny_input_yields_at_least_one_frame() {
        let out = resample_channels(&mono(vec![0.1]), 48_000, 16_000).unwrap();
        assert_eq!(out[0].len(), 1);
    }

    #[test]
    fn dc_level_preserved_away_from_edges() {
        let out = resample_channels(&mono(vec![0.5; 4_800]), 48_000, 16_000).unwrap();
        let body = &out[0][200..1_400];
        for &s in body {
            assert!((s - 0.5).abs() < 0.01, "amplitude drift: {s}");
        }
    }

    #[test]
    fn channels_resampled_independently() {
        let planar = vec![vec![0.25; 2_205], vec![-0.25; 2_205]];
        let out = resample_channels(&planar, 22_050, 16_000).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].len(), 1_600);
        assert!(out[0][800] > 0.2);
        assert!(out[1][800] < -0.2);
    }
}
