//! Offline WAV rendering.
//!
//! Renders run the same generators as live playback, one 4096-frame chunk at
//! a time, and write 16-bit PCM. Volume is the only difference from the live
//! path: the device applies it live, here it scales each sample before
//! quantization.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use reposo_core::{
    NoiseGenerator, NoiseProfile, ToneGenerator, ToneParams, apply_gain, sample_to_i16,
};

use crate::Result;

/// Frames generated per chunk.
pub const RENDER_CHUNK_FRAMES: usize = 4096;

/// What a render wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSummary {
    /// Frames per channel.
    pub frames: u64,
    /// Interleaved channel count.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Size of the `data` chunk in bytes.
    pub data_bytes: u64,
}

/// Render `duration_secs` of the tone described by `params` as 16-bit WAV.
///
/// Mono for AM, isochronic and monaural, stereo for binaural. `progress`
/// receives `(frames_done, frames_total)` after every chunk.
///
/// ```rust
/// use std::io::Cursor;
/// use reposo_core::{ToneMode, ToneParams};
///
/// let params = ToneParams::new(6.0, 200.0, 0.4, ToneMode::Binaural, 0.5);
/// let mut wav = Cursor::new(Vec::new());
/// let summary = reposo_io::render_tone_wav(&mut wav, &params, 8000, 1, |_, _| {})?;
/// assert_eq!(summary.channels, 2);
/// assert_eq!(summary.data_bytes, 8000 * 2 * 2);
/// # Ok::<(), reposo_io::Error>(())
/// ```
pub fn render_tone_wav<W: Write + Seek>(
    writer: W,
    params: &ToneParams,
    sample_rate: u32,
    duration_secs: u32,
    mut progress: impl FnMut(u64, u64),
) -> Result<RenderSummary> {
    let mut generator = ToneGenerator::new(f64::from(sample_rate), params);
    let summary = write_pcm16(
        writer,
        sample_rate,
        generator.channels(),
        duration_secs,
        params.volume(),
        |chunk| generator.render(params, chunk),
        &mut progress,
    )?;
    tracing::info!(
        mode = %params.mode(),
        beat_hz = params.beat_hz(),
        carrier_hz = params.carrier_hz(),
        frames = summary.frames,
        "tone render complete"
    );
    Ok(summary)
}

/// [`render_tone_wav`] into a new file at `path`.
pub fn render_tone_to_file<P: AsRef<Path>>(
    path: P,
    params: &ToneParams,
    sample_rate: u32,
    duration_secs: u32,
    progress: impl FnMut(u64, u64),
) -> Result<RenderSummary> {
    let file = BufWriter::new(File::create(path)?);
    render_tone_wav(file, params, sample_rate, duration_secs, progress)
}

/// Render `duration_secs` of seeded ambience as mono 16-bit WAV.
///
/// Equal seeds produce byte-identical files.
pub fn render_noise_wav<W: Write + Seek>(
    writer: W,
    profile: NoiseProfile,
    volume: f32,
    seed: u64,
    sample_rate: u32,
    duration_secs: u32,
    mut progress: impl FnMut(u64, u64),
) -> Result<RenderSummary> {
    let mut generator = NoiseGenerator::new(profile, sample_rate, seed);
    let summary = write_pcm16(
        writer,
        sample_rate,
        1,
        duration_secs,
        reposo_core::clamp_volume(volume),
        |chunk| generator.render(chunk),
        &mut progress,
    )?;
    tracing::info!(profile = %profile, seed, frames = summary.frames, "ambience render complete");
    Ok(summary)
}

/// [`render_noise_wav`] into a new file at `path`.
pub fn render_noise_to_file<P: AsRef<Path>>(
    path: P,
    profile: NoiseProfile,
    volume: f32,
    seed: u64,
    sample_rate: u32,
    duration_secs: u32,
    progress: impl FnMut(u64, u64),
) -> Result<RenderSummary> {
    let file = BufWriter::new(File::create(path)?);
    render_noise_wav(file, profile, volume, seed, sample_rate, duration_secs, progress)
}

fn write_pcm16<W, F>(
    writer: W,
    sample_rate: u32,
    channels: u16,
    duration_secs: u32,
    volume: f32,
    mut fill: F,
    progress: &mut dyn FnMut(u64, u64),
) -> Result<RenderSummary>
where
    W: Write + Seek,
    F: FnMut(&mut [f32]),
{
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut wav = WavWriter::new(writer, spec)?;

    let ch = usize::from(channels);
    let total = u64::from(sample_rate) * u64::from(duration_secs);
    let mut buffer = vec![0.0f32; RENDER_CHUNK_FRAMES * ch];
    let mut done = 0u64;

    while done < total {
        let frames = (total - done).min(RENDER_CHUNK_FRAMES as u64) as usize;
        let chunk = &mut buffer[..frames * ch];
        fill(chunk);
        apply_gain(chunk, volume);
        for &sample in chunk.iter() {
            wav.write_sample(sample_to_i16(sample))?;
        }
        done += frames as u64;
        progress(done, total);
    }
    wav.finalize()?;

    Ok(RenderSummary {
        frames: total,
        channels,
        sample_rate,
        data_bytes: total * u64::from(channels) * 2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reposo_core::ToneMode;
    use std::io::Cursor;

    /// Offset of the `data` payload and the chunk's declared size.
    fn data_chunk(bytes: &[u8]) -> Option<(usize, u32)> {
        let mut pos = 12;
        while pos + 8 <= bytes.len() {
            let id = &bytes[pos..pos + 4];
            let size = u32::from_le_bytes(bytes[pos + 4..pos + 8].try_into().ok()?);
            if id == b"data" {
                return Some((pos + 8, size));
            }
            pos += 8 + size as usize;
        }
        None
    }

    fn data_chunk_size(bytes: &[u8]) -> Option<u32> {
        data_chunk(bytes).map(|(_, size)| size)
    }

    fn render(params: &ToneParams, sample_rate: u32, secs: u32) -> (Vec<u8>, RenderSummary) {
        let mut cursor = Cursor::new(Vec::new());
        let summary = render_tone_wav(&mut cursor, params, sample_rate, secs, |_, _| {}).unwrap();
        (cursor.into_inner(), summary)
    }

    #[test]
    fn header_matches_mode() {
        for mode in ToneMode::ALL {
            let params = ToneParams::new(6.0, 200.0, 0.4, mode, 0.5);
            let (bytes, summary) = render(&params, 8000, 2);
            let expected = 8000 * 2 * u32::from(mode.channels()) * 2;
            assert_eq!(data_chunk_size(&bytes), Some(expected), "{mode}");
            assert_eq!(summary.data_bytes, u64::from(expected));

            let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
            assert_eq!(reader.spec().channels, mode.channels());
            assert_eq!(reader.spec().bits_per_sample, 16);
            assert_eq!(reader.spec().sample_rate, 8000);
        }
    }

    #[test]
    fn tone_render_is_reproducible() {
        for mode in ToneMode::ALL {
            let params = ToneParams::new(7.5, 180.0, 0.6, mode, 0.8);
            let (first, _) = render(&params, 8000, 1);
            let (second, _) = render(&params, 8000, 1);
            assert_eq!(first, second, "{mode}");
        }
    }

    #[test]
    fn declared_data_size_matches_written_bytes() {
        for mode in ToneMode::ALL {
            let params = ToneParams::new(6.0, 200.0, 0.4, mode, 0.5);
            let (bytes, summary) = render(&params, 8000, 2);
            let (offset, size) = data_chunk(&bytes).unwrap();
            assert_eq!(size as usize, bytes.len() - offset, "{mode}");
            assert_eq!(u64::from(size), summary.data_bytes);
        }
    }

    #[test]
    fn progress_reaches_total() {
        let params = ToneParams::default();
        let mut last = (0, 0);
        let mut calls = 0;
        render_tone_wav(Cursor::new(Vec::new()), &params, 10_000, 1, |done, total| {
            last = (done, total);
            calls += 1;
        })
        .unwrap();
        assert_eq!(last, (10_000, 10_000));
        assert_eq!(calls, 3);
    }

    #[test]
    fn volume_scales_samples() {
        let quiet = ToneParams::new(6.0, 200.0, 0.4, ToneMode::Am, 0.0);
        let (bytes, _) = render(&quiet, 8000, 1);
        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert!(reader.into_samples::<i16>().all(|s| s.unwrap() == 0));
    }

    #[test]
    fn render_matches_generator_output() {
        let params = ToneParams::new(8.0, 240.0, 0.5, ToneMode::Isochronic, 1.0);
        let (bytes, _) = render(&params, 8000, 1);
        let rendered: Vec<i16> = hound::WavReader::new(Cursor::new(bytes))
            .unwrap()
            .into_samples::<i16>()
            .map(|s| s.unwrap())
            .collect();

        // Live playback fills 2048-sample buffers; the result must not depend
        // on chunking.
        let mut generator = ToneGenerator::new(8000.0, &params);
        let mut live = vec![0.0f32; 8000];
        for chunk in live.chunks_mut(2048) {
            generator.render(&params, chunk);
        }
        let live: Vec<i16> = live.iter().map(|&s| sample_to_i16(s)).collect();
        assert_eq!(rendered, live);
    }

    #[test]
    fn noise_render_is_seeded() {
        let render = |seed| {
            let mut cursor = Cursor::new(Vec::new());
            render_noise_wav(&mut cursor, NoiseProfile::River, 0.4, seed, 8000, 1, |_, _| {})
                .unwrap();
            cursor.into_inner()
        };
        assert_eq!(render(11), render(11));
        assert_ne!(render(11), render(12));
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let summary =
            render_tone_to_file(&path, &ToneParams::default(), 8000, 1, |_, _| {}).unwrap();
        let info = hound::WavReader::open(&path).unwrap();
        assert_eq!(u64::from(info.len()), summary.frames);
    }
}
