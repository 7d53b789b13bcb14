/// Sound engine: procedural chiptune effects via rodio.
///
/// Fixed effects are rendered to in-memory WAV buffers at init time; the
/// merge chime is rendered per play because its pitch follows the tile.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Build without the "sound" feature to disable audio entirely (the stub
/// SoundEngine does nothing).

use std::f32::consts::PI;

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
const SAMPLE_RATE: u32 = 22050;

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::{gen_achievement, gen_level_up, gen_lose, gen_merge, gen_slide, gen_undo, gen_win, make_wav};

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_slide: Arc<Vec<u8>>,
        sfx_undo: Arc<Vec<u8>>,
        sfx_win: Arc<Vec<u8>>,
        sfx_lose: Arc<Vec<u8>>,
        sfx_achievement: Arc<Vec<u8>>,
        sfx_level_up: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::info!("no audio output, sound disabled: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_slide: Arc::new(make_wav(&gen_slide())),
                sfx_undo: Arc::new(make_wav(&gen_undo())),
                sfx_win: Arc::new(make_wav(&gen_win())),
                sfx_lose: Arc::new(make_wav(&gen_lose())),
                sfx_achievement: Arc::new(make_wav(&gen_achievement())),
                sfx_level_up: Arc::new(make_wav(&gen_level_up())),
            })
        }

        fn play_bytes(&self, bytes: Vec<u8>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                if let Ok(src) = rodio::Decoder::new(Cursor::new(bytes)) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            self.play_bytes(buf.as_ref().clone());
        }

        /// Chime whose pitch climbs with the merged tile's exponent.
        pub fn play_merge(&self, value: u32) {
            self.play_bytes(make_wav(&gen_merge(value)));
        }

        pub fn play_slide(&self) { self.play(&self.sfx_slide); }
        pub fn play_undo(&self) { self.play(&self.sfx_undo); }
        pub fn play_win(&self) { self.play(&self.sfx_win); }
        pub fn play_lose(&self) { self.play(&self.sfx_lose); }
        pub fn play_achievement(&self) { self.play(&self.sfx_achievement); }
        pub fn play_level_up(&self) { self.play(&self.sfx_level_up); }
    }
}

// ════════════════════════════════════════════════════════════
//  Waveform generators: all produce Vec<f32> mono samples
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn samples_for(duration: f32) -> usize {
    (SAMPLE_RATE as f32 * duration) as usize
}

/// Play `notes` back to back. Each note is (frequency, seconds); the
/// partials are (harmonic multiple, weight) pairs.
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn note_run(notes: &[(f32, f32)], partials: &[(f32, f32)], volume: f32) -> Vec<f32> {
    let mut samples = Vec::new();
    for &(freq, dur) in notes {
        let n = samples_for(dur);
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32).powf(0.5);
            let wave: f32 = partials
                .iter()
                .map(|&(mult, weight)| (t * freq * mult * 2.0 * PI).sin() * weight)
                .sum();
            samples.push(wave * env * volume);
        }
    }
    samples
}

/// Slide: soft filtered-noise swoosh
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_slide() -> Vec<f32> {
    let n = samples_for(0.06);
    let mut rng: u32 = 2048;
    let mut prev = 0.0_f32;
    (0..n)
        .map(|i| {
            let t = i as f32 / n as f32;
            // Simple LCG noise through a one-pole low-pass
            rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
            let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
            prev += (noise - prev) * 0.2;
            let env = (t * PI).sin();
            prev * env * 0.25
        })
        .collect()
}

/// Merge: pitch rises a semitone-and-a-bit per doubling
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_merge(value: u32) -> Vec<f32> {
    let exp = value.max(2).trailing_zeros() as f32;
    let freq = 330.0 * 2f32.powf(exp / 8.0);
    note_run(&[(freq, 0.07)], &[(1.0, 0.7), (2.0, 0.3)], 0.25)
}

/// Undo: short two-step drop
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_undo() -> Vec<f32> {
    note_run(&[(660.0, 0.04), (440.0, 0.05)], &[(1.0, 1.0)], 0.2)
}

/// Level target reached: ascending fanfare C5→E5→G5→C6 with a held top
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_win() -> Vec<f32> {
    let notes = [(523.0, 0.1), (659.0, 0.1), (784.0, 0.1), (1047.0, 0.35)];
    note_run(&notes, &[(1.0, 0.6), (2.0, 0.3), (3.0, 0.1)], 0.3)
}

/// Game over: sad descending A4→F#4→Eb4→C4 with a tail fade
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_lose() -> Vec<f32> {
    let notes = [(440.0, 0.12), (370.0, 0.12), (311.0, 0.12), (261.0, 0.2)];
    let mut samples = note_run(&notes, &[(1.0, 1.0)], 0.3);
    let total = samples.len();
    let fade_len = total / 4;
    for (k, s) in samples[total - fade_len..].iter_mut().enumerate() {
        *s *= 1.0 - k as f32 / fade_len as f32;
    }
    samples
}

/// Achievement: bright two-note chime G5, C6
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_achievement() -> Vec<f32> {
    note_run(&[(784.0, 0.08), (1047.0, 0.15)], &[(1.0, 0.7), (2.0, 0.3)], 0.3)
}

/// Level up: quick arpeggio C6→E6→G6→C7
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn gen_level_up() -> Vec<f32> {
    let notes = [(1047.0, 0.05), (1319.0, 0.05), (1568.0, 0.05), (2093.0, 0.12)];
    note_run(&notes, &[(1.0, 0.7), (3.0, 0.3)], 0.25)
}

// ════════════════════════════════════════════════════════════
//  WAV encoder: wraps f32 samples into a 16-bit PCM buffer
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
fn make_wav(samples: &[f32]) -> Vec<u8> {
    let num_channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let byte_rate = SAMPLE_RATE * num_channels as u32 * bits_per_sample as u32 / 8;
    let block_align = num_channels * bits_per_sample / 8;
    let data_size = samples.len() as u32 * 2;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_size).to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes());  // PCM
    buf.extend_from_slice(&num_channels.to_le_bytes());
    buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &s in samples {
        let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
        buf.extend_from_slice(&val.to_le_bytes());
    }
    buf
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_merge(&self, _value: u32) {}
    pub fn play_slide(&self) {}
    pub fn play_undo(&self) {}
    pub fn play_win(&self) {}
    pub fn play_lose(&self) {}
    pub fn play_achievement(&self) {}
    pub fn play_level_up(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_header_is_well_formed() {
        let wav = make_wav(&[0.0, 0.5, -0.5, 2.0]);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(wav.len(), 44 + 8);
        assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 8);
        // Out-of-range sample clamps to full scale.
        assert_eq!(i16::from_le_bytes([wav[50], wav[51]]), 32767);
    }

    #[test]
    fn effects_stay_in_range() {
        for samples in [gen_slide(), gen_merge(2048), gen_undo(), gen_win(), gen_lose(), gen_achievement(), gen_level_up()] {
            assert!(!samples.is_empty());
            assert!(samples.iter().all(|s| s.abs() <= 1.0));
        }
    }

    #[test]
    fn bigger_merges_ring_higher() {
        // Count zero crossings as a pitch proxy.
        let crossings = |s: &[f32]| s.windows(2).filter(|w| (w[0] < 0.0) != (w[1] < 0.0)).count();
        assert!(crossings(&gen_merge(2048)) > crossings(&gen_merge(4)));
    }
}
