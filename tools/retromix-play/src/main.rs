//! Demo player for the retromix software mixer
//!
//! Loads sound effects from WAV files (or falls back to procedural blips),
//! synthesizes a short looping song, and sweeps the effects across pitch
//! and stereo separation through a real output device.
//!
//! # Usage
//!
//! ```bash
//! retromix-play                          # procedural effects + music
//! retromix-play shot.wav door.wav       # play the given WAVs as effects
//! retromix-play --config mixer.toml     # volumes/exclusive list from toml
//! retromix-play --no-music --seconds 5
//! ```

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use retromix::{EffectId, Mixer, MixerConfig, MusicSynth, SampleCache, SongId};

#[derive(Parser)]
#[command(name = "retromix-play")]
#[command(author, version, about = "Demo player for the retromix software mixer")]
struct Args {
    /// WAV files to register as effects 1..=N (mono or stereo, any bit depth)
    effects: Vec<PathBuf>,

    /// Mixer config file (toml: sfx_volume, music_volume, exclusive_effects)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// How long to play, in seconds
    #[arg(long, default_value = "10")]
    seconds: u64,

    /// Skip the synthesized music substream
    #[arg(long)]
    no_music: bool,

    /// Effect trigger interval in milliseconds
    #[arg(long, default_value = "400")]
    interval: u64,
}

/// Square-wave chiptune synth standing in for a real music renderer
///
/// Renders a four-note arpeggio loop as interleaved stereo 16-bit PCM,
/// length known up front, exactly the contract the mixer expects from an
/// external synthesizer.
struct ChipTuneSynth {
    sample_rate: u32,
}

impl MusicSynth for ChipTuneSynth {
    fn render(&self, song: SongId) -> Option<Vec<i16>> {
        if song != SongId(1) {
            return None;
        }

        const NOTES: [f64; 4] = [220.0, 277.18, 329.63, 440.0];
        let note_len = self.sample_rate as usize / 2;
        let mut pcm = Vec::with_capacity(NOTES.len() * note_len * 2);

        for &freq in &NOTES {
            let period = self.sample_rate as f64 / freq;
            for i in 0..note_len {
                // Square wave with a short linear decay per note
                let phase = (i as f64 / period).fract();
                let amp = 6000.0 * (1.0 - i as f64 / note_len as f64);
                let sample = if phase < 0.5 { amp } else { -amp } as i16;
                pcm.push(sample);
                pcm.push(sample);
            }
        }
        Some(pcm)
    }
}

/// Decode a WAV file to unsigned 8-bit mono PCM
fn load_wav_as_u8_mono(path: &PathBuf) -> Result<Vec<u8>> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    // Normalize every supported source format to i32 samples first
    let samples: Vec<i32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let shift = 32 - spec.bits_per_sample as i32;
            reader
                .samples::<i32>()
                .collect::<Result<Vec<_>, _>>()
                .context("bad WAV sample data")?
                .into_iter()
                .map(|s| s << shift)
                .collect()
        }
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .context("bad WAV sample data")?
            .into_iter()
            .map(|s| (s.clamp(-1.0, 1.0) * i32::MAX as f32) as i32)
            .collect(),
    };

    // Downmix to mono and quantize to biased 8-bit
    let pcm = samples
        .chunks(channels)
        .map(|frame| {
            let sum: i64 = frame.iter().map(|&s| s as i64).sum();
            let mono = (sum / channels as i64) as i32;
            ((mono >> 24) + 128) as u8
        })
        .collect();
    Ok(pcm)
}

/// Procedural stand-in effect: a decaying blip at the given frequency
fn blip(sample_rate: u32, freq: f64, len_ms: u32) -> Vec<u8> {
    let len = (sample_rate * len_ms / 1000) as usize;
    (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            let decay = 1.0 - i as f64 / len as f64;
            let s = (t * freq * std::f64::consts::TAU).sin() * decay * 100.0;
            (s as i32 + 128) as u8
        })
        .collect()
}

fn load_config(path: Option<&PathBuf>) -> Result<MixerConfig> {
    let Some(path) = path else {
        return Ok(MixerConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("bad mixer config in {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;

    const SAMPLE_RATE: u32 = 44_100;

    let mut cache = SampleCache::new();
    let mut effect_count = 0u16;
    for path in &args.effects {
        effect_count += 1;
        let pcm = load_wav_as_u8_mono(path)?;
        info!("effect {}: {} ({} samples)", effect_count, path.display(), pcm.len());
        cache.insert(EffectId(effect_count), &pcm);
    }
    if effect_count == 0 {
        // No WAVs given: register three procedural blips
        for freq in [440.0, 880.0, 1760.0] {
            effect_count += 1;
            cache.insert(EffectId(effect_count), &blip(SAMPLE_RATE, freq, 250));
        }
        info!("no WAV files given, using {effect_count} procedural blips");
    }
    cache.set_default(EffectId(1));

    let synth = ChipTuneSynth {
        sample_rate: SAMPLE_RATE,
    };
    let mut mixer = Mixer::new(&config, cache, Box::new(synth));
    if !mixer.has_output() {
        anyhow::bail!("no usable audio output device");
    }

    if !args.no_music {
        mixer.start_music(SongId(1));
    }

    // Sweep effects across pitch and the stereo field
    let steps = (args.seconds * 1000 / args.interval.max(1)).max(1);
    for i in 0..steps {
        let effect = EffectId((i % effect_count as u64) as u16 + 1);
        let pitch = 96 + ((i * 16) % 96) as u8; // 0.7x to ~2x playback rate
        let separation = ((i * 48) % 257) as i32;
        mixer.start_effect(effect, 127, pitch, separation)?;
        thread::sleep(Duration::from_millis(args.interval));
    }

    mixer.stop_music();
    mixer.shutdown();
    Ok(())
}
