use std::{fs::File, io::ErrorKind, path::Path};

use anyhow::{Context, Result};
use symphonia::core::{
    audio::{AudioBufferRef, SampleBuffer},
    codecs::{CodecParameters, DecoderOptions},
    errors::Error as SymphoniaError,
    formats::FormatOptions,
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
    sample::SampleFormat,
};
use tracing::{debug, instrument, warn};

use crate::clip::{AudioClip, ClipFormat, SampleDepth};

#[instrument(fields(path = %path.display()))]
pub fn load_clip(path: &Path) -> Result<AudioClip> {
    let file = File::open(path)
        .with_context(|| format!("failed to open audio file: {}", path.display()))?;
    let source = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|value| value.to_str()) {
        hint.with_extension(extension);
    }

    let format_options = FormatOptions {
        enable_gapless: true,
        ..FormatOptions::default()
    };
    let probed = symphonia::default::get_probe()
        .format(&hint, source, &format_options, &MetadataOptions::default())
        .with_context(|| format!("unsupported audio container: {}", path.display()))?;
    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| anyhow::anyhow!("no default audio track found in {}", path.display()))?;
    let track_id = track.id;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .with_context(|| format!("unsupported audio codec in {}", path.display()))?;

    let depth = depth_from_codec(&track.codec_params);
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(48_000);
    let mut channels = track
        .codec_params
        .channels
        .map(|value| value.count() as u16)
        .unwrap_or(2);
    let mut samples = Vec::new();
    let mut skipped_packets = 0_usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(error)) if error.kind() == ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                return Err(anyhow::anyhow!(
                    "audio stream reset required for {}",
                    path.display()
                ));
            }
            Err(error) => return Err(error.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(reason)) => {
                skipped_packets += 1;
                debug!(reason, "skipping undecodable packet");
                continue;
            }
            Err(error) => return Err(error.into()),
        };

        let spec = *decoded.spec();
        let packet_channels = spec.channels.count() as u16;
        if !samples.is_empty() {
            ensure_stable_stream((sample_rate, channels), (spec.rate, packet_channels))
                .with_context(|| format!("unstable audio stream in {}", path.display()))?;
        }
        sample_rate = spec.rate;
        channels = packet_channels;
        push_interleaved_samples(decoded, &mut samples);
    }

    if samples.is_empty() {
        return Err(anyhow::anyhow!(
            "decoded zero samples from {}",
            path.display()
        ));
    }
    if skipped_packets > 0 {
        warn!(skipped_packets, "some packets could not be decoded");
    }

    let clip = AudioClip::new(ClipFormat::new(sample_rate, channels, depth), samples)
        .with_context(|| format!("decoded audio is malformed: {}", path.display()))?;
    debug!(
        sample_rate,
        channels,
        depth = ?depth,
        total_frames = clip.frames(),
        duration_ms = clip.duration_ms(),
        "audio decode complete"
    );
    Ok(clip)
}

fn ensure_stable_stream(established: (u32, u16), packet: (u32, u16)) -> Result<()> {
    let (rate, channels) = established;
    let (packet_rate, packet_channels) = packet;
    if packet_rate != rate {
        return Err(anyhow::anyhow!(
            "sample rate changed mid-stream from {rate} Hz to {packet_rate} Hz"
        ));
    }
    if packet_channels != channels {
        return Err(anyhow::anyhow!(
            "channel count changed mid-stream from {channels} to {packet_channels}"
        ));
    }
    Ok(())
}

fn push_interleaved_samples(decoded: AudioBufferRef<'_>, samples: &mut Vec<f32>) {
    let spec = *decoded.spec();
    let mut sample_buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
    sample_buffer.copy_interleaved_ref(decoded);
    samples.extend_from_slice(sample_buffer.samples());
}

fn depth_from_codec(params: &CodecParameters) -> SampleDepth {
    match (params.sample_format, params.bits_per_sample) {
        (Some(SampleFormat::F32 | SampleFormat::F64), _) => SampleDepth::Float32,
        (_, Some(bits)) if bits <= 16 => SampleDepth::Int16,
        (_, Some(bits)) if bits <= 24 => SampleDepth::Int24,
        (_, Some(_)) => SampleDepth::Int32,
        // Lossy codecs declare no depth.
        (_, None) => SampleDepth::Int16,
    }
}
