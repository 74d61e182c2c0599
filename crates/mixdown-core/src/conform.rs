use anyhow::{Context, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::{debug, instrument};

use crate::clip::{AudioClip, ClipFormat};

/// Converts `clip` to the rate and channel layout of `target`, tagging it with the target depth.
#[instrument(skip(clip), fields(
    from_rate = clip.sample_rate(),
    from_channels = clip.channels(),
    to_rate = target.sample_rate,
    to_channels = target.channels
))]
pub fn conform_to(clip: AudioClip, target: ClipFormat) -> Result<AudioClip> {
    let source = clip.format();
    if source.is_layout_compatible(&target) {
        return Ok(clip.with_depth(target.depth));
    }

    let remapped = remap_channels(
        clip.samples(),
        usize::from(source.channels),
        usize::from(target.channels),
    );
    let resampled = resample_interleaved(
        &remapped,
        usize::from(target.channels),
        source.sample_rate,
        target.sample_rate,
    )?;

    let conformed = AudioClip::new(target, resampled).context("conformed clip is malformed")?;
    debug!(
        frames_before = clip.frames(),
        frames_after = conformed.frames(),
        "clip conformed"
    );
    Ok(conformed)
}

fn remap_channels(samples: &[f32], from: usize, to: usize) -> Vec<f32> {
    if from == to {
        return samples.to_vec();
    }

    let frames = samples.len() / from;
    let mut output = Vec::with_capacity(frames * to);
    for frame in samples.chunks(from) {
        if to == 1 {
            let sum: f32 = frame.iter().copied().sum();
            output.push(sum / from as f32);
        } else {
            output.extend((0..to).map(|channel| frame[channel % from]));
        }
    }
    output
}

const CALIBRATION_FRAMES: usize = 1_024;
const CALIBRATION_IMPULSE_AT: usize = 256;

fn sinc_parameters() -> SincInterpolationParameters {
    SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    }
}

/// Runs one chunk plus a flush through a fresh resampler, one `Vec` per channel.
fn run_resampler(ratio: f64, channel_buffers: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
    let chunk_frames = channel_buffers.first().map_or(0, Vec::len);
    let mut resampler = SincFixedIn::<f32>::new(
        ratio,
        2.0,
        sinc_parameters(),
        chunk_frames,
        channel_buffers.len(),
    )
    .context("failed to create resampler")?;

    let mut resampled = resampler
        .process(channel_buffers, None)
        .context("resampling failed")?;
    let tail = resampler
        .process_partial(None::<&[Vec<f32>]>, None)
        .context("resampler flush failed")?;
    for (channel, rest) in resampled.iter_mut().zip(tail) {
        channel.extend(rest);
    }
    Ok(resampled)
}

/// Output frames by which the resampler lags its input, measured with a unit impulse.
///
/// The lag depends on the ratio and the sinc parameters only, not on the chunk length.
fn measured_output_lag(ratio: f64) -> Result<usize> {
    let mut impulse = vec![0.0_f32; CALIBRATION_FRAMES];
    impulse[CALIBRATION_IMPULSE_AT] = 1.0;
    let response = run_resampler(ratio, &[impulse])?;

    let peak_index = response[0]
        .iter()
        .enumerate()
        .max_by(|(_, left), (_, right)| left.abs().total_cmp(&right.abs()))
        .map_or(0, |(index, _)| index);
    let ideal_index = (CALIBRATION_IMPULSE_AT as f64 * ratio).round() as usize;
    Ok(peak_index.saturating_sub(ideal_index))
}

fn resample_interleaved(
    samples: &[f32],
    channels: usize,
    from_rate: u32,
    to_rate: u32,
) -> Result<Vec<f32>> {
    if from_rate == to_rate {
        return Ok(samples.to_vec());
    }

    let frames = samples.len() / channels;
    if frames == 0 {
        return Ok(Vec::new());
    }
    let ratio = f64::from(to_rate) / f64::from(from_rate);
    let expected_frames = (frames as f64 * ratio).round() as usize;

    let mut channel_buffers: Vec<Vec<f32>> = vec![Vec::with_capacity(frames); channels];
    for (index, &sample) in samples.iter().enumerate() {
        channel_buffers[index % channels].push(sample);
    }

    let lag = measured_output_lag(ratio)?;
    let resampled = run_resampler(ratio, &channel_buffers)?;
    debug!(lag, ratio, "resampler lag trimmed");

    let mut output = Vec::with_capacity(expected_frames * channels);
    for frame_index in lag..lag + expected_frames {
        for channel in &resampled {
            output.push(channel.get(frame_index).copied().unwrap_or(0.0));
        }
    }
    Ok(output)
}
