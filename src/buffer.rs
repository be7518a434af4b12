//! PCM sample buffer and the time-domain operations the mixer is built from.
//!
//! Samples are `f32` in nominal [-1.0, 1.0], interleaved when there is more
//! than one channel. Positions and durations are given in milliseconds and
//! converted to frames with integer floor division, so a buffer created for
//! `n` ms always holds `n * sample_rate / 1000` frames.

use crate::error::{Result, SynthError};
use crate::filter::db_to_amplitude;

pub const SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        AudioBuffer { samples, sample_rate, channels: channels.max(1) }
    }

    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::new(samples, sample_rate, 1)
    }

    pub fn empty(sample_rate: u32) -> Self {
        Self::mono(Vec::new(), sample_rate)
    }

    pub fn silent(duration_ms: u64, sample_rate: u32) -> Self {
        Self::mono(vec![0.0; Self::frames_for_ms(duration_ms, sample_rate)], sample_rate)
    }

    #[inline]
    pub fn frames_for_ms(duration_ms: u64, sample_rate: u32) -> usize {
        (duration_ms * sample_rate as u64 / 1000) as usize
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length rounded to the nearest millisecond.
    pub fn duration_ms(&self) -> u64 {
        let sr = self.sample_rate as u64;
        (self.frames() as u64 * 1000 + sr / 2) / sr
    }

    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }

    fn offset_for_ms(&self, position_ms: u64) -> usize {
        Self::frames_for_ms(position_ms, self.sample_rate) * self.channels as usize
    }

    fn check_compatible(&self, other: &AudioBuffer) -> Result<()> {
        if self.sample_rate != other.sample_rate {
            return Err(SynthError::computation(
                "overlay",
                format!("sample rate mismatch: {} Hz vs {} Hz", self.sample_rate, other.sample_rate),
            ));
        }
        if self.channels != other.channels {
            return Err(SynthError::computation(
                "overlay",
                format!("channel count mismatch: {} vs {}", self.channels, other.channels),
            ));
        }
        Ok(())
    }

    /// Sums `other` into this buffer starting at `position_ms`. Anything that
    /// would run past the end of `self` is dropped; the length never changes.
    pub fn mix_at(&mut self, other: &AudioBuffer, position_ms: u64) -> Result<()> {
        self.check_compatible(other)?;
        let start = self.offset_for_ms(position_ms);
        if let Some(dst) = self.samples.get_mut(start..) {
            for (d, s) in dst.iter_mut().zip(other.samples.iter()) {
                *d += *s;
            }
        }
        Ok(())
    }

    /// Time-aligned sum of `self` and `other` placed at `position_ms`. The
    /// result keeps the length of `self`.
    pub fn overlay(&self, other: &AudioBuffer, position_ms: u64) -> Result<AudioBuffer> {
        let mut out = self.clone();
        out.mix_at(other, position_ms)?;
        Ok(out)
    }

    /// Like [`overlay`](Self::overlay), but `self` is scaled by `gain_db` over
    /// the stretch that `other` covers.
    pub fn overlay_with_gain(&self, other: &AudioBuffer, position_ms: u64, gain_db: f32) -> Result<AudioBuffer> {
        self.check_compatible(other)?;
        let mut out = self.clone();
        let start = out.offset_for_ms(position_ms).min(out.samples.len());
        let end = (start + other.samples.len()).min(out.samples.len());
        let gain = db_to_amplitude(gain_db);
        for s in &mut out.samples[start..end] {
            *s *= gain;
        }
        out.mix_at(other, position_ms)?;
        Ok(out)
    }

    pub fn append(&mut self, other: &AudioBuffer) -> Result<()> {
        self.check_compatible(other)?;
        self.samples.extend_from_slice(&other.samples);
        Ok(())
    }

    pub fn concat(parts: &[AudioBuffer], sample_rate: u32) -> Result<AudioBuffer> {
        let mut out = Self::empty(sample_rate);
        if let Some(first) = parts.first() {
            out.channels = first.channels;
        }
        out.samples.reserve(parts.iter().map(|p| p.samples.len()).sum());
        for part in parts {
            out.append(part)?;
        }
        Ok(out)
    }

    /// Copy of the `[start_ms, end_ms)` window, clamped to the buffer.
    pub fn slice(&self, start_ms: u64, end_ms: u64) -> AudioBuffer {
        let start = self.offset_for_ms(start_ms).min(self.samples.len());
        let end = self.offset_for_ms(end_ms).clamp(start, self.samples.len());
        Self::new(self.samples[start..end].to_vec(), self.sample_rate, self.channels)
    }

    /// Zero-pads (never truncates) up to `frames` frames.
    pub fn pad_to_frames(&mut self, frames: usize) {
        let target = frames * self.channels as usize;
        if self.samples.len() < target {
            self.samples.resize(target, 0.0);
        }
    }

    pub fn apply_gain(&self, gain_db: f32) -> AudioBuffer {
        let gain = db_to_amplitude(gain_db);
        let samples = self.samples.iter().map(|s| s * gain).collect();
        Self::new(samples, self.sample_rate, self.channels)
    }

    pub fn repeat(&self, times: usize) -> AudioBuffer {
        Self::new(self.samples.repeat(times), self.sample_rate, self.channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(frames: usize) -> AudioBuffer {
        AudioBuffer::mono((0..frames).map(|i| i as f32 / frames as f32).collect(), 1000)
    }

    #[test]
    fn test_silent_frame_count() {
        let buf = AudioBuffer::silent(1000, SAMPLE_RATE);
        assert_eq!(buf.frames(), 44_100);
        assert_eq!(buf.duration_ms(), 1000);
        assert!(buf.samples().iter().all(|&s| s == 0.0));

        let buf = AudioBuffer::silent(333, SAMPLE_RATE);
        assert_eq!(buf.frames(), 14_685);
        assert_eq!(buf.duration_ms(), 333);

        assert!(AudioBuffer::silent(0, SAMPLE_RATE).is_empty());
    }

    #[test]
    fn test_overlay_keeps_base_length() {
        // 1 kHz sample rate, so 1 ms == 1 frame
        let base = AudioBuffer::mono(vec![1.0; 10], 1000);
        let top = AudioBuffer::mono(vec![0.5; 4], 1000);

        let out = base.overlay(&top, 8).unwrap();
        assert_eq!(out.frames(), 10);
        assert_eq!(&out.samples()[..8], &[1.0; 8]);
        assert_eq!(&out.samples()[8..], &[1.5, 1.5]);

        let past_end = base.overlay(&top, 20).unwrap();
        assert_eq!(past_end, base);
    }

    #[test]
    fn test_overlay_with_gain_only_scales_covered_region() {
        let base = AudioBuffer::mono(vec![1.0; 6], 1000);
        let top = AudioBuffer::mono(vec![0.0; 2], 1000);

        let out = base.overlay_with_gain(&top, 2, -6.0206).unwrap();
        let s = out.samples();
        assert_eq!(s[0], 1.0);
        assert!((s[2] - 0.5).abs() < 1e-3);
        assert!((s[3] - 0.5).abs() < 1e-3);
        assert_eq!(s[4], 1.0);
    }

    #[test]
    fn test_mismatched_rates_are_computation_errors() {
        let a = AudioBuffer::silent(10, 1000);
        let b = AudioBuffer::silent(10, 2000);
        match a.overlay(&b, 0) {
            Err(SynthError::ComputationError { stage, .. }) => assert_eq!(stage, "overlay"),
            other => panic!("expected computation error, got {:?}", other),
        }

        let stereo = AudioBuffer::new(vec![0.0; 20], 1000, 2);
        assert!(matches!(a.overlay(&stereo, 0), Err(SynthError::ComputationError { .. })));
    }

    #[test]
    fn test_concat_slice_repeat() {
        let a = ramp(5);
        let b = AudioBuffer::mono(vec![-1.0; 3], 1000);
        let joined = AudioBuffer::concat(&[a.clone(), b.clone()], 1000).unwrap();
        assert_eq!(joined.frames(), 8);
        assert_eq!(joined.slice(0, 5), a);
        assert_eq!(joined.slice(5, 100), b);
        assert!(joined.slice(50, 100).is_empty());

        let looped = b.repeat(3);
        assert_eq!(looped.frames(), 9);
        assert_eq!(AudioBuffer::concat(&[], 1000).unwrap(), AudioBuffer::empty(1000));
    }

    #[test]
    fn test_gain_and_padding() {
        let buf = AudioBuffer::mono(vec![0.5, -0.5], 1000);
        assert_eq!(buf.apply_gain(0.0), buf);
        let quieter = buf.apply_gain(-20.0);
        assert!((quieter.samples()[0] - 0.05).abs() < 1e-6);

        let mut padded = buf.clone();
        padded.pad_to_frames(4);
        assert_eq!(padded.samples(), &[0.5, -0.5, 0.0, 0.0]);
        padded.pad_to_frames(1);
        assert_eq!(padded.frames(), 4);
    }
}
