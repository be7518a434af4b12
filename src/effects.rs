//! Post-mix effects.
//!
//! Both effects are whole-buffer overlays rather than running delay lines:
//! reverb adds the mix to itself pulled down by `decay` dB, echo folds a
//! gain-reduced copy of the first `delay_ms` back onto the start of the mix.
//! They are applied reverb first, then echo.

use crate::buffer::AudioBuffer;
use crate::error::{Result, SynthError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParams {
    pub decay: f32,
}

impl Default for ReverbParams {
    fn default() -> Self {
        ReverbParams { decay: 0.5 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EchoParams {
    pub delay_ms: u64,
    pub decay: f32,
}

impl Default for EchoParams {
    fn default() -> Self {
        EchoParams { delay_ms: 300, decay: 0.5 }
    }
}

pub(crate) fn check_decay(what: &str, decay: f32) -> Result<()> {
    if !(0.0..1.0).contains(&decay) {
        return Err(SynthError::validation(format!("{} decay {} is outside [0, 1)", what, decay)));
    }
    Ok(())
}

/// `buffer + buffer * -decay dB`. At `decay == 0` this doubles the amplitude.
pub fn reverb(buffer: &AudioBuffer, decay: f32) -> Result<AudioBuffer> {
    check_decay("reverb", decay)?;
    buffer.overlay(&buffer.apply_gain(-decay), 0)
}

/// Takes the first `delay_ms` of the buffer, attenuates it by `decay` dB while
/// the full buffer is laid over it, and sums that back onto the start of the
/// original. A `delay_ms` of zero means no window: the whole buffer is used.
pub fn echo(buffer: &AudioBuffer, delay_ms: u64, decay: f32) -> Result<AudioBuffer> {
    check_decay("echo", decay)?;
    let head = if delay_ms == 0 { buffer.clone() } else { buffer.slice(0, delay_ms) };
    let tail = head.overlay_with_gain(buffer, 0, -decay)?;
    buffer.overlay(&tail, 0)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectsChain {
    pub reverb: Option<ReverbParams>,
    pub echo: Option<EchoParams>,
}

impl EffectsChain {
    pub fn apply(&self, buffer: &AudioBuffer) -> Result<AudioBuffer> {
        let mut output = buffer.clone();

        if let Some(params) = &self.reverb {
            output = reverb(&output, params.decay).map_err(|e| e.in_stage("reverb"))?;
        }

        if let Some(params) = &self.echo {
            output = echo(&output, params.delay_ms, params.decay).map_err(|e| e.in_stage("echo"))?;
        }

        Ok(output)
    }
}
