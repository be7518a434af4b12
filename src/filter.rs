use crate::buffer::AudioBuffer;

/// Butterworth Q, no resonance peak.
pub const DEFAULT_RESONANCE: f32 = 0.707;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterType {
    LowPass,
    HighPass,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    pub cutoff: f32, // Cutoff frequency in Hz
    pub resonance: f32, // Q factor
    pub filter_type: FilterType,
}

impl FilterParams {
    pub fn low_pass(cutoff: f32) -> Self {
        FilterParams { cutoff, resonance: DEFAULT_RESONANCE, filter_type: FilterType::LowPass }
    }

    pub fn high_pass(cutoff: f32) -> Self {
        FilterParams { cutoff, resonance: DEFAULT_RESONANCE, filter_type: FilterType::HighPass }
    }
}

#[inline]
pub fn db_to_amplitude(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x: (f32, f32), // x[n-1], x[n-2]
    y: (f32, f32), // y[n-1], y[n-2]
}

impl Biquad {
    fn new(params: &FilterParams, sample_rate: u32) -> Self {
        // Keep the cutoff strictly inside (0, nyquist)
        let nyquist = sample_rate as f32 / 2.0;
        let cutoff = params.cutoff.clamp(1.0, nyquist * 0.99);
        let omega = std::f32::consts::TAU * cutoff / sample_rate as f32;
        let cos_omega = omega.cos();
        let alpha = omega.sin() / (2.0 * params.resonance.max(0.01));

        let (b0, b1, b2) = match params.filter_type {
            FilterType::LowPass => ((1.0 - cos_omega) / 2.0, 1.0 - cos_omega, (1.0 - cos_omega) / 2.0),
            FilterType::HighPass => ((1.0 + cos_omega) / 2.0, -(1.0 + cos_omega), (1.0 + cos_omega) / 2.0),
        };
        let a0 = 1.0 + alpha;

        Biquad {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: -2.0 * cos_omega / a0,
            a2: (1.0 - alpha) / a0,
            x: (0.0, 0.0),
            y: (0.0, 0.0),
        }
    }

    // y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x.0 + self.b2 * self.x.1
            - self.a1 * self.y.0 - self.a2 * self.y.1;
        self.x = (input, self.x.0);
        self.y = (output, self.y.0);
        output
    }
}

/// Runs the buffer through a biquad, each channel with its own state.
pub fn apply_filter(buffer: &AudioBuffer, params: &FilterParams) -> AudioBuffer {
    let channels = buffer.channels() as usize;
    let mut states: Vec<Biquad> = (0..channels).map(|_| Biquad::new(params, buffer.sample_rate())).collect();
    let samples = buffer
        .samples()
        .iter()
        .enumerate()
        .map(|(i, &s)| states[i % channels].process(s))
        .collect();
    AudioBuffer::new(samples, buffer.sample_rate(), buffer.channels())
}

pub fn low_pass(buffer: &AudioBuffer, cutoff: f32) -> AudioBuffer {
    apply_filter(buffer, &FilterParams::low_pass(cutoff))
}

pub fn high_pass(buffer: &AudioBuffer, cutoff: f32) -> AudioBuffer {
    apply_filter(buffer, &FilterParams::high_pass(cutoff))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SAMPLE_RATE;

    fn sine(freq: f32, frames: usize) -> AudioBuffer {
        let samples = (0..frames)
            .map(|i| (std::f32::consts::TAU * freq * i as f32 / SAMPLE_RATE as f32).sin())
            .collect();
        AudioBuffer::mono(samples, SAMPLE_RATE)
    }

    // Peak over the second half, after the filter has settled
    fn settled_peak(buf: &AudioBuffer) -> f32 {
        let half = buf.samples().len() / 2;
        buf.samples()[half..].iter().fold(0.0f32, |a, s| a.max(s.abs()))
    }

    #[test]
    fn test_db_to_amplitude() {
        assert_eq!(db_to_amplitude(0.0), 1.0);
        assert!((db_to_amplitude(-20.0) - 0.1).abs() < 1e-6);
        assert!((db_to_amplitude(6.0206) - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_low_pass_keeps_lows_and_cuts_highs() {
        let low = low_pass(&sine(100.0, 8820), 1000.0);
        let high = low_pass(&sine(8000.0, 8820), 1000.0);
        assert!(settled_peak(&low) > 0.9);
        assert!(settled_peak(&high) < 0.05);
    }

    #[test]
    fn test_high_pass_keeps_highs_and_cuts_lows() {
        let low = high_pass(&sine(100.0, 8820), 2000.0);
        let high = high_pass(&sine(8000.0, 8820), 2000.0);
        assert!(settled_peak(&low) < 0.05);
        assert!(settled_peak(&high) > 0.9);
    }

    #[test]
    fn test_filter_preserves_shape() {
        let buf = AudioBuffer::new(vec![0.25; 200], SAMPLE_RATE, 2);
        let out = low_pass(&buf, 500.0);
        assert_eq!(out.frames(), 100);
        assert_eq!(out.channels(), 2);
        assert!(low_pass(&AudioBuffer::empty(SAMPLE_RATE), 500.0).is_empty());
    }
}
