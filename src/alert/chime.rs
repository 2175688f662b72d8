use rodio::Source;
use std::f32::consts::PI;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44_100;
const TONE_MS: u32 = 180;
const AMPLITUDE: f32 = 0.25;

/// Two descending tones, mono, with a short linear fade on each edge to avoid clicks.
pub struct AlertChime {
    tones: [f32; 2],
    samples_per_tone: usize,
    num_sample: usize,
}

impl AlertChime {
    pub fn new() -> Self {
        Self::with_tones(880.0, 660.0)
    }

    pub fn with_tones(first: f32, second: f32) -> Self {
        Self {
            tones: [first, second],
            samples_per_tone: (SAMPLE_RATE * TONE_MS / 1000) as usize,
            num_sample: 0,
        }
    }

    fn total_samples(&self) -> usize {
        self.samples_per_tone * self.tones.len()
    }

    fn envelope(&self, index_in_tone: usize) -> f32 {
        let fade = self.samples_per_tone / 10;
        let from_edge = index_in_tone.min(self.samples_per_tone - 1 - index_in_tone);
        if from_edge >= fade {
            1.0
        } else {
            from_edge as f32 / fade as f32
        }
    }
}

impl Default for AlertChime {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for AlertChime {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.num_sample >= self.total_samples() {
            return None;
        }

        let tone = self.num_sample / self.samples_per_tone;
        let index_in_tone = self.num_sample % self.samples_per_tone;
        let t = index_in_tone as f32 / SAMPLE_RATE as f32;
        let sample = (2.0 * PI * self.tones[tone] * t).sin() * self.envelope(index_in_tone);

        self.num_sample += 1;
        Some(sample * AMPLITUDE)
    }
}

impl Source for AlertChime {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total_samples() - self.num_sample)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_millis(u64::from(TONE_MS) * self.tones.len() as u64))
    }
}
