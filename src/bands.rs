use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::snapshot::Status;

/// RGB triple, serialized as `[r, g, b]`.
pub type Rgb = [u8; 3];

/// One row of a [`ThresholdTable`]: scores up to and including `upto` map to `value`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band<T> {
    pub upto: u8,
    pub value: T,
}

/// Ordered score thresholds. The first band whose `upto` is at least the
/// score wins; scores above every band map to `above`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable<T> {
    pub bands: Vec<Band<T>>,
    pub above: T,
}

impl<T> ThresholdTable<T> {
    pub fn new(bands: Vec<Band<T>>, above: T) -> Self {
        Self { bands, above }
    }

    pub fn lookup(&self, score: u8) -> &T {
        self.bands
            .iter()
            .find(|band| score <= band.upto)
            .map(|band| &band.value)
            .unwrap_or(&self.above)
    }

    pub fn validate(&self, what: &'static str) -> Result<(), ConfigError> {
        if self.bands.is_empty() {
            return Err(ConfigError::EmptyThresholds(what));
        }
        let ascending = self
            .bands
            .windows(2)
            .all(|pair| pair[0].upto < pair[1].upto);
        if ascending {
            Ok(())
        } else {
            Err(ConfigError::ThresholdOrder(what))
        }
    }
}

/// Score → status classification used by the telemetry source.
pub type StatusTable = ThresholdTable<Status>;

/// Score → trail color.
pub type Palette = ThresholdTable<Rgb>;

pub const CALM_UPTO: u8 = 35;
pub const CAUTION_UPTO: u8 = 65;

impl Default for StatusTable {
    fn default() -> Self {
        Self::new(
            vec![
                Band { upto: CALM_UPTO, value: Status::Calm },
                Band { upto: CAUTION_UPTO, value: Status::Fatigue },
            ],
            Status::Tremor,
        )
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(
            vec![
                Band { upto: CALM_UPTO, value: [0, 255, 0] },
                Band { upto: CAUTION_UPTO, value: [255, 255, 0] },
            ],
            [255, 0, 0],
        )
    }
}
