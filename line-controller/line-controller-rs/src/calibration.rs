use shared::robot_hal::{
    ChannelCalibration, LineCalibration, SensorSample, ADC_MAX_COUNT, SENSOR_COUNT,
};

/// Threshold sits at min + 2/5 of the observed range (the 0.4 contrast
/// ratio, kept in integer math on ADC counts).
const THRESHOLD_RATIO_NUM: u32 = 2;
const THRESHOLD_RATIO_DEN: u32 = 5;

/// Running per-channel min/max statistics for one calibration session.
///
/// The tracker has no notion of elapsed time; the sweep/centering phasing
/// lives in the mode state machine. It only accumulates and answers
/// `finalize`, which is also used mid-session to derive the partial
/// calibration the centering phase steers with.
#[derive(Debug, Clone)]
pub struct CalibrationTracker {
    mins: [u16; SENSOR_COUNT],
    maxs: [u16; SENSOR_COUNT],
}

impl CalibrationTracker {
    pub fn new() -> Self {
        Self {
            mins: [u16::MAX; SENSOR_COUNT],
            maxs: [0; SENSOR_COUNT],
        }
    }

    pub fn reset(&mut self) {
        self.mins = [u16::MAX; SENSOR_COUNT];
        self.maxs = [0; SENSOR_COUNT];
    }

    pub fn observe(&mut self, sample: &SensorSample) {
        for (channel, &raw) in sample.iter().enumerate() {
            self.mins[channel] = self.mins[channel].min(raw);
            self.maxs[channel] = self.maxs[channel].max(raw);
        }
    }

    /// Derive per-channel thresholds from the accumulated statistics. A
    /// channel that never saw contrast (max <= min, including the
    /// never-observed sentinels) is flagged degenerate and pinned to a
    /// threshold no raw reading can exceed, so it fails safe as "off the
    /// line" rather than falsely reporting signal.
    pub fn finalize(&self) -> LineCalibration {
        let mut channels = [ChannelCalibration::degenerate_default(); SENSOR_COUNT];

        for channel in 0..SENSOR_COUNT {
            let min = self.mins[channel];
            let max = self.maxs[channel];

            if max <= min {
                channels[channel] = ChannelCalibration::degenerate_default();
                continue;
            }

            let range = (max - min) as u32;
            let threshold = min + (range * THRESHOLD_RATIO_NUM / THRESHOLD_RATIO_DEN) as u16;

            channels[channel] = ChannelCalibration {
                min,
                max,
                threshold,
                degenerate: false,
            };
        }

        LineCalibration { channels }
    }
}

impl Default for CalibrationTracker {
    fn default() -> Self {
        Self::new()
    }
}
