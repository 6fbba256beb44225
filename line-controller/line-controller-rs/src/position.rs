//! Weighted-centroid line position estimation. Deterministic pure functions
//! of (sample, calibration); all math is integer on ADC counts.

use shared::robot_hal::{LineCalibration, LinePosition, SensorSample, SENSOR_COUNT};

/// Each channel normalizes into [0, NORMALIZED_FULL_SCALE].
pub const NORMALIZED_FULL_SCALE: u32 = 1000;

/// Per-channel centroid weights are spaced this far apart: 0, 1000, .. 7000.
pub const CHANNEL_WEIGHT_STEP: u32 = 1000;

/// Centroid offset so 0 means the line is centered under the array.
pub const POSITION_OFFSET: i32 = 3500;

/// Below this total intensity the centroid denominator is untrustworthy and
/// the reading is an explicit lost marker instead of a division.
pub const INTENSITY_EPSILON: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionReading {
    pub position: LinePosition,
    pub intensity: u16,
    pub pattern: u8,
}

/// Bit i is set iff channel i reads above its calibrated threshold.
/// Degenerate channels carry a threshold above full scale, so they can never
/// set their bit.
pub fn binary_pattern(sample: &SensorSample, calibration: &LineCalibration) -> u8 {
    let mut pattern = 0u8;

    for (channel, &raw) in sample.iter().enumerate() {
        if raw > calibration.channels[channel].threshold {
            pattern |= 1 << channel;
        }
    }

    pattern
}

/// Estimate the lateral line position from one sample.
///
/// Normalized channel values are weighted by their array position; the
/// centroid of the weights, offset to put 0 at array center, is the
/// position. Positive position means the line sits toward channel 7.
pub fn estimate(sample: &SensorSample, calibration: &LineCalibration) -> PositionReading {
    let mut intensity: u32 = 0;
    let mut weighted_sum: u32 = 0;

    for channel in 0..SENSOR_COUNT {
        let normalized = normalize_channel(sample[channel], calibration, channel);

        intensity += normalized;
        weighted_sum += normalized * (channel as u32 * CHANNEL_WEIGHT_STEP);
    }

    let pattern = binary_pattern(sample, calibration);

    if intensity <= INTENSITY_EPSILON as u32 {
        return PositionReading {
            position: LinePosition::Lost,
            intensity: intensity as u16,
            pattern,
        };
    }

    let position = (weighted_sum / intensity) as i32 - POSITION_OFFSET;

    PositionReading {
        position: LinePosition::Detected(position as i16),
        intensity: intensity as u16,
        pattern,
    }
}

fn normalize_channel(raw: u16, calibration: &LineCalibration, channel: usize) -> u32 {
    let channel = &calibration.channels[channel];

    if channel.degenerate {
        return 0;
    }

    let range = (channel.max - channel.min) as u32;
    let offset = raw.saturating_sub(channel.min) as u32;

    (offset * NORMALIZED_FULL_SCALE / range).min(NORMALIZED_FULL_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::robot_hal::{ChannelCalibration, ADC_MAX_COUNT};

    fn full_range_calibration() -> LineCalibration {
        LineCalibration {
            channels: [ChannelCalibration {
                min: 0,
                max: ADC_MAX_COUNT,
                threshold: 1638,
                degenerate: false,
            }; SENSOR_COUNT],
        }
    }

    #[test]
    fn symmetric_outer_pairs_read_centered() {
        let sample = [4095, 4095, 0, 0, 0, 0, 4095, 4095];
        let calibration = full_range_calibration();

        let reading = estimate(&sample, &calibration);

        assert_eq!(reading.pattern, 0b1100_0011);
        assert_eq!(reading.intensity, 4000);
        assert_eq!(reading.position, LinePosition::Detected(0));
    }

    #[test]
    fn all_dark_sample_is_lost_without_dividing() {
        let sample = [0; SENSOR_COUNT];
        let calibration = full_range_calibration();

        let reading = estimate(&sample, &calibration);

        assert_eq!(reading.position, LinePosition::Lost);
        assert_eq!(reading.intensity, 0);
        assert_eq!(reading.pattern, 0);
    }

    #[test]
    fn single_edge_channel_reads_extreme_position() {
        let mut sample = [0; SENSOR_COUNT];
        sample[7] = 4095;
        let calibration = full_range_calibration();
        let reading = estimate(&sample, &calibration);
        assert_eq!(reading.position, LinePosition::Detected(3500));

        let mut sample = [0; SENSOR_COUNT];
        sample[0] = 4095;
        let reading = estimate(&sample, &calibration);
        assert_eq!(reading.position, LinePosition::Detected(-3500));
    }

    #[test]
    fn position_always_inside_full_scale() {
        let calibration = full_range_calibration();

        // Worst cases plus a spread of asymmetric samples.
        let samples: [[u16; SENSOR_COUNT]; 5] = [
            [4095; SENSOR_COUNT],
            [11, 0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0, 11],
            [100, 200, 4095, 4095, 50, 0, 0, 0],
            [0, 0, 0, 60, 3000, 4095, 4095, 4095],
        ];

        for sample in &samples {
            match estimate(sample, &calibration).position {
                LinePosition::Detected(position) => {
                    assert!((-3500..=3500).contains(&(position as i32)));
                }
                LinePosition::Lost => {}
            }
        }
    }

    #[test]
    fn raw_readings_clamp_to_calibrated_range() {
        let mut calibration = full_range_calibration();
        calibration.channels[0] = ChannelCalibration {
            min: 1000,
            max: 3000,
            threshold: 1800,
            degenerate: false,
        };

        // Below min clamps to 0, above max clamps to full scale.
        let mut sample = [0; SENSOR_COUNT];
        sample[0] = 500;
        assert_eq!(normalize_channel(sample[0], &calibration, 0), 0);

        sample[0] = 4095;
        assert_eq!(
            normalize_channel(sample[0], &calibration, 0),
            NORMALIZED_FULL_SCALE
        );
    }

    #[test]
    fn degenerate_channel_never_reports_line() {
        let mut calibration = full_range_calibration();
        calibration.channels[2] = ChannelCalibration::degenerate_default();

        let mut sample = [0; SENSOR_COUNT];
        sample[2] = ADC_MAX_COUNT;

        let reading = estimate(&sample, &calibration);

        assert_eq!(reading.pattern & (1 << 2), 0);
        assert_eq!(reading.intensity, 0);
        assert_eq!(reading.position, LinePosition::Lost);
    }
}
