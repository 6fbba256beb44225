use core::any::Any;

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use crate::comms_hal::{Command, TelemetryPacket};

/// Number of channels in the line sensor array.
pub const SENSOR_COUNT: usize = 8;

/// Full-scale ADC reading for one sensor channel.
pub const ADC_MAX_COUNT: u16 = 4095;

/// Raw ADC readings (0-4095), one per channel, sampled once per tick.
pub type SensorSample = [u16; SENSOR_COUNT];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum RobotMode {
    Manual,
    LineIdle,
    LineCalibrating,
    LineRunning,
}

/// Discrete control regime selected from position error magnitude and
/// line intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum ControlZone {
    Center,
    Warning,
    Critical,
    Emergency,
    LineLost,
}

/// Lateral line position in [-3500, 3500], or an explicit lost marker when
/// the total intensity is too low to trust a centroid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinePosition {
    Detected(i16),
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorCommand {
    pub left: i8,
    pub right: i8,
}

impl MotorCommand {
    pub const STOPPED: MotorCommand = MotorCommand { left: 0, right: 0 };
}

/// Per-channel calibration derived from the min/max statistics of one
/// calibration session. A degenerate channel never saw contrast; its
/// threshold is pinned above full scale so it can never read "on the line".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCalibration {
    pub min: u16,
    pub max: u16,
    pub threshold: u16,
    pub degenerate: bool,
}

impl ChannelCalibration {
    pub const fn degenerate_default() -> Self {
        Self {
            min: 0,
            max: 0,
            threshold: ADC_MAX_COUNT,
            degenerate: true,
        }
    }
}

/// Immutable calibration snapshot for the whole array, produced at
/// calibration finalize and never mutated for the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCalibration {
    pub channels: [ChannelCalibration; SENSOR_COUNT],
}

impl LineCalibration {
    pub const fn degenerate_default() -> Self {
        Self {
            channels: [ChannelCalibration::degenerate_default(); SENSOR_COUNT],
        }
    }

    pub fn degenerate_count(&self) -> u8 {
        self.channels
            .iter()
            .filter(|channel| channel.degenerate)
            .count() as u8
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    pub telemetry_rate_s: f32,
    pub calibration_duration_s: f32,
    pub sweep_fraction: f32,
    pub sweep_toggle_period_s: f32,
    pub sweep_duty: i8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotTelemetryFrame {
    pub timestamp: u64,
    pub mode: RobotMode,
    pub position: LinePosition,
    pub intensity: u16,
    pub line_pattern: u8,
    pub left_duty: i8,
    pub right_duty: i8,
    pub calibrated: bool,
}

impl RobotTelemetryFrame {
    pub const fn default() -> Self {
        Self {
            timestamp: 0,
            mode: RobotMode::Manual,
            position: LinePosition::Lost,
            intensity: 0,
            line_pattern: 0,
            left_duty: 0,
            right_duty: 0,
            calibrated: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotDevStatsFrame {
    pub timestamp: u64,
    pub update_latency_avg: f32,
    pub update_latency_max: f32,
    pub command_queue_length_avg: f32,
    pub command_queue_length_max: u32,
    pub update_elapsed_avg: f32,
}

impl RobotDevStatsFrame {
    pub const fn default() -> Self {
        Self {
            timestamp: 0,
            update_latency_avg: 0.0,
            update_latency_max: 0.0,
            command_queue_length_avg: 0.0,
            command_queue_length_max: 0,
            update_elapsed_avg: 0.0,
        }
    }
}

/// Hardware seam for the control core: a monotonic clock, the digitized
/// sensor vector, and the abstract duty-cycle motor outputs. Translating
/// duties into PWM/H-bridge signals belongs to the implementor.
pub trait RobotDriver {
    /// Seconds since boot.
    fn timestamp(&self) -> f32;

    fn read_line_sensors(&mut self) -> SensorSample;

    /// Sign selects direction, magnitude selects duty percentage. The core
    /// clamps to [-100, 100] before calling.
    fn set_motor_duties(&mut self, left: i8, right: i8);

    fn as_mut_any(&mut self) -> &mut dyn Any;
}

/// Decoded inbound command stream. Must never block: a missing or partial
/// command this tick is simply `None`.
pub trait CommandInterface {
    fn poll_command(&mut self) -> Option<Command>;

    fn as_mut_any(&mut self) -> &mut dyn Any;
}

/// Outbound, fire-and-forget reporting. Returns whether the transport
/// accepted the packet; a refused packet is dropped, never buffered.
pub trait TelemetryPort {
    fn send_packet(&mut self, packet: &TelemetryPacket) -> bool;

    fn as_mut_any(&mut self) -> &mut dyn Any;
}
