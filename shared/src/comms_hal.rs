use serde::{Deserialize, Serialize};
use strum_macros::EnumCount as EnumCountMacro;

use crate::robot_hal::{
    ControlZone, LineCalibration, LinePosition, RobotDevStatsFrame, RobotMode,
    RobotTelemetryFrame, SensorSample,
};

/// Inbound commands, already decoded from the wireless transport. At most
/// one arrives per control tick. Anything malformed is dropped before it
/// gets here or ignored by the handler; neither changes state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumCountMacro)]
pub enum Command {
    SetMotor { left: i8, right: i8 },
    Stop,
    /// 0 = manual/car mode, 1 = line follower. Other values are malformed
    /// and ignored.
    SetMode(u8),
    Start,
    RequestSensors,
    RequestRawSensors,
    Ping,
    EnableDebugInfo(bool),
    StartDevStatsFrame,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumCountMacro)]
pub enum TelemetryPacket {
    Pong,
    SensorPattern(u8),
    RawSensors(SensorSample),
    RobotTelemetry(RobotTelemetryFrame),
    DebugState {
        mode: RobotMode,
        position: LinePosition,
        zone: ControlZone,
    },
    AnalogDebug {
        position: i16,
        intensity: u16,
        steering: i16,
        left_duty: i8,
        right_duty: i8,
    },
    CalibrationStarted,
    CalibrationEnded(LineCalibration),
    DevStats(RobotDevStatsFrame),
}

pub mod tests_data {
    use super::*;
    use crate::robot_hal::ChannelCalibration;
    use strum::EnumCount;

    pub const COMMAND_TEST_DEFAULTS: [Command; Command::COUNT] = [
        Command::SetMotor {
            left: -70,
            right: 100,
        },
        Command::Stop,
        Command::SetMode(1),
        Command::Start,
        Command::RequestSensors,
        Command::RequestRawSensors,
        Command::Ping,
        Command::EnableDebugInfo(true),
        Command::StartDevStatsFrame,
    ];

    pub const TELEMETRY_TEST_DEFAULTS: [TelemetryPacket; TelemetryPacket::COUNT] = [
        TelemetryPacket::Pong,
        TelemetryPacket::SensorPattern(0b1100_0011),
        TelemetryPacket::RawSensors([0, 512, 1024, 2048, 4095, 3000, 100, 42]),
        TelemetryPacket::RobotTelemetry(RobotTelemetryFrame::default()),
        TelemetryPacket::DebugState {
            mode: RobotMode::LineRunning,
            position: LinePosition::Detected(-1800),
            zone: ControlZone::Critical,
        },
        TelemetryPacket::AnalogDebug {
            position: 420,
            intensity: 3500,
            steering: 9,
            left_duty: 94,
            right_duty: 85,
        },
        TelemetryPacket::CalibrationStarted,
        TelemetryPacket::CalibrationEnded(LineCalibration {
            channels: [
                ChannelCalibration {
                    min: 120,
                    max: 3900,
                    threshold: 1632,
                    degenerate: false,
                },
                ChannelCalibration::degenerate_default(),
                ChannelCalibration {
                    min: 0,
                    max: 4095,
                    threshold: 1638,
                    degenerate: false,
                },
                ChannelCalibration::degenerate_default(),
                ChannelCalibration {
                    min: 77,
                    max: 78,
                    threshold: 77,
                    degenerate: false,
                },
                ChannelCalibration::degenerate_default(),
                ChannelCalibration::degenerate_default(),
                ChannelCalibration::degenerate_default(),
            ],
        }),
        TelemetryPacket::DevStats(RobotDevStatsFrame::default()),
    ];
}
