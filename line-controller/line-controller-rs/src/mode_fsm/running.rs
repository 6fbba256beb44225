use shared::{
    comms_hal::{Command, TelemetryPacket},
    robot_hal::{LineCalibration, LinePosition, RobotMode},
    ControllerState,
};

use super::{idle::LineIdle, manual::Manual, ModeFsm, MODE_MANUAL};
use crate::{position, steering::SteeringController, Lfc};

/// Autonomous line following: sample -> estimate -> classify -> steer,
/// every tick, against the immutable calibration from the last finalize.
pub struct Running;

impl<'f> ControllerState<ModeFsm, Lfc<'f>> for Running {
    fn update(&mut self, lfc: &mut Lfc, _dt: f32, commands: &[Command]) -> Option<ModeFsm> {
        for command in commands {
            match command {
                Command::Stop => return Some(LineIdle::new()),
                Command::SetMode(MODE_MANUAL) => return Some(Manual::new()),
                _ => {}
            }
        }

        // Running is only ever entered through a calibration finalize, but
        // an absent calibration must still resolve to a safe output.
        let calibration: LineCalibration = match lfc.calibration {
            Some(calibration) => calibration,
            None => {
                lfc.command_motors(0, 0);
                return Some(LineIdle::new());
            }
        };

        let sample = lfc.latest_sample;
        let reading = position::estimate(&sample, &calibration);
        let zone = SteeringController::classify_zone(reading.position, reading.intensity);
        let command = lfc.steering.compute_motors(zone, reading.position);

        lfc.command_motors(command.left, command.right);
        lfc.record_line_status(reading, command);

        if lfc.debug_info_enabled {
            lfc.send_telemetry(TelemetryPacket::DebugState {
                mode: RobotMode::LineRunning,
                position: reading.position,
                zone,
            });

            let position = match reading.position {
                LinePosition::Detected(position) => position,
                LinePosition::Lost => 0,
            };
            lfc.send_telemetry(TelemetryPacket::AnalogDebug {
                position,
                intensity: reading.intensity,
                steering: command.left as i16 - command.right as i16,
                left_duty: command.left,
                right_duty: command.right,
            });
        }

        None
    }

    fn enter_state(&mut self, _lfc: &mut Lfc) {
        // Nothing
    }

    fn exit_state(&mut self, _lfc: &mut Lfc) {
        // Nothing
    }
}

impl Running {
    pub fn new() -> ModeFsm {
        ModeFsm::Running(Self {})
    }
}
