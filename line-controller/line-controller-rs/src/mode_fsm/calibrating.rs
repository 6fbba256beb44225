use shared::{
    comms_hal::{Command, TelemetryPacket},
    robot_hal::ControlZone,
    ControllerState,
};

use super::{idle::LineIdle, manual::Manual, running::Running, ModeFsm, MODE_MANUAL};
use crate::{calibration::CalibrationTracker, position, Lfc};

/// Timed two-phase calibration. The sweep phase oscillates the vehicle so
/// every channel sees both line and surface while the tracker accumulates
/// min/max; the centering phase steers gently back onto the line using the
/// partial calibration, restricted to the Center/Warning laws. When the
/// timer expires the statistics are finalized into the session calibration.
///
/// A Stop or SetMode received mid-phase drops this state, tracker and all:
/// partial statistics never become authoritative.
pub struct Calibrating {
    elapsed_time: f32,
    tracker: CalibrationTracker,
}

impl<'f> ControllerState<ModeFsm, Lfc<'f>> for Calibrating {
    fn update(&mut self, lfc: &mut Lfc, dt: f32, commands: &[Command]) -> Option<ModeFsm> {
        for command in commands {
            match command {
                Command::Stop => return Some(LineIdle::new()),
                Command::SetMode(MODE_MANUAL) => return Some(Manual::new()),
                _ => {}
            }
        }

        self.elapsed_time += dt;

        if self.elapsed_time >= lfc.config.calibration_duration_s {
            let calibration = self.tracker.finalize();
            lfc.send_telemetry(TelemetryPacket::CalibrationEnded(calibration));
            lfc.calibration = Some(calibration);

            return Some(Running::new());
        }

        let sample = lfc.latest_sample;
        self.tracker.observe(&sample);

        if self.in_sweep_phase(lfc) {
            self.drive_sweep(lfc);
        } else {
            self.drive_centering(lfc);
        }

        None
    }

    fn enter_state(&mut self, lfc: &mut Lfc) {
        self.tracker.reset();
        lfc.send_telemetry(TelemetryPacket::CalibrationStarted);
    }

    fn exit_state(&mut self, _lfc: &mut Lfc) {
        // Nothing
    }
}

impl Calibrating {
    pub fn new() -> ModeFsm {
        ModeFsm::Calibrating(Self {
            elapsed_time: 0.0,
            tracker: CalibrationTracker::new(),
        })
    }

    fn in_sweep_phase(&self, lfc: &Lfc) -> bool {
        self.elapsed_time < lfc.config.calibration_duration_s * lfc.config.sweep_fraction
    }

    /// Alternating in-place pivot, flipping direction on a fixed period.
    fn drive_sweep(&self, lfc: &mut Lfc) {
        let segment = (self.elapsed_time / lfc.config.sweep_toggle_period_s) as u32;
        let duty = lfc.config.sweep_duty;

        if segment % 2 == 0 {
            lfc.command_motors(duty, -duty);
        } else {
            lfc.command_motors(-duty, duty);
        }
    }

    /// Nudge onto the line with whatever contrast has been observed so far.
    /// Only the two gentle laws are allowed here; a lost line just stops
    /// until the line drifts back under the array.
    fn drive_centering(&self, lfc: &mut Lfc) {
        let partial = self.tracker.finalize();
        let sample = lfc.latest_sample;
        let reading = position::estimate(&sample, &partial);

        let zone = match crate::steering::SteeringController::classify_zone(
            reading.position,
            reading.intensity,
        ) {
            ControlZone::Center => ControlZone::Center,
            ControlZone::LineLost => {
                lfc.command_motors(0, 0);
                return;
            }
            _ => ControlZone::Warning,
        };

        let command = lfc.steering.compute_motors(zone, reading.position);
        lfc.command_motors(command.left, command.right);
    }
}
