// Define no_std except for testing and sil feature
#![cfg_attr(not(any(test, feature = "sil")), no_std)]
#![deny(unsafe_code)]

#[cfg(any(test, feature = "sil"))]
macro_rules! silprintln {
    () => { println!() };
    ($($arg:tt)*) => { println!($($arg)*) };
}

#[cfg(not(any(test, feature = "sil")))]
macro_rules! silprintln {
    () => {};
    ($($arg:tt)*) => {};
}

pub mod calibration;
mod dev_stats;
pub mod mode_fsm;
pub mod position;
pub mod steering;

use dev_stats::DevStatsCollector;
use mode_fsm::{manual::Manual, ModeFsm};
use position::PositionReading;
use shared::{
    comms_hal::{Command, TelemetryPacket},
    robot_hal::{
        CommandInterface, LineCalibration, LinePosition, MotorCommand, RobotConfig, RobotDriver,
        RobotMode, RobotTelemetryFrame, SensorSample, TelemetryPort, SENSOR_COUNT,
    },
    ControllerEntity,
};
use steering::SteeringController;

/// Documented control tick period. The caller owns the scheduler; this crate
/// only assumes `update` is invoked at a fixed period and never blocks.
pub const TICK_PERIOD_S: f32 = 0.01;

/// Binary-pattern threshold used for sensor readouts requested before any
/// calibration session has produced thresholds.
pub const UNCALIBRATED_BINARY_THRESHOLD: u16 = 1500;

const MAX_MOTOR_DUTY: i8 = 100;

/// Line-following controller: the single owner of all mutable control state.
///
/// One `update` call is one control tick. Commands are polled non-blockingly
/// (at most one per tick), telemetry is fire-and-forget, and the estimation
/// and steering path in between never suspends or fails.
pub struct Lfc<'a> {
    pub config: RobotConfig,
    pub driver: &'a mut dyn RobotDriver,
    pub commands: &'a mut dyn CommandInterface,
    pub telemetry: &'a mut dyn TelemetryPort,
    pub mode: RobotMode,
    pub debug_info_enabled: bool,

    /// Immutable thresholds snapshot from the last calibration finalize.
    /// None until the first session completes; aborted sessions never set it.
    pub calibration: Option<LineCalibration>,
    pub steering: SteeringController,
    pub latest_sample: SensorSample,

    mode_fsm: Option<ControllerEntity<ModeFsm, Lfc<'a>, RobotMode>>,
    dev_stats: DevStatsCollector,
    time_since_last_telemetry: f32,

    // Last line-following status, kept for the rate-limited telemetry frame.
    last_position: LinePosition,
    last_intensity: u16,
    last_pattern: u8,
    last_motor_command: MotorCommand,
}

impl<'a> Lfc<'a> {
    pub fn new(
        driver: &'a mut dyn RobotDriver,
        commands: &'a mut dyn CommandInterface,
        telemetry: &'a mut dyn TelemetryPort,
    ) -> Self {
        let default_config = RobotConfig {
            telemetry_rate_s: 0.1,
            calibration_duration_s: 10.0,
            sweep_fraction: 0.8,
            sweep_toggle_period_s: 0.5,
            sweep_duty: 55,
        };

        let mut lfc = Self {
            config: default_config,
            driver,
            commands,
            telemetry,
            mode: RobotMode::Manual,
            debug_info_enabled: true,
            calibration: None,
            steering: SteeringController::new(),
            latest_sample: [0; SENSOR_COUNT],
            mode_fsm: None,
            dev_stats: DevStatsCollector::new(),
            time_since_last_telemetry: 0.0,
            last_position: LinePosition::Lost,
            last_intensity: 0,
            last_pattern: 0,
            last_motor_command: MotorCommand::STOPPED,
        };

        lfc.mode_fsm = Some(ControllerEntity::new(&mut lfc, Manual::new()));

        lfc
    }

    /// One control tick.
    pub fn update(&mut self, dt: f32) {
        let timestamp = self.driver.timestamp();

        self.latest_sample = self.driver.read_line_sensors();

        let polled_command = self.commands.poll_command();
        let commands: &[Command] = match &polled_command {
            Some(command) => core::slice::from_ref(command),
            None => &[],
        };

        self.dev_stats
            .log_update_start(timestamp, commands.len() as u32);

        for command in commands {
            silprintln!("LFC: received command: {:?}", command);
            self.handle_command(command);
        }

        if let Some(mut mode_fsm) = self.mode_fsm.take() {
            mode_fsm.update(self, dt, commands);
            self.mode = mode_fsm.hal_state();
            self.mode_fsm = Some(mode_fsm);
        }

        self.time_since_last_telemetry += dt;
        if self.time_since_last_telemetry >= self.config.telemetry_rate_s {
            let frame = self.generate_telemetry_frame();
            self.send_telemetry(TelemetryPacket::RobotTelemetry(frame));
            self.time_since_last_telemetry = 0.0;
        }

        self.dev_stats.log_update_end(self.driver.timestamp());
        if let Some(frame) = self.dev_stats.pop_stats_frame() {
            self.send_telemetry(TelemetryPacket::DevStats(frame));
        }
    }

    /// Commands with mode-independent answers. Everything mode-dependent
    /// (SetMotor, Stop, SetMode, Start) belongs to the FSM states; anything
    /// unrecognized there falls through with no state change.
    fn handle_command(&mut self, command: &Command) {
        match command {
            Command::Ping => {
                self.send_telemetry(TelemetryPacket::Pong);
            }
            Command::RequestSensors => {
                let pattern = self.current_binary_pattern();
                self.send_telemetry(TelemetryPacket::SensorPattern(pattern));
            }
            Command::RequestRawSensors => {
                self.send_telemetry(TelemetryPacket::RawSensors(self.latest_sample));
            }
            Command::EnableDebugInfo(state) => {
                self.debug_info_enabled = *state;
            }
            Command::StartDevStatsFrame => {
                self.dev_stats.start_collection(self.driver.timestamp());
            }
            _ => {}
        }
    }

    /// Clamp and forward a duty pair to the motor driver. Out-of-range
    /// requests are clamped, not rejected.
    pub fn command_motors(&mut self, left: i8, right: i8) {
        let left = left.clamp(-MAX_MOTOR_DUTY, MAX_MOTOR_DUTY);
        let right = right.clamp(-MAX_MOTOR_DUTY, MAX_MOTOR_DUTY);

        self.driver.set_motor_duties(left, right);
        self.last_motor_command = MotorCommand { left, right };
    }

    /// Best effort: a refused packet is dropped, the tick never waits.
    pub fn send_telemetry(&mut self, packet: TelemetryPacket) {
        let _ = self.telemetry.send_packet(&packet);
    }

    pub(crate) fn record_line_status(&mut self, reading: PositionReading, command: MotorCommand) {
        self.last_position = reading.position;
        self.last_intensity = reading.intensity;
        self.last_pattern = reading.pattern;
        self.last_motor_command = command;
    }

    pub fn generate_telemetry_frame(&self) -> RobotTelemetryFrame {
        RobotTelemetryFrame {
            timestamp: (self.driver.timestamp() * 1e3) as u64,
            mode: self.mode,
            position: self.last_position,
            intensity: self.last_intensity,
            line_pattern: self.last_pattern,
            left_duty: self.last_motor_command.left,
            right_duty: self.last_motor_command.right,
            calibrated: self.calibration.is_some(),
        }
    }

    fn current_binary_pattern(&self) -> u8 {
        if let Some(calibration) = &self.calibration {
            return position::binary_pattern(&self.latest_sample, calibration);
        }

        let mut pattern = 0u8;
        for (channel, &raw) in self.latest_sample.iter().enumerate() {
            if raw > UNCALIBRATED_BINARY_THRESHOLD {
                pattern |= 1 << channel;
            }
        }

        pattern
    }
}
