use shared::robot_hal::{ControlZone, LinePosition, MotorCommand};

use crate::position::POSITION_OFFSET;

/// Total intensity below this means no usable line regardless of position.
pub const LINE_LOST_INTENSITY: u16 = 500;

/// Zone boundaries on |position|.
pub const CENTER_ZONE_LIMIT: i16 = 500;
pub const WARNING_ZONE_LIMIT: i16 = 1500;
pub const CRITICAL_ZONE_LIMIT: i16 = 2500;

/// |position| must exceed this before the last-known direction is updated.
pub const DIRECTION_DEADBAND: i16 = 100;

const CENTER_BASE_SPEED: i32 = 90;
const CENTER_GAIN: i32 = 40;
const CENTER_MIN_DUTY: i8 = 55;

const WARNING_BASE_SPEED: i32 = 75;
const WARNING_GAIN: i32 = 25;
const WARNING_MIN_DUTY: i8 = 40;

const CRITICAL_OUTER_DUTY: i8 = 85;
const CRITICAL_INNER_DUTY: i8 = 30;

const EMERGENCY_OUTER_DUTY: i8 = 95;
const EMERGENCY_INNER_DUTY: i8 = 20;

const RECOVERY_OUTER_DUTY: i8 = 90;
const RECOVERY_INNER_DUTY: i8 = 20;
const SEARCH_CREEP_DUTY: i8 = 60;

const MAX_DUTY: i8 = 100;

/// Four-zone proportional steering with line-loss recovery.
///
/// The only state is the last direction the line was seen in, which selects
/// the recovery pivot when the line disappears. It persists across mode
/// transitions until `reset`. The contract is total: every (zone, position)
/// pair maps to a defined, clamped duty pair.
#[derive(Debug, Clone)]
pub struct SteeringController {
    last_direction: i8,
}

impl SteeringController {
    pub fn new() -> Self {
        Self { last_direction: 0 }
    }

    pub fn reset(&mut self) {
        self.last_direction = 0;
    }

    pub fn last_direction(&self) -> i8 {
        self.last_direction
    }

    /// Pure zone selection. Low intensity wins over any position value.
    pub fn classify_zone(position: LinePosition, intensity: u16) -> ControlZone {
        if intensity < LINE_LOST_INTENSITY {
            return ControlZone::LineLost;
        }

        let position = match position {
            LinePosition::Detected(position) => position,
            LinePosition::Lost => return ControlZone::LineLost,
        };

        let magnitude = (position as i32).abs();

        if magnitude < CENTER_ZONE_LIMIT as i32 {
            ControlZone::Center
        } else if magnitude < WARNING_ZONE_LIMIT as i32 {
            ControlZone::Warning
        } else if magnitude < CRITICAL_ZONE_LIMIT as i32 {
            ControlZone::Critical
        } else {
            ControlZone::Emergency
        }
    }

    pub fn compute_motors(&mut self, zone: ControlZone, position: LinePosition) -> MotorCommand {
        let position_value = match position {
            LinePosition::Detected(position) => position,
            LinePosition::Lost => 0,
        };

        let command = match zone {
            ControlZone::Center => {
                Self::proportional(position_value, CENTER_BASE_SPEED, CENTER_GAIN, CENTER_MIN_DUTY)
            }
            ControlZone::Warning => Self::proportional(
                position_value,
                WARNING_BASE_SPEED,
                WARNING_GAIN,
                WARNING_MIN_DUTY,
            ),
            ControlZone::Critical => {
                Self::differential(position_value, CRITICAL_OUTER_DUTY, CRITICAL_INNER_DUTY)
            }
            ControlZone::Emergency => {
                Self::differential(position_value, EMERGENCY_OUTER_DUTY, EMERGENCY_INNER_DUTY)
            }
            ControlZone::LineLost => self.recovery(),
        };

        if zone != ControlZone::LineLost && position_value.abs() > DIRECTION_DEADBAND {
            self.last_direction = position_value.signum() as i8;
        }

        command
    }

    /// Base speed plus a proportional term on the normalized error, both
    /// motors clamped to [min_duty, 100]. Positive position = line toward
    /// channel 7 = right-hand turn = left motor speeds up.
    fn proportional(position: i16, base_speed: i32, gain: i32, min_duty: i8) -> MotorCommand {
        let steering = position as i32 * gain / POSITION_OFFSET;

        MotorCommand {
            left: clamp_duty(base_speed + steering, min_duty),
            right: clamp_duty(base_speed - steering, min_duty),
        }
    }

    /// Fixed outer/inner split, no proportional term. The outer motor is on
    /// the side opposite the line.
    fn differential(position: i16, outer: i8, inner: i8) -> MotorCommand {
        if position >= 0 {
            MotorCommand {
                left: outer,
                right: inner,
            }
        } else {
            MotorCommand {
                left: inner,
                right: outer,
            }
        }
    }

    /// Pivot back toward where the line was last seen; with no history,
    /// creep straight ahead and wait for the line to reappear.
    fn recovery(&self) -> MotorCommand {
        match self.last_direction {
            d if d > 0 => MotorCommand {
                left: RECOVERY_OUTER_DUTY,
                right: RECOVERY_INNER_DUTY,
            },
            d if d < 0 => MotorCommand {
                left: RECOVERY_INNER_DUTY,
                right: RECOVERY_OUTER_DUTY,
            },
            _ => MotorCommand {
                left: SEARCH_CREEP_DUTY,
                right: SEARCH_CREEP_DUTY,
            },
        }
    }
}

impl Default for SteeringController {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_duty(duty: i32, min_duty: i8) -> i8 {
    duty.clamp(min_duty as i32, MAX_DUTY as i32) as i8
}
