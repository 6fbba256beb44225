use core::any::Any;

use crate::robot_hal::{RobotDriver, SensorSample, SENSOR_COUNT};

/// Scripted driver for tests and software-in-the-loop runs. Time only moves
/// when the test advances it, so replaying a command/sample trace is exactly
/// reproducible.
#[derive(Debug)]
pub struct RobotDriverMock {
    now: f32,
    sample: SensorSample,
    left_duty: i8,
    right_duty: i8,
    motor_writes: u32,
}

impl RobotDriver for RobotDriverMock {
    fn timestamp(&self) -> f32 {
        self.now
    }

    fn read_line_sensors(&mut self) -> SensorSample {
        self.sample
    }

    fn set_motor_duties(&mut self, left: i8, right: i8) {
        self.left_duty = left;
        self.right_duty = right;
        self.motor_writes += 1;
    }

    fn as_mut_any(&mut self) -> &mut dyn Any {
        self
    }
}

impl RobotDriverMock {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            sample: [0; SENSOR_COUNT],
            left_duty: 0,
            right_duty: 0,
            motor_writes: 0,
        }
    }

    pub fn advance_time(&mut self, dt: f32) {
        self.now += dt;
    }

    pub fn set_sensors(&mut self, sample: SensorSample) {
        self.sample = sample;
    }

    pub fn motor_duties(&self) -> (i8, i8) {
        (self.left_duty, self.right_duty)
    }

    pub fn motor_writes(&self) -> u32 {
        self.motor_writes
    }
}

impl Default for RobotDriverMock {
    fn default() -> Self {
        Self::new()
    }
}
