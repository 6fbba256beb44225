use shared::{robot_hal::RobotMode, ControllerFsm, ControllerState};

use crate::Lfc;

pub mod calibrating;
pub mod idle;
pub mod manual;
pub mod running;

pub enum ModeFsm {
    Manual(manual::Manual),
    LineIdle(idle::LineIdle),
    Calibrating(calibrating::Calibrating),
    Running(running::Running),
}

impl<'a> ControllerFsm<ModeFsm, Lfc<'a>, RobotMode> for ModeFsm {
    fn to_controller_state(&mut self) -> &mut dyn ControllerState<ModeFsm, Lfc<'a>> {
        match self {
            ModeFsm::Manual(state) => state,
            ModeFsm::LineIdle(state) => state,
            ModeFsm::Calibrating(state) => state,
            ModeFsm::Running(state) => state,
        }
    }

    fn hal_state(&self) -> RobotMode {
        match self {
            ModeFsm::Manual(_) => RobotMode::Manual,
            ModeFsm::LineIdle(_) => RobotMode::LineIdle,
            ModeFsm::Calibrating(_) => RobotMode::LineCalibrating,
            ModeFsm::Running(_) => RobotMode::LineRunning,
        }
    }
}

pub(crate) const MODE_MANUAL: u8 = 0;
pub(crate) const MODE_LINE_FOLLOWER: u8 = 1;
