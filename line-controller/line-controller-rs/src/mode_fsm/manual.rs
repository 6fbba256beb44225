use shared::{comms_hal::Command, ControllerState};

use super::{idle::LineIdle, ModeFsm, MODE_LINE_FOLLOWER};
use crate::Lfc;

/// Direct wireless drive. Motor commands bypass the steering controller
/// entirely; the line-following pipeline is completely idle here.
pub struct Manual;

impl<'f> ControllerState<ModeFsm, Lfc<'f>> for Manual {
    fn update(&mut self, lfc: &mut Lfc, _dt: f32, commands: &[Command]) -> Option<ModeFsm> {
        for command in commands {
            match command {
                Command::SetMotor { left, right } => {
                    lfc.command_motors(*left, *right);
                }
                Command::Stop => {
                    lfc.command_motors(0, 0);
                }
                Command::SetMode(MODE_LINE_FOLLOWER) => {
                    return Some(LineIdle::new());
                }
                _ => {}
            }
        }

        None
    }

    fn enter_state(&mut self, lfc: &mut Lfc) {
        lfc.command_motors(0, 0);
    }

    fn exit_state(&mut self, _lfc: &mut Lfc) {
        // Nothing
    }
}

impl Manual {
    pub fn new() -> ModeFsm {
        ModeFsm::Manual(Self {})
    }
}
