use shared::{comms_hal::Command, ControllerState};

use super::{calibrating::Calibrating, manual::Manual, ModeFsm, MODE_MANUAL};
use crate::Lfc;

/// Line-follower mode, waiting for a Start command. Motors are held at zero
/// every tick.
pub struct LineIdle;

impl<'f> ControllerState<ModeFsm, Lfc<'f>> for LineIdle {
    fn update(&mut self, lfc: &mut Lfc, _dt: f32, commands: &[Command]) -> Option<ModeFsm> {
        for command in commands {
            match command {
                Command::Start => {
                    return Some(Calibrating::new());
                }
                Command::SetMode(MODE_MANUAL) => {
                    return Some(Manual::new());
                }
                _ => {}
            }
        }

        lfc.command_motors(0, 0);

        None
    }

    fn enter_state(&mut self, lfc: &mut Lfc) {
        lfc.command_motors(0, 0);
    }

    fn exit_state(&mut self, _lfc: &mut Lfc) {
        // Nothing
    }
}

impl LineIdle {
    pub fn new() -> ModeFsm {
        ModeFsm::LineIdle(Self {})
    }
}
