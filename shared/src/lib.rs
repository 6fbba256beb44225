#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

pub mod comms_hal;
pub mod robot_hal;
pub mod robot_mock;

use comms_hal::Command;

pub trait ControllerState<F, C> {
    fn update(
        &mut self,
        controller: &mut C,
        dt: f32,
        commands: &[Command],
    ) -> Option<F>;
    fn enter_state(&mut self, controller: &mut C);
    fn exit_state(&mut self, controller: &mut C);
}

pub trait ControllerFsm<F, C, S> {
    fn to_controller_state<'a>(&mut self) -> &mut dyn ControllerState<F, C>;
    fn hal_state(&self) -> S;
}

pub struct ControllerEntity<F, C, S> {
    fsm_state: Option<F>,
    _controller_marker: core::marker::PhantomData<C>,
    _hal_state_marker: core::marker::PhantomData<S>,
}

impl<F, C, S> ControllerEntity<F, C, S>
where
    F: ControllerFsm<F, C, S>,
{
    pub fn new(controller: &mut C, fsm_state: F) -> Self {
        let mut controller_fsm = Self {
            fsm_state: None,
            _controller_marker: core::marker::PhantomData,
            _hal_state_marker: core::marker::PhantomData,
        };

        controller_fsm.transition_state(controller, None, fsm_state);

        controller_fsm
    }

    pub fn update<'a>(&mut self, controller: &mut C, dt: f32, commands: &[Command]) {
        if let Some(mut current_state) = self.fsm_state.take() {
            let new_state = current_state
                .to_controller_state()
                .update(controller, dt, commands);

            if let Some(new_state) = new_state {
                self.transition_state(controller, Some(current_state), new_state);
            } else {
                self.fsm_state = Some(current_state);
            }
        }
    }

    fn transition_state(&mut self, controller: &mut C, old_state: Option<F>, mut new_state: F) {
        if let Some(mut old_state) = old_state {
            old_state.to_controller_state().exit_state(controller);
        }

        new_state.to_controller_state().enter_state(controller);

        self.fsm_state = Some(new_state);
    }

    pub fn hal_state(&self) -> S {
        self.fsm_state
            .as_ref()
            .expect("No FSM state, impl must be wrong")
            .hal_state()
    }
}
