use std::time::Duration;

use engine::app::{AppContext, AppControl, GameApp, InputFrame};
use engine::surface::SurfaceSize;
use engine::view_tree::ViewTree;
use winit::event::VirtualKeyCode;

use crate::session::LiveSession;
use crate::settings::BingoSettings;
use crate::sfx::{AudioRig, Sfx};
use crate::view::{BingoAction, build_view};

/// What a key press asks of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    StartOrStop,
    Reset,
    Quit,
}

pub fn map_key(key: VirtualKeyCode) -> Option<KeyCommand> {
    match key {
        VirtualKeyCode::Space | VirtualKeyCode::Return | VirtualKeyCode::NumpadEnter => {
            Some(KeyCommand::StartOrStop)
        }
        VirtualKeyCode::R => Some(KeyCommand::Reset),
        VirtualKeyCode::Escape => Some(KeyCommand::Quit),
        _ => None,
    }
}

pub struct BingoState {
    pub session: LiveSession,
    // Dropping this silences every channel, so it lives exactly as long as the session.
    _output: Option<Sfx>,
}

impl BingoState {
    pub fn new(settings: &BingoSettings) -> Self {
        let AudioRig { roll, draw, output } = AudioRig::from_settings(settings);
        Self {
            session: LiveSession::live(settings.timing, settings.seed, roll, draw),
            _output: output,
        }
    }
}

pub struct BingoApp {
    settings: BingoSettings,
}

impl BingoApp {
    pub fn new(settings: BingoSettings) -> Self {
        Self { settings }
    }
}

/// Applies one frame of input to the session. Returns `Exit` when the user asked to quit.
pub fn apply_input(
    session: &mut LiveSession,
    keys: &[VirtualKeyCode],
    actions: &[BingoAction],
) -> AppControl {
    for &action in actions {
        match action {
            BingoAction::Draw => {
                session.start();
            }
            BingoAction::Reset => session.reset(),
        }
    }
    for command in keys.iter().copied().filter_map(map_key) {
        match command {
            KeyCommand::StartOrStop => {
                session.start_or_stop();
            }
            KeyCommand::Reset => session.reset(),
            KeyCommand::Quit => return AppControl::Exit,
        }
    }
    AppControl::Continue
}

/// Runs one frame: due timers fire first, then this frame's input.
///
/// A roll started by the input begins at the frame's end time, so the elapsed `dt` never counts
/// against it.
pub fn step_frame(
    session: &mut LiveSession,
    keys: &[VirtualKeyCode],
    actions: &[BingoAction],
    dt: Duration,
) -> AppControl {
    session.advance(dt);
    apply_input(session, keys, actions)
}

impl GameApp for BingoApp {
    type State = BingoState;
    type Action = BingoAction;

    fn init_state(&mut self, _ctx: &mut AppContext) -> Self::State {
        BingoState::new(&self.settings)
    }

    fn build_view(&self, state: &Self::State, size: SurfaceSize) -> ViewTree<Self::Action> {
        build_view(&state.session.snapshot(), size)
    }

    fn update_state(
        &mut self,
        state: &mut Self::State,
        input: &InputFrame,
        dt: Duration,
        actions: &[Self::Action],
    ) -> AppControl {
        step_frame(&mut state.session, &input.keys_pressed, actions, dt)
    }

    fn shutdown(&mut self, state: &mut Self::State) {
        state.session.dispose();
    }
}
