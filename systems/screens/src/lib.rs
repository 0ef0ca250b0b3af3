#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Top-level UI mode switch and the screen collaborators it dispatches to.
//!
//! The [`UiStateMachine`] tracks which screen is active, forwards every input
//! event to that screen only, and turns the [`UserAction`] the screen reports
//! into mode changes and game [`Command`]s. Screens are injected through a
//! [`ScreenSet`]; [`ScreenSet::keyboard`] provides the default collaborators.
//! Commands are never applied here; callers enqueue them on the game state.

mod screens;

use waypoint_defence_core::{Command, RunStatus, UserAction};

pub use screens::{HudScreen, IngameMenuScreen, MainMenuScreen, OutcomeScreen, Overlay};

/// Screen currently presented to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UiState {
    /// Title menu shown at boot and after leaving a run.
    MainMenu,
    /// Pause menu layered over a running game.
    IngameMenu,
    /// The playing field with its HUD.
    Game,
    /// Shown after the run was lost.
    EndScreen,
    /// Shown after the run was won.
    SuccessScreen,
}

/// Whether the caller should keep running after handling an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Keep the main loop going.
    Continue,
    /// Terminate the process.
    Quit,
}

/// Keyboard keys understood by the default screens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable key, compared case-insensitively.
    Char(char),
    /// The escape key.
    Escape,
}

/// Discrete input event decoded by the adapter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// A key was pressed.
    Key(Key),
    /// The primary button was clicked at a position in world units.
    Click {
        /// Horizontal coordinate.
        x: f32,
        /// Vertical coordinate.
        y: f32,
    },
}

/// Read-only information screens may need while handling input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenContext {
    /// Side length of a tile of the active level in world units.
    pub tile_size: f32,
}

/// Collaborator that receives the input events of one UI state.
pub trait Screen {
    /// Handles one input event, pushing game commands into `out`.
    fn on_input(
        &mut self,
        input: InputEvent,
        context: &ScreenContext,
        out: &mut Vec<Command>,
    ) -> UserAction;

    /// Called whenever the screen becomes active.
    fn on_enter(&mut self) {}
}

/// One screen collaborator per UI state.
pub struct ScreenSet {
    main_menu: Box<dyn Screen>,
    ingame_menu: Box<dyn Screen>,
    game: Box<dyn Screen>,
    end_screen: Box<dyn Screen>,
    success_screen: Box<dyn Screen>,
}

impl ScreenSet {
    /// Bundles explicitly provided collaborators.
    #[must_use]
    pub fn new(
        main_menu: Box<dyn Screen>,
        ingame_menu: Box<dyn Screen>,
        game: Box<dyn Screen>,
        end_screen: Box<dyn Screen>,
        success_screen: Box<dyn Screen>,
    ) -> Self {
        Self {
            main_menu,
            ingame_menu,
            game,
            end_screen,
            success_screen,
        }
    }

    /// Default keyboard and mouse driven screens.
    #[must_use]
    pub fn keyboard() -> Self {
        Self::new(
            Box::new(MainMenuScreen::new()),
            Box::new(IngameMenuScreen),
            Box::new(HudScreen::new()),
            Box::new(OutcomeScreen),
            Box::new(OutcomeScreen),
        )
    }

    fn get_mut(&mut self, state: UiState) -> &mut dyn Screen {
        match state {
            UiState::MainMenu => self.main_menu.as_mut(),
            UiState::IngameMenu => self.ingame_menu.as_mut(),
            UiState::Game => self.game.as_mut(),
            UiState::EndScreen => self.end_screen.as_mut(),
            UiState::SuccessScreen => self.success_screen.as_mut(),
        }
    }
}

impl std::fmt::Debug for ScreenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenSet").finish_non_exhaustive()
    }
}

/// Top-level mode switch between menus, the running game and end screens.
#[derive(Debug)]
pub struct UiStateMachine {
    state: UiState,
    screens: ScreenSet,
}

impl UiStateMachine {
    /// Creates a state machine showing the main menu.
    #[must_use]
    pub fn new(screens: ScreenSet) -> Self {
        let mut machine = Self {
            state: UiState::MainMenu,
            screens,
        };
        machine.screens.get_mut(UiState::MainMenu).on_enter();
        machine
    }

    /// Screen currently active.
    #[must_use]
    pub const fn state(&self) -> UiState {
        self.state
    }

    /// Forwards an input event to the active screen and handles the action it
    /// reports.
    pub fn dispatch(
        &mut self,
        input: InputEvent,
        context: &ScreenContext,
        out: &mut Vec<Command>,
    ) -> Flow {
        let action = self.screens.get_mut(self.state).on_input(input, context, out);
        self.handle(action, out)
    }

    /// Applies a user action, emitting the game commands it implies.
    pub fn handle(&mut self, action: UserAction, out: &mut Vec<Command>) -> Flow {
        match action {
            UserAction::NewGame => {
                out.push(Command::Reset);
                out.push(Command::Play);
                self.enter(UiState::Game);
            }
            UserAction::ResumeGame => {
                out.push(Command::Play);
                self.enter(UiState::Game);
            }
            UserAction::QuitGame => {
                tracing::info!(state = ?self.state, "quit requested");
                return Flow::Quit;
            }
            UserAction::MainMenu => {
                out.push(Command::GoIdle);
                self.enter(UiState::MainMenu);
            }
            UserAction::IngameMenu => {
                out.push(Command::Pause);
                self.enter(UiState::IngameMenu);
            }
            UserAction::None => {}
        }
        Flow::Continue
    }

    /// Follows the run status while the simulation is not paused.
    pub fn observe(&mut self, status: RunStatus, paused: bool) {
        if paused {
            return;
        }

        match status {
            RunStatus::Running => self.enter(UiState::Game),
            RunStatus::Lost => self.enter(UiState::EndScreen),
            RunStatus::Won => self.enter(UiState::SuccessScreen),
            RunStatus::Idle => {}
        }
    }

    fn enter(&mut self, next: UiState) {
        if self.state == next {
            return;
        }
        tracing::debug!(from = ?self.state, to = ?next, "ui state changed");
        self.state = next;
        self.screens.get_mut(next).on_enter();
    }
}
