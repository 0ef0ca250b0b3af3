//! Default keyboard and mouse screen collaborators.

use waypoint_defence_core::{Command, TileCoord, TowerKind, UserAction};

use crate::{InputEvent, Key, Screen, ScreenContext};

/// Informational panel drawn over the main menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overlay {
    /// Game instructions.
    Help,
    /// Authors and acknowledgements.
    Credits,
}

/// Title menu: `N` new game, `H` help, `C` credits, `Escape` closes the
/// overlay, `Q` or `B` quits.
#[derive(Clone, Debug, Default)]
pub struct MainMenuScreen {
    overlay: Option<Overlay>,
}

impl MainMenuScreen {
    /// Creates the menu without an overlay.
    #[must_use]
    pub const fn new() -> Self {
        Self { overlay: None }
    }

    /// Overlay currently shown, if any.
    #[must_use]
    pub const fn overlay(&self) -> Option<Overlay> {
        self.overlay
    }
}

impl Screen for MainMenuScreen {
    fn on_input(
        &mut self,
        input: InputEvent,
        _context: &ScreenContext,
        _out: &mut Vec<Command>,
    ) -> UserAction {
        let InputEvent::Key(key) = input else {
            return UserAction::None;
        };

        match normalise(key) {
            Key::Escape => {
                self.overlay = None;
                UserAction::None
            }
            Key::Char('n') => UserAction::NewGame,
            Key::Char('h') => {
                self.overlay = Some(Overlay::Help);
                UserAction::None
            }
            Key::Char('c') => {
                self.overlay = Some(Overlay::Credits);
                UserAction::None
            }
            Key::Char('q' | 'b') => UserAction::QuitGame,
            Key::Char(_) => UserAction::None,
        }
    }

    fn on_enter(&mut self) {
        self.overlay = None;
    }
}

/// In-game HUD: `P` toggles pause, `F` toggles fast-forward, `Escape` opens
/// the in-game menu, `1`-`6` select a tower kind and a click places it.
#[derive(Clone, Debug, Default)]
pub struct HudScreen {
    selected: Option<TowerKind>,
}

impl HudScreen {
    /// Creates a HUD without a selected tower.
    #[must_use]
    pub const fn new() -> Self {
        Self { selected: None }
    }

    /// Tower kind placed by the next click.
    #[must_use]
    pub const fn selected(&self) -> Option<TowerKind> {
        self.selected
    }
}

impl Screen for HudScreen {
    fn on_input(
        &mut self,
        input: InputEvent,
        context: &ScreenContext,
        out: &mut Vec<Command>,
    ) -> UserAction {
        match input {
            InputEvent::Key(key) => match normalise(key) {
                Key::Escape => return UserAction::IngameMenu,
                Key::Char('p') => out.push(Command::TogglePause),
                Key::Char('f') => out.push(Command::ToggleFastForward),
                Key::Char(digit) => {
                    let slot = digit
                        .to_digit(10)
                        .and_then(|value| u8::try_from(value).ok())
                        .and_then(TowerKind::from_slot);
                    if let Some(kind) = slot {
                        self.selected = Some(kind);
                        out.push(Command::SelectTower { kind });
                    }
                }
            },
            InputEvent::Click { x, y } => {
                if let (Some(kind), Some(tile)) = (self.selected, tile_under(x, y, context)) {
                    out.push(Command::PlaceTower { kind, tile });
                }
            }
        }
        UserAction::None
    }
}

/// Pause menu: `R` or `Escape` resumes, `M` main menu, `N` new game, `Q`
/// quits.
#[derive(Clone, Copy, Debug, Default)]
pub struct IngameMenuScreen;

impl Screen for IngameMenuScreen {
    fn on_input(
        &mut self,
        input: InputEvent,
        _context: &ScreenContext,
        _out: &mut Vec<Command>,
    ) -> UserAction {
        match input {
            InputEvent::Key(key) => match normalise(key) {
                Key::Escape | Key::Char('r') => UserAction::ResumeGame,
                Key::Char('m') => UserAction::MainMenu,
                Key::Char('n') => UserAction::NewGame,
                Key::Char('q') => UserAction::QuitGame,
                Key::Char(_) => UserAction::None,
            },
            InputEvent::Click { .. } => UserAction::None,
        }
    }
}

/// End and success screens: `N` new game, `M` main menu, `Q` quits.
#[derive(Clone, Copy, Debug, Default)]
pub struct OutcomeScreen;

impl Screen for OutcomeScreen {
    fn on_input(
        &mut self,
        input: InputEvent,
        _context: &ScreenContext,
        _out: &mut Vec<Command>,
    ) -> UserAction {
        match input {
            InputEvent::Key(key) => match normalise(key) {
                Key::Char('n') => UserAction::NewGame,
                Key::Char('m') => UserAction::MainMenu,
                Key::Char('q') => UserAction::QuitGame,
                Key::Char(_) | Key::Escape => UserAction::None,
            },
            InputEvent::Click { .. } => UserAction::None,
        }
    }
}

fn normalise(key: Key) -> Key {
    match key {
        Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
        Key::Escape => Key::Escape,
    }
}

fn tile_under(x: f32, y: f32, context: &ScreenContext) -> Option<TileCoord> {
    let size = context.tile_size;
    if !(x.is_finite() && y.is_finite() && size.is_finite()) || x < 0.0 || y < 0.0 || size <= 0.0 {
        return None;
    }
    Some(TileCoord::new((x / size) as u32, (y / size) as u32))
}
