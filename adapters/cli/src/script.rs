//! Scripted input for headless runs.
//!
//! Each non-empty line reads `<tick> <event>`, where the event is
//! `key:<char>`, `escape` or `click:<x>,<y>`. Lines starting with `#` are
//! ignored. Ticks must not decrease.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use waypoint_defence_system_screens::{InputEvent, Key};

const BUILTIN_SCRIPT: &str = include_str!("../scenarios/opening.inputs");

/// Input event scheduled for a specific tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ScriptedInput {
    pub(crate) tick: u64,
    pub(crate) event: InputEvent,
}

/// Ordered list of scripted inputs.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct InputScript {
    inputs: Vec<ScriptedInput>,
    cursor: usize,
}

impl InputScript {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read input script at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid input script at {}", path.display()))
    }

    pub(crate) fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_SCRIPT).context("invalid built-in input script")
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let mut inputs: Vec<ScriptedInput> = Vec::new();
        for (index, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let input = parse_line(line).with_context(|| format!("line {}", index + 1))?;
            if let Some(previous) = inputs.last() {
                if input.tick < previous.tick {
                    bail!(
                        "line {}: tick {} precedes tick {}",
                        index + 1,
                        input.tick,
                        previous.tick
                    );
                }
            }
            inputs.push(input);
        }
        Ok(Self { inputs, cursor: 0 })
    }

    /// Returns the inputs scheduled for `tick` and moves past them.
    pub(crate) fn take_due(&mut self, tick: u64) -> impl Iterator<Item = InputEvent> + '_ {
        let start = self.cursor;
        while self
            .inputs
            .get(self.cursor)
            .is_some_and(|input| input.tick <= tick)
        {
            self.cursor += 1;
        }
        self.inputs[start..self.cursor].iter().map(|input| input.event)
    }

    /// Reports whether inputs remain after the ones already taken.
    pub(crate) fn has_remaining(&self) -> bool {
        self.cursor < self.inputs.len()
    }
}

fn parse_line(line: &str) -> Result<ScriptedInput> {
    let Some((tick, event)) = line.split_once(char::is_whitespace) else {
        bail!("expected `<tick> <event>`, found `{line}`");
    };
    let tick = tick
        .parse::<u64>()
        .with_context(|| format!("invalid tick `{tick}`"))?;
    let event = parse_event(event.trim())?;
    Ok(ScriptedInput { tick, event })
}

fn parse_event(event: &str) -> Result<InputEvent> {
    if event == "escape" || event == "esc" {
        return Ok(InputEvent::Key(Key::Escape));
    }

    if let Some(key) = event.strip_prefix("key:") {
        let mut chars = key.chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(InputEvent::Key(Key::Char(c))),
            _ => bail!("key events take exactly one character, found `{key}`"),
        };
    }

    if let Some(position) = event.strip_prefix("click:") {
        let Some((x, y)) = position.split_once(',') else {
            bail!("click events take `<x>,<y>`, found `{position}`");
        };
        let x = x
            .trim()
            .parse::<f32>()
            .with_context(|| format!("invalid click x `{x}`"))?;
        let y = y
            .trim()
            .parse::<f32>()
            .with_context(|| format!("invalid click y `{y}`"))?;
        return Ok(InputEvent::Click { x, y });
    }

    bail!("unknown input event `{event}`")
}
