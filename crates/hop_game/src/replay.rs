use hop_core::input::InputKind;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Scripted input for headless runs. Each frame entry is repeated `repeat`
/// times; an entry with `input` presses that direction on every one of its
/// frames, an entry without it just lets time pass.
#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub input: Option<ReplayInput>,
    /// Switch pass-through mode on or off from this frame on.
    #[serde(default)]
    pub pass_through: Option<bool>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReplayInput {
    Up,
    Down,
    Left,
    Right,
}

impl From<ReplayInput> for InputKind {
    fn from(input: ReplayInput) -> Self {
        match input {
            ReplayInput::Up => InputKind::Up,
            ReplayInput::Down => InputKind::Down,
            ReplayInput::Left => InputKind::Left,
            ReplayInput::Right => InputKind::Right,
        }
    }
}

/// What happens on one simulated frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplayStep {
    pub input: Option<InputKind>,
    pub pass_through: Option<bool>,
}

impl ReplaySequence {
    pub fn expanded_steps(&self) -> Vec<ReplayStep> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for _ in 0..frame.repeat.max(1) {
                out.push(ReplayStep {
                    input: frame.input.map(InputKind::from),
                    pass_through: frame.pass_through,
                });
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    parse_replay(&raw).map_err(|e| format!("{e} ({})", path.display()))
}

pub fn parse_replay(raw: &str) -> Result<ReplaySequence, String> {
    let replay: ReplaySequence =
        serde_json::from_str(raw).map_err(|e| format!("Failed to parse replay JSON: {e}"))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt <= 0.0 || !replay.fixed_dt.is_finite() {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}
