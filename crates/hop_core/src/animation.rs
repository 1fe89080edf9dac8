//! Keyframe transform animation: clip data, the runtime state machine, and
//! clip files.
//!
//! A clip maps strictly increasing times to transform matrices. The runtime
//! `Animation` walks `BeforeStart -> Running -> Finished` and exposes the
//! interpolated matrix in `mat`. Looping clips play as a triangle wave over
//! twice their duration (forward, then backward) so symmetric swings only need
//! one half authored.
//!
//! The JSON format describes each keyframe as translation / rotation (degrees,
//! XYZ Euler) / scale; on load these are baked into matrices.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    #[default]
    Disabled,
    Once,
    Loop,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub time: f32,
    pub mat: Mat4,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimationInfo {
    pub kind: AnimationKind,
    keyframes: Vec<Keyframe>,
}

enum Sample {
    BeforeFirst,
    AtOrPastLast(Mat4),
    Between(Mat4),
}

impl AnimationInfo {
    pub fn new(kind: AnimationKind) -> Self {
        Self {
            kind,
            keyframes: Vec::new(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(AnimationKind::Disabled)
    }

    pub fn with_keyframe(mut self, time: f32, mat: Mat4) -> Self {
        self.insert_keyframe(time, mat);
        self
    }

    /// Insert keeping times sorted; an existing keyframe at `time` is replaced.
    pub fn insert_keyframe(&mut self, time: f32, mat: Mat4) {
        let index = self.keyframes.partition_point(|k| k.time < time);
        match self.keyframes.get_mut(index) {
            Some(existing) if existing.time == time => existing.mat = mat,
            _ => self.keyframes.insert(index, Keyframe { time, mat }),
        }
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Time of the last keyframe.
    pub fn duration(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    /// Same clip played `factor` times faster.
    pub fn time_scaled(&self, factor: f32) -> Self {
        Self {
            kind: self.kind,
            keyframes: self
                .keyframes
                .iter()
                .map(|k| Keyframe {
                    time: k.time / factor,
                    mat: k.mat,
                })
                .collect(),
        }
    }

    fn sample(&self, time: f32) -> Sample {
        // First keyframe strictly later than `time`.
        let hi = self.keyframes.partition_point(|k| k.time <= time);
        if hi == 0 {
            return Sample::BeforeFirst;
        }
        let Some(upper) = self.keyframes.get(hi) else {
            return Sample::AtOrPastLast(self.keyframes[hi - 1].mat);
        };
        let lower = &self.keyframes[hi - 1];
        let ratio = (time - lower.time) / (upper.time - lower.time);
        Sample::Between(interpolate_transforms(ratio, &lower.mat, &upper.mat))
    }
}

/// Component-wise linear blend of two matrices.
pub fn interpolate_transforms(ratio: f32, first: &Mat4, second: &Mat4) -> Mat4 {
    *first + (*second - *first) * ratio
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationState {
    #[default]
    BeforeStart,
    Running,
    Finished,
}

/// Runtime instance of a clip attached to one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub state: AnimationState,
    pub info: AnimationInfo,
    pub mat: Mat4,
    pub time_elapsed: f32,
}

impl Animation {
    pub fn new(info: AnimationInfo) -> Self {
        Self {
            state: AnimationState::BeforeStart,
            info,
            mat: Mat4::IDENTITY,
            time_elapsed: 0.0,
        }
    }

    pub fn disabled() -> Self {
        Self::new(AnimationInfo::disabled())
    }

    /// Replace the clip and restart from `BeforeStart`.
    pub fn set(&mut self, info: AnimationInfo) {
        self.info = info;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.state = AnimationState::BeforeStart;
    }

    /// Freeze at identity from the next tick on. State is left untouched.
    pub fn disable(&mut self) {
        self.info.kind = AnimationKind::Disabled;
    }

    pub fn is_running(&self) -> bool {
        self.state == AnimationState::Running
    }

    pub fn is_finished(&self) -> bool {
        self.state == AnimationState::Finished
    }

    /// Elapsed time mapped onto the clip's timeline.
    pub fn normalized_time(&self) -> f32 {
        if self.info.kind != AnimationKind::Loop {
            return self.time_elapsed;
        }
        let duration = self.info.duration();
        if duration <= 0.0 {
            return 0.0;
        }
        let modulo = self.time_elapsed % (2.0 * duration);
        if modulo > duration {
            2.0 * duration - modulo
        } else {
            modulo
        }
    }

    /// Advance by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        if self.info.kind == AnimationKind::Disabled {
            self.mat = Mat4::IDENTITY;
            return;
        }

        match self.state {
            AnimationState::BeforeStart => {
                self.state = AnimationState::Running;
                self.time_elapsed = 0.0;
                self.mat = Mat4::IDENTITY;
            }
            AnimationState::Running => {
                self.time_elapsed += dt;
                if self.info.keyframes.len() < 2 {
                    if let Some(only) = self.info.keyframes.first() {
                        self.mat = only.mat;
                    }
                    self.state = AnimationState::Finished;
                    return;
                }

                match self.info.sample(self.normalized_time()) {
                    Sample::BeforeFirst => self.state = AnimationState::Finished,
                    Sample::AtOrPastLast(last) => {
                        self.mat = last;
                        if self.info.kind == AnimationKind::Once {
                            self.state = AnimationState::Finished;
                        }
                    }
                    Sample::Between(mat) => self.mat = mat,
                }
            }
            AnimationState::Finished => {}
        }
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::disabled()
    }
}

/// A named set of clips (deserialized from JSON).
#[derive(Debug, Clone)]
pub struct AnimationFile {
    pub version: String,
    pub animation_id: String,
    pub clips: HashMap<String, AnimationInfo>,
}

// --- JSON deserialization types (private) ---

#[derive(Debug, Deserialize)]
struct AnimationFileJson {
    version: String,
    animation_id: String,
    clips: HashMap<String, AnimationClipJson>,
}

#[derive(Debug, Deserialize)]
struct AnimationClipJson {
    kind: AnimationKind,
    keyframes: Vec<KeyframeJson>,
}

#[derive(Debug, Deserialize)]
struct KeyframeJson {
    time: f32,
    #[serde(default)]
    translation: [f32; 3],
    #[serde(default)]
    rotation_deg: [f32; 3],
    #[serde(default = "default_scale")]
    scale: [f32; 3],
}

impl KeyframeJson {
    fn to_matrix(&self) -> Mat4 {
        let [rx, ry, rz] = self.rotation_deg.map(f32::to_radians);
        Mat4::from_scale_rotation_translation(
            Vec3::from(self.scale),
            Quat::from_euler(EulerRot::XYZ, rx, ry, rz),
            Vec3::from(self.translation),
        )
    }
}

const fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

pub fn load_animation_file(path: &Path) -> Result<AnimationFile, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read animation file {}: {e}", path.display()))?;
    parse_animation_file(&raw)
        .map_err(|e| format!("Failed to load animation file {}: {e}", path.display()))
}

pub fn parse_animation_file(raw: &str) -> Result<AnimationFile, String> {
    let json: AnimationFileJson =
        serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {e}"))?;
    validate_animation_json(&json)?;

    let clips = json
        .clips
        .into_iter()
        .map(|(name, clip)| {
            let info = clip
                .keyframes
                .iter()
                .fold(AnimationInfo::new(clip.kind), |info, k| {
                    info.with_keyframe(k.time, k.to_matrix())
                });
            (name, info)
        })
        .collect();

    Ok(AnimationFile {
        version: json.version,
        animation_id: json.animation_id,
        clips,
    })
}

fn validate_animation_json(json: &AnimationFileJson) -> Result<(), String> {
    if json.version != "0.1" {
        return Err(format!(
            "Animation validation failed: unsupported version '{}'",
            json.version
        ));
    }
    if json.animation_id.is_empty() {
        return Err("Animation validation failed: animation_id is empty".to_string());
    }
    for (name, clip) in &json.clips {
        if clip.kind != AnimationKind::Disabled && clip.keyframes.len() < 2 {
            return Err(format!(
                "Animation validation failed: clip '{}' needs at least two keyframes",
                name
            ));
        }
        let mut previous: Option<f32> = None;
        for (i, keyframe) in clip.keyframes.iter().enumerate() {
            if !keyframe.time.is_finite() || keyframe.time < 0.0 {
                return Err(format!(
                    "Animation validation failed: clip '{}' keyframe {} has invalid time",
                    name, i
                ));
            }
            if previous.is_some_and(|p| keyframe.time <= p) {
                return Err(format!(
                    "Animation validation failed: clip '{}' keyframe times must strictly increase",
                    name
                ));
            }
            previous = Some(keyframe.time);
        }
    }
    Ok(())
}
