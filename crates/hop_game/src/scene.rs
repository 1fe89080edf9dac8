//! Level description: where the character starts, the cars, the zones that
//! restrict movement, the win zone and the shoe pickups.
//!
//! A scene is loaded and validated as JSON, then spawned into a context as
//! entities. Model parts (legs, wheels) become child entities of the thing
//! they belong to, optionally animated by a clip from the animation library.

use glam::{Mat4, Vec3};
use hop_core::animation::Animation;
use hop_core::bounding_box::BoundingBox3D;
use hop_core::{Context, EcsResult, EntityId};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::animation::AnimationLibrary;
use crate::components::{
    ActionKind, ActionRestriction, Car, Character, Mesh, ShoeItem, WinZone,
};
use crate::config::GameConfig;
use crate::registry::Registry;

#[derive(Debug, Deserialize, Clone)]
pub struct SceneFile {
    pub version: String,
    pub scene_id: String,
    #[serde(default)]
    pub config: GameConfig,
    /// Animation definition files the scene's clips come from.
    #[serde(default)]
    pub animation_files: Vec<String>,
    pub character: SceneCharacter,
    #[serde(default)]
    pub cars: Vec<SceneCar>,
    #[serde(default)]
    pub restrictions: Vec<SceneRestriction>,
    #[serde(default)]
    pub win_zones: Vec<SceneZone>,
    #[serde(default)]
    pub shoes: Vec<SceneShoe>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SceneBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl SceneBox {
    pub fn to_bounding_box(self) -> BoundingBox3D {
        BoundingBox3D::new(Vec3::from(self.min), Vec3::from(self.max))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScenePart {
    pub model_index: usize,
    #[serde(default)]
    pub offset: [f32; 3],
    #[serde(default)]
    pub clip: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SceneCharacter {
    pub model_index: usize,
    #[serde(default)]
    pub position: [f32; 3],
    pub model_box: SceneBox,
    #[serde(default)]
    pub parts: Vec<ScenePart>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SceneCar {
    pub model_index: usize,
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    pub model_box: SceneBox,
    #[serde(default)]
    pub parts: Vec<ScenePart>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SceneRestriction {
    #[serde(rename = "box")]
    pub bounds: SceneBox,
    pub actions: Vec<ActionKind>,
    #[serde(default)]
    pub ignore_passthrough: bool,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SceneZone {
    #[serde(rename = "box")]
    pub bounds: SceneBox,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SceneShoe {
    pub model_index: usize,
    pub position: [f32; 3],
    pub model_box: SceneBox,
}

pub fn load_scene_from_path(scene_path: &Path) -> Result<SceneFile, String> {
    let raw = fs::read_to_string(scene_path)
        .map_err(|e| format!("Failed to read scene file {}: {e}", scene_path.display()))?;
    parse_scene(&raw).map_err(|e| format!("{e} ({})", scene_path.display()))
}

pub fn parse_scene(raw: &str) -> Result<SceneFile, String> {
    let scene: SceneFile =
        serde_json::from_str(raw).map_err(|e| format!("Failed to parse scene JSON: {e}"))?;
    validate_scene(&scene)?;
    Ok(scene)
}

fn validate_scene(scene: &SceneFile) -> Result<(), String> {
    if scene.version != "0.1" {
        return Err(format!(
            "Scene validation failed: unsupported version '{}'",
            scene.version
        ));
    }
    if scene.scene_id.is_empty() {
        return Err("Scene validation failed: scene_id is empty".to_string());
    }
    scene.config.validate()?;

    check_box("character model_box", &scene.character.model_box)?;
    for (index, car) in scene.cars.iter().enumerate() {
        check_box(&format!("car {index} model_box"), &car.model_box)?;
        if !Vec3::from(car.velocity).is_finite() {
            return Err(format!(
                "Scene validation failed: car {index} velocity is not finite"
            ));
        }
    }
    for (index, restriction) in scene.restrictions.iter().enumerate() {
        check_box(&format!("restriction {index} box"), &restriction.bounds)?;
        if restriction.actions.is_empty() {
            log::warn!(
                "Scene restriction {} blocks no actions. This is allowed but often accidental.",
                index
            );
        }
    }
    for (index, zone) in scene.win_zones.iter().enumerate() {
        check_box(&format!("win zone {index} box"), &zone.bounds)?;
    }
    for (index, shoe) in scene.shoes.iter().enumerate() {
        check_box(&format!("shoe {index} model_box"), &shoe.model_box)?;
    }
    if scene.win_zones.is_empty() {
        log::warn!("Scene '{}' has no win zone; the level cannot be won", scene.scene_id);
    }
    Ok(())
}

fn check_box(label: &str, bounds: &SceneBox) -> Result<(), String> {
    let bb = bounds.to_bounding_box();
    if !bb.min_point.is_finite() || !bb.max_point.is_finite() || !bb.is_valid() {
        return Err(format!(
            "Scene validation failed: {label} must have finite min <= max"
        ));
    }
    Ok(())
}

/// Every clip named by a model part must resolve in `library`.
pub fn validate_scene_clips(scene: &SceneFile, library: &AnimationLibrary) -> Result<(), String> {
    let parts = scene
        .character
        .parts
        .iter()
        .chain(scene.cars.iter().flat_map(|car| car.parts.iter()));
    for part in parts {
        if let Some(clip) = &part.clip {
            if library.resolve_clip(None, clip).is_none() {
                return Err(format!(
                    "Scene validation failed: part references missing clip '{clip}'"
                ));
            }
        }
    }
    Ok(())
}

/// Create the scene's entities in `ctx`. The character is spawned first.
pub fn spawn_scene(
    ctx: &mut Context<Registry>,
    scene: &SceneFile,
    library: &AnimationLibrary,
) -> EcsResult<()> {
    let character = &scene.character;
    let character_id = spawn_mesh(ctx, character.model_index, character.position)?;
    ctx.registry.characters.insert(
        character_id,
        Character::new(character.model_box.to_bounding_box()),
    );
    ctx.registry
        .animations
        .insert(character_id, Animation::disabled());
    ctx.registry.character_id = Some(character_id);
    spawn_parts(ctx, character_id, &character.parts, library)?;

    for car in &scene.cars {
        let id = spawn_mesh(ctx, car.model_index, car.position)?;
        ctx.registry.cars.insert(
            id,
            Car {
                vel: Vec3::from(car.velocity),
                model_bb: car.model_box.to_bounding_box(),
            },
        );
        spawn_parts(ctx, id, &car.parts, library)?;
    }

    for restriction in &scene.restrictions {
        let id = ctx.entities.next_id()?;
        ctx.registry.action_restrictions.insert(
            id,
            ActionRestriction {
                bounding_box: restriction.bounds.to_bounding_box(),
                restrictions: restriction.actions.clone(),
                ignore_passthrough: restriction.ignore_passthrough,
            },
        );
    }

    for zone in &scene.win_zones {
        let id = ctx.entities.next_id()?;
        ctx.registry.win_zones.insert(
            id,
            WinZone {
                bounding_box: zone.bounds.to_bounding_box(),
            },
        );
    }

    for shoe in &scene.shoes {
        let id = spawn_mesh(ctx, shoe.model_index, shoe.position)?;
        ctx.registry.shoe_items.insert(
            id,
            ShoeItem {
                model_bb: shoe.model_box.to_bounding_box(),
            },
        );
    }

    log::info!(
        "Spawned scene '{}': {} entities, {} car(s), {} shoe(s)",
        scene.scene_id,
        ctx.entities.live_count(),
        scene.cars.len(),
        scene.shoes.len()
    );
    Ok(())
}

fn spawn_mesh(
    ctx: &mut Context<Registry>,
    model_index: usize,
    position: [f32; 3],
) -> EcsResult<EntityId> {
    let id = ctx.entities.next_id()?;
    ctx.registry.meshes.insert(
        id,
        Mesh {
            model_index,
            mat: Mat4::from_translation(Vec3::from(position)),
        },
    );
    Ok(id)
}

fn spawn_parts(
    ctx: &mut Context<Registry>,
    parent: EntityId,
    parts: &[ScenePart],
    library: &AnimationLibrary,
) -> EcsResult<()> {
    for part in parts {
        let id = spawn_mesh(ctx, part.model_index, part.offset)?;
        ctx.entities.link_parent_child(parent, id)?;
        let Some(name) = &part.clip else {
            continue;
        };
        let animation = match library.resolve_clip(None, name) {
            Some(info) => Animation::new(info.clone()),
            None => {
                log::warn!("Clip '{}' not found; part {} stays still", name, id);
                Animation::disabled()
            }
        };
        ctx.registry.animations.insert(id, animation);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hop_core::animation::{AnimationInfo, AnimationKind};
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "hop_scene_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    const VALID_SCENE: &str = r#"
    {
      "version": "0.1",
      "scene_id": "test_scene",
      "config": { "move_duration": 0.1 },
      "character": {
        "model_index": 0,
        "position": [0.125, 0.0, 0.875],
        "model_box": { "min": [-0.1, 0.0, -0.1], "max": [0.1, 0.2, 0.1] },
        "parts": [ { "model_index": 1, "offset": [0.0, 0.05, 0.0], "clip": "leg_swing" } ]
      },
      "cars": [
        {
          "model_index": 2,
          "position": [-1.0, 0.0, 0.375],
          "velocity": [0.5, 0.0, 0.0],
          "model_box": { "min": [-0.2, 0.0, -0.1], "max": [0.2, 0.2, 0.1] },
          "parts": [ { "model_index": 3 } ]
        }
      ],
      "restrictions": [
        { "box": { "min": [-1.1, -1.0, -1.0], "max": [-0.9, 1.0, 1.0] }, "actions": ["move_left"], "ignore_passthrough": true }
      ],
      "win_zones": [ { "box": { "min": [-1.0, -1.0, -1.0], "max": [1.0, 1.0, -0.5] } } ],
      "shoes": [
        { "model_index": 4, "position": [0.125, 0.0, 0.625], "model_box": { "min": [-0.05, 0.0, -0.05], "max": [0.05, 0.1, 0.05] } }
      ]
    }
    "#;

    fn library_with_leg_swing() -> AnimationLibrary {
        let mut library = AnimationLibrary::new();
        library.insert_clip(
            "rooster",
            "leg_swing",
            AnimationInfo::new(AnimationKind::Loop)
                .with_keyframe(0.0, Mat4::from_rotation_x(-0.5))
                .with_keyframe(0.2, Mat4::from_rotation_x(0.5)),
        );
        library
    }

    #[test]
    fn load_scene_from_path_parses_valid_scene() {
        let path = temp_file_path("valid");
        fs::write(&path, VALID_SCENE).expect("write temp scene file");

        let scene = load_scene_from_path(&path).expect("valid scene should load");
        assert_eq!(scene.scene_id, "test_scene");
        assert_eq!(scene.config.move_duration, 0.1);
        assert_eq!(scene.config.grid_size, 8);
        assert_eq!(scene.cars.len(), 1);
        assert_eq!(scene.restrictions[0].actions, vec![ActionKind::MoveLeft]);
        assert!(scene.restrictions[0].ignore_passthrough);
        assert_eq!(scene.cars[0].parts[0].offset, [0.0, 0.0, 0.0]);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_inverted_box() {
        let json = VALID_SCENE.replace(
            r#""min": [-0.1, 0.0, -0.1], "max": [0.1, 0.2, 0.1]"#,
            r#""min": [0.1, 0.0, -0.1], "max": [-0.1, 0.2, 0.1]"#,
        );
        let err = parse_scene(&json).expect_err("inverted box should fail");
        assert!(err.contains("character model_box"));
    }

    #[test]
    fn rejects_missing_character() {
        let err = parse_scene(r#"{ "version": "0.1", "scene_id": "empty" }"#)
            .expect_err("scene without character");
        assert!(err.contains("character"));
    }

    #[test]
    fn rejects_invalid_embedded_config() {
        let json = VALID_SCENE.replace(r#""move_duration": 0.1"#, r#""move_duration": 0.0"#);
        let err = parse_scene(&json).expect_err("bad config");
        assert!(err.contains("move_duration"));
    }

    #[test]
    fn clip_references_must_resolve() {
        let scene = parse_scene(VALID_SCENE).expect("scene should parse");
        let err = validate_scene_clips(&scene, &AnimationLibrary::new())
            .expect_err("missing clip");
        assert!(err.contains("leg_swing"));
        validate_scene_clips(&scene, &library_with_leg_swing()).expect("clip resolves");
    }

    #[test]
    fn spawn_creates_entities_and_hierarchy() {
        let scene = parse_scene(VALID_SCENE).expect("scene should parse");
        let mut ctx = Context::new(Registry::new(scene.config));
        spawn_scene(&mut ctx, &scene, &library_with_leg_swing()).expect("spawn");

        // character + leg, car + part, restriction, win zone, shoe
        assert_eq!(ctx.entities.live_count(), 7);

        let character = ctx.registry.character_id.expect("character id");
        assert_eq!(character, EntityId::from_index(0));
        assert!(ctx.registry.characters.contains(character));
        let animation = ctx.registry.animations.get(character).expect("animation");
        assert_eq!(animation.info.kind, AnimationKind::Disabled);

        let leg = ctx.entities.children(character)[0];
        assert_eq!(ctx.entities.parent(leg), Some(character));
        assert_eq!(
            ctx.registry.animations.get(leg).expect("leg animation").info.kind,
            AnimationKind::Loop
        );

        assert_eq!(ctx.registry.cars.len(), 1);
        assert_eq!(ctx.registry.action_restrictions.len(), 1);
        assert_eq!(ctx.registry.win_zones.len(), 1);
        assert_eq!(ctx.registry.shoe_items.len(), 1);
        let (car, _) = ctx.registry.cars.iter().next().expect("car");
        let wheel = ctx.entities.children(car)[0];
        assert!(ctx.registry.meshes.contains(wheel));
        assert!(!ctx.registry.animations.contains(wheel));
    }
}
