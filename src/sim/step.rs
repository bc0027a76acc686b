/// The step function: advances the world by one frame.
///
/// Processing order (Field phase):
///   1. Load a pending level, if the exit was reached last tick
///   2. For each entity in list order:
///        logic → advance → collision correction → camera follow
///   3. Exit check for the controlled entity
///   4. Draw-order sort by y
///   5. Animation, in draw order
///
/// Correction for entity `i` sees entities `< i` at their corrected
/// positions for this tick and entities `> i` at last tick's.
///
/// In the Paused phase only the pause toggle is processed.

use glam::Vec2;

use crate::domain::collision::correct_collision;
use crate::domain::entity::{run_logic, MoveIntent};
use crate::domain::geometry::detect_overlap;
use super::event::GameEvent;
use super::level::{load_level, LevelError};
use super::world::{Phase, World};

/// One frame of front-end input.
#[derive(Clone, Copy, Default, Debug)]
pub struct FrameInput {
    pub intent: MoveIntent,
    pub pause: bool,
    pub toggle_boxes: bool,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

/// Advance `world` by `elapsed_ms`. Fails only when a pending level
/// cannot be loaded; the world is unchanged in that case.
pub fn step(world: &mut World, input: &FrameInput, elapsed_ms: f32) -> Result<Vec<GameEvent>, LevelError> {
    let mut events = Vec::new();
    world.tick_message(elapsed_ms);

    if input.pause {
        toggle_pause(world, &mut events);
    }
    if world.phase != Phase::Field {
        return Ok(events);
    }

    if input.toggle_boxes {
        world.show_collision_boxes = !world.show_collision_boxes;
        events.push(GameEvent::CollisionBoxesToggled(world.show_collision_boxes));
    }

    load_pending_level(world, &mut events)?;

    world.tick += 1;
    move_entities(world, &input.intent, elapsed_ms);
    check_exit(world, &mut events);
    world.sort_draw_order();
    animate(world, elapsed_ms);

    Ok(events)
}

// ══════════════════════════════════════════════════════════════
// Phase
// ══════════════════════════════════════════════════════════════

fn toggle_pause(world: &mut World, events: &mut Vec<GameEvent>) {
    match world.phase {
        Phase::Field => {
            world.phase = Phase::Paused;
            if let Some(player) = world.player_mut() {
                player.vel = Vec2::ZERO;
            }
            log::debug!("tick {}: field -> paused", world.tick);
            events.push(GameEvent::Paused);
        }
        Phase::Paused => {
            world.phase = Phase::Field;
            log::debug!("tick {}: paused -> field", world.tick);
            events.push(GameEvent::Resumed);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Level transitions
// ══════════════════════════════════════════════════════════════

fn load_pending_level(world: &mut World, events: &mut Vec<GameEvent>) -> Result<(), LevelError> {
    let Some(path) = world.pending_level.clone() else {
        return Ok(());
    };
    let data = load_level(&path)?;
    world.open_level(data);
    events.push(GameEvent::LevelLoaded { name: world.level.name.clone() });
    Ok(())
}

fn check_exit(world: &mut World, events: &mut Vec<GameEvent>) {
    if world.pending_level.is_some() {
        return;
    }
    let (Some(exit), Some(next)) = (world.exit, world.next_level.clone()) else {
        return;
    };
    let reached = world
        .player()
        .map_or(false, |p| detect_overlap(&p.collision_box(), &exit).0);
    if reached {
        log::debug!("tick {}: exit reached, next level {}", world.tick, next.display());
        world.pending_level = Some(next.clone());
        events.push(GameEvent::ExitReached { next });
    }
}

// ══════════════════════════════════════════════════════════════
// Motion
// ══════════════════════════════════════════════════════════════

fn move_entities(world: &mut World, intent: &MoveIntent, elapsed_ms: f32) {
    let spawn = world.spawn;
    let motion = world.motion;

    for i in 0..world.entities.len() {
        let entity = &mut world.entities[i];
        run_logic(entity, intent, motion.max_speed, spawn);
        entity.advance(elapsed_ms, motion.max_speed);
        correct_collision(&mut world.entities, i, &world.level, motion.slide_threshold);
        world.follow_player();
    }
}

fn animate(world: &mut World, elapsed_ms: f32) {
    for &i in &world.draw_order {
        let entity = &mut world.entities[i];
        entity.anim.update(entity.vel, elapsed_ms);
    }
}
