//! Kinematic player controller
//!
//! Movement is resolved one axis at a time (X, then Y, then Z), each step
//! followed by an overlap query at the new position. A colliding step is
//! reverted and that axis's velocity zeroed; trigger tags on the colliding
//! primitive change the response (jump pads launch, hazards respawn). This
//! sequential resolution can tunnel through thin diagonal geometry, which is
//! accepted for block-based levels.

use glam::{Vec2, Vec3};
use prism_scene::{Block, Sphere, Trigger};
use tracing::debug;

use crate::collision::{query, Aabb};

/// Vertical speed applied by a jump-pad collision, replacing the normal stop.
const JUMP_PAD_IMPULSE: f32 = 50.0;

/// How long ground contact may lapse before the debounced flag drops.
const GROUND_RESET_DELAY: f32 = 0.3;

/// Pitch is clamped just short of vertical to keep the view basis stable.
const PITCH_LIMIT: f32 = 89.99;

/// Seconds between footstep events while walking grounded.
const STEP_INTERVAL: f32 = 0.35;

/// Downward speed at which an arrested fall counts as a hard landing.
const HARD_LANDING_SPEED: f32 = 10.0;

/// Positional/rotational change below this does not count as a view change.
const VIEW_EPSILON: f32 = 1e-4;

/// Movement tunables, edited live by the debug HUD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerTuning {
    pub walk_speed: f32,
    pub rotate_speed: f32,
    pub jump_impulse: f32,
    /// Eye offset below the top of the bounding box.
    pub eye_height: f32,
    pub fly_mode: bool,
    pub cinematic_mode: bool,
    /// First-order smoothing sharpness for cinematic orientation.
    pub cinematic_sharpness: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            walk_speed: 6.0,
            rotate_speed: 0.09,
            jump_impulse: 1.5,
            eye_height: 0.2,
            fly_mode: false,
            cinematic_mode: false,
            cinematic_sharpness: 10.0,
        }
    }
}

/// One frame of movement input, already mapped from whatever device produced
/// it.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlayerInput {
    pub forward: bool,
    pub back: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
    /// Jump while grounded; ascend in fly mode.
    pub jump: bool,
    /// Descend in fly mode.
    pub descend: bool,
    /// Pointer motion in pixels (x: yaw, y: pitch).
    pub look_delta: Vec2,
}

/// Frame-tick outcomes the caller reacts to (accumulation reset, sounds).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickEvents {
    /// Position or rotation moved more than an epsilon this tick.
    pub view_changed: bool,
    /// Footstep cadence pulse while walking on the ground.
    pub stepped: bool,
    /// A fast fall was arrested by ground contact.
    pub landed_hard: bool,
    /// A hazard was touched; position is back at the spawn point.
    pub respawned: bool,
}

pub struct Player {
    /// Minimum corner of the bounding box.
    pub position: Vec3,
    /// Pitch, yaw, roll in degrees. Roll is only driven by cinematic
    /// smoothing.
    pub rotation: Vec3,
    pub velocity: Vec3,
    /// Bounding box extent.
    pub size: Vec3,
    pub tuning: PlayerTuning,

    spawn: Vec3,
    /// Orientation the camera eases toward in cinematic mode.
    target_rotation: Vec3,

    /// Contact result of the previous tick's Y resolution.
    raw_on_ground: bool,
    on_ground: bool,
    ground_timer: f32,
    step_timer: f32,
}

impl Player {
    pub fn new(position: Vec3, rotation: Vec3, size: Vec3) -> Self {
        Self {
            position,
            rotation,
            velocity: Vec3::ZERO,
            size,
            tuning: PlayerTuning::default(),
            spawn: position,
            target_rotation: rotation,
            raw_on_ground: false,
            on_ground: false,
            ground_timer: 0.0,
            step_timer: 0.0,
        }
    }

    /// Debounced ground contact.
    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn spawn_point(&self) -> Vec3 {
        self.spawn
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.position, self.size)
    }

    /// Camera position: horizontal center of the box, eye offset below its
    /// top.
    pub fn eye_position(&self) -> Vec3 {
        Vec3::new(
            self.position.x + self.size.x / 2.0,
            self.position.y + self.size.y - self.tuning.eye_height,
            self.position.z + self.size.z / 2.0,
        )
    }

    pub fn respawn(&mut self) {
        debug!(spawn = ?self.spawn, "player respawned");
        self.velocity = Vec3::ZERO;
        self.position = self.spawn;
    }

    /// Advance one simulation tick.
    pub fn update(
        &mut self,
        input: &PlayerInput,
        dt: f32,
        gravity: f32,
        blocks: &[Block],
        spheres: &[Sphere],
    ) -> TickEvents {
        let start_position = self.position;
        let start_rotation = self.rotation;
        let mut events = TickEvents::default();

        // Horizontal velocity is direction-driven, not persistent.
        self.velocity.x = 0.0;
        self.velocity.z = 0.0;

        if !self.tuning.fly_mode {
            self.velocity.y -= gravity * dt;
        } else {
            self.velocity.y = 0.0;
        }

        let yaw = self.rotation.y;
        if input.forward {
            self.velocity.x += yaw.to_radians().sin();
            self.velocity.z += yaw.to_radians().cos();
        }
        if input.back {
            self.velocity.x += (yaw + 180.0).to_radians().sin();
            self.velocity.z += (yaw + 180.0).to_radians().cos();
        }
        if input.strafe_right {
            self.velocity.x += (yaw + 90.0).to_radians().sin();
            self.velocity.z += (yaw + 90.0).to_radians().cos();
        }
        if input.strafe_left {
            self.velocity.x += (yaw - 90.0).to_radians().sin();
            self.velocity.z += (yaw - 90.0).to_radians().cos();
        }

        if !self.tuning.fly_mode {
            if input.jump && self.on_ground {
                self.velocity.y = self.tuning.jump_impulse;
                self.raw_on_ground = false;
                self.on_ground = false;
            }
        } else {
            if input.jump {
                self.velocity.y += 1.0;
            }
            if input.descend {
                self.velocity.y -= 1.0;
            }
        }

        // Debounce on the previous tick's contact: contact pins the flag and
        // clears the timer, a lapse only drops the flag once the timer runs
        // out. Keeps stair seams from flickering the grounded state.
        if self.raw_on_ground {
            self.on_ground = true;
            self.ground_timer = 0.0;
        } else if self.ground_timer >= GROUND_RESET_DELAY {
            self.on_ground = false;
        } else {
            self.ground_timer += dt;
        }

        // Diagonal movement is no faster than axis movement.
        let horizontal = Vec2::new(self.velocity.x, self.velocity.z);
        let horizontal_len = horizontal.length();
        if horizontal_len > 0.0 {
            self.velocity.x /= horizontal_len;
            self.velocity.z /= horizontal_len;
        }

        self.raw_on_ground = false;
        let mut hazard = false;

        // X
        let step = self.velocity.x * self.tuning.walk_speed * dt;
        self.position.x += step;
        if let Some(trigger) = query(&self.aabb(), blocks, spheres) {
            hazard |= *trigger == Trigger::Hazard;
            self.position.x -= step;
            self.velocity.x = 0.0;
        }

        // Y: vertical speed is in world units already, except in fly mode
        // where it is an input direction scaled like walking.
        let vertical_scale = if self.tuning.fly_mode {
            self.tuning.walk_speed
        } else {
            1.0
        };
        let step = self.velocity.y * vertical_scale * dt;
        self.position.y += step;
        if let Some(trigger) = query(&self.aabb(), blocks, spheres) {
            hazard |= *trigger == Trigger::Hazard;
            self.position.y -= step;

            if *trigger == Trigger::JumpPad {
                self.velocity.y = JUMP_PAD_IMPULSE;
            } else {
                if self.velocity.y <= 0.0 {
                    self.raw_on_ground = true;
                    events.landed_hard = self.velocity.y <= -HARD_LANDING_SPEED;
                }
                self.velocity.y = 0.0;
            }
        }

        // Z
        let step = self.velocity.z * self.tuning.walk_speed * dt;
        self.position.z += step;
        if let Some(trigger) = query(&self.aabb(), blocks, spheres) {
            hazard |= *trigger == Trigger::Hazard;
            self.position.z -= step;
            self.velocity.z = 0.0;
        }

        if hazard {
            self.respawn();
            events.respawned = true;
        }

        self.turn(input.look_delta, dt);
        self.tick_footsteps(horizontal_len, dt, &mut events);

        events.view_changed = self.position.distance_squared(start_position)
            > VIEW_EPSILON * VIEW_EPSILON
            || (self.rotation - start_rotation).abs().max_element() > VIEW_EPSILON;

        events
    }

    fn turn(&mut self, look_delta: Vec2, dt: f32) {
        let look = look_delta * self.tuning.rotate_speed;

        if self.tuning.cinematic_mode {
            self.target_rotation.x =
                (self.target_rotation.x - look.y).clamp(-PITCH_LIMIT, PITCH_LIMIT);
            self.target_rotation.y = wrap_degrees(self.target_rotation.y + look.x);

            // First-order ease toward the target, applied per axis.
            let blend = self.tuning.cinematic_sharpness * dt;
            self.rotation += blend * (self.target_rotation - self.rotation);
        } else {
            self.rotation.x = (self.rotation.x - look.y).clamp(-PITCH_LIMIT, PITCH_LIMIT);
            self.rotation.y = wrap_degrees(self.rotation.y + look.x);

            // Keep the cinematic target in step so enabling the mode does not
            // lurch.
            self.target_rotation = self.rotation;
        }
    }

    fn tick_footsteps(&mut self, horizontal_len: f32, dt: f32, events: &mut TickEvents) {
        if self.on_ground && horizontal_len > 0.0 {
            self.step_timer += dt;
            if self.step_timer >= STEP_INTERVAL {
                self.step_timer = 0.0;
                events.stepped = true;
            }
        } else {
            self.step_timer = 0.0;
        }
    }
}

fn wrap_degrees(angle: f32) -> f32 {
    angle - (angle / 360.0).floor() * 360.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;
    const GRAVITY: f32 = 25.0;

    fn block(position: Vec3, size: Vec3, tag: &str) -> Block {
        Block {
            position,
            size,
            material: 0,
            trigger: Trigger::from_tag(tag),
        }
    }

    fn player() -> Player {
        Player::new(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, Vec3::new(0.4, 1.76, 0.4))
    }

    fn floor() -> Vec<Block> {
        vec![block(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(2.0, 1.0, 2.0),
            "",
        )]
    }

    fn settle(player: &mut Player, blocks: &[Block], ticks: usize) {
        let input = PlayerInput::default();
        for _ in 0..ticks {
            player.update(&input, DT, GRAVITY, blocks, &[]);
        }
    }

    #[test]
    fn falls_and_rests_on_box_top() {
        let blocks = floor();
        let mut player = player();

        settle(&mut player, &blocks, 120);

        // Descent stops with the box bottom resting on the box top (y = 0);
        // axis reversion leaves it within one sub-step above the surface.
        assert!(player.position.y >= 0.0, "sank to {}", player.position.y);
        assert!(player.position.y < 0.05, "hovering at {}", player.position.y);
        assert_eq!(player.velocity.y, 0.0);
        assert!(player.on_ground());
    }

    #[test]
    fn ground_debounce_outlasts_short_gaps() {
        let blocks = floor();
        let mut player = player();
        settle(&mut player, &blocks, 120);

        // Remove the floor: contact lapses but the debounced flag holds
        // until the delay elapses.
        let input = PlayerInput::default();
        let mut airborne_time = 0.0;
        while player.on_ground() {
            player.update(&input, DT, GRAVITY, &[], &[]);
            airborne_time += DT;
            assert!(airborne_time < 1.0, "never went airborne");
        }

        assert!(airborne_time >= GROUND_RESET_DELAY);
        assert!(airborne_time <= GROUND_RESET_DELAY + 3.0 * DT);
    }

    #[test]
    fn jump_requires_ground_and_clears_it() {
        let blocks = floor();
        let mut player = player();
        settle(&mut player, &blocks, 120);
        let rest_y = player.position.y;

        let input = PlayerInput {
            jump: true,
            ..Default::default()
        };
        player.update(&input, DT, GRAVITY, &blocks, &[]);

        assert!(player.position.y > rest_y);
        assert!(!player.on_ground());

        // Airborne jump input does nothing further.
        let vy = player.velocity.y;
        player.update(&input, DT, GRAVITY, &blocks, &[]);
        assert!(player.velocity.y < vy);
    }

    #[test]
    fn jump_pad_overrides_the_stop() {
        let blocks = vec![block(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(2.0, 1.0, 2.0),
            "jump_pad",
        )];
        let mut player = player();

        let input = PlayerInput::default();
        let mut launched = false;
        for _ in 0..120 {
            player.update(&input, DT, GRAVITY, &blocks, &[]);
            if player.velocity.y > 0.0 {
                launched = true;
                break;
            }
        }

        assert!(launched, "never hit the pad");
        assert_eq!(player.velocity.y, JUMP_PAD_IMPULSE);
        // The pad does not ground the player.
        assert!(!player.on_ground());
    }

    #[test]
    fn hazard_respawns_within_the_tick() {
        let blocks = vec![block(
            Vec3::new(-10.0, 0.0, -10.0),
            Vec3::new(20.0, 1.0, 20.0),
            "laser",
        )];
        let mut player = player();
        let spawn = player.spawn_point();

        let input = PlayerInput::default();
        let mut events = TickEvents::default();
        for _ in 0..240 {
            events = player.update(&input, DT, GRAVITY, &blocks, &[]);
            if events.respawned {
                break;
            }
        }

        assert!(events.respawned);
        assert_eq!(player.position, spawn);
        assert_eq!(player.velocity, Vec3::ZERO);
    }

    #[test]
    fn blocked_axis_reverts_without_stopping_the_others() {
        // Wall east of the player; walking diagonally (+x, +z) slides along
        // it.
        let blocks = vec![block(
            Vec3::new(0.5, -10.0, -10.0),
            Vec3::new(1.0, 20.0, 20.0),
            "",
        )];
        let mut player = Player::new(Vec3::ZERO, Vec3::ZERO, Vec3::new(0.4, 1.76, 0.4));
        player.tuning.fly_mode = true;

        // Yaw 45: forward carries both +x and +z.
        player.rotation.y = 45.0;
        let input = PlayerInput {
            forward: true,
            ..Default::default()
        };
        for _ in 0..30 {
            player.update(&input, DT, GRAVITY, &blocks, &[]);
        }

        assert!(player.position.x < 0.11, "pushed into wall: {}", player.position.x);
        assert!(player.position.z > 0.5, "did not slide: {}", player.position.z);
        assert_eq!(query(&player.aabb(), &blocks, &[]), None);
    }

    #[test]
    fn diagonal_movement_is_normalized() {
        let mut player = Player::new(Vec3::ZERO, Vec3::ZERO, Vec3::new(0.4, 1.76, 0.4));
        player.tuning.fly_mode = true;

        let input = PlayerInput {
            forward: true,
            strafe_right: true,
            ..Default::default()
        };
        player.update(&input, DT, GRAVITY, &[], &[]);

        let moved = Vec2::new(player.position.x, player.position.z).length();
        let expected = player.tuning.walk_speed * DT;
        assert!((moved - expected).abs() < 1e-4);
    }

    #[test]
    fn fly_mode_ignores_gravity_and_follows_vertical_input() {
        let mut player = Player::new(Vec3::ZERO, Vec3::ZERO, Vec3::new(0.4, 1.76, 0.4));
        player.tuning.fly_mode = true;

        let up = PlayerInput {
            jump: true,
            ..Default::default()
        };
        player.update(&up, DT, GRAVITY, &[], &[]);
        assert!(player.position.y > 0.0);

        let down = PlayerInput {
            descend: true,
            ..Default::default()
        };
        let y = player.position.y;
        player.update(&down, DT, GRAVITY, &[], &[]);
        player.update(&down, DT, GRAVITY, &[], &[]);
        assert!(player.position.y < y);
    }

    #[test]
    fn pitch_clamps_and_yaw_wraps() {
        let mut player = Player::new(Vec3::ZERO, Vec3::ZERO, Vec3::ONE);
        player.tuning.fly_mode = true;

        let input = PlayerInput {
            look_delta: Vec2::new(10_000.0, -10_000.0),
            ..Default::default()
        };
        player.update(&input, DT, GRAVITY, &[], &[]);

        assert_eq!(player.rotation.x, PITCH_LIMIT);
        assert!(player.rotation.y >= 0.0 && player.rotation.y < 360.0);
    }

    #[test]
    fn cinematic_mode_eases_toward_the_target() {
        let mut player = Player::new(Vec3::ZERO, Vec3::ZERO, Vec3::ONE);
        player.tuning.fly_mode = true;
        player.tuning.cinematic_mode = true;

        let input = PlayerInput {
            look_delta: Vec2::new(100.0, 0.0),
            ..Default::default()
        };
        player.update(&input, DT, GRAVITY, &[], &[]);

        let target = 100.0 * player.tuning.rotate_speed;
        let expected = player.tuning.cinematic_sharpness * DT * target;
        assert!((player.rotation.y - expected).abs() < 1e-3);
        assert!(player.rotation.y < target);

        // With no further input the rendered yaw keeps approaching the
        // target.
        let still = PlayerInput::default();
        for _ in 0..600 {
            player.update(&still, DT, GRAVITY, &[], &[]);
        }
        assert!((player.rotation.y - target).abs() < 1e-2);
    }

    #[test]
    fn view_change_tracks_motion_and_look() {
        let blocks = floor();
        let mut player = player();
        settle(&mut player, &blocks, 240);

        // At rest: nothing moves, no reset requested.
        let events = player.update(&PlayerInput::default(), DT, GRAVITY, &blocks, &[]);
        assert!(!events.view_changed);

        let events = player.update(
            &PlayerInput {
                look_delta: Vec2::new(5.0, 0.0),
                ..Default::default()
            },
            DT,
            GRAVITY,
            &blocks,
            &[],
        );
        assert!(events.view_changed);
    }

    #[test]
    fn walking_emits_footsteps_on_a_cadence() {
        let blocks = vec![block(
            Vec3::new(-50.0, -1.0, -50.0),
            Vec3::new(100.0, 1.0, 100.0),
            "",
        )];
        let mut player = player();
        settle(&mut player, &blocks, 120);

        let input = PlayerInput {
            forward: true,
            ..Default::default()
        };
        let mut steps = 0;
        for _ in 0..120 {
            if player.update(&input, DT, GRAVITY, &blocks, &[]).stepped {
                steps += 1;
            }
        }

        // Two seconds of walking at a 0.35 s cadence.
        assert!((4..=6).contains(&steps), "{steps} steps");
    }

    #[test]
    fn eye_position_derives_from_the_aabb() {
        let player = player();

        assert_eq!(
            player.eye_position(),
            Vec3::new(0.2, 5.0 + 1.76 - player.tuning.eye_height, 0.2)
        );
    }
}
