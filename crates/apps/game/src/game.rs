//! Per-frame wiring of player, renderer, audio, and HUD

use std::path::Path;

use app::{App, CursorMode, FrameContext, InputState};
use glam::Vec3;
use prism_audio::{AudioEngine, Volume};
use prism_physics::{Player, PlayerInput};
use prism_scene::Scene;
use renderer::{AccumulationRenderer, CameraState, RenderSettings, SceneTextures};
use tracing::{error, info, warn};
use winit::keyboard::KeyCode;

use crate::hud;
use crate::sounds::SoundBank;
use crate::tuning::Tuning;

pub const WINDOW_TITLE: &str = "Prism";

const SHADER_DIR: &str = "res/shaders";
const SOUND_DIR: &str = "res/sounds";

/// Falling below this height respawns the player.
const KILL_PLANE_Y: f32 = -50.0;

const SPAWN_POSITION: Vec3 = Vec3::new(-1.5, 5.0, -1.5);
const PLAYER_SIZE: Vec3 = Vec3::new(0.4, 1.76, 0.4);

/// The whole game context, owned by the frame loop. No globals: everything
/// the frame touches lives here and is passed down by reference.
pub struct GameApp {
    scene: Scene,
    player: Player,
    tuning: Tuning,

    // GL-backed state, created in `init` once a context exists.
    renderer: Option<AccumulationRenderer>,
    scene_textures: Option<SceneTextures>,

    audio: Option<AudioEngine>,
    sounds: SoundBank,

    /// Previous frame's renderer-visible snapshot, diffed for resets.
    last_settings: RenderSettings,
    /// Previous frame's window size; resize is detected by comparison, not
    /// by callback.
    cached_window_size: (u32, u32),

    mouse_grabbed: bool,
    grab_latch: bool,
    reload_latch: bool,
    reload_shaders: bool,

    fps_timer: f32,
    fps_frames: u32,

    fatal: bool,
}

impl GameApp {
    pub fn new(scene: Scene, fly_mode: bool, cinematic_mode: bool) -> Self {
        let mut player = Player::new(SPAWN_POSITION, Vec3::ZERO, PLAYER_SIZE);
        player.tuning.fly_mode = fly_mode;
        player.tuning.cinematic_mode = cinematic_mode;

        let audio = match AudioEngine::new() {
            Ok(audio) => Some(audio),
            Err(e) => {
                warn!("audio disabled: {e}");
                None
            }
        };

        let tuning = Tuning::default();
        let last_settings = tuning.render_settings(player.tuning.eye_height);

        Self {
            scene,
            player,
            tuning,
            renderer: None,
            scene_textures: None,
            audio,
            sounds: SoundBank::load(Path::new(SOUND_DIR)),
            last_settings,
            cached_window_size: (0, 0),
            mouse_grabbed: true,
            grab_latch: false,
            reload_latch: false,
            reload_shaders: false,
            fps_timer: 0.0,
            fps_frames: 0,
            fatal: false,
        }
    }

    fn player_input(&self, input: &InputState) -> PlayerInput {
        PlayerInput {
            forward: input.key(KeyCode::KeyW),
            back: input.key(KeyCode::KeyS),
            strafe_left: input.key(KeyCode::KeyA),
            strafe_right: input.key(KeyCode::KeyD),
            jump: input.key(KeyCode::Space),
            descend: input.key(KeyCode::ShiftLeft),
            look_delta: input.raw_mouse_delta,
        }
    }
}

impl App for GameApp {
    fn init(&mut self, ctx: &FrameContext) {
        let textures = match unsafe { SceneTextures::load(ctx.gl, &self.scene.textures) } {
            Ok(textures) => textures,
            Err(e) => {
                error!("could not load scene textures: {e}");
                self.fatal = true;
                return;
            }
        };

        let buffer = self.tuning.scaled_buffer_size(ctx.size);
        match unsafe {
            AccumulationRenderer::new(ctx.gl, Path::new(SHADER_DIR), buffer.0, buffer.1)
        } {
            Ok(renderer) => {
                self.renderer = Some(renderer);
                self.scene_textures = Some(textures);
            }
            Err(e) => {
                error!("could not build renderer: {e}");
                unsafe { textures.destroy(ctx.gl) };
                self.fatal = true;
                return;
            }
        }

        self.cached_window_size = ctx.size;
        info!(
            blocks = self.scene.blocks.len(),
            spheres = self.scene.spheres.len(),
            "world ready"
        );
    }

    fn update(&mut self, ctx: &FrameContext, input: &InputState) {
        // Escape releases/grabs the mouse, edge-triggered so holding the key
        // does not toggle every frame.
        if input.key(KeyCode::Escape) {
            if !self.grab_latch {
                self.mouse_grabbed = !self.mouse_grabbed;
                self.grab_latch = true;
            }
        } else {
            self.grab_latch = false;
        }

        if input.key(KeyCode::KeyR) {
            if !self.reload_latch {
                self.reload_shaders = true;
                self.reload_latch = true;
            }
        } else {
            self.reload_latch = false;
        }

        let mut needs_reset = false;

        if self.player.position.y <= KILL_PLANE_Y {
            self.player.respawn();
            needs_reset = true;
            if let (Some(audio), Some(sound)) = (&self.audio, self.sounds.respawn()) {
                audio.play(sound, Volume::FULL, 1.0);
            }
        }

        // The player only simulates while the game has the pointer; with the
        // cursor released the HUD owns the input.
        if self.mouse_grabbed {
            let events = self.player.update(
                &self.player_input(input),
                ctx.delta_time,
                self.tuning.gravity,
                &self.scene.blocks,
                &self.scene.spheres,
            );
            needs_reset |= events.view_changed;

            if let Some(audio) = &self.audio {
                if events.stepped {
                    if let Some((sound, pitch)) = self.sounds.step() {
                        audio.play(sound, Volume::new(0.6), pitch);
                    }
                }
                if events.landed_hard {
                    if let Some(sound) = self.sounds.land() {
                        audio.play(sound, Volume::FULL, 1.0);
                    }
                }
                if events.respawned {
                    if let Some(sound) = self.sounds.respawn() {
                        audio.play(sound, Volume::FULL, 1.0);
                    }
                }
            }
        }

        if let Some(audio) = &mut self.audio {
            audio.set_master_volume(Volume::new(self.tuning.master_volume));
        }

        let settings = self.tuning.render_settings(self.player.tuning.eye_height);
        if settings != self.last_settings {
            self.last_settings = settings;
            needs_reset = true;
        }

        // Resize detection: compare cached and current sizes once per frame
        // instead of reacting to the resize callback.
        let desired = self.tuning.scaled_buffer_size(ctx.size);
        let window_changed = ctx.size != self.cached_window_size;
        self.cached_window_size = ctx.size;

        let mut broken = false;
        if let Some(renderer) = self.renderer.as_mut() {
            if window_changed || desired != renderer.buffer_size() {
                if let Err(e) = unsafe { renderer.resize(ctx.gl, desired.0, desired.1) } {
                    error!("could not resize accumulation buffers: {e}");
                    broken = true;
                }
            }

            if !broken {
                if self.reload_shaders {
                    self.reload_shaders = false;
                    unsafe { renderer.reload_shaders(ctx.gl) };
                }

                if needs_reset {
                    renderer.reset_accumulation();
                }
            }
        }
        if broken {
            self.renderer = None;
            self.fatal = true;
            return;
        }

        self.fps_timer += ctx.delta_time;
        self.fps_frames += 1;
        if self.fps_timer >= 1.0 {
            ctx.window
                .set_title(&format!("{WINDOW_TITLE} - {} fps", self.fps_frames));
            self.fps_timer = 0.0;
            self.fps_frames = 0;
        }
    }

    fn render(&mut self, ctx: &FrameContext) {
        let (Some(renderer), Some(textures)) =
            (self.renderer.as_mut(), self.scene_textures.as_ref())
        else {
            return;
        };

        let camera = CameraState {
            eye: self.player.eye_position(),
            rotation: self.player.rotation,
        };

        unsafe {
            renderer.render_frame(
                ctx.gl,
                &camera,
                &self.last_settings,
                &self.scene,
                textures,
                ctx.size,
            );
        }
    }

    fn ui(&mut self, _ctx: &FrameContext, egui_ctx: &app::egui::Context) {
        if !self.mouse_grabbed {
            hud::shader_editor(
                egui_ctx,
                &mut self.tuning,
                &mut self.player,
                &mut self.reload_shaders,
            );
        }
    }

    fn shutdown(&mut self, ctx: &FrameContext) {
        // Reverse creation order: renderer first, then the scene textures.
        unsafe {
            if let Some(renderer) = self.renderer.take() {
                renderer.destroy(ctx.gl);
            }
            if let Some(textures) = self.scene_textures.take() {
                textures.destroy(ctx.gl);
            }
        }
        info!("world torn down");
    }

    fn cursor_mode(&self) -> CursorMode {
        if self.mouse_grabbed {
            CursorMode::Grabbed
        } else {
            CursorMode::Normal
        }
    }

    fn should_exit(&self) -> bool {
        self.fatal
    }
}
