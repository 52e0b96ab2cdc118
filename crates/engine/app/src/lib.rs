//! Application framework for the native game binary
//!
//! Provides the pieces every windowed OpenGL app here needs:
//!
//! - [`App`] trait: the lifecycle hooks game code implements
//! - [`AppRuntime`]/[`run_app`]: window creation, GL context setup, and the
//!   event loop
//! - [`EguiIntegration`]: egui UI rendering over the same GL context
//! - [`InputState`]: keyboard and pointer state accumulated between frames

use std::collections::HashSet;

use glam::Vec2;
use winit::event::WindowEvent;
use winit::keyboard::KeyCode;
use winit::window::Window;

mod egui_integration;
mod runner;

pub use egui_integration::EguiIntegration;
pub use runner::{create_event_loop, run_app, AppConfig, AppRuntime};

// Re-export egui so apps depend on the same version the runtime links.
pub use egui;

/// Everything an [`App`] hook gets handed for one frame.
pub struct FrameContext<'a> {
    pub gl: &'a glow::Context,
    pub window: &'a Window,
    /// Seconds since the previous update.
    pub delta_time: f32,
    /// Seconds since startup.
    pub elapsed: f32,
    pub frame: u64,
    /// Current inner window size in pixels.
    pub size: (u32, u32),
}

/// Pointer behavior requested by the app each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    Normal,
    Hidden,
    /// Hidden and locked to the window for FPS-style look input.
    Grabbed,
}

/// Mouse button state, kept in sync even when egui consumes the event.
#[derive(Debug, Default, Clone, Copy)]
pub struct MouseButtons {
    pub left: bool,
    pub right: bool,
    pub middle: bool,
}

/// Input accumulated between frames.
#[derive(Debug, Default)]
pub struct InputState {
    /// Currently held keys.
    pub keys: HashSet<KeyCode>,
    /// Pointer position in window coordinates, `None` while outside.
    pub mouse_pos: Option<Vec2>,
    /// Pointer motion from window events this frame.
    pub mouse_delta: Vec2,
    /// Raw device motion this frame, unconstrained by window borders.
    pub raw_mouse_delta: Vec2,
    pub scroll_delta: Vec2,
    pub mouse_buttons: MouseButtons,
}

impl InputState {
    pub fn key(&self, code: KeyCode) -> bool {
        self.keys.contains(&code)
    }
}

/// The main interface for application logic.
///
/// The runtime calls these hooks from its event loop; all of them run on the
/// one thread that owns the GL context.
pub trait App {
    /// Called once after the window and GL context exist.
    fn init(&mut self, ctx: &FrameContext);

    /// Raw window events, after egui had its chance to consume them.
    fn on_event(&mut self, _event: &WindowEvent) {}

    /// Game logic, once per frame before rendering.
    fn update(&mut self, ctx: &FrameContext, input: &InputState);

    /// Issue GL draw calls for this frame.
    fn render(&mut self, ctx: &FrameContext);

    /// Build egui UI for this frame.
    fn ui(&mut self, _ctx: &FrameContext, _egui_ctx: &egui::Context) {}

    /// Called once before the event loop exits.
    fn shutdown(&mut self, ctx: &FrameContext);

    /// Queried every frame.
    fn cursor_mode(&self) -> CursorMode {
        CursorMode::Normal
    }

    /// Return true to leave the event loop.
    fn should_exit(&self) -> bool {
        false
    }
}
