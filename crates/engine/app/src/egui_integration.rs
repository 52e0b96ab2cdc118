//! Egui wiring over the app's own GL context

use std::sync::Arc;

use egui::Context as EguiContext;
use egui_glow::Painter;
use egui_winit::State as EguiState;
use winit::window::Window;

/// Owns the egui context, winit event bridge, and glow painter.
pub struct EguiIntegration {
    ctx: EguiContext,
    state: EguiState,
    painter: Painter,
}

impl EguiIntegration {
    /// # Safety
    /// The GL context must be current when this is called.
    pub unsafe fn new(window: &Window, gl: Arc<glow::Context>) -> Self {
        let ctx = EguiContext::default();
        let state = EguiState::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            None,
            None,
            None,
        );
        let painter = Painter::new(gl, "", None, false).expect("Failed to create egui painter");

        Self {
            ctx,
            state,
            painter,
        }
    }

    /// Feed a window event to egui; true means egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Run one egui frame: gather input, run `run_ui`, paint the output.
    pub fn run(&mut self, window: &Window, size: [u32; 2], run_ui: impl FnMut(&EguiContext)) {
        let raw_input = self.state.take_egui_input(window);
        let full_output = self.ctx.run(raw_input, run_ui);

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let clipped_primitives = self
            .ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        self.painter.paint_and_update_textures(
            size,
            full_output.pixels_per_point,
            &clipped_primitives,
            &full_output.textures_delta,
        );
    }

    /// True when the pointer is over an egui area, so the game should not
    /// also react to clicks.
    pub fn wants_pointer(&self) -> bool {
        self.ctx.wants_pointer_input()
    }
}

impl Drop for EguiIntegration {
    fn drop(&mut self) {
        self.painter.destroy();
    }
}
