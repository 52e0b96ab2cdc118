use glam::Vec3;
use renderer::RenderSettings;

/// World, camera, and graphics settings edited live by the debug HUD.
///
/// The renderer never sees this struct; each frame a [`RenderSettings`]
/// snapshot is derived from it and diffed against the previous frame's to
/// decide whether the accumulated image is still valid.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuning {
    pub gravity: f32,
    pub sun_direction: Vec3,
    pub dof_focus_distance: f32,
    pub dof_blur_size: f32,
    pub fov: f32,

    /// Scale the accumulation buffers up (supersampling) instead of down.
    pub frame_scale_up: bool,
    /// Buffer scale factor relative to the window size.
    pub frame_scale: u32,

    pub master_volume: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 25.0,
            sun_direction: Vec3::new(-1.0, 1.0, -0.175),
            dof_focus_distance: 12.0,
            dof_blur_size: 0.05,
            fov: 90.0,
            frame_scale_up: false,
            frame_scale: 1,
            master_volume: 0.8,
        }
    }
}

impl Tuning {
    /// Snapshot of everything the renderer is sensitive to.
    pub fn render_settings(&self, eye_height: f32) -> RenderSettings {
        RenderSettings {
            sun_direction: self.sun_direction,
            dof_focus_distance: self.dof_focus_distance,
            dof_blur_size: self.dof_blur_size,
            fov: self.fov,
            eye_height,
        }
    }

    /// Accumulation buffer size for a given window size.
    pub fn scaled_buffer_size(&self, window: (u32, u32)) -> (u32, u32) {
        let scale = self.frame_scale.max(1);
        if self.frame_scale_up {
            (window.0 * scale, window.1 * scale)
        } else {
            ((window.0 / scale).max(1), (window.1 / scale).max(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_snapshot_diffs_on_any_renderer_visible_field() {
        let tuning = Tuning::default();
        let a = tuning.render_settings(0.2);

        assert_eq!(a, tuning.render_settings(0.2));
        assert_ne!(a, tuning.render_settings(0.3));

        let mut shifted = tuning.clone();
        shifted.dof_blur_size += 0.01;
        assert_ne!(a, shifted.render_settings(0.2));
    }

    #[test]
    fn frame_scale_shrinks_or_grows_the_buffers() {
        let mut tuning = Tuning::default();
        assert_eq!(tuning.scaled_buffer_size((1280, 720)), (1280, 720));

        tuning.frame_scale = 2;
        assert_eq!(tuning.scaled_buffer_size((1280, 720)), (640, 360));

        tuning.frame_scale_up = true;
        assert_eq!(tuning.scaled_buffer_size((1280, 720)), (2560, 1440));

        // Downscale never collapses to zero.
        tuning.frame_scale_up = false;
        tuning.frame_scale = 50;
        assert_eq!(tuning.scaled_buffer_size((40, 30)), (1, 1));
    }
}
