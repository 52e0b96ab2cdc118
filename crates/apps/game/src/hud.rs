//! Debug HUD shown while the mouse is released

use app::egui;
use prism_physics::Player;

use crate::tuning::Tuning;

/// Live tunables window. Writes straight into the player tunables and the
/// [`Tuning`] struct; the game diffs a render-settings snapshot afterwards,
/// so edits that matter to the image reset accumulation automatically.
pub fn shader_editor(
    ctx: &egui::Context,
    tuning: &mut Tuning,
    player: &mut Player,
    reload_shaders: &mut bool,
) {
    egui::Window::new("Shader Editor")
        .default_width(320.0)
        .show(ctx, |ui| {
            ui.label("Player");
            ui.add(
                egui::Slider::new(&mut player.tuning.walk_speed, 0.005..=20.0).text("Walk Speed"),
            );
            ui.add(
                egui::Slider::new(&mut player.tuning.rotate_speed, 0.005..=0.2)
                    .text("Rotate Speed"),
            );
            ui.add(
                egui::Slider::new(&mut player.tuning.jump_impulse, 0.005..=20.0)
                    .text("Jump Impulse"),
            );
            ui.checkbox(&mut player.tuning.fly_mode, "Fly Mode");
            ui.checkbox(&mut player.tuning.cinematic_mode, "Cinematic Camera");
            if player.tuning.cinematic_mode {
                ui.add(
                    egui::Slider::new(&mut player.tuning.cinematic_sharpness, 1.0..=30.0)
                        .text("Smoothing Sharpness"),
                );
            }

            ui.separator();
            ui.label("World");
            ui.add(egui::Slider::new(&mut tuning.sun_direction.x, -1.0..=1.0).text("Sun X"));
            ui.add(egui::Slider::new(&mut tuning.sun_direction.y, -1.0..=1.0).text("Sun Y"));
            ui.add(egui::Slider::new(&mut tuning.sun_direction.z, -1.0..=1.0).text("Sun Z"));
            ui.add(egui::Slider::new(&mut tuning.gravity, 0.0..=50.0).text("Gravity"));

            ui.separator();
            ui.label("Camera");
            ui.add(egui::Slider::new(&mut player.tuning.eye_height, 0.1..=0.9).text("Eye Height"));
            ui.add_space(4.0);
            ui.add(
                egui::Slider::new(&mut tuning.dof_focus_distance, 0.1..=100.0)
                    .text("DoF Focus Distance"),
            );
            ui.add(egui::Slider::new(&mut tuning.dof_blur_size, 0.0..=0.9).text("DoF Blur Size"));
            ui.add(egui::Slider::new(&mut tuning.fov, 20.0..=179.0).text("Fov"));

            ui.separator();
            ui.label("Graphics");
            ui.checkbox(&mut tuning.frame_scale_up, "Upscale");
            ui.add(egui::Slider::new(&mut tuning.frame_scale, 1..=8).text(
                if tuning.frame_scale_up {
                    "Upscale Factor"
                } else {
                    "Downscale Factor"
                },
            ));
            if ui.button("Reload Shaders").clicked() {
                *reload_shaders = true;
            }

            ui.separator();
            ui.label("Audio");
            ui.add(egui::Slider::new(&mut tuning.master_volume, 0.0..=1.0).text("Master Volume"));
        });
}
