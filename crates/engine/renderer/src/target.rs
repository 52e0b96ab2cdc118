//! Off-screen render targets and the two-slot role swap

use glow::HasContext;

/// An off-screen framebuffer with a single float color attachment.
///
/// RGBA32F so the running average does not quantize away as the step count
/// grows.
pub struct FrameBuffer {
    texture: glow::Texture,
    framebuffer: glow::Framebuffer,
    width: u32,
    height: u32,
}

impl FrameBuffer {
    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn new(gl: &glow::Context, width: u32, height: u32) -> Result<Self, String> {
        unsafe {
            let texture = gl.create_texture().map_err(|e| e.to_string())?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA32F as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::FLOAT,
                glow::PixelUnpackData::Slice(None),
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                glow::CLAMP_TO_EDGE as i32,
            );
            gl.bind_texture(glow::TEXTURE_2D, None);

            let framebuffer = gl.create_framebuffer().map_err(|e| e.to_string())?;
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer));
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(texture),
                0,
            );

            let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            if status != glow::FRAMEBUFFER_COMPLETE {
                gl.delete_framebuffer(framebuffer);
                gl.delete_texture(texture);
                return Err(format!("framebuffer incomplete: 0x{:x}", status));
            }

            Ok(Self {
                texture,
                framebuffer,
                width,
                height,
            })
        }
    }

    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn bind(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.framebuffer));
            gl.viewport(0, 0, self.width as i32, self.height as i32);
        }
    }

    /// Rebind the default framebuffer.
    ///
    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn unbind(gl: &glow::Context) {
        unsafe { gl.bind_framebuffer(glow::FRAMEBUFFER, None) };
    }

    pub fn texture(&self) -> glow::Texture {
        self.texture
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Release GL resources in reverse creation order: the framebuffer
    /// object first, then the texture it referenced.
    ///
    /// # Safety
    /// Requires an active OpenGL context
    pub unsafe fn destroy(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_framebuffer(self.framebuffer);
            gl.delete_texture(self.texture);
        }
    }
}

/// Two slots with an explicit current/previous role swap.
///
/// The accumulation renderer writes into `current` while sampling `previous`,
/// and swaps the roles after every frame.
pub struct PingPong<T> {
    slots: [T; 2],
    current: usize,
}

impl<T> PingPong<T> {
    pub fn new(first: T, second: T) -> Self {
        Self {
            slots: [first, second],
            current: 0,
        }
    }

    pub fn current(&self) -> &T {
        &self.slots[self.current]
    }

    pub fn previous(&self) -> &T {
        &self.slots[1 - self.current]
    }

    pub fn swap_roles(&mut self) {
        self.current = 1 - self.current;
    }

    /// Pin the first slot back to the current role, as after a reset.
    pub fn reset_roles(&mut self) {
        self.current = 0;
    }

    /// Slots in creation order, independent of the current roles.
    pub fn slots(&self) -> &[T; 2] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_swap_and_reset() {
        let mut pair = PingPong::new('a', 'b');

        assert_eq!(*pair.current(), 'a');
        assert_eq!(*pair.previous(), 'b');

        pair.swap_roles();
        assert_eq!(*pair.current(), 'b');
        assert_eq!(*pair.previous(), 'a');

        pair.swap_roles();
        assert_eq!(*pair.current(), 'a');

        pair.swap_roles();
        pair.reset_roles();
        assert_eq!(*pair.current(), 'a');
        assert_eq!(*pair.previous(), 'b');
    }

    #[test]
    fn slots_keep_creation_order() {
        let mut pair = PingPong::new(1, 2);
        pair.swap_roles();

        assert_eq!(pair.slots(), &[1, 2]);
    }
}
