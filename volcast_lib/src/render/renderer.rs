use nalgebra::Vector2;
use rayon::prelude::*;

use crate::{
    camera::Camera,
    color::{self, RGBA},
    transfer::{TentClassifier, TransferFunction1D},
    volumetric::{GradientVolume, Interpolation, Volume},
};

use super::cast::CastContext;

/// Pixel strategy evaluated along each ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Single slice through the volume center
    Slice,
    /// Maximum intensity projection
    Mip,
    /// First isosurface crossing
    Iso,
    /// 1D transfer function compositing
    Composite,
    /// 2D transfer function, one classifier and a flat color
    Tf2d,
    /// 2D transfer function, two classifiers
    Tf2dV2,
}

/// Full description of one render pass.
///
/// Swapped wholesale via [`Renderer::set_config`]; never edited in place
/// while a pass is running.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub resolution: Vector2<u16>,
    pub render_mode: RenderMode,
    pub interpolation: Interpolation,
    pub iso_value: f32,
    pub volume_shading: bool,
    /// 1D transfer function for [`RenderMode::Composite`]
    pub tf: TransferFunction1D,
    /// Classifier and flat color for [`RenderMode::Tf2d`]
    pub tf2d: TentClassifier,
    /// Independent classifiers for [`RenderMode::Tf2dV2`]
    pub tf2d_v2: [TentClassifier; 2],
    /// Tiled fork-join rendering; the sequential path produces
    /// identical output
    pub multi_thread: bool,
}

/// Rows per scheduling tile.
const TILE_ROWS: usize = 8;

/// Owns the framebuffer, borrows everything else for the render pass.
///
/// [`Renderer::render`] is a blocking call; there is no cancellation and a
/// pass always runs to completion. The caller serializes config changes
/// with passes (enforced by `&mut self`).
pub struct Renderer<'a, C> {
    volume: &'a Volume,
    gradient: &'a GradientVolume,
    camera: &'a C,
    config: RenderConfig,
    frame_buffer: Vec<RGBA>,
}

impl<'a, C> Renderer<'a, C>
where
    C: Camera,
{
    pub fn new(
        volume: &'a Volume,
        gradient: &'a GradientVolume,
        camera: &'a C,
        config: RenderConfig,
    ) -> Renderer<'a, C> {
        let frame_buffer = allocate_buffer(config.resolution);
        Renderer {
            volume,
            gradient,
            camera,
            config,
            frame_buffer,
        }
    }

    /// Swap in a new configuration.
    /// Reallocates the framebuffer when the resolution changed.
    pub fn set_config(&mut self, config: RenderConfig) {
        let resized = config.resolution != self.config.resolution;
        self.config = config;
        if resized {
            self.frame_buffer = allocate_buffer(self.config.resolution);
        }
    }

    pub fn get_config(&self) -> &RenderConfig {
        &self.config
    }

    /// Fill the framebuffer with transparent black, keeping the allocation.
    pub fn reset_image(&mut self) {
        self.frame_buffer.fill(color::zero());
    }

    /// View into the framebuffer, valid until the next mutating call.
    pub fn frame_buffer(&self) -> &[RGBA] {
        &self.frame_buffer
    }

    /// One full synchronous pass over every pixel.
    pub fn render(&mut self)
    where
        C: Sync,
    {
        self.frame_buffer.fill(color::zero());

        let width = self.config.resolution.x as usize;
        let height = self.config.resolution.y as usize;
        if width == 0 || height == 0 {
            return;
        }

        let ctx = CastContext::new(self.volume, self.gradient, self.camera, &self.config);
        let band_len = width * TILE_ROWS;

        // Disjoint row bands partition the framebuffer; every pixel is
        // written exactly once by exactly one task, so the bands are the
        // whole synchronization story.
        if self.config.multi_thread {
            self.frame_buffer
                .par_chunks_mut(band_len)
                .enumerate()
                .for_each(|(band, rows)| {
                    render_band(&ctx, width, height, band * TILE_ROWS, rows)
                });
        } else {
            self.frame_buffer
                .chunks_mut(band_len)
                .enumerate()
                .for_each(|(band, rows)| {
                    render_band(&ctx, width, height, band * TILE_ROWS, rows)
                });
        }
    }
}

fn allocate_buffer(resolution: Vector2<u16>) -> Vec<RGBA> {
    let elements = resolution.x as usize * resolution.y as usize;
    vec![color::zero(); elements]
}

/// Render one band of full rows, `y_start` being its first row.
fn render_band<C>(ctx: &CastContext<C>, width: usize, height: usize, y_start: usize, band: &mut [RGBA])
where
    C: Camera,
{
    let step_x = 1.0 / width as f32;
    let step_y = 1.0 / height as f32;

    for (i, pixel) in band.iter_mut().enumerate() {
        let x = i % width;
        let y = y_start + i / width;
        let pixel_coord = (x as f32 * step_x, y as f32 * step_y);
        *pixel = ctx.cast_pixel(pixel_coord);
    }
}

#[cfg(test)]
mod test {
    use nalgebra::vector;

    use super::*;
    use crate::test_helpers::{default_config, ramp_camera, ramp_volume};

    #[test]
    fn framebuffer_always_matches_resolution() {
        let volume = ramp_volume();
        let gradient = GradientVolume::from_volume(&volume);
        let camera = ramp_camera();

        let mut config = default_config();
        config.resolution = vector![32, 24];
        let mut renderer = Renderer::new(&volume, &gradient, &camera, config.clone());
        assert_eq!(renderer.frame_buffer().len(), 32 * 24);

        config.resolution = vector![17, 3];
        renderer.set_config(config);
        assert_eq!(renderer.frame_buffer().len(), 17 * 3);
        assert!(renderer.frame_buffer().iter().all(|c| *c == color::zero()));
    }

    #[test]
    fn reset_image_zero_fills_in_place() {
        let volume = ramp_volume();
        let gradient = GradientVolume::from_volume(&volume);
        let camera = ramp_camera();

        let mut renderer = Renderer::new(&volume, &gradient, &camera, default_config());
        renderer.render();
        assert!(renderer.frame_buffer().iter().any(|c| *c != color::zero()));

        renderer.reset_image();
        assert!(renderer.frame_buffer().iter().all(|c| *c == color::zero()));
    }

    #[test]
    fn sequential_and_parallel_pixels_match() {
        let volume = ramp_volume();
        let gradient = GradientVolume::from_volume(&volume);
        let camera = ramp_camera();

        let modes = [
            RenderMode::Slice,
            RenderMode::Mip,
            RenderMode::Iso,
            RenderMode::Composite,
            RenderMode::Tf2d,
            RenderMode::Tf2dV2,
        ];

        for mode in modes {
            let mut config = default_config();
            config.render_mode = mode;
            config.multi_thread = false;

            let mut renderer = Renderer::new(&volume, &gradient, &camera, config.clone());
            renderer.render();
            let sequential = renderer.frame_buffer().to_vec();

            config.multi_thread = true;
            renderer.set_config(config);
            renderer.render();

            assert_eq!(renderer.frame_buffer(), &sequential[..], "mode {mode:?}");
        }
    }

    #[test]
    fn mip_sees_the_ramp() {
        let volume = ramp_volume();
        let gradient = GradientVolume::from_volume(&volume);
        let camera = ramp_camera();

        let mut config = default_config();
        config.render_mode = RenderMode::Mip;
        let mut renderer = Renderer::new(&volume, &gradient, &camera, config);
        renderer.render();

        let brightest = renderer
            .frame_buffer()
            .iter()
            .map(|c| c.x)
            .fold(0.0, f32::max);
        assert!(brightest > 0.5);
    }
}
