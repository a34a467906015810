//! Main player application
//!
//! Implements the egui App trait: measures frame time, drives the pipeline
//! and draws the current frame texture.

use std::time::Instant;

use egui::{Color32, ColorImage, Context, TextureHandle, TextureOptions, Vec2};
use tracing::info;

use crate::config::PlayerConfig;
use crate::video::{FfmpegBackend, FramePipeline, PresentationSurface};

/// egui texture the pipeline uploads frames into
pub struct TextureSurface {
    ctx: Context,
    texture: Option<TextureHandle>,
    size: [usize; 2],
}

impl TextureSurface {
    pub fn new(ctx: Context, width: u32, height: u32) -> Self {
        Self {
            ctx,
            texture: None,
            size: [width as usize, height as usize],
        }
    }

    pub fn texture(&self) -> Option<&TextureHandle> {
        self.texture.as_ref()
    }
}

impl PresentationSurface for TextureSurface {
    fn upload_pixels(&mut self, rgba: &[u8]) {
        let image = ColorImage::from_rgba_unmultiplied(self.size, rgba);

        if let Some(ref mut texture) = self.texture {
            texture.set(image, TextureOptions::LINEAR);
        } else {
            self.texture = Some(self.ctx.load_texture("frame", image, TextureOptions::LINEAR));
        }
    }
}

/// Window hosting one playing video
pub struct PlayerApp {
    pipeline: FramePipeline<FfmpegBackend>,
    surface: TextureSurface,
    close_on_escape: bool,
    /// Last update time for elapsed time measurement
    last_update: Instant,
    finished_reported: bool,
}

impl PlayerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        pipeline: FramePipeline<FfmpegBackend>,
        config: &PlayerConfig,
    ) -> Self {
        let surface = TextureSurface::new(cc.egui_ctx.clone(), pipeline.width(), pipeline.height());

        Self {
            pipeline,
            surface,
            close_on_escape: config.close_on_escape,
            last_update: Instant::now(),
            finished_reported: false,
        }
    }

    fn handle_input(&self, ctx: &Context) {
        if self.close_on_escape && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            info!("Escape pressed, closing");
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

impl eframe::App for PlayerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.handle_input(ctx);

        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update);
        self.last_update = now;

        self.pipeline.advance(elapsed, &mut self.surface);

        if self.pipeline.is_finished() && !self.finished_reported {
            self.finished_reported = true;
            let stats = self.pipeline.stats();
            info!(
                "Video finished after {} frames ({} skipped packets), last frame stays on screen",
                stats.frames_presented,
                self.pipeline.discarded_packets()
            );
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::BLACK))
            .show(ctx, |ui| {
                if let Some(texture) = self.surface.texture() {
                    let size = Vec2::new(self.pipeline.width() as f32, self.pipeline.height() as f32);
                    ui.image(egui::ImageSource::Texture(egui::load::SizedTexture::new(
                        texture.id(),
                        size,
                    )));
                }
            });

        // Keep polling the pacer; vsync bounds the rate
        ctx.request_repaint();
    }
}

/// Initial window size for a video of the given dimensions
pub fn window_size(width: u32, height: u32) -> [f32; 2] {
    [width.max(1) as f32, height.max(1) as f32]
}
