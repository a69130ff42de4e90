use anyhow::{Result, anyhow, bail};
use gaze_core::Position;
use gaze_timing::{FrameTimes, Timer};
use std::time::Duration;
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Rect, Transform};

const CROSS_SIZE: u32 = 40;
const CROSS_BAR: f32 = 2.0;
const MARKER_SIZE: u32 = 12;
const MARKER_COLOR: [u8; 3] = [220, 40, 40];
const MARKER_INSET: f32 = 20.0;

/// Everything the host window shows for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub background: [u8; 3],
    pub foreground: [u8; 3],
    /// Drift-correction target, drawn as a ring with a background-coloured dot.
    pub drift_target: Option<Position>,
    /// Target diameter in pixels.
    pub target_size: u32,
    pub fixation_cross: bool,
    /// Shows a small marker in the top right corner.
    pub recording: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            background: [0, 0, 0],
            foreground: [255, 255, 255],
            drift_target: None,
            target_size: 16,
            fixation_cross: false,
            recording: false,
        }
    }
}

#[repr(usize)]
#[derive(Debug, Clone, Copy)]
pub enum Sprite {
    DriftTarget = 0,
    FixationCross = 1,
    RecordingMarker = 2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub clear: Duration,
    pub draw: Duration,
    pub copy: Duration,
    pub total: Duration,
    pub dirty_count: usize,
}

/// Per-stage frame time history.
#[derive(Debug, Clone, Default)]
pub struct RenderTimes {
    pub clear: FrameTimes,
    pub draw: FrameTimes,
    pub copy: FrameTimes,
    pub total: FrameTimes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Style {
    background: [u8; 3],
    foreground: [u8; 3],
    target_size: u32,
}

impl Style {
    fn of(scene: &Scene) -> Self {
        Self {
            background: scene.background,
            foreground: scene.foreground,
            target_size: scene.target_size,
        }
    }
}

/// Pixel rectangle, half-open on the right and bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Region {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

/// Draws a [`Scene`] into an RGBA frame buffer, touching only the pixels that
/// changed since the previous frame.
pub struct SceneRenderer {
    width: u32,
    height: u32,
    canvas: Pixmap,
    sprites: Vec<Pixmap>,
    style: Style,
    clear_buffer: Vec<u8>,
    dirty: Vec<Region>,
    first_frame: bool,
    times: RenderTimes,
}

impl SceneRenderer {
    pub fn new(width: u32, height: u32, scene: &Scene) -> Result<Self> {
        let style = Style::of(scene);
        Ok(Self {
            width,
            height,
            canvas: new_pixmap(width, height)?,
            sprites: build_sprites(style)?,
            style,
            clear_buffer: clear_buffer(width, height, style.background),
            dirty: Vec::with_capacity(8),
            first_frame: true,
            times: RenderTimes::default(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn times(&self) -> &RenderTimes {
        &self.times
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.canvas = new_pixmap(width, height)?;
        self.width = width;
        self.height = height;
        self.clear_buffer = clear_buffer(width, height, self.style.background);
        self.first_frame = true;
        Ok(())
    }

    pub fn render_frame<T: Timer<Timestamp = u64>>(
        &mut self,
        scene: &Scene,
        frame_buffer: &mut [u8],
        timer: &T,
    ) -> Result<FrameStats> {
        let expected = self.width as usize * self.height as usize * 4;
        if frame_buffer.len() != expected {
            bail!(
                "frame buffer holds {} bytes, expected {expected} for {}x{}",
                frame_buffer.len(),
                self.width,
                self.height
            );
        }

        let style = Style::of(scene);
        if style != self.style {
            self.sprites = build_sprites(style)?;
            self.clear_buffer = clear_buffer(self.width, self.height, style.background);
            self.style = style;
            self.first_frame = true;
        }

        if self.first_frame {
            self.first_frame = false;
            self.canvas.data_mut().copy_from_slice(&self.clear_buffer);
            frame_buffer.copy_from_slice(&self.clear_buffer);
            self.dirty.clear();
        }

        let old_dirty = std::mem::take(&mut self.dirty);

        let t_clear = {
            let t = timer.now();
            self.clear_regions(&old_dirty);
            timer.elapsed(t)
        };

        let t_draw = {
            let t = timer.now();
            self.draw_scene(scene);
            timer.elapsed(t)
        };

        let mut present = old_dirty;
        present.extend_from_slice(&self.dirty);
        coalesce(&mut present);

        let t_copy = {
            let t = timer.now();
            for region in &present {
                self.copy_region(*region, frame_buffer);
            }
            timer.elapsed(t)
        };

        let total = t_clear + t_draw + t_copy;
        self.times.clear.record(t_clear);
        self.times.draw.record(t_draw);
        self.times.copy.record(t_copy);
        self.times.total.record(total);

        Ok(FrameStats {
            clear: t_clear,
            draw: t_draw,
            copy: t_copy,
            total,
            dirty_count: self.dirty.len(),
        })
    }

    fn draw_scene(&mut self, scene: &Scene) {
        let center = (self.width as f32 / 2.0, self.height as f32 / 2.0);
        if scene.fixation_cross {
            self.blit_sprite(Sprite::FixationCross, center);
        }
        if let Some(target) = scene.drift_target {
            self.blit_sprite(Sprite::DriftTarget, (target.x as f32, target.y as f32));
        }
        if scene.recording {
            self.blit_sprite(
                Sprite::RecordingMarker,
                (self.width as f32 - MARKER_INSET, MARKER_INSET),
            );
        }
    }

    /// Copies a cached sprite centred on `pos`, clipped to the canvas.
    pub fn blit_sprite(&mut self, sprite: Sprite, pos: (f32, f32)) {
        let Some(pixmap) = self.sprites.get(sprite as usize) else {
            return;
        };
        let (w, h) = (pixmap.width() as i64, pixmap.height() as i64);
        let x0 = (pos.0 - w as f32 * 0.5).floor() as i64;
        let y0 = (pos.1 - h as f32 * 0.5).floor() as i64;

        let dst_x0 = x0.max(0);
        let dst_y0 = y0.max(0);
        let dst_x1 = (x0 + w).min(self.width as i64);
        let dst_y1 = (y0 + h).min(self.height as i64);
        if dst_x1 <= dst_x0 || dst_y1 <= dst_y0 {
            return;
        }

        let src_x0 = (dst_x0 - x0) as usize;
        let src_y0 = (dst_y0 - y0) as usize;
        let region = Region {
            x0: dst_x0 as usize,
            y0: dst_y0 as usize,
            x1: dst_x1 as usize,
            y1: dst_y1 as usize,
        };
        let cols = region.x1 - region.x0;
        let rows = region.y1 - region.y0;

        let src = pixmap.data();
        let src_stride = pixmap.width() as usize * 4;
        let dst_stride = self.width as usize * 4;
        let dst = self.canvas.data_mut();

        let fully_opaque = (0..rows).all(|y| {
            let start = (src_y0 + y) * src_stride + src_x0 * 4;
            src[start..start + cols * 4]
                .iter()
                .skip(3)
                .step_by(4)
                .all(|&a| a == 255)
        });

        for y in 0..rows {
            let s = (src_y0 + y) * src_stride + src_x0 * 4;
            let d = (region.y0 + y) * dst_stride + region.x0 * 4;
            let src_row = &src[s..s + cols * 4];
            let dst_row = &mut dst[d..d + cols * 4];
            if fully_opaque {
                dst_row.copy_from_slice(src_row);
                continue;
            }
            // premultiplied source-over
            for (sp, dp) in src_row.chunks_exact(4).zip(dst_row.chunks_exact_mut(4)) {
                let inv = 255 - sp[3] as u32;
                for c in 0..4 {
                    dp[c] = (sp[c] as u32 + (dp[c] as u32 * inv + 127) / 255).min(255) as u8;
                }
            }
        }

        self.dirty.push(region);
    }

    fn clear_regions(&mut self, regions: &[Region]) {
        let stride = self.width as usize * 4;
        let canvas = self.canvas.data_mut();
        for r in regions {
            let len = (r.x1 - r.x0) * 4;
            for y in r.y0..r.y1 {
                let off = y * stride + r.x0 * 4;
                canvas[off..off + len].copy_from_slice(&self.clear_buffer[off..off + len]);
            }
        }
    }

    fn copy_region(&self, r: Region, frame_buffer: &mut [u8]) {
        let stride = self.width as usize * 4;
        let canvas = self.canvas.data();
        let len = (r.x1 - r.x0) * 4;
        for y in r.y0..r.y1 {
            let off = y * stride + r.x0 * 4;
            frame_buffer[off..off + len].copy_from_slice(&canvas[off..off + len]);
        }
    }
}

/// Merges regions that share a row band and touch horizontally.
fn coalesce(regions: &mut Vec<Region>) {
    regions.sort_by_key(|r| (r.y0, r.x0));
    let mut out: Vec<Region> = Vec::with_capacity(regions.len());
    for r in regions.drain(..) {
        if let Some(last) = out.last_mut() {
            if r.y0 == last.y0 && r.y1 == last.y1 && r.x0 <= last.x1 + 1 {
                last.x1 = last.x1.max(r.x1);
                continue;
            }
        }
        out.push(r);
    }
    *regions = out;
}

fn new_pixmap(width: u32, height: u32) -> Result<Pixmap> {
    Pixmap::new(width, height).ok_or_else(|| anyhow!("cannot allocate {width}x{height} pixmap"))
}

fn clear_buffer(width: u32, height: u32, bg: [u8; 3]) -> Vec<u8> {
    [bg[0], bg[1], bg[2], 255]
        .into_iter()
        .cycle()
        .take(width as usize * height as usize * 4)
        .collect()
}

fn paint(color: [u8; 3]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.anti_alias = false;
    paint.set_color(Color::from_rgba8(color[0], color[1], color[2], 255));
    paint
}

fn fill_disc(pm: &mut Pixmap, center: f32, radius: f32, color: [u8; 3]) -> Result<()> {
    let path = PathBuilder::from_circle(center, center, radius)
        .ok_or_else(|| anyhow!("invalid disc radius {radius}"))?;
    pm.fill_path(
        &path,
        &paint(color),
        FillRule::Winding,
        Transform::identity(),
        None,
    );
    Ok(())
}

fn fill_bar(pm: &mut Pixmap, x: f32, y: f32, w: f32, h: f32, color: [u8; 3]) -> Result<()> {
    let rect = Rect::from_xywh(x, y, w, h).ok_or_else(|| anyhow!("invalid bar {w}x{h}"))?;
    pm.fill_rect(rect, &paint(color), Transform::identity(), None);
    Ok(())
}

fn build_sprites(style: Style) -> Result<Vec<Pixmap>> {
    let size = style.target_size.max(4);
    let radius = size as f32 / 2.0;
    let mut target = new_pixmap(size, size)?;
    fill_disc(&mut target, radius, radius, style.foreground)?;
    fill_disc(&mut target, radius, (radius / 4.0).max(1.0), style.background)?;

    let mut cross = new_pixmap(CROSS_SIZE, CROSS_SIZE)?;
    let extent = CROSS_SIZE as f32;
    let offset = (extent - CROSS_BAR) * 0.5;
    fill_bar(&mut cross, 0.0, offset, extent, CROSS_BAR, style.foreground)?;
    fill_bar(&mut cross, offset, 0.0, CROSS_BAR, extent, style.foreground)?;

    let mut marker = new_pixmap(MARKER_SIZE, MARKER_SIZE)?;
    let half = MARKER_SIZE as f32 / 2.0;
    fill_disc(&mut marker, half, half, MARKER_COLOR)?;

    Ok(vec![target, cross, marker])
}

#[cfg(test)]
mod tests {
    use super::*;
    use gaze_timing::ManualTimer;

    const W: u32 = 200;
    const H: u32 = 200;

    fn pixel(fb: &[u8], x: usize, y: usize) -> [u8; 4] {
        let i = (y * W as usize + x) * 4;
        [fb[i], fb[i + 1], fb[i + 2], fb[i + 3]]
    }

    fn setup(scene: &Scene) -> (SceneRenderer, Vec<u8>) {
        let r = SceneRenderer::new(W, H, scene).unwrap();
        (r, vec![0u8; (W * H * 4) as usize])
    }

    #[test]
    fn test_drift_target_is_painted_at_target() {
        let scene = Scene {
            drift_target: Some(Position::new(100.0, 100.0)),
            ..Scene::default()
        };
        let (mut r, mut fb) = setup(&scene);
        let stats = r.render_frame(&scene, &mut fb, &ManualTimer::new()).unwrap();

        assert_eq!(stats.dirty_count, 1);
        assert_eq!(pixel(&fb, 105, 100), [255, 255, 255, 255]);
        // centre dot uses the background colour
        assert_eq!(pixel(&fb, 100, 100), [0, 0, 0, 255]);
        assert_eq!(pixel(&fb, 10, 10), [0, 0, 0, 255]);
    }

    #[test]
    fn test_previous_frame_is_cleared() {
        let mut scene = Scene {
            drift_target: Some(Position::new(100.0, 100.0)),
            ..Scene::default()
        };
        let (mut r, mut fb) = setup(&scene);
        let timer = ManualTimer::new();
        r.render_frame(&scene, &mut fb, &timer).unwrap();

        scene.drift_target = None;
        let stats = r.render_frame(&scene, &mut fb, &timer).unwrap();
        assert_eq!(stats.dirty_count, 0);
        assert_eq!(pixel(&fb, 105, 100), [0, 0, 0, 255]);
        assert_eq!(r.times().total.len(), 2);
    }

    #[test]
    fn test_style_change_repaints_background() {
        let mut scene = Scene::default();
        let (mut r, mut fb) = setup(&scene);
        let timer = ManualTimer::new();
        r.render_frame(&scene, &mut fb, &timer).unwrap();

        scene.background = [128, 128, 128];
        r.render_frame(&scene, &mut fb, &timer).unwrap();
        assert_eq!(pixel(&fb, 0, 0), [128, 128, 128, 255]);
        assert_eq!(pixel(&fb, 199, 199), [128, 128, 128, 255]);
    }

    #[test]
    fn test_recording_marker_in_corner() {
        let scene = Scene {
            recording: true,
            fixation_cross: true,
            ..Scene::default()
        };
        let (mut r, mut fb) = setup(&scene);
        let stats = r.render_frame(&scene, &mut fb, &ManualTimer::new()).unwrap();
        assert_eq!(stats.dirty_count, 2);
        assert_eq!(pixel(&fb, 180, 20), [220, 40, 40, 255]);
        assert_eq!(pixel(&fb, 100, 100), [255, 255, 255, 255]);
    }

    #[test]
    fn test_offscreen_target_is_skipped() {
        let scene = Scene {
            drift_target: Some(Position::new(-100.0, -100.0)),
            ..Scene::default()
        };
        let (mut r, mut fb) = setup(&scene);
        let stats = r.render_frame(&scene, &mut fb, &ManualTimer::new()).unwrap();
        assert_eq!(stats.dirty_count, 0);
    }

    #[test]
    fn test_frame_buffer_size_is_checked() {
        let scene = Scene::default();
        let (mut r, _) = setup(&scene);
        let mut small = vec![0u8; 16];
        assert!(r.render_frame(&scene, &mut small, &ManualTimer::new()).is_err());
    }

    #[test]
    fn test_regions_on_one_row_merge() {
        let mut regions = vec![
            Region { x0: 10, y0: 0, x1: 20, y1: 5 },
            Region { x0: 0, y0: 0, x1: 10, y1: 5 },
            Region { x0: 0, y0: 6, x1: 4, y1: 8 },
        ];
        coalesce(&mut regions);
        assert_eq!(
            regions,
            vec![
                Region { x0: 0, y0: 0, x1: 20, y1: 5 },
                Region { x0: 0, y0: 6, x1: 4, y1: 8 },
            ]
        );
    }
}
