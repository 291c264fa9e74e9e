// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

pub mod config;
pub mod geometry;
pub mod tooltip;
pub mod tween;

pub use config::{Color, Position, SwitchConfig, SwitchKind};

use log::{debug, warn};
use pixels::{Pixels, SurfaceTexture};
use rusttype::{Font, Scale};
use thiserror::Error;

use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::geometry::{Geometry, LabelHeights};
use crate::tooltip::Tooltip;
use crate::tween::RotationState;

/// Empty space around the widget in the hosted window, leaving room for the
/// tooltip above it.
const WINDOW_MARGIN: usize = 40;

const TOOLTIP_FILL: Color = Color::new(0x61, 0x61, 0x61);
const TOOLTIP_TEXT: Color = Color::new(0xff, 0xff, 0xff);
const TOOLTIP_ALPHA: f32 = 0.9;

#[derive(Debug, Error)]
pub enum SwitchError {
    #[error("configured font data could not be parsed")]
    Font,
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("window error: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("surface error: {0}")]
    Surface(#[from] pixels::Error),
}

/// Command enum for driving a hosted switch from another thread.
#[derive(Debug, Clone)]
pub enum SwitchCommand {
    SetPosition(Position),
    Redraw,
    Destroy,
}

// ============================================================================
// RETAINED SCENE
// ============================================================================

/// Coordinate frame a shape is laid out in.
///
/// `Body` is the center of the drawing area, `Switch` the center of the
/// switch circle (shifted down to leave headroom for the side labels), and
/// `Rotate` the knob group that turns with the current angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Body,
    Switch,
    Rotate,
}

#[derive(Debug, Clone)]
enum Shape {
    Circle {
        radius: f64,
        fill: Color,
        stroke: Color,
        stroke_width: f64,
    },
    /// Knob handle bar, drawn as a thick segment along its centerline.
    Handle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Color,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        color: Color,
    },
    Label {
        x: f64,
        y: f64,
        text: String,
        color: Color,
    },
}

#[derive(Debug, Clone)]
struct SceneNode {
    shape: Shape,
    group: Group,
}

/// Handles to every rendered node, built once per (re)draw.
#[derive(Debug, Clone)]
struct SwitchScene {
    body: SceneNode,
    knob: SceneNode,
    handle: SceneNode,
    marker: SceneNode,
    labels: Vec<SceneNode>,
}

impl SwitchScene {
    fn build(config: &SwitchConfig, geometry: &Geometry) -> Self {
        let body = SceneNode {
            shape: Shape::Circle {
                radius: geometry.switch_radius,
                fill: config.fill_color,
                stroke: config.border_color,
                stroke_width: config.border_width,
            },
            group: Group::Switch,
        };
        let knob = SceneNode {
            shape: Shape::Circle {
                radius: geometry.knob_radius,
                fill: config.knob_fill_color,
                stroke: config.knob_border_color,
                stroke_width: config.border_width,
            },
            group: Group::Switch,
        };
        let handle = SceneNode {
            shape: Shape::Handle {
                x: geometry.handle_offset.0,
                y: geometry.handle_offset.1,
                width: geometry.handle_size.0,
                height: geometry.handle_size.1,
                fill: config.knob_fill_color,
            },
            group: Group::Rotate,
        };
        let marker = SceneNode {
            shape: Shape::Line {
                x1: 0.0,
                y1: geometry.marker_offset_y,
                x2: 0.0,
                y2: geometry.marker_offset_y + geometry.marker_length,
                width: geometry.marker_width,
                color: config.marker_color,
            },
            group: Group::Rotate,
        };

        let label = |pos: (f64, f64), text: &str, group: Group| SceneNode {
            shape: Shape::Label {
                x: pos.0,
                y: pos.1,
                text: text.to_string(),
                color: config.font_color,
            },
            group,
        };
        let mut labels = Vec::new();
        let first = match config.kind {
            SwitchKind::HandOffAuto => Position::Hand,
            SwitchKind::ManualAuto => Position::Manual,
        };
        labels.push(label(
            geometry.first_label_pos,
            config.label_for(first),
            Group::Switch,
        ));
        if let Some(pos) = geometry.middle_label_pos {
            labels.push(label(pos, config.label_for(Position::Off), Group::Body));
        }
        labels.push(label(
            geometry.auto_label_pos,
            config.label_for(Position::Auto),
            Group::Switch,
        ));

        Self {
            body,
            knob,
            handle,
            marker,
            labels,
        }
    }

    fn node_count(&self) -> usize {
        4 + self.labels.len()
    }

    /// Nodes in paint order: body under knob under handle under marker,
    /// labels on top.
    fn iter(&self) -> impl Iterator<Item = &SceneNode> {
        [&self.body, &self.knob, &self.handle, &self.marker]
            .into_iter()
            .chain(self.labels.iter())
    }
}

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// A rotary selector switch widget.
///
/// Owns its rendered scene, rotation state, and tooltip. The host owns the
/// window (or framebuffer) the switch is rendered into.
pub struct Switch {
    config: SwitchConfig,
    font: Option<Font<'static>>,
    geometry: Geometry,
    scene: Option<SwitchScene>,
    rotation: RotationState,
    position: Position,
    tooltip: Tooltip,
    click_handler: Option<Box<dyn FnMut()>>,
    hovered: bool,
}

impl Switch {
    pub fn new(config: SwitchConfig) -> Result<Self, SwitchError> {
        let font = match &config.font_data {
            Some(bytes) => Some(Font::try_from_vec(bytes.clone()).ok_or(SwitchError::Font)?),
            None => None,
        };
        let heights = LabelHeights::measure(&config, font.as_ref());
        let geometry = Geometry::compute(&config, heights);
        let scene = SwitchScene::build(&config, &geometry);
        let initial = config.initial_position;
        let tooltip = Tooltip::new(config.font_size);

        let mut switch = Self {
            config,
            font,
            geometry,
            scene: Some(scene),
            rotation: RotationState::new(),
            position: initial,
            tooltip,
            click_handler: None,
            hovered: false,
        };
        switch.set_position(initial);
        Ok(switch)
    }

    pub fn config(&self) -> &SwitchConfig {
        &self.config
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Current knob angle in degrees.
    pub fn rotation_angle(&self) -> f64 {
        self.rotation.angle()
    }

    /// Angle the knob is heading toward (its rest angle once idle).
    pub fn rotation_target(&self) -> f64 {
        self.rotation.target()
    }

    pub fn is_animating(&self) -> bool {
        self.rotation.is_animating()
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    /// Number of retained scene nodes; zero after `destroy`.
    pub fn node_count(&self) -> usize {
        self.scene.as_ref().map_or(0, SwitchScene::node_count)
    }

    /// Selects `position`, animating the knob to its rest angle and
    /// updating the tooltip. Positions the configured variant does not
    /// accept are ignored with a warning.
    pub fn set_position(&mut self, position: Position) {
        self.set_position_at(position, Instant::now());
    }

    /// Clock-explicit variant of [`Switch::set_position`].
    pub fn set_position_at(&mut self, position: Position, now: Instant) {
        let Some(angle) = self.config.kind.angle_for(position, self.config.marker_angle) else {
            warn!(
                "ignoring position {:?}: not valid for {:?}",
                position, self.config.kind
            );
            return;
        };
        debug!("position {:?} -> {} degrees", position, angle);
        self.position = position;
        self.rotation.retarget(
            angle,
            now,
            Duration::from_millis(self.config.tween_duration_ms),
        );
        self.tooltip
            .update(position, self.geometry.width, self.font.as_ref());
        if self.hovered {
            self.tooltip.show();
        }
    }

    /// Registers the handler invoked once per completed click on the
    /// widget bounds.
    pub fn on_click<F: FnMut() + 'static>(&mut self, handler: F) {
        self.click_handler = Some(Box::new(handler));
    }

    /// Removes the rendered scene. The widget draws nothing until
    /// [`Switch::redraw`].
    pub fn destroy(&mut self) {
        self.scene = None;
    }

    /// Destroys and fully reinitializes: label metrics and geometry are
    /// recomputed from the current configuration and the knob re-animates
    /// to the current position from its initial angle.
    pub fn redraw(&mut self) {
        self.destroy();
        let heights = LabelHeights::measure(&self.config, self.font.as_ref());
        self.geometry = Geometry::compute(&self.config, heights);
        self.scene = Some(SwitchScene::build(&self.config, &self.geometry));
        self.rotation = RotationState::new();
        self.set_position(self.position);
    }

    /// Advances the rotation tween to the present.
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    pub fn update_at(&mut self, now: Instant) {
        self.rotation.advance(now);
    }

    /// Drains pending commands without blocking, then advances animation.
    pub fn update_with_commands(&mut self, receiver: &Receiver<SwitchCommand>) {
        while let Ok(command) = receiver.try_recv() {
            match command {
                SwitchCommand::SetPosition(position) => self.set_position(position),
                SwitchCommand::Redraw => self.redraw(),
                SwitchCommand::Destroy => self.destroy(),
            }
        }
        self.update();
    }

    // ------------------------------------------------------------------
    // pointer plumbing
    // ------------------------------------------------------------------

    fn pointer_entered(&mut self) {
        self.hovered = true;
        self.tooltip.show();
    }

    fn pointer_left(&mut self) {
        self.hovered = false;
        self.tooltip.hide();
    }

    fn handle_click(&mut self) {
        if let Some(handler) = &mut self.click_handler {
            handler();
        }
    }

    /// Widget top-left corner when centered in a framebuffer.
    fn origin(&self, fb_width: usize, fb_height: usize) -> (f64, f64) {
        (
            (fb_width as f64 - self.geometry.width) / 2.0,
            (fb_height as f64 - self.geometry.height) / 2.0,
        )
    }

    fn contains(&self, x: f64, y: f64, fb_width: usize, fb_height: usize) -> bool {
        let (ox, oy) = self.origin(fb_width, fb_height);
        x >= ox && x < ox + self.geometry.width && y >= oy && y < oy + self.geometry.height
    }

    // ------------------------------------------------------------------
    // rendering
    // ------------------------------------------------------------------

    /// Rasterizes the widget, centered, into an RGBA framebuffer.
    pub fn render(&self, frame: &mut [u8], fb_width: usize, fb_height: usize) {
        let mut canvas = Canvas::new(frame, fb_width, fb_height);
        canvas.clear(self.config.background_color);
        let Some(scene) = &self.scene else {
            return;
        };

        let (ox, oy) = self.origin(fb_width, fb_height);
        let angle = self.rotation.angle().to_radians();
        for node in scene.iter() {
            self.render_node(&mut canvas, node, ox, oy, angle);
        }
        if self.tooltip.is_visible() {
            self.render_tooltip(&mut canvas, ox, oy);
        }
    }

    fn render_node(&self, canvas: &mut Canvas, node: &SceneNode, ox: f64, oy: f64, angle: f64) {
        // Body-group shapes hang off the widget center; switch-group and
        // rotate-group shapes off the switch center below it.
        let (tx, ty) = match node.group {
            Group::Body => (ox + self.geometry.cx, oy + self.geometry.cy),
            Group::Switch | Group::Rotate => (
                ox + self.geometry.cx,
                oy + self.geometry.cy + self.geometry.group_offset_y,
            ),
        };
        let place = |x: f64, y: f64| -> (f64, f64) {
            if node.group == Group::Rotate {
                let (rx, ry) = rotate_point(x, y, angle);
                (tx + rx, ty + ry)
            } else {
                (tx + x, ty + y)
            }
        };

        match &node.shape {
            Shape::Circle {
                radius,
                fill,
                stroke,
                stroke_width,
            } => {
                let (cx, cy) = place(0.0, 0.0);
                draw_filled_circle(canvas, cx, cy, *radius, *fill);
                draw_ring(canvas, cx, cy, *radius, *stroke_width, *stroke);
            }
            Shape::Handle {
                x,
                y,
                width,
                height,
                fill,
            } => {
                let (x0, y0) = place(x + width / 2.0, *y);
                let (x1, y1) = place(x + width / 2.0, y + height);
                draw_thick_line_aa(canvas, x0, y0, x1, y1, *width as f32, *fill);
            }
            Shape::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
            } => {
                let (ax, ay) = place(*x1, *y1);
                let (bx, by) = place(*x2, *y2);
                draw_thick_line_aa(canvas, ax, ay, bx, by, *width as f32, *color);
            }
            Shape::Label { x, y, text, color } => {
                if let Some(font) = &self.font {
                    let (lx, ly) = place(*x, *y);
                    draw_text(
                        canvas,
                        lx as i32,
                        ly as i32,
                        text,
                        font,
                        Scale::uniform(self.config.font_size),
                        *color,
                    );
                }
            }
        }
    }

    fn render_tooltip(&self, canvas: &mut Canvas, ox: f64, oy: f64) {
        let (x, y, w, h) = self.tooltip.bounds();
        let (bx, by) = (ox + x, oy + y);
        fill_rect(canvas, bx, by, w, h, TOOLTIP_FILL, TOOLTIP_ALPHA);
        if let Some(font) = &self.font {
            draw_text(
                canvas,
                (bx + w / 2.0) as i32,
                (by + h / 2.0) as i32,
                self.tooltip.text(),
                font,
                Scale::uniform(self.config.font_size),
                TOOLTIP_TEXT,
            );
        }
    }

    // ------------------------------------------------------------------
    // windowed host
    // ------------------------------------------------------------------

    /// Opens a window hosting the switch and runs until closed.
    pub fn show(&mut self) -> Result<(), SwitchError> {
        self.run_window(None)
    }

    /// Like [`Switch::show`], draining `receiver` once per frame.
    pub fn show_with_commands(
        &mut self,
        receiver: Receiver<SwitchCommand>,
    ) -> Result<(), SwitchError> {
        self.run_window(Some(receiver))
    }

    fn run_window(&mut self, receiver: Option<Receiver<SwitchCommand>>) -> Result<(), SwitchError> {
        let (w, h) = self.config.size();
        let logical_width = w + WINDOW_MARGIN * 2;
        let logical_height = h + WINDOW_MARGIN * 2;

        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(
                logical_width as f64,
                logical_height as f64,
            ))
            .with_resizable(false)
            .build(&event_loop)?;
        let window = std::sync::Arc::new(window);
        let window_clone = window.clone();

        let size = window.inner_size();
        let mut fb_width = size.width as usize;
        let mut fb_height = size.height as usize;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

        let frame_duration = Duration::from_secs_f64(1.0 / self.config.max_framerate);
        let mut last_frame = Instant::now();
        let mut cursor: Option<(f64, f64)> = None;
        let mut pressed_inside = false;

        event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        fb_width = new_size.width as usize;
                        fb_height = new_size.height as usize;
                        let _ = pixels.resize_buffer(new_size.width, new_size.height);
                        let _ = pixels.resize_surface(new_size.width, new_size.height);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let inside = self.contains(position.x, position.y, fb_width, fb_height);
                        if inside && !self.hovered {
                            self.pointer_entered();
                        } else if !inside && self.hovered {
                            self.pointer_left();
                        }
                        cursor = Some((position.x, position.y));
                    }
                    WindowEvent::CursorLeft { .. } => {
                        if self.hovered {
                            self.pointer_left();
                        }
                        cursor = None;
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        if button == MouseButton::Left {
                            let inside = cursor
                                .is_some_and(|(x, y)| self.contains(x, y, fb_width, fb_height));
                            match state {
                                ElementState::Pressed => pressed_inside = inside,
                                ElementState::Released => {
                                    if pressed_inside && inside {
                                        self.handle_click();
                                    }
                                    pressed_inside = false;
                                }
                            }
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        if let Some(receiver) = &receiver {
                            self.update_with_commands(receiver);
                        } else {
                            self.update();
                        }
                        let frame = pixels.frame_mut();
                        self.render(frame, fb_width, fb_height);
                        let _ = pixels.render();
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}

// ============================================================================
// DRAWING PRIMITIVES
// ============================================================================

struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        if idx + 4 > self.frame.len() {
            return;
        }
        let src = [
            color.r as f32,
            color.g as f32,
            color.b as f32,
            255.0 * alpha,
        ];
        let dst = [
            self.frame[idx] as f32,
            self.frame[idx + 1] as f32,
            self.frame[idx + 2] as f32,
            self.frame[idx + 3] as f32,
        ];
        let a = src[3] / 255.0;
        let out = [
            (src[0] * a + dst[0] * (1.0 - a)).round() as u8,
            (src[1] * a + dst[1] * (1.0 - a)).round() as u8,
            (src[2] * a + dst[2] * (1.0 - a)).round() as u8,
            0xff,
        ];
        self.frame[idx..idx + 4].copy_from_slice(&out);
    }
}

fn rotate_point(x: f64, y: f64, angle: f64) -> (f64, f64) {
    let (sin, cos) = angle.sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}

fn draw_thick_line_aa(
    canvas: &mut Canvas,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    thickness: f32,
    color: Color,
) {
    let pad = thickness.ceil() as i32 + 1;
    let min_x = x0.min(x1).floor() as i32 - pad;
    let max_x = x0.max(x1).ceil() as i32 + pad;
    let min_y = y0.min(y1).floor() as i32 - pad;
    let max_y = y0.max(y1).ceil() as i32 + pad;
    let dx = (x1 - x0) as f32;
    let dy = (y1 - y0) as f32;
    let len_sq = (dx * dx + dy * dy).max(f32::EPSILON);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = x as f32 - x0 as f32;
            let py = y as f32 - y0 as f32;
            let t = ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0);
            let lx = x0 as f32 + t * dx;
            let ly = y0 as f32 + t * dy;
            let dist = ((lx - x as f32).powi(2) + (ly - y as f32).powi(2)).sqrt();
            let aa = (1.0 - (dist - thickness / 2.0).clamp(0.0, 1.0)).clamp(0.0, 1.0);
            if aa > 0.01 {
                canvas.set_pixel(x, y, color, aa);
            }
        }
    }
}

fn draw_filled_circle(canvas: &mut Canvas, cx: f64, cy: f64, radius: f64, color: Color) {
    let r = radius.ceil() as i32 + 1;
    for y in -r..=r {
        for x in -r..=r {
            let dist = ((x * x + y * y) as f64).sqrt();
            if dist > radius + 1.0 {
                continue;
            }
            let aa = if dist > radius {
                1.0 - (dist - radius).min(1.0)
            } else {
                1.0
            };
            if aa > 0.0 {
                canvas.set_pixel(cx as i32 + x, cy as i32 + y, color, aa as f32);
            }
        }
    }
}

fn draw_ring(canvas: &mut Canvas, cx: f64, cy: f64, radius: f64, thickness: f64, color: Color) {
    let outer = radius + thickness / 2.0;
    let inner = radius - thickness / 2.0;
    let r = outer.ceil() as i32 + 1;
    for y in -r..=r {
        for x in -r..=r {
            let dist = ((x * x + y * y) as f64).sqrt();
            if dist > outer + 1.0 || dist < inner - 1.0 {
                continue;
            }
            let aa = if dist > outer {
                1.0 - (dist - outer).min(1.0)
            } else if dist < inner {
                1.0 - (inner - dist).min(1.0)
            } else {
                1.0
            };
            if aa > 0.0 {
                canvas.set_pixel(cx as i32 + x, cy as i32 + y, color, aa as f32);
            }
        }
    }
}

fn fill_rect(canvas: &mut Canvas, x: f64, y: f64, w: f64, h: f64, color: Color, alpha: f32) {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let x1 = (x + w).ceil() as i32;
    let y1 = (y + h).ceil() as i32;
    for py in y0..y1 {
        for px in x0..x1 {
            canvas.set_pixel(px, py, color, alpha);
        }
    }
}

fn draw_text(
    canvas: &mut Canvas,
    x: i32,
    y: i32,
    text: &str,
    font: &Font<'_>,
    scale: Scale,
    color: Color,
) {
    use rusttype::{point, PositionedGlyph};
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .collect();
    let (min_x, max_x, min_y, max_y) = glyphs.iter().filter_map(|g| g.pixel_bounding_box()).fold(
        (i32::MAX, i32::MIN, i32::MAX, i32::MIN),
        |(min_x, max_x, min_y, max_y), bb| {
            (
                min_x.min(bb.min.x),
                max_x.max(bb.max.x),
                min_y.min(bb.min.y),
                max_y.max(bb.max.y),
            )
        },
    );
    let width_px = if min_x < max_x { max_x - min_x } else { 0 };
    let height_px = if min_y < max_y { max_y - min_y } else { 0 };
    let offset_x = x - width_px / 2;
    let offset_y = y - height_px / 2;
    for glyph in glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px = offset_x + gx as i32 + bb.min.x - min_x;
                let py = offset_y + gy as i32 + bb.min.y - min_y;
                canvas.set_pixel(px, py, color, v);
            });
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
