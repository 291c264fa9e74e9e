use rusttype::{Font, Scale};

use crate::config::Position;
use crate::geometry::{text_height, text_width};

/// Inner padding of the tooltip box, in pixels.
const PADDING: f64 = 8.0;

/// Floating label showing the current switch position.
///
/// Hidden by default; pointer-enter on the widget shows it, pointer-leave
/// hides it. Position changes retext and recenter the box but leave it
/// hidden until the next hover.
#[derive(Debug, Clone)]
pub struct Tooltip {
    text: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    visible: bool,
    font_size: f32,
}

impl Tooltip {
    pub fn new(font_size: f32) -> Self {
        Self {
            text: String::new(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            visible: false,
            font_size,
        }
    }

    /// Retexts the tooltip for `position` and recenters it horizontally
    /// above a widget `widget_width` pixels wide.
    pub fn update(&mut self, position: Position, widget_width: f64, font: Option<&Font<'_>>) {
        self.text = position.display_name().to_string();

        let scale = Scale::uniform(self.font_size);
        let (text_w, text_h) = match font {
            Some(font) => (
                text_width(&self.text, font, scale),
                text_height(&self.text, font, scale),
            ),
            None => (
                self.text.chars().count() as f64 * f64::from(self.font_size) * 0.6,
                f64::from(self.font_size) * 1.2,
            ),
        };
        self.width = text_w + PADDING * 2.0;
        self.height = text_h + PADDING * 2.0;
        self.x = widget_width / 2.0 - self.width / 2.0;
        self.y = -self.height * 4.0 / 3.0;
        self.visible = false;
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Box origin and size relative to the widget's top-left corner. The
    /// origin is above the widget, so `y` is negative.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        (self.x, self.y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_capitalized_position_name() {
        let mut tooltip = Tooltip::new(10.0);
        tooltip.update(Position::Manual, 50.0, None);
        assert_eq!(tooltip.text(), "Manual");
        tooltip.update(Position::Off, 50.0, None);
        assert_eq!(tooltip.text(), "Off");
    }

    #[test]
    fn box_is_centered_above_the_widget() {
        let mut tooltip = Tooltip::new(10.0);
        tooltip.update(Position::Auto, 50.0, None);
        let (x, y, w, h) = tooltip.bounds();
        assert!((x + w / 2.0 - 25.0).abs() < 1e-9);
        assert!(y < 0.0);
        assert!((y + h * 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn hidden_until_hovered() {
        let mut tooltip = Tooltip::new(10.0);
        tooltip.update(Position::Auto, 50.0, None);
        assert!(!tooltip.is_visible());
        tooltip.show();
        assert!(tooltip.is_visible());
        tooltip.hide();
        assert!(!tooltip.is_visible());
    }

    #[test]
    fn position_change_rehides_the_box() {
        let mut tooltip = Tooltip::new(10.0);
        tooltip.show();
        tooltip.update(Position::Hand, 50.0, None);
        assert!(!tooltip.is_visible());
    }

    #[test]
    fn wider_text_widens_the_box() {
        let mut tooltip = Tooltip::new(10.0);
        tooltip.update(Position::Off, 50.0, None);
        let (_, _, narrow, _) = tooltip.bounds();
        tooltip.update(Position::Manual, 50.0, None);
        let (_, _, wide, _) = tooltip.bounds();
        assert!(wide > narrow);
    }
}
