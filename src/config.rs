use bon::Builder;

/// Color representation for switch elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

/// Which label/position set the switch uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchKind {
    HandOffAuto,
    ManualAuto,
}

/// A selectable switch position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Hand,
    Off,
    Manual,
    Auto,
}

impl Position {
    /// Capitalized label used by the tooltip.
    pub fn display_name(self) -> &'static str {
        match self {
            Position::Hand => "Hand",
            Position::Off => "Off",
            Position::Manual => "Manual",
            Position::Auto => "Auto",
        }
    }
}

impl SwitchKind {
    /// Whether `position` is selectable on this switch variant.
    pub fn accepts(self, position: Position) -> bool {
        match self {
            SwitchKind::HandOffAuto => {
                matches!(position, Position::Hand | Position::Off | Position::Auto)
            }
            SwitchKind::ManualAuto => matches!(position, Position::Manual | Position::Auto),
        }
    }

    /// All positions valid on this variant, left to right.
    pub fn positions(self) -> &'static [Position] {
        match self {
            SwitchKind::HandOffAuto => &[Position::Hand, Position::Off, Position::Auto],
            SwitchKind::ManualAuto => &[Position::Manual, Position::Auto],
        }
    }

    /// Rest angle in degrees for `position`, given the configured marker angle.
    ///
    /// The leftmost position sits at `-marker_angle`, a middle position (only
    /// `Off` on three-state switches) at `0`, and `Auto` at `+marker_angle`.
    pub fn angle_for(self, position: Position, marker_angle: f64) -> Option<f64> {
        if !self.accepts(position) {
            return None;
        }
        Some(match position {
            Position::Hand | Position::Manual => -marker_angle,
            Position::Off => 0.0,
            Position::Auto => marker_angle,
        })
    }
}

/// Immutable widget configuration. Built once via the bon builder; the
/// widget derives all geometry from this, never mutates it.
#[derive(Debug, Clone, Builder)]
pub struct SwitchConfig {
    // Dimensions. Zero means "unset" and falls back to the defaults below.
    #[builder(default = 0)]
    pub width: usize,
    #[builder(default = 0)]
    pub height: usize,
    #[builder(default = 50)]
    pub default_width: usize,
    #[builder(default = 55)]
    pub default_height: usize,

    #[builder(default = SwitchKind::HandOffAuto)]
    pub kind: SwitchKind,

    // Label text and font
    #[builder(default = "H".to_string())]
    pub hand_label: String,
    #[builder(default = "O".to_string())]
    pub off_label: String,
    #[builder(default = "A".to_string())]
    pub auto_label: String,
    #[builder(default = "M".to_string())]
    pub manual_label: String,
    #[builder(default = 10.0)]
    pub font_size: f32,
    #[builder(default = Color::new(0xfa, 0xfa, 0xfa))]
    pub font_color: Color,
    /// Optional font bytes for rusttype layout. Without a font, label
    /// heights fall back to a line-box estimate and label glyphs are not
    /// rasterized.
    pub font_data: Option<Vec<u8>>,

    // Switch body
    #[builder(default = Color::new(0xfa, 0xfa, 0xfa))]
    pub border_color: Color,
    #[builder(default = 1.0)]
    pub border_width: f64,
    #[builder(default = Color::new(0x33, 0x33, 0x33))]
    pub fill_color: Color,

    // Knob
    #[builder(default = Color::new(0x94, 0x94, 0x94))]
    pub knob_fill_color: Color,
    #[builder(default = Color::new(0x33, 0x33, 0x33))]
    pub knob_border_color: Color,
    #[builder(default = Color::new(0xff, 0x00, 0x00))]
    pub marker_color: Color,

    #[builder(default = Position::Auto)]
    pub initial_position: Position,
    /// Degrees from vertical at which the outer positions rest.
    #[builder(default = 45.0)]
    pub marker_angle: f64,

    // Windowed host
    #[builder(default = "Rotary Switch".to_string())]
    pub title: String,
    #[builder(default = Color::new(0x1a, 0x1a, 0x1a))]
    pub background_color: Color,
    #[builder(default = 60.0)]
    pub max_framerate: f64,
    /// Rotation tween duration in milliseconds.
    #[builder(default = 500)]
    pub tween_duration_ms: u64,
}

impl SwitchConfig {
    /// Effective drawing size: configured dimensions, or the defaults when
    /// either is zero.
    pub fn size(&self) -> (usize, usize) {
        if self.width == 0 || self.height == 0 {
            (self.default_width, self.default_height)
        } else {
            (self.width, self.height)
        }
    }

    /// Label text for `position`.
    pub fn label_for(&self, position: Position) -> &str {
        match position {
            Position::Hand => &self.hand_label,
            Position::Off => &self.off_label,
            Position::Manual => &self.manual_label,
            Position::Auto => &self.auto_label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_widget() {
        let config = SwitchConfig::builder().build();
        assert_eq!(config.size(), (50, 55));
        assert_eq!(config.kind, SwitchKind::HandOffAuto);
        assert_eq!(config.initial_position, Position::Auto);
        assert_eq!(config.marker_angle, 45.0);
        assert_eq!(config.hand_label, "H");
        assert_eq!(config.manual_label, "M");
    }

    #[test]
    fn zero_dimensions_fall_back_to_defaults() {
        let config = SwitchConfig::builder().width(120).height(0).build();
        assert_eq!(config.size(), (50, 55));
        let config = SwitchConfig::builder().width(120).height(90).build();
        assert_eq!(config.size(), (120, 90));
    }

    #[test]
    fn hand_off_auto_angle_mapping() {
        let kind = SwitchKind::HandOffAuto;
        assert_eq!(kind.angle_for(Position::Hand, 45.0), Some(-45.0));
        assert_eq!(kind.angle_for(Position::Off, 45.0), Some(0.0));
        assert_eq!(kind.angle_for(Position::Auto, 45.0), Some(45.0));
        assert_eq!(kind.angle_for(Position::Manual, 45.0), None);
    }

    #[test]
    fn manual_auto_angle_mapping() {
        let kind = SwitchKind::ManualAuto;
        assert_eq!(kind.angle_for(Position::Manual, 30.0), Some(-30.0));
        assert_eq!(kind.angle_for(Position::Auto, 30.0), Some(30.0));
        assert_eq!(kind.angle_for(Position::Off, 30.0), None);
        assert_eq!(kind.angle_for(Position::Hand, 30.0), None);
    }

    #[test]
    fn display_names_are_capitalized() {
        assert_eq!(Position::Hand.display_name(), "Hand");
        assert_eq!(Position::Off.display_name(), "Off");
        assert_eq!(Position::Manual.display_name(), "Manual");
        assert_eq!(Position::Auto.display_name(), "Auto");
    }
}
