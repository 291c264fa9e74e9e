use rusttype::{point, Font, PositionedGlyph, Scale};

use crate::config::{Position, SwitchConfig, SwitchKind};

/// Clearance between the switch body and its labels, in pixels.
const LABEL_CLEARANCE: f64 = 3.0;

/// Measured heights of the configured labels. Label layout depends on font
/// metrics, so these must exist before the geometry can be derived.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelHeights {
    pub first: f64,
    pub middle: f64,
    pub auto: f64,
}

impl LabelHeights {
    /// Measures each label at the configured font size. With no font the
    /// height falls back to a line-box estimate of the font size.
    pub fn measure(config: &SwitchConfig, font: Option<&Font<'_>>) -> Self {
        let measure = |text: &str| match font {
            Some(font) => text_height(text, font, Scale::uniform(config.font_size)),
            None => f64::from(config.font_size) * 1.2,
        };
        match config.kind {
            SwitchKind::HandOffAuto => Self {
                first: measure(config.label_for(Position::Hand)),
                middle: measure(config.label_for(Position::Off)),
                auto: measure(config.label_for(Position::Auto)),
            },
            SwitchKind::ManualAuto => {
                let manual = measure(config.label_for(Position::Manual));
                Self {
                    first: manual,
                    // two-state switches reuse the manual label height where
                    // the off label would sit
                    middle: manual,
                    auto: measure(config.label_for(Position::Auto)),
                }
            }
        }
    }
}

/// Derived layout values, computed once per (re)draw from the configuration
/// and the measured label heights.
#[derive(Debug, Clone, Copy)]
pub struct Geometry {
    pub width: f64,
    pub height: f64,
    /// Body-group origin, the center of the drawing area.
    pub cx: f64,
    pub cy: f64,

    pub switch_radius: f64,
    pub knob_radius: f64,
    pub knob_width: f64,
    pub marker_width: f64,
    pub marker_length: f64,

    /// Vertical offset of the switch group below the body-group origin.
    pub group_offset_y: f64,
    /// Knob handle rect origin relative to the switch center (pre-rotation).
    pub handle_offset: (f64, f64),
    pub handle_size: (f64, f64),
    /// Marker line top end relative to the switch center (pre-rotation).
    pub marker_offset_y: f64,

    /// Anchor of the leftmost label (hand or manual), relative to the
    /// switch center.
    pub first_label_pos: (f64, f64),
    /// Anchor of the auto label, mirrored across the vertical axis.
    pub auto_label_pos: (f64, f64),
    /// Anchor of the off label relative to the body-group origin; only
    /// present on three-state switches.
    pub middle_label_pos: Option<(f64, f64)>,
}

impl Geometry {
    pub fn compute(config: &SwitchConfig, labels: LabelHeights) -> Self {
        let (w, h) = config.size();
        let (width, height) = (w as f64, h as f64);
        let border = config.border_width;

        // The radius is bounded by the horizontal extent and by the vertical
        // extent left over once the labels have their room.
        let side_band = labels.first.max(labels.auto);
        let switch_radius =
            ((width - border) / 2.0).min((height - labels.middle - side_band) / 2.0);
        let knob_radius = switch_radius / 2.0;
        let knob_width = switch_radius / 3.0;

        let distance = switch_radius + border * 2.0 + LABEL_CLEARANCE;
        let from_vertical = (90.0 - config.marker_angle).to_radians();
        let first_label_pos = (
            -(from_vertical.cos() * distance),
            -(from_vertical.sin() * distance),
        );
        let auto_label_pos = (-first_label_pos.0, first_label_pos.1);

        let group_base = -(height / 2.0 - switch_radius - border * 2.0 - LABEL_CLEARANCE);
        let (group_offset_y, middle_label_pos) = match config.kind {
            SwitchKind::HandOffAuto => (
                group_base + labels.middle,
                Some((0.0, -(height / 2.0 - labels.middle))),
            ),
            SwitchKind::ManualAuto => (group_base + labels.middle - 1.0, None),
        };

        Self {
            width,
            height,
            cx: width / 2.0,
            cy: height / 2.0,
            switch_radius,
            knob_radius,
            knob_width,
            marker_width: knob_width / 4.0,
            marker_length: switch_radius / 2.0,
            group_offset_y,
            handle_offset: (-knob_width / 2.0, -switch_radius - 3.0),
            handle_size: (knob_width, 2.0 * switch_radius),
            marker_offset_y: -switch_radius - 1.0,
            first_label_pos,
            auto_label_pos,
            middle_label_pos,
        }
    }
}

/// Pixel height of `text` laid out at `scale`.
pub fn text_height(text: &str, font: &Font<'_>, scale: Scale) -> f64 {
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .collect();
    let (min_y, max_y) = glyphs
        .iter()
        .filter_map(|g| g.pixel_bounding_box())
        .fold((i32::MAX, i32::MIN), |(min_y, max_y), bb| {
            (min_y.min(bb.min.y), max_y.max(bb.max.y))
        });
    if min_y < max_y {
        f64::from(max_y - min_y)
    } else {
        f64::from(v_metrics.ascent - v_metrics.descent)
    }
}

/// Pixel width of `text` laid out at `scale`.
pub fn text_width(text: &str, font: &Font<'_>, scale: Scale) -> f64 {
    let glyphs: Vec<PositionedGlyph> = font.layout(text, scale, point(0.0, 0.0)).collect();
    let (min_x, max_x) = glyphs
        .iter()
        .filter_map(|g| g.pixel_bounding_box())
        .fold((i32::MAX, i32::MIN), |(min_x, max_x), bb| {
            (min_x.min(bb.min.x), max_x.max(bb.max.x))
        });
    if min_x < max_x {
        f64::from(max_x - min_x)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SwitchConfig;

    fn geometry_for(config: &SwitchConfig) -> Geometry {
        Geometry::compute(config, LabelHeights::measure(config, None))
    }

    #[test]
    fn radius_never_overflows_bounds() {
        for (w, h) in [(0, 0), (50, 55), (80, 80), (200, 60), (60, 200), (120, 400)] {
            for kind in [SwitchKind::HandOffAuto, SwitchKind::ManualAuto] {
                let config = SwitchConfig::builder().width(w).height(h).kind(kind).build();
                let geometry = geometry_for(&config);
                let (ew, eh) = config.size();
                let bound = (ew.min(eh) as f64) / 2.0;
                assert!(
                    geometry.switch_radius <= bound,
                    "radius {} exceeds bound {} for {}x{} {:?}",
                    geometry.switch_radius,
                    bound,
                    w,
                    h,
                    kind
                );
            }
        }
    }

    #[test]
    fn knob_is_fixed_fraction_of_radius() {
        let config = SwitchConfig::builder().width(100).height(110).build();
        let geometry = geometry_for(&config);
        assert_eq!(geometry.knob_radius, geometry.switch_radius / 2.0);
        assert_eq!(geometry.knob_width, geometry.switch_radius / 3.0);
        assert_eq!(geometry.marker_width, geometry.knob_width / 4.0);
    }

    #[test]
    fn auto_label_mirrors_first_label() {
        let config = SwitchConfig::builder()
            .width(100)
            .height(110)
            .marker_angle(30.0)
            .build();
        let geometry = geometry_for(&config);
        assert_eq!(geometry.auto_label_pos.0, -geometry.first_label_pos.0);
        assert_eq!(geometry.auto_label_pos.1, geometry.first_label_pos.1);
        // both side labels sit above the switch center
        assert!(geometry.first_label_pos.1 < 0.0);
        // the first label sits to the left
        assert!(geometry.first_label_pos.0 < 0.0);
    }

    #[test]
    fn middle_label_only_on_three_state_switch() {
        let config = SwitchConfig::builder().kind(SwitchKind::HandOffAuto).build();
        assert!(geometry_for(&config).middle_label_pos.is_some());
        let config = SwitchConfig::builder().kind(SwitchKind::ManualAuto).build();
        assert!(geometry_for(&config).middle_label_pos.is_none());
    }

    #[test]
    fn label_height_fallback_scales_with_font_size() {
        let config = SwitchConfig::builder().font_size(10.0).build();
        let heights = LabelHeights::measure(&config, None);
        assert_eq!(heights.first, 12.0);
        let config = SwitchConfig::builder().font_size(20.0).build();
        let heights = LabelHeights::measure(&config, None);
        assert_eq!(heights.first, 24.0);
    }

    #[test]
    fn marker_angle_widens_label_spread() {
        let narrow = SwitchConfig::builder().width(100).height(110).marker_angle(20.0).build();
        let wide = SwitchConfig::builder().width(100).height(110).marker_angle(60.0).build();
        let narrow_x = geometry_for(&narrow).first_label_pos.0.abs();
        let wide_x = geometry_for(&wide).first_label_pos.0.abs();
        assert!(wide_x > narrow_x);
    }
}
