use scene::style::{FillStyle, LabelStyle, MarkerStyle, PolylineStyle};

/// Visual configuration captured once at controller construction.
///
/// Virtual midpoint handles get the secondary marker style so they read as
/// affordances rather than committed vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawOptions {
    pub vertex_marker: MarkerStyle,
    pub virtual_marker: MarkerStyle,
    pub rotate_marker: MarkerStyle,
    pub preview_marker: MarkerStyle,
    pub stroke: PolylineStyle,
    pub fill: FillStyle,
    pub label: LabelStyle,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self {
            vertex_marker: MarkerStyle::default(),
            virtual_marker: MarkerStyle {
                color: [0.6, 0.6, 0.6, 0.9],
                pixel_size: 7.0,
                ..Default::default()
            },
            rotate_marker: MarkerStyle {
                color: [1.0, 0.85, 0.1, 1.0],
                ..Default::default()
            },
            preview_marker: MarkerStyle::default(),
            stroke: PolylineStyle::default(),
            fill: FillStyle::default(),
            label: LabelStyle::default(),
        }
    }
}

impl DrawOptions {
    /// Applies the per-style "sanitize, don't fail" policy to every style.
    pub fn sanitized(self) -> Self {
        Self {
            vertex_marker: self.vertex_marker.sanitized(),
            virtual_marker: self.virtual_marker.sanitized(),
            rotate_marker: self.rotate_marker.sanitized(),
            preview_marker: self.preview_marker.sanitized(),
            stroke: self.stroke.sanitized(),
            fill: self.fill,
            label: self.label.sanitized(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DrawOptions;
    use scene::style::MarkerStyle;

    #[test]
    fn sanitized_repairs_every_style() {
        let options = DrawOptions {
            vertex_marker: MarkerStyle {
                pixel_size: f32::INFINITY,
                ..Default::default()
            },
            ..Default::default()
        }
        .sanitized();
        assert_eq!(
            options.vertex_marker.pixel_size,
            MarkerStyle::default().pixel_size
        );
    }

    #[test]
    fn virtual_markers_are_visually_secondary() {
        let options = DrawOptions::default();
        assert_ne!(options.virtual_marker.color, options.vertex_marker.color);
        assert!(options.virtual_marker.pixel_size < options.vertex_marker.pixel_size);
    }
}
