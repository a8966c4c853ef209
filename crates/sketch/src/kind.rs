/// Geometry kinds the engine can sketch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
    Rectangle,
}

impl GeometryKind {
    /// Minimum committed vertices for a valid geometry. A rectangle needs 3
    /// free corners; the 4th is derived.
    pub fn min_points(self) -> usize {
        match self {
            GeometryKind::Point => 1,
            GeometryKind::Line => 2,
            GeometryKind::Polygon | GeometryKind::Rectangle => 3,
        }
    }

    /// Closed kinds render with the first vertex appended to close the loop.
    pub fn is_closed(self) -> bool {
        matches!(self, GeometryKind::Polygon | GeometryKind::Rectangle)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::Line => "Line",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::Rectangle => "Rectangle",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "point" => Some(GeometryKind::Point),
            "line" => Some(GeometryKind::Line),
            "polygon" => Some(GeometryKind::Polygon),
            "rectangle" => Some(GeometryKind::Rectangle),
            _ => None,
        }
    }
}

impl std::fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::GeometryKind;

    #[test]
    fn minimums_per_kind() {
        assert_eq!(GeometryKind::Point.min_points(), 1);
        assert_eq!(GeometryKind::Line.min_points(), 2);
        assert_eq!(GeometryKind::Polygon.min_points(), 3);
        assert_eq!(GeometryKind::Rectangle.min_points(), 3);
    }

    #[test]
    fn parse_round_trips_known_names() {
        for kind in [
            GeometryKind::Point,
            GeometryKind::Line,
            GeometryKind::Polygon,
            GeometryKind::Rectangle,
        ] {
            let name = kind.display_name().to_ascii_lowercase();
            assert_eq!(GeometryKind::parse(&name), Some(kind));
        }
        assert_eq!(GeometryKind::parse("circle"), None);
    }
}
