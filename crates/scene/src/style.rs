/// How a visual's height is interpreted by the host renderer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum HeightMode {
    /// Render at the stored ellipsoidal height.
    #[default]
    Absolute,
    /// Drape onto the terrain surface.
    ClampToGround,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerStyle {
    pub color: [f32; 4],
    pub outline_color: [f32; 4],
    pub pixel_size: f32,
    pub height_mode: HeightMode,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            outline_color: [0.0, 0.0, 0.0, 1.0],
            pixel_size: 9.0,
            height_mode: HeightMode::Absolute,
        }
    }
}

impl MarkerStyle {
    /// Replaces a non-finite or non-positive pixel size with the default.
    pub fn sanitized(mut self) -> Self {
        if !self.pixel_size.is_finite() || self.pixel_size <= 0.0 {
            self.pixel_size = Self::default().pixel_size;
        }
        self
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PolylineStyle {
    pub color: [f32; 4],
    pub width_px: f32,
    pub clamp_to_ground: bool,
}

impl Default for PolylineStyle {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            width_px: 3.0,
            clamp_to_ground: false,
        }
    }
}

impl PolylineStyle {
    pub fn sanitized(mut self) -> Self {
        if !self.width_px.is_finite() || self.width_px <= 0.0 {
            self.width_px = Self::default().width_px;
        }
        self
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FillStyle {
    pub color: [f32; 4],
}

impl Default for FillStyle {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 0.35],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub font_size_px: f32,
    pub color: [f32; 4],
    pub halo_color: [f32; 4],
    pub halo_width_px: f32,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_size_px: 14.0,
            color: [1.0, 1.0, 1.0, 1.0],
            halo_color: [0.0, 0.0, 0.0, 0.85],
            halo_width_px: 2.0,
        }
    }
}

impl LabelStyle {
    pub fn sanitized(mut self) -> Self {
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            self.font_size_px = Self::default().font_size_px;
        }
        self
    }
}
