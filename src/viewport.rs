use eframe::egui::{Pos2, Vec2, pos2};

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 4.0;

/// Pan/zoom mapping from graph space to screen space:
/// `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportTransform {
    pub x: f32,
    pub y: f32,
    pub k: f32,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewportTransform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn apply(&self, graph: Pos2) -> Pos2 {
        pos2(graph.x * self.k + self.x, graph.y * self.k + self.y)
    }

    pub fn invert(&self, screen: Pos2) -> Pos2 {
        pos2((screen.x - self.x) / self.k, (screen.y - self.y) / self.k)
    }

    /// Scales by `factor` keeping the graph point under `anchor` fixed.
    /// Returns whether the scale changed.
    pub fn zoom_at(&mut self, factor: f32, anchor: Pos2) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }

        let k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if k == self.k {
            return false;
        }

        let graph = self.invert(anchor);
        self.k = k;
        self.x = anchor.x - graph.x * k;
        self.y = anchor.y - graph.y * k;
        true
    }

    pub fn zoom_by(&mut self, factor: f32, view_size: Vec2) -> bool {
        self.zoom_at(factor, (view_size * 0.5).to_pos2())
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    pub fn reset(&mut self) {
        *self = Self::IDENTITY;
    }

    /// Back to scale 1 with graph point `focus` at the container midpoint.
    /// A `focus` of the origin gives the plain `translate(w/2, h/2)` fit.
    pub fn fit_to_view(&mut self, view_size: Vec2, focus: Pos2) {
        self.k = 1.0;
        self.x = view_size.x * 0.5 - focus.x;
        self.y = view_size.y * 0.5 - focus.y;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn zoom_is_clamped() {
        let mut viewport = ViewportTransform::default();
        for _ in 0..20 {
            viewport.zoom_by(1.5, vec2(800.0, 600.0));
        }
        assert_eq!(viewport.k, MAX_ZOOM);
        assert!(!viewport.zoom_by(1.5, vec2(800.0, 600.0)));

        for _ in 0..40 {
            viewport.zoom_by(1.0 / 1.5, vec2(800.0, 600.0));
        }
        assert_eq!(viewport.k, MIN_ZOOM);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut viewport = ViewportTransform {
            x: 30.0,
            y: -12.0,
            k: 1.3,
        };
        let anchor = pos2(250.0, 140.0);
        let before = viewport.invert(anchor);
        viewport.zoom_at(1.5, anchor);
        let after = viewport.invert(anchor);

        assert_relative_eq!(before.x, after.x, epsilon = 1e-3);
        assert_relative_eq!(before.y, after.y, epsilon = 1e-3);
    }

    #[test]
    fn invert_undoes_apply() {
        let viewport = ViewportTransform {
            x: 120.0,
            y: 80.0,
            k: 2.5,
        };
        let point = pos2(-14.0, 33.0);
        let round = viewport.invert(viewport.apply(point));
        assert_relative_eq!(round.x, point.x, epsilon = 1e-4);
        assert_relative_eq!(round.y, point.y, epsilon = 1e-4);
    }

    #[test]
    fn pan_and_reset() {
        let mut viewport = ViewportTransform::default();
        viewport.pan_by(10.0, -4.0);
        assert_eq!(viewport.apply(pos2(0.0, 0.0)), pos2(10.0, -4.0));

        viewport.zoom_by(2.0, vec2(800.0, 600.0));
        viewport.fit_to_view(vec2(800.0, 600.0), Pos2::ZERO);
        assert_eq!(viewport, ViewportTransform { x: 400.0, y: 300.0, k: 1.0 });

        viewport.fit_to_view(vec2(800.0, 600.0), pos2(400.0, 300.0));
        assert_eq!(viewport, ViewportTransform::IDENTITY);

        viewport.reset();
        assert_eq!(viewport, ViewportTransform::IDENTITY);
    }
}
