use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, pos2};
use vesserin_graph::knowledge::NodeCategory;
use vesserin_graph::viewport::ViewportTransform;

/// Light and dark stops of each category's node fill.
pub(super) fn category_colors(category: NodeCategory) -> (Color32, Color32) {
    match category {
        NodeCategory::Concept => (
            Color32::from_rgb(0x3b, 0x82, 0xf6),
            Color32::from_rgb(0x1d, 0x4e, 0xd8),
        ),
        NodeCategory::Topic => (
            Color32::from_rgb(0x8b, 0x5c, 0xf6),
            Color32::from_rgb(0x7c, 0x3a, 0xed),
        ),
        NodeCategory::Question => (
            Color32::from_rgb(0xf5, 0x9e, 0x0b),
            Color32::from_rgb(0xd9, 0x77, 0x06),
        ),
        NodeCategory::Answer => (
            Color32::from_rgb(0x10, 0xb9, 0x81),
            Color32::from_rgb(0x05, 0x96, 0x69),
        ),
    }
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (opacity.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// Canvas-local graph point to absolute screen point.
pub(super) fn graph_to_screen(rect: Rect, viewport: ViewportTransform, graph: Pos2) -> Pos2 {
    rect.min + viewport.apply(graph).to_vec2()
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, viewport: ViewportTransform) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(17, 24, 39));

    let step = (48.0 * viewport.k.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.min + viewport.translation();
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(59, 130, 246, 18));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([pos2(x, rect.top()), pos2(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([pos2(rect.left(), y), pos2(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    if max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom() {
        return false;
    }

    if rect.contains(start) || rect.contains(end) {
        return true;
    }

    let corners = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
    ];
    (0..4).any(|side| segments_intersect(start, end, corners[side], corners[(side + 1) % 4]))
}

fn segments_intersect(a1: Pos2, a2: Pos2, b1: Pos2, b2: Pos2) -> bool {
    fn cross(o: Pos2, a: Pos2, b: Pos2) -> f32 {
        let oa = a - o;
        let ob = b - o;
        (oa.x * ob.y) - (oa.y * ob.x)
    }

    let c1 = cross(a1, a2, b1);
    let c2 = cross(a1, a2, b2);
    let c3 = cross(b1, b2, a1);
    let c4 = cross(b1, b2, a2);

    (c1 <= 0.0 && c2 >= 0.0 || c1 >= 0.0 && c2 <= 0.0)
        && (c3 <= 0.0 && c4 >= 0.0 || c3 >= 0.0 && c4 <= 0.0)
}
