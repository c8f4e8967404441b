use eframe::egui::Pos2;

/// Pointer input in screen coordinates, relative to the canvas origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown { position: Pos2 },
    PointerMove { position: Pos2 },
    PointerUp { position: Pos2 },
    /// Positive `delta` zooms in.
    Wheel { position: Pos2, delta: f32 },
    PointerLeft,
}

impl InputEvent {
    pub fn position(&self) -> Option<Pos2> {
        match *self {
            Self::PointerDown { position }
            | Self::PointerMove { position }
            | Self::PointerUp { position }
            | Self::Wheel { position, .. } => Some(position),
            Self::PointerLeft => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputOutcome {
    pub hover_changed: bool,
    pub selection_changed: bool,
    pub dragging: Option<String>,
    pub panned: bool,
    pub zoomed: bool,
}

impl InputOutcome {
    pub fn needs_repaint(&self) -> bool {
        self.hover_changed
            || self.selection_changed
            || self.dragging.is_some()
            || self.panned
            || self.zoomed
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Gesture {
    Idle,
    Drag {
        node_id: String,
        pressed_at: Pos2,
        moved: bool,
    },
    Pan {
        last: Pos2,
        pressed_at: Pos2,
        moved: bool,
    },
}

/// Screen-space travel below which a press/release counts as a click.
pub(crate) const CLICK_SLOP: f32 = 3.0;

/// Wheel delta in points to zoom factor, clamped per event.
pub fn wheel_zoom_factor(delta: f32) -> f32 {
    (1.0 + delta * 0.0018).clamp(0.85, 1.15)
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    #[test]
    fn wheel_factor_is_bounded() {
        assert_eq!(wheel_zoom_factor(0.0), 1.0);
        assert!(wheel_zoom_factor(40.0) > 1.0);
        assert_eq!(wheel_zoom_factor(10_000.0), 1.15);
        assert_eq!(wheel_zoom_factor(-10_000.0), 0.85);
    }

    #[test]
    fn quiet_outcome_needs_no_repaint() {
        assert!(!InputOutcome::default().needs_repaint());
        let zoomed = InputOutcome {
            zoomed: true,
            ..InputOutcome::default()
        };
        assert!(zoomed.needs_repaint());
    }

    #[test]
    fn pointer_left_has_no_position() {
        assert_eq!(InputEvent::PointerLeft.position(), None);
        assert_eq!(
            InputEvent::Wheel {
                position: pos2(1.0, 2.0),
                delta: 3.0
            }
            .position(),
            Some(pos2(1.0, 2.0))
        );
    }
}
