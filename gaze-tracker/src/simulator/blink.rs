use gaze_core::{MouseButton, Pointer, Position, Resolution};
use tracing::debug;

/// Blink sub-state of the mouse simulator.
///
/// Holding the blink button closes the simulated eyes: the pointer is parked on
/// the bottom edge of the screen, below the position it had when the button went
/// down. Releasing the button puts the pointer back.
#[derive(Debug, Clone)]
pub struct BlinkTracker {
    blinking: bool,
    reference: Position,
    button: MouseButton,
    screen_height: f64,
}

impl BlinkTracker {
    pub fn new(resolution: Resolution, button: MouseButton) -> Self {
        Self {
            blinking: false,
            reference: resolution.center(),
            button,
            screen_height: resolution.height as f64,
        }
    }

    pub fn is_blinking(&self) -> bool {
        self.blinking
    }

    /// Position the pointer had when the current (or last) blink started.
    pub fn reference(&self) -> Position {
        self.reference
    }

    /// Reads the button once and applies the matching transition.
    pub fn update<P: Pointer + ?Sized>(&mut self, pointer: &mut P) {
        let down = pointer.pressed()[self.button.index()];
        match (self.blinking, down) {
            (true, true) => pointer.set_position(self.closed_position()),
            (true, false) => {
                pointer.set_position(self.reference);
                self.blinking = false;
                debug!(reference = %self.reference, "simulated blink ended");
            }
            (false, true) => {
                self.blinking = true;
                self.reference = pointer.position();
                pointer.set_position(self.closed_position());
                debug!(reference = %self.reference, "simulated blink started");
            }
            (false, false) => {}
        }
    }

    fn closed_position(&self) -> Position {
        Position::new(self.reference.x, self.screen_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::{PointerFrame, ScriptedPointer};

    fn tracker() -> BlinkTracker {
        BlinkTracker::new(Resolution::new(800, 600), MouseButton::Right)
    }

    #[test]
    fn test_press_parks_pointer_on_bottom_edge() {
        let mut blink = tracker();
        let mut pointer = ScriptedPointer::full();
        pointer.push(PointerFrame::at(120.0, 80.0).with_button(MouseButton::Right));

        blink.update(&mut pointer);
        assert!(blink.is_blinking());
        assert_eq!(blink.reference(), Position::new(120.0, 80.0));
        assert_eq!(pointer.current(), Position::new(120.0, 600.0));
    }

    #[test]
    fn test_release_restores_reference() {
        let mut blink = tracker();
        let mut pointer = ScriptedPointer::full();
        pointer.extend([
            PointerFrame::at(120.0, 80.0).with_button(MouseButton::Right),
            PointerFrame::hold().with_button(MouseButton::Right),
            PointerFrame::hold(),
        ]);

        blink.update(&mut pointer);
        blink.update(&mut pointer);
        assert!(blink.is_blinking());
        blink.update(&mut pointer);
        assert!(!blink.is_blinking());
        assert_eq!(pointer.current(), Position::new(120.0, 80.0));
        assert_eq!(
            pointer.warps(),
            vec![
                Position::new(120.0, 600.0),
                Position::new(120.0, 600.0),
                Position::new(120.0, 80.0),
            ]
        );
    }

    #[test]
    fn test_other_buttons_are_ignored() {
        let mut blink = tracker();
        let mut pointer = ScriptedPointer::full();
        pointer.push(PointerFrame::at(10.0, 10.0).with_button(MouseButton::Left));
        blink.update(&mut pointer);
        assert!(!blink.is_blinking());
        assert!(pointer.warps().is_empty());
    }
}
