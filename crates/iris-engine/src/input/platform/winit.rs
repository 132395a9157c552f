use winit::dpi::PhysicalPosition;
use winit::event::WindowEvent;

use crate::input::PointerEvent;

/// Translates a winit `WindowEvent` into a `PointerEvent`.
///
/// `scale_factor` converts physical cursor positions to logical pixels.
/// Returns `None` for everything that is not pointer motion.
pub(crate) fn translate_pointer_event(scale_factor: f64, event: &WindowEvent) -> Option<PointerEvent> {
    match event {
        WindowEvent::CursorMoved { position, .. } => {
            let (x, y) = to_logical(scale_factor, *position);
            Some(PointerEvent::Moved { x, y })
        }
        WindowEvent::CursorLeft { .. } => Some(PointerEvent::Left),
        _ => None,
    }
}

fn to_logical(scale_factor: f64, pos: PhysicalPosition<f64>) -> (f64, f64) {
    let logical = pos.to_logical::<f64>(scale_factor);
    (logical.x, logical.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_positions_are_scaled_to_logical() {
        assert_eq!(to_logical(2.0, PhysicalPosition::new(800.0, 600.0)), (400.0, 300.0));
        assert_eq!(to_logical(1.0, PhysicalPosition::new(12.5, 7.0)), (12.5, 7.0));
    }
}
