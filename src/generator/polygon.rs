//! Polygon Emitter
//!
//! Draws one distorted polygon. Each side advances the chaotic state once,
//! turns its dx into a turn angle and emits `Forward` then `Turn left`.

use super::chaos::{ChaoticState, Derivative};
use super::instruction::DrawingInstruction;
use super::{AngleDistorter, ChaosSampling, Distortion};

/// Lazily emits the `2 * sides` instructions of one polygon.
///
/// The chaotic state is borrowed per call rather than held, so the owner
/// (usually the driver) keeps exclusive ownership between steps.
#[derive(Debug, Clone)]
pub struct PolygonEmitter {
    sides: u32,
    side_length: f64,
    step_index: f64,
    distorter: AngleDistorter,
    chaos_multiplier: f64,
    sampling: ChaosSampling,
    drawn: u32,
    pending_turn: Option<f64>,
    snapshot: Option<Derivative>,
}

impl PolygonEmitter {
    pub fn new(sides: u32, side_length: f64, step_index: f64, distortion: &Distortion) -> Self {
        Self {
            sides,
            side_length,
            step_index,
            distorter: distortion.angle_distorter(),
            chaos_multiplier: distortion.chaos_multiplier,
            sampling: distortion.sampling,
            drawn: 0,
            pending_turn: None,
            snapshot: None,
        }
    }

    pub fn sides(&self) -> u32 {
        self.sides
    }

    /// Instructions not yet emitted
    pub fn remaining(&self) -> usize {
        let sides_left = (self.sides - self.drawn) as usize;
        sides_left * 2 + usize::from(self.pending_turn.is_some())
    }

    /// Next instruction, or `None` once the polygon is closed
    pub fn next_instruction(&mut self, state: &mut ChaoticState) -> Option<DrawingInstruction> {
        if let Some(angle) = self.pending_turn.take() {
            return Some(DrawingInstruction::left(angle));
        }
        if self.drawn >= self.sides {
            return None;
        }

        let (dx, _, _) = self.step(state);
        let angle = self.distorter.turn_angle(self.step_index, self.sides, dx);
        tracing::trace!(sides = self.sides, side = self.drawn, angle, "turn angle");

        self.drawn += 1;
        self.pending_turn = Some(angle);
        Some(DrawingInstruction::forward(self.side_length))
    }

    fn step(&mut self, state: &mut ChaoticState) -> Derivative {
        match self.sampling {
            ChaosSampling::PerSide => state.update(self.chaos_multiplier),
            ChaosSampling::PolygonStart => {
                let derivative = *self.snapshot.get_or_insert_with(|| state.derivative());
                state.advance(derivative, self.chaos_multiplier);
                derivative
            }
        }
    }
}

/// Emit a whole polygon at once
pub fn emit_polygon(
    sides: u32,
    side_length: f64,
    state: &mut ChaoticState,
    step_index: f64,
    distortion: &Distortion,
) -> Vec<DrawingInstruction> {
    let mut emitter = PolygonEmitter::new(sides, side_length, step_index, distortion);
    let mut out = Vec::with_capacity(emitter.remaining());
    while let Some(instruction) = emitter.next_instruction(state) {
        out.push(instruction);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::angle::golden_ratio;
    use crate::generator::Direction;

    fn turns(instructions: &[DrawingInstruction]) -> Vec<f64> {
        instructions
            .iter()
            .filter_map(|i| match i {
                DrawingInstruction::Turn { degrees, .. } => Some(*degrees),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_instruction_count_and_alternation() {
        for sides in [1, 3, 4, 7, 12] {
            let mut state = ChaoticState::new();
            let out = emit_polygon(sides, 50.0, &mut state, 0.0, &Distortion::default());
            assert_eq!(out.len(), 2 * sides as usize);
            for (i, ins) in out.iter().enumerate() {
                if i % 2 == 0 {
                    assert_eq!(*ins, DrawingInstruction::forward(50.0));
                } else {
                    assert!(matches!(
                        ins,
                        DrawingInstruction::Turn { direction: Direction::Left, .. }
                    ));
                }
            }
        }
    }

    #[test]
    fn test_state_advances_once_per_side() {
        let mut state = ChaoticState::new();
        emit_polygon(5, 10.0, &mut state, 0.0, &Distortion::default());

        let mut expected = ChaoticState::new();
        for _ in 0..5 {
            expected.update(0.01);
        }
        assert_eq!(state, expected);
    }

    #[test]
    fn test_first_triangle_angles() {
        let mut state = ChaoticState::new();
        let out = emit_polygon(3, 50.0, &mut state, 0.0, &Distortion::default());
        let angles = turns(&out);

        // dx is zero at (1, 1, 1)
        assert_eq!(angles[0], 120.0);
        // second side sees y advanced to 1.26, so dx = 2.6
        let expected = 120.0 + 2.6 * golden_ratio() / 100.0;
        assert!((angles[1] - expected).abs() < 1e-9);
        assert!(angles[2] > angles[1]);
    }

    #[test]
    fn test_deterministic() {
        let distortion = Distortion {
            modulation_strength: 3.0,
            golden_ratio_divisor: 7.0,
            chaos_multiplier: 0.2,
            sampling: ChaosSampling::PerSide,
        };
        let mut a = ChaoticState::new();
        let mut b = ChaoticState::new();
        let first = emit_polygon(9, 25.0, &mut a, 4.2, &distortion);
        let second = emit_polygon(9, 25.0, &mut b, 4.2, &distortion);
        assert_eq!(first, second);
        assert_eq!(a, b);
    }

    #[test]
    fn test_polygon_start_reuses_first_derivative() {
        let distortion = Distortion {
            sampling: ChaosSampling::PolygonStart,
            ..Distortion::default()
        };
        let mut state = ChaoticState::new();
        let out = emit_polygon(4, 50.0, &mut state, 0.0, &distortion);

        // dx at (1, 1, 1) is zero, so every side turns the undistorted 90
        assert!(turns(&out).iter().all(|&a| a == 90.0));

        let mut expected = ChaoticState::new();
        let d = expected.derivative();
        for _ in 0..4 {
            expected.advance(d, 0.01);
        }
        assert_eq!(state, expected);
    }

    #[test]
    fn test_lazy_remaining() {
        let mut state = ChaoticState::new();
        let mut emitter = PolygonEmitter::new(3, 1.0, 0.0, &Distortion::default());
        assert_eq!(emitter.remaining(), 6);
        emitter.next_instruction(&mut state);
        assert_eq!(emitter.remaining(), 5);
        while emitter.next_instruction(&mut state).is_some() {}
        assert_eq!(emitter.remaining(), 0);
        assert_eq!(emitter.next_instruction(&mut state), None);
    }
}
