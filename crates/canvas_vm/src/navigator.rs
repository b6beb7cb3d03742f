//! The Navigator: resolves one step of movement from the current codel,
//! either across a color block's edge or through a white
//! region by straight-line sliding.

use crate::exits::{Cc, Dp, Position};
use crate::grid::ShapeTable;

/// Where a single `step` landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Moved onto `Position`, which lies in a non-white, non-obstacle shape.
    Colored(Position),
    /// Moved onto `Position`, which lies in a white shape.
    White(Position),
    /// Blocked by the grid edge or an obstacle (Black or Unrecognized).
    Blocked,
}

pub struct Navigator<'a> {
    table: &'a ShapeTable,
}

impl<'a> Navigator<'a> {
    pub fn new(table: &'a ShapeTable) -> Self {
        Self { table }
    }

    /// One attempt to leave `pos` along `dp`/`cc`. `pos` must lie
    /// in a chromatic shape; white regions are handled by `slide_white`.
    pub fn step(&self, pos: Position, dp: Dp, cc: Cc) -> StepOutcome {
        let shape_id = match self.table.shape_id_at(pos) {
            Some(id) => id,
            None => return StepOutcome::Blocked,
        };
        let shape = self.table.shape(shape_id);

        let Some((ex, ey)) = shape.exit_codel(dp, cc) else {
            return StepOutcome::Blocked;
        };
        let exit = Position::new(ex as usize, ey as usize);

        self.advance(exit, dp)
    }

    /// Slide through a contiguous run of White codels starting at `pos`
    /// (which must itself be White) until a non-white codel is reached or
    /// the slide runs off the grid / into an obstacle. All four
    /// directions are handled symmetrically: there is no special case for
    /// any one of them.
    pub fn slide_white(&self, pos: Position, dp: Dp) -> StepOutcome {
        let mut current = pos;
        loop {
            match current.step(dp, self.table.width(), self.table.height()) {
                None => return StepOutcome::Blocked,
                Some(next) => {
                    let color = match self.table.color_at(next) {
                        Some(c) => c,
                        None => return StepOutcome::Blocked,
                    };
                    if color.is_obstacle() {
                        return StepOutcome::Blocked;
                    }
                    if color.is_white() {
                        current = next;
                        continue;
                    }
                    return StepOutcome::Colored(next);
                }
            }
        }
    }

    fn advance(&self, exit: Position, dp: Dp) -> StepOutcome {
        match exit.step(dp, self.table.width(), self.table.height()) {
            None => StepOutcome::Blocked,
            Some(next) => match self.table.color_at(next) {
                None => StepOutcome::Blocked,
                Some(color) if color.is_obstacle() => StepOutcome::Blocked,
                Some(color) if color.is_white() => StepOutcome::White(next),
                Some(_) => StepOutcome::Colored(next),
            },
        }
    }
}
