//! Procedural level layout
//!
//! A level is a grid of brick cells filtered by a layout pattern. Hit points
//! and special kinds are rolled from an RNG seeded by the run seed and the
//! level number, so the same run always sees the same layouts.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{Brick, BrickSpecial};
use crate::consts::*;

/// Which grid cells receive a brick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPattern {
    Full,
    Checker,
    Pyramid,
    Diamond,
    Stripes,
    Fortress,
    Zigzag,
    Columns,
}

impl LayoutPattern {
    pub const ALL: [LayoutPattern; 8] = [
        LayoutPattern::Full,
        LayoutPattern::Checker,
        LayoutPattern::Pyramid,
        LayoutPattern::Diamond,
        LayoutPattern::Stripes,
        LayoutPattern::Fortress,
        LayoutPattern::Zigzag,
        LayoutPattern::Columns,
    ];

    /// Level 1 is always a full grid; later levels cycle through the rest
    pub fn for_level(level: u32) -> Self {
        let index = level.saturating_sub(1) as usize % Self::ALL.len();
        Self::ALL[index]
    }

    /// Cell predicate for a `rows` x `cols` grid
    pub fn includes(&self, row: u32, col: u32, rows: u32, cols: u32) -> bool {
        let mid_col = cols / 2;
        let dx = col.abs_diff(mid_col);
        match self {
            LayoutPattern::Full => true,
            LayoutPattern::Checker => (row + col) % 2 == 0,
            LayoutPattern::Pyramid => dx <= row + 1,
            LayoutPattern::Diamond => dx + row.abs_diff(rows / 2) * 2 <= mid_col,
            LayoutPattern::Stripes => row % 2 == 0,
            LayoutPattern::Fortress => {
                row == 0
                    || row + 1 == rows
                    || col == 0
                    || col + 1 == cols
                    || (row == rows / 2 && col == mid_col)
            }
            LayoutPattern::Zigzag => (col + row) % 3 != 0,
            LayoutPattern::Columns => col % 2 == 0,
        }
    }
}

/// Grid rows grow every other level, up to a cap
pub fn rows_for_level(level: u32) -> u32 {
    (BRICK_BASE_ROWS + level.saturating_sub(1) / 2).min(BRICK_MAX_ROWS)
}

/// Width of one brick cell for a playfield
pub fn brick_width(field_width: f32) -> f32 {
    let cols = BRICK_COLS as f32;
    ((field_width - BRICK_SIDE_MARGIN * 2.0 - (cols - 1.0) * BRICK_PAD) / cols).max(1.0)
}

fn level_seed(seed: u64, level: u32) -> u64 {
    seed ^ (level as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Build the initial brick layout for `level`
///
/// Brick ids are left at 0; the caller assigns them.
pub fn build_level(level: u32, field_width: f32, seed: u64) -> Vec<Brick> {
    let level = level.max(1);
    let mut rng = Pcg32::seed_from_u64(level_seed(seed, level));
    let pattern = LayoutPattern::for_level(level);
    let rows = rows_for_level(level);
    let cols = BRICK_COLS;
    let w = brick_width(field_width);
    let h = BRICK_HEIGHT;

    let mut bricks = Vec::with_capacity((rows * cols) as usize);
    for row in 0..rows {
        for col in 0..cols {
            if !pattern.includes(row, col, rows, cols) {
                continue;
            }
            let max_hp = roll_hp(level, &mut rng);
            let special = roll_special(level, &mut rng);
            bricks.push(Brick {
                id: 0,
                row,
                col,
                x: BRICK_SIDE_MARGIN + col as f32 * (w + BRICK_PAD),
                y: BRICK_TOP_OFFSET + row as f32 * (h + BRICK_PAD),
                w,
                h,
                hp: max_hp,
                max_hp,
                alive: true,
                special,
                pattern: rng.random_range(0..4),
                seed: rng.random(),
                wobble: rng.random::<f32>() * std::f32::consts::TAU,
                wobble_speed: 0.3 + rng.random::<f32>() * 0.4,
                highlighted: false,
            });
        }
    }

    log::debug!(
        "Level {} layout {:?}: {} bricks in {} rows",
        level,
        pattern,
        bricks.len(),
        rows
    );
    bricks
}

/// Armored bricks appear from level 2, triple-hit bricks from level 4
fn roll_hp(level: u32, rng: &mut Pcg32) -> u8 {
    let mut hp = 1;
    if level >= 2 && rng.random::<f32>() < 0.3 + level as f32 * 0.05 {
        hp = 2;
    }
    if level >= 4 && rng.random::<f32>() < 0.1 + (level - 4) as f32 * 0.03 {
        hp = 3;
    }
    hp
}

/// Special bricks appear from level 2
fn roll_special(level: u32, rng: &mut Pcg32) -> BrickSpecial {
    if level < 2 {
        return BrickSpecial::Normal;
    }
    let roll = rng.random::<f32>();
    if roll < 0.05 {
        BrickSpecial::Explosive
    } else if roll < 0.09 {
        BrickSpecial::Charge
    } else if roll < 0.12 {
        BrickSpecial::Freeze
    } else if roll < 0.16 {
        BrickSpecial::Combo
    } else {
        BrickSpecial::Normal
    }
}
