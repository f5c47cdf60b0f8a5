//! Zhang–Suen thinning.
//!
//! T. Y. Zhang and C. Y. Suen, "A fast parallel algorithm for thinning
//! digital patterns", CACM 27(3), 1984.

use crate::mask::BinaryMask;

/// Thin every set region to a one-pixel-wide medial skeleton, preserving
/// connectivity. Pixels off the mask count as background.
pub fn skeletonize(mask: &BinaryMask) -> BinaryMask {
    let (width, height) = (mask.width(), mask.height());
    let mut cur = mask.clone();
    let mut to_clear = Vec::new();

    loop {
        let mut changed = false;
        for pass in 0..2 {
            to_clear.clear();
            for y in 0..height {
                for x in 0..width {
                    if cur.is_set(x, y) && removable(&cur, x as isize, y as isize, pass) {
                        to_clear.push((x, y));
                    }
                }
            }
            changed |= !to_clear.is_empty();
            for &(x, y) in &to_clear {
                cur.set(x, y, false);
            }
        }
        if !changed {
            return cur;
        }
    }
}

fn removable(mask: &BinaryMask, x: isize, y: isize, pass: usize) -> bool {
    let on = |dx: isize, dy: isize| mask.is_set_or(x + dx, y + dy, false) as u8;
    // P2..P9 clockwise from north
    let p = [
        on(0, -1),
        on(1, -1),
        on(1, 0),
        on(1, 1),
        on(0, 1),
        on(-1, 1),
        on(-1, 0),
        on(-1, -1),
    ];

    let neighbors: u8 = p.iter().sum();
    if !(2..=6).contains(&neighbors) {
        return false;
    }

    let transitions = (0..8).filter(|&i| p[i] == 0 && p[(i + 1) % 8] == 1).count();
    if transitions != 1 {
        return false;
    }

    let (p2, p4, p6, p8) = (p[0], p[2], p[4], p[6]);
    if pass == 0 {
        p2 * p4 * p6 == 0 && p4 * p6 * p8 == 0
    } else {
        p2 * p4 * p8 == 0 && p2 * p6 * p8 == 0
    }
}
