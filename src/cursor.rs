//! Keyboard stepping over the rows of the total-options sequence.

/// Direction of a keyboard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    fn delta(self) -> isize {
        match self {
            Direction::Up => -1,
            Direction::Down => 1,
        }
    }
}

/// Compute the cursor position after one step.
///
/// `selectable[i]` tells whether row `i` may hold the cursor. The step wraps
/// around and keeps going past unselectable rows; after a full lap without a
/// selectable row it gives up and returns `None`. With no cursor, stepping
/// down lands on the first row and stepping up on the last.
pub fn step(current: Option<usize>, direction: Direction, selectable: &[bool]) -> Option<usize> {
    let len = selectable.len() as isize;
    if len == 0 {
        return None;
    }

    let delta = direction.delta();
    let start = current.map(|c| c as isize).unwrap_or(-1);
    let mut index = ((start + delta).max(-1) + len) % len;

    for _ in 0..len {
        if selectable[index as usize] {
            return Some(index as usize);
        }
        index = (index + delta + len) % len;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_down_from_nothing_hits_first() {
        assert_eq!(step(None, Direction::Down, &[true, true]), Some(0));
    }

    #[test]
    fn test_up_from_nothing_hits_last() {
        assert_eq!(step(None, Direction::Up, &[true, true, true]), Some(2));
    }

    #[test]
    fn test_wraparound_skips_disabled() {
        // Row 0 disabled, cursor at the last row: down wraps to 0 then moves on to 1.
        assert_eq!(step(Some(2), Direction::Down, &[false, true, true]), Some(1));
    }

    #[test]
    fn test_up_skips_backwards() {
        assert_eq!(step(Some(2), Direction::Up, &[true, false, true]), Some(0));
        assert_eq!(step(Some(0), Direction::Up, &[true, true, false]), Some(1));
    }

    #[test]
    fn test_no_selectable_rows_abandons() {
        assert_eq!(step(Some(0), Direction::Down, &[false, false]), None);
        assert_eq!(step(None, Direction::Down, &[]), None);
    }

    #[test]
    fn test_single_row() {
        assert_eq!(step(Some(0), Direction::Down, &[true]), Some(0));
        assert_eq!(step(Some(0), Direction::Up, &[true]), Some(0));
    }
}
