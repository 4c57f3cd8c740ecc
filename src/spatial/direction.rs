//! Cardinal neighbour directions used by adjacency and propagation

/// One of the four neighbour offsets of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// One row up (`dy = -1`)
    Up,
    /// One column left (`dx = -1`)
    Left,
    /// One column right (`dx = +1`)
    Right,
    /// One row down (`dy = +1`)
    Down,
}

/// Number of neighbour directions
pub const DIRECTION_COUNT: usize = 4;

impl Direction {
    /// All directions in index order
    pub const ALL: [Self; DIRECTION_COUNT] = [Self::Up, Self::Left, Self::Right, Self::Down];

    /// Dense index in `0..DIRECTION_COUNT`
    pub const fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Left => 1,
            Self::Right => 2,
            Self::Down => 3,
        }
    }

    // Index order is chosen so that opposite(i) == 3 - i
    /// The direction pointing back
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
        }
    }

    /// Row and column offset `(dy, dx)`
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Self::Up => (-1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
            Self::Down => (1, 0),
        }
    }
}
