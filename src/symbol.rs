use strum::VariantArray;

use crate::step::Step;

/// The local connection pattern occupying a single point of the grid.
///
/// Letters name the compass directions in which the path leaves the point (`N` is [`Step::Up`]).
/// Single-letter symbols are path termini; two-letter symbols are corners or straights through the point.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq, VariantArray)]
pub enum Symbol {
    /// No path here.
    #[default]
    Empty,
    /// Ends a path leaving upward.
    N,
    /// Ends a path leaving downward.
    S,
    /// Ends a path leaving rightward.
    E,
    /// Ends a path leaving leftward.
    W,
    /// Corner.
    NE,
    /// Corner.
    NW,
    /// Corner.
    SE,
    /// Corner.
    SW,
    /// Vertical straight.
    NS,
    /// Horizontal straight.
    EW,
}

impl Symbol {
    /// The directions in which a path leaves this point.
    pub fn exits(&self) -> &'static [Step] {
        match self {
            Self::Empty => &[],
            Self::N => &[Step::Up],
            Self::S => &[Step::Down],
            Self::E => &[Step::Right],
            Self::W => &[Step::Left],
            Self::NE => &[Step::Up, Step::Right],
            Self::NW => &[Step::Up, Step::Left],
            Self::SE => &[Step::Down, Step::Right],
            Self::SW => &[Step::Down, Step::Left],
            Self::NS => &[Step::Up, Step::Down],
            Self::EW => &[Step::Right, Step::Left],
        }
    }

    /// Whether a path leaves this point toward `step`.
    pub fn opens(&self, step: Step) -> bool {
        self.exits().contains(&step)
    }

    /// Whether this symbol ends a path, i.e. has exactly one exit.
    pub fn is_terminal(&self) -> bool {
        self.exits().len() == 1
    }

    /// All symbols with an exit toward `step`.
    pub fn opening(step: Step) -> impl Iterator<Item = Self> {
        Self::VARIANTS.iter().copied().filter(move |symbol| symbol.opens(step))
    }

    /// The four single-exit symbols.
    pub fn terminals() -> impl Iterator<Item = Self> {
        Self::VARIANTS.iter().copied().filter(Self::is_terminal)
    }

    /// Position of this symbol in [`Self::VARIANTS`].
    pub(crate) fn ordinal(&self) -> usize {
        *self as usize
    }

    /// Box-drawing character for this symbol, `.` when empty.
    pub fn glyph(&self) -> char {
        match self {
            Self::Empty => '.',
            Self::N => '╵',
            Self::S => '╷',
            Self::E => '╶',
            Self::W => '╴',
            Self::NE => '└',
            Self::NW => '┘',
            Self::SE => '┌',
            Self::SW => '┐',
            Self::NS => '│',
            Self::EW => '─',
        }
    }
}
