//! Core value types shared by the grid, the bot and the sessions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

pub type SessionId = String;

/// One of the two play symbols. The computer always plays `Player2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    #[serde(rename = "X")]
    Player1,
    #[serde(rename = "O")]
    Player2,
}

impl Mark {
    pub const COMPUTER: Mark = Mark::Player2;

    pub fn symbol(self) -> char {
        match self {
            Mark::Player1 => 'X',
            Mark::Player2 => 'O',
        }
    }

    pub fn other(self) -> Mark {
        match self {
            Mark::Player1 => Mark::Player2,
            Mark::Player2 => Mark::Player1,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Value of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Mark(Mark),
}

impl Cell {
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// Printable form: a space for empty cells, the mark symbol otherwise.
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => ' ',
            Cell::Mark(mark) => mark.symbol(),
        }
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        Cell::Mark(mark)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "human")]
    HumanVsHuman,
    #[serde(rename = "cpu")]
    HumanVsComputer,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::HumanVsHuman => "human",
            Mode::HumanVsComputer => "cpu",
        }
    }
}

impl FromStr for Mode {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "human" => Ok(Mode::HumanVsHuman),
            "cpu" => Ok(Mode::HumanVsComputer),
            other => Err(GameError::MalformedRequestBody(format!(
                "unknown mode: {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two supported board variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoardSize {
    #[serde(rename = "3x3")]
    Small,
    #[serde(rename = "4x4")]
    Large,
}

impl BoardSize {
    pub fn dimension(self) -> u8 {
        match self {
            BoardSize::Small => 3,
            BoardSize::Large => 4,
        }
    }

    pub fn cell_count(self) -> usize {
        let n = self.dimension() as usize;
        n * n
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BoardSize::Small => "3x3",
            BoardSize::Large => "4x4",
        }
    }

    /// Parse a raw coordinate, accepting `b2`, `B2`, `2b` and `2B` alike.
    /// Letters and digits must both fall inside this board's range.
    pub fn parse_position(self, raw: &str) -> Result<Position, GameError> {
        let invalid = || GameError::InvalidPositionFormat(raw.to_string());
        let trimmed = raw.trim();
        let mut chars = trimmed.chars();
        let (first, second) = match (chars.next(), chars.next(), chars.next()) {
            (Some(a), Some(b), None) => (a.to_ascii_lowercase(), b.to_ascii_lowercase()),
            _ => return Err(invalid()),
        };
        let (letter, digit) = if first.is_ascii_alphabetic() {
            (first, second)
        } else {
            (second, first)
        };
        if !letter.is_ascii_lowercase() || !digit.is_ascii_digit() {
            return Err(invalid());
        }

        let n = self.dimension();
        let column = letter as u8 - b'a';
        let row = (digit as u8 - b'0').wrapping_sub(1);
        if column >= n || row >= n {
            return Err(invalid());
        }
        Ok(Position::new(column, row))
    }
}

impl FromStr for BoardSize {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "3x3" => Ok(BoardSize::Small),
            "4x4" => Ok(BoardSize::Large),
            other => Err(GameError::MalformedRequestBody(format!(
                "unknown size: {:?}",
                other
            ))),
        }
    }
}

impl fmt::Display for BoardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cell address: zero-based column (`a` = 0) and row (`1` = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub column: u8,
    pub row: u8,
}

impl Position {
    pub const fn new(column: u8, row: u8) -> Self {
        Self { column, row }
    }

    /// Index into a canonical (row-major) cell vector of the given dimension.
    pub fn index(self, dimension: u8) -> usize {
        self.row as usize * dimension as usize + self.column as usize
    }

    /// Build a position from its canonical name. Only used for the static
    /// layout tables, where every literal is known to be well formed.
    pub(crate) const fn named(name: &str) -> Self {
        let bytes = name.as_bytes();
        Self::new(bytes[0] - b'a', bytes[1] - b'1')
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.column) as char, self.row + 1)
    }
}

impl Serialize for Position {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position_both_orders() {
        let expected = Position::new(1, 1);
        for raw in ["b2", "B2", "2b", "2B", " b2 "] {
            assert_eq!(BoardSize::Small.parse_position(raw).unwrap(), expected, "{raw}");
        }
    }

    #[test]
    fn test_parse_position_respects_size() {
        assert!(BoardSize::Small.parse_position("d1").is_err());
        assert!(BoardSize::Small.parse_position("a4").is_err());
        assert_eq!(
            BoardSize::Large.parse_position("4d").unwrap(),
            Position::new(3, 3)
        );
    }

    #[test]
    fn test_parse_position_rejects_garbage() {
        for raw in ["", "a", "a0", "a10", "aa", "11", "z1", "b2c", "é1", "1_"] {
            assert!(
                matches!(
                    BoardSize::Large.parse_position(raw),
                    Err(GameError::InvalidPositionFormat(_))
                ),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position::new(0, 0).to_string(), "a1");
        assert_eq!(Position::new(3, 2).to_string(), "d3");
        assert_eq!(Position::named("c2"), Position::new(2, 1));
    }

    #[test]
    fn test_wire_names() {
        assert_eq!("cpu".parse::<Mode>().unwrap(), Mode::HumanVsComputer);
        assert_eq!("human".parse::<Mode>().unwrap(), Mode::HumanVsHuman);
        assert_eq!("4x4".parse::<BoardSize>().unwrap(), BoardSize::Large);
        assert!("5x5".parse::<BoardSize>().is_err());
        assert!("robot".parse::<Mode>().is_err());
    }

    #[test]
    fn test_mark_symbols() {
        assert_eq!(Mark::Player1.to_string(), "X");
        assert_eq!(Mark::COMPUTER.to_string(), "O");
        assert_eq!(Mark::Player1.other(), Mark::Player2);
        assert_eq!(Cell::Empty.symbol(), ' ');
    }
}
