use std::fmt;

use serde::{Deserialize, Serialize};

use crate::draw::DrawnSet;

pub const MAX_NUMBER: u8 = 75;
pub const COLUMN_LEN: u8 = 15;

/// A bingo number, always in `1..=MAX_NUMBER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Ball(u8);

impl Ball {
    pub const fn new(number: u8) -> Option<Self> {
        if number >= 1 && number <= MAX_NUMBER {
            Some(Self(number))
        } else {
            None
        }
    }

    pub const fn number(self) -> u8 {
        self.0
    }

    pub fn column(self) -> Column {
        Column::ALL[((self.0 - 1) / COLUMN_LEN) as usize]
    }

    pub fn letter(self) -> char {
        self.column().letter()
    }

    /// Every ball, in board order.
    pub fn all() -> impl Iterator<Item = Ball> {
        (1..=MAX_NUMBER).map(Ball)
    }
}

impl fmt::Display for Ball {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.letter(), self.0)
    }
}

impl TryFrom<u8> for Ball {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ball::new(value).ok_or_else(|| format!("{value} is not a bingo number (1..={MAX_NUMBER})"))
    }
}

impl From<Ball> for u8 {
    fn from(ball: Ball) -> Self {
        ball.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    B,
    I,
    N,
    G,
    O,
}

impl Column {
    pub const ALL: [Column; 5] = [Column::B, Column::I, Column::N, Column::G, Column::O];

    pub fn letter(self) -> char {
        match self {
            Column::B => 'B',
            Column::I => 'I',
            Column::N => 'N',
            Column::G => 'G',
            Column::O => 'O',
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn first(self) -> u8 {
        self.index() as u8 * COLUMN_LEN + 1
    }

    pub fn last(self) -> u8 {
        self.first() + COLUMN_LEN - 1
    }

    pub fn balls(self) -> impl Iterator<Item = Ball> {
        (self.first()..=self.last()).map(Ball)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoardCell {
    pub ball: Ball,
    pub drawn: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardColumn {
    pub column: Column,
    pub cells: Vec<BoardCell>,
}

/// The five fixed columns with each cell marked drawn iff its ball is in `drawn`.
pub fn board(drawn: &DrawnSet) -> Vec<BoardColumn> {
    Column::ALL
        .iter()
        .map(|&column| BoardColumn {
            column,
            cells: column
                .balls()
                .map(|ball| BoardCell {
                    ball,
                    drawn: drawn.contains(ball),
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ball_rejects_out_of_range_numbers() {
        assert!(Ball::new(0).is_none());
        assert!(Ball::new(76).is_none());
        assert_eq!(Ball::new(1).map(Ball::number), Some(1));
        assert_eq!(Ball::new(75).map(Ball::number), Some(75));
    }

    #[test]
    fn column_boundaries() {
        let col = |n| Ball::new(n).unwrap().column();
        assert_eq!(col(1), Column::B);
        assert_eq!(col(15), Column::B);
        assert_eq!(col(16), Column::I);
        assert_eq!(col(30), Column::I);
        assert_eq!(col(31), Column::N);
        assert_eq!(col(45), Column::N);
        assert_eq!(col(46), Column::G);
        assert_eq!(col(60), Column::G);
        assert_eq!(col(61), Column::O);
        assert_eq!(col(75), Column::O);
    }

    #[test]
    fn columns_hold_fifteen_consecutive_numbers() {
        for column in Column::ALL {
            let numbers: Vec<u8> = column.balls().map(Ball::number).collect();
            assert_eq!(numbers.len(), COLUMN_LEN as usize);
            assert!(numbers.windows(2).all(|w| w[1] == w[0] + 1));
            assert!(column.balls().all(|b| b.column() == column));
        }
        assert_eq!(Column::G.first(), 46);
        assert_eq!(Column::G.last(), 60);
    }

    #[test]
    fn display_shows_letter_and_number() {
        assert_eq!(Ball::new(7).unwrap().to_string(), "B-7");
        assert_eq!(Ball::new(42).unwrap().to_string(), "N-42");
    }

    #[test]
    fn serde_round_trips_as_plain_number_and_validates() {
        let ball = Ball::new(33).unwrap();
        assert_eq!(serde_json::to_string(&ball).unwrap(), "33");
        assert_eq!(serde_json::from_str::<Ball>("33").unwrap(), ball);
        assert!(serde_json::from_str::<Ball>("0").is_err());
        assert!(serde_json::from_str::<Ball>("99").is_err());
    }

    #[test]
    fn board_marks_only_drawn_cells() {
        let mut drawn = DrawnSet::new();
        drawn.insert(Ball::new(17).unwrap()).unwrap();

        let columns = board(&drawn);
        assert_eq!(columns.len(), 5);
        let marked: Vec<(Column, u8)> = columns
            .iter()
            .flat_map(|c| {
                c.cells
                    .iter()
                    .filter(|cell| cell.drawn)
                    .map(|cell| (c.column, cell.ball.number()))
            })
            .collect();
        assert_eq!(marked, vec![(Column::I, 17)]);
    }
}
