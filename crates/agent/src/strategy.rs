//! Card and row choice strategies

use std::str::FromStr;

use crate::core::Table;
use crate::types::{Card, ROW_MAX};
use crate::view::PlayerView;

pub trait Strategy: Send {
    /// Card to play from `view.hand`. None only when the hand is empty.
    fn choose_card(&mut self, view: &PlayerView) -> Option<Card>;

    /// Zero-based row to take when the played card fits no row.
    fn choose_row(&mut self, view: &PlayerView) -> usize {
        view.table.as_ref().map_or(0, Table::min_bulls_row)
    }
}

/// Always plays its smallest card and takes the cheapest row.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowestCard;

impl Strategy for LowestCard {
    fn choose_card(&mut self, view: &PlayerView) -> Option<Card> {
        view.hand.iter().min().copied()
    }
}

/// Plays the card with the lowest estimated risk and takes the cheapest row.
///
/// | Situation | Risk |
/// |-----------|------|
/// | fits no row | 10000 + bulls of the card |
/// | would be the sixth card | 5000 + bulls of the row |
/// | otherwise | gap to the row's last card + 10 x row length |
///
/// On equal risk the smaller card wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastRisk;

impl LeastRisk {
    pub fn risk(table: &Table, card: Card) -> u32 {
        let Some(index) = table.best_fit(card) else {
            return 10_000 + card.bulls() as u32;
        };
        let row = &table.rows()[index];
        if row.len() >= ROW_MAX {
            return 5_000 + row.bulls();
        }
        let last = row.last().map_or(0, Card::value);
        (card.value() - last) as u32 + row.len() as u32 * 10
    }
}

impl Strategy for LeastRisk {
    fn choose_card(&mut self, view: &PlayerView) -> Option<Card> {
        let Some(table) = &view.table else {
            return view.hand.iter().min().copied();
        };
        let mut best: Option<(u32, Card)> = None;
        for &card in &view.hand {
            let risk = Self::risk(table, card);
            if best.map_or(true, |(best_risk, best_card)| {
                risk < best_risk || (risk == best_risk && card < best_card)
            }) {
                best = Some((risk, card));
            }
        }
        best.map(|(_, card)| card)
    }
}

/// Strategy names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    #[default]
    Lowest,
    LeastRisk,
}

impl StrategyKind {
    pub fn build(self) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Lowest => Box::new(LowestCard),
            StrategyKind::LeastRisk => Box::new(LeastRisk),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lowest" => Ok(StrategyKind::Lowest),
            "least-risk" | "least_risk" => Ok(StrategyKind::LeastRisk),
            other => Err(format!("unknown strategy {:?} (expected lowest or least-risk)", other)),
        }
    }
}
