//! What a player knows about the game, rebuilt from server lines.

use take_six_server::ServerMessage;

use crate::core::Table;
use crate::types::Card;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerView {
    /// Last table broadcast. None before the first turn.
    pub table: Option<Table>,
    /// Current hand, ascending.
    pub hand: Vec<Card>,
    /// Last score line, in seat order.
    pub scores: Vec<u32>,
    /// Text of the last `ERREUR` line, cleared by [`answered`](Self::answered).
    pub last_error: Option<String>,
    /// Every `INFO` text received, oldest first.
    pub infos: Vec<String>,
    /// Id announced by `INFO Partie <id> demarree.`
    pub game_id: Option<u64>,
    /// Set by the final standings or an abort notice.
    pub finished: bool,
}

impl PlayerView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one server message into the view.
    pub fn apply(&mut self, msg: &ServerMessage) {
        match msg {
            ServerMessage::Info(text) => {
                if let Some(id) = parse_game_start(text) {
                    self.game_id = Some(id);
                }
                if text.starts_with("Fin de la partie") || text.contains("deconnecte") {
                    self.finished = true;
                }
                self.infos.push(text.clone());
            }
            ServerMessage::Table(table) => self.table = Some(table.clone()),
            ServerMessage::Hand(cards) => self.hand = cards.clone(),
            ServerMessage::Scores(scores) => self.scores = scores.clone(),
            ServerMessage::Error(text) => self.last_error = Some(text.clone()),
            ServerMessage::RequestCard | ServerMessage::RequestRow => {}
        }
    }

    /// Note that a prompt was answered; any earlier error is settled.
    pub fn answered(&mut self) {
        self.last_error = None;
    }

    /// Forget a played card so the view stays right until the next `MAIN` line.
    pub fn remove_card(&mut self, card: Card) {
        self.hand.retain(|&c| c != card);
    }
}

fn parse_game_start(text: &str) -> Option<u64> {
    text.strip_prefix("Partie ")?
        .strip_suffix(" demarree.")?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_lines(view: &mut PlayerView, lines: &[&str]) {
        for line in lines {
            view.apply(&line.parse().unwrap());
        }
    }

    #[test]
    fn test_answer_clears_last_error() {
        let mut view = PlayerView::new();
        apply_lines(&mut view, &["ERREUR Carte invalide", "DEMANDE_CARTE"]);
        assert_eq!(view.last_error.as_deref(), Some("Carte invalide"));
        view.answered();
        assert_eq!(view.last_error, None);
    }

    #[test]
    fn test_view_follows_a_turn() {
        let mut view = PlayerView::new();
        apply_lines(
            &mut view,
            &[
                "INFO Partie 4 demarree.",
                "R1: 10 | R2: 20 | R3: 30 | R4: 40 |",
                "MAIN 5 25 99",
                "DEMANDE_CARTE",
                "ERREUR Carte invalide",
                "J1=0 J2=3",
            ],
        );
        assert_eq!(view.game_id, Some(4));
        assert_eq!(view.table.as_ref().map(|t| t.rows()[2].cards().len()), Some(1));
        assert_eq!(view.hand.len(), 3);
        assert_eq!(view.scores, vec![0, 3]);
        assert_eq!(view.last_error.as_deref(), Some("Carte invalide"));
        assert!(!view.finished);

        view.remove_card(Card::new(25).unwrap());
        assert_eq!(view.hand.len(), 2);
    }

    #[test]
    fn test_view_sees_the_end() {
        let mut view = PlayerView::new();
        apply_lines(&mut view, &["INFO Fin de la partie 1. Classement: 1. a (0) 2. b (5)"]);
        assert!(view.finished);

        let mut view = PlayerView::new();
        apply_lines(&mut view, &["INFO Joueur 2 (bob) deconnecte. Fin de la partie 1."]);
        assert!(view.finished);
    }
}
