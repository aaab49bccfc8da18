use chess_rules::game::Game;
use chess_rules::moves::MoveOutcome;
use chess_rules::piece::PieceType;
use chess_rules::BUILD_TIMESTAMP;
use rand::seq::SliceRandom;

const MAX_PLIES: u32 = 300;
const GAMES: usize = 20;

/// Play one game of uniformly random legal moves, returning the ply count and
/// the finished game.
fn play_game(rng: &mut impl rand::Rng) -> (u32, Game) {
    let mut game = Game::new();
    let mut plies = 0;
    while plies < MAX_PLIES && game.winner().is_none() {
        let moves = game.legal_moves();
        let Some(mv) = moves.choose(rng) else {
            // Stalemate; draws are not scored
            break;
        };
        match game.move_piece(mv.from, mv.to) {
            MoveOutcome::Applied => {}
            MoveOutcome::PendingPromotion => {
                let choices = [
                    PieceType::Queen,
                    PieceType::Rook,
                    PieceType::Bishop,
                    PieceType::Knight,
                ];
                let choice = choices
                    .choose(rng)
                    .copied()
                    .unwrap_or(PieceType::Queen);
                if let Err(err) = game.promote(choice) {
                    eprintln!("promotion failed: {err}");
                    break;
                }
            }
            MoveOutcome::Rejected(reason) => {
                eprintln!("legal move {} was rejected: {reason:?}", mv.to_coordinate());
                break;
            }
        }
        plies += 1;
    }
    (plies, game)
}

fn main() {
    eprintln!("selfplay (built {BUILD_TIMESTAMP})");
    let mut rng = rand::thread_rng();
    let mut mates = 0;
    for i in 0..GAMES {
        let (plies, game) = play_game(&mut rng);
        let result = match game.winner() {
            Some(winner) => {
                mates += 1;
                format!("{winner:?} mates")
            }
            None => "no result".to_string(),
        };
        println!(
            "game {:>2}: {plies:>3} plies, last move {}, {result}",
            i + 1,
            game.last_move_notation().unwrap_or("-"),
        );
    }
    eprintln!("{mates} of {GAMES} games ended in checkmate");
}
