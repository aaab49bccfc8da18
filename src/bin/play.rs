use std::io::{self, BufRead, Write};

use chess_rules::game::{Game, GameStatus};
use chess_rules::moves::{CastleSide, Move, MoveOutcome};
use chess_rules::piece::PieceType;
use chess_rules::position::Position;
use chess_rules::snapshot::GameView;
use chess_rules::BUILD_TIMESTAMP;

const HELP: &str = "\
commands:
  e2e4 | e2 e4     move a piece (a king moving two files castles)
  O-O | O-O-O      castle
  q | r | b | n    choose the piece for a waiting promotion
  moves e2         list legal destinations for the piece on e2
  json             print the game state as JSON
  new              start a new game
  quit";

fn print_state(game: &Game) {
    println!("{}", game.board());
    match game.status() {
        GameStatus::Checkmate { winner } => println!("checkmate, {winner:?} wins"),
        GameStatus::Check(color) => println!("{color:?} is in check"),
        GameStatus::Ongoing => {}
    }
    if game.waiting_for_promotion_selection() {
        println!("promote to q, r, b or n");
    } else {
        println!("{:?} to move", game.side_to_move());
    }
}

fn report(outcome: MoveOutcome, game: &Game) {
    match outcome {
        MoveOutcome::Applied => {
            println!("{}", game.last_move_notation().unwrap_or(""));
            print_state(game);
        }
        MoveOutcome::PendingPromotion => print_state(game),
        MoveOutcome::Rejected(reason) => eprintln!("rejected: {reason:?}"),
    }
}

fn handle(game: &mut Game, line: &str) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] => {}
        ["quit"] | ["exit"] => return false,
        ["help"] => println!("{HELP}"),
        ["new"] => {
            *game = Game::new();
            print_state(game);
        }
        ["json"] => match GameView::of(game).to_json() {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("could not serialise state: {err}"),
        },
        ["O-O"] | ["0-0"] => {
            let outcome = game.castle(game.side_to_move(), CastleSide::KingSide);
            report(outcome, game);
        }
        ["O-O-O"] | ["0-0-0"] => {
            let outcome = game.castle(game.side_to_move(), CastleSide::QueenSide);
            report(outcome, game);
        }
        ["moves", square] => match Position::from_algebraic(square) {
            Ok(from) => {
                let targets: Vec<String> = game
                    .legal_targets(from)
                    .iter()
                    .map(Position::to_algebraic)
                    .collect();
                println!("{}", targets.join(" "));
            }
            Err(err) => eprintln!("{err}"),
        },
        [piece] if piece.len() == 1 && game.waiting_for_promotion_selection() => {
            let choice = PieceType::from_name(piece);
            match choice.map(|pt| game.promote(pt)) {
                Some(Ok(())) => report(MoveOutcome::Applied, game),
                Some(Err(err)) => eprintln!("{err}"),
                None => eprintln!("unknown piece {piece:?}"),
            }
        }
        _ => match Move::from_coordinate(&words.concat()) {
            Some(mv) => {
                let outcome = game.move_piece(mv.from, mv.to);
                report(outcome, game);
            }
            None => eprintln!("unrecognised input {line:?}, try `help`"),
        },
    }
    true
}

fn main() {
    println!("chess rules engine (built {BUILD_TIMESTAMP}), type `help`");
    let mut game = Game::new();
    print_state(&game);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        if !handle(&mut game, line.trim()) {
            break;
        }
        io::stdout().flush().ok();
    }
}
