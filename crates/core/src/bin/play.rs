//! Play against the remote bot from a terminal

use chess_bot_core::{ControllerConfig, DropOutcome, MoveController, RemoteOpponent};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let config = ControllerConfig::from_env().unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    let opponent = RemoteOpponent::new(&config).unwrap_or_else(|e| {
        eprintln!("Failed to create client: {}", e);
        std::process::exit(1);
    });

    println!("Chess Bot");
    println!("==================");
    println!("Bot endpoint: {}", opponent.endpoint());
    print_usage();

    let controller = MoveController::standard(opponent, config);
    print_game(&controller);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => continue,
            ["quit"] | ["exit"] => break,
            ["help"] => print_usage(),
            ["reset"] => controller.reset(),
            ["undo"] => {
                if !controller.undo() {
                    println!("Nothing to undo");
                    continue;
                }
            }
            [source, target] => {
                let Some(piece) = controller.with_session(|s| s.piece_at(source)) else {
                    println!("No piece on {}", source);
                    continue;
                };
                if !controller.drag_start(&piece) {
                    println!("You cannot move that piece now");
                    continue;
                }
                if controller.drop_piece(source, target) == DropOutcome::Snapback {
                    println!("Illegal move");
                    continue;
                }
                print_game(&controller);
                controller.settle().await;
            }
            _ => {
                println!("Unknown command: {}", line.trim());
                continue;
            }
        }
        print_game(&controller);
    }
}

fn print_usage() {
    println!();
    println!("Commands:");
    println!("  <from> <to>   Move a piece, e.g. e2 e4");
    println!("  undo          Take back your last move and the bot's reply");
    println!("  reset         Start a new game");
    println!("  quit          Leave");
    println!();
}

fn print_game(controller: &MoveController<RemoteOpponent>) {
    controller.with_session(|s| {
        println!("{}", s.board().render());
        println!();
        if !s.history().is_empty() {
            println!("Moves: {}", s.history().joined());
        }
        println!("{}", s.status());
        println!();
    });
}
