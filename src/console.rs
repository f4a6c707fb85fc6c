use regex::Regex;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::Editor;
use tracing::{debug, info};

use crate::error::{ChessError, ChessResult};
use crate::game_state::GameState;
use crate::move_generator::{find_legal_move, legal_moves};
use crate::piece::Color;
use crate::r#move::Move;
use crate::search::{SearchOptions, Searcher};

const HELP: &str = "\
commands:
  <move>      play a move in coordinates, e.g. e2e4 or e7e8n to underpromote
  moves       list the legal moves
  undo        take back the last move of each side
  new         start a new game
  show        print the position
  depth <n>   set the engine's search depth
  go          let the engine play the side to move
  help        print this message
  quit        leave";

/// Terminal host: a human plays against the engine by typing coordinate moves
pub struct Console {
    state: GameState,
    searcher: Searcher,
    engine_color: Option<Color>,
    editor: Editor<()>,
    args_regex: Regex,
    move_regex: Regex,
}

impl Console {
    /// `engine_color` is the side the engine answers for, `None` for two humans
    pub fn new(options: SearchOptions, engine_color: Option<Color>) -> ChessResult<Console> {
        let mut editor = Editor::<()>::new();
        editor.set_auto_add_history(true);
        editor.set_check_cursor_position(true);
        Ok(Console {
            state: GameState::new(),
            searcher: Searcher::new(options),
            engine_color,
            editor,
            args_regex: Regex::new(r"[^\s]+")?,
            move_regex: Regex::new(r"^[a-h][1-8][a-h][1-8][nbrq]?$")?,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn run(&mut self) -> ChessResult<()> {
        println!("gambit v{}, type help for the command list", env!("CARGO_PKG_VERSION"));
        println!("{}", self.state);
        self.engine_reply();
        loop {
            let line = match self.editor.readline("gambit> ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            };
            match self.handle_command(&line) {
                Ok(ConsoleOkCode::ShouldQuit) => break,
                Err(ConsoleErrCode::BadCommand(cmd)) => {
                    eprintln!("Unknown or badly formed command: {} (try help)", cmd)
                }
                Err(ConsoleErrCode::MissingArg(arg)) => {
                    eprintln!("Missing an argument: {} {} <- here", line.trim(), arg)
                }
                Err(ConsoleErrCode::Rejected(e)) => eprintln!("{}", e),
                _ => (),
            }
        }
        Ok(())
    }

    fn handle_command(&mut self, line: &str) -> Result<ConsoleOkCode, ConsoleErrCode> {
        let args: Vec<&str> = self.args_regex.find_iter(line).map(|m| m.as_str()).collect();
        let mut args = args.into_iter();
        let cmd = match args.next() {
            Some(c) => c,
            None => return Err(ConsoleErrCode::NoCommand),
        };
        match cmd {
            "moves" => {
                let mut moves: Vec<String> = legal_moves(&self.state)
                    .iter()
                    .map(Move::to_string)
                    .collect();
                moves.sort();
                println!("{}", moves.join(" "));
            }
            "undo" => {
                self.state = self.state.undo_last_turn();
                println!("{}", self.state);
                self.engine_reply();
            }
            "new" => {
                self.state = GameState::new();
                println!("{}", self.state);
                self.engine_reply();
            }
            "show" => println!("{}", self.state),
            "depth" => {
                let depth = match args.next() {
                    Some(d) => d,
                    None => return Err(ConsoleErrCode::MissingArg(String::from("<depth>"))),
                };
                match depth.parse::<u8>() {
                    Ok(d) if d > 0 => {
                        self.searcher.options_mut().set_depth(d);
                    }
                    _ => return Err(ConsoleErrCode::BadCommand(String::from(line.trim()))),
                }
            }
            "go" => {
                if !self.announce_game_over() {
                    self.engine_move();
                }
            }
            "help" => println!("{}", HELP),
            "quit" => return Ok(ConsoleOkCode::ShouldQuit),
            mv if self.move_regex.is_match(mv) => {
                if self.state.is_game_over() {
                    self.announce_game_over();
                    return Ok(ConsoleOkCode::OkCommand);
                }
                let (origin, target, promotion) = Move::parse_coordinates(mv)?;
                let mv = find_legal_move(&self.state, origin, target, promotion)?;
                self.play(&mv);
                self.engine_reply();
            }
            _ => return Err(ConsoleErrCode::BadCommand(String::from(cmd))),
        }

        Ok(ConsoleOkCode::OkCommand)
    }

    fn play(&mut self, mv: &Move) {
        debug!(%mv, "playing");
        self.state = self.state.apply_move(mv);
        println!("{}", self.state);
        self.announce_game_over();
    }

    /// Lets the engine move if the game is on and it is the engine's turn
    fn engine_reply(&mut self) {
        if self.engine_color == Some(self.state.side_to_move()) && !self.state.is_game_over() {
            self.engine_move();
        }
    }

    fn engine_move(&mut self) {
        let report = self.searcher.search(&self.state);
        println!("info {}", report);
        if let Some(mv) = report.best_move {
            println!("engine plays {}", mv);
            self.play(&mv);
        }
    }

    fn announce_game_over(&self) -> bool {
        if self.state.is_checkmate() {
            let winner = self.state.side_to_move().opposite();
            info!(%winner, "checkmate");
            println!("checkmate, {} wins", winner);
        } else if self.state.is_stalemate() {
            info!("stalemate");
            println!("stalemate, the game is drawn");
        } else {
            return false;
        }
        true
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ConsoleOkCode {
    OkCommand,
    ShouldQuit,
}

#[derive(Debug)]
enum ConsoleErrCode {
    NoCommand,
    BadCommand(String),
    MissingArg(String),
    Rejected(ChessError),
}
impl From<ChessError> for ConsoleErrCode {
    fn from(e: ChessError) -> Self {
        ConsoleErrCode::Rejected(e)
    }
}
