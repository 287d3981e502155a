/// A command typed at the playback prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Open(String),
    Play,
    Pause,
    Stop,
    ShowText,
    Status,
    Help,
    Quit,
    Unknown(String),
    None,
}

impl From<&str> for Action {
    fn from(line: &str) -> Self {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "" => Action::None,
            "o" | "open" if !rest.is_empty() => Action::Open(rest.to_string()),
            "p" | "pause" => Action::Pause,
            "r" | "resume" | "play" => Action::Play,
            "s" | "stop" => Action::Stop,
            "t" | "text" => Action::ShowText,
            "?" | "status" => Action::Status,
            "h" | "help" => Action::Help,
            "q" | "quit" | "exit" => Action::Quit,
            _ if rest.is_empty() && command.contains("://") => Action::Open(command.to_string()),
            _ => Action::Unknown(line.to_string()),
        }
    }
}

pub const HELP: &str = "\
Commands:
  o <url>   open and read a Reddit post
  p         pause
  r         resume or play again
  s         stop
  t         show the narration text
  ?         show playback state
  q         quit";
