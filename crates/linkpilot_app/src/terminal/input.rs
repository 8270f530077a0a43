//! Line commands typed at the prompt.
use linkpilot_core::Page;

pub const HELP: &str = "\
Commands:
  add <link>     append a link to the input
  clear          empty the input
  submit         send the input links for extraction
  page <name>    show input | progress | results | auto
  start          start opening links automatically
  pause          pause or resume automatic opening
  stop           stop automatic opening
  delay <secs>   seconds between automatic opens
  open <n>       open successful result #n now
  export         save the download links to a file
  new            start a new session
  help           show this help
  quit           exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Clear,
    Submit,
    Page(Page),
    Start,
    Pause,
    Stop,
    Delay(u32),
    /// Zero-based index into the successful results.
    Open(usize),
    Export,
    New,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("unknown command `{0}`, type `help`")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("`{0}` is not a valid number")]
    InvalidNumber(String),
    #[error("unknown page `{0}`")]
    UnknownPage(String),
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "add" | "a" => Command::Add(required(rest, "add")?.to_string()),
        "clear" => Command::Clear,
        "submit" | "go" => Command::Submit,
        "page" => Command::Page(parse_page(required(rest, "page")?)?),
        "start" => Command::Start,
        "pause" | "p" | "resume" => Command::Pause,
        "stop" | "s" => Command::Stop,
        "delay" => Command::Delay(parse_number(required(rest, "delay")?)?),
        "open" | "o" => {
            let number = parse_number(required(rest, "open")?)?;
            match number.checked_sub(1) {
                Some(index) => Command::Open(index as usize),
                None => return Err(InputError::InvalidNumber(rest.to_string())),
            }
        }
        "export" => Command::Export,
        "new" => Command::New,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ if looks_like_link(line) => Command::Add(line.to_string()),
        other => return Err(InputError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn required<'a>(rest: &'a str, command: &'static str) -> Result<&'a str, InputError> {
    if rest.is_empty() {
        Err(InputError::MissingArgument(command))
    } else {
        Ok(rest)
    }
}

fn parse_number(text: &str) -> Result<u32, InputError> {
    text.parse()
        .map_err(|_| InputError::InvalidNumber(text.to_string()))
}

fn parse_page(name: &str) -> Result<Page, InputError> {
    match name.to_ascii_lowercase().as_str() {
        "input" => Ok(Page::Input),
        "progress" => Ok(Page::Progress),
        "results" => Ok(Page::Results),
        "auto" | "auto-open" | "autoopen" => Ok(Page::AutoOpen),
        _ => Err(InputError::UnknownPage(name.to_string())),
    }
}

fn looks_like_link(line: &str) -> bool {
    line.starts_with("http://") || line.starts_with("https://")
}
