use std::collections::VecDeque;
use std::fs;
use std::io::{self, BufRead, IsTerminal};
use std::mem;
use std::sync::mpsc;
use std::thread;

use chrono::Utc;
use linkpilot_core::{update, AppState, AppViewModel, Msg};
use linkpilot_engine::{ArtifactWriter, EngineHandle};
use pilot_logging::{pilot_debug, pilot_info};

use super::autopilot::Autopilot;
use super::cli::Args;
use super::config::AppConfig;
use super::effects::{spawn_event_pump, EffectRunner};
use super::input::{parse_command, Command, HELP};
use super::render::render;
use super::AppError;

/// Everything the main loop reacts to.
pub enum LoopEvent {
    Msg(Msg),
    Line(String),
    InputClosed,
}

pub fn run_app(args: Args) -> Result<(), AppError> {
    let mut config = AppConfig::load(args.config.as_deref())?;
    config.apply_args(&args);
    pilot_logging::initialize(
        config.log_destination.into(),
        config.log_level.into(),
        &config.log_file,
    );
    pilot_info!(
        "linkpilot starting server={} delay={}s",
        config.server_url,
        config.delay_seconds
    );

    let links = collect_links(&args)?;
    let opener = config.opener()?;
    let (engine, engine_events) = EngineHandle::new(config.engine_settings())?;
    let runner = EffectRunner::new(
        engine,
        Box::new(opener),
        ArtifactWriter::new(config.output_dir.clone()),
    );

    let (loop_tx, loop_rx) = mpsc::channel();
    spawn_event_pump(engine_events, loop_tx.clone());
    spawn_stdin_reader(loop_tx);

    let mut app = App {
        state: AppState::with_settings(config.delay_seconds, config.export_prefix.clone()),
        runner,
        autopilot: Autopilot::new(args.auto_open, args.export, args.exit_when_done),
        screen: Screen::new(),
    };
    app.screen.draw(&app.state.view());
    if !links.is_empty() {
        app.dispatch(Msg::InputChanged(links.join("\n")));
        app.dispatch(Msg::LinksSubmitted);
    }

    while let Ok(event) = loop_rx.recv() {
        match event {
            LoopEvent::Msg(msg) => app.dispatch(msg),
            LoopEvent::Line(line) => match parse_command(&line) {
                Ok(Some(Command::Quit)) => break,
                Ok(Some(Command::Help)) => app.screen.note(HELP),
                Ok(Some(command)) => {
                    let msg = app.command_msg(command);
                    app.dispatch(msg);
                }
                Ok(None) => {}
                Err(err) => app.screen.note(&err.to_string()),
            },
            LoopEvent::InputClosed => {
                if !args.exit_when_done {
                    break;
                }
            }
        }
        if app.autopilot.is_done(&app.state.view()) {
            break;
        }
    }

    pilot_info!("linkpilot exiting");
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
    autopilot: Autopilot,
    screen: Screen,
}

impl App {
    /// Applies `msg` and everything it triggers: synchronous effect results
    /// and autopilot follow-ups are queued behind it.
    fn dispatch(&mut self, msg: Msg) {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            let state = mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            queue.extend(self.runner.run(effects));

            if self.state.consume_dirty() {
                let view = self.state.view();
                queue.extend(self.autopilot.follow_up(&view, Utc::now().timestamp_millis()));
                self.screen.draw(&view);
            }
        }
    }

    fn command_msg(&self, command: Command) -> Msg {
        match command {
            Command::Add(link) => {
                let mut input = self.state.view().input;
                if !input.is_empty() && !input.ends_with('\n') {
                    input.push('\n');
                }
                input.push_str(&link);
                Msg::InputChanged(input)
            }
            Command::Clear => Msg::InputChanged(String::new()),
            Command::Submit => Msg::LinksSubmitted,
            Command::Page(page) => Msg::Navigate(page),
            Command::Start => Msg::AutoOpenStartClicked,
            Command::Pause => Msg::PauseClicked,
            Command::Stop => Msg::StopClicked,
            Command::Delay(seconds) => Msg::DelayChanged(seconds),
            Command::Open(index) => Msg::OpenSingleClicked { index },
            Command::Export => Msg::ExportClicked {
                epoch_millis: Utc::now().timestamp_millis(),
            },
            Command::New => Msg::NewSessionClicked,
            Command::Help | Command::Quit => Msg::NoOp,
        }
    }
}

/// Prints frames, skipping ones identical to the last.
struct Screen {
    interactive: bool,
    last: Vec<String>,
}

impl Screen {
    fn new() -> Self {
        Self {
            interactive: io::stdout().is_terminal(),
            last: Vec::new(),
        }
    }

    fn draw(&mut self, view: &AppViewModel) {
        let lines = render(view);
        if lines == self.last {
            return;
        }
        if self.interactive {
            print!("\x1b[2J\x1b[H");
        }
        for line in &lines {
            println!("{line}");
        }
        self.last = lines;
    }

    fn note(&mut self, text: &str) {
        println!("{text}");
        // Force the next frame to print even if unchanged.
        self.last.clear();
    }
}

fn spawn_stdin_reader(loop_tx: mpsc::Sender<LoopEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if loop_tx.send(LoopEvent::Line(line)).is_err() {
                return;
            }
        }
        pilot_debug!("stdin closed");
        let _ = loop_tx.send(LoopEvent::InputClosed);
    });
}

/// Links from the command line followed by the `--file` lines, trimmed,
/// blanks dropped.
fn collect_links(args: &Args) -> Result<Vec<String>, AppError> {
    let mut links: Vec<String> = args
        .links
        .iter()
        .map(|link| link.trim().to_string())
        .filter(|link| !link.is_empty())
        .collect();
    if let Some(path) = &args.file {
        let text = fs::read_to_string(path).map_err(|source| AppError::LinkFile {
            path: path.clone(),
            source,
        })?;
        links.extend(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(ToOwned::to_owned),
        );
    }
    Ok(links)
}
