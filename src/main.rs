mod display;

use std::collections::HashMap;
use std::io::{stdout, BufWriter, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};

use pocket_shooter::config::{GameConfig, Level, Playfield};
use pocket_shooter::driver::FrameDriver;
use pocket_shooter::motion::HomingStyle;
use pocket_shooter::platform::{Button, InputSource, TickSource};

use display::TerminalSurface;

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LevelArg {
    Easy,
    Medium,
    Hard,
}

impl From<LevelArg> for Level {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Easy => Level::Easy,
            LevelArg::Medium => Level::Medium,
            LevelArg::Hard => Level::Hard,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HomingArg {
    Clamped,
    Normalized,
}

impl From<HomingArg> for HomingStyle {
    fn from(arg: HomingArg) -> Self {
        match arg {
            HomingArg::Clamped => HomingStyle::Clamped,
            HomingArg::Normalized => HomingStyle::Normalized,
        }
    }
}

/// Vertical shooter on a fixed-size pixel playfield, drawn in the terminal.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Difficulty; the menu asks when omitted
    #[arg(long, value_enum)]
    level: Option<LevelArg>,

    /// RNG seed for spawns and aiming
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Target frame rate
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Playfield width in pixels (one terminal column each)
    #[arg(long)]
    width: Option<i32>,

    /// Playfield height in pixels (two per terminal row)
    #[arg(long)]
    height: Option<i32>,

    /// Restart the round when an enemy bullet hits the player
    #[arg(long)]
    restart_on_death: bool,

    /// Homing bullet steering
    #[arg(long, value_enum, default_value_t = HomingArg::Normalized)]
    homing: HomingArg,
}

impl Args {
    fn game_config(&self, level: Level) -> GameConfig {
        let defaults = Playfield::default();
        let mut config = level.config();
        config.seed = self.seed;
        config.target_fps = self.fps;
        config.playfield = Playfield {
            width: self.width.unwrap_or(defaults.width),
            height: self.height.unwrap_or(defaults.height),
        };
        config.homing = self.homing.into();
        config.restart_on_death = self.restart_on_death;
        config
    }
}

// ── Keyboard ──────────────────────────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this long.  Covers terminals that don't emit key-release events: the OS
/// key-repeat rate is ≥ 15 Hz, so the window is refreshed before expiry.
const HOLD_WINDOW: Duration = Duration::from_millis(133);

fn keys_for(button: Button) -> &'static [KeyCode] {
    match button {
        Button::Left => &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')],
        Button::Right => &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')],
        Button::Up => &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')],
        Button::Down => &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')],
        Button::Fire => &[KeyCode::Char(' '), KeyCode::Char('j'), KeyCode::Char('J')],
        Button::Spread => &[KeyCode::Char('k'), KeyCode::Char('K')],
        Button::Track => &[KeyCode::Char('l'), KeyCode::Char('L')],
    }
}

/// Buttons from terminal key events.
///
/// Instead of acting on each key event individually, we record the frame of
/// the last press/repeat event for every key and report a button as pressed
/// while one of its keys is still fresh.  On keyboard-enhancement capable
/// terminals keys are dropped on release; elsewhere they expire after
/// `HOLD_WINDOW` of silence.
struct KeyboardInput {
    rx: mpsc::Receiver<Event>,
    key_frame: HashMap<KeyCode, u64>,
    frame: u64,
    hold_frames: u64,
    quit: bool,
}

impl KeyboardInput {
    fn new(rx: mpsc::Receiver<Event>, target_fps: u32) -> Self {
        let hold_frames = (HOLD_WINDOW.as_millis() as u64 * target_fps as u64 / 1000).max(2);
        Self {
            rx,
            key_frame: HashMap::new(),
            frame: 0,
            hold_frames,
            quit: false,
        }
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }

    fn is_held(&self, key: &KeyCode) -> bool {
        self.key_frame
            .get(key)
            .is_some_and(|&last| self.frame.saturating_sub(last) <= self.hold_frames)
    }
}

impl InputSource for KeyboardInput {
    fn poll(&mut self) {
        self.frame += 1;
        loop {
            match self.rx.try_recv() {
                Ok(Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                })) => match kind {
                    KeyEventKind::Press => {
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                                self.quit = true;
                            }
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                self.quit = true;
                            }
                            _ => {}
                        }
                        self.key_frame.insert(code, self.frame);
                    }
                    KeyEventKind::Repeat => {
                        self.key_frame.insert(code, self.frame);
                    }
                    KeyEventKind::Release => {
                        self.key_frame.remove(&code);
                    }
                },
                Ok(_) => {}
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    log::warn!("input thread gone, quitting");
                    self.quit = true;
                    break;
                }
            }
        }
    }

    fn button_pressed(&mut self, button: Button) -> bool {
        keys_for(button).iter().any(|k| self.is_held(k))
    }
}

// ── Clock ─────────────────────────────────────────────────────────────────────

/// Microsecond ticks since start-up.
struct InstantClock {
    origin: Instant,
}

impl InstantClock {
    fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TickSource for InstantClock {
    fn now(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }

    fn ticks_per_second(&self) -> u64 {
        1_000_000
    }

    fn wait_until(&mut self, deadline: u64) {
        let now = self.now();
        if deadline > now {
            thread::sleep(Duration::from_micros(deadline - now));
        }
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(Level),
    Quit,
}

fn show_menu<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  POCKET  SHOOTER  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    out.queue(cursor::MoveTo(cx.saturating_sub(10), cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select difficulty:"))?;

    let options: &[(&str, &str, Color, &str)] = &[
        ("1", "Easy  ", Color::Green, "4-way blooms, sparse waves"),
        ("2", "Medium", Color::Yellow, "8-way blooms"),
        ("3", "Hard  ", Color::Red, "16-way blooms, every enemy fires"),
    ];

    for (i, (key, label, color, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(1) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(10), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<8}", label)))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" - {}", desc)))?;
    }

    let hints = [
        "Arrows / WASD : Move",
        "SPACE / J : Burst   K : Spread   L : Homing",
        "Q : Quit",
    ];
    for (i, hint) in hints.iter().enumerate() {
        out.queue(cursor::MoveTo(cx.saturating_sub(10), cy + 4 + i as u16))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(*hint))?;
    }

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        match rx.recv() {
            Ok(Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            })) => match code {
                KeyCode::Char('1') => return Ok(MenuResult::Start(Level::Easy)),
                KeyCode::Char('2') => return Ok(MenuResult::Start(Level::Medium)),
                KeyCode::Char('3') => return Ok(MenuResult::Start(Level::Hard)),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            },
            Ok(_) => {}
            Err(_) => return Ok(MenuResult::Quit),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; redirect it (2>game.log) to keep the screen clean.
    env_logger::init();
    let args = Args::parse();

    let mut out = stdout();
    terminal::enable_raw_mode().context("enabling raw mode")?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the frame loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&args, rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(style::ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run(args: &Args, rx: mpsc::Receiver<Event>) -> anyhow::Result<()> {
    let mut out = BufWriter::new(stdout());

    let level = match args.level {
        Some(level) => level.into(),
        None => match show_menu(&mut out, &rx)? {
            MenuResult::Start(level) => level,
            MenuResult::Quit => return Ok(()),
        },
    };

    let config = args.game_config(level);
    let (screen_w, screen_h) = config.screen_size();
    let (cols, rows) = terminal::size()?;
    let rows_needed = (screen_h + 1) / 2;
    if (cols as i32) < screen_w || (rows as i32) < rows_needed {
        bail!(
            "terminal is {}x{} cells, the {:?} playfield needs at least {}x{}",
            cols,
            rows,
            level,
            screen_w,
            rows_needed
        );
    }

    out.queue(terminal::Clear(terminal::ClearType::All))?;
    out.flush()?;

    let surface = TerminalSurface::new(out, screen_w, screen_h);
    let input = KeyboardInput::new(rx, config.target_fps);
    let mut driver = FrameDriver::new(config, surface, input, InstantClock::new())
        .context("invalid game configuration")?;

    let frames = driver.run(|input| !input.quit_requested())?;
    log::info!(
        "quit after {} frames, {} kills, {} deaths, {} over budget",
        frames,
        driver.world().kills,
        driver.world().deaths,
        driver.overruns()
    );
    Ok(())
}
