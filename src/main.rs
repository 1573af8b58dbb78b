use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use std::fs::File;
use std::io::{self, Stdout, Write};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info};
use unicode_width::UnicodeWidthStr;

use maze_chase::components::{Dir, PelletKind, Pos, Tile};
use maze_chase::ghost::GhostState;
use maze_chase::level::create_level;
use maze_chase::{Config, Game, GameListener, GameResult, Intent, Status};

const CELL_W: usize = 2;
const INPUT_HOLD_MS: u64 = 160;

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player,
    Ghost,
    Frightened,
    Eyes,
    Wall,
    Empty,
    Pellet,
    Power,
    Gate,
}

#[derive(Clone, Copy, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

impl Cell {
    fn new(glyph: Glyph, color: Color) -> Self {
        Self { glyph, color }
    }
}

struct Renderer {
    last: Vec<Cell>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    fn new(width: usize, height: usize) -> Self {
        Self {
            last: vec![Cell::new(Glyph::Empty, Color::Reset); width * height],
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }
}

/// Mirrors the counters the core reports, for the status line.
#[derive(Default)]
struct Hud {
    score: u32,
    lives: u32,
    level: u32,
    final_score: Option<u32>,
    cleared: bool,
}

impl GameListener for Hud {
    fn on_score_update(&mut self, score: u32, lives: u32, level: u32) {
        self.score = score;
        self.lives = lives;
        self.level = level;
    }

    fn on_game_over(&mut self, final_score: u32) {
        self.final_score = Some(final_score);
    }

    fn on_level_complete(&mut self, _level: u32) {
        self.cleared = true;
    }
}

fn main() -> GameResult<()> {
    let config = Config::from_env();
    init_logging(&config)?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &config);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    if let Err(err) = &result {
        error!(%err, "game aborted");
    }
    result
}

/// Logs go to a file only; the terminal belongs to the renderer.
fn init_logging(config: &Config) -> GameResult<()> {
    let Some(path) = &config.log_path else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

fn run(stdout: &mut Stdout, config: &Config) -> GameResult<()> {
    let mut game = Game::new(create_level()?, config)?;
    let mut hud = Hud {
        lives: game.lives(),
        level: game.level(),
        ..Hud::default()
    };
    let mut renderer = Renderer::new(game.maze().width(), game.maze().height());
    let mut last_tick = Instant::now();
    let mut last_seen: [Option<Instant>; 4] = [None, None, None, None];
    let mut last_pressed: Option<Dir> = None;
    let mut paused = false;
    let tick_time = Duration::from_millis(config.tick_ms);
    let frame_time = Duration::from_micros(1_000_000 / config.render_fps.max(1));
    info!(?config, "starting");

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                    continue;
                }
                let dir = match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Char('p') if key.kind == KeyEventKind::Press => {
                        paused = !paused;
                        renderer.needs_full = true;
                        None
                    }
                    KeyCode::Char('k') | KeyCode::Up => Some(Dir::Up),
                    KeyCode::Char('j') | KeyCode::Down => Some(Dir::Down),
                    KeyCode::Char('h') | KeyCode::Left => Some(Dir::Left),
                    KeyCode::Char('l') | KeyCode::Right => Some(Dir::Right),
                    _ => None,
                };
                if let Some(dir) = dir {
                    last_seen[idx_for_dir(dir)] = Some(Instant::now());
                    last_pressed = Some(dir);
                }
            }
        }

        if last_tick.elapsed() >= tick_time {
            last_tick = Instant::now();
            let intent = Intent {
                direction: active_dir_recent(&last_seen, last_pressed),
                paused,
            };
            game.tick(intent, &mut hud);
            if hud.cleared {
                hud.cleared = false;
                game.next_level(&mut hud);
                renderer.needs_full = true;
            }
        }
        render(stdout, &game, &hud, paused, &mut renderer)?;
        if let Some(final_score) = hud.final_score {
            render_game_over(stdout, &game, final_score)?;
            return Ok(());
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn render(
    stdout: &mut Stdout,
    game: &Game,
    hud: &Hud,
    paused: bool,
    renderer: &mut Renderer,
) -> io::Result<()> {
    let maze = game.maze();
    let needed_h = (maze.height() + 2) as u16;
    let needed_w = (maze.width() * CELL_W) as u16;

    stdout.queue(MoveTo(0, 0))?;

    let (term_w, term_h) = terminal::size()?;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(Clear(ClearType::All))?;
        let msg = format!(
            "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
            needed_w, needed_h, term_w, term_h
        );
        stdout.queue(Print(msg))?;
        stdout.flush()?;
        renderer.needs_full = true;
        return Ok(());
    }

    let origin_x = (term_w - needed_w) / 2;
    let origin_y = (term_h - needed_h) / 2 + 1;
    if origin_x != renderer.origin_x || origin_y != renderer.origin_y {
        renderer.origin_x = origin_x;
        renderer.origin_y = origin_y;
        renderer.needs_full = true;
    }

    let state = match (paused, game.status()) {
        (true, _) => "PAUSED",
        (false, Status::Dying) => "OUCH",
        (false, Status::LevelComplete | Status::Cleared) => "CLEAR!",
        _ => "",
    };
    let hud_line = format!(
        "Score: {}  Lives: {}  Level: {}  Pellets: {}  {}  (p pause, q quit)",
        hud.score,
        hud.lives,
        hud.level,
        game.remaining_pellets(),
        state
    );
    if renderer.needs_full || hud_line != renderer.last_hud {
        stdout.queue(MoveTo(renderer.origin_x, renderer.origin_y - 1))?;
        stdout.queue(SetForegroundColor(Color::White))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(Print(&hud_line))?;
        stdout.queue(ResetColor)?;
        renderer.last_hud = hud_line;
    }

    let mut frame: Vec<Cell> = Vec::with_capacity(maze.width() * maze.height());
    for y in 0..maze.height() {
        for x in 0..maze.width() {
            frame.push(cell_for(game, Pos::new(x as i32, y as i32)));
        }
    }
    for ghost in game.ghost_views() {
        let cell = match ghost.state {
            GhostState::Frightened => Cell::new(Glyph::Frightened, Color::Blue),
            GhostState::Returning => Cell::new(Glyph::Eyes, Color::White),
            _ => Cell::new(Glyph::Ghost, ghost_color(ghost.personality)),
        };
        if let Some(slot) = frame_index(game, ghost.tile) {
            frame[slot] = cell;
        }
    }
    let player = game.player_view();
    if player.alive || player.dying {
        if let Some(slot) = frame_index(game, player.tile) {
            frame[slot] = Cell::new(Glyph::Player, Color::Yellow);
        }
    }

    for (idx, cell) in frame.into_iter().enumerate() {
        if renderer.needs_full || cell != renderer.last[idx] {
            renderer.last[idx] = cell;
            draw_cell(stdout, renderer, idx % maze.width(), idx / maze.width(), cell)?;
        }
    }
    renderer.needs_full = false;

    stdout.flush()?;
    Ok(())
}

fn frame_index(game: &Game, pos: Pos) -> Option<usize> {
    let maze = game.maze();
    maze.in_bounds(pos)
        .then(|| pos.y as usize * maze.width() + pos.x as usize)
}

fn ghost_color(personality: Option<maze_chase::personality::Personality>) -> Color {
    use maze_chase::personality::Personality;

    match personality {
        Some(Personality::Chaser) => Color::Red,
        Some(Personality::Ambusher) => Color::Magenta,
        Some(Personality::Mirror) => Color::Cyan,
        Some(Personality::Shy) => Color::DarkYellow,
        None => Color::Grey,
    }
}

fn cell_for(game: &Game, pos: Pos) -> Cell {
    match game.pellet_at(pos) {
        Some(PelletKind::Normal) => return Cell::new(Glyph::Pellet, Color::White),
        Some(PelletKind::Power) => return Cell::new(Glyph::Power, Color::Magenta),
        None => {}
    }
    match game.maze().tile(pos) {
        Tile::Wall => Cell::new(Glyph::Wall, Color::Blue),
        Tile::Gate => Cell::new(Glyph::Gate, Color::Cyan),
        Tile::Empty | Tile::Pellet | Tile::Power => Cell::new(Glyph::Empty, Color::Reset),
    }
}

fn draw_cell(stdout: &mut Stdout, renderer: &Renderer, x: usize, y: usize, cell: Cell) -> io::Result<()> {
    let text = match cell.glyph {
        Glyph::Player => "😃",
        Glyph::Ghost => "👻",
        Glyph::Frightened => "😱",
        Glyph::Eyes => "👀",
        Glyph::Wall => "██",
        Glyph::Empty => "  ",
        Glyph::Pellet => "· ",
        Glyph::Power => "● ",
        Glyph::Gate => "==",
    };
    let x_pos = renderer.origin_x + (x * CELL_W) as u16;
    let y_pos = renderer.origin_y + y as u16;
    stdout.queue(MoveTo(x_pos, y_pos))?;
    stdout.queue(SetForegroundColor(cell.color))?;
    stdout.queue(Print(text))?;
    let w = UnicodeWidthStr::width(text);
    if w < CELL_W {
        for _ in 0..(CELL_W - w) {
            stdout.queue(Print(' '))?;
        }
    }
    stdout.queue(ResetColor)?;
    Ok(())
}

fn render_game_over(stdout: &mut Stdout, game: &Game, final_score: u32) -> io::Result<()> {
    let maze = game.maze();
    let (term_w, term_h) = terminal::size()?;
    let needed_h = (maze.height() + 2) as u16;
    let needed_w = (maze.width() * CELL_W) as u16;
    if term_w < needed_w || term_h < needed_h {
        stdout.queue(MoveTo(0, needed_h))?;
    } else {
        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        stdout.queue(MoveTo(origin_x, origin_y + maze.height() as u16))?;
    }
    stdout.queue(Print(format!(
        "GAME OVER - Final Score: {} (press q to quit)",
        final_score
    )))?;
    stdout.flush()?;
    loop {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && key.code == KeyCode::Char('q') {
                    return Ok(());
                }
            }
        }
    }
}

/// The last pressed direction while it is still held, otherwise whichever
/// key was seen most recently inside the hold window.
fn active_dir_recent(last_seen: &[Option<Instant>; 4], last_pressed: Option<Dir>) -> Option<Dir> {
    let now = Instant::now();
    let hold = Duration::from_millis(INPUT_HOLD_MS);
    if let Some(dir) = last_pressed {
        if let Some(t) = last_seen[idx_for_dir(dir)] {
            if now.duration_since(t) <= hold {
                return Some(dir);
            }
        }
    }
    [Dir::Up, Dir::Down, Dir::Left, Dir::Right]
        .into_iter()
        .filter_map(|dir| last_seen[idx_for_dir(dir)].map(|t| (dir, t)))
        .filter(|(_, t)| now.duration_since(*t) <= hold)
        .max_by_key(|(_, t)| *t)
        .map(|(dir, _)| dir)
}

fn idx_for_dir(dir: Dir) -> usize {
    match dir {
        Dir::Up => 0,
        Dir::Down => 1,
        Dir::Left => 2,
        Dir::Right => 3,
    }
}
