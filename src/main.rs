//! Birth Bounce entry point
//!
//! Loads the dataset on a background thread, waits for it once, then runs
//! the fixed 60 Hz frame loop. Input comes from a scripted key sequence so
//! the loop can run headless; each frame can be dumped as a JSON line for
//! an external renderer.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;

use birth_bounce::consts::MAX_SUBSTEPS;
use birth_bounce::error::Direction;
use birth_bounce::sim::{SimulationState, TickInput, tick};
use birth_bounce::view::FrameView;
use birth_bounce::{Dataset, Error, Result, Settings};

#[derive(Parser, Debug)]
#[command(version, about = "Yearly births as bouncing balls in a circular arena")]
struct Args {
    /// CSV with `year,total,male,female` rows after a header
    #[arg(default_value = "us_birth_population_1924_2023.csv")]
    dataset: PathBuf,

    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the spawn RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Key script, e.g. "R R L J1950 Q" (R/L step the year, J<year> jumps, Q quits)
    #[arg(long, value_parser = parse_script)]
    script: Option<Script>,

    /// Frames between scripted keys
    #[arg(long, default_value_t = 60)]
    step_every: u64,

    /// Print every frame as one JSON line on stdout
    #[arg(long)]
    dump_frames: bool,

    /// Hold the loop to the target rate instead of running flat out
    #[arg(long)]
    realtime: bool,
}

/// Scripted key presses, one per `step_every` frames
#[derive(Debug, Clone)]
struct Script(Vec<TickInput>);

fn parse_script(text: &str) -> std::result::Result<Script, String> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| match token.to_ascii_uppercase().as_str() {
            "R" | "RIGHT" | "NEXT" => Ok(TickInput::step(Direction::Forward)),
            "L" | "LEFT" | "PREV" => Ok(TickInput::step(Direction::Backward)),
            "Q" | "QUIT" => Ok(TickInput::exit()),
            other => other
                .strip_prefix('J')
                .unwrap_or(other)
                .parse::<i32>()
                .map(TickInput::jump)
                .map_err(|_| format!("unknown key {:?}", token)),
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(Script)
}

/// Input for a given frame: scripted keys fire every `step_every` frames
fn scripted_input(script: Option<&Script>, step_every: u64, frame: u64) -> Option<TickInput> {
    let script = script?;
    let step_every = step_every.max(1);
    if frame == 0 || !frame.is_multiple_of(step_every) {
        return None;
    }
    let idx = (frame / step_every - 1) as usize;
    match script.0.get(idx) {
        Some(input) => Some(input.clone()),
        // Script exhausted: quit one interval later
        None if idx == script.0.len() => Some(TickInput::exit()),
        None => None,
    }
}

/// Write one frame as a JSON line; `Ok(false)` once the output is closed
fn write_frame(out: &mut impl Write, view: &FrameView) -> Result<bool> {
    let line = serde_json::to_string(view).map_err(|source| Error::FrameEncode {
        frame: view.frame,
        source,
    })?;
    Ok(writeln!(out, "{}", line).is_ok())
}

/// Fixed-step accumulator (wall clock to simulation steps)
struct FrameClock {
    step: Duration,
    accumulator: Duration,
    last: Instant,
}

impl FrameClock {
    fn new(step: Duration) -> Self {
        Self {
            step,
            accumulator: Duration::ZERO,
            last: Instant::now(),
        }
    }

    /// Steps due since the last call, capped to avoid a spiral of death
    fn due_steps(&mut self) -> u32 {
        let now = Instant::now();
        self.accumulator += now - self.last;
        self.last = now;

        let mut steps = 0;
        while self.accumulator >= self.step && steps < MAX_SUBSTEPS {
            self.accumulator -= self.step;
            steps += 1;
        }
        if steps == MAX_SUBSTEPS {
            self.accumulator = Duration::ZERO;
        }
        steps
    }

    fn sleep_until_next(&self) {
        if let Some(remaining) = self.step.checked_sub(self.accumulator) {
            std::thread::sleep(remaining);
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    settings.validate()?;

    let pending = Dataset::spawn_load(&args.dataset)?;
    let mut dataset = pending.wait()?;

    let mut state = SimulationState::new(&settings, dataset.snapshot(&settings.normalization));
    let mut clock = FrameClock::new(Duration::from_secs_f64(settings.step_seconds()));
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    log::info!("Birth Bounce running at {} steps/s", settings.target_fps);

    'frames: loop {
        let steps = if args.realtime { clock.due_steps() } else { 1 };

        for _ in 0..steps {
            if args.frames.is_some_and(|limit| state.frame >= limit) {
                break 'frames;
            }

            let input = scripted_input(args.script.as_ref(), args.step_every, state.frame)
                .unwrap_or_default();
            let report = tick(&mut state, &mut dataset, &input);
            if report.exited {
                log::info!("Exit requested at frame {}", state.frame);
                break 'frames;
            }

            if args.dump_frames && !write_frame(&mut out, &FrameView::capture(&state))? {
                log::warn!("stdout closed, stopping frame dump");
                break 'frames;
            }
        }

        if args.realtime {
            clock.sleep_until_next();
        }
    }

    log::info!(
        "Stopped at year {} after {} frames with {} balls",
        state.snapshot.year,
        state.frame,
        state.balls.len()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Birth Bounce starting...");

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
