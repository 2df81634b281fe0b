//! sonify - installation host for the sonification engine
//!
//! Reads classifier activations and chord triggers as JSON lines on stdin
//! and plays them through the default output device.
//!
//! Run with: classifier | cargo run --bin sonify -- --config sonify.toml

mod audio;
mod events;
mod ui;

use std::{
    fs::File,
    path::PathBuf,
    sync::Mutex,
    thread,
    time::{Duration, Instant},
};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use rand::{rngs::StdRng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

use audio::CpalContext;
use events::Inbox;
use neurosonic::{synth::ContextFactory, EngineConfig, SonificationEngine};

/// Inbound events buffered between the stdin reader and the control loop
const INBOX_CAPACITY: usize = 1024;
/// Control loop period in headless mode
const TICK: Duration = Duration::from_millis(5);

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// TOML engine configuration; defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed every random draw for a repeatable session
    #[arg(long)]
    seed: Option<u64>,

    /// Run without the terminal UI, logging to stderr
    #[arg(long)]
    headless: bool,

    /// Start with sonification enabled regardless of the config; in the
    /// terminal UI sound still waits for the first key press
    #[arg(long)]
    enable: bool,

    /// Stop after this many seconds (headless only); otherwise run until stdin closes
    #[arg(long)]
    duration: Option<f64>,

    /// Log file used while the terminal UI is up
    #[arg(long, default_value = "sonify.log")]
    log_file: PathBuf,
}

/// Engine plus its event source and clock, stepped by either front end.
pub struct Session<'a, F: ContextFactory> {
    engine: &'a mut SonificationEngine<F>,
    inbox: &'a mut Inbox,
    start: Instant,
}

impl<'a, F: ContextFactory> Session<'a, F> {
    pub fn new(engine: &'a mut SonificationEngine<F>, inbox: &'a mut Inbox) -> Self {
        Self {
            engine,
            inbox,
            start: Instant::now(),
        }
    }

    pub fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Apply pending events, then tick. Returns the time used.
    pub fn step(&mut self) -> f64 {
        let now = self.now();
        while let Some(event) = self.inbox.pop() {
            self.engine.handle_event(event, now);
        }
        self.engine.tick(now);
        now
    }
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();

    init_logging(&args)?;

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .wrap_err_with(|| format!("failed to load {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let engine_rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let voice_seed = args.seed.map(|seed| seed.wrapping_add(1));

    let render = config.render.clone();
    let factory = move || {
        let rng = match voice_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        CpalContext::open(&render, rng)
    };

    let mut engine = SonificationEngine::with_rng(config, factory, engine_rng);
    let mut inbox = Inbox::spawn(INBOX_CAPACITY);
    if args.enable {
        engine.set_enabled(true, 0.0);
    }

    if args.headless {
        run_headless(&args, &mut engine, &mut inbox);
    } else {
        let mut terminal = ratatui::init();
        let res = ui::UiApp::new(&mut engine, &mut inbox).run(&mut terminal);
        ratatui::restore();
        res?;
    }

    engine.teardown();
    Ok(())
}

fn run_headless<F: ContextFactory>(
    args: &Args,
    engine: &mut SonificationEngine<F>,
    inbox: &mut Inbox,
) {
    let mut session = Session::new(engine, inbox);

    // No user gesture to wait for: start the output right away
    let state = session.engine.init_audio(session.now());
    info!(state = state.name(), "headless session started");

    loop {
        let now = session.step();

        let expired = args.duration.is_some_and(|limit| now >= limit);
        if expired || (args.duration.is_none() && session.inbox.is_drained()) {
            break;
        }
        thread::sleep(TICK);
    }
}

fn init_logging(args: &Args) -> EyreResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if args.headless {
        builder.with_writer(std::io::stderr).init();
    } else {
        // The terminal belongs to the UI
        let file = File::create(&args.log_file)
            .wrap_err_with(|| format!("failed to create {}", args.log_file.display()))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    }
    Ok(())
}
