use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use coverflow_switcher::actor;
use coverflow_switcher::actor::switcher::{Event, InputEvent, ScrollDirection, SwitcherActor};
use coverflow_switcher::common::config::{Config, config_file};
use coverflow_switcher::common::log;
use coverflow_switcher::sys::headless::{
    HeadlessBackend, HeadlessShell, HeadlessTracker, sample_window,
};
use coverflow_switcher::sys::shell::{Icon, Key, Modifiers, WindowId};
use coverflow_switcher::ui::headless::HeadlessStage;
use tracing::info;

/// Runs one switcher session against an in-memory desktop and logs what it does.
#[derive(Parser)]
struct Cli {
    /// Path to configuration file to use (overrides default).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of windows on the fake desktop.
    #[arg(long, default_value_t = 4)]
    windows: u64,

    /// Index of the initially selected window.
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Comma-separated input to replay once the switcher is up.
    #[arg(long, value_delimiter = ',', default_value = "next,next,release")]
    script: Vec<Step>,

    /// Milliseconds between scripted steps.
    #[arg(long, default_value_t = 300)]
    step_ms: u64,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    print_config: bool,

    /// Check the configuration file and exit.
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Step {
    Next,
    Prev,
    ScrollUp,
    ScrollDown,
    Close,
    Desktop,
    Cancel,
    Release,
}

impl Step {
    fn event(self, shell: &HeadlessShell) -> Event {
        let time = Instant::now();
        let press =
            |key| Event::Input(InputEvent::KeyPress { key, modifiers: Modifiers::ALT, time });
        match self {
            Step::Next => press(Key::Tab),
            Step::Prev => press(Key::Left),
            Step::ScrollUp => {
                Event::Input(InputEvent::Scroll { direction: ScrollDirection::Up, time })
            }
            Step::ScrollDown => {
                Event::Input(InputEvent::Scroll { direction: ScrollDirection::Down, time })
            }
            Step::Close => press(Key::Char('q')),
            Step::Desktop => press(Key::Char('d')),
            Step::Cancel => press(Key::Escape),
            Step::Release => {
                shell.set_modifiers(Modifiers::empty());
                Event::Input(InputEvent::KeyRelease { key: Key::Other(0), time })
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    sigpipe::reset();
    let opt = Cli::parse();
    log::init_logging();

    let config_path = opt.config.clone().unwrap_or_else(config_file);
    let config = if config_path.exists() {
        Config::read(&config_path)?
    } else {
        Config::default()
    };

    if opt.validate {
        let issues = config.validate();
        if issues.is_empty() {
            println!("Config validation passed");
            return Ok(());
        }
        for issue in issues {
            eprintln!("{issue}");
        }
        process::exit(1);
    }

    if opt.print_config {
        println!("{}", serde_json::to_string_pretty(&config.settings)?);
        return Ok(());
    }

    let shell = HeadlessShell::single_monitor();
    let tracker = HeadlessTracker::new();
    for id in 1..=opt.windows {
        shell.add_window(sample_window(id, &format!("Window {id}")));
        tracker.set_icon(WindowId::new(id), Icon::App { app_id: format!("app-{id}") });
    }
    shell.set_modifiers(Modifiers::ALT);
    let stage = HeadlessStage::new(1);

    let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, async {
        let (tx, rx) = actor::channel();
        let backend =
            HeadlessBackend::new(tx.clone(), shell.clone(), tracker.clone(), stage.clone());
        let switcher = SwitcherActor::new(config, rx, backend).oneshot();

        tx.send(Event::Show {
            windows: (1..=opt.windows).map(WindowId::new).collect(),
            modifiers: Modifiers::ALT,
            start_index: opt.start,
        });

        let script = opt.script.clone();
        let step = Duration::from_millis(opt.step_ms);
        let feeder_shell = shell.clone();
        tokio::task::spawn_local(async move {
            for s in script {
                tokio::time::sleep(step).await;
                info!(step = ?s, "scripted input");
                tx.send(s.event(&feeder_shell));
            }
            // Whatever the script left open gets closed.
            tokio::time::sleep(step).await;
            tx.send(Event::Dismiss);
        });

        switcher.run().await;
    });

    let activated = shell.state().activated.clone();
    match activated.last() {
        Some(window) => println!("activated window {}", window.as_u64()),
        None => println!("no window activated"),
    }
    Ok(())
}
