//! mc4d - macro tool for the 4D hypercube puzzle
//!
//! Records macros into the macro file and replays them in any orientation.
//! Results are printed as JSON; logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use mc4d_core::{Error, MAXREFS};
use mc4d_macros::prelude::*;

#[derive(Parser)]
#[command(name = "mc4d")]
#[command(about = "Record and replay 4D puzzle macros in any orientation")]
#[command(version)]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Macro file (overrides the config)
    #[arg(long, global = true)]
    file: Option<PathBuf>,
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List saved macros
    List,
    /// Show a macro's references and moves
    Show {
        /// Index or name
        #[arg(value_name = "MACRO")]
        target: String,
    },
    /// Create an empty macro
    Create {
        name: String,
        /// Reference stickers: `a,b,c,d;e,f,g,h;i,j,k,l`
        #[arg(long, allow_hyphen_values = true)]
        refs: String,
    },
    /// Append moves to a macro
    Record {
        #[arg(value_name = "MACRO")]
        target: String,
        /// A move: `g0,g1,g2,g3:direction:slices`
        #[arg(long = "move", required = true, allow_hyphen_values = true)]
        moves: Vec<String>,
    },
    /// Remove the last recorded move
    Undo {
        #[arg(value_name = "MACRO")]
        target: String,
    },
    /// Replay a macro relative to the given reference stickers
    Play {
        #[arg(value_name = "MACRO")]
        target: String,
        #[arg(long, allow_hyphen_values = true)]
        refs: String,
        /// Play the inverse of the macro
        #[arg(long)]
        reverse: bool,
    },
    /// Show the transform relating the given references to the macro's
    Match {
        #[arg(value_name = "MACRO")]
        target: String,
        #[arg(long, allow_hyphen_values = true)]
        refs: String,
    },
    /// Rename a macro
    Rename {
        #[arg(value_name = "MACRO")]
        target: String,
        name: String,
    },
    /// Delete a macro
    Delete {
        #[arg(value_name = "MACRO")]
        target: String,
    },
    /// Write a timestamped backup of the macro file
    Backup,
}

#[derive(Serialize)]
struct Output<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Error>,
}

impl<T: Serialize> Output<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
    fn err(e: Error) -> Output<()> {
        Output {
            success: false,
            data: None,
            error: Some(e),
        }
    }
}

fn print_json<T: Serialize>(output: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(output)?);
    Ok(())
}

#[derive(Serialize)]
struct MacroSummary<'a> {
    index: usize,
    name: &'a str,
    refs: &'a [Vec4; MAXREFS],
    moves: usize,
}

impl<'a> MacroSummary<'a> {
    fn new(id: MacroId, m: &'a Macro) -> Self {
        Self {
            index: id.index(),
            name: m.name(),
            refs: m.frame().refs(),
            moves: m.len(),
        }
    }
}

#[derive(Serialize)]
struct MacroDetail<'a> {
    #[serde(flatten)]
    summary: MacroSummary<'a>,
    records: &'a [MoveRecord],
}

#[derive(Serialize)]
struct Replay {
    det: i32,
    reflection: bool,
    direction: PlayDirection,
    moves: Vec<MoveRecord>,
}

// ── Session ─────────────────────────────────────────────────────────────────

struct Session {
    storage: MacroStorage,
    manager: MacroManager,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => MacroConfig::load(path)?,
            None => MacroConfig::default(),
        };
        if let Some(file) = &cli.file {
            config.macro_file = Some(file.clone());
        }
        let storage = config.storage()?;
        let manager = storage.load(Arc::new(config.geometry()))?;
        tracing::debug!(
            path = %storage.path().display(),
            macros = manager.len(),
            "opened macro file"
        );
        Ok(Self { storage, manager })
    }

    fn resolve(&self, which: &str) -> Result<MacroId> {
        if let Ok(index) = which.parse::<usize>() {
            let id = MacroId::from(index);
            if self.manager.get(id).is_some() {
                return Ok(id);
            }
        }
        self.manager
            .find_by_name(which)
            .ok_or_else(|| Error::macro_not_found(format!("'{}'", which)).into())
    }

    fn get(&self, id: MacroId) -> Result<&Macro> {
        self.manager
            .get(id)
            .ok_or_else(|| Error::macro_not_found(id).into())
    }

    fn save(&self) -> Result<()> {
        self.storage.save(&self.manager)?;
        Ok(())
    }
}

// ── Parsing ─────────────────────────────────────────────────────────────────

fn parse_vec4(s: &str) -> Result<Vec4> {
    let parts: Vec<i32> = s
        .split(',')
        .map(|p| p.trim().parse::<i32>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("bad coordinates '{}'", s))?;
    parts.try_into().map_err(|v: Vec<i32>| {
        anyhow::anyhow!("expected 4 coordinates in '{}', got {}", s, v.len())
    })
}

fn parse_refs(s: &str) -> Result<[Vec4; MAXREFS]> {
    let refs: Vec<Vec4> = s.split(';').map(parse_vec4).collect::<Result<_>>()?;
    refs.try_into().map_err(|v: Vec<Vec4>| {
        anyhow::anyhow!("expected {} reference stickers, got {}", MAXREFS, v.len())
    })
}

fn parse_move(s: &str) -> Result<(Grip, i32, u32)> {
    let mut parts = s.split(':');
    let (Some(grip), Some(dir), Some(slices), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        anyhow::bail!("expected 'g0,g1,g2,g3:direction:slices', got '{}'", s);
    };
    Ok((
        Grip::new(parse_vec4(grip)?),
        dir.trim().parse().with_context(|| format!("bad direction in '{}'", s))?,
        slices.trim().parse().with_context(|| format!("bad slices mask in '{}'", s))?,
    ))
}

// ── Commands ────────────────────────────────────────────────────────────────

fn list(session: &Session) -> Result<()> {
    let macros: Vec<MacroSummary> = session
        .manager
        .iter()
        .map(|(id, m)| MacroSummary::new(id, m))
        .collect();
    print_json(&Output::ok(macros))
}

fn show(session: &Session, which: &str) -> Result<()> {
    let id = session.resolve(which)?;
    let m = session.get(id)?;
    print_json(&Output::ok(MacroDetail {
        summary: MacroSummary::new(id, m),
        records: m.moves().records(),
    }))
}

fn create(session: &mut Session, name: &str, refs: &str) -> Result<()> {
    let id = session.manager.create(name, parse_refs(refs)?)?;
    session.save()?;
    print_json(&Output::ok(MacroSummary::new(id, session.get(id)?)))
}

fn record(session: &mut Session, which: &str, moves: &[String]) -> Result<()> {
    let id = session.resolve(which)?;
    let parsed = moves.iter().map(|m| parse_move(m)).collect::<Result<Vec<_>>>()?;
    let refs = *session.get(id)?.frame().refs();

    session.manager.open(id, refs, OpenMode::Writing, 1)?;
    let recorded = parsed.into_iter().try_for_each(|(grip, dir, slices)| {
        session.manager.record_move(grip, dir, slices).map(|_| ())
    });
    session.manager.close();
    recorded?;

    session.save()?;
    print_json(&Output::ok(MacroSummary::new(id, session.get(id)?)))
}

fn undo(session: &mut Session, which: &str) -> Result<()> {
    let id = session.resolve(which)?;
    let removed = session
        .manager
        .get_mut(id)
        .and_then(Macro::remove_last_move)
        .context("macro has no moves to remove")?;
    session.save()?;
    print_json(&Output::ok(removed))
}

fn play(session: &mut Session, which: &str, refs: &str, reverse: bool) -> Result<()> {
    let id = session.resolve(which)?;
    let direction = if reverse { -1 } else { 1 };
    session
        .manager
        .open(id, parse_refs(refs)?, OpenMode::Reading, direction)?;
    let reorientation = session
        .manager
        .reading_reorientation()
        .context("read session vanished")?;

    let mut moves = Vec::new();
    let played = loop {
        match session.manager.play_move() {
            Ok(Playback::Move(m)) => moves.push(m),
            Ok(Playback::EndOfMacro) => break Ok(()),
            Err(e) => break Err(e),
        }
    };
    session.manager.close();
    played?;

    print_json(&Output::ok(Replay {
        det: reorientation.det,
        reflection: reorientation.is_reflection(),
        direction: PlayDirection::from_sign(direction),
        moves,
    }))
}

fn match_refs(session: &Session, which: &str, refs: &str) -> Result<()> {
    let id = session.resolve(which)?;
    let current = ReferenceFrame::checked(parse_refs(refs)?, &**session.manager.geometry())?;
    let reorientation = session.get(id)?.compute_reorientation(&current)?;
    print_json(&Output::ok(reorientation))
}

fn rename(session: &mut Session, which: &str, name: &str) -> Result<()> {
    let id = session.resolve(which)?;
    session.manager.set_macro_name(id, name)?;
    session.save()?;
    print_json(&Output::ok(MacroSummary::new(id, session.get(id)?)))
}

fn delete(session: &mut Session, which: &str) -> Result<()> {
    let id = session.resolve(which)?;
    session.manager.destroy(id)?;
    session.save()?;
    print_json(&Output::ok(serde_json::json!({ "deleted": id.index() })))
}

fn backup(session: &Session) -> Result<()> {
    let path = session.storage.backup(&session.manager)?;
    print_json(&Output::ok(serde_json::json!({
        "path": path,
        "backups": session.storage.list_backups()?,
    })))
}

// ── Main ────────────────────────────────────────────────────────────────────

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let mut session = Session::open(cli)?;
    tracing::debug!(command = ?cli.command, "running command");
    match &cli.command {
        Commands::List => list(&session),
        Commands::Show { target } => show(&session, target),
        Commands::Create { name, refs } => create(&mut session, name, refs),
        Commands::Record { target, moves } => record(&mut session, target, moves),
        Commands::Undo { target } => undo(&mut session, target),
        Commands::Play {
            target,
            refs,
            reverse,
        } => play(&mut session, target, refs, *reverse),
        Commands::Match { target, refs } => match_refs(&session, target, refs),
        Commands::Rename { target, name } => rename(&mut session, target, name),
        Commands::Delete { target } => delete(&mut session, target),
        Commands::Backup => backup(&session),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        if let Some(err) = e.downcast_ref::<Error>() {
            let _ = print_json(&Output::<()>::err(err.clone()));
        }
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
