// ============================================================================
// RockPaint CLI: replay a scripted painting session without a UI
// ============================================================================
//
// Usage examples:
//   rockpaint --script session.txt --assets assets/ --output rock.png
//   rockpaint -s session.txt -a assets/ --stamps "stamps/*.png" -o out/
//   rockpaint -s session.txt -a assets/ --gallery-dir ~/.rockpaint --verbose
//
// Script format, one command per line ('#' starts a comment):
//   base KEY          switch base image
//   color #RRGGBB     brush color
//   size N            brush size
//   mode NAME         toggle spray | eraser | glitter
//   bounds L T        on-screen position of the surface
//   down X Y          pointer down (viewport coordinates)
//   move X Y          pointer move
//   up [X Y]          pointer up (defaults to the last position)
//   cancel            pointer left the surface
//   click X Y         discrete click (stamp)
//   undo | clear | gallery

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::assets::FileAssetSource;
use crate::canvas::CanvasBounds;
use crate::components::tools::ContinuousMode;
use crate::error::PaintError;
use crate::gallery::{FileStore, Gallery};
use crate::project::{PainterEvent, Project};
use crate::settings::PainterSettings;
use crate::{log_info, log_warn};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// RockPaint headless session player.
#[derive(Parser, Debug)]
#[command(
    name = "rockpaint",
    about = "Replay a scripted rock-painting session and export the artwork",
    long_about = "Runs a script of pointer and control events against a 500x350 rock\n\
                  canvas and writes the result as PNG.\n\n\
                  Example:\n  \
                  rockpaint --script session.txt --assets assets/ --output rock.png"
)]
pub struct CliArgs {
    /// Session script to replay.
    #[arg(short, long, value_name = "FILE")]
    pub script: PathBuf,

    /// Directory holding base and stamp images.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub assets: PathBuf,

    /// Output PNG path. A directory receives my_rocky_art.png.
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Glob pattern (relative to --assets) selecting the stamp carousel,
    /// e.g. "stamps/*.png". Overrides the settings file.
    #[arg(long, value_name = "GLOB")]
    pub stamps: Option<String>,

    /// Base image key. Overrides the settings file.
    #[arg(long, value_name = "KEY")]
    pub base: Option<String>,

    /// Settings file (key=value). Defaults to the platform settings file.
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Directory backing the local gallery used by `gallery` commands.
    #[arg(long, value_name = "DIR")]
    pub gallery_dir: Option<PathBuf>,

    /// Mirror the session log to stderr and print per-command events.
    #[arg(short, long)]
    pub verbose: bool,
}

// ============================================================================
// Script
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum ScriptCommand {
    Base(String),
    Color(String),
    Size(u32),
    Mode(ContinuousMode),
    Bounds(f32, f32),
    Down(f32, f32),
    Move(f32, f32),
    Up(Option<(f32, f32)>),
    Cancel,
    Click(f32, f32),
    Undo,
    Clear,
    Gallery,
}

/// Parse a whole script. Errors name the offending line.
pub fn parse_script(source: &str) -> Result<Vec<(usize, ScriptCommand)>, PaintError> {
    let mut commands = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = strip_comment(raw);
        if line.is_empty() {
            continue;
        }
        let cmd = parse_line(&line)
            .map_err(|e| PaintError::InvalidInput(format!("line {}: {}", line_no, e)))?;
        commands.push((line_no, cmd));
    }
    Ok(commands)
}

/// Drop everything from the first token that starts with `#`, except the
/// hex argument of `color`.
fn strip_comment(raw: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for token in raw.split_whitespace() {
        let is_color_arg = kept.len() == 1 && kept[0].eq_ignore_ascii_case("color");
        if token.starts_with('#') && !is_color_arg {
            break;
        }
        kept.push(token);
    }
    kept.join(" ")
}

fn parse_line(line: &str) -> Result<ScriptCommand, String> {
    let mut parts = line.split_whitespace();
    let word = parts.next().unwrap_or_default().to_ascii_lowercase();
    let args: Vec<&str> = parts.collect();

    let arity = |n: usize| {
        if args.len() == n {
            Ok(())
        } else {
            Err(format!("'{}' takes {} argument(s), got {}", word, n, args.len()))
        }
    };
    let num = |s: &str| s.parse::<f32>().map_err(|_| format!("'{}' is not a number", s));
    let xy = || -> Result<(f32, f32), String> {
        arity(2)?;
        Ok((num(args[0])?, num(args[1])?))
    };

    match word.as_str() {
        "base" => {
            arity(1)?;
            Ok(ScriptCommand::Base(args[0].to_string()))
        }
        "color" => {
            arity(1)?;
            Ok(ScriptCommand::Color(args[0].to_string()))
        }
        "size" => {
            arity(1)?;
            let size = args[0]
                .parse::<u32>()
                .map_err(|_| format!("'{}' is not a brush size", args[0]))?;
            Ok(ScriptCommand::Size(size))
        }
        "mode" => {
            arity(1)?;
            ContinuousMode::from_label(args[0])
                .map(ScriptCommand::Mode)
                .ok_or_else(|| format!("unknown mode '{}'", args[0]))
        }
        "bounds" => xy().map(|(l, t)| ScriptCommand::Bounds(l, t)),
        "down" => xy().map(|(x, y)| ScriptCommand::Down(x, y)),
        "move" => xy().map(|(x, y)| ScriptCommand::Move(x, y)),
        "click" => xy().map(|(x, y)| ScriptCommand::Click(x, y)),
        "up" => {
            if args.is_empty() {
                Ok(ScriptCommand::Up(None))
            } else {
                xy().map(|p| ScriptCommand::Up(Some(p)))
            }
        }
        "cancel" => arity(0).map(|_| ScriptCommand::Cancel),
        "undo" => arity(0).map(|_| ScriptCommand::Undo),
        "clear" => arity(0).map(|_| ScriptCommand::Clear),
        "gallery" => arity(0).map(|_| ScriptCommand::Gallery),
        other => Err(format!("unknown command '{}'", other)),
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Replay the script and return an OS exit code.
pub fn run(args: CliArgs) -> ExitCode {
    crate::logger::set_echo(args.verbose);
    let start = Instant::now();

    match run_session(&args) {
        Ok(written) => {
            if args.verbose {
                println!(
                    "→ {} ({:.0}ms)",
                    written.display(),
                    start.elapsed().as_secs_f64() * 1000.0
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_session(args: &CliArgs) -> Result<PathBuf, PaintError> {
    let source = std::fs::read_to_string(&args.script)?;
    let commands = parse_script(&source)?;

    let mut settings = match &args.settings {
        Some(path) => PainterSettings::load_from(path),
        None => PainterSettings::load(),
    };
    if let Some(base) = &args.base {
        settings.base_image = base.clone();
    }
    if let Some(pattern) = &args.stamps {
        settings.stamps = resolve_stamps(&args.assets, pattern)?;
    }

    let assets = FileAssetSource::new(&args.assets);
    let mut gallery = args
        .gallery_dir
        .as_ref()
        .map(|dir| Gallery::with_capacity(FileStore::new(dir), settings.gallery_capacity));

    let mut project = Project::new(settings);
    project.pump_loads(&assets);
    report_events(&mut project, 0, args.verbose);

    let mut last = (0.0, 0.0);
    for (line_no, cmd) in commands {
        match cmd {
            ScriptCommand::Base(key) => {
                project.request_base(&key);
            }
            ScriptCommand::Color(hex) => project
                .set_brush_color_hex(&hex)
                .map_err(|e| PaintError::InvalidInput(format!("line {}: {}", line_no, e)))?,
            ScriptCommand::Size(size) => project.set_brush_size(size),
            ScriptCommand::Mode(mode) => {
                project.set_mode(mode);
            }
            ScriptCommand::Bounds(left, top) => project.set_bounds(CanvasBounds::new(left, top)),
            ScriptCommand::Down(x, y) => {
                last = (x, y);
                project.pointer_down(x, y);
            }
            ScriptCommand::Move(x, y) => {
                last = (x, y);
                project.pointer_move(x, y);
            }
            ScriptCommand::Up(at) => {
                let (x, y) = at.unwrap_or(last);
                project.pointer_up(x, y);
            }
            ScriptCommand::Cancel => project.pointer_cancel(),
            ScriptCommand::Click(x, y) => {
                project.click(x, y);
            }
            ScriptCommand::Undo => {
                project.undo();
            }
            ScriptCommand::Clear => {
                project.clear();
            }
            ScriptCommand::Gallery => match gallery.as_mut() {
                Some(gallery) => {
                    // Failures are reported through events; the session goes on.
                    let _ = project.save_to_gallery(gallery);
                }
                None => {
                    log_warn!("line {}: 'gallery' ignored, no --gallery-dir given", line_no);
                }
            },
        }
        // Loads complete before the next input event arrives.
        project.pump_loads(&assets);
        report_events(&mut project, line_no, args.verbose);
    }

    let written = project.download(&args.output)?;
    log_info!(
        "Session {} finished: {} snapshot(s), {} byte(s) of history",
        project.id,
        project.history().len(),
        project.history().memory_usage()
    );
    Ok(written)
}

fn report_events(project: &mut Project, line_no: usize, verbose: bool) {
    for event in project.take_events() {
        match &event {
            PainterEvent::AssetFailed { key, reason } => {
                eprintln!("  warning (line {}): could not load '{}': {}", line_no, key, reason);
            }
            PainterEvent::GallerySaveFailed(reason) => {
                eprintln!("  warning (line {}): gallery save failed: {}", line_no, reason);
            }
            PainterEvent::GallerySaved { stored, .. } => {
                println!("Artwork saved to gallery! ({} stored)", stored);
            }
            _ if verbose => println!("  [{}] {:?}", line_no, event),
            _ => {}
        }
    }
}

/// Expand a stamp glob relative to the asset root into sorted asset keys.
pub fn resolve_stamps(root: &Path, pattern: &str) -> Result<Vec<String>, PaintError> {
    let full = root.join(pattern);
    let full = full.to_string_lossy();
    let paths = glob::glob(&full)
        .map_err(|e| PaintError::InvalidInput(format!("bad stamp pattern '{}': {}", pattern, e)))?;

    let mut keys: Vec<String> = paths
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .filter_map(|p| {
            p.strip_prefix(root)
                .ok()
                .map(|rel| rel.to_string_lossy().replace('\\', "/"))
        })
        .collect();
    keys.sort();

    if keys.is_empty() {
        return Err(PaintError::InvalidInput(format!(
            "stamp pattern '{}' matched no files",
            pattern
        )));
    }
    Ok(keys)
}
