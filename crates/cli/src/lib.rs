use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use image::{Rgba, RgbaImage};
use kurbo::{Point, Rect, Vec2};
use pdf_ink_core::{
    Annotation, Color, Editor, EditorConfig, GesturePhase, GestureWiring, InstrumentId,
    InstrumentViewModel, MemoryDocument, PageIndex, PanEvent, PinchEvent, Tool, ToolEvent,
    TouchEvent, TouchPhase,
};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pdf-ink")]
#[command(about = "PDF ink annotation engine CLI")]
pub struct Cli {
    /// Editor configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render the color palette to a PNG.
    Palette {
        #[arg(long, default_value_t = 300)]
        width: u32,
        #[arg(long, default_value_t = 300)]
        height: u32,
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Print the palette color under a point as JSON.
    Pick {
        #[arg(long, allow_hyphen_values = true)]
        x: f64,
        #[arg(long, allow_hyphen_values = true)]
        y: f64,
        #[arg(long, default_value_t = 300)]
        width: u32,
        #[arg(long, default_value_t = 300)]
        height: u32,
    },
    /// Replay a JSON gesture script and print the resulting document as JSON.
    Replay {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
struct PickOutput {
    x: f64,
    y: f64,
    color: Color,
    hex: String,
}

/// Gesture script replayed against an in-memory document
#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default = "default_page_count")]
    pages: usize,
    #[serde(default = "default_page_size")]
    page_size: [f64; 2],
    steps: Vec<ScriptStep>,
}

fn default_page_count() -> usize {
    1
}

fn default_page_size() -> [f64; 2] {
    [612.0, 792.0]
}

fn default_touch_count() -> usize {
    1
}

fn default_gesture_phase() -> GesturePhase {
    GesturePhase::Changed
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum ScriptStep {
    Open {
        #[serde(default)]
        page: PageIndex,
    },
    GoToPage {
        page: PageIndex,
    },
    Close,
    Select {
        instrument: InstrumentId,
    },
    Deselect {
        instrument: InstrumentId,
    },
    Touch {
        phase: TouchPhase,
        x: f64,
        y: f64,
        #[serde(default = "default_touch_count")]
        touches: usize,
    },
    /// Single-touch gesture through `points`: down, moves, up
    Stroke {
        points: Vec<[f64; 2]>,
    },
    Pan {
        #[serde(default = "default_gesture_phase")]
        phase: GesturePhase,
        dx: f64,
        dy: f64,
    },
    Pinch {
        #[serde(default = "default_gesture_phase")]
        phase: GesturePhase,
        scale: f64,
        touches: Vec<[f64; 2]>,
    },
    Erase {
        page: Option<PageIndex>,
        x: f64,
        y: f64,
    },
    Undo,
    Redo,
    Trash,
    Color {
        r: f32,
        g: f32,
        b: f32,
    },
    Width {
        value: f64,
    },
    WidthFraction {
        value: f64,
    },
    Alpha {
        value: f32,
    },
}

#[derive(Debug, Serialize)]
struct ReplayOutput<'a> {
    page: Option<PageIndex>,
    tool: Tool,
    wiring: GestureWiring,
    can_redo: bool,
    removed: usize,
    notifications: usize,
    configuration_requests: usize,
    instruments: Vec<InstrumentViewModel>,
    pages: Vec<PageOutput<'a>>,
}

#[derive(Debug, Serialize)]
struct PageOutput<'a> {
    index: usize,
    bounds: Rect,
    annotations: &'a [Annotation],
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    init_tracing();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Palette { width, height, output } => {
            run_palette(&config, width, height, &output)
        }
        Commands::Pick { x, y, width, height } => run_pick(&config, x, y, width, height),
        Commands::Replay { script } => run_replay(config, &script),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (warnings only by default)
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pdf_ink=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    let config = match path {
        Some(path) => EditorConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => EditorConfig::default(),
    };
    config.apply_env().context("invalid PDF_INK_* environment override")
}

fn ensure_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        anyhow::bail!("palette size must be non-zero, got {width}x{height}");
    }
    Ok(())
}

fn run_palette(config: &EditorConfig, width: u32, height: u32, output: &Path) -> Result<()> {
    ensure_dimensions(width, height)?;

    let palette = config.palette(Rect::new(0.0, 0.0, f64::from(width), f64::from(height)))?;
    let mut image = RgbaImage::new(width, height);
    let swatches = palette.render();
    debug!(swatches = swatches.len(), "rendering palette");

    for swatch in swatches {
        let pixel = Rgba(swatch.color.to_rgba8());
        let x0 = (swatch.rect.x0.round() as u32).min(width);
        let x1 = (swatch.rect.x1.round() as u32).min(width);
        let y0 = (swatch.rect.y0.round() as u32).min(height);
        let y1 = (swatch.rect.y1.round() as u32).min(height);
        for y in y0..y1 {
            for x in x0..x1 {
                image.put_pixel(x, y, pixel);
            }
        }
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    image
        .save(output)
        .with_context(|| format!("failed to write image to {}", output.display()))?;

    println!("{}", output.display());
    Ok(())
}

fn run_pick(config: &EditorConfig, x: f64, y: f64, width: u32, height: u32) -> Result<()> {
    ensure_dimensions(width, height)?;

    let palette = config.palette(Rect::new(0.0, 0.0, f64::from(width), f64::from(height)))?;
    let color = palette.color_at(Point::new(x, y));
    let [r, g, b, _] = color.to_rgba8();
    let payload = PickOutput { x, y, color, hex: format!("#{r:02x}{g:02x}{b:02x}") };

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn run_replay(config: EditorConfig, path: &Path) -> Result<()> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    let script: Script = serde_json::from_str(&contents)
        .with_context(|| format!("invalid script {}", path.display()))?;

    let [page_width, page_height] = script.page_size;
    let document =
        MemoryDocument::new(script.pages, Rect::new(0.0, 0.0, page_width, page_height));
    let mut editor = Editor::with_config(document, config)?;

    let notifications = Rc::new(Cell::new(0));
    let configuration_requests = Rc::new(Cell::new(0));
    {
        let notifications = Rc::clone(&notifications);
        let configuration_requests = Rc::clone(&configuration_requests);
        editor.subscribe(move |event: &ToolEvent| match event {
            ToolEvent::SelectionChanged(_) => notifications.set(notifications.get() + 1),
            ToolEvent::DrawConfigurationRequested => {
                configuration_requests.set(configuration_requests.get() + 1)
            }
        });
    }

    info!(steps = script.steps.len(), pages = script.pages, "replaying script");
    for (index, step) in script.steps.into_iter().enumerate() {
        apply_step(&mut editor, step).with_context(|| format!("step {index} failed"))?;
    }

    let document = editor.store();
    let payload = ReplayOutput {
        page: editor.current_page(),
        tool: editor.tool(),
        wiring: editor.gesture_wiring(),
        can_redo: editor.can_redo(),
        removed: editor.removal_stack().len(),
        notifications: notifications.get(),
        configuration_requests: configuration_requests.get(),
        instruments: editor.instruments(),
        pages: document
            .pages()
            .iter()
            .enumerate()
            .map(|(index, page)| PageOutput {
                index,
                bounds: page.bounds,
                annotations: &page.annotations,
            })
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn apply_step(editor: &mut Editor<MemoryDocument>, step: ScriptStep) -> Result<()> {
    debug!(?step, "step");
    match step {
        ScriptStep::Open { page } => {
            ensure_page(editor, page)?;
            editor.open_document(page);
        }
        ScriptStep::GoToPage { page } => {
            ensure_page(editor, page)?;
            editor.go_to_page(page);
        }
        ScriptStep::Close => editor.close_document(),
        ScriptStep::Select { instrument } => editor.select_instrument(instrument),
        ScriptStep::Deselect { instrument } => editor.deselect_instrument(instrument),
        ScriptStep::Touch { phase, x, y, touches } => {
            let event = TouchEvent::new(phase, Point::new(x, y)).with_touch_count(touches);
            editor.handle_touch(&event);
        }
        ScriptStep::Stroke { points } => {
            let last = points.len().saturating_sub(1);
            for (i, [x, y]) in points.into_iter().enumerate() {
                let phase = if i == 0 {
                    TouchPhase::Began
                } else if i == last {
                    TouchPhase::Ended
                } else {
                    TouchPhase::Moved
                };
                editor.handle_touch(&TouchEvent::new(phase, Point::new(x, y)));
            }
        }
        ScriptStep::Pan { phase, dx, dy } => {
            editor.handle_pan(&PanEvent {
                phase,
                location: Point::ZERO,
                translation: Vec2::new(dx, dy),
            });
        }
        ScriptStep::Pinch { phase, scale, touches } => {
            let touches: Vec<Point> = touches.into_iter().map(|[x, y]| Point::new(x, y)).collect();
            let location = touches.first().copied().unwrap_or(Point::ZERO);
            editor.handle_pinch(&PinchEvent { phase, location, scale, touches });
        }
        ScriptStep::Erase { page, x, y } => {
            let Some(page) = page.or(editor.current_page()) else {
                anyhow::bail!("erase needs an open document or an explicit page");
            };
            editor.erase_at(page, Point::new(x, y));
        }
        ScriptStep::Undo => editor.undo(),
        ScriptStep::Redo => editor.redo(),
        ScriptStep::Trash => editor.trash(),
        ScriptStep::Color { r, g, b } => editor.set_color(Color::rgb(r, g, b)),
        ScriptStep::Width { value } => editor.set_stroke_width(value)?,
        ScriptStep::WidthFraction { value } => editor.set_width_fraction(value)?,
        ScriptStep::Alpha { value } => editor.set_alpha(value)?,
    }
    Ok(())
}

fn ensure_page(editor: &Editor<MemoryDocument>, page: PageIndex) -> Result<()> {
    if editor.store().page(page).is_none() {
        anyhow::bail!(
            "page {page} is out of range (document has {} pages)",
            editor.store().page_count()
        );
    }
    Ok(())
}
