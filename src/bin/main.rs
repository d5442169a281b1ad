//! Page Curl CLI
//!
//! Build page assets and run books headless.

use clap::{Parser, Subcommand};
use page_curl::{
    export_page_glb, load_book, load_config, render_book_faces, BookConfig, BookSession,
    GlyphBlockRasterizer, PageGeometry,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "page-curl")]
#[command(author, version, about = "Animate the pages of a 3D book", long_about = None)]
struct Cli {
    /// Book config JSON (dimensions, tuning, catch-up timing, textures)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the page mesh as a skinned GLB
    Geometry {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Book JSON; textures the page with its faces
        #[arg(short, long)]
        book: Option<PathBuf>,

        /// Page whose faces to use
        #[arg(short, long, default_value = "0")]
        page: usize,
    },

    /// Write face textures of every page as PNGs
    Textures {
        /// Input book JSON
        #[arg(short, long)]
        book: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Run a navigation script headless, printing cursor steps as JSON lines
    Simulate {
        /// Input book JSON
        #[arg(short, long)]
        book: PathBuf,

        /// Script JSON: [{"at": 0, "action": "set", "page": 5}, ...]
        #[arg(short, long)]
        script: PathBuf,

        /// Frame interval in milliseconds
        #[arg(long, default_value = "16")]
        step_ms: f64,

        /// Keep running this long after the last command
        #[arg(long, default_value = "2000")]
        settle_ms: f64,
    },

    /// Show information about a book
    Info {
        /// Input book JSON
        #[arg(short, long)]
        book: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => BookConfig::default(),
    };

    match cli.command {
        Commands::Geometry { output, book, page } => {
            write_geometry(&config, &output, book.as_deref(), page)?;
        }
        Commands::Textures { book, output } => {
            write_textures(&config, &book, &output)?;
        }
        Commands::Simulate {
            book,
            script,
            step_ms,
            settle_ms,
        } => {
            simulate(&config, &book, &script, step_ms, settle_ms)?;
        }
        Commands::Info { book } => {
            show_book_info(&config, &book)?;
        }
    }

    Ok(())
}

fn write_geometry(
    config: &BookConfig,
    output_path: &Path,
    book_path: Option<&Path>,
    page: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let geometry = PageGeometry::build(&config.dimensions);
    println!(
        "Page mesh: {} vertices, {} triangles, {} bones",
        geometry.mesh.vertex_count(),
        geometry.mesh.triangle_count(),
        config.dimensions.bone_count()
    );

    let faces = match book_path {
        Some(path) => {
            println!("Loading book from {:?}...", path);
            let book = load_book(path)?;
            if page >= book.len() {
                return Err(format!("page {} out of range (book has {})", page, book.len()).into());
            }
            let rasterizer = GlyphBlockRasterizer::new(&config.texture);
            Some(render_book_faces(&book, &rasterizer)?.swap_remove(page))
        }
        None => None,
    };

    let glb_path = if output_path.extension().is_some() {
        output_path.to_path_buf()
    } else {
        output_path.with_extension("glb")
    };
    let glb_data = export_page_glb(&geometry, faces.as_ref(), None)?;
    fs::write(&glb_path, &glb_data)?;
    println!("Exported GLB ({} bytes) to {:?}", glb_data.len(), glb_path);

    Ok(())
}

fn write_textures(
    config: &BookConfig,
    book_path: &Path,
    output_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading book from {:?}...", book_path);
    let book = load_book(book_path)?;

    let rasterizer = GlyphBlockRasterizer::new(&config.texture);
    let faces = render_book_faces(&book, &rasterizer)?;

    fs::create_dir_all(output_dir)?;
    for (i, textures) in faces.iter().enumerate() {
        for side in page_curl::PageSide::all() {
            let path = output_dir.join(format!("page_{:03}_{}.png", i, side.name()));
            textures.side(side).save_png(&path)?;
        }
    }
    println!(
        "Wrote {} faces ({}x{}) to {:?}",
        faces.len() * 2,
        config.texture.width,
        config.texture.height,
        output_dir
    );

    Ok(())
}

fn simulate(
    config: &BookConfig,
    book_path: &Path,
    script_path: &Path,
    step_ms: f64,
    settle_ms: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    if step_ms <= 0.0 {
        return Err("step-ms must be positive".into());
    }

    let book = load_book(book_path)?;
    let mut commands: Vec<ScriptCommand> = serde_json::from_str(&fs::read_to_string(script_path)?)?;
    commands.sort_by(|a, b| a.at.total_cmp(&b.at));

    let end = commands.last().map_or(0.0, |c| c.at) + settle_ms;
    let mut session = BookSession::new(book, *config)?;
    let mut pending = commands.into_iter().peekable();
    let mut delayed = session.cursor().delayed();
    let mut now = 0.0;

    while now <= end {
        while let Some(command) = pending.next_if(|c| c.at <= now) {
            let selected = match command.action {
                ScriptAction::Set => session.set_page(command.page.unwrap_or(0), now),
                ScriptAction::Next => session.next_page(now),
                ScriptAction::Previous => session.previous_page(now),
            };
            println!(
                "{}",
                serde_json::json!({ "t": now, "event": "navigate", "current": selected, "label": session.ui().label })
            );
        }

        session.frame(now, (step_ms / 1000.0) as f32);

        if session.cursor().delayed() != delayed {
            delayed = session.cursor().delayed();
            println!(
                "{}",
                serde_json::json!({ "t": now, "event": "step", "delayed": delayed, "current": session.cursor().current() })
            );
        }
        now += step_ms;
    }

    Ok(())
}

fn show_book_info(config: &BookConfig, book_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading book from {:?}...", book_path);
    let book = load_book(book_path)?;
    let session = BookSession::new(book, *config)?;

    println!("\nBook Info:");
    println!("  Pages: {}", session.page_count());
    println!("  Navigation: {}", session.ui().label);
    let blank = session
        .book()
        .pages
        .iter()
        .filter(|p| p.front.trim().is_empty() && p.back.trim().is_empty())
        .count();
    println!("  Blank pages: {}", blank);

    let d = &config.dimensions;
    println!("\nPage:");
    println!("  Size: {} x {} x {}", d.width, d.height, d.depth);
    println!("  Segments: {} ({} bones)", d.segments, d.bone_count());
    println!("  Face textures: {}x{}", config.texture.width, config.texture.height);

    Ok(())
}

// Script input format
#[derive(serde::Deserialize)]
struct ScriptCommand {
    /// Milliseconds from the start of the run.
    at: f64,
    action: ScriptAction,
    #[serde(default)]
    page: Option<i64>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "lowercase")]
enum ScriptAction {
    Set,
    Next,
    Previous,
}
