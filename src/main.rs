use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use luxeimg::dom::Document;
use luxeimg::image::ImageFormat;
use luxeimg::layout::layout_document;
use luxeimg::lazy::LazyLoadController;
use luxeimg::platform::ViewportPlatform;
use luxeimg::Config;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "luxeimg", version, about = "Responsive image URLs and lazy-load simulation")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the URL of a single variant
    Url {
        base_name: String,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long, default_value = "webp")]
        format: ImageFormat,
        /// Overrides image.base_path from the configuration
        #[arg(long)]
        base_path: Option<String>,
    },
    /// Print a srcset value covering every breakpoint
    Srcset {
        base_name: String,
        #[arg(long, default_value = "webp")]
        format: ImageFormat,
    },
    /// Print <picture> sources in format preference order as JSON
    Picture { base_name: String },
    /// Print the breakpoint chosen for a container width
    Breakpoint {
        #[arg(allow_hyphen_values = true)]
        container_width: f64,
    },
    /// Lay out an HTML page, scroll through it and report lazy loads
    Lazy {
        file: PathBuf,
        /// Scroll offsets to visit, in order
        #[arg(long = "scroll", allow_negative_numbers = true)]
        scroll: Vec<i32>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(p) => Config::from_json_file(p).with_context(|| format!("failed to load config {}", p.display())),
        None => Ok(Config::default()),
    }
}

fn run_lazy(config: &Config, file: &Path, scroll: &[i32]) -> Result<serde_json::Value> {
    let html = std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let mut doc = Document::parse_html(&html)?;
    layout_document(&mut doc, config.viewport);

    let platform = ViewportPlatform::new(config.viewport, config.lazy.root_margin);
    let mut controller = LazyLoadController::from_platform(config.lazy.clone(), &platform);
    let observed = controller.activate(&doc);

    let describe = |doc: &Document, ids: Vec<luxeimg::dom::ElementId>| -> Vec<serde_json::Value> {
        ids.into_iter()
            .map(|id| {
                let el = doc.get(id);
                serde_json::json!({
                    "element": id,
                    "src": el.and_then(|e| e.attr("src")),
                    "bounds": el.and_then(|e| e.bounds()),
                })
            })
            .collect()
    };

    let root = platform.root();
    let mut steps = Vec::new();
    let loaded = controller.process(&mut doc);
    steps.push(serde_json::json!({ "scroll_y": root.scroll_y(), "loaded": describe(&doc, loaded) }));
    for &y in scroll {
        root.scroll_to(y);
        let loaded = controller.process(&mut doc);
        steps.push(serde_json::json!({ "scroll_y": root.scroll_y(), "loaded": describe(&doc, loaded) }));
    }

    let states: Vec<serde_json::Value> = controller
        .states()
        .map(|(id, state)| serde_json::json!({ "element": id, "state": state }))
        .collect();

    Ok(serde_json::json!({
        "observed": observed,
        "steps": steps,
        "states": states,
    }))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Url {
            base_name,
            width,
            format,
            base_path,
        } => {
            let builder = match base_path {
                Some(p) => luxeimg::image::ImageUrlBuilder::new(p),
                None => config.image.url_builder(),
            };
            println!("{}", builder.image_url(&base_name, width, format));
        }
        Command::Srcset { base_name, format } => {
            println!("{}", config.image.url_builder().responsive_set(&base_name, format));
        }
        Command::Picture { base_name } => {
            let builder = config.image.url_builder();
            let out = serde_json::json!({
                "sources": builder.picture_sources(&base_name),
                "fallback": builder.fallback_src(&base_name),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::Breakpoint { container_width } => {
            println!("{}", luxeimg::try_select_breakpoint(container_width)?);
        }
        Command::Lazy { file, scroll } => {
            let report = run_lazy(&config, &file, &scroll)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
