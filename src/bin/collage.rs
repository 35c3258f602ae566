use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::Parser;
use collage::components::render::extension_of;
use collage::{ComponentRegistry, Dimensions, Geometry, ParameterSet, Pipeline, Role, Selection};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "collage", version, about = "Assemble images into a collage")]
struct Cli {
    /// Input images, in placement order.
    inputs: Vec<PathBuf>,

    /// Output path [default: Collage].
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Output type: jpg, jpeg, png, tif, tiff, svg or sh [default: sniffed from the paths].
    #[arg(short = 't', long = "type")]
    output_type: Option<String>,

    /// Padding around and between images, `WxH` or `WxH%` [default: 0x0].
    #[arg(long)]
    padding: Option<Geometry>,

    /// Canvas aspect ratio, `W:H` written as `WxH` [default: 0x0].
    #[arg(long)]
    aspect: Option<Geometry>,

    /// Minimum canvas size `WxH`; 0 leaves an axis free [default: 0x0].
    #[arg(long)]
    minsize: Option<String>,

    /// Maximum canvas size `WxH`; 0 leaves an axis free [default: 0x0].
    #[arg(long)]
    maxsize: Option<String>,

    /// Input image reader variant [default: Raster].
    #[arg(long = "lc")]
    reader: Option<String>,

    /// Dimension initializer variant [default: Uniform].
    #[arg(long = "di")]
    initializer: Option<String>,

    /// Position calculator variant [default: Random].
    #[arg(long = "pc")]
    calculator: Option<String>,

    /// Progress monitor variant [default: Log].
    #[arg(long)]
    monitor: Option<String>,

    /// Component option as NAME=VALUE (repeatable).
    #[arg(short = 's', long = "set", value_parser = parse_key_val)]
    set: Vec<(String, String)>,

    /// JSON file with the same settings; command-line flags win.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the resolved canvas plan as JSON.
    #[arg(long)]
    dump_plan: Option<PathBuf>,

    /// List registered components and exit.
    #[arg(long)]
    list_components: bool,

    /// List component options with their defaults and exit.
    #[arg(long)]
    list_options: bool,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields, default)]
struct CollageConfig {
    inputs: Vec<PathBuf>,
    out: Option<PathBuf>,
    #[serde(rename = "type")]
    output_type: Option<String>,
    padding: Option<Geometry>,
    aspect: Option<Geometry>,
    minsize: Option<String>,
    maxsize: Option<String>,
    reader: Option<String>,
    initializer: Option<String>,
    calculator: Option<String>,
    monitor: Option<String>,
    custom: BTreeMap<String, String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let registry = ComponentRegistry::standard()?;
    if cli.list_components {
        list_components(&registry);
        return Ok(());
    }
    if cli.list_options {
        return list_options(&registry);
    }

    let config = match &cli.config {
        Some(path) => read_config(path)?,
        None => CollageConfig::default(),
    };
    run(cli, config, &registry)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_config(path: &Path) -> anyhow::Result<CollageConfig> {
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse config '{}'", path.display()))
}

fn run(cli: Cli, config: CollageConfig, registry: &ComponentRegistry) -> anyhow::Result<()> {
    let inputs = if cli.inputs.is_empty() {
        config.inputs
    } else {
        cli.inputs
    };
    if inputs.is_empty() {
        anyhow::bail!("at least one input image is required");
    }

    let out = cli
        .out
        .or(config.out)
        .unwrap_or_else(|| PathBuf::from("Collage"));
    let output_type = cli.output_type.or(config.output_type);
    let (out, renderer) = resolve_output(out, output_type.as_deref(), &inputs)?;

    let defaults = Selection::default();
    let selection = Selection {
        monitor: cli.monitor.or(config.monitor).unwrap_or(defaults.monitor),
        reader: cli.reader.or(config.reader).unwrap_or(defaults.reader),
        initializer: cli
            .initializer
            .or(config.initializer)
            .unwrap_or(defaults.initializer),
        calculator: cli
            .calculator
            .or(config.calculator)
            .unwrap_or(defaults.calculator),
        renderer: renderer.to_string(),
    };

    let mut params = ParameterSet::new();
    params.select(registry, &selection)?;
    params.set_inputs(inputs);
    params.set_output(&out);
    params.set_padding(cli.padding.or(config.padding).unwrap_or_default());
    params.set_aspect_ratio(cli.aspect.or(config.aspect).unwrap_or_default());
    params.set_min_size(must_parse_dims(
        "minsize",
        cli.minsize.or(config.minsize).as_deref(),
    )?);
    params.set_max_size(must_parse_dims(
        "maxsize",
        cli.maxsize.or(config.maxsize).as_deref(),
    )?);

    let mut custom = config.custom;
    custom.extend(cli.set);
    for (name, value) in custom {
        params.set_custom_value(name, value);
    }

    let mut pipeline = Pipeline::new(registry);
    let outcome = pipeline.run(&mut params);
    if let (Some(path), Some(plan)) = (&cli.dump_plan, pipeline.plan()) {
        let f = File::create(path).with_context(|| format!("create '{}'", path.display()))?;
        let mut w = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut w, plan).with_context(|| "serialize canvas plan")?;
        w.flush()
            .with_context(|| format!("write '{}'", path.display()))?;
    }

    let written = outcome.into_result()?;
    eprintln!("wrote {}", written.display());
    Ok(())
}

/// Pick the renderer variant from the output type and give `out` an extension if it lacks one.
fn resolve_output(
    mut out: PathBuf,
    explicit: Option<&str>,
    inputs: &[PathBuf],
) -> anyhow::Result<(PathBuf, &'static str)> {
    let kind = explicit
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .or_else(|| extension_of(&out))
        .or_else(|| inputs.first().and_then(|p| extension_of(p)))
        .unwrap_or_else(|| "jpg".to_string());

    let renderer = match kind.as_str() {
        "jpg" | "jpeg" | "png" | "tif" | "tiff" => "Raster",
        "svg" => "SVG",
        "sh" => "ImageMagickScript",
        other => anyhow::bail!("unsupported output type '{other}'"),
    };
    if out.extension().is_none() {
        out.set_extension(&kind);
    }
    Ok((out, renderer))
}

fn must_parse_dims(flag: &str, raw: Option<&str>) -> anyhow::Result<Dimensions> {
    match raw {
        None => Ok(Dimensions::default()),
        Some(s) => Dimensions::parse(s).with_context(|| format!("--{flag} '{s}'")),
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    if k.trim().is_empty() {
        return Err(format!("empty option name in '{s}'"));
    }
    Ok((k.trim().to_string(), v.to_string()))
}

fn list_components(registry: &ComponentRegistry) {
    for role in Role::ALL {
        println!("{role}: {}", registry.variants(role).join(", "));
    }
}

fn list_options(registry: &ComponentRegistry) -> anyhow::Result<()> {
    let mut params = ParameterSet::new();
    collage::params::negotiate::register_all(registry, &mut params)?;
    for (owner, spec) in params.custom().options() {
        println!("{:<20} {:<12} {owner}: {}", spec.name, spec.default, spec.help);
    }
    Ok(())
}
