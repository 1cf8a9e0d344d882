use circlepack::config::deep_merge_value;
use circlepack::render::{HeadlessError, HeadlessRenderer, SvgRenderOptions};
use circlepack::{Config, Record, RelatedIds};
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Read;

const ENV_WIDTH: &str = "DIMENSION_WIDTH";
const ENV_HEIGHT: &str = "DIMENSION_HEIGHT";
const ENV_PADDING: &str = "LAYOUT_PADDING_CIRCLES";
const ENV_DELIMITER: &str = "PARSE_DELIMETER";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Input(circlepack::Error),
    Layout(HeadlessError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Input(err) => write!(f, "malformed input: {err}"),
            CliError::Layout(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<circlepack::Error> for CliError {
    fn from(value: circlepack::Error) -> Self {
        Self::Input(value)
    }
}

impl From<HeadlessError> for CliError {
    fn from(value: HeadlessError) -> Self {
        match value {
            HeadlessError::Build(err) => Self::Input(err),
            other => Self::Layout(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Tree,
    Layout,
    Related,
    Render,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    config_path: Option<String>,
    delimiter: Option<String>,
    synthetic_root: bool,
    width: Option<f64>,
    height: Option<f64>,
    padding: Option<f64>,
    select: Vec<String>,
    class_name: Option<String>,
    no_cursor: bool,
    out: Option<String>,
}

#[derive(Serialize)]
struct RelatedOut<'a> {
    selection: &'a [String],
    ids: &'a RelatedIds,
}

fn usage() -> &'static str {
    "circlepack-cli\n\
\n\
USAGE:\n\
  circlepack-cli [tree] [--pretty] [--delimiter <d>] [--synthetic-root] [--config <path>] [<path>|-]\n\
  circlepack-cli layout [--pretty] [--width <w>] [--height <h>] [--padding <p>] [--delimiter <d>] [--synthetic-root] [--config <path>] [<path>|-]\n\
  circlepack-cli related --select <label> [--select <label> ...] [--pretty] [--delimiter <d>] [--config <path>] [<path>|-]\n\
  circlepack-cli render [--select <label> ...] [--class <name>] [--no-cursor] [--out <path>] [--width <w>] [--height <h>] [--padding <p>] [--delimiter <d>] [--synthetic-root] [--config <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - Input is a JSON array of records: [{\"id\": \"a|b\", \"value\": 1}, ...].\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - Settings are layered: defaults, --config file, DIMENSION_WIDTH / DIMENSION_HEIGHT /\n\
    LAYOUT_PADDING_CIRCLES / PARSE_DELIMETER, then flags.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - Set RUST_LOG (e.g. RUST_LOG=debug) for diagnostics on stderr.\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn next_f64<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<f64, CliError> {
    next_value(it)?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "tree" => args.command = Command::Tree,
            "layout" => args.command = Command::Layout,
            "related" => args.command = Command::Related,
            "render" => args.command = Command::Render,
            "--pretty" => args.pretty = true,
            "--synthetic-root" => args.synthetic_root = true,
            "--no-cursor" => args.no_cursor = true,
            "--config" => args.config_path = Some(next_value(&mut it)?.clone()),
            "--delimiter" => args.delimiter = Some(next_value(&mut it)?.clone()),
            "--width" => args.width = Some(next_f64(&mut it)?),
            "--height" => args.height = Some(next_f64(&mut it)?),
            "--padding" => args.padding = Some(next_f64(&mut it)?),
            "--select" => args.select.push(next_value(&mut it)?.clone()),
            "--class" => args.class_name = Some(next_value(&mut it)?.clone()),
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if args.command == Command::Related && args.select.is_empty() {
        return Err(CliError::Usage(usage()));
    }

    Ok(args)
}

/// Settings taken from the environment, as loosely typed JSON.
fn env_overrides(lookup: impl Fn(&str) -> Option<String>) -> Value {
    let mut map = Map::new();
    for (var, key) in [
        (ENV_WIDTH, "width"),
        (ENV_HEIGHT, "height"),
        (ENV_PADDING, "paddingCircles"),
    ] {
        let Some(raw) = lookup(var) else {
            continue;
        };
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => {
                map.insert(key.to_string(), Value::from(v));
            }
            _ => tracing::warn!(var, value = %raw, "ignoring non-numeric environment value"),
        }
    }
    if let Some(delimiter) = lookup(ENV_DELIMITER).filter(|d| !d.is_empty()) {
        map.insert("delimiter".to_string(), Value::String(delimiter));
    }
    Value::Object(map)
}

fn flag_overrides(args: &Args) -> Value {
    let mut map = Map::new();
    if let Some(d) = &args.delimiter {
        map.insert("delimiter".to_string(), Value::String(d.clone()));
    }
    for (key, value) in [
        ("width", args.width),
        ("height", args.height),
        ("paddingCircles", args.padding),
    ] {
        if let Some(v) = value {
            map.insert(key.to_string(), Value::from(v));
        }
    }
    Value::Object(map)
}

fn resolve_config(
    args: &Args,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config, CliError> {
    let mut layered = Config::default().to_value();
    if let Some(path) = &args.config_path {
        let file: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        deep_merge_value(&mut layered, &file);
    }
    deep_merge_value(&mut layered, &env_overrides(lookup));
    deep_merge_value(&mut layered, &flag_overrides(args));
    let config = Config::from_value(&layered);
    tracing::debug!(?config, "resolved settings");
    Ok(config)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let config = resolve_config(&args, |var| std::env::var(var).ok())?;
    let text = read_input(args.input.as_deref())?;
    let records: Vec<Record> = circlepack::records_from_json_str(&text)?;
    tracing::debug!(records = records.len(), command = ?args.command, "loaded records");

    let mut svg = SvgRenderOptions::default();
    if let Some(class_name) = &args.class_name {
        svg.class_name = class_name.clone();
    }
    svg.pointer_cursor = !args.no_cursor;

    let renderer = HeadlessRenderer::new()
        .with_config(config)
        .with_synthetic_root(args.synthetic_root)
        .with_svg_options(svg);

    match args.command {
        Command::Tree => {
            let hierarchy = renderer.build(&records)?;
            write_json(&hierarchy, args.pretty)
        }
        Command::Layout => {
            let packed = renderer.layout(&records)?;
            write_json(&packed, args.pretty)
        }
        Command::Related => {
            let ids = renderer.related(args.select.as_slice(), &records);
            write_json(
                &RelatedOut {
                    selection: &args.select,
                    ids: &ids,
                },
                args.pretty,
            )
        }
        Command::Render => {
            let svg = if args.select.is_empty() {
                renderer.render_svg(&records)?
            } else {
                renderer.render_svg_highlighted(&records, args.select.as_slice())?
            };
            write_text(&svg, args.out.as_deref())
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        tracing::debug!(error = ?err, "command failed");
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        std::iter::once("circlepack-cli")
            .chain(parts.iter().copied())
            .map(String::from)
            .collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn parses_render_flags() {
        let args = parse_args(&argv(&[
            "render",
            "--select",
            "a",
            "--select",
            "b",
            "--class",
            "pack",
            "--out",
            "x.svg",
            "--width",
            "320",
            "in.json",
        ]))
        .unwrap();
        assert_eq!(args.command, Command::Render);
        assert_eq!(args.select, vec!["a", "b"]);
        assert_eq!(args.class_name.as_deref(), Some("pack"));
        assert_eq!(args.out.as_deref(), Some("x.svg"));
        assert_eq!(args.width, Some(320.0));
        assert_eq!(args.input.as_deref(), Some("in.json"));
    }

    #[test]
    fn usage_errors() {
        for bad in [
            &["related"][..],
            &["layout", "--width"],
            &["layout", "--width", "wide"],
            &["layout", "--width", "nan"],
            &["layout", "--padding", "inf"],
            &["render", "--height", "-infinity"],
            &["--bogus"],
            &["a.json", "b.json"],
        ] {
            assert!(
                matches!(parse_args(&argv(bad)), Err(CliError::Usage(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn settings_layer_in_order() {
        let args = parse_args(&argv(&["layout", "--height", "250"])).unwrap();
        let env = |var: &str| match var {
            ENV_WIDTH => Some("400".to_string()),
            ENV_HEIGHT => Some("300".to_string()),
            ENV_PADDING => Some("nope".to_string()),
            ENV_DELIMITER => Some("/".to_string()),
            _ => None,
        };
        let config = resolve_config(&args, env).unwrap();
        assert_eq!(config.width, 400.0);
        assert_eq!(config.height, 250.0);
        assert_eq!(config.padding_circles, 10.0);
        assert_eq!(config.delimiter, "/");

        let non_finite = |var: &str| (var == ENV_WIDTH).then(|| "NaN".to_string());
        let config = resolve_config(&args, non_finite).unwrap();
        assert_eq!(config.width, 600.0);

        let defaults = resolve_config(&parse_args(&argv(&[])).unwrap(), no_env).unwrap();
        assert_eq!(defaults, Config::default());
    }

    #[test]
    fn config_file_sits_below_env_and_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"width": 900, "height": 700, "paddingCircles": 4}"#).unwrap();
        let path = path.to_string_lossy().to_string();

        let args = parse_args(&argv(&["layout", "--config", &path, "--padding", "2"])).unwrap();
        let env = |var: &str| (var == ENV_HEIGHT).then(|| "650".to_string());
        let config = resolve_config(&args, env).unwrap();
        assert_eq!(config.width, 900.0);
        assert_eq!(config.height, 650.0);
        assert_eq!(config.padding_circles, 2.0);
    }
}
