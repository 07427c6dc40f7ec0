//! `vitrine [model.glb|model.gltf] [--options preset.toml]
//! [--set section.field=value]...`
//!
//! Opens the viewer window with the built-in shapes and, if given, an
//! imported glTF model. `--set` overrides one option after the preset is
//! loaded; the value is read as JSON, falling back to a plain string
//! (`--set display.shadows=false`, `--set interaction.idle_speed=0.01`).

use std::path::PathBuf;
use std::process::ExitCode;

use vitrine::options::Options;
use vitrine::{Viewer, ViewerError};

const USAGE: &str = "Usage: vitrine [model.glb|model.gltf] \
                     [--options file.toml] [--set section.field=value]...";

struct Args {
    asset: Option<PathBuf>,
    options: Option<PathBuf>,
    overrides: Vec<String>,
}

/// Apply one `section.field=value` override.
fn apply_override(
    options: &Options,
    spec: &str,
) -> Result<Options, ViewerError> {
    let malformed = || {
        ViewerError::OptionsParse(format!(
            "expected section.field=value, got `{spec}`"
        ))
    };
    let (path, raw) = spec.split_once('=').ok_or_else(malformed)?;
    let (section, field) = path.split_once('.').ok_or_else(malformed)?;
    let value = serde_json::from_str(raw)
        .unwrap_or_else(|_| serde_json::Value::String(raw.to_owned()));
    options.with_field(section, field, value)
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        asset: None,
        options: None,
        overrides: Vec::new(),
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--options" | "-o" => {
                let path = iter
                    .next()
                    .ok_or_else(|| format!("{arg} needs a file path"))?;
                args.options = Some(PathBuf::from(path));
            }
            "--set" | "-s" => {
                let spec = iter
                    .next()
                    .ok_or_else(|| format!("{arg} needs section.field=value"))?;
                args.overrides.push(spec);
            }
            flag if flag.starts_with('-') => {
                return Err(format!("unknown flag {flag}"));
            }
            _ if args.asset.is_some() => {
                return Err(format!("unexpected argument {arg}"));
            }
            _ => args.asset = Some(PathBuf::from(&arg)),
        }
    }
    Ok(args)
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            log::error!("{e}");
            log::error!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let mut options = match args.options {
        Some(path) => match Options::load(&path) {
            Ok(options) => options,
            Err(e) => {
                log::error!("{}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Options::default(),
    };
    for spec in &args.overrides {
        match apply_override(&options, spec) {
            Ok(patched) => options = patched,
            Err(e) => {
                log::error!("--set {spec}: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    let mut builder = Viewer::builder().with_options(options);
    if let Some(asset) = args.asset {
        builder = builder.with_asset(asset);
    }

    match builder.build().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
