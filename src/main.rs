use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use log::{error, info};
use sceneryc::package::ExportMode;
use sceneryc::{VERSION, build_scenery};

#[derive(Parser, Debug)]
#[command(name = "sceneryc", version = VERSION, about = "Compile large scenery descriptions into game objects")]
#[command(group(
    ArgGroup::new("mode").args(["no_export", "unzip", "unzip_abs", "parkobj", "parkobj_abs"])
))]
struct Cli {
    /// Object description files (.json), compiled one after another
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Compile and validate without writing anything
    #[arg(long)]
    no_export: bool,
    /// Write a loose object directory, named after the object id, into DIR
    #[arg(long, value_name = "DIR")]
    unzip: Option<PathBuf>,
    /// Write a loose object directory at exactly DIR
    #[arg(long, value_name = "DIR")]
    unzip_abs: Option<PathBuf>,
    /// Write <id>.parkobj into DIR (default: current directory)
    #[arg(long, value_name = "DIR")]
    parkobj: Option<PathBuf>,
    /// Write the archive at exactly PATH
    #[arg(long, value_name = "PATH")]
    parkobj_abs: Option<PathBuf>,
}

impl Cli {
    fn export_mode(&self) -> ExportMode {
        if self.no_export {
            return ExportMode::NoExport;
        }
        match (&self.unzip, &self.unzip_abs, &self.parkobj, &self.parkobj_abs) {
            (Some(dir), ..) => ExportMode::Unzip(dir.clone()),
            (_, Some(dir), ..) => ExportMode::UnzipAbs(dir.clone()),
            (_, _, _, Some(path)) => ExportMode::ParkobjAbs(path.clone()),
            (_, _, Some(dir), _) => ExportMode::Parkobj(dir.clone()),
            _ => ExportMode::Parkobj(PathBuf::from(".")),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mode = cli.export_mode();
    info!("export mode: {mode:?}");

    let mut failed = 0usize;
    for input in &cli.inputs {
        let result = build_scenery(input, &mode).with_context(|| format!("compiling '{}'", input.display()));
        match result {
            Ok(Some(out)) => println!("Wrote {}", out.display()),
            Ok(None) => println!("Compiled {} (not exported)", input.display()),
            Err(e) => {
                error!("{e:#}");
                error!("'{}' was not exported", input.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} input(s) failed", cli.inputs.len());
    }
    Ok(())
}
