//! Command dispatch: loads settings and the structure, then runs the query.

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::{load_structure, ApplicationError};
use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::Settings;
use crate::domain::{Structure, TreeDisplay};
use crate::exitcode;

/// Run the parsed command line and return the process exit code.
pub fn execute_command(cli: &Cli) -> CliResult<i32> {
    let command = match &cli.command {
        Some(command) => command,
        None => {
            return Err(CliError::Usage(
                "no command given, see --help".to_string(),
            ))
        }
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(exitcode::OK);
    }

    let settings = load_settings(cli)?;
    if !settings.color {
        output::disable_colors();
    }

    match command {
        Commands::Config => _config(&settings),
        Commands::Count => _count(&open_structure(cli, &settings)?),
        Commands::Find { code, renderer } => _find(
            &open_structure(cli, &settings)?,
            code.as_deref(),
            renderer.as_deref(),
        ),
        Commands::Tree => _tree(&open_structure(cli, &settings)?, &settings),
        Commands::List => _list(&open_structure(cli, &settings)?),
        Commands::Completion { .. } => Ok(exitcode::OK),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()
            .map_err(|e| ApplicationError::io("determine current directory", e))?,
    };
    Ok(Settings::load(Some(&dir))?)
}

fn structure_path(cli: &Cli, settings: &Settings) -> CliResult<PathBuf> {
    cli.file
        .clone()
        .or_else(|| settings.structure_file.clone())
        .ok_or_else(|| {
            CliError::Usage(
                "no structure file: pass --file or set structure_file in settings".to_string(),
            )
        })
}

#[instrument(level = "debug", skip(cli, settings))]
fn open_structure(cli: &Cli, settings: &Settings) -> CliResult<Structure> {
    let path = structure_path(cli, settings)?;
    debug!("structure file: {:?}", path);
    Ok(load_structure(&path)?)
}

fn _config(settings: &Settings) -> CliResult<i32> {
    output::info(&settings.to_toml()?);
    Ok(exitcode::OK)
}

fn _count(structure: &Structure) -> CliResult<i32> {
    output::info(&structure.count());
    Ok(exitcode::OK)
}

#[instrument(level = "debug", skip(structure))]
fn _find(structure: &Structure, code: Option<&str>, renderer: Option<&str>) -> CliResult<i32> {
    // Without --renderer the lookup goes by code, absent or not
    let found = match renderer {
        Some(_) => structure.find_by_renderer(renderer)?,
        None => structure.find_by_code(code)?,
    };

    match found {
        Some(entity) => {
            output::action("found", &entity);
            Ok(exitcode::OK)
        }
        None => {
            output::warning("not found");
            Ok(exitcode::NOT_FOUND)
        }
    }
}

fn tree_view(structure: &Structure, settings: &Settings) -> Tree<String> {
    if structure.is_empty() {
        structure.to_tree_string()
    } else {
        structure.to_titled_tree(&settings.tree_title)
    }
}

fn _tree(structure: &Structure, settings: &Settings) -> CliResult<i32> {
    output::info(&tree_view(structure, settings));
    Ok(exitcode::OK)
}

fn _list(structure: &Structure) -> CliResult<i32> {
    output::header(&format!("{} entities", structure.count()));
    for entity in structure.flatten() {
        output::info(&format!("{}\t{}", entity.code(), entity.renderer()));
    }
    Ok(exitcode::OK)
}
