use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::args::{CliArgs, Command};
use crate::dashboard::{self, DashboardSettings};
use crate::error::AppResult;
use crate::server::{self, ServerConfig};

enum RunPlan {
    Serve(ServerConfig),
    Dashboard(DashboardSettings),
}

/// Parses the command line, merges the config file and runs the selected
/// subcommand on a multi-threaded runtime.
///
/// # Errors
///
/// Returns an error when arguments or configuration are invalid, or when the
/// selected subcommand fails.
pub fn run() -> AppResult<()> {
    let (mut args, matches) = parse_args()?;
    if let Some(config) = crate::config::load_config(args.config.as_deref())? {
        crate::config::apply_config(&mut args, &matches, &config)?;
    }

    let plan = build_plan(&args);
    match &plan {
        RunPlan::Serve(_) => crate::logger::init_logging(args.verbose, false, None),
        RunPlan::Dashboard(settings) => crate::logger::init_logging(
            args.verbose,
            settings.no_color,
            settings
                .interactive()
                .then_some(settings.log_file.as_path()),
        ),
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(execute_plan(plan))
}

fn parse_args() -> AppResult<(CliArgs, ArgMatches)> {
    let matches = CliArgs::command().get_matches();
    let args = CliArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

fn build_plan(args: &CliArgs) -> RunPlan {
    match &args.command {
        Command::Serve(serve) => RunPlan::Serve(ServerConfig::from_args(serve)),
        Command::Dashboard(dashboard) => {
            RunPlan::Dashboard(DashboardSettings::from_args(dashboard))
        }
    }
}

async fn execute_plan(plan: RunPlan) -> AppResult<()> {
    match plan {
        RunPlan::Serve(config) => server::run_server(config).await,
        RunPlan::Dashboard(settings) => dashboard::run(&settings).await,
    }
}
