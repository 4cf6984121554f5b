use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{
    CliArgs, Command, DashboardArgs, ServeArgs, parse_api_url, parse_granularity, parse_listen_addr,
};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

use super::types::{ConfigFile, DashboardSection, ServerSection};

/// Applies configuration values to CLI arguments. Values given on the command
/// line or through an environment variable are kept.
///
/// # Errors
///
/// Returns an error when a config value fails validation.
pub fn apply_config(args: &mut CliArgs, matches: &ArgMatches, config: &ConfigFile) -> AppResult<()> {
    match &mut args.command {
        Command::Serve(serve) => {
            let sub = matches.subcommand_matches("serve");
            apply_sites(&mut serve.sites, sub, config);
            if let Some(section) = config.server.as_ref() {
                apply_server_section(serve, sub, section)?;
            }
        }
        Command::Dashboard(dashboard) => {
            let sub = matches.subcommand_matches("dashboard");
            apply_sites(&mut dashboard.sites, sub, config);
            if let Some(section) = config.dashboard.as_ref() {
                apply_dashboard_section(dashboard, sub, section)?;
            }
        }
    }
    Ok(())
}

fn is_explicit(matches: Option<&ArgMatches>, name: &str) -> bool {
    matches.is_some_and(|matches| {
        matches!(
            matches.value_source(name),
            Some(ValueSource::CommandLine | ValueSource::EnvVariable)
        )
    })
}

fn invalid(field: &'static str) -> impl FnOnce(ValidationError) -> AppError {
    move |source| AppError::config(ConfigError::InvalidField { field, source })
}

fn apply_sites(sites: &mut Vec<String>, matches: Option<&ArgMatches>, config: &ConfigFile) {
    if !is_explicit(matches, "sites")
        && let Some(configured) = config.sites.as_ref()
    {
        sites.clone_from(configured);
    }
}

fn apply_server_section(
    args: &mut ServeArgs,
    matches: Option<&ArgMatches>,
    section: &ServerSection,
) -> AppResult<()> {
    if !is_explicit(matches, "db_path")
        && let Some(db_path) = section.db_path.as_ref()
    {
        args.db_path.clone_from(db_path);
    }

    if !is_explicit(matches, "listen")
        && let Some(listen) = section.listen.as_deref()
    {
        args.listen = parse_listen_addr(listen).map_err(invalid("server.listen"))?;
    }

    if !is_explicit(matches, "limit")
        && let Some(limit) = section.limit
    {
        if limit == 0 {
            return Err(invalid("server.limit")(ValidationError::LimitZero));
        }
        args.limit = limit;
    }

    Ok(())
}

fn apply_dashboard_section(
    args: &mut DashboardArgs,
    matches: Option<&ArgMatches>,
    section: &DashboardSection,
) -> AppResult<()> {
    if !is_explicit(matches, "api_url")
        && let Some(api_url) = section.api_url.as_deref()
    {
        args.api_url = parse_api_url(api_url).map_err(invalid("dashboard.api_url"))?;
    }

    if !is_explicit(matches, "refresh_interval")
        && let Some(interval) = section.refresh_interval.as_ref()
    {
        args.refresh_interval = interval
            .to_duration()
            .map_err(invalid("dashboard.refresh_interval"))?;
    }

    if !is_explicit(matches, "no_auto_refresh")
        && let Some(auto_refresh) = section.auto_refresh
    {
        args.no_auto_refresh = !auto_refresh;
    }

    if !is_explicit(matches, "granularity")
        && let Some(granularity) = section.granularity.as_deref()
    {
        args.granularity =
            parse_granularity(granularity).map_err(invalid("dashboard.granularity"))?;
    }

    if !is_explicit(matches, "no_color")
        && let Some(no_color) = section.no_color
    {
        args.no_color = no_color;
    }

    if !is_explicit(matches, "export_charts")
        && let Some(dir) = section.export_charts.as_ref()
    {
        args.export_charts = Some(dir.clone());
    }

    if !is_explicit(matches, "log_file")
        && let Some(log_file) = section.log_file.as_ref()
    {
        args.log_file.clone_from(log_file);
    }

    Ok(())
}
