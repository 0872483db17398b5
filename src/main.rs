use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use signal_hook::consts::signal::SIGINT;

use stagehand::args::{instantiate, is_help_requested, split_args, HelpRequest, NameResolver};
use stagehand::builtin;
use stagehand::compat::check_compatibility;
use stagehand::config::Config;
use stagehand::logging::init_tracing;
use stagehand::pipeline::{self, placeholder_help, ExecutionOptions, Pipeline, Session, Stage};
use stagehand::plugin::{
    enumerate_plugins, generate_help, parse_options, HelpFormat, OptionDef, Plugin, ANY,
};
use stagehand::registry::PluginMap;

const USAGE_WIDTH: usize = 72;

/// Options before the first plugin name.
#[derive(Debug, Parser)]
#[command(
    name = "stagehand",
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true
)]
struct GlobalOptions {
    /// The logging level to use.
    #[arg(
        short = 'l',
        long = "logging-level",
        default_value = "WARN",
        ignore_case = true,
        value_parser = ["DEBUG", "INFO", "WARN", "WARNING", "ERROR", "CRITICAL"]
    )]
    logging_level: String,

    /// Outputs progress information every N records (overrides the config file).
    #[arg(short = 'u', long = "update-interval")]
    update_interval: Option<u64>,

    /// Processes the data in batches even with a stream writer.
    #[arg(short = 'b', long = "force-batch")]
    force_batch: bool,
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::load().context("Failed to load configuration")?;
    let plugins = builtin::discover_plugins(&config)?;
    let resolver = NameResolver::new(plugins.keys()).partial(config.cli.partial_names);

    let help = is_help_requested(&args);
    if help.requested || args.is_empty() {
        return print_help(&args, &help, &plugins, &resolver);
    }

    let groups = split_args(&args, &resolver);
    let options = match GlobalOptions::try_parse_from(groups.global()) {
        Ok(options) => options,
        Err(e) => e.exit(),
    };
    init_tracing(&options.logging_level);
    tracing::debug!(plugins = ?groups.plugin_names(), "Command line split");

    let instantiated = instantiate(&groups, &plugins, true, false)?;
    check_compatibility(&instantiated.plugins, &ANY)?;
    let pipeline = Pipeline::from_stages(instantiated.plugins)?;

    let session = Session::new(ExecutionOptions {
        update_interval: options
            .update_interval
            .unwrap_or(config.execution.update_interval),
        force_batch: options.force_batch || config.execution.force_batch,
        logging_level: options.logging_level.clone(),
        ..ExecutionOptions::default()
    });
    signal_hook::flag::register(SIGINT, session.stop_handle().flag())
        .context("Failed to register SIGINT handler")?;

    let summary = pipeline::execute(pipeline, session)?;
    tracing::info!(
        mode = ?summary.mode,
        processed = summary.processed,
        stopped = summary.stopped,
        "Done"
    );
    Ok(())
}

/// Primary names per role, aliases left out.
fn names_for_role<'a>(plugins: &'a PluginMap<Stage<String>>, role: &str) -> Vec<&'a str> {
    plugins
        .iter()
        .filter(|(name, entry)| entry.prototype().name() == name.as_str())
        .filter(|(_, entry)| entry.prototype().role() == role)
        .map(|(name, _)| name.as_str())
        .collect()
}

fn main_usage(plugins: &PluginMap<Stage<String>>) -> String {
    let mut out = String::from(
        "usage: stagehand [-l {DEBUG,INFO,WARN,ERROR,CRITICAL}] [-u N] [-b]\n\
         \x20                reader [filter ...] [writer]\n\
         \n\
         Assembles a processing pipeline from the plugins named on the command line.\n\
         \n\
         global options:\n\
         \x20 -l, --logging-level LEVEL   The logging level to use (default: WARN)\n\
         \x20 -u, --update-interval N     Outputs progress every N records\n\
         \x20 -b, --force-batch           Processes the data in batches\n\
         \x20 -h, --help                  Shows this help\n\
         \x20 --help-all                  Shows the help for every plugin\n\
         \x20 --help-plugin NAME          Shows the help for one plugin\n\
         \x20 --help-format text|md       Format of plugin help\n\
         \x20 --help-output PATH          Writes plugin help to a file or directory\n",
    );
    for (title, role) in [("readers", "reader"), ("filters", "filter"), ("writers", "writer")] {
        out.push_str(&format!("\n{}:\n", title));
        out.push_str(&enumerate_plugins(names_for_role(plugins, role), "   ", USAGE_WIDTH));
        out.push('\n');
    }
    out.push_str("\nplaceholders:\n");
    out.push_str(&placeholder_help(false, false));
    out.push('\n');
    out
}

fn print_help(
    args: &[String],
    request: &HelpRequest,
    plugins: &PluginMap<Stage<String>>,
    resolver: &NameResolver,
) -> Result<()> {
    let defs = [
        OptionDef::value("--help-format", "Format of plugin help"),
        OptionDef::value("--help-output", "File or directory to write plugin help to"),
    ];
    let mut format = HelpFormat::Text;
    let mut output: Option<PathBuf> = None;
    for option in parse_options(args, &defs)?.options {
        match option.flag.as_str() {
            "--help-format" => {
                format = option
                    .require_value()?
                    .parse()
                    .map_err(anyhow::Error::msg)?
            }
            "--help-output" => output = Some(PathBuf::from(option.require_value()?)),
            _ => {}
        }
    }

    if let Some(name) = &request.plugin {
        let Some(entry) = resolver.resolve(name).and_then(|n| plugins.get(n)) else {
            bail!("Unknown plugin: {}", name);
        };
        let help = generate_help([entry.prototype()], format, 1, output.as_deref())?;
        if output.is_none() {
            print!("{}", help);
        }
        return Ok(());
    }

    if request.all_details {
        let primaries = plugins
            .iter()
            .filter(|(name, entry)| entry.prototype().name() == name.as_str())
            .map(|(_, entry)| entry.prototype());
        let help = generate_help(primaries, format, 2, output.as_deref())?;
        if output.is_none() {
            println!("{}", main_usage(plugins));
            print!("{}", help);
        }
        return Ok(());
    }

    print!("{}", main_usage(plugins));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_options_defaults() {
        let options = GlobalOptions::try_parse_from(Vec::<String>::new()).unwrap();
        assert_eq!(options.logging_level, "WARN");
        assert_eq!(options.update_interval, None);
        assert!(!options.force_batch);
    }

    #[test]
    fn test_global_options_parse() {
        let options = GlobalOptions::try_parse_from(["-l", "info", "-u", "5", "-b"]).unwrap();
        assert_eq!(options.update_interval, Some(5));
        assert!(options.force_batch);
    }

    #[test]
    fn test_global_options_reject_unknown() {
        assert!(GlobalOptions::try_parse_from(["--verbose"]).is_err());
    }

    #[test]
    fn test_main_usage_lists_roles() {
        let plugins = builtin::discover_plugins(&Config::default()).unwrap();
        let usage = main_usage(&plugins);
        assert!(usage.contains("readers:\n   from-lines, generate"));
        assert!(usage.contains("writers:\n   to-console, to-file"));
        // aliases are not listed
        assert!(!usage.contains("head"));
    }
}
