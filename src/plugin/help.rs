//! Help text for plugins, as plain text or markdown.

use std::fmt::Write as _;
use std::path::Path;
use std::str::FromStr;

use crate::plugin::options::{OptionArity, OptionDef};
use crate::plugin::Plugin;

/// Column at which option descriptions start in text help.
const DESCRIPTION_COLUMN: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpFormat {
    Text,
    Markdown,
}

impl HelpFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            HelpFormat::Text => ".txt",
            HelpFormat::Markdown => ".md",
        }
    }
}

impl FromStr for HelpFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(HelpFormat::Text),
            "markdown" | "md" => Ok(HelpFormat::Markdown),
            other => Err(format!("unknown help format: {}", other)),
        }
    }
}

fn option_synopsis(def: &OptionDef) -> String {
    let flag = def.short.unwrap_or(def.long);
    match def.arity {
        OptionArity::NoValue => format!("[{}]", flag),
        OptionArity::RequiresValue => format!("[{} {}]", flag, def.value_name()),
        OptionArity::OptionalValue => format!("[{} [{}]]", flag, def.value_name()),
        OptionArity::MultipleValues => {
            let value = def.value_name();
            format!("[{} {} [{} ...]]", flag, value, value)
        }
    }
}

fn option_forms(def: &OptionDef) -> String {
    let value = match def.arity {
        OptionArity::NoValue => String::new(),
        OptionArity::RequiresValue => format!(" {}", def.value_name()),
        OptionArity::OptionalValue => format!(" [{}]", def.value_name()),
        OptionArity::MultipleValues => {
            let v = def.value_name();
            format!(" {} [{} ...]", v, v)
        }
    };
    match def.short {
        Some(short) => format!("{}{}, {}{}", short, value, def.long, value),
        None => format!("{}{}", def.long, value),
    }
}

fn usage_text<P: Plugin + ?Sized>(plugin: &P) -> String {
    let options = plugin.options();
    let mut out = String::new();

    let synopsis: Vec<String> = options.iter().map(option_synopsis).collect();
    let _ = writeln!(out, "usage: {} {}", plugin.name(), synopsis.join(" "));
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", plugin.description());

    if !plugin.aliases().is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "aliases: {}", plugin.aliases().join(", "));
    }

    if !options.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "options:");
        for def in &options {
            let forms = option_forms(def);
            let description = match &def.default {
                Some(default) => format!("{} (default: {})", def.description, default),
                None => def.description.to_string(),
            };
            if forms.len() + 2 < DESCRIPTION_COLUMN {
                let _ = writeln!(out, "  {:<width$}{}", forms, description, width = DESCRIPTION_COLUMN - 2);
            } else {
                let _ = writeln!(out, "  {}", forms);
                let _ = writeln!(out, "{:width$}{}", "", description, width = DESCRIPTION_COLUMN);
            }
        }
    }

    out
}

/// Help for a single plugin.
///
/// Markdown output wraps the text help in a code block under a heading of
/// `heading_level` hashes.
pub fn plugin_usage<P: Plugin + ?Sized>(plugin: &P, format: HelpFormat, heading_level: usize) -> String {
    let text = usage_text(plugin);
    match format {
        HelpFormat::Text => text,
        HelpFormat::Markdown => {
            let mut out = String::new();
            let _ = writeln!(out, "{} {}", "#".repeat(heading_level.max(1)), plugin.name());
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", plugin.description());
            let _ = writeln!(out);
            let _ = writeln!(out, "```text");
            out.push_str(&text);
            let _ = writeln!(out, "```");
            out
        }
    }
}

/// Help for several plugins, sorted by name.
///
/// When `output` is an existing directory, each plugin's help is written to
/// `<name>.txt` or `<name>.md` inside it. Any other `output` path receives
/// all of it in one file; a missing extension is filled in from the format.
pub fn generate_help<'a, P, I>(
    plugins: I,
    format: HelpFormat,
    heading_level: usize,
    output: Option<&Path>,
) -> std::io::Result<String>
where
    P: Plugin + ?Sized + 'a,
    I: IntoIterator<Item = &'a P>,
{
    let mut sorted: Vec<&P> = plugins.into_iter().collect();
    sorted.sort_by(|a, b| a.name().cmp(b.name()));

    let sections: Vec<String> = sorted
        .iter()
        .map(|p| plugin_usage(*p, format, heading_level))
        .collect();
    let help = sections.join("\n");

    if let Some(dir) = output.filter(|p| p.is_dir()) {
        for (plugin, section) in sorted.iter().zip(&sections) {
            let path = dir.join(format!("{}{}", plugin.name(), format.extension()));
            std::fs::write(&path, section)?;
            tracing::debug!(path = %path.display(), "Help written");
        }
        tracing::info!(dir = %dir.display(), count = sections.len(), "Help written");
    } else if let Some(path) = output {
        let path = if path.extension().is_none() {
            path.with_extension(format.extension().trim_start_matches('.'))
        } else {
            path.to_path_buf()
        };
        std::fs::write(&path, &help)?;
        tracing::info!(path = %path.display(), "Help written");
    }

    Ok(help)
}

/// Lists names comma-separated, wrapping lines at `width`. Every line
/// starts with `prefix`.
pub fn enumerate_plugins<I, S>(names: I, prefix: &str, width: usize) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut sorted: Vec<String> = names.into_iter().map(|s| s.as_ref().to_string()).collect();
    sorted.sort();

    let mut lines = Vec::new();
    let mut line = prefix.to_string();
    for name in &sorted {
        if line.len() > prefix.len() {
            line.push_str(", ");
        }
        if line.len() + name.len() >= width && line.len() > prefix.len() {
            lines.push(line.trim_end().to_string());
            line = format!("{}{}", prefix, name);
        } else {
            line.push_str(name);
        }
    }
    if line.len() > prefix.len() {
        lines.push(line);
    }
    lines.join("\n")
}
