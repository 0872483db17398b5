//! `{NAME}` placeholders in paths and other option values.

use std::path::Path;

pub const PH_HOME: &str = "{HOME}";
pub const PH_CWD: &str = "{CWD}";
pub const PH_TMP: &str = "{TMP}";
pub const PH_INPUT_PATH: &str = "{INPUT_PATH}";
pub const PH_INPUT_NAMEEXT: &str = "{INPUT_NAMEEXT}";
pub const PH_INPUT_NAMENOEXT: &str = "{INPUT_NAMENOEXT}";
pub const PH_INPUT_EXT: &str = "{INPUT_EXT}";
pub const PH_INPUT_PARENT_PATH: &str = "{INPUT_PARENT_PATH}";
pub const PH_INPUT_PARENT_NAME: &str = "{INPUT_PARENT_NAME}";

struct Placeholder {
    key: &'static str,
    input_based: bool,
    description: &'static str,
}

static PLACEHOLDERS: [Placeholder; 9] = [
    Placeholder {
        key: PH_HOME,
        input_based: false,
        description: "The home directory of the current user.",
    },
    Placeholder {
        key: PH_CWD,
        input_based: false,
        description: "The current working directory.",
    },
    Placeholder {
        key: PH_TMP,
        input_based: false,
        description: "The temp directory.",
    },
    Placeholder {
        key: PH_INPUT_PATH,
        input_based: true,
        description: "The directory part of the current input, i.e., '/some/where' of input '/some/where/file.txt'.",
    },
    Placeholder {
        key: PH_INPUT_NAMEEXT,
        input_based: true,
        description: "The name (incl extension) of the current input, i.e., 'file.txt' of input '/some/where/file.txt'.",
    },
    Placeholder {
        key: PH_INPUT_NAMENOEXT,
        input_based: true,
        description: "The name (excl extension) of the current input, i.e., 'file' of input '/some/where/file.txt'.",
    },
    Placeholder {
        key: PH_INPUT_EXT,
        input_based: true,
        description: "The extension of the current input (incl dot), i.e., '.txt' of input '/some/where/file.txt'.",
    },
    Placeholder {
        key: PH_INPUT_PARENT_PATH,
        input_based: true,
        description: "The directory part of the parent directory of the current input, i.e., '/some' of input '/some/where/file.txt'.",
    },
    Placeholder {
        key: PH_INPUT_PARENT_NAME,
        input_based: true,
        description: "The name of the parent directory of the current input, i.e., 'where' of input '/some/where/file.txt'.",
    },
];

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn value_of(key: &str, input: Option<&Path>) -> Option<String> {
    match key {
        PH_HOME => dirs::home_dir().map(|p| path_string(&p)),
        PH_CWD => std::env::current_dir().ok().map(|p| path_string(&p)),
        PH_TMP => Some(path_string(&std::env::temp_dir())),
        _ => {
            let input = input?;
            let parent = input.parent().unwrap_or_else(|| Path::new(""));
            Some(match key {
                PH_INPUT_PATH => path_string(parent),
                PH_INPUT_NAMEEXT => input
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                PH_INPUT_NAMENOEXT => input
                    .file_stem()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                PH_INPUT_EXT => input
                    .extension()
                    .map(|e| format!(".{}", e.to_string_lossy()))
                    .unwrap_or_default(),
                PH_INPUT_PARENT_PATH => parent
                    .parent()
                    .map(path_string)
                    .unwrap_or_default(),
                PH_INPUT_PARENT_NAME => parent
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                _ => return None,
            })
        }
    }
}

/// Replaces every known placeholder in `template`.
///
/// Input-based placeholders are left as they are when there is no current
/// input. Templates without `{` are returned unchanged.
pub fn expand_placeholders(template: &str, current_input: Option<&str>) -> String {
    if !template.contains('{') {
        return template.to_string();
    }
    let input = current_input.map(Path::new);
    let mut result = template.to_string();
    for placeholder in &PLACEHOLDERS {
        if !result.contains(placeholder.key) {
            continue;
        }
        if let Some(value) = value_of(placeholder.key, input) {
            result = result.replace(placeholder.key, &value);
        }
    }
    result
}

/// The placeholders as a list for help output.
///
/// `short` lists only the keys on one line; otherwise every key gets its
/// description, as a markdown bullet list when `markdown` is set.
pub fn placeholder_help(short: bool, markdown: bool) -> String {
    if short {
        let keys: Vec<&str> = PLACEHOLDERS.iter().map(|p| p.key).collect();
        return keys.join(", ");
    }
    let mut lines = Vec::with_capacity(PLACEHOLDERS.len());
    for placeholder in &PLACEHOLDERS {
        let kind = if placeholder.input_based { " (input-based)" } else { "" };
        if markdown {
            lines.push(format!(
                "* `{}`{}: {}",
                placeholder.key,
                kind,
                placeholder.description.replace('\'', "`")
            ));
        } else {
            lines.push(format!("- {}{}: {}", placeholder.key, kind, placeholder.description));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_based_placeholders() {
        let input = Some("/some/where/file.txt");
        assert_eq!(expand_placeholders("{INPUT_PATH}", input), "/some/where");
        assert_eq!(expand_placeholders("{INPUT_NAMEEXT}", input), "file.txt");
        assert_eq!(expand_placeholders("{INPUT_NAMENOEXT}", input), "file");
        assert_eq!(expand_placeholders("{INPUT_EXT}", input), ".txt");
        assert_eq!(expand_placeholders("{INPUT_PARENT_PATH}", input), "/some");
        assert_eq!(expand_placeholders("{INPUT_PARENT_NAME}", input), "where");
        assert_eq!(
            expand_placeholders("/out/{INPUT_NAMENOEXT}-clean{INPUT_EXT}", input),
            "/out/file-clean.txt"
        );
    }

    #[test]
    fn test_input_based_untouched_without_input() {
        assert_eq!(
            expand_placeholders("{INPUT_NAMEEXT}.bak", None),
            "{INPUT_NAMEEXT}.bak"
        );
    }

    #[test]
    fn test_tmp_and_unknown() {
        let tmp = std::env::temp_dir().to_string_lossy().into_owned();
        assert_eq!(expand_placeholders("{TMP}", None), tmp);
        assert_eq!(expand_placeholders("{NOPE}/x", None), "{NOPE}/x");
        assert_eq!(expand_placeholders("plain", None), "plain");
    }

    #[test]
    fn test_placeholder_help() {
        assert!(placeholder_help(true, false).starts_with("{HOME}, {CWD}"));
        let text = placeholder_help(false, false);
        assert_eq!(text.lines().count(), 9);
        assert!(text.contains("- {INPUT_EXT} (input-based): The extension"));
        assert!(placeholder_help(false, true).contains("* `{TMP}`: The temp directory."));
    }
}
