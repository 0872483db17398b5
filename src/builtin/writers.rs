use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::builtin::TEXT;
use crate::error::{ConfigurationError, ProcessingError};
use crate::pipeline::{
    expand_placeholders, BatchWriter, Data, InputTracker, Session, SplitSettings, Splitter,
    StreamWriter,
};
use crate::plugin::{InputConsumer, OptionDef, ParsedOption, Plugin, TypeTag, ANY, SKIP_OPTION};

fn log_split_stats(writer: &str, splitter: Option<&Splitter>) {
    if let Some(splitter) = splitter {
        tracing::info!(writer, stats = ?splitter.stats(), "Split statistics");
    }
}

/// Prints items to stdout, one per line.
#[derive(Debug, Default)]
pub struct ToConsole {
    show_input: bool,
    skip: bool,
    split: SplitSettings,
    splitter: Option<Splitter>,
    tracker: InputTracker,
}

impl Plugin for ToConsole {
    fn name(&self) -> &str {
        "to-console"
    }

    fn description(&self) -> &str {
        "Prints the items to stdout, prefixed with their split when splitting."
    }

    fn options(&self) -> Vec<OptionDef> {
        let mut options = vec![
            OptionDef::skip(),
            OptionDef::flag("--show-input", "Prints a header whenever the input changes"),
        ];
        options.extend(SplitSettings::options());
        options
    }

    fn apply_option(&mut self, option: &ParsedOption) -> Result<(), ConfigurationError> {
        if self.split.apply(option)? {
            return Ok(());
        }
        match option.flag.as_str() {
            SKIP_OPTION => self.skip = true,
            "--show-input" => self.show_input = true,
            _ => {}
        }
        Ok(())
    }

    fn is_skipped(&self) -> bool {
        self.skip
    }

    fn as_input_consumer(&self) -> Option<&dyn InputConsumer> {
        Some(self)
    }
}

impl InputConsumer for ToConsole {
    fn accepts(&self) -> Vec<TypeTag> {
        vec![ANY]
    }
}

impl StreamWriter<String> for ToConsole {
    fn initialize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        self.splitter = self.split.build()?;
        self.tracker = InputTracker::default();
        Ok(())
    }

    fn write_stream(&mut self, data: Data<String>, session: &Session) -> Result<(), ProcessingError> {
        let mut out = std::io::stdout().lock();
        if self.show_input && self.tracker.has_input_changed(session, None, true) {
            if let Some(input) = self.tracker.last_input() {
                writeln!(out, "==> {} <==", input)?;
            }
        }
        for item in data.into_vec() {
            match &mut self.splitter {
                Some(splitter) => {
                    let split = splitter.next(Some(&item))?;
                    writeln!(out, "[{}] {}", split, item)?;
                }
                None => writeln!(out, "{}", item)?,
            }
        }
        Ok(())
    }

    fn finalize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        std::io::stdout().flush()?;
        log_split_stats(self.name(), self.splitter.as_ref());
        Ok(())
    }
}

/// Writes all items to a text file once reading has finished.
///
/// With splits, items go to `<dir>/<split>/<file>` instead of `<dir>/<file>`.
#[derive(Debug, Default)]
pub struct ToFile {
    output: Option<String>,
    skip: bool,
    split: SplitSettings,
    splitter: Option<Splitter>,
}

impl ToFile {
    fn split_path(path: &Path, split: &str) -> PathBuf {
        let parent = path.parent().unwrap_or_else(|| Path::new(""));
        match path.file_name() {
            Some(name) => parent.join(split).join(name),
            None => parent.join(split),
        }
    }

    fn write_lines(&self, path: &Path, items: &[String]) -> Result<(), ProcessingError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        for item in items {
            writeln!(file, "{}", item)?;
        }
        file.flush()?;
        tracing::info!(path = %path.display(), count = items.len(), "Written");
        Ok(())
    }
}

impl Plugin for ToFile {
    fn name(&self) -> &str {
        "to-file"
    }

    fn description(&self) -> &str {
        "Writes all items to a text file, one per line."
    }

    fn options(&self) -> Vec<OptionDef> {
        let mut options = vec![
            OptionDef::skip(),
            OptionDef::value("--output", "The file to write to; supports placeholders")
                .short("-o")
                .metavar("FILE"),
        ];
        options.extend(SplitSettings::options());
        options
    }

    fn apply_option(&mut self, option: &ParsedOption) -> Result<(), ConfigurationError> {
        if self.split.apply(option)? {
            return Ok(());
        }
        match option.flag.as_str() {
            SKIP_OPTION => self.skip = true,
            "--output" => self.output = Some(option.require_value()?.to_string()),
            _ => {}
        }
        Ok(())
    }

    fn is_skipped(&self) -> bool {
        self.skip
    }

    fn as_input_consumer(&self) -> Option<&dyn InputConsumer> {
        Some(self)
    }
}

impl InputConsumer for ToFile {
    fn accepts(&self) -> Vec<TypeTag> {
        vec![TEXT]
    }
}

impl BatchWriter<String> for ToFile {
    fn initialize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        if self.output.is_none() {
            return Err(ConfigurationError::MissingValue {
                option: "--output".to_string(),
            }
            .into());
        }
        self.splitter = self.split.build()?;
        Ok(())
    }

    fn write_batch(&mut self, data: Vec<String>, session: &Session) -> Result<(), ProcessingError> {
        let Some(output) = &self.output else {
            return Err(ProcessingError::stage(self.name(), "no output file set"));
        };
        let path = PathBuf::from(expand_placeholders(output, session.current_input().as_deref()));

        let Some(splitter) = &mut self.splitter else {
            return self.write_lines(&path, &data);
        };
        let mut splits: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for item in data {
            let split = splitter.next(Some(&item))?;
            splits.entry(split).or_default().push(item);
        }
        for (split, items) in &splits {
            self.write_lines(&Self::split_path(&path, split), items)?;
        }
        Ok(())
    }

    fn finalize(&mut self, _session: &Session) -> Result<(), ProcessingError> {
        log_split_stats(self.name(), self.splitter.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured<P: Plugin + Default>(list: &[String]) -> P {
        let mut plugin = P::default();
        assert!(plugin.configure(list).unwrap().is_empty());
        plugin
    }

    #[test]
    fn test_to_file_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let session = Session::default();

        let mut writer: ToFile = configured(&["-o".to_string(), out.display().to_string()]);
        writer.initialize(&session).unwrap();
        writer
            .write_batch(vec!["a".into(), "b".into()], &session)
            .unwrap();

        assert_eq!(std::fs::read_to_string(&out).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_to_file_splits_into_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let session = Session::default();

        let mut writer: ToFile = configured(&[
            "-o".to_string(),
            out.display().to_string(),
            "--split-ratios".to_string(),
            "50".to_string(),
            "50".to_string(),
            "--split-names".to_string(),
            "train".to_string(),
            "test".to_string(),
        ]);
        writer.initialize(&session).unwrap();
        writer
            .write_batch(vec!["1".into(), "2".into(), "3".into(), "4".into()], &session)
            .unwrap();

        let train = std::fs::read_to_string(dir.path().join("train").join("out.txt")).unwrap();
        let test = std::fs::read_to_string(dir.path().join("test").join("out.txt")).unwrap();
        assert_eq!(train, "1\n3\n");
        assert_eq!(test, "2\n4\n");
    }

    #[test]
    fn test_to_file_requires_output() {
        let session = Session::default();
        let mut writer = ToFile::default();
        assert!(writer.initialize(&session).is_err());
    }

    #[test]
    fn test_to_file_rejects_bad_split_ratios() {
        let session = Session::default();
        let mut writer: ToFile = configured(&[
            "-o".to_string(),
            "out.txt".to_string(),
            "--split-ratios".to_string(),
            "60".to_string(),
            "30".to_string(),
            "--split-names".to_string(),
            "a".to_string(),
            "b".to_string(),
        ]);
        assert!(writer.initialize(&session).is_err());
    }
}
