use std::ffi::OsString;
use std::path::{Path, PathBuf};

const DEFAULT_TITLE: &str = "Visualization output file";

/// legacy readers stop reading the title line after this many bytes
const MAX_TITLE_LEN: usize = 255;

/// Settings shared by every writer call.
///
/// All file names handed to a writer are resolved against `output_dir`. The directory must
/// already exist.
///
/// ```
/// let config = pvtk::WriteConfig::new("output").with_title("channel flow, t = 1.5");
/// assert_eq!(config.output_dir, std::path::PathBuf::from("output"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteConfig {
    pub output_dir: PathBuf,
    /// title line of legacy files
    pub title: String,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl WriteConfig {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_title<T: Into<String>>(mut self, title: T) -> Self {
        self.title = title.into();
        self
    }

    /// `output_dir/base.extension`. The extension is appended to the full base name so
    /// piece names such as `flow.x0x1x0` keep their dots.
    pub(crate) fn resolve<P: AsRef<Path>>(&self, base: P, extension: &str) -> PathBuf {
        self.output_dir.join(append_extension(base.as_ref(), extension))
    }

    /// the title as a single line that fits in a legacy header
    pub(crate) fn legacy_title(&self) -> String {
        let mut title: String = self
            .title
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();

        if title.len() > MAX_TITLE_LEN {
            let mut end = MAX_TITLE_LEN;
            while !title.is_char_boundary(end) {
                end -= 1;
            }
            title.truncate(end);
        }

        title
    }
}

pub(crate) fn append_extension(base: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}
