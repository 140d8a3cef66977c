use std::path::{Path, PathBuf};

use snafu::{ResultExt, Snafu};

pub const GUIDE_FILE_NAME: &str = "how_to_read_a_paper.txt";

const CONTEXT_PREAMBLE: &str = "You are a helpful assistant that assists users in reviewing \
and learning from papers. Please read the following paper in the pair of triple equal signs. \
After you're done, please use that paper for guiding the user in understanding in the \
papers the user submits.";

const GUIDE_FENCE: &str = "===";

/// Asset path next to this crate's sources.
pub fn default_guide_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("assets")
        .join(GUIDE_FILE_NAME)
}

/// Wraps the reading guide verbatim in the tutor instructions.
pub fn render_context(guide_text: &str) -> String {
    format!("{CONTEXT_PREAMBLE}\n\n{GUIDE_FENCE}\n{guide_text}\n{GUIDE_FENCE}\n")
}

/// Produces the seed system message from the static reading-guide asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBuilder {
    guide_path: PathBuf,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(default_guide_path())
    }
}

impl ContextBuilder {
    pub fn new(guide_path: impl Into<PathBuf>) -> Self {
        Self {
            guide_path: guide_path.into(),
        }
    }

    pub fn guide_path(&self) -> &Path {
        &self.guide_path
    }

    pub fn build_context(&self) -> ContextResult<String> {
        let guide_text =
            std::fs::read_to_string(&self.guide_path).context(ReadGuideSnafu {
                stage: "read-guide",
                path: self.guide_path.clone(),
            })?;

        tracing::debug!(
            path = ?self.guide_path,
            guide_bytes = guide_text.len(),
            "loaded reading guide"
        );

        Ok(render_context(&guide_text))
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ContextError {
    #[snafu(display("failed to read reading guide at {path:?} on `{stage}`: {source}"))]
    ReadGuide {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type ContextResult<T> = Result<T, ContextError>;

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn guide_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write guide");
        file
    }

    #[test]
    fn context_embeds_guide_verbatim_between_fences() {
        let file = guide_file("Read abstract first.");
        let context = ContextBuilder::new(file.path())
            .build_context()
            .expect("context should build");

        assert_eq!(context, render_context("Read abstract first."));
        assert!(context.starts_with(CONTEXT_PREAMBLE));
        assert!(context.contains("===\nRead abstract first.\n==="));
        assert!(context.contains(
            "guiding the user in understanding in the papers the user submits."
        ));
    }

    #[test]
    fn guide_whitespace_is_not_altered() {
        let guide = "  Pass 1:\n\tskim\n\n";
        let file = guide_file(guide);
        let context = ContextBuilder::new(file.path())
            .build_context()
            .expect("context should build");
        assert!(context.contains(guide));
    }

    #[test]
    fn rendering_is_deterministic() {
        assert_eq!(render_context("x"), render_context("x"));
        assert_ne!(render_context("x"), render_context("y"));
    }

    #[test]
    fn missing_guide_is_a_read_error() {
        let directory = tempfile::tempdir().expect("temp dir");
        let missing = directory.path().join(GUIDE_FILE_NAME);

        let result = ContextBuilder::new(&missing).build_context();
        assert!(matches!(
            result,
            Err(ContextError::ReadGuide { ref path, .. }) if *path == missing
        ));
    }

    #[test]
    fn bundled_guide_is_readable() {
        let builder = ContextBuilder::default();
        assert!(builder.guide_path().ends_with(GUIDE_FILE_NAME));
        assert!(builder.build_context().is_ok());
    }
}
