use super::CliError;
use anyhow::Context;
use globset::{Glob, GlobMatcher};
use std::fs;
use std::path::{Path, PathBuf};
use tauc_core::domain::{TaucError, TransitionKind};

pub(super) const DEFAULT_INPUT_PATTERN: &str = "*.txt";
pub(super) const DEFAULT_REPORT_NAME: &str = "bandgap-report.json";
const TABLE_SUFFIX: &str = "_out.txt";

const EXCLUDED_FILE_NAMES: &[&str] = &["requirements.txt"];
const GENERATED_SUFFIXES: &[&str] = &[
    TABLE_SUFFIX,
    "_direct_tauc.txt",
    "_indirect_tauc.txt",
    "_direct_fit.txt",
    "_indirect_fit.txt",
];

/// Output files derived from one input spectrum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ArtifactPaths {
    pub(super) table: PathBuf,
    output_dir: PathBuf,
    stem: String,
}

impl ArtifactPaths {
    pub(super) fn for_input(input: &Path, output_dir: Option<&Path>) -> Self {
        let stem = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "spectrum".to_string());
        let output_dir = output_dir
            .map(Path::to_path_buf)
            .or_else(|| input.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        Self {
            table: output_dir.join(format!("{stem}{TABLE_SUFFIX}")),
            output_dir,
            stem,
        }
    }

    pub(super) fn tauc(&self, kind: TransitionKind) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}_tauc.txt", self.stem, kind.as_str()))
    }

    pub(super) fn fit(&self, kind: TransitionKind) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}_fit.txt", self.stem, kind.as_str()))
    }

    pub(super) fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct SkippedInput {
    pub(super) path: PathBuf,
    pub(super) reason: &'static str,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(super) struct DiscoveredInputs {
    pub(super) pending: Vec<PathBuf>,
    pub(super) skipped: Vec<SkippedInput>,
}

#[derive(Debug, Clone)]
pub(super) struct BatchDiscovery {
    matcher: GlobMatcher,
    output_dir: Option<PathBuf>,
    force: bool,
}

impl BatchDiscovery {
    pub(super) fn new(
        pattern: &str,
        output_dir: Option<&Path>,
        force: bool,
    ) -> Result<Self, CliError> {
        let matcher = Glob::new(pattern)
            .map_err(|source| {
                CliError::Usage(format!("invalid input pattern '{}': {}", pattern, source))
            })?
            .compile_matcher();
        Ok(Self {
            matcher,
            output_dir: output_dir.map(Path::to_path_buf),
            force,
        })
    }

    /// Matching files directly inside `input_dir`, sorted by path.
    pub(super) fn discover(&self, input_dir: &Path) -> Result<DiscoveredInputs, CliError> {
        if !input_dir.is_dir() {
            return Err(CliError::Compute(TaucError::io_system(
                "IO.INPUT_DIR",
                format!("input directory '{}' does not exist", input_dir.display()),
            )));
        }

        let mut candidates = Vec::new();
        let entries = fs::read_dir(input_dir)
            .with_context(|| format!("failed to list input directory '{}'", input_dir.display()))?;
        for entry in entries {
            let entry = entry.with_context(|| {
                format!("failed to read entry in '{}'", input_dir.display())
            })?;
            let path = entry.path();
            if path.is_file() {
                candidates.push(path);
            }
        }
        candidates.sort();

        let mut discovered = DiscoveredInputs::default();
        for path in candidates {
            let Some(name) = path.file_name().map(|name| name.to_string_lossy().into_owned())
            else {
                continue;
            };
            if !self.matcher.is_match(&name) {
                continue;
            }
            match self.skip_reason(&path, &name) {
                Some(reason) => discovered.skipped.push(SkippedInput { path, reason }),
                None => discovered.pending.push(path),
            }
        }
        Ok(discovered)
    }

    fn skip_reason(&self, path: &Path, name: &str) -> Option<&'static str> {
        if EXCLUDED_FILE_NAMES.contains(&name) {
            return Some("excluded file name");
        }
        if is_generated_artifact(name) {
            return Some("generated output");
        }
        let table = ArtifactPaths::for_input(path, self.output_dir.as_deref()).table;
        if !self.force && table.exists() {
            return Some("already processed");
        }
        None
    }
}

pub(super) fn is_generated_artifact(name: &str) -> bool {
    GENERATED_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

pub(super) fn ensure_output_dir(path: &Path) -> Result<(), TaucError> {
    fs::create_dir_all(path).map_err(|source| {
        TaucError::io_system(
            "IO.OUTPUT_DIR",
            format!(
                "failed to create output directory '{}': {}",
                path.display(),
                source
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::{ArtifactPaths, BatchDiscovery, is_generated_artifact};
    use std::fs;
    use std::path::Path;
    use tauc_core::domain::TransitionKind;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "300,0.1\n").expect("file should be written");
    }

    #[test]
    fn artifact_paths_follow_input_stem() {
        let paths = ArtifactPaths::for_input(Path::new("data/TiO2.txt"), None);
        assert_eq!(paths.table, Path::new("data/TiO2_out.txt"));
        assert_eq!(
            paths.tauc(TransitionKind::Direct),
            Path::new("data/TiO2_direct_tauc.txt")
        );
        assert_eq!(
            paths.fit(TransitionKind::Indirect),
            Path::new("data/TiO2_indirect_fit.txt")
        );

        let redirected =
            ArtifactPaths::for_input(Path::new("data/TiO2.txt"), Some(Path::new("out")));
        assert_eq!(redirected.table, Path::new("out/TiO2_out.txt"));
        assert_eq!(redirected.output_dir(), Path::new("out"));
    }

    #[test]
    fn generated_outputs_are_recognized() {
        assert!(is_generated_artifact("ZnO_out.txt"));
        assert!(is_generated_artifact("ZnO_indirect_tauc.txt"));
        assert!(!is_generated_artifact("ZnO.txt"));
        assert!(!is_generated_artifact("output.txt"));
    }

    #[test]
    fn discovery_skips_outputs_requirements_and_processed_inputs() {
        let temp = TempDir::new().expect("tempdir should be created");
        let dir = temp.path();
        for name in [
            "b.txt",
            "a.txt",
            "done.txt",
            "done_out.txt",
            "requirements.txt",
            "notes.csv",
        ] {
            touch(dir, name);
        }

        let discovered = BatchDiscovery::new("*.txt", None, false)
            .expect("discovery")
            .discover(dir)
            .expect("discover should succeed");
        assert_eq!(discovered.pending, vec![dir.join("a.txt"), dir.join("b.txt")]);
        let skipped: Vec<(&str, &str)> = discovered
            .skipped
            .iter()
            .map(|skip| {
                (
                    skip.path.file_name().and_then(|name| name.to_str()).unwrap_or(""),
                    skip.reason,
                )
            })
            .collect();
        assert_eq!(
            skipped,
            vec![
                ("done.txt", "already processed"),
                ("done_out.txt", "generated output"),
                ("requirements.txt", "excluded file name"),
            ]
        );
    }

    #[test]
    fn force_reprocesses_inputs_with_existing_outputs() {
        let temp = TempDir::new().expect("tempdir should be created");
        touch(temp.path(), "done.txt");
        touch(temp.path(), "done_out.txt");

        let discovered = BatchDiscovery::new("*.txt", None, true)
            .expect("discovery")
            .discover(temp.path())
            .expect("discover should succeed");
        assert_eq!(discovered.pending, vec![temp.path().join("done.txt")]);
    }

    #[test]
    fn missing_directory_and_bad_pattern_are_errors() {
        let temp = TempDir::new().expect("tempdir should be created");
        let discovery = BatchDiscovery::new("*.txt", None, false).expect("discovery");
        assert!(discovery.discover(&temp.path().join("missing")).is_err());
        assert!(BatchDiscovery::new("[unclosed", None, false).is_err());
    }
}
