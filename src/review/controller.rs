//! Top-level sequencing of a review run.
//!
//! ```text
//! Init -> [StarterKitCheck] -> Selecting -> PerUnitLoop -> PostCheck -> Done
//! ```
//!
//! A failing starter kit check ends the run immediately. The post-check runs
//! even when nothing was selected, and its failure fails the build regardless
//! of the unit results.

use super::builder::CommandLineBuilder;
use super::executor::execute;
use super::report::{ReportBuffer, ReportRenderer};
use super::BuildResult;
use crate::checks::{CheckRegistry, Invocation};
use crate::discovery::{Discovery, Section};
use crate::properties::{CHECK_STARTER_KIT, PropertyBag};
use crate::qa_config::ReviewSection;
use crate::select::{CHECK_PROMPT, NonInteractive, Selector, UNIT_PROMPT, select_from};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;

/// Per-run switches from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewOptions {
    pub section: Section,
    /// Prompt for the checks to run instead of running all of them
    pub select_checks: bool,
    /// Never prompt; select everything
    pub non_interactive: bool,
}

pub struct ReviewController<'a, W: Write + Send + 'static> {
    registry: &'a CheckRegistry,
    properties: PropertyBag,
    review: ReviewSection,
    discovery: Discovery,
    project_dir: PathBuf,
    cwd: PathBuf,
    selector: Box<dyn Selector>,
    out: W,
}

impl<'a, W: Write + Send + 'static> ReviewController<'a, W> {
    pub fn new(
        registry: &'a CheckRegistry,
        properties: PropertyBag,
        review: ReviewSection,
        project_dir: PathBuf,
        selector: Box<dyn Selector>,
        out: W,
    ) -> Self {
        let discovery = Discovery::from_section(&review);
        Self {
            registry,
            properties,
            review,
            discovery,
            cwd: project_dir.clone(),
            project_dir,
            selector,
            out,
        }
    }

    /// Directory report titles are made relative to. Defaults to the project
    /// directory.
    pub fn with_cwd(mut self, cwd: PathBuf) -> Self {
        self.cwd = cwd;
        self
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub async fn run(&mut self, options: ReviewOptions) -> Result<BuildResult> {
        tracing::info!(section = ?options.section, "starting review");

        if self.properties.is_enabled(CHECK_STARTER_KIT) {
            let starter_kit = Invocation::bare(&self.review.starter_kit_check);
            if execute(self.registry, &[starter_kit], &mut self.out).await? {
                tracing::info!(check = %self.review.starter_kit_check, "starter kit check failed");
                return Ok(BuildResult::Failed);
            }
        }

        let mut unattended = NonInteractive;
        let selector: &mut dyn Selector = if options.non_interactive {
            &mut unattended
        } else {
            self.selector.as_mut()
        };

        let excluded = self.review.all_excluded_checks();
        let mut checks = self.registry.reviewable(&excluded);
        if options.select_checks {
            checks = select_from(selector, CHECK_PROMPT, checks, |c| c.name().to_string())?;
        }

        let units = self
            .discovery
            .options(options.section, &self.properties, &self.project_dir)?;
        let renderer = ReportRenderer::for_units(&units, &self.cwd, self.review.ruler_min);
        let selected = select_from(selector, UNIT_PROMPT, units, |u| u.name.clone())?;
        tracing::debug!(units = selected.len(), checks = checks.len(), "selection made");

        let builder = CommandLineBuilder::new(&self.properties, &self.discovery)
            .keep_unmatched(self.review.keep_unmatched_checks);
        let mut buffer = ReportBuffer::new();
        let mut failed = false;

        for unit in &selected {
            let invocations = builder.build(&unit.path, &checks)?;
            if execute(self.registry, &invocations, &mut buffer).await? {
                failed = true;
            }
            renderer
                .render(&buffer.fetch(), unit.directory(), &mut self.out)
                .context("Failed to write report")?;
        }

        let post_check = Invocation::bare(&self.review.post_check);
        if execute(self.registry, &[post_check], &mut self.out).await? {
            tracing::info!(check = %self.review.post_check, "post-check failed");
            return Ok(BuildResult::Failed);
        }

        tracing::info!(failed, "review finished");
        Ok(BuildResult::from_failed(failed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::testing::{FakeCheck, Journal, journal};
    use crate::select::tests::ScriptedSelector;
    use std::fs;
    use std::path::Path;
    use tempfile::{TempDir, tempdir};

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    /// `lib/modules/{mod_a,mod_b}` plus `mod_a/sub` and one manifest.
    fn project() -> TempDir {
        let dir = tempdir().unwrap();
        touch(dir.path(), "lib/modules/mod_a/mod_a.info");
        touch(dir.path(), "lib/modules/mod_a/sub/sub.info");
        touch(dir.path(), "lib/modules/mod_b/mod_b.info");
        touch(dir.path(), "resources/site.make");
        dir
    }

    fn properties(check_ssk: bool) -> PropertyBag {
        let mut values = vec![
            ("lib.dir", "lib"),
            ("theme.dir", "lib"),
            ("resources.dir", "resources"),
            ("phpcs.config", "phpcs.xml"),
            ("profile", "standard"),
            ("project.basedir", "/proj"),
        ];
        if check_ssk {
            values.push((CHECK_STARTER_KIT, "true"));
        }
        values
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn registry(checks: Vec<FakeCheck>) -> CheckRegistry {
        let mut registry = CheckRegistry::new();
        for check in checks {
            registry.register(Box::new(check)).unwrap();
        }
        registry
    }

    fn ran(log: &Journal) -> Vec<String> {
        log.lock().unwrap().iter().map(|i| i.check.clone()).collect()
    }

    fn controller<'a>(
        registry: &'a CheckRegistry,
        dir: &TempDir,
        check_ssk: bool,
        selector: Box<dyn Selector>,
    ) -> ReviewController<'a, Vec<u8>> {
        let root = dir.path().canonicalize().unwrap();
        ReviewController::new(
            registry,
            properties(check_ssk),
            ReviewSection::default(),
            root.clone(),
            selector,
            Vec::new(),
        )
        .with_cwd(root)
    }

    fn unattended() -> ReviewOptions {
        ReviewOptions {
            non_interactive: true,
            ..ReviewOptions::default()
        }
    }

    #[tokio::test]
    async fn test_clean_run_passes_and_reviews_every_unit() {
        let dir = project();
        let log = journal();
        let registry = registry(vec![
            FakeCheck::passing("lint").accepting(&["directory"]).recording(&log),
            FakeCheck::passing("theme:conflict").recording(&log),
        ]);

        let mut review = controller(&registry, &dir, false, Box::new(NonInteractive));
        let result = review.run(unattended()).await.unwrap();

        assert_eq!(result, BuildResult::Passed);
        assert_eq!(ran(&log), vec!["lint", "lint", "lint", "lint", "theme:conflict"]);
    }

    #[tokio::test]
    async fn test_unit_failure_fails_build_but_post_check_still_runs() {
        let dir = project();
        let log = journal();
        let registry = registry(vec![
            FakeCheck::failing("lint", 1).recording(&log),
            FakeCheck::passing("theme:conflict").recording(&log),
        ]);

        let mut review = controller(&registry, &dir, false, Box::new(NonInteractive));
        let result = review.run(unattended()).await.unwrap();

        assert_eq!(result, BuildResult::Failed);
        assert_eq!(ran(&log).last().unwrap(), "theme:conflict");
    }

    #[tokio::test]
    async fn test_post_check_failure_fails_clean_run() {
        let dir = project();
        let registry = registry(vec![
            FakeCheck::passing("lint"),
            FakeCheck::failing("theme:conflict", 1),
        ]);

        let mut review = controller(&registry, &dir, false, Box::new(NonInteractive));
        assert_eq!(review.run(unattended()).await.unwrap(), BuildResult::Failed);
    }

    #[tokio::test]
    async fn test_post_check_runs_with_nothing_discovered() {
        let dir = tempdir().unwrap();
        let log = journal();
        let registry = registry(vec![
            FakeCheck::passing("lint").recording(&log),
            FakeCheck::passing("theme:conflict").recording(&log),
        ]);

        let mut review = controller(&registry, &dir, false, Box::new(NonInteractive));
        assert_eq!(review.run(unattended()).await.unwrap(), BuildResult::Passed);
        assert_eq!(ran(&log), vec!["theme:conflict"]);
    }

    #[tokio::test]
    async fn test_starter_kit_failure_short_circuits() {
        let dir = project();
        let log = journal();
        let registry = registry(vec![
            FakeCheck::failing("check:ssk", 1).recording(&log),
            FakeCheck::passing("lint").recording(&log),
            FakeCheck::passing("theme:conflict").recording(&log),
        ]);

        let mut review = controller(&registry, &dir, true, Box::new(NonInteractive));
        assert_eq!(review.run(unattended()).await.unwrap(), BuildResult::Failed);
        assert_eq!(ran(&log), vec!["check:ssk"]);
    }

    #[tokio::test]
    async fn test_passing_starter_kit_is_not_reviewed_per_unit() {
        let dir = project();
        let log = journal();
        let registry = registry(vec![
            FakeCheck::passing("check:ssk").recording(&log),
            FakeCheck::passing("theme:conflict").recording(&log),
        ]);

        let mut review = controller(&registry, &dir, true, Box::new(NonInteractive));
        assert_eq!(review.run(unattended()).await.unwrap(), BuildResult::Passed);
        // The starter kit check is never part of a unit batch.
        assert_eq!(ran(&log), vec!["check:ssk", "theme:conflict"]);
    }

    #[tokio::test]
    async fn test_missing_post_check_is_fatal() {
        let dir = project();
        let registry = registry(vec![FakeCheck::passing("lint")]);

        let mut review = controller(&registry, &dir, false, Box::new(NonInteractive));
        let err = review.run(unattended()).await.unwrap_err();
        assert!(err.to_string().contains("theme:conflict"));
    }

    #[tokio::test]
    async fn test_targeted_selection_and_report_sections() {
        let dir = project();
        let log = journal();
        let registry = registry(vec![
            FakeCheck::failing("lint", 1)
                .accepting(&["directory", "exclude-dirs"])
                .printing("lint: 1 error\n")
                .recording(&log),
            FakeCheck::passing("theme:conflict"),
        ]);

        // Options: [Select all, site.make, mod_a.info, sub.info, mod_b.info]
        let selector = ScriptedSelector::new(vec![vec![2]]);
        let mut review = controller(&registry, &dir, false, Box::new(selector));
        let result = review.run(ReviewOptions::default()).await.unwrap();
        assert_eq!(result, BuildResult::Failed);

        let calls = log.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        let root = dir.path().canonicalize().unwrap();
        let expected_dir = root.join("lib/modules/mod_a").to_string_lossy().to_string();
        assert_eq!(calls[0].arg("directory"), Some(expected_dir.as_str()));
        assert_eq!(calls[0].arg("exclude-dirs"), Some("sub"));

        let out = console::strip_ansi_codes(&String::from_utf8(review.into_output()).unwrap())
            .to_string();
        assert!(out.contains("\n./lib/modules/mod_a\n"));
        assert!(out.contains("lint: 1 error\n"));
        assert!(!out.contains("mod_b"));
    }

    #[tokio::test]
    async fn test_each_section_holds_only_its_own_unit_output() {
        let dir = project();
        let root = dir.path().canonicalize().unwrap();
        let registry = registry(vec![
            FakeCheck::passing("lint").accepting(&["directory"]).echoing(),
            FakeCheck::passing("theme:conflict"),
        ]);

        let mut review = controller(&registry, &dir, false, Box::new(NonInteractive));
        review.run(unattended()).await.unwrap();
        let out = console::strip_ansi_codes(&String::from_utf8(review.into_output()).unwrap())
            .to_string();

        // "\n<ruler>\n<title>\n<ruler>\n<content>" per unit.
        let ruler = format!("\n{}\n", "=".repeat(80));
        let pieces: Vec<&str> = out.split(ruler.as_str()).collect();
        assert_eq!(pieces[0], "");
        let sections: Vec<(&str, &str)> = pieces[1..]
            .chunks(2)
            .map(|pair| (pair[0], pair[1]))
            .collect();

        let titles: Vec<&str> = sections.iter().map(|(title, _)| *title).collect();
        assert_eq!(
            titles,
            vec![
                "./resources",
                "./lib/modules/mod_a",
                "./lib/modules/mod_a/sub",
                "./lib/modules/mod_b",
            ]
        );
        for (title, content) in sections {
            let unit_dir = root.join(title.trim_start_matches("./"));
            assert_eq!(content, format!("lint directory={}\n", unit_dir.display()));
        }
    }

    #[tokio::test]
    async fn test_select_checks_limits_per_unit_batch() {
        let dir = project();
        let log = journal();
        let registry = registry(vec![
            FakeCheck::passing("phpcs").recording(&log),
            FakeCheck::passing("scan:todo").recording(&log),
            FakeCheck::passing("theme:conflict").recording(&log),
        ]);

        // First prompt picks checks ([Select all, phpcs, scan:todo]), second picks units.
        let selector = ScriptedSelector::new(vec![vec![2], vec![1]]);
        let mut review = controller(&registry, &dir, false, Box::new(selector));
        let options = ReviewOptions {
            select_checks: true,
            ..ReviewOptions::default()
        };
        assert_eq!(review.run(options).await.unwrap(), BuildResult::Passed);
        assert_eq!(ran(&log), vec!["scan:todo", "theme:conflict"]);
    }

    #[tokio::test]
    async fn test_quiet_units_produce_no_sections() {
        let dir = project();
        let registry = registry(vec![
            FakeCheck::passing("lint"),
            FakeCheck::passing("theme:conflict"),
        ]);

        let mut review = controller(&registry, &dir, false, Box::new(NonInteractive));
        review.run(unattended()).await.unwrap();
        assert!(review.into_output().is_empty());
    }

    #[tokio::test]
    async fn test_theme_section_reviews_only_themes() {
        let dir = project();
        touch(dir.path(), "lib/themes/ec_europa/ec_europa.info");
        let log = journal();
        let registry = registry(vec![
            FakeCheck::passing("lint").accepting(&["filename"]).recording(&log),
            FakeCheck::passing("theme:conflict"),
        ]);

        let mut review = controller(&registry, &dir, false, Box::new(NonInteractive));
        let options = ReviewOptions {
            section: Section::Theme,
            non_interactive: true,
            ..ReviewOptions::default()
        };
        review.run(options).await.unwrap();

        let calls = log.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].arg("filename"), Some("ec_europa"));
    }
}
