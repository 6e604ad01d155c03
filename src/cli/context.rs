//! Shared plumbing for tracker commands: console output, logging, progress bars and the
//! project the current command run operates on.

use crate::api::GitHubClient;
use crate::cli::console::{strip_markup, ConsoleIo, LogSink};
use crate::cli::select;
use crate::db::ProjectRepository;
use crate::error::Result;
use crate::models::{Project, RateLimit};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::debug;

const PROGRESS_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Options parsed from the command line that commands read (and selection writes back).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandInput {
    /// `--project` / `-p`.
    pub project: Option<i64>,
}

/// State and services for one command run.
pub struct CommandContext {
    console: Box<dyn ConsoleIo>,
    logger: Box<dyn LogSink>,
    pub input: CommandInput,
    verbose: bool,
    use_progress_bar: bool,
    project: Option<Project>,
}

impl CommandContext {
    pub fn new(
        console: Box<dyn ConsoleIo>,
        logger: Box<dyn LogSink>,
        input: CommandInput,
        verbose: bool,
        use_progress_bar: bool,
    ) -> Self {
        Self {
            console,
            logger,
            input,
            verbose,
            use_progress_bar,
            project: None,
        }
    }

    /// Writes a line of markup to the console.
    pub fn out(&mut self, text: &str) -> Result<&mut Self> {
        self.console.write(text, true)?;
        Ok(self)
    }

    /// Writes markup without a trailing newline.
    pub fn out_inline(&mut self, text: &str) -> Result<&mut Self> {
        self.console.write(text, false)?;
        Ok(self)
    }

    /// Writes a line only in verbose mode.
    pub fn debug_out(&mut self, text: &str) -> Result<&mut Self> {
        if self.verbose {
            self.console.write(&format!("<comment>{}</comment>", text), true)?;
        }
        Ok(self)
    }

    /// Sends `text` to the logger with markup removed.
    pub fn log_out(&mut self, text: &str) -> &mut Self {
        self.logger.info(&strip_markup(text));
        self
    }

    /// Reports that an operation finished successfully.
    pub fn out_ok(&mut self) -> Result<&mut Self> {
        self.out("<ok>ok</ok>")
    }

    /// A progress bar counting up to `target`; hidden when progress bars are disabled.
    pub fn progress_bar(&self, target: u64) -> Result<ProgressBar> {
        if !self.use_progress_bar {
            return Ok(ProgressBar::with_draw_target(
                Some(target),
                ProgressDrawTarget::hidden(),
            ));
        }
        let bar = ProgressBar::new(target);
        bar.set_style(ProgressStyle::with_template(PROGRESS_TEMPLATE)?.progress_chars("#>-"));
        Ok(bar)
    }

    /// Prints the remaining GitHub API quota.
    pub async fn display_github_rate_limit(&mut self, github: &GitHubClient) -> Result<RateLimit> {
        let limit = github.rate_limit().await?;
        let resets = limit
            .reset_at()
            .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let style = if limit.is_exhausted() { "error" } else { "b" };

        self.out(&format!(
            "GitHub rate limit: <{style}>{}</{style}>/{} (resets at {})",
            limit.remaining, limit.limit, resets
        ))?;
        Ok(limit)
    }

    /// The project chosen by [`select_project`](Self::select_project), if any.
    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Determines the project this command run works on.
    ///
    /// Uses `--project` when given, otherwise asks the operator. The result is stored for
    /// the rest of the run and its id written back to [`CommandInput::project`]; later calls
    /// return it without querying or prompting again.
    pub async fn select_project<R: ProjectRepository>(&mut self, repository: &R) -> Result<Project> {
        if let Some(project) = &self.project {
            debug!("Project {} already selected for this run", project.id);
            return Ok(project.clone());
        }

        let projects = repository.load_projects().await?;
        let project = select::select_project(
            self.input.project,
            &projects,
            self.console.as_mut(),
            self.logger.as_ref(),
        )?;

        self.input.project = Some(project.id);
        self.project = Some(project.clone());
        Ok(project)
    }
}
