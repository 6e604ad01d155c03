use crate::api::GitHubClient;
use crate::cli::context::{CommandContext, CommandInput};
use crate::cli::console::{Terminal, TracingLog};
use crate::config::Settings;
use crate::db::{Database, ProjectStore};
use crate::error::{AppError, Result};
use crate::models::NewProject;
use clap::{Args, Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use dialoguer::{theme::ColorfulTheme, Input};
use tracing::{error, info};

/// Command-line companion for the issue tracker
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Id of the project to operate on; skips the selection prompt
    #[arg(short, long, global = true)]
    pub project: Option<i64>,

    /// Print additional debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Do not display progress bars
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Do not use colors in console output
    #[arg(long, global = true)]
    pub no_colors: bool,

    /// Command to run; without one an interactive menu is shown
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create the projects table
    InitDb,

    /// Register a tracked project
    AddProject(AddProjectArgs),

    /// List tracked projects
    Projects {
        /// Print the projects as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Select the project to work on (by --project or interactively)
    Select,

    /// Display the GitHub API rate limit
    RateLimit,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AddProjectArgs {
    /// Project title
    #[arg(short, long)]
    pub title: String,

    /// GitHub owner (user or organisation)
    #[arg(long)]
    pub gh_user: Option<String>,

    /// GitHub repository name
    #[arg(long)]
    pub gh_project: Option<String>,
}

impl From<AddProjectArgs> for NewProject {
    fn from(args: AddProjectArgs) -> Self {
        Self {
            title: args.title,
            github_owner: args.gh_user,
            github_repo: args.gh_project,
        }
    }
}

/// Entries of the interactive main menu, in display order.
pub const MENU_ITEMS: [&str; 6] = [
    "Initialize Database Schema",
    "Add Project",
    "List Projects",
    "Select Project",
    "Display GitHub Rate Limit",
    "Exit",
];

/// CLI application
pub struct App<S: ProjectStore> {
    store: S,
    github: GitHubClient,
    settings: Settings,
}

impl App<Database> {
    /// Connects to the database described by `settings`.
    pub async fn connect(settings: Settings) -> Result<Self> {
        let db = Database::new(&settings.database_url, &settings.projects_table()).await?;
        Ok(Self::new(db, settings))
    }
}

impl<S: ProjectStore> App<S> {
    pub fn new(store: S, settings: Settings) -> Self {
        let github = GitHubClient::new(&settings.github_api_url, settings.github_token.clone());
        Self {
            store,
            github,
            settings,
        }
    }

    /// A context for one command run on the real terminal.
    pub fn context(&self, cli: &Cli) -> CommandContext {
        CommandContext::new(
            Box::new(Terminal::new(!cli.no_colors)),
            Box::new(TracingLog),
            CommandInput {
                project: cli.project,
            },
            cli.verbose,
            self.settings.use_progress_bar && !cli.no_progress,
        )
    }

    /// Runs `command`. Aborts are reported on the console and turned into `Ok`.
    pub async fn run_command(&self, command: Commands, ctx: &mut CommandContext) -> Result<()> {
        info!("Running command {:?}", command);
        let result = match command {
            Commands::InitDb => self.init_db(ctx).await,
            Commands::AddProject(args) => self.add_project(ctx, args.into()).await,
            Commands::Projects { json } => self.list_projects(ctx, json).await,
            Commands::Select => self.select(ctx).await,
            Commands::RateLimit => self.rate_limit(ctx).await,
        };
        finish_command(ctx, result)
    }

    async fn init_db(&self, ctx: &mut CommandContext) -> Result<()> {
        ctx.out_inline("Creating projects table... ")?;
        self.store.init_schema().await?;
        ctx.out_ok()?;
        ctx.log_out("Projects table is ready");
        Ok(())
    }

    async fn add_project(&self, ctx: &mut CommandContext, project: NewProject) -> Result<()> {
        if project.title.trim().is_empty() {
            return Err(AppError::Cli("Project title must not be empty".to_string()));
        }

        let created = self.store.add_project(&project).await?;
        ctx.out(&format!(
            "Added project <b>{}</b> (id: {})",
            created.title, created.id
        ))?;
        if !created.is_selectable() {
            ctx.out("<comment>No GitHub linkage: the project will not be offered in the selection menu.</comment>")?;
        }
        ctx.log_out(&format!(
            "Added project <info>{}</info> with id {}",
            created.title, created.id
        ));
        Ok(())
    }

    async fn list_projects(&self, ctx: &mut CommandContext, json: bool) -> Result<()> {
        if !self.store.is_schema_initialized().await? {
            ctx.out("<comment>The projects table does not exist yet. Run `init-db` first.</comment>")?;
            return Ok(());
        }

        let projects = self.store.load_projects().await?;

        if json {
            ctx.out(&serde_json::to_string_pretty(&projects)?)?;
            return Ok(());
        }

        if projects.is_empty() {
            ctx.out("No projects found.")?;
            return Ok(());
        }

        let bar = ctx.progress_bar(projects.len() as u64)?;
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_header(vec!["ID", "Title", "GitHub", "Selectable"]);

        for project in &projects {
            bar.set_message(project.title.clone());
            table.add_row(vec![
                project.id.to_string(),
                project.title.clone(),
                project.github_slug().unwrap_or_else(|| "-".to_string()),
                if project.is_selectable() { "yes" } else { "no" }.to_string(),
            ]);
            bar.inc(1);
        }
        bar.finish_and_clear();

        ctx.out(&table.to_string())?;
        let selectable = projects.iter().filter(|p| p.is_selectable()).count();
        ctx.debug_out(&format!(
            "{} of {} projects are selectable",
            selectable,
            projects.len()
        ))?;
        Ok(())
    }

    async fn select(&self, ctx: &mut CommandContext) -> Result<()> {
        let project = ctx.select_project(&self.store).await?;

        ctx.out("")?.out(&format!(
            "Selected project: <b>{}</b> (id: {})",
            project.title, project.id
        ))?;
        if let Some(slug) = project.github_slug() {
            ctx.out(&format!("GitHub repository: <info>{}</info>", slug))?;
        }
        ctx.out_ok()?;
        Ok(())
    }

    async fn rate_limit(&self, ctx: &mut CommandContext) -> Result<()> {
        ctx.display_github_rate_limit(&self.github).await?;
        Ok(())
    }
}

/// Aborts end the command cleanly with a notice; every other error is passed on.
pub fn finish_command(ctx: &mut CommandContext, result: Result<()>) -> Result<()> {
    match result {
        Err(e) if e.is_abort() => {
            info!("Command aborted: {}", e);
            ctx.out("")?
                .out(&format!("<comment>Process aborted: {}</comment>", e))?;
            Ok(())
        },
        Err(e) => {
            error!("Command failed: {}", e);
            Err(e)
        },
        Ok(()) => Ok(()),
    }
}

/// Maps a main-menu position to a command, asking for extra input where needed.
///
/// `None` means "Exit".
pub fn menu_command(selection: usize) -> Result<Option<Commands>> {
    let command = match selection {
        0 => Commands::InitDb,
        1 => Commands::AddProject(prompt_new_project()?),
        2 => Commands::Projects { json: false },
        3 => Commands::Select,
        4 => Commands::RateLimit,
        _ => return Ok(None),
    };
    Ok(Some(command))
}

/// Asks for the fields of a new project.
pub fn prompt_new_project() -> Result<AddProjectArgs> {
    let theme = ColorfulTheme::default();
    let title: String = Input::with_theme(&theme)
        .with_prompt("Project title")
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            if input.trim().is_empty() {
                Err("The title must not be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    let gh_user: String = Input::with_theme(&theme)
        .with_prompt("GitHub owner (leave empty for none)")
        .allow_empty(true)
        .interact_text()?;
    let gh_project: String = Input::with_theme(&theme)
        .with_prompt("GitHub repository (leave empty for none)")
        .allow_empty(true)
        .interact_text()?;

    let optional = |s: String| (!s.trim().is_empty()).then_some(s);
    Ok(AddProjectArgs {
        title,
        gh_user: optional(gh_user),
        gh_project: optional(gh_project),
    })
}
