//! Provides PostgreSQL database interaction functionalities using `sqlx`.
//!
//! Includes establishing the connection pool, creating the projects table and reading the
//! tracked projects that commands operate on.
//! Also contains integration tests for database operations (requires the `integration-tests` feature).

use crate::error::{AppError, Result};
use crate::models::{NewProject, Project, ProjectRow};
use sqlx::{
    postgres::{PgPoolOptions, PgRow},
    Pool, Postgres, Row,
};
use tracing::{debug, error, info};

/// Read-only source of candidate projects for selection.
///
/// The list is fetched fresh on every call; implementations must not cache it.
#[allow(async_fn_in_trait)]
pub trait ProjectRepository {
    async fn load_projects(&self) -> Result<Vec<Project>>;
}

/// Write side used by the setup commands.
#[allow(async_fn_in_trait)]
pub trait ProjectStore: ProjectRepository {
    /// Whether the projects table exists.
    async fn is_schema_initialized(&self) -> Result<bool>;

    /// Creates the projects table if it does not exist yet.
    async fn init_schema(&self) -> Result<()>;

    /// Inserts a project and returns it with its generated id.
    async fn add_project(&self, project: &NewProject) -> Result<Project>;
}

/// Represents the database connection pool and provides methods for database operations.
///
/// Holds a `sqlx::Pool` for efficient connection management.
pub struct Database {
    pool: Pool<Postgres>,
    /// Fully prefixed projects table name. Validated by `Settings` before it gets here.
    projects_table: String,
}

impl Database {
    /// Creates a new `Database` instance by establishing a connection pool.
    ///
    /// # Arguments
    ///
    /// * `database_url` - The connection string for the PostgreSQL database.
    /// * `projects_table` - The projects table name, prefix included.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the connection pool cannot be established.
    pub async fn new(database_url: &str, projects_table: &str) -> Result<Self> {
        info!("Connecting to database...");

        // Commands are short-lived and sequential; a small pool is plenty.
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(database_url)
            .await
            .map_err(|e| {
                error!("Failed to connect to database: {}", e);
                AppError::Db(e.into())
            })?;

        info!("Connected to database successfully");
        Ok(Self {
            pool,
            projects_table: projects_table.to_string(),
        })
    }
}

impl ProjectRepository for Database {
    /// Reads `project_id, title, gh_user, gh_project` for every tracked project, ordered by id.
    async fn load_projects(&self) -> Result<Vec<Project>> {
        debug!("Loading projects from {}", self.projects_table);

        // project_id is cast so INTEGER and BIGINT columns both decode as i64.
        let query = format!(
            "SELECT project_id::BIGINT, title, gh_user, gh_project FROM {} ORDER BY project_id",
            self.projects_table
        );

        let rows = sqlx::query_as::<_, ProjectRow>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to load projects from {}: {}", self.projects_table, e);
                AppError::Db(e.into())
            })?;

        debug!("Loaded {} projects", rows.len());
        Ok(rows.into_iter().map(Project::from).collect())
    }
}

/// Decodes the boolean in the first column of an `EXISTS` query.
fn existence_flag(row: &PgRow) -> Result<bool> {
    row.try_get::<bool, _>(0).map_err(|e| {
        error!("Failed to decode schema existence flag: {}", e);
        AppError::Db(e.into())
    })
}

impl ProjectStore for Database {
    /// Checks if the projects table exists in the current schema.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query to `information_schema.tables` fails.
    async fn is_schema_initialized(&self) -> Result<bool> {
        debug!("Checking if {} exists...", self.projects_table);
        let result = sqlx::query(
            "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_schema = current_schema() AND table_name = $1)",
        )
        .bind(&self.projects_table)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to check schema existence: {}", e);
            AppError::Db(e.into())
        })?;
        let initialized = existence_flag(&result)?;
        debug!("Schema initialized status: {}", initialized);
        Ok(initialized)
    }

    /// Creates the projects table if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the SQL statement fails.
    async fn init_schema(&self) -> Result<()> {
        info!(
            "Initializing database schema (if necessary) for {}...",
            self.projects_table
        );

        let query = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                project_id SERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                gh_user TEXT,
                gh_project TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            self.projects_table
        );

        sqlx::query(&query)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to create {} table: {}", self.projects_table, e);
                AppError::Db(e.into())
            })?;

        info!("Database schema initialized successfully");
        Ok(())
    }

    /// Inserts a project and returns it with its generated id.
    ///
    /// Blank GitHub fields are stored as NULL.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails (e.g. the table does not exist).
    async fn add_project(&self, project: &NewProject) -> Result<Project> {
        info!("Adding project '{}'", project.title);

        let blank_to_null = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let query = format!(
            r#"
            INSERT INTO {} (title, gh_user, gh_project)
            VALUES ($1, $2, $3)
            RETURNING project_id::BIGINT, title, gh_user, gh_project
            "#,
            self.projects_table
        );

        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(&project.title)
            .bind(blank_to_null(&project.github_owner))
            .bind(blank_to_null(&project.github_repo))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to insert project '{}': {}", project.title, e);
                AppError::Db(e.into())
            })?;

        let created = Project::from(row);
        info!("Added project {} with id {}", created.title, created.id);
        Ok(created)
    }
}

// --- Integration Tests ---
// These tests interact with a real PostgreSQL database.
// They are gated by the `integration-tests` feature flag.
// Run using: `cargo test --features integration-tests`
// Requires a running PostgreSQL instance configured via DATABASE_URL env var.
#[cfg(test)]
#[cfg(feature = "integration-tests")]
mod tests {
    use super::*;
    use sqlx::PgPool; // PgPool is injected by #[sqlx::test]

    fn database(pool: PgPool) -> Database {
        Database {
            pool,
            projects_table: "tracker_projects".to_string(),
        }
    }

    fn new_project(title: &str, owner: Option<&str>, repo: Option<&str>) -> NewProject {
        NewProject {
            title: title.to_string(),
            github_owner: owner.map(str::to_string),
            github_repo: repo.map(str::to_string),
        }
    }

    #[sqlx::test]
    async fn test_init_schema(pool: PgPool) -> Result<()> {
        let db = database(pool);
        assert!(
            !db.is_schema_initialized().await?,
            "Schema should not be initialized initially"
        );
        db.init_schema().await?;
        assert!(
            db.is_schema_initialized().await?,
            "Schema should be initialized after calling init_schema"
        );
        // Idempotent
        db.init_schema().await?;
        Ok(())
    }

    #[sqlx::test]
    async fn test_existence_flag_rejects_null(pool: PgPool) -> Result<()> {
        let row = sqlx::query("SELECT NULL::BOOLEAN").fetch_one(&pool).await?;
        assert!(matches!(existence_flag(&row), Err(AppError::Db(_))));

        let row = sqlx::query("SELECT TRUE").fetch_one(&pool).await?;
        assert!(existence_flag(&row)?);
        Ok(())
    }

    #[sqlx::test]
    async fn test_add_and_load_projects(pool: PgPool) -> Result<()> {
        let db = database(pool);
        db.init_schema().await?;

        let cms = db
            .add_project(&new_project("Joomla! CMS", Some("joomla"), Some("joomla-cms")))
            .await?;
        let local = db
            .add_project(&new_project("Local only", Some("  "), None))
            .await?;

        assert!(cms.is_selectable());
        assert_eq!(local.github_owner, "", "Blank owner should be stored as NULL");
        assert!(!local.is_selectable());

        let projects = db.load_projects().await?;
        assert_eq!(projects, vec![cms, local], "Projects should come back in id order");
        Ok(())
    }

    #[sqlx::test]
    async fn test_load_projects_without_table(pool: PgPool) -> Result<()> {
        let db = database(pool);
        let result = db.load_projects().await;
        assert!(matches!(result, Err(AppError::Db(_))));
        Ok(())
    }
}
