use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::client::{ClientError, TaskManager};
use crate::filters::Filter;
use crate::models::Task;
use crate::utils::parse_deadline;

#[derive(Parser)]
#[command(name = "taskline")]
#[command(about = "Single-user task tracker: REST server plus a client CLI")]
#[command(version)]
pub struct Cli {
    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    /// Base URL of the server, for the client commands
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    pub url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the REST server
    Serve {
        /// Port to listen on (overrides the config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// List tasks, optionally through a named filter
    List {
        /// Filter name: important, today, nextweek, private, shared, project=<name>
        #[arg(long)]
        filter: Option<String>,
    },
    /// Add a new task
    Add {
        /// Task description
        description: String,
        /// Mark the task as important
        #[arg(long)]
        important: bool,
        /// Mark the task as private
        #[arg(long)]
        private: bool,
        /// Deadline (YYYY-MM-DD or YYYY-MM-DDTHH:MM, UTC)
        #[arg(long)]
        deadline: Option<String>,
        /// Project label
        #[arg(long)]
        project: Option<String>,
    },
    /// Replace the fields of an existing task
    Update {
        /// Task id
        id: i64,
        /// New description
        description: String,
        /// Mark the task as important
        #[arg(long)]
        important: bool,
        /// Mark the task as private
        #[arg(long)]
        private: bool,
        /// Deadline (YYYY-MM-DD or YYYY-MM-DDTHH:MM, UTC)
        #[arg(long)]
        deadline: Option<String>,
        /// Project label
        #[arg(long)]
        project: Option<String>,
    },
    /// Delete a task
    Delete {
        /// Task id
        id: i64,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Server request failed: {0}")]
    ClientError(#[from] ClientError),
    #[error("Failed to parse deadline: {0}")]
    DeadlineParseError(String),
}

fn build_task(
    description: String,
    important: bool,
    private: bool,
    deadline: Option<String>,
    project: Option<String>,
) -> Result<Task, CliError> {
    let deadline = deadline
        .map(|raw| parse_deadline(&raw).map_err(CliError::DeadlineParseError))
        .transpose()?;

    let mut task = Task::new(description);
    task.important = important;
    task.private = private;
    task.deadline = deadline;
    task.project = project;
    Ok(task)
}

fn print_task(task: &Task) {
    let mut line = match task.id {
        Some(id) => format!("[{}] {}", id, task.description),
        None => task.description.clone(),
    };
    if task.important {
        line.push_str(" (important)");
    }
    if task.private {
        line.push_str(" (private)");
    }
    if let Some(deadline) = task.deadline {
        line.push_str(&format!(" due {}", deadline.format("%Y-%m-%d %H:%M")));
    }
    if let Some(project) = &task.project {
        line.push_str(&format!(" #{}", project));
    }
    println!("{}", line);
}

/// Handle the list command: fetch everything, then view through the
/// requested filter over the client-side cache
pub async fn handle_list(
    filter: Option<String>,
    manager: &mut TaskManager,
) -> Result<(), CliError> {
    manager.get_all_tasks().await?;

    let tasks = match filter.as_deref().and_then(Filter::parse) {
        Some(Filter::Important) => manager.important(),
        Some(Filter::Today) => manager.today(),
        Some(Filter::NextWeek) => manager.next_week(),
        Some(Filter::Private) => manager.private_tasks(),
        Some(Filter::Shared) => manager.shared(),
        Some(Filter::Project(name)) => manager.by_project(&name),
        None => manager.tasks().to_vec(),
    };

    if tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    for task in &tasks {
        print_task(task);
    }

    let projects = manager.projects();
    if !projects.is_empty() {
        println!("Projects: {}", projects.join(", "));
    }

    Ok(())
}

/// Handle the add command
pub async fn handle_add(
    description: String,
    important: bool,
    private: bool,
    deadline: Option<String>,
    project: Option<String>,
    manager: &TaskManager,
) -> Result<(), CliError> {
    let task = build_task(description, important, private, deadline, project)?;
    let id = manager.add_task(&task).await?;
    println!("Task created successfully (ID: {})", id);
    Ok(())
}

/// Handle the update command
pub async fn handle_update(
    id: i64,
    description: String,
    important: bool,
    private: bool,
    deadline: Option<String>,
    project: Option<String>,
    manager: &TaskManager,
) -> Result<(), CliError> {
    let mut task = build_task(description, important, private, deadline, project)?;
    task.id = Some(id);
    manager.update_task(&task).await?;
    println!("Task {} updated successfully", id);
    Ok(())
}

/// Handle the delete command
pub async fn handle_delete(id: i64, manager: &TaskManager) -> Result<(), CliError> {
    manager.delete_task(id).await?;
    println!("Task {} deleted successfully", id);
    Ok(())
}
