use std::env;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use staffboard_core::ClientConfig;
use staffboard_core::app::{AssignmentWorkflow, ClientShell, Submitted};
use staffboard_core::domain::{
    AssignmentDraft, AssignmentField, AssignmentId, CollectionKind, STATUS_PENDING, Signal,
    StaffId, TaskId, WorkflowError,
};
use staffboard_core::impls::HttpTransport;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "staffboard: staff, tasks and who is assigned to what",
    long_about = None
)]
struct Cli {
    /// Backend base URL (overrides STAFFBOARD_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show staff, tasks and assignments.
    List,

    /// Assign a task to a staff member.
    Assign {
        #[arg(long)]
        staff: i64,

        #[arg(long)]
        task: i64,

        #[arg(long, default_value = STATUS_PENDING)]
        status: String,
    },

    /// Change the status of an assignment.
    SetStatus {
        #[arg(long)]
        id: i64,

        #[arg(long)]
        status: String,
    },

    /// Remove an assignment.
    Unassign {
        #[arg(long)]
        id: i64,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("STAFFBOARD_LOG")
        .unwrap_or_else(|_| EnvFilter::new("staffboard=info,warn"));

    let format = env::var("STAFFBOARD_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    // stdout は一覧の出力に使うのでログは stderr
    let registry = tracing_subscriber::registry().with(filter);
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = cli.api_url {
        config = config.with_api_url(api_url)?;
    }
    info!(api_url = %config.api_url, "using backend");

    let transport = HttpTransport::new(&config)?;
    let shell = ClientShell::new(Arc::new(transport));
    let mut signals = shell.events().subscribe();

    match cli.command {
        Commands::List => {
            let failed = shell.load_all().await;
            if !failed.is_empty() {
                bail!("could not load: {failed:?}");
            }
            print_board(&shell);
        }
        Commands::Assign {
            staff,
            task,
            status,
        } => {
            let workflow = shell.assignment_workflow();
            let outcome = assign(
                &workflow,
                AssignmentDraft {
                    staff_id: Some(StaffId::new(staff)),
                    task_id: Some(TaskId::new(task)),
                    status,
                },
            )
            .await;
            apply_refreshes(&shell, &mut signals).await?;
            match outcome? {
                Submitted::Created { id: Some(id) } => println!("created assignment {id}"),
                _ => println!("created assignment"),
            }
            print_assignments(&shell);
        }
        Commands::SetStatus { id, status } => {
            let id = AssignmentId::new(id);
            shell.refresh(CollectionKind::Assignment).await?;
            let record = shell
                .cache()
                .assignments()
                .iter()
                .find(|a| a.id == id)
                .cloned()
                .with_context(|| format!("assignment {id} not found"))?;

            let workflow = shell.assignment_workflow();
            workflow.open_edit(&record);
            workflow.edit(AssignmentField::Status(status))?;
            let outcome = workflow.submit().await;
            apply_refreshes(&shell, &mut signals).await?;
            outcome?;
            println!("updated assignment {id}");
            print_assignments(&shell);
        }
        Commands::Unassign { id } => {
            let id = AssignmentId::new(id);
            let response = shell.assignment_workflow().remove(id).await?;
            apply_refreshes(&shell, &mut signals).await?;
            if response.is_success() {
                println!("removed assignment {id}");
            } else {
                println!("backend answered {} for assignment {id}", response.status);
            }
            print_assignments(&shell);
        }
    }

    Ok(())
}

/// add モーダルを開いて、フォームと同じ順にフィールドを入れて送信する
async fn assign(
    workflow: &AssignmentWorkflow,
    draft: AssignmentDraft,
) -> Result<Submitted, WorkflowError> {
    workflow.open_add();
    workflow.edit(AssignmentField::Staff(draft.staff_id))?;
    workflow.edit(AssignmentField::Task(draft.task_id))?;
    workflow.edit(AssignmentField::Status(draft.status))?;
    workflow.submit().await
}

/// 発行された Signal を処理する（1 回きりのコマンドなので listener は立てない）
async fn apply_refreshes(
    shell: &ClientShell,
    signals: &mut broadcast::Receiver<Signal>,
) -> anyhow::Result<()> {
    while let Ok(signal) = signals.try_recv() {
        shell.handle_signal(signal).await?;
    }
    Ok(())
}

fn print_board(shell: &ClientShell) {
    println!("Staff:");
    for staff in shell.cache().staff().iter() {
        println!("  [{}] {} ({})", staff.id, staff.name, staff.role);
    }
    println!("Tasks:");
    for task in shell.cache().tasks().iter() {
        println!(
            "  [{}] {} (priority {}, due {})",
            task.id, task.title, task.priority, task.due_date
        );
    }
    print_assignments(shell);
}

fn print_assignments(shell: &ClientShell) {
    println!("Assignments:");
    for row in shell.assignment_rows() {
        println!("  [{}] {}", row.id, row);
        println!("      {}", row.assigned_line());
    }
}
