use clap::{Parser, Subcommand};
use colored::*;
use todo_sync::{
    ClientConfig, ClientError, IndexError, ListEvent, RemoteSource, Task, TaskId, TaskListClient,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todo-sync")]
#[command(about = "Local-first task list with one-time remote bootstrap", long_about = None)]
struct Cli {
    /// SQLite database URL (overrides TODO_SYNC_DATABASE_URL)
    #[arg(short, long)]
    database: Option<String>,

    /// Bootstrap endpoint (overrides TODO_SYNC_ENDPOINT)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Only show tasks whose title or description contains this text.
    /// Row numbers given to `toggle`, `delete` and `share` refer to the filtered list.
    #[arg(short, long, global = true)]
    search: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the task list
    List,
    /// Create a task at the top of the list
    Add { description: String },
    /// Flip the completion flag of the task at ROW
    Toggle { row: usize },
    /// Delete the task at ROW
    Delete { row: usize },
    /// Replace the description of task ID
    Edit { id: TaskId, description: String },
    /// Print the share text of the task at ROW
    Share { row: usize },
    /// Wipe local data so the next run bootstraps again
    Reset,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("todo_sync=info,todo_sync_client=warn")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(database) = cli.database {
        config.database_url = database;
    }
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    tracing::debug!(
        "Using database {} with endpoint {}",
        config.database_url,
        config.endpoint
    );

    let mut client = TaskListClient::from_config(&config).await?;
    client
        .event_dispatcher()
        .register_callback(|event| match event {
            ListEvent::LoadFailed { message } => {
                eprintln!("{} {}", "Load failed:".red().bold(), message)
            }
            other => println!("{}", format!("signal: {other:?}").dimmed()),
        })?;

    run(
        &mut client,
        cli.command.unwrap_or(Command::List),
        cli.search,
    )
    .await
}

/// Execute one command. Expects a callback to be registered on the client's dispatcher.
async fn run<R>(
    client: &mut TaskListClient<R>,
    command: Command,
    search: Option<String>,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: RemoteSource,
{
    // Reset works on whatever is stored; loading first could trigger a bootstrap.
    if let Command::Reset = command {
        let removed = client.clear_local_data().await?;
        client.event_dispatcher().process_events()?;
        println!("🧹 Removed {} local tasks", removed.to_string().yellow());
        return Ok(());
    }

    let loaded = client.load().await;
    client.event_dispatcher().process_events()?;
    loaded?;

    if let Some(search) = search {
        client.set_search_text(search);
    }

    match command {
        Command::List | Command::Reset => {}
        Command::Add { description } => {
            let outcome = client.create(&description).await?;
            println!("✅ Created {}", outcome.task.title().green());
        }
        Command::Toggle { row } => {
            let outcome = client.toggle_completion(row).await?;
            let state = if outcome.task.completed {
                "done".green()
            } else {
                "open".yellow()
            };
            println!("🔄 {} is now {}", outcome.task.title(), state);
        }
        Command::Delete { row } => {
            let outcome = client.delete(row).await?;
            println!("🗑️  Deleted {}", outcome.task.title().red());
        }
        Command::Edit { id, description } => {
            let outcome = client.update_description(id, &description).await?;
            println!("✏️  Updated {}", outcome.task.title().green());
        }
        Command::Share { row } => {
            client.event_dispatcher().process_events()?;
            let text = client.share_text(row).ok_or(ClientError::Index(IndexError {
                index: row,
                len: client.visible_count(),
            }))?;
            println!("{text}");
            return Ok(());
        }
    }

    client.event_dispatcher().process_events()?;
    print_tasks(client);
    Ok(())
}

fn print_tasks<R>(client: &TaskListClient<R>)
where
    R: RemoteSource,
{
    let header = if client.search_text().is_empty() {
        client.task_count_label()
    } else {
        format!("{} matching \"{}\"", client.task_count_label(), client.search_text())
    };
    println!("{}", header.bold().cyan());

    for (row, task) in client.visible_tasks().into_iter().enumerate() {
        println!("{}", format_row(row, task));
    }
}

fn format_row(row: usize, task: &Task) -> String {
    let mark = if task.completed {
        "[x]".green()
    } else {
        "[ ]".normal()
    };
    let title = format!("{:>10}", task.title()).dimmed();
    format!("{:>3}  {} {}  {}", row, mark, title, task.description)
}
