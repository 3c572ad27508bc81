use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use list_client::{
    Confirmation, DeleteOutcome, DetachedEditorSurface, HttpTransport, ListSnapshot,
    ResourceList, TracingFeedback,
};
use shared::domain::{QueryState, Record, RecordId, ResourceDescriptor, SortOrder, SortSpec};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

#[derive(Parser, Debug)]
#[command(about = "Browse and delete education history records")]
struct Args {
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Overrides the API base URL from config and environment.
    #[arg(long)]
    api_base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of records.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long, requires = "sort")]
        desc: bool,
        /// Column filter as `column=text`; repeatable.
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
    /// Delete records by id after confirmation.
    Delete {
        #[arg(long = "id", required = true)]
        ids: Vec<i64>,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    let (column, text) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected column=text, got '{raw}'"))?;
    if column.trim().is_empty() {
        return Err(format!("missing column in '{raw}'"));
    }
    Ok((column.trim().to_string(), text.to_string()))
}

struct StdinConfirmation;

#[async_trait]
impl Confirmation for StdinConfirmation {
    async fn confirm(&self, prompt: &str) -> bool {
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || {
            print!("{prompt} [y/N] ");
            let _ = io::stdout().flush();
            let mut line = String::new();
            if io::stdin().read_line(&mut line).is_err() {
                return false;
            }
            matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
        })
        .await
        .unwrap_or(false)
    }
}

fn build_query(
    resource: &ResourceDescriptor,
    page: u32,
    sort: Option<String>,
    desc: bool,
    filters: Vec<(String, String)>,
) -> Result<QueryState> {
    let mut query = QueryState::default().with_page(page);

    if let Some(field) = sort {
        match resource.column(&field) {
            Some(column) if column.sortable => {}
            _ => bail!("column '{field}' cannot be sorted"),
        }
        let order = if desc {
            SortOrder::Descend
        } else {
            SortOrder::Ascend
        };
        query.sort = Some(SortSpec::new(field, order));
    }

    for (column, text) in filters {
        match resource.column(&column) {
            Some(spec) if spec.searchable => {}
            _ => bail!("column '{column}' cannot be filtered"),
        }
        query.filters.insert(column, text);
    }

    Ok(query)
}

fn render_page(resource: &ResourceDescriptor, snapshot: &ListSnapshot) {
    let header: Vec<&str> = resource
        .columns
        .iter()
        .map(|column| column.title.as_str())
        .collect();
    println!("ID\t{}", header.join("\t"));
    for record in &snapshot.page.records {
        let cells: Vec<String> = resource
            .columns
            .iter()
            .map(|column| record.display_value(&column.data_index))
            .collect();
        println!("{}\t{}", record.id, cells.join("\t"));
    }
    println!(
        "page {}/{} ({} records)",
        snapshot.query.page,
        snapshot.page_count().max(1),
        snapshot.page.total
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut settings = config::load_settings(&args.config)?;
    if let Some(api_base_url) = args.api_base_url {
        settings.api_base_url = api_base_url;
    }
    info!(
        "admin: api_base_url={} endpoint={}",
        settings.api_base_url, settings.endpoint
    );

    let resource = ResourceDescriptor::education().with_endpoint(settings.endpoint.clone());
    let transport = HttpTransport::with_timeout(&settings.api_base_url, settings.request_timeout())
        .context("failed to build http transport")?;

    let confirmation: Arc<dyn Confirmation> = match &args.command {
        Command::Delete { yes: true, .. } => Arc::new(list_client::AutoConfirm(true)),
        _ => Arc::new(StdinConfirmation),
    };
    let screen = ResourceList::new(
        resource.clone(),
        Arc::new(transport),
        Arc::new(TracingFeedback),
        confirmation,
        Arc::new(DetachedEditorSurface),
    );

    match args.command {
        Command::List {
            page,
            sort,
            desc,
            filters,
        } => {
            let query = build_query(&resource, page, sort, desc, filters)?;
            screen
                .list()
                .fetch(query)
                .await
                .map_err(|err| anyhow!("failed to load records: {err}"))?;
        }
        Command::Delete { ids, .. } => {
            let records: Vec<Record> = ids.into_iter().map(|id| Record::new(RecordId(id))).collect();
            match screen
                .bulk_actions()
                .request_delete(&records)
                .await
                .map_err(|err| anyhow!("failed to delete records: {err}"))?
            {
                DeleteOutcome::Deleted { ids, message } => {
                    println!("{message} ({} deleted)", ids.len());
                }
                DeleteOutcome::Cancelled => {
                    println!("Nothing deleted.");
                    return Ok(());
                }
            }
        }
    }

    render_page(&resource, &screen.list().snapshot().await);
    Ok(())
}
