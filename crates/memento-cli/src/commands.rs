use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use memento_index::FsIndexService;
use memento_sdk::{Memento, MementoConfig, MementoStore, Snapshot, StatementGraph};
use memento_store::FsBlobStore;
use memento_types::Timestamp;
use serde_json::json;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let store = open_store(&cli).await?;
    let format = cli.format;
    match cli.command {
        Command::Put(args) => cmd_put(&store, args, format).await,
        Command::Get(args) => cmd_get(&store, args, format).await,
        Command::List(args) => cmd_list(&store, args, format).await,
        Command::Delete(args) => cmd_delete(&store, args, format).await,
        Command::Reindex(args) => cmd_reindex(&store, args, format).await,
    }
}

async fn open_store(cli: &Cli) -> anyhow::Result<MementoStore> {
    let config = match &cli.config {
        Some(path) => MementoConfig::load(path).await?,
        None => {
            let default_path = cli.root.join("memento.toml");
            if tokio::fs::try_exists(&default_path).await.unwrap_or(false) {
                MementoConfig::load(&default_path).await?
            } else {
                MementoConfig::default()
            }
        }
    };
    let blobs = FsBlobStore::open(cli.root.join("blobs"))
        .await
        .with_context(|| format!("opening blob store under {}", cli.root.display()))?
        .with_page_size(config.index_page_size);
    let index = FsIndexService::open(cli.root.join("index"))
        .await
        .with_context(|| format!("opening index under {}", cli.root.display()))?
        .with_page_size(config.index_page_size);
    tracing::debug!(root = %cli.root.display(), ?config, "opened memento store");
    Ok(MementoStore::new(Arc::new(blobs), Arc::new(index), &config))
}

async fn cmd_put(store: &MementoStore, args: PutArgs, format: OutputFormat) -> anyhow::Result<()> {
    let raw = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("reading {}", args.file.display()))?;
    let receipt = if args.graph {
        let graph: StatementGraph = serde_json::from_slice(&raw)
            .with_context(|| format!("parsing statement graph {}", args.file.display()))?;
        store.put_graph(graph).await?
    } else {
        let snapshot: Snapshot = serde_json::from_slice(&raw)
            .with_context(|| format!("parsing snapshot {}", args.file.display()))?;
        store.put(&snapshot).await?
    };

    if format == OutputFormat::Json {
        let out = json!({
            "id": receipt.key.id.as_str(),
            "timestamp": receipt.key.timestamp.epoch_seconds(),
            "key": receipt.storage_key,
            "indexed": !receipt.is_orphaned(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{} Stored {} at {}", "✓".green().bold(), receipt.key.id.to_string().bold(), receipt.key.timestamp.to_string().yellow());
    println!("  Key: {}", receipt.storage_key.cyan());
    if let Some(e) = &receipt.index_error {
        println!("  {} not indexed: {e}", "!".red().bold());
        println!("  Run {} to recover it.", format!("memento reindex {}", receipt.key.id).bold());
    }
    Ok(())
}

async fn cmd_get(store: &MementoStore, args: GetArgs, format: OutputFormat) -> anyhow::Result<()> {
    let at = args.at.unwrap_or_else(Timestamp::now);
    let found = if args.exact {
        store.get_exact(&args.id, at).await?
    } else {
        store.get(&args.id, at).await?
    };
    let Some(memento) = found else {
        anyhow::bail!("no version of {} at {}", args.id, at);
    };

    if format == OutputFormat::Json {
        let mut out = json!({
            "id": memento.key.id.as_str(),
            "timestamp": memento.key.timestamp.epoch_seconds(),
            "key": memento.storage_key,
            "media_type": memento.media_type,
            "metadata": memento.metadata,
        });
        if args.body {
            out["statements"] = serde_json::to_value(memento.statements(store.body_codec())?)?;
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_memento(&memento);
    if args.body {
        println!();
        for statement in memento.statements(store.body_codec())? {
            println!(
                "  {} {} {} {}",
                statement.subject.blue(),
                statement.predicate,
                statement.object,
                statement.graph.as_iri().dimmed()
            );
        }
    }
    Ok(())
}

fn print_memento(memento: &Memento) {
    println!("{} {}", memento.key.id.to_string().bold(), memento.key.timestamp.to_string().yellow());
    println!("  Key: {}", memento.storage_key.cyan());
    println!("  Type: {} ({} bytes)", memento.media_type, memento.body.len());
    for (key, value) in memento.metadata.iter() {
        println!("  {}: {}", key.dimmed(), value);
    }
}

async fn cmd_list(store: &MementoStore, args: ListArgs, format: OutputFormat) -> anyhow::Result<()> {
    let ranges = store.list(&args.id).await?;

    if format == OutputFormat::Json {
        let out: Vec<_> = ranges
            .iter()
            .map(|r| json!({ "from": r.from.epoch_seconds(), "until": r.until.epoch_seconds() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if ranges.is_empty() {
        println!("No versions of {}.", args.id.to_string().bold());
        return Ok(());
    }
    println!("{} ({} versions)", args.id.to_string().bold(), ranges.len());
    for range in &ranges {
        println!("  {} → {}", range.from.to_string().yellow(), range.until.to_string().dimmed());
    }
    Ok(())
}

async fn cmd_delete(store: &MementoStore, args: DeleteArgs, format: OutputFormat) -> anyhow::Result<()> {
    let existed = store.delete(&args.id, args.at).await?;

    if format == OutputFormat::Json {
        println!("{}", json!({ "deleted": existed }));
        return Ok(());
    }

    if existed {
        println!("{} Deleted {} at {}", "✓".green().bold(), args.id.to_string().bold(), args.at.to_string().yellow());
    } else {
        println!("No version of {} at {}.", args.id.to_string().bold(), args.at.to_string().yellow());
    }
    Ok(())
}

async fn cmd_reindex(store: &MementoStore, args: ReindexArgs, format: OutputFormat) -> anyhow::Result<()> {
    let count = store.rebuild_index(&args.id).await?;

    if format == OutputFormat::Json {
        println!("{}", json!({ "versions": count }));
        return Ok(());
    }

    println!("{} Indexed {} versions of {}", "✓".green().bold(), count, args.id.to_string().bold());
    Ok(())
}
