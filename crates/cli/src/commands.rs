use crate::{print_stdout, ComposeArgs, DetailsArgs, ExportArgs, PackArgs, RenderArgs};
use anyhow::{bail, Context as AnyhowContext, Result};
use citenet_export::CitationTable;
use citenet_graph::{
    encode_shard, shard_path, ComposedGraph, ExplorerConfig, ExplorerSession, GraphElement,
    RangeComposer, ShardKey, StyleRuleEngine, UiEvent,
};
use citenet_protocol::{ElementPayload, RenderPayload, YearRange};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct ComposeOutput {
    range: YearRange,
    node_count: usize,
    edge_count: usize,
    elements: Vec<ElementPayload>,
}

fn composer(config: &ExplorerConfig) -> Result<Arc<RangeComposer>> {
    let store = config
        .shards
        .open_store()
        .context("Failed to open shard store")?;
    Ok(Arc::new(RangeComposer::new(Arc::new(store))))
}

fn open_session(config: &ExplorerConfig, range: (i32, i32)) -> Result<ExplorerSession> {
    let session = ExplorerSession::open_at(
        composer(config)?,
        StyleRuleEngine::new(config.theme.clone()),
        config.details.clone(),
        range,
    )
    .with_context(|| format!("Failed to compose {}-{}", range.0, range.1))?;
    Ok(session)
}

pub(crate) fn run_compose(config: &ExplorerConfig, args: &ComposeArgs) -> Result<()> {
    let composer = composer(config)?;
    let (lo, hi) = args.range.resolve(&composer.domain());
    let graph = composer
        .compose(lo, hi)
        .with_context(|| format!("Failed to compose {lo}-{hi}"))?;

    if args.json {
        let output = ComposeOutput {
            range: YearRange { lo, hi },
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            elements: graph.elements().iter().map(ElementPayload::from).collect(),
        };
        print_stdout(&serde_json::to_string_pretty(&output)?)?;
    } else {
        print_stdout(&format!(
            "{lo}-{hi}: {} elements ({} nodes, {} edges)",
            graph.len(),
            graph.node_count(),
            graph.edge_count()
        ))?;
    }
    Ok(())
}

pub(crate) fn run_render(config: &ExplorerConfig, args: &RenderArgs) -> Result<()> {
    let range = args.range.resolve(&config.shards.domain()?);
    let mut session = open_session(config, range)?;

    if let Some(id) = &args.node {
        session.apply(UiEvent::TapNode { id: id.clone() })?;
    }
    if args.sector.is_some() {
        session.apply(UiEvent::SetSector {
            sector: args.sector.clone(),
        })?;
    }
    if args.search.is_some() {
        session.apply(UiEvent::SetSearch {
            search: args.search.clone(),
        })?;
    }
    log::debug!("Filter mode: {:?}", session.filters().mode());

    let payload = RenderPayload::from(&session.frame());
    print_stdout(&serde_json::to_string_pretty(&payload)?)?;
    Ok(())
}

pub(crate) fn run_details(config: &ExplorerConfig, args: &DetailsArgs) -> Result<()> {
    let range = args.range.resolve(&config.shards.domain()?);
    let session = open_session(config, range)?;
    let details = session
        .details(&args.id)
        .with_context(|| format!("No element {} in {}-{}", args.id, range.0, range.1))?;
    print_stdout(&serde_json::to_string_pretty(&details)?)?;
    Ok(())
}

pub(crate) fn run_export(args: &ExportArgs) -> Result<()> {
    let table = CitationTable::from_path(&args.table)?;
    let (path, written) = table
        .export_to_dir(&args.id, &args.out)
        .with_context(|| format!("Failed to export citations of {}", args.id))?;
    print_stdout(&format!("Wrote {written} rows to {}", path.display()))?;
    Ok(())
}

pub(crate) fn run_pack(config: &ExplorerConfig, args: &PackArgs) -> Result<()> {
    let key = match args.year {
        Some(year) => {
            if !config.shards.domain()?.contains(year) {
                bail!(
                    "Year {year} is outside {}..={}",
                    config.shards.min_year,
                    config.shards.max_year
                );
            }
            ShardKey::Year(year)
        }
        None => ShardKey::Full,
    };

    let raw = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let elements: Vec<GraphElement> = serde_json::from_slice(&raw)
        .with_context(|| format!("{} is not a JSON element list", args.input.display()))?;
    let graph = ComposedGraph::from_elements(&elements)
        .with_context(|| format!("{} is not a consistent graph", args.input.display()))?;
    if graph.len() != elements.len() {
        log::warn!(
            "{} repeats {} element ids; readers keep the first occurrence",
            args.input.display(),
            elements.len() - graph.len()
        );
    }

    let blob = encode_shard(&elements)?;
    let out_dir = args.out_dir.as_ref().unwrap_or(&config.shards.dir);
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let path = shard_path(out_dir, &config.shards.stem, key);
    std::fs::write(&path, &blob).with_context(|| format!("Failed to write {}", path.display()))?;

    log::info!("Packed shard {key} ({} bytes)", blob.len());
    print_stdout(&format!(
        "Packed {} elements into {}",
        elements.len(),
        path.display()
    ))?;
    Ok(())
}
