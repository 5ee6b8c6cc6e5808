use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::{col, lit};
use tracing::{debug, info, info_span};

use datalist_cli::request::{apply_overrides, collect_params};
use datalist_core::{Datalist, FilterControlKind, ListConfig, ParamMap, SessionStore};
use datalist_frame::{FrameRow, FrameSource, equality_predicate, read_csv_source};

use crate::cli::{ColumnsArgs, ListArgs};
use crate::types::{ColumnInfoRow, ListOutcome};

pub fn run_list(args: &ListArgs) -> Result<ListOutcome> {
    let span = info_span!("list", csv = %args.csv.display());
    let _guard = span.enter();

    let mut config = match &args.config {
        Some(path) => ListConfig::load(path)
            .with_context(|| format!("load list configuration {}", path.display()))?,
        None => ListConfig::default(),
    };
    if args.canonical {
        config.auto_canonicalize = true;
    }

    let mut source = read_csv_source(&args.csv)
        .with_context(|| format!("read {}", args.csv.display()))?;
    if let Some(id_column) = &args.id_column {
        source = source
            .with_id_column(id_column)
            .context("configure id column")?;
    }
    let columns: Vec<String> = source.column_names().map(str::to_string).collect();

    let mut list = Datalist::new(source, config);
    for column in &columns {
        register_column_filter(&mut list, column);
    }
    if let (Some(id_column), Some(parent_column)) = (&args.id_column, &args.parent_column) {
        set_tree_nesting(&mut list, id_column.clone(), parent_column.clone());
    }
    if args.distinct_count {
        list.use_distinct_root_count()
            .context("count distinct ids")?;
    }

    let mut params = collect_params(&args.params)?;
    apply_overrides(
        &mut params,
        args.page,
        args.on_page,
        args.order.as_deref(),
    );

    let mut store = match &args.session {
        Some(path) => load_session_store(path)?,
        None => SessionStore::new(),
    };
    if args.session.is_some() {
        // The request keeps its own page, onpage and order; the session only
        // fills in what the request leaves out.
        let mut session_params = params.clone();
        list.load_session(&mut session_params, store.section(&args.section));
    }
    list.load_state(&mut params);

    let rows = list.items_on_page().context("load page")?.to_vec();
    let paginator = list.paginator(false).context("count rows")?;
    info!(
        rows = rows.len(),
        item_count = paginator.item_count(),
        page = paginator.page(),
        "Loaded list page"
    );

    list.bind_filter_controls();
    let filters = list
        .filter_controls()
        .filter_map(|control| {
            let value = list.filters().get(control.name())?;
            Some((control.name().to_string(), value.to_string()))
        })
        .collect();

    let mut outbound = ParamMap::new();
    list.save_state(&mut outbound);

    if let Some(path) = &args.session {
        list.save_session(&outbound, store.section(&args.section));
        save_session_store(path, &store)?;
    }

    Ok(ListOutcome {
        columns,
        rows,
        paginator,
        order: list.order_parameter(),
        filters,
        outbound,
    })
}

pub fn run_columns(args: &ColumnsArgs) -> Result<Vec<ColumnInfoRow>> {
    let source = read_csv_source(&args.csv)
        .with_context(|| format!("read {}", args.csv.display()))?;
    let list = Datalist::new(source, ListConfig::default());

    let rows = list
        .allowed_order_columns()
        .iter()
        .map(|(order_name, column)| ColumnInfoRow {
            column: column.clone(),
            order_name: order_name.clone(),
        })
        .collect();
    Ok(rows)
}

/// Every column filters by equality under its own name.
fn register_column_filter(list: &mut Datalist<FrameSource>, column: &str) {
    let target = column.to_string();
    list.register_filter_control(
        FilterControlKind::Text,
        column,
        move |source: &mut FrameSource, value| {
            if let Some(predicate) = equality_predicate(&target, value) {
                source.where_expr(predicate);
            }
        },
        None,
        None,
    );
}

/// Roots have no parent; children reference their parent's id.
fn set_tree_nesting(list: &mut Datalist<FrameSource>, id_column: String, parent_column: String) {
    debug!(id = %id_column, parent = %parent_column, "Showing rows as a tree");
    list.set_nesting_callback(move |source: &mut FrameSource, parent: Option<&FrameRow>| {
        let predicate = match parent {
            None => col(parent_column.as_str()).is_null(),
            Some(row) => row
                .get(&id_column)
                .and_then(|id| equality_predicate(&parent_column, id))
                .unwrap_or_else(|| lit(false)),
        };
        source.where_expr(predicate);
    });
}

fn load_session_store(path: &Path) -> Result<SessionStore> {
    if !path.exists() {
        debug!(path = %path.display(), "Session file not found, starting empty");
        return Ok(SessionStore::new());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("read session {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse session {}", path.display()))
}

fn save_session_store(path: &Path, store: &SessionStore) -> Result<()> {
    let json = serde_json::to_string_pretty(store).context("serialize session")?;
    fs::write(path, json).with_context(|| format!("write session {}", path.display()))?;
    debug!(path = %path.display(), "Saved session");
    Ok(())
}
