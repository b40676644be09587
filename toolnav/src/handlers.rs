use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use toolnav_api::AppState;
use toolnav_core::backup::{self, RestoreReport};
use toolnav_core::export::{ExportFile, ExportFilter, ExportFormat, ExportKind, ExportStore};
use toolnav_core::favicon::{self, IconProber, ProbeResult};
use toolnav_core::model::{CategoryNode, Website, WebsiteFilter, WebsiteStatus};
use toolnav_core::reconcile::{
    self, DedupeReport, ImportReport, MatchRule, Misassignment, MoveReason, ReconcileOptions,
    ReconcileProgressCallback, ReconcileReport,
};
use toolnav_core::settings::FaviconApi;
use toolnav_core::{AppConfig, Database};
use toolnav_dataset::load_dataset;

// Shared helpers

pub fn config_from_matches(matches: &ArgMatches) -> AppConfig {
    match matches.get_one::<String>("data-dir") {
        Some(raw) => AppConfig::from_user_path(raw),
        None => AppConfig::from_user_path(toolnav_core::config::DEFAULT_DATA_DIR),
    }
}

/// Expand `~` in a user supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw.trim()).as_ref())
}

pub fn open_database(config: &AppConfig) -> Result<Database> {
    fs::create_dir_all(config.data_dir()).with_context(|| {
        format!("Failed to create data directory {}", config.data_dir().display())
    })?;
    let db_path = config.db_path();
    Database::new(&db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))
}

pub fn open_exports(config: &AppConfig) -> Result<ExportStore> {
    let dir = config.export_dir();
    ExportStore::new(&dir)
        .with_context(|| format!("Failed to open export directory {}", dir.display()))
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(message.to_string());
    Ok(spinner)
}

/// Route reconcile/import progress messages into a spinner.
fn spinner_callback(spinner: &ProgressBar) -> ReconcileProgressCallback {
    let spinner = spinner.clone();
    Arc::new(move |msg: String| spinner.set_message(msg))
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_heading(title: &str) {
    print_divider();
    println!("  {}", title.bright_white().bold());
    print_divider();
    println!();
}

fn print_errors(errors: &[String]) {
    for error in errors {
        println!("  {} {}", "⚠".yellow().bold(), error.yellow());
    }
}

fn parse_status(raw: Option<&String>) -> Result<Option<WebsiteStatus>> {
    raw.map(|s| WebsiteStatus::from_str(s).ok_or_else(|| anyhow!("Unknown status '{}'", s)))
        .transpose()
}

/// Human readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

fn format_timestamp(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}

fn reason_label(reason: &MoveReason) -> &'static str {
    match reason {
        MoveReason::Matched(MatchRule::ExactSlug) => "slug",
        MoveReason::Matched(MatchRule::ExactName) => "name",
        MoveReason::Matched(MatchRule::DomainSubstring) => "domain",
        MoveReason::Matched(MatchRule::EvenSplit) | MoveReason::EvenSplit => "split",
    }
}

pub fn format_reconcile_report(report: &ReconcileReport) -> String {
    let mut out = String::new();
    let title = if report.dry_run {
        "Reconcile preview (dry run, nothing written)"
    } else {
        "Reconcile complete"
    };
    out.push_str(&format!("{} {}\n\n", "✓".green().bold(), title.bright_white()));

    out.push_str("📊 Summary:\n");
    out.push_str(&format!("  Moved by rule: {}\n", report.moved.to_string().cyan()));
    out.push_str(&format!("  Even split: {}\n", report.even_split.to_string().cyan()));
    out.push_str(&format!("  Unchanged: {}\n", report.unchanged.to_string().cyan()));
    out.push_str(&format!("  Unmatched: {}\n", report.unmatched.to_string().cyan()));
    out.push_str(&format!("  Errors: {}\n", report.errors.len().to_string().cyan()));

    if !report.moves.is_empty() {
        out.push_str("\n📄 Moves:\n");
        for mv in &report.moves {
            out.push_str(&format!(
                "  {} {} {} {} {}\n",
                "→".blue(),
                mv.website_name.bright_white(),
                "→".blue(),
                mv.to_category_slug.green(),
                format!("[{}]", reason_label(&mv.reason)).bright_black()
            ));
        }
    }

    for error in &report.errors {
        out.push_str(&format!("  {} {}\n", "⚠".yellow().bold(), error.yellow()));
    }
    out
}

pub fn format_category_tree(tree: &[CategoryNode]) -> String {
    let mut out = String::new();
    for node in tree {
        let hidden = if node.category.visible { "" } else { " (hidden)" };
        out.push_str(&format!(
            "{} {} {}{}\n",
            node.category.name.bright_white().bold(),
            format!("[{}]", node.category.slug).bright_black(),
            format!("{} sites", node.website_count).cyan(),
            hidden.yellow()
        ));
        let last = node.children.len().saturating_sub(1);
        for (i, child) in node.children.iter().enumerate() {
            let branch = if i == last { "└─" } else { "├─" };
            out.push_str(&format!(
                "  {} {} {}\n",
                branch.bright_black(),
                child.name,
                format!("[{}]", child.slug).bright_black()
            ));
        }
    }
    out
}

// Handlers

pub fn handle_init(config: &AppConfig, args: &ArgMatches) -> Result<()> {
    let force = args.get_flag("force");
    let db_path = config.db_path();

    print_heading("TOOLNAV INITIALIZATION");
    println!(
        "{} Target: {}",
        "→".blue(),
        config.data_dir().display().to_string().bright_white()
    );
    println!();

    fs::create_dir_all(config.data_dir()).with_context(|| {
        format!("Failed to create data directory {}", config.data_dir().display())
    })?;

    if Database::exists(&db_path) {
        if force {
            println!(
                "{} Deleting existing database (force mode)",
                "→".yellow().bold()
            );
            Database::drop(&db_path)
                .with_context(|| format!("Failed to remove {}", db_path.display()))?;
            println!("{} Existing database removed", "✓".green().bold());
        } else {
            println!("{}", "⚠ WARNING".yellow().bold());
            println!(
                "Database already exists, keeping it. Use {} to recreate it.",
                "--force".bright_white()
            );
        }
    }

    println!("{} Creating database schema...", "→".blue());
    open_database(config)?;
    open_exports(config)?;

    println!();
    print_divider();
    println!("{}", "  INITIALIZATION COMPLETE".green().bold());
    print_divider();
    println!();
    println!(
        "{} Database: {}",
        "✓".green().bold(),
        db_path.display().to_string().bright_white()
    );
    println!(
        "{} Exports: {}",
        "✓".green().bold(),
        config.export_dir().display().to_string().bright_white()
    );
    println!();
    Ok(())
}

pub async fn handle_serve(config: &AppConfig, args: &ArgMatches) -> Result<()> {
    let bind = args
        .get_one::<String>("bind")
        .map(String::as_str)
        .unwrap_or("127.0.0.1:3000");

    let mut state = AppState::open(config).with_context(|| {
        format!("Failed to open data directory {}", config.data_dir().display())
    })?;
    if let Some(root) = args.get_one::<PathBuf>("dataset-root") {
        let root = expand_path(&root.to_string_lossy());
        println!(
            "{} Dataset root: {}",
            "→".blue(),
            root.display().to_string().bright_white()
        );
        state = state.with_dataset_root(root);
    }

    println!(
        "{} Serving API on {}",
        "✓".green().bold(),
        format!("http://{}", bind).bright_white()
    );
    toolnav_api::serve(state, bind)
        .await
        .with_context(|| format!("API server on {} failed", bind))
}

pub fn handle_import(config: &AppConfig, args: &ArgMatches) -> Result<ImportReport> {
    let source = expand_path(
        args.get_one::<String>("source")
            .ok_or_else(|| anyhow!("--source is required"))?,
    );
    let root = args
        .get_one::<String>("root")
        .ok_or_else(|| anyhow!("--root is required"))?;

    let dataset = load_dataset(&source)
        .with_context(|| format!("Failed to load dataset {}", source.display()))?;
    println!(
        "{} Loaded {} tools from {}",
        "✓".green().bold(),
        dataset.tools.len().to_string().cyan(),
        source.display().to_string().bright_white()
    );

    let db = open_database(config)?;
    let progress = spinner(&format!("Importing into {}", root))?;
    let result = reconcile::import_dataset(&db, &dataset, root, Some(spinner_callback(&progress)));
    progress.finish_and_clear();
    let report = result?;

    println!("{} Import complete", "✓".green().bold());
    println!("  Inserted: {}", report.inserted.to_string().cyan());
    println!("  Skipped (URL already stored): {}", report.skipped.to_string().cyan());
    println!(
        "  Subcategories created: {}",
        report.created_categories.to_string().cyan()
    );
    print_errors(&report.errors);
    Ok(report)
}

pub fn handle_reconcile(config: &AppConfig, args: &ArgMatches) -> Result<ReconcileReport> {
    let page = args
        .get_one::<String>("page")
        .ok_or_else(|| anyhow!("--page is required"))?;
    let source = expand_path(
        args.get_one::<String>("source")
            .ok_or_else(|| anyhow!("--source is required"))?,
    );

    let mut options = ReconcileOptions::new(page);
    options.dry_run = args.get_flag("dry-run");
    if let Some(rules) = args.get_one::<String>("rules") {
        options.rules = MatchRule::parse_list(rules)?;
    }

    let dataset = load_dataset(&source)
        .with_context(|| format!("Failed to load dataset {}", source.display()))?;

    let db = open_database(config)?;
    let progress = spinner(&format!("Reconciling page {}", page))?;
    let result = reconcile::reconcile(&db, &dataset, &options, Some(spinner_callback(&progress)));
    progress.finish_and_clear();
    let report = result?;

    print!("{}", format_reconcile_report(&report));
    Ok(report)
}

pub fn handle_dedupe(config: &AppConfig, args: &ArgMatches) -> Result<DedupeReport> {
    let dry_run = args.get_flag("dry-run");
    let db = open_database(config)?;
    let report = reconcile::remove_duplicate_urls(&db, dry_run)?;

    if report.groups.is_empty() {
        println!("{} No duplicate URLs found", "✓".green().bold());
        return Ok(report);
    }

    for group in &report.groups {
        println!(
            "  {} {} keeps #{} removes {:?}",
            "•".yellow(),
            group.normalized_url.bright_white(),
            group.kept,
            group.removed
        );
    }
    let verb = if dry_run { "Would remove" } else { "Removed" };
    println!(
        "{} {} {} duplicate websites in {} groups",
        "✓".green().bold(),
        verb,
        report.removed_count().to_string().cyan(),
        report.groups.len().to_string().cyan()
    );
    Ok(report)
}

pub fn handle_audit(config: &AppConfig, args: &ArgMatches) -> Result<Vec<Misassignment>> {
    let slug = args
        .get_one::<String>("page")
        .ok_or_else(|| anyhow!("--page is required"))?;
    let db = open_database(config)?;
    let page = db.get_page_by_slug(slug)?;
    let found = reconcile::audit_page(&db, page.id)?;

    if found.is_empty() {
        println!(
            "{} Every website on page {} sits in a subcategory",
            "✓".green().bold(),
            slug.bright_white()
        );
        return Ok(found);
    }

    println!(
        "{} {} websites sit directly on a top-level category:",
        "⚠".yellow().bold(),
        found.len().to_string().cyan()
    );
    for item in &found {
        println!(
            "  {} #{} {} {} {}",
            "•".yellow(),
            item.website_id,
            item.website_name.bright_white(),
            item.url.bright_black(),
            format!("[{}]", item.root_category_slug).yellow()
        );
    }
    Ok(found)
}

pub fn handle_export(config: &AppConfig, args: &ArgMatches) -> Result<ExportFile> {
    let raw_kind = args
        .get_one::<String>("kind")
        .ok_or_else(|| anyhow!("--kind is required"))?;
    let kind =
        ExportKind::from_str(raw_kind).ok_or_else(|| anyhow!("Unknown export kind '{}'", raw_kind))?;
    let raw_format = args.get_one::<String>("format").map(String::as_str).unwrap_or("json");
    let format = ExportFormat::from_str(raw_format)
        .ok_or_else(|| anyhow!("Unknown export format '{}'", raw_format))?;

    let filter = ExportFilter {
        category_id: args.get_one::<i64>("category").copied(),
        status: parse_status(args.get_one::<String>("status"))?,
        from: args.get_one::<String>("from").cloned(),
        to: args.get_one::<String>("to").cloned(),
    };

    let db = open_database(config)?;
    let store = open_exports(config)?;
    let file = store.create(&db, kind, format, &filter)?;

    println!(
        "{} Wrote {} ({})",
        "✓".green().bold(),
        store.dir().join(&file.name).display().to_string().bright_white(),
        format_size(file.size).cyan()
    );
    Ok(file)
}

pub fn handle_exports_list(config: &AppConfig) -> Result<Vec<ExportFile>> {
    let store = open_exports(config)?;
    let files = store.list()?;

    if files.is_empty() {
        println!("{} No exports stored in {}", "→".blue(), store.dir().display());
        return Ok(files);
    }

    for file in &files {
        println!(
            "  {}  {:>10}  {}",
            format_timestamp(file.modified).bright_black(),
            format_size(file.size).cyan(),
            file.name.bright_white()
        );
    }
    Ok(files)
}

pub fn handle_exports_delete(config: &AppConfig, args: &ArgMatches) -> Result<()> {
    let name = args
        .get_one::<String>("NAME")
        .ok_or_else(|| anyhow!("an export name is required"))?;
    open_exports(config)?.delete(name)?;
    println!("{} Deleted {}", "✓".green().bold(), name.bright_white());
    Ok(())
}

pub fn handle_backup(config: &AppConfig, args: &ArgMatches) -> Result<ExportFile> {
    let raw_format = args.get_one::<String>("format").map(String::as_str).unwrap_or("zip");
    let format = match ExportFormat::from_str(raw_format) {
        Some(ExportFormat::Csv) | None => {
            return Err(anyhow!("Backups are written as zip or json, not '{}'", raw_format));
        }
        Some(format) => format,
    };

    let db = open_database(config)?;
    let store = open_exports(config)?;
    let file = store.create(&db, ExportKind::Backup, format, &ExportFilter::default())?;

    println!(
        "{} Backup written to {} ({})",
        "✓".green().bold(),
        store.dir().join(&file.name).display().to_string().bright_white(),
        format_size(file.size).cyan()
    );
    Ok(file)
}

/// Restore from a path on disk, falling back to a stored export of that name.
pub fn handle_restore(config: &AppConfig, args: &ArgMatches) -> Result<RestoreReport> {
    let raw = args
        .get_one::<String>("FILE")
        .ok_or_else(|| anyhow!("a snapshot file is required"))?;
    let candidate = expand_path(raw);
    let path = if candidate.is_file() {
        candidate
    } else {
        open_exports(config)?
            .path_of(raw)
            .with_context(|| format!("No snapshot file or stored export named '{}'", raw))?
    };

    let db = open_database(config)?;
    let report = backup::restore_from_file(&db, &path)
        .with_context(|| format!("Failed to restore {}", path.display()))?;

    println!(
        "{} Restored {} records from {}",
        "✓".green().bold(),
        report.restored.to_string().cyan(),
        path.display().to_string().bright_white()
    );
    print_errors(&report.errors);
    Ok(report)
}

pub fn handle_favicon_fill(config: &AppConfig, args: &ArgMatches) -> Result<usize> {
    let overwrite = args.get_flag("overwrite");
    let db = open_database(config)?;
    let filled = favicon::fill_missing_icons(&db, overwrite)?;

    if filled == 0 && db.list_records::<FaviconApi>()?.iter().all(|api| !api.enabled) {
        println!("{} No enabled favicon API configured", "⚠".yellow().bold());
    } else {
        println!(
            "{} Updated icons on {} websites",
            "✓".green().bold(),
            filled.to_string().cyan()
        );
    }
    Ok(filled)
}

pub async fn handle_favicon_test(config: &AppConfig, args: &ArgMatches) -> Result<ProbeResult> {
    let id = *args
        .get_one::<i64>("id")
        .ok_or_else(|| anyhow!("--id is required"))?;
    let domain = args
        .get_one::<String>("domain")
        .ok_or_else(|| anyhow!("--domain is required"))?;

    let api = open_database(config)?.get_record::<FaviconApi>(id)?;
    let result = IconProber::new()?.probe(&api, domain).await?;

    let glyph = if result.ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!(
        "{} {} {} {}",
        glyph,
        result.status,
        result.url.bright_white(),
        result.content_type.as_deref().unwrap_or("-").bright_black()
    );
    Ok(result)
}

pub fn handle_category_tree(config: &AppConfig) -> Result<Vec<CategoryNode>> {
    let db = open_database(config)?;
    let tree = db.category_tree()?;
    if tree.is_empty() {
        println!("{} No categories yet", "→".blue());
    } else {
        print!("{}", format_category_tree(&tree));
    }
    Ok(tree)
}

pub fn handle_website_list(config: &AppConfig, args: &ArgMatches) -> Result<Vec<Website>> {
    let filter = WebsiteFilter {
        category_id: args.get_one::<i64>("category").copied(),
        status: parse_status(args.get_one::<String>("status"))?,
        keyword: args.get_one::<String>("search").cloned(),
        ..Default::default()
    };
    let db = open_database(config)?;
    let websites = db.list_websites(&filter)?;

    for website in &websites {
        let mut flags = Vec::new();
        if website.is_new {
            flags.push("new");
        }
        if website.is_featured {
            flags.push("featured");
        }
        if website.is_hot {
            flags.push("hot");
        }
        println!(
            "  #{:<5} {} {} {}",
            website.id,
            website.name.bright_white(),
            website.url.bright_black(),
            flags.join(",").yellow()
        );
    }
    println!(
        "{} {} websites",
        "✓".green().bold(),
        websites.len().to_string().cyan()
    );
    Ok(websites)
}
