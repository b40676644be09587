use colored::Colorize;
use toolnav::handlers::*;
use toolnav::{command_argument_builder, config_from_matches};
use toolnav_core::print_banner;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let chosen_command = command_argument_builder().get_matches();
    let quiet = chosen_command.get_flag("quiet");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        return;
    }

    let config = config_from_matches(&chosen_command);

    let result = match chosen_command.subcommand() {
        Some(("init", args)) => handle_init(&config, args),
        Some(("serve", args)) => handle_serve(&config, args).await,
        Some(("import", args)) => handle_import(&config, args).map(drop),
        Some(("reconcile", args)) => handle_reconcile(&config, args).map(drop),
        Some(("dedupe", args)) => handle_dedupe(&config, args).map(drop),
        Some(("audit", args)) => handle_audit(&config, args).map(drop),
        Some(("export", args)) => handle_export(&config, args).map(drop),
        Some(("exports", primary_command)) => match primary_command.subcommand() {
            Some(("list", _)) => handle_exports_list(&config).map(drop),
            Some(("delete", args)) => handle_exports_delete(&config, args),
            _ => unreachable!("clap should ensure we don't get here"),
        },
        Some(("backup", args)) => handle_backup(&config, args).map(drop),
        Some(("restore", args)) => handle_restore(&config, args).map(drop),
        Some(("favicon", primary_command)) => match primary_command.subcommand() {
            Some(("fill", args)) => handle_favicon_fill(&config, args).map(drop),
            Some(("test", args)) => handle_favicon_test(&config, args).await.map(drop),
            _ => unreachable!("clap should ensure we don't get here"),
        },
        Some(("category", primary_command)) => match primary_command.subcommand() {
            Some(("tree", _)) => handle_category_tree(&config).map(drop),
            _ => unreachable!("clap should ensure we don't get here"),
        },
        Some(("website", primary_command)) => match primary_command.subcommand() {
            Some(("list", args)) => handle_website_list(&config, args).map(drop),
            _ => unreachable!("clap should ensure we don't get here"),
        },
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
