use crate::CLAP_STYLING;
use clap::{arg, command};
use std::path::PathBuf;
use toolnav_core::config::DEFAULT_DATA_DIR;

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("toolnav")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("toolnav")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-d --"data-dir" <PATH>)
                .required(false)
                .help("Directory holding toolnav.db and the exports folder")
                .default_value(DEFAULT_DATA_DIR)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Creates the data directory, database and export folder")
                .arg(
                    arg!(-f --"force")
                        .help("Drop any existing database at the data directory first")
                        .required(false),
                ),
        )
        .subcommand(
            command!("serve")
                .about("Serves the REST API")
                .arg(
                    arg!(-b --"bind" <ADDR>)
                        .required(false)
                        .help("Address to listen on")
                        .default_value("127.0.0.1:3000"),
                )
                .arg(
                    arg!(--"dataset-root" <PATH>)
                        .required(false)
                        .help("Only allow reconcile requests to read datasets under this directory")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            command!("import")
                .about("Inserts the tools of a dataset file under a top-level category")
                .arg(
                    arg!(-s --"source" <PATH>)
                        .required(true)
                        .help("Path to the JS dataset file"),
                )
                .arg(
                    arg!(-r --"root" <SLUG>)
                        .required(true)
                        .help("Slug of the top-level category to import into"),
                ),
        )
        .subcommand(
            command!("reconcile")
                .about(
                    "Moves a page's websites into the subcategories a dataset file assigns \
                them to",
                )
                .arg(
                    arg!(-p --"page" <SLUG>)
                        .required(true)
                        .help("Slug of the page to reconcile"),
                )
                .arg(
                    arg!(-s --"source" <PATH>)
                        .required(true)
                        .help("Path to the JS dataset file"),
                )
                .arg(
                    arg!(-r --"rules" <RULES>)
                        .required(false)
                        .help("Comma separated match rules: slug, name, domain, split")
                        .default_value("slug,name,domain,split"),
                )
                .arg(
                    arg!(-n --"dry-run")
                        .help("Report the moves without writing them")
                        .required(false),
                ),
        )
        .subcommand(
            command!("dedupe")
                .about("Removes websites whose normalised URL repeats, keeping the oldest")
                .arg(
                    arg!(-n --"dry-run")
                        .help("Report the duplicates without deleting them")
                        .required(false),
                ),
        )
        .subcommand(
            command!("audit")
                .about("Lists websites left directly on a top-level category that has subcategories")
                .arg(
                    arg!(-p --"page" <SLUG>)
                        .required(true)
                        .help("Slug of the page to audit"),
                ),
        )
        .subcommand(
            command!("export")
                .about("Writes an export file into the export directory")
                .arg(
                    arg!(-k --"kind" <KIND>)
                        .required(true)
                        .help("What to export")
                        .value_parser(["websites", "categories", "settings", "backup"]),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Output format")
                        .value_parser(["csv", "json", "zip"])
                        .default_value("json"),
                )
                .arg(
                    arg!(-c --"category" <ID>)
                        .required(false)
                        .help("Only websites in this category or its subcategories")
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(
                    arg!(--"status" <STATUS>)
                        .required(false)
                        .help("Only websites flagged with this status")
                        .value_parser(["new", "featured", "hot"]),
                )
                .arg(
                    arg!(--"from" <DATE>)
                        .required(false)
                        .help("Created on or after YYYY-MM-DD"),
                )
                .arg(
                    arg!(--"to" <DATE>)
                        .required(false)
                        .help("Created on or before YYYY-MM-DD"),
                ),
        )
        .subcommand(
            command!("exports")
                .about("Manage stored export files")
                .subcommand_required(true)
                .subcommand(command!("list").about("List stored exports, newest first"))
                .subcommand(
                    command!("delete")
                        .about("Delete a stored export")
                        .arg(arg!(<NAME>).help("File name as shown by `exports list`")),
                ),
        )
        .subcommand(
            command!("backup")
                .about("Writes a full backup of settings and content")
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Backup format")
                        .value_parser(["zip", "json"])
                        .default_value("zip"),
                ),
        )
        .subcommand(
            command!("restore")
                .about("Restores a settings export or backup")
                .arg(
                    arg!(<FILE>)
                        .help("Path to a snapshot file, or the name of a stored export"),
                ),
        )
        .subcommand(
            command!("favicon")
                .about("Favicon API tools")
                .subcommand_required(true)
                .subcommand(
                    command!("fill")
                        .about("Fill website icons from the first enabled favicon API")
                        .arg(
                            arg!(--"overwrite")
                                .help("Replace icons that are already set")
                                .required(false),
                        ),
                )
                .subcommand(
                    command!("test")
                        .about("Probe a favicon API against a domain")
                        .arg(
                            arg!(-i --"id" <ID>)
                                .required(true)
                                .help("Favicon API id")
                                .value_parser(clap::value_parser!(i64)),
                        )
                        .arg(
                            arg!(--"domain" <DOMAIN>)
                                .required(true)
                                .help("Domain to look up, e.g. github.com"),
                        ),
                ),
        )
        .subcommand(
            command!("category")
                .about("Inspect categories")
                .subcommand_required(true)
                .subcommand(command!("tree").about("Print top-level categories and their children")),
        )
        .subcommand(
            command!("website")
                .about("Inspect websites")
                .subcommand_required(true)
                .subcommand(
                    command!("list")
                        .about("List websites")
                        .arg(
                            arg!(-c --"category" <ID>)
                                .required(false)
                                .help("Only websites in this category or its subcategories")
                                .value_parser(clap::value_parser!(i64)),
                        )
                        .arg(
                            arg!(--"status" <STATUS>)
                                .required(false)
                                .help("Only websites flagged with this status")
                                .value_parser(["new", "featured", "hot"]),
                        )
                        .arg(
                            arg!(-s --"search" <KEYWORD>)
                                .required(false)
                                .help("Match against name, URL and description"),
                        ),
                ),
        )
}
