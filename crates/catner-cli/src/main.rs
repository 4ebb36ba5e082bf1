use std::io::{self, Write};
use std::path::{Path, PathBuf};

use catner_config::{Config, ConfigError, LoadOptions, OutputSettings};
use catner_core::{
    build_unified_diff, ArticleSummary, CatalogError, CatalogResult, CatalogState, ExitCode,
    Target, STDOUT_PATH,
};
use clap::{ArgAction, Parser, Subcommand};
use flexi_logger::{Logger, LoggerHandle};
use log::{debug, info};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(author, version, about = "Edit BMEcat product catalogs", long_about = None)]
struct Cli {
    /// Path to the catalog XML file ('-' prints to stdout for init)
    #[arg(value_name = "FILE", allow_hyphen_values = true)]
    file: PathBuf,

    #[command(subcommand)]
    command: Command,

    /// Use this config file on top of discovered .catner.toml files
    #[arg(long = "config", value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Print a diff of the change without writing it
    #[arg(long = "dry-run", global = true)]
    dry_run: bool,

    /// Do not keep a .bak copy of the previous file
    #[arg(long = "no-backup", global = true)]
    no_backup: bool,

    /// Fail on documents missing required containers instead of adding them
    #[arg(long = "strict", global = true)]
    strict: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new, empty catalog
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the catalog as formatted XML
    Print,
    /// List the articles of the catalog
    List {
        /// Emit JSON instead of tab-separated rows
        #[arg(long)]
        json: bool,
    },
    /// Add a shipping territory (two-letter country code)
    AddTerritory { code: String },
    /// Set the catalog language (two-letter code)
    SetLocale { code: String },
    /// Set the generator info of the header
    SetGenerator { value: String },
    /// Add an article
    AddArticle {
        aid: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        descr: Option<String>,
    },
    /// Delete an article
    DelArticle { aid: String },
    /// Attach an image to an article
    AddImage {
        aid: String,
        path: String,
        #[arg(long)]
        mime: Option<String>,
    },
    /// Add or update an order unit of an article
    AddUnit {
        aid: String,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        factor: Option<String>,
        /// Make this the main order unit
        #[arg(long)]
        main: bool,
    },
    /// Assign an article to a category
    AddCategory { aid: String, category: String },
    /// Add a feature to an article
    AddFeature {
        aid: String,
        fid: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        descr: Option<String>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        value: Option<String>,
    },
    /// Delete a feature and renumber the remaining ones
    DelFeature { aid: String, fid: String },
    /// Add a variant to a feature
    AddVariant {
        aid: String,
        fid: String,
        vid: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Delete a variant of a feature
    DelVariant {
        aid: String,
        fid: String,
        vid: String,
    },
}

#[derive(Serialize)]
struct ArticleRow<'a> {
    aid: &'a str,
    title: &'a str,
    main_unit: &'a str,
    categories: usize,
    images: usize,
    features: usize,
}

impl<'a> From<&'a ArticleSummary> for ArticleRow<'a> {
    fn from(summary: &'a ArticleSummary) -> Self {
        ArticleRow {
            aid: &summary.aid,
            title: &summary.title,
            main_unit: &summary.main_unit,
            categories: summary.categories,
            images: summary.images,
            features: summary.features,
        }
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let _logger = init_logging(cli.verbose);
    match run(cli) {
        Ok(exit) | Err(exit) => std::process::ExitCode::from(exit as u8),
    }
}

fn init_logging(verbose: u8) -> Option<LoggerHandle> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    match Logger::try_with_env_or_str(level).and_then(|logger| logger.log_to_stderr().start()) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("failed to start logger: {err}");
            None
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, ExitCode> {
    let config = load_config(&cli)?;

    if let Command::Init { force } = cli.command {
        return init_catalog(&cli, &config, force).map_err(|err| report(&err, None));
    }

    let amend = config.document.amend && !cli.strict;
    let mut state = CatalogState::load(&cli.file, amend)
        .map_err(|err| report(&err, None))?
        .with_settings(config.defaults.clone(), output_settings(&cli, &config));

    match &cli.command {
        Command::Print => {
            return state
                .print_xml()
                .map(|()| ExitCode::Success)
                .map_err(|err| report(&err, None));
        }
        Command::List { json } => return list_articles(&state, *json),
        _ => {}
    }

    let before = state.to_xml_string().map_err(|err| report(&err, None))?;
    if let Err(err) = apply(&mut state, &cli.command) {
        return Err(report(&err, Some(&state)));
    }
    let after = state.to_xml_string().map_err(|err| report(&err, None))?;

    let display = cli.file.display().to_string();
    let diff = build_unified_diff(&before, &after, &display);
    if cli.dry_run {
        match diff {
            Some(diff) => {
                print!("{diff}");
                io::stdout().flush().ok();
            }
            None => println!("No changes (dry run)"),
        }
        return Ok(ExitCode::Success);
    }

    if diff.is_none() {
        println!("No changes applied.");
        return Ok(ExitCode::Success);
    }

    state.save().map_err(|err| report(&err, None))?;
    info!("event=cli_write module=cli path={display}");
    println!("Updated {display}");
    Ok(ExitCode::Success)
}

fn load_config(cli: &Cli) -> Result<Config, ExitCode> {
    let mut options = LoadOptions::default();
    if let Some(path) = &cli.config {
        options = options.with_override_path(path);
    }
    Config::load(options).map_err(|err| {
        eprintln!("catner: {err}");
        match err {
            ConfigError::Io { .. } | ConfigError::WorkingDirectory { .. } => ExitCode::Io,
            _ => ExitCode::InvalidValue,
        }
    })
}

fn output_settings(cli: &Cli, config: &Config) -> OutputSettings {
    OutputSettings {
        backup: config.output.backup && !cli.no_backup,
        ..config.output.clone()
    }
}

fn init_catalog(cli: &Cli, config: &Config, force: bool) -> CatalogResult<ExitCode> {
    let state = CatalogState::init_with(config)?
        .with_settings(config.defaults.clone(), output_settings(cli, config));

    let to_stdout = cli.file == Path::new(STDOUT_PATH);
    if cli.dry_run || to_stdout {
        state.print_xml()?;
        return Ok(ExitCode::Success);
    }
    if cli.file.exists() && !force {
        return Err(CatalogError::AlreadyExists(format!(
            "{} (use --force to overwrite)",
            cli.file.display()
        )));
    }
    state.write_xml(&cli.file)?;
    println!("Created {}", cli.file.display());
    Ok(ExitCode::Success)
}

fn list_articles(state: &CatalogState, json: bool) -> Result<ExitCode, ExitCode> {
    let summaries = state.article_summaries();
    if json {
        let rows: Vec<ArticleRow<'_>> = summaries.iter().map(ArticleRow::from).collect();
        let rendered = serde_json::to_string_pretty(&rows).map_err(|err| {
            eprintln!("catner: failed to render json: {err}");
            ExitCode::Other
        })?;
        println!("{rendered}");
        return Ok(ExitCode::Success);
    }

    for summary in &summaries {
        println!(
            "{}\t{}\t{}\t{} features",
            summary.aid, summary.title, summary.main_unit, summary.features
        );
    }
    Ok(ExitCode::Success)
}

fn apply(state: &mut CatalogState, command: &Command) -> CatalogResult<()> {
    debug!("event=cli_apply module=cli command={command:?}");
    match command {
        Command::Init { .. } | Command::Print | Command::List { .. } => Ok(()),
        Command::AddTerritory { code } => state.add_territory(code),
        Command::SetLocale { code } => state.set_locale(code),
        Command::SetGenerator { value } => state.set_generator(value),
        Command::AddArticle { aid, title, descr } => {
            state.add_article(aid, title.as_deref(), descr.as_deref())
        }
        Command::DelArticle { aid } => state.del_article(Some(aid.as_str())),
        Command::AddImage { aid, path, mime } => {
            state.add_article_image(Some(aid.as_str()), mime.as_deref(), path)
        }
        Command::AddUnit {
            aid,
            code,
            factor,
            main,
        } => state.add_article_unit(
            Some(aid.as_str()),
            code.as_deref(),
            factor.as_deref(),
            *main,
        ),
        Command::AddCategory { aid, category } => {
            state.add_article_category(Some(aid.as_str()), category)
        }
        Command::AddFeature {
            aid,
            fid,
            name,
            descr,
            unit,
            value,
        } => state.add_feature(
            Some(aid.as_str()),
            fid,
            name.as_deref(),
            descr.as_deref(),
            unit.as_deref(),
            value.as_deref(),
        ),
        Command::DelFeature { aid, fid } => {
            state.del_feature(Some(aid.as_str()), Some(fid.as_str()))
        }
        Command::AddVariant {
            aid,
            fid,
            vid,
            value,
        } => state.add_variant(Some(aid.as_str()), Some(fid.as_str()), vid, value),
        Command::DelVariant { aid, fid, vid } => {
            state.del_variant(
                Some(aid.as_str()),
                Some(fid.as_str()),
                Some(vid.as_str()),
            )
        }
    }
}

fn report(err: &CatalogError, state: Option<&CatalogState>) -> ExitCode {
    eprintln!("catner: {err}");
    if let (CatalogError::NotFound(Target::Article), Some(state)) = (err, state) {
        let known = state.article_summaries();
        if !known.is_empty() {
            eprintln!("Known articles:");
            for summary in known.iter().take(20) {
                eprintln!("  - {}", summary.aid);
            }
        }
    }
    err.exit_code()
}
