//! widecol CLI - resolve SQL column references against table metadata

mod args;
mod config;
mod metadata;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use sqlparser::dialect::GenericDialect;
use tracing::level_filters::LevelFilter;
use widecol_core::ast::{column_references, lower_statement};
use widecol_core::{
    resolver_with_dynamic_columns, ColumnDef, ColumnResolver, InMemoryProvider, Session,
};

use crate::args::{Args, Command};
use crate::config::Config;
use crate::metadata::MetadataFile;
use crate::output::{OutputFormatter, Resolution};

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match (args.quiet, args.verbose) {
        (true, _) => LevelFilter::ERROR,
        (false, 0) => LevelFilter::WARN,
        (false, 1) => LevelFilter::INFO,
        (false, 2) => LevelFilter::DEBUG,
        (false, _) => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .init();

    match run(args) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::find_and_load()?.unwrap_or_default(),
    };

    match args.command {
        Command::Resolve {
            sql,
            dynamic,
            no_auto_commit,
            format,
        } => {
            let config = config.merge_with_args(&args.metadata, no_auto_commit, &format);
            let formatter = OutputFormatter::new(config.output_format());
            let provider = load_provider(&config)?;
            let session = Session::new(Arc::new(provider)).with_auto_commit(config.auto_commit);

            let dynamic = dynamic
                .iter()
                .map(|decl| ColumnDef::parse(decl))
                .collect::<widecol_core::Result<Vec<_>>>()?;

            let statements =
                sqlparser::parser::Parser::parse_sql(&GenericDialect {}, &sql).into_diagnostic()?;
            let [statement] = statements.as_slice() else {
                miette::bail!("Expected exactly one statement, found {}", statements.len());
            };

            let resolver = match lower_statement(statement)
                .and_then(|lowered| resolver_with_dynamic_columns(&lowered, &session, &dynamic))
            {
                Ok(resolver) => resolver,
                Err(err) => {
                    formatter.print_error(&sql, &err)?;
                    return Ok(true);
                }
            };
            tracing::info!(tables = resolver.tables().len(), "built resolver");

            let references = match column_references(statement) {
                Ok(references) => references,
                Err(err) => {
                    formatter.print_error(&sql, &err)?;
                    return Ok(true);
                }
            };
            let resolutions: Vec<Resolution> = references
                .iter()
                .map(|name| Resolution::new(name, &resolver.resolve(name)))
                .collect();
            formatter.print_resolutions(&sql, &resolutions)?;

            let errors = resolutions.iter().filter(|r| r.is_error()).count();
            if errors > 0 && !args.quiet {
                eprintln!();
                eprintln!(
                    "Found {} unresolved reference(s) out of {}",
                    errors,
                    resolutions.len()
                );
            }
            Ok(errors > 0)
        }

        Command::Tables => {
            let config = config.merge_with_args(&args.metadata, false, &None);
            let formatter = OutputFormatter::new(config.output_format());
            let provider = load_provider(&config)?;
            formatter.print_schemas(&provider.cached_schemas())?;
            Ok(false)
        }
    }
}

fn load_provider(config: &Config) -> Result<InMemoryProvider> {
    let Some(path) = &config.metadata else {
        miette::bail!("No metadata file specified. Use --metadata or configure in widecol.toml");
    };
    MetadataFile::from_file(&PathBuf::from(path))?.into_provider()
}
