//! Descriptor Schema CLI
//!
//! Command-line interface for compiling descriptor tables into JSON Schemas
//! and validating configuration files against them.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use descriptor_schema::{
    check_refs, load_catalog, load_json, load_model, validate_instance, Catalog, CompileOptions,
    SchemaCompiler, ValidateError, DEFAULT_ID_BASE,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "descriptor-schema")]
#[command(about = "Compile type descriptors into documented JSON Schemas")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the schema of one root type
    Compile {
        /// Descriptor table (JSON)
        model: PathBuf,

        /// Canonical name of the root type
        #[arg(long, short)]
        root: String,

        /// Registry and snippet catalog (JSON)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Base URL of the document $id
        #[arg(long, default_value = DEFAULT_ID_BASE)]
        id_base: String,

        /// Name prefix of your own types (undocumented ones are reported)
        #[arg(long, default_value = "")]
        user_namespace: String,

        /// Name prefix of host-owned types (repeatable)
        #[arg(long = "host-namespace")]
        host_namespaces: Vec<String>,

        /// Prefix stripped from type names in documentation labels
        #[arg(long, default_value = "")]
        label_prefix: String,

        /// Fail (exit 1) if compilation produced warnings
        #[arg(long)]
        deny_warnings: bool,
    },

    /// Validate a configuration file against a compiled schema
    Validate {
        /// Compiled schema file
        schema: PathBuf,

        /// Configuration file to validate
        instance: PathBuf,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Check that every $ref of a compiled schema resolves
    Check {
        /// Compiled schema file
        schema: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compile {
            model,
            root,
            catalog,
            output,
            pretty,
            id_base,
            user_namespace,
            host_namespaces,
            label_prefix,
            deny_warnings,
        } => {
            let mut options = CompileOptions::new(user_namespace)
                .id_base(id_base)
                .label_prefix(label_prefix);
            for prefix in host_namespaces {
                options = options.host_namespace(prefix);
            }
            run_compile(CompileArgs {
                model,
                root,
                catalog,
                output,
                pretty,
                options,
                deny_warnings,
            })
        }

        Commands::Validate {
            schema,
            instance,
            json,
        } => run_validate(&schema, &instance, json),

        Commands::Check { schema } => run_check(&schema),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

struct CompileArgs {
    model: PathBuf,
    root: String,
    catalog: Option<PathBuf>,
    output: Option<PathBuf>,
    pretty: bool,
    options: CompileOptions,
    deny_warnings: bool,
}

fn run_compile(args: CompileArgs) -> Result<(), u8> {
    let CompileArgs {
        model,
        root,
        catalog,
        output,
        pretty,
        options,
        deny_warnings,
    } = args;

    let table = load_model(&model).map_err(|e| {
        eprintln!("Error loading model: {}", e);
        e.exit_code() as u8
    })?;

    let catalog = match catalog {
        Some(path) => load_catalog(&path).map_err(|e| {
            eprintln!("Error loading catalog: {}", e);
            e.exit_code() as u8
        })?,
        None => Catalog::new(),
    };

    let compiled = SchemaCompiler::new(&table)
        .registries(&catalog)
        .snippets(&catalog)
        .options(&options)
        .compile(&root)
        .map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })?;

    let json_output = if pretty {
        serde_json::to_string_pretty(&compiled.document)
    } else {
        serde_json::to_string(&compiled.document)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    // Warnings go out only after the document is complete.
    compiled.report();
    if !compiled.warnings.is_empty() {
        eprintln!(
            "Schema generated for {} with {} warning(s)",
            root,
            compiled.warnings.len()
        );
        if deny_warnings {
            return Err(1);
        }
    }

    Ok(())
}

fn run_validate(schema_path: &Path, instance_path: &Path, json_output: bool) -> Result<(), u8> {
    let schema = load_json(schema_path).map_err(|e| {
        report_error(json_output, &format!("loading schema: {}", e));
        e.exit_code() as u8
    })?;
    let instance = load_json(instance_path).map_err(|e| {
        report_error(json_output, &format!("loading instance: {}", e));
        e.exit_code() as u8
    })?;

    match validate_instance(&schema, &instance) {
        Ok(()) => {
            if json_output {
                println!(r#"{{"valid":true}}"#);
            } else {
                println!("Valid");
            }
            Ok(())
        }
        Err(ValidateError::Invalid { errors }) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "errors": errors
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                for error in errors {
                    eprintln!("  {}", error);
                }
            }
            Err(1)
        }
        Err(e) => {
            report_error(json_output, &e.to_string());
            Err(e.exit_code() as u8)
        }
    }
}

fn run_check(schema_path: &Path) -> Result<(), u8> {
    let schema = load_json(schema_path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let problems = check_refs(&schema);
    if problems.is_empty() {
        println!("OK");
        return Ok(());
    }

    eprintln!("Found {} problem(s):", problems.len());
    for problem in problems {
        eprintln!("  {}", problem);
    }
    Err(1)
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}
