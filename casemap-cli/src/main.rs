use clap::{Args, Parser, Subcommand};
use eyre::{eyre, Result, WrapErr};
use serde_json::Map;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use casemap_core::dispatch::{CaseMap, ExtraCasePolicy};
use casemap_core::json::{self, TemplateOptions, TemplateResult};
use casemap_core::schema::SumSchema;

#[derive(Parser)]
#[command(name = "casemap")]
#[command(about = "Exhaustive case dispatch for tagged values")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cases of a sum schema
    Info {
        /// Sum schema file
        #[arg(short, long)]
        schema: PathBuf,
    },
    /// Check that a case mapping covers a sum schema
    Check {
        #[command(flatten)]
        mapping: MappingArgs,
    },
    /// Match every value of a file against a case mapping
    Dispatch {
        #[command(flatten)]
        mapping: MappingArgs,

        /// Values file (JSON array of tagged values)
        #[arg(long)]
        values: PathBuf,
    },
    /// Create example schema, case, and value files
    Example {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct MappingArgs {
    /// Sum schema file
    #[arg(short, long)]
    schema: PathBuf,

    /// Case templates file (JSON object of case name to result template)
    #[arg(short, long)]
    cases: PathBuf,

    /// Ignore templates for cases the schema does not declare
    #[arg(long)]
    allow_extra: bool,

    /// Allow cases without a template; matching them fails
    #[arg(long)]
    partial: bool,
}

impl MappingArgs {
    fn options(&self) -> TemplateOptions {
        TemplateOptions {
            extra_cases: if self.allow_extra {
                ExtraCasePolicy::Ignore
            } else {
                ExtraCasePolicy::Reject
            },
            partial: self.partial,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let mut out = io::stdout().lock();
    match &cli.command {
        Commands::Info { schema } => {
            show_info(schema, &mut out)?;
        }
        Commands::Check { mapping } => {
            check_mapping(mapping, &mut out)?;
        }
        Commands::Dispatch { mapping, values } => {
            dispatch_values(mapping, values, &mut out)?;
        }
        Commands::Example { output } => {
            create_examples(output, &mut out)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "casemap=warn",
        1 => "casemap=info",
        2 => "casemap=debug",
        _ => "casemap=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn load_schema(path: &Path) -> Result<SumSchema> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Cannot read schema {}", path.display()))?;
    let schema = json::parse_sum_schema(&content)
        .wrap_err_with(|| format!("Invalid schema {}", path.display()))?;
    debug!(sum = schema.name(), cases = schema.variants().len(), "loaded schema");
    Ok(schema)
}

fn load_templates(path: &Path) -> Result<Map<String, serde_json::Value>> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Cannot read cases {}", path.display()))?;
    let templates: serde_json::Value = serde_json::from_str(&content)?;
    match templates {
        serde_json::Value::Object(templates) => Ok(templates),
        _ => Err(eyre!(
            "Cases file {} must contain a JSON object",
            path.display()
        )),
    }
}

fn load_mapping(args: &MappingArgs) -> Result<(SumSchema, CaseMap<'static, TemplateResult>)> {
    let schema = load_schema(&args.schema)?;
    let templates = load_templates(&args.cases)?;
    let mapping = json::template_case_map(schema.clone(), &templates, args.options())
        .wrap_err_with(|| format!("Case mapping: FAIL ({})", args.cases.display()))?;
    Ok((schema, mapping))
}

fn show_info(path: &Path, out: &mut impl Write) -> Result<()> {
    let schema = load_schema(path)?;

    writeln!(out, "Sum: {}", schema.name())?;
    writeln!(out, "Cases: {}", schema.variants().len())?;
    for variant in schema.variants() {
        writeln!(
            out,
            "  {} (tag {}): {}",
            variant.name,
            variant.tag,
            variant.schema.kind()
        )?;
    }

    Ok(())
}

fn check_mapping(args: &MappingArgs, out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "Checking {} against {}",
        args.cases.display(),
        args.schema.display()
    )?;

    let schema = load_schema(&args.schema)?;
    let templates = load_templates(&args.cases)?;
    let mapping = match json::template_case_map(schema.clone(), &templates, args.options()) {
        Ok(mapping) => mapping,
        Err(e) => {
            writeln!(out, "Case mapping: FAIL - {}", e)?;
            return Err(eyre::Report::new(e));
        }
    };
    writeln!(out, "Case mapping: PASS")?;

    let missing = mapping.missing_cases();
    if missing.is_empty() {
        writeln!(
            out,
            "Exhaustive: all {} cases handled",
            schema.variants().len()
        )?;
    } else {
        writeln!(out, "Partial: no handler for {}", missing.join(", "))?;
    }

    Ok(())
}

fn dispatch_values(args: &MappingArgs, values_file: &Path, out: &mut impl Write) -> Result<()> {
    let (schema, mapping) = load_mapping(args)?;

    let content = fs::read_to_string(values_file)
        .wrap_err_with(|| format!("Cannot read values {}", values_file.display()))?;
    let values: serde_json::Value = serde_json::from_str(&content)?;
    let values = values.as_array().ok_or_else(|| {
        eyre!(
            "Values file {} must contain a JSON array",
            values_file.display()
        )
    })?;

    let matcher = mapping.matcher();
    for (index, item) in values.iter().enumerate() {
        let value = json::sum_from_json(item, &schema)
            .wrap_err_with(|| format!("Value {} is not a {}", index, schema.name()))?;
        let output = matcher(&value).wrap_err_with(|| format!("Value {}", index))?;
        let output = output.wrap_err_with(|| format!("Handler failed for value {}", index))?;
        writeln!(out, "{}", serde_json::to_string(&output)?)?;
    }

    info!(sum = schema.name(), count = values.len(), "dispatched values");
    Ok(())
}

fn create_examples(output_dir: &Path, out: &mut impl Write) -> Result<()> {
    writeln!(out, "Creating example files in: {}", output_dir.display())?;

    fs::create_dir_all(output_dir)?;

    let schema = serde_json::json!({
        "name": "option",
        "variants": [
            {"name": "absent", "tag": 0},
            {"name": "present", "tag": 1, "schema": {"type": "int"}}
        ]
    });
    let get_or_null = serde_json::json!({
        "absent": null,
        "present": "$payload"
    });
    let is_present = serde_json::json!({
        "absent": false,
        "present": true
    });
    let values = serde_json::json!([
        {"tag": "present", "value": 5},
        {"tag": "absent"},
        {"tag": "present", "value": 42}
    ]);

    let files = [
        ("option.schema.json", &schema),
        ("option.get-or-null.json", &get_or_null),
        ("option.is-present.json", &is_present),
        ("option.values.json", &values),
    ];
    for (name, content) in files {
        let path = output_dir.join(name);
        fs::write(&path, serde_json::to_string_pretty(content)?)?;
        writeln!(out, "Created: {}", path.display())?;
    }

    let schema_file = output_dir.join("option.schema.json");
    writeln!(out, "\nExample usage:")?;
    writeln!(
        out,
        "  casemap check --schema {} --cases {}",
        schema_file.display(),
        output_dir.join("option.is-present.json").display()
    )?;
    writeln!(
        out,
        "  casemap dispatch --schema {} --cases {} --values {}",
        schema_file.display(),
        output_dir.join("option.get-or-null.json").display(),
        output_dir.join("option.values.json").display()
    )?;

    Ok(())
}
