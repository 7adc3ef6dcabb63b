//! fhirspec CLI
//!
//! Extracts the closed field/type configuration for FHIR resources from the R4
//! specification bundles, and prints the type enumeration those resources require.

mod logging;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fhirspec_extractor::discovery::{discover_required_types, render_type_enums};
use fhirspec_extractor::{extract_to_file, ExtractorConfig};
use fhirspec_models::Bundle;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fhirspec")]
#[command(about = "Extract resource field configs from the FHIR R4 specification bundles")]
#[command(version)]
#[command(
    long_about = "Reads profiles-resources.json and profiles-types.json from the FHIR R4\n\
specification and writes the allowed fields of each requested resource together with every\n\
data type those fields reach.\n\
\n\
Examples:\n  \
fhirspec extract --resources profiles-resources.json --types profiles-types.json --output spec.json\n  \
fhirspec extract ... --resource Immunization --resource Observation --output spec.textproto\n  \
fhirspec type-enums --resources profiles-resources.json --types profiles-types.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

/// Specification bundles and resource selection shared by all commands
#[derive(clap::Args, Debug, Clone)]
struct SpecArgs {
    /// Path to profiles-resources.json
    #[arg(long, value_name = "FILE")]
    resources: PathBuf,

    /// Path to profiles-types.json
    #[arg(long, value_name = "FILE")]
    types: PathBuf,

    /// Resource to include (repeatable, default: every supported resource)
    #[arg(long = "resource", value_name = "NAME")]
    resource_names: Vec<String>,

    /// JSON file with supported_resources and type_enumeration overrides
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the resource spec and write it to a .json, .txt or .textproto file
    Extract {
        #[command(flatten)]
        spec: SpecArgs,

        /// Output file; the extension selects the format
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Print the type enumeration entries required by the selected resources
    TypeEnums {
        #[command(flatten)]
        spec: SpecArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose, cli.log_json) {
        eprintln!("Failed to initialize logging: {e:#}");
    }

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Extract { spec, output } => {
            let inputs = SpecInputs::load(&spec)?;
            let count = extract_to_file(
                &inputs.resources,
                &inputs.types,
                &inputs.resource_names,
                inputs.config,
                &output,
            )
            .with_context(|| format!("extracting resource spec to {}", output.display()))?;
            tracing::info!(
                output = %output.display(),
                data_types = count,
                "Wrote resource spec"
            );
        }
        Commands::TypeEnums { spec } => {
            let inputs = SpecInputs::load(&spec)?;
            let required =
                discover_required_types(&inputs.resources, &inputs.types, &inputs.resource_names)
                    .context("discovering required types")?;
            print!(
                "{}",
                render_type_enums(inputs.config.type_enumeration.prefix(), &required)
            );
        }
    }
    Ok(())
}

/// Everything loaded from disk before extraction starts
struct SpecInputs {
    resources: Bundle,
    types: Bundle,
    resource_names: BTreeSet<String>,
    config: ExtractorConfig,
}

impl SpecInputs {
    fn load(args: &SpecArgs) -> Result<Self> {
        let config = match &args.config {
            Some(path) => load_config(path)?,
            None => ExtractorConfig::default(),
        };
        let resource_names = select_resources(&config, &args.resource_names)?;

        Ok(Self {
            resources: load_bundle(&args.resources)?,
            types: load_bundle(&args.types)?,
            resource_names,
            config,
        })
    }
}

fn load_bundle(path: &Path) -> Result<Bundle> {
    let bytes = fs::read(path).with_context(|| format!("reading bundle {}", path.display()))?;
    Bundle::from_slice(&bytes).with_context(|| format!("parsing bundle {}", path.display()))
}

fn load_config(path: &Path) -> Result<ExtractorConfig> {
    let bytes = fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
    ExtractorConfig::from_json_slice(&bytes)
        .with_context(|| format!("parsing config {}", path.display()))
}

/// Requested resources, or every supported resource when none were given
fn select_resources(config: &ExtractorConfig, requested: &[String]) -> Result<BTreeSet<String>> {
    if requested.is_empty() {
        return Ok(config.supported_resources.names());
    }
    let selected: BTreeSet<String> = requested.iter().cloned().collect();
    if selected.len() != requested.len() {
        bail!("--resource was given the same name more than once");
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_extract() {
        let cli = Cli::try_parse_from([
            "fhirspec",
            "-vv",
            "extract",
            "--resources",
            "r.json",
            "--types",
            "t.json",
            "--resource",
            "Immunization",
            "--resource",
            "Observation",
            "--output",
            "spec.json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Extract { spec, output } => {
                assert_eq!(spec.resource_names, vec!["Immunization", "Observation"]);
                assert_eq!(output, PathBuf::from("spec.json"));
                assert!(spec.config.is_none());
            }
            Commands::TypeEnums { .. } => panic!("expected extract"),
        }
    }

    #[test]
    fn test_extract_requires_output() {
        let result = Cli::try_parse_from([
            "fhirspec",
            "extract",
            "--resources",
            "r.json",
            "--types",
            "t.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_select_resources() {
        let config = ExtractorConfig::default();
        assert_eq!(select_resources(&config, &[]).unwrap().len(), 14);

        let picked = select_resources(&config, &["Patient".to_string()]).unwrap();
        assert_eq!(picked.into_iter().collect::<Vec<_>>(), vec!["Patient"]);

        let twice = ["Patient".to_string(), "Patient".to_string()];
        assert!(select_resources(&config, &twice).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "supported_resources": { "Patient": 9 } }"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.supported_resources.id_of("Patient"), Some(9));
        assert!(load_config(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_extract_command_writes_output() {
        let fixtures = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fhir-test-cases/r4");
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("spec.textproto");

        run(Commands::Extract {
            spec: SpecArgs {
                resources: fixtures.join("profiles-resources.json"),
                types: fixtures.join("profiles-types.json"),
                resource_names: vec!["Immunization".to_string()],
                config: None,
            },
            output: output.clone(),
        })
        .unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("resource_type_to_config {"));
    }
}
