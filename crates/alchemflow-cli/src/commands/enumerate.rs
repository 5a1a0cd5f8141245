use super::CommandContext;
use crate::cli::EnumerateArgs;
use crate::error::{CliError, Result};
use alchemflow::core::models::scaffold::ScaffoldConfig;
use alchemflow::core::models::substitution::SubstitutionVector;
use alchemflow::engine::enumeration::{count_structures, generate_structures};
use std::io::Write;
use std::path::Path;
use tracing::info;

const CHARGE_COLUMN: &str = "charge";

pub fn run(args: EnumerateArgs, context: &CommandContext) -> Result<()> {
    let config = context.load_config()?;
    let max_charge = config.max_charge(args.max_charge)?;
    let scaffold = config.scaffold();
    info!(
        groups = scaffold.groups().len(),
        "Enumerating substitution patterns with |charge| <= {}", max_charge
    );

    if args.count_only {
        let count = count_structures(&scaffold, max_charge)?;
        println!("{}", count);
        return Ok(());
    }

    let structures = generate_structures(&scaffold, max_charge)?;
    match &args.output {
        Some(path) => {
            write_csv(path, &scaffold, &structures)?;
            println!(
                "✓ {} substitution patterns written to: {}",
                structures.len(),
                path.display()
            );
        }
        None => {
            let stdout = std::io::stdout();
            write_lines(&mut stdout.lock(), &structures)?;
        }
    }
    Ok(())
}

fn write_lines(out: &mut impl Write, structures: &[SubstitutionVector]) -> Result<()> {
    for structure in structures {
        writeln!(out, "{} {}", structure, structure.charge())?;
    }
    out.flush()?;
    Ok(())
}

fn write_csv(
    path: &Path,
    scaffold: &ScaffoldConfig,
    structures: &[SubstitutionVector],
) -> Result<()> {
    let csv_err = |e: csv::Error| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;

    let mut header = scaffold.site_columns();
    header.push(CHARGE_COLUMN.to_string());
    writer.write_record(&header).map_err(csv_err)?;

    for structure in structures {
        let mut record: Vec<String> = structure.levels().iter().map(i8::to_string).collect();
        record.push(structure.charge().to_string());
        writer.write_record(&record).map_err(csv_err)?;
    }
    writer.flush()?;
    Ok(())
}
