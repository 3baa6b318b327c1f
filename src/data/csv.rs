//! Training examples as CSV
//!
//! One example per row: the input values followed by the output values.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::training::LabelledData;
use crate::{BetbotError, Result};

/// Write `examples` to `path`, one comma-separated row each
pub fn write_training_csv<P: AsRef<Path>>(path: P, examples: &[LabelledData]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(path)?);
    for example in examples {
        let row: Vec<String> = example
            .inputs
            .iter()
            .chain(example.outputs.iter())
            .map(|v| v.to_string())
            .collect();
        writeln!(writer, "{}", row.join(","))?;
    }
    writer.flush()?;

    log::info!("Wrote {} examples to {}", examples.len(), path.display());
    Ok(())
}

/// Read examples from `path`; the last `output_width` columns are outputs
///
/// Blank lines are skipped. Every other row must have the same number of
/// columns, and more than `output_width` of them.
pub fn load_training_csv<P: AsRef<Path>>(path: P, output_width: usize) -> Result<Vec<LabelledData>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut examples = Vec::new();
    let mut width: Option<usize> = None;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let values = parse_row(&line, line_number)?;
        if values.len() <= output_width {
            return Err(BetbotError::Parse(format!(
                "Line {}: expected more than {} columns, got {}",
                line_number,
                output_width,
                values.len()
            )));
        }
        match width {
            Some(expected) if expected != values.len() => {
                return Err(BetbotError::Parse(format!(
                    "Line {}: expected {} columns, got {}",
                    line_number,
                    expected,
                    values.len()
                )));
            }
            _ => width = Some(values.len()),
        }

        let split = values.len() - output_width;
        examples.push(LabelledData::new(values[..split].to_vec(), values[split..].to_vec()));
    }

    log::info!("Loaded {} examples from {}", examples.len(), path.display());
    Ok(examples)
}

fn parse_row(line: &str, line_number: usize) -> Result<Vec<f64>> {
    line.split(',')
        .map(|field| {
            let field = field.trim();
            field.parse::<f64>().map_err(|_| {
                BetbotError::Parse(format!("Line {}: invalid number '{}'", line_number, field))
            })
        })
        .collect()
}
