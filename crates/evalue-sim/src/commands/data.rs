use std::path::Path;

use evalue_core::{ErrorInfo, EvalueError};
use evalue_mom::Group;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Row {
    group: String,
    value: f64,
}

fn data_error(code: &str, err: impl ToString, path: &Path) -> EvalueError {
    EvalueError::Data(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

/// Reads `group,value` rows in arrival order. Groups are `1`/`2` or `a`/`b`.
pub fn load_observations(path: &Path) -> Result<Vec<(Group, f64)>, EvalueError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|err| data_error("csv-open", err, path))?;
    let mut rows = Vec::new();
    for (line, record) in reader.deserialize::<Row>().enumerate() {
        let row = record.map_err(|err| data_error("csv-row", err, path))?;
        let group = row.group.parse::<Group>().map_err(|err| {
            EvalueError::Data(err.info().clone().with_context("row", (line + 1).to_string()))
        })?;
        rows.push((group, row.value));
    }
    Ok(rows)
}

/// Splits observations into the two groups, keeping arrival order.
pub fn split(rows: &[(Group, f64)]) -> (Vec<f64>, Vec<f64>) {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for &(group, value) in rows {
        match group {
            Group::A => x.push(value),
            Group::B => y.push(value),
        }
    }
    (x, y)
}
