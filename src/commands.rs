//! Parsing of `REF: INPUT` edit commands.

use anyhow::{Context, Result, bail};
use gridcalc_core::{CellRef, parse_cell_ref};

/// One cell edit from the command line or stdin.
#[derive(Debug, PartialEq)]
pub struct Edit {
    pub cell: CellRef,
    pub input: String,
}

/// Split `REF: INPUT` at the first colon. One space after the colon is dropped,
/// the rest of the input is kept verbatim.
pub fn parse_edit(line: &str) -> Result<Edit> {
    let Some((reference, input)) = line.split_once(':') else {
        bail!("Expected REF: INPUT, got {:?}", line);
    };
    let cell = parse_cell_ref(reference).with_context(|| format!("in edit {:?}", line))?;
    let input = input.strip_prefix(' ').unwrap_or(input);
    Ok(Edit {
        cell,
        input: input.to_string(),
    })
}

/// Edits from stdin: one per line, skipping blank lines and `#` comments.
pub fn parse_edit_lines(text: &str) -> Result<Vec<Edit>> {
    text.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(parse_edit)
        .collect()
}
