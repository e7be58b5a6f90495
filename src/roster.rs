//! Roster - Who races and in which color

use std::io::{BufRead, Write};

use crate::error::{RaceError, Result};
use crate::race_server::RacerColor;

pub const PROMPT: &str = "Enter racer names, separated by commas (or press Enter for defaults): ";

/// Split a comma separated line into title-cased names.
///
/// Falls back to `defaults` when the line holds no usable name.
pub fn parse_names(raw: &str, defaults: &[String]) -> Vec<String> {
    let names: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(title_case)
        .collect();

    if names.is_empty() {
        defaults.to_vec()
    } else {
        names
    }
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_word = false;
    for c in name.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Ask for racer names on `output` and read one line from `input`
pub fn prompt_names<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    defaults: &[String],
) -> Result<Vec<String>> {
    output.write_all(PROMPT.as_bytes())?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(parse_names(&line, defaults))
}

/// One color per racer, cycling through the palette
pub fn assign_colors(count: usize, palette: &[String]) -> Result<Vec<RacerColor>> {
    if palette.is_empty() {
        return Err(RaceError::invalid("color palette is empty"));
    }
    Ok(palette
        .iter()
        .cycle()
        .take(count)
        .map(|color| RacerColor::new(color.as_str()))
        .collect())
}
