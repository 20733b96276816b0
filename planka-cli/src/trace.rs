//! Scan traces for `replay`.
//!
//! One step per line: how many scans to run, then the switches that are
//! closed during those scans as `row:col` pairs. Every switch not listed is
//! open. `#` starts a comment.
//!
//! ```text
//! # tap Tab/Alt
//! 10 1:0
//! 10
//! ```

use anyhow::{bail, Context, Result};
use planka_keymap::{COLS, ROWS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub scans: usize,
    pub closed: Vec<(usize, usize)>,
}

pub fn parse(text: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let step = parse_step(line).with_context(|| format!("line {line_no}: {line:?}"))?;
        steps.push(step);
    }
    Ok(steps)
}

fn parse_step(line: &str) -> Result<Step> {
    let mut fields = line.split_whitespace();
    let scans = fields.next().unwrap_or_default();
    let scans = scans
        .parse()
        .with_context(|| format!("bad scan count {scans:?}"))?;

    let closed = fields.map(parse_position).collect::<Result<_>>()?;
    Ok(Step { scans, closed })
}

fn parse_position(field: &str) -> Result<(usize, usize)> {
    let Some((row, col)) = field.split_once(':') else {
        bail!("expected row:col, got {field:?}");
    };
    let row: usize = row
        .parse()
        .with_context(|| format!("bad row in {field:?}"))?;
    let col: usize = col
        .parse()
        .with_context(|| format!("bad column in {field:?}"))?;
    if row >= ROWS || col >= COLS {
        bail!("{field} is outside the {ROWS}x{COLS} matrix");
    }
    Ok((row, col))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn steps_comments_and_blank_lines() {
        let steps = parse("# start\n\n10 1:0 4:13  # two keys\n  3\n").unwrap();
        assert_eq!(
            steps,
            vec![
                Step {
                    scans: 10,
                    closed: vec![(1, 0), (4, 13)],
                },
                Step {
                    scans: 3,
                    closed: vec![],
                },
            ]
        );
    }

    #[test]
    fn errors_name_the_line() {
        let err = parse("5\n5 2-3\n").unwrap_err();
        assert!(format!("{err:#}").starts_with("line 2: "), "{err:#}");

        let err = parse("x 1:1").unwrap_err();
        assert!(format!("{err:#}").contains("bad scan count"), "{err:#}");
    }

    #[test]
    fn positions_must_be_on_the_board() {
        assert!(parse("1 4:13").is_ok());
        assert!(parse("1 5:0").is_err());
        assert!(parse("1 0:14").is_err());
    }
}
