use std::io::{BufRead, Write};

/// Prints `question` and reads one line of the answer.
///
/// Returns `None` once the input is exhausted.
pub fn ask<R, W>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> anyhow::Result<Option<String>>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{question}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
