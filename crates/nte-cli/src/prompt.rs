use std::io::{self, BufRead, Write};

/// Ask a yes/no question on stdin. Anything other than `y`/`yes` counts as no.
pub fn confirm(message: &str) -> io::Result<bool> {
    let stdin = io::stdin();
    confirm_with(message, &mut stdin.lock(), &mut io::stderr())
}

pub fn confirm_with(
    message: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<bool> {
    write!(output, "{} [y/N]: ", message)?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
