use std::io::{self, BufRead, Write};

const QUESTION: &str = "\nDo you want to undo all of the renaming?\n [1]yes\n [2]no\n --> ";

/// `Some(true)` for yes, `Some(false)` for no, `None` for anything else.
pub fn parse_answer(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "1" | "y" | "yes" => Some(true),
        "2" | "n" | "no" => Some(false),
        _ => None,
    }
}

/// Asks whether to undo the batch until a valid answer is given.
///
/// End of input counts as "no": the renames are kept and logged, which can
/// still be undone by hand from the log.
pub fn ask_undo(mut input: impl BufRead, mut output: impl Write) -> io::Result<bool> {
    let mut line = String::new();
    loop {
        output.write_all(QUESTION.as_bytes())?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        match parse_answer(&line) {
            Some(answer) => return Ok(answer),
            None => writeln!(output, "Input error. Please choose 1 or 2.")?,
        }
    }
}
