//! Output formatting for the manager tools.

use std::io::{self, Write};

use crate::error::Error;
use crate::message::Message;

/// Write one line per IID of a response: `iid = value`, or the error code
/// when the slot failed.
pub fn write_response<W: Write>(out: &mut W, response: &Message) -> io::Result<()> {
    if response.iids.is_empty() {
        for code in &response.errors {
            writeln!(out, "error {}", code)?;
        }
        return Ok(());
    }
    for (i, iid) in response.iids.iter().enumerate() {
        let code = response.errors.get(i).copied().unwrap_or(0);
        match response.values.get(i) {
            Some(value) if code == 0 => writeln!(out, "{} = {}", iid, value)?,
            _ => writeln!(out, "{} = error {}", iid, code)?,
        }
    }
    Ok(())
}

/// Write an error to stderr.
pub fn write_error(error: &Error) {
    eprintln!("Error: {}", error);
}
