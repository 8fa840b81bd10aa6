use crate::srt::{Cue, DEFAULT_POSITION};

use std::fmt::{self, Display, Write};

/// Renders cues as an SRT document: one numbered block per cue, blocks
/// separated by a blank line, and a single trailing newline.
pub struct Srt<'a>(pub &'a [Cue]);

impl Display for Srt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_subs(f, self.0)
    }
}

pub fn to_srt(cues: &[Cue]) -> String {
    Srt(cues).to_string()
}

/// Formats seconds as `HH:MM:SS,mmm`. Hours are not capped.
pub fn format_timestamp(seconds: f64) -> String {
    let total_secs = seconds.trunc() as u64;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    let millis = (seconds * 1000.0).floor() as u64 % 1000;
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

fn write_subs<W: Write>(buf: &mut W, cues: &[Cue]) -> fmt::Result {
    for (index, cue) in cues.iter().enumerate() {
        if index > 0 {
            buf.write_str("\n\n")?;
        }
        write_sub(buf, index + 1, cue)?;
    }
    buf.write_char('\n')
}

fn write_sub<W: Write>(buf: &mut W, sequence_number: usize, cue: &Cue) -> fmt::Result {
    writeln!(buf, "{}", sequence_number)?;
    write_ts(buf, cue.from)?;
    buf.write_str(" --> ")?;
    write_ts(buf, cue.to)?;
    buf.write_char('\n')?;
    if cue.position != DEFAULT_POSITION {
        write!(buf, "{{\\an{}}}", cue.position)?;
    }
    buf.write_str(&cue.text)
}

fn write_ts<W: Write>(buf: &mut W, seconds: f64) -> fmt::Result {
    buf.write_str(&format_timestamp(seconds))
}
