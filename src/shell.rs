// Line-oriented command reader on top of `FileSystem`.

use std::io::{BufRead, Write};

use log::warn;

use crate::error::{FsError, Result};
use crate::fs_ops::{CdOutcome, FileSystem};

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mkdir(String),
    Create(String),
    Ls,
    Pwd,
    Cd(String),
    Write { name: String, text: String },
    Read(String),
    Delete(String),
    Rmdir(String),
    Df { json: bool },
    Exit,
}

fn required(arg: Option<&str>, usage: &'static str) -> Result<String> {
    arg.map(str::to_string).ok_or(FsError::Usage(usage))
}

/// Splits `write`'s payload off the rest of the line. A leading quote is
/// dropped along with everything from the last quote onward.
fn payload(rest: &str) -> &str {
    match rest.strip_prefix('"') {
        Some(inner) => match inner.rfind('"') {
            Some(end) => &inner[..end],
            None => inner,
        },
        None => rest,
    }
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim_start()),
        None => (line, ""),
    };
    let mut args = rest.split_whitespace();

    let command = match cmd {
        "exit" => Command::Exit,
        "mkdir" => Command::Mkdir(required(args.next(), "mkdir <name>")?),
        "create" => Command::Create(required(args.next(), "create <name>")?),
        "ls" => Command::Ls,
        "pwd" => Command::Pwd,
        "cd" => Command::Cd(required(args.next(), "cd <dir>")?),
        "write" => {
            const USAGE: &str = "write <filename> \"text\"";
            let (name, text) = match rest.split_once(char::is_whitespace) {
                Some((name, text)) => (name, text.trim_start()),
                None => return Err(FsError::Usage(USAGE)),
            };
            if name.is_empty() || text.is_empty() {
                return Err(FsError::Usage(USAGE));
            }
            Command::Write {
                name: name.to_string(),
                text: payload(text).to_string(),
            }
        }
        "read" => Command::Read(required(args.next(), "read <filename>")?),
        "delete" => Command::Delete(required(args.next(), "delete <filename>")?),
        "rmdir" => Command::Rmdir(required(args.next(), "rmdir <dirname>")?),
        "df" => Command::Df {
            json: args.next() == Some("--json"),
        },
        other => return Err(FsError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

/// Interactive shell: reads commands from `input`, prints results to `output`.
pub struct Shell<R, W> {
    fs: FileSystem,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(fs: FileSystem, input: R, output: W) -> Self {
        Shell { fs, input, output }
    }

    pub fn fs(&self) -> &FileSystem {
        &self.fs
    }

    pub fn into_parts(self) -> (FileSystem, W) {
        (self.fs, self.output)
    }

    pub fn greet(&mut self) -> Result<()> {
        writeln!(self.output, "Initializing Virtual File System....")?;
        writeln!(self.output, "VFS initialized successfully.")?;
        writeln!(
            self.output,
            "Total Blocks: {} | Free Blocks: {}",
            self.fs.config().total_blocks,
            self.fs.free_block_count()
        )?;
        Ok(())
    }

    /// Tears the filesystem down and prints the closing line.
    pub fn farewell(&mut self) -> Result<()> {
        self.fs.shutdown();
        writeln!(self.output, "Memory released. Exiting program...")?;
        Ok(())
    }

    /// Runs until `exit` or end of input. Command failures are reported and
    /// the loop goes on; only I/O errors on the shell streams end it.
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.output, "Compact VFS - ready. Type 'exit' to quit.")?;
        let mut line = String::new();
        loop {
            write!(self.output, "{}", self.fs.prompt())?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output, "\nEOF received. Exiting shell.")?;
                return Ok(());
            }

            let outcome = match parse_line(&line) {
                Ok(Some(Command::Exit)) => return Ok(()),
                Ok(Some(command)) => self.execute(command),
                Ok(None) => Ok(()),
                Err(e) => Err(e),
            };
            match outcome {
                Ok(()) => {}
                Err(FsError::Io(e)) => return Err(FsError::Io(e)),
                Err(e) => {
                    warn!("command failed: {}", e);
                    writeln!(self.output, "Error: {}", e)?;
                }
            }
        }
    }

    /// Runs one command and prints its result.
    pub fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Mkdir(name) => {
                self.fs.mkdir(&name)?;
                writeln!(self.output, "Directory '{}' created successfully.", name)?;
            }
            Command::Create(name) => {
                self.fs.create(&name)?;
                writeln!(self.output, "File '{}' created successfully.", name)?;
            }
            Command::Ls => {
                let entries = self.fs.ls();
                if entries.is_empty() {
                    writeln!(self.output, "(empty)")?;
                }
                for entry in entries {
                    writeln!(self.output, "{}", entry)?;
                }
            }
            Command::Pwd => writeln!(self.output, "{}", self.fs.pwd())?,
            Command::Cd(target) => match self.fs.cd(&target)? {
                CdOutcome::Moved(path) => writeln!(self.output, "Moved to {}", path)?,
                CdOutcome::AlreadyAtRoot => writeln!(self.output, "Already at root")?,
            },
            Command::Write { name, text } => {
                let report = self.fs.write(&name, &text)?;
                writeln!(
                    self.output,
                    "Data written successfully (size={} bytes).",
                    report.bytes_written
                )?;
            }
            Command::Read(name) => {
                let data = self.fs.read(&name)?;
                if data.is_empty() {
                    writeln!(self.output, "(empty file)")?;
                } else {
                    self.output.write_all(&data)?;
                    writeln!(self.output)?;
                }
            }
            Command::Delete(name) => {
                self.fs.delete(&name)?;
                writeln!(self.output, "File deleted successfully.")?;
            }
            Command::Rmdir(name) => {
                self.fs.rmdir(&name)?;
                writeln!(self.output, "Directory '{}' removed successfully.", name)?;
            }
            Command::Df { json } => {
                let usage = self.fs.df();
                if json {
                    let rendered = serde_json::to_string(&usage)
                        .map_err(|e| FsError::Io(e.into()))?;
                    writeln!(self.output, "{}", rendered)?;
                } else {
                    writeln!(self.output, "Total Blocks: {}", usage.total_blocks)?;
                    writeln!(self.output, "Used Blocks: {}", usage.used_blocks)?;
                    writeln!(self.output, "Free Blocks: {}", usage.free_blocks)?;
                    writeln!(self.output, "Disk Usage: {:.2}%", usage.usage_percent)?;
                }
            }
            Command::Exit => {}
        }
        Ok(())
    }
}
