use std::{
    fmt,
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::model::agent_model::AgentModel;

/// Destination of a command's JSON output: a file, or stdout when no path is given.
#[derive(Debug)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stdout => f.write_str("stdout"),
            Output::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Output {
    /// Pretty-prints `value` as JSON to `output_path`, or to stdout if `None`.
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let output = output_path.map_or(Output::Stdout, Output::File);
        match &output {
            Output::Stdout => output.write_json(&mut io::stdout().lock(), value),
            Output::File(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output file: {output}"))?;
                output.write_json(&mut BufWriter::new(file), value)
            }
        }
    }

    fn write_json<W, T>(&self, writer: &mut W, value: &T) -> anyhow::Result<()>
    where
        W: Write,
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *writer, value)
            .with_context(|| format!("Failed to write JSON to {self}"))?;
        writeln!(writer)
            .and_then(|()| writer.flush())
            .with_context(|| format!("Failed to flush output to {self}"))
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))
}

/// Reads an agent model and checks its rules.
pub fn read_agent_model_file<P>(path: P) -> anyhow::Result<AgentModel>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let model: AgentModel = read_json_file("agent model", path)?;
    model
        .validate()
        .with_context(|| format!("Invalid agent model: {}", path.display()))?;
    Ok(model)
}
