use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};

use crate::{
    InvalidScenarioError, ScenarioBankError,
    core::{CELL_COUNT, MineLayout, Position},
};

use super::{Scenario, ScenarioBank};

const COORD_LEN: usize = size_of::<i32>();
const RECORD_LEN: usize = 2 * COORD_LEN + CELL_COUNT;

impl ScenarioBank {
    /// Reads a bank from `path`.
    pub fn load<P>(path: P) -> Result<Self, ScenarioBankError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }

    /// Writes the bank to `path`, replacing any existing file.
    pub fn save<P>(&self, path: P) -> Result<(), ScenarioBankError>
    where
        P: AsRef<Path>,
    {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Decodes scenario records until end-of-input.
    ///
    /// Fails on a partial record, an invalid scenario, or an input holding no
    /// record at all.
    pub fn read_from<R>(mut reader: R) -> Result<Self, ScenarioBankError>
    where
        R: Read,
    {
        let mut scenarios = vec![];
        let mut record = [0; RECORD_LEN];
        loop {
            let index = scenarios.len();
            match read_record(&mut reader, &mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                    return Err(ScenarioBankError::TruncatedRecord { index });
                }
                Err(err) => return Err(err.into()),
            }
            let scenario = decode_scenario(&record)
                .map_err(|source| ScenarioBankError::InvalidScenario { index, source })?;
            scenarios.push(scenario);
        }

        if scenarios.is_empty() {
            return Err(ScenarioBankError::Empty);
        }
        Ok(Self::new(scenarios))
    }

    /// Encodes every scenario as a fixed-size record.
    pub fn write_to<W>(&self, mut writer: W) -> io::Result<()>
    where
        W: Write,
    {
        for scenario in self.scenarios() {
            writer.write_all(&encode_scenario(scenario))?;
        }
        Ok(())
    }
}

/// Fills `buf` completely.
///
/// Returns `Ok(false)` on a clean end-of-input before the first byte, and an
/// `UnexpectedEof` error if input ends part-way through.
fn read_record<R>(reader: &mut R, buf: &mut [u8]) -> io::Result<bool>
where
    R: Read,
{
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    match filled {
        0 => Ok(false),
        n if n == buf.len() => Ok(true),
        _ => Err(io::ErrorKind::UnexpectedEof.into()),
    }
}

fn decode_scenario(record: &[u8; RECORD_LEN]) -> Result<Scenario, InvalidScenarioError> {
    let x = read_i32(record, 0);
    let y = read_i32(record, COORD_LEN);
    let (Ok(ux), Ok(uy)) = (usize::try_from(x), usize::try_from(y)) else {
        return Err(InvalidScenarioError::StartOutOfBounds {
            x: x.into(),
            y: y.into(),
        });
    };

    let mut mines = [false; CELL_COUNT];
    for (mine, byte) in mines.iter_mut().zip(&record[2 * COORD_LEN..]) {
        *mine = *byte == 1;
    }
    Scenario::new(Position::new(ux, uy), MineLayout::from_cells(mines))
}

fn read_i32(record: &[u8; RECORD_LEN], offset: usize) -> i32 {
    let mut bytes = [0; COORD_LEN];
    bytes.copy_from_slice(&record[offset..offset + COORD_LEN]);
    i32::from_le_bytes(bytes)
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn encode_scenario(scenario: &Scenario) -> [u8; RECORD_LEN] {
    let mut record = [0; RECORD_LEN];
    // start cell is on the board, so both coordinates fit in i32
    let start = scenario.start();
    record[..COORD_LEN].copy_from_slice(&(start.x as i32).to_le_bytes());
    record[COORD_LEN..2 * COORD_LEN].copy_from_slice(&(start.y as i32).to_le_bytes());
    for (byte, mine) in record[2 * COORD_LEN..]
        .iter_mut()
        .zip(scenario.mines().cells())
    {
        *byte = u8::from(*mine);
    }
    record
}
