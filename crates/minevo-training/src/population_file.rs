//! Binary population file.
//!
//! All values are little-endian and written field by field:
//!
//! ```text
//! population_count: i32
//! repeated population_count times:
//!     rule_count: i32
//!     repeated rule_count times:
//!         number_condition:  i32
//!         hidden_condition:  i32
//!         flagged_condition: i32
//!         near_edge:         u8 (0 or 1)
//!         has_pattern:       u8 (0 or 1)
//!         scope:             i32
//!         priority:          i32
//!         action:            i32 (0 = reveal hidden, 1 = place flag)
//!     fitness: f64
//! ```
//!
//! A file only loads if its population and rule counts match the expected shape
//! and every field lies in its domain. There is no partial load.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    ops::RangeInclusive,
    path::Path,
};

use minevo_evaluator::rule::{
    FLAGGED_CONDITION_RANGE, HIDDEN_CONDITION_RANGE, NUMBER_CONDITION_RANGE, PRIORITY_RANGE,
    Rule, RuleAction, SCOPE_RANGE,
};

use crate::genetic::{Individual, Population};

/// Failure to load a population file.
///
/// Every variant is recoverable by starting from a fresh random population.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum PopulationFileError {
    #[display("failed to access population file: {_0}")]
    #[from]
    Io(#[error(source)] io::Error),
    #[display("population file ends unexpectedly")]
    Truncated,
    #[display("population file holds {actual} individuals, expected {expected}")]
    PopulationCount { expected: usize, actual: i32 },
    #[display("individual #{individual} holds {actual} rules, expected {expected}")]
    RuleCount {
        individual: usize,
        expected: usize,
        actual: i32,
    },
    #[display("individual #{individual} rule #{rule}: {field} = {value} is out of range")]
    InvalidField {
        individual: usize,
        rule: usize,
        field: &'static str,
        value: i64,
    },
}

impl Population {
    /// Reads a population of `population_size` individuals with `rule_count` rules each.
    pub fn load<P>(
        path: P,
        population_size: usize,
        rule_count: usize,
    ) -> Result<Self, PopulationFileError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file), population_size, rule_count)
    }

    /// Writes the population to `path`, replacing any existing file.
    ///
    /// The write is not atomic: an interrupted save can leave a truncated file,
    /// which the next [`load`](Self::load) rejects.
    pub fn save<P>(&self, path: P) -> Result<(), PopulationFileError>
    where
        P: AsRef<Path>,
    {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Decodes a population, reporting a short read as
    /// [`Truncated`](PopulationFileError::Truncated).
    pub fn read_from<R>(
        reader: R,
        population_size: usize,
        rule_count: usize,
    ) -> Result<Self, PopulationFileError>
    where
        R: Read,
    {
        Self::decode(reader, population_size, rule_count).map_err(|err| match err {
            PopulationFileError::Io(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                PopulationFileError::Truncated
            }
            err => err,
        })
    }

    fn decode<R>(
        mut reader: R,
        population_size: usize,
        rule_count: usize,
    ) -> Result<Self, PopulationFileError>
    where
        R: Read,
    {
        let actual = read_i32(&mut reader)?;
        if usize::try_from(actual).ok() != Some(population_size) {
            return Err(PopulationFileError::PopulationCount {
                expected: population_size,
                actual,
            });
        }

        let mut individuals = Vec::with_capacity(population_size);
        for individual in 0..population_size {
            let actual = read_i32(&mut reader)?;
            if usize::try_from(actual).ok() != Some(rule_count) {
                return Err(PopulationFileError::RuleCount {
                    individual,
                    expected: rule_count,
                    actual,
                });
            }
            let rules = (0..rule_count)
                .map(|rule| {
                    read_rule(&mut reader).map_err(|err| match err {
                        RuleError::Io(err) => err.into(),
                        RuleError::Field { field, value } => PopulationFileError::InvalidField {
                            individual,
                            rule,
                            field,
                            value,
                        },
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let fitness = read_f64(&mut reader)?;
            individuals.push(Individual::new(rules, fitness));
        }
        Ok(Self::new(individuals))
    }

    pub fn write_to<W>(&self, mut writer: W) -> io::Result<()>
    where
        W: Write,
    {
        write_count(&mut writer, self.len())?;
        for ind in self.individuals() {
            write_count(&mut writer, ind.rules().len())?;
            for rule in ind.rules() {
                write_rule(&mut writer, rule)?;
            }
            writer.write_all(&ind.fitness().to_le_bytes())?;
        }
        Ok(())
    }
}

#[derive(derive_more::From)]
enum RuleError {
    #[from]
    Io(io::Error),
    Field { field: &'static str, value: i64 },
}

fn read_rule<R>(reader: &mut R) -> Result<Rule, RuleError>
where
    R: Read,
{
    let number_condition = read_ranged(reader, "number_condition", NUMBER_CONDITION_RANGE)?;
    let hidden_condition = read_ranged(reader, "hidden_condition", HIDDEN_CONDITION_RANGE)?;
    let flagged_condition = read_ranged(reader, "flagged_condition", FLAGGED_CONDITION_RANGE)?;
    let near_edge = read_bool(reader, "near_edge")?;
    let has_pattern = read_bool(reader, "has_pattern")?;
    let scope = read_ranged(reader, "scope", SCOPE_RANGE)?;
    let priority = read_ranged(reader, "priority", PRIORITY_RANGE)?;
    let code = read_i32(reader)?;
    let action = RuleAction::from_code(code).ok_or(RuleError::Field {
        field: "action",
        value: code.into(),
    })?;
    Ok(Rule {
        number_condition,
        hidden_condition,
        flagged_condition,
        near_edge,
        has_pattern,
        scope,
        priority,
        action,
    })
}

fn read_ranged<R>(
    reader: &mut R,
    field: &'static str,
    range: RangeInclusive<u8>,
) -> Result<u8, RuleError>
where
    R: Read,
{
    let value = read_i32(reader)?;
    u8::try_from(value)
        .ok()
        .filter(|v| range.contains(v))
        .ok_or(RuleError::Field {
            field,
            value: value.into(),
        })
}

fn read_bool<R>(reader: &mut R, field: &'static str) -> Result<bool, RuleError>
where
    R: Read,
{
    let mut buf = [0];
    reader.read_exact(&mut buf)?;
    match buf[0] {
        0 => Ok(false),
        1 => Ok(true),
        value => Err(RuleError::Field {
            field,
            value: value.into(),
        }),
    }
}

fn read_i32<R>(reader: &mut R) -> io::Result<i32>
where
    R: Read,
{
    let mut buf = [0; size_of::<i32>()];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_f64<R>(reader: &mut R) -> io::Result<f64>
where
    R: Read,
{
    let mut buf = [0; size_of::<f64>()];
    reader.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

fn write_count<W>(writer: &mut W, count: usize) -> io::Result<()>
where
    W: Write,
{
    let count = i32::try_from(count).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "count does not fit in i32")
    })?;
    writer.write_all(&count.to_le_bytes())
}

fn write_rule<W>(writer: &mut W, rule: &Rule) -> io::Result<()>
where
    W: Write,
{
    for value in [
        rule.number_condition,
        rule.hidden_condition,
        rule.flagged_condition,
    ] {
        writer.write_all(&i32::from(value).to_le_bytes())?;
    }
    writer.write_all(&[u8::from(rule.near_edge), u8::from(rule.has_pattern)])?;
    for value in [rule.scope, rule.priority] {
        writer.write_all(&i32::from(value).to_le_bytes())?;
    }
    writer.write_all(&rule.action.code().to_le_bytes())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    const RULE_LEN: usize = 6 * 4 + 2;

    fn sample_population(size: usize, rule_count: usize) -> Population {
        let mut rng = Pcg32::seed_from_u64(0);
        let population = Population::random(size, rule_count, &mut rng);
        Population::new(
            population
                .individuals()
                .iter()
                .enumerate()
                .map(|(i, ind)| Individual::new(ind.rules().to_vec(), 1.5 - i as f64))
                .collect(),
        )
    }

    fn encode(population: &Population) -> Vec<u8> {
        let mut bytes = vec![];
        population.write_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_layout() {
        let bytes = encode(&sample_population(3, 5));
        assert_eq!(bytes.len(), 4 + 3 * (4 + 5 * RULE_LEN + 8));
        assert_eq!(bytes[..4], 3_i32.to_le_bytes());
        assert_eq!(bytes[4..8], 5_i32.to_le_bytes());
        // fitness of the first individual follows its rules
        let fitness_at = 8 + 5 * RULE_LEN;
        assert_eq!(bytes[fitness_at..fitness_at + 8], 1.5_f64.to_le_bytes());
    }

    #[test]
    fn test_roundtrip_is_bit_identical() {
        let population = sample_population(4, 150);
        let bytes = encode(&population);
        let decoded = Population::read_from(bytes.as_slice(), 4, 150).unwrap();
        assert_eq!(decoded, population);
        assert_eq!(encode(&decoded), bytes);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("population.dat");
        let population = sample_population(5, 20);
        population.save(&path).unwrap();
        assert_eq!(Population::load(&path, 5, 20).unwrap(), population);
    }

    #[test]
    fn test_count_mismatch() {
        let bytes = encode(&sample_population(3, 5));
        assert!(matches!(
            Population::read_from(bytes.as_slice(), 4, 5),
            Err(PopulationFileError::PopulationCount {
                expected: 4,
                actual: 3
            })
        ));
        assert!(matches!(
            Population::read_from(bytes.as_slice(), 3, 6),
            Err(PopulationFileError::RuleCount {
                individual: 0,
                expected: 6,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_truncated() {
        let bytes = encode(&sample_population(3, 5));
        for len in [0, 2, 10, bytes.len() - 1] {
            assert!(
                matches!(
                    Population::read_from(&bytes[..len], 3, 5),
                    Err(PopulationFileError::Truncated)
                ),
                "len = {len}"
            );
        }
    }

    #[test]
    fn test_out_of_domain_fields() {
        let bytes = encode(&sample_population(2, 3));
        let first_rule = 8;

        let mut bad_scope = bytes.clone();
        let scope_at = first_rule + 3 * 4 + 2;
        bad_scope[scope_at..scope_at + 4].copy_from_slice(&3_i32.to_le_bytes());
        assert!(matches!(
            Population::read_from(bad_scope.as_slice(), 2, 3),
            Err(PopulationFileError::InvalidField {
                individual: 0,
                rule: 0,
                field: "scope",
                value: 3
            })
        ));

        let mut bad_bool = bytes.clone();
        bad_bool[first_rule + 3 * 4] = 2;
        assert!(matches!(
            Population::read_from(bad_bool.as_slice(), 2, 3),
            Err(PopulationFileError::InvalidField {
                field: "near_edge",
                ..
            })
        ));

        let mut bad_action = bytes;
        let action_at = first_rule + 5 * 4 + 2;
        bad_action[action_at..action_at + 4].copy_from_slice(&(-1_i32).to_le_bytes());
        assert!(matches!(
            Population::read_from(bad_action.as_slice(), 2, 3),
            Err(PopulationFileError::InvalidField {
                field: "action",
                value: -1,
                ..
            })
        ));
    }

    #[test]
    fn test_read_failure_other_than_eof_stays_io() {
        struct FailingReader;
        impl Read for FailingReader {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            }
        }
        let err = Population::read_from(FailingReader, 1, 1).unwrap_err();
        assert!(
            matches!(err, PopulationFileError::Io(ref e) if e.kind() == io::ErrorKind::PermissionDenied)
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Population::load(dir.path().join("missing.dat"), 1, 1).unwrap_err();
        assert!(matches!(err, PopulationFileError::Io(ref e) if e.kind() == io::ErrorKind::NotFound));
    }
}
