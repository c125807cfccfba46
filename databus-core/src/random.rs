//! Generate tables of random tokens.
//!
//! Each row is an [`Entity`] identified by a random `urn:uuid` and carrying
//! one URL-safe token per column. The accompanying [`EntitySchema`] names the
//! columns.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use log::info;
use rand::Rng;
use thiserror::Error;
use uuid::Builder;

/// Type URI of generated rows.
pub const RANDOM_ROW_TYPE: &str = "https://example.org/vocab/RandomValueRow";

/// Prefix of generated column paths; the column index is appended.
pub const RANDOM_PATH_PREFIX: &str = "https://example.org/vocab/RandomValuePath/";

/// Raw bytes behind each token.
const TOKEN_BYTES: usize = 16;

/// Errors raised by [`generate_random_values`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RandomValuesError {
    /// Zero rows were requested.
    #[error("Entities (Rows) needs to be a positive integer.")]
    NoEntities,
    /// Zero columns were requested.
    #[error("Values (Columns) needs to be a positive integer.")]
    NoValues,
}

/// Column layout of generated rows.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntitySchema {
    /// Row type URI.
    pub type_uri: String,
    /// One path URI per column.
    pub paths: Vec<String>,
}

/// A single generated row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    /// `urn:uuid:` identifier.
    pub uri: String,
    /// One list of values per column.
    pub values: Vec<Vec<String>>,
}

/// Generated rows together with their schema.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entities {
    /// Column layout.
    pub schema: EntitySchema,
    /// Rows in generation order.
    pub entities: Vec<Entity>,
}

impl Entities {
    /// Total number of generated values.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.entities
            .iter()
            .flat_map(|entity| entity.values.iter())
            .map(Vec::len)
            .sum()
    }
}

/// Generate `entities` rows of `values` random tokens using the thread RNG.
///
/// # Examples
/// ```
/// use databus_core::generate_random_values;
///
/// # fn main() -> Result<(), databus_core::RandomValuesError> {
/// let table = generate_random_values(2, 3)?;
/// assert_eq!(table.entities.len(), 2);
/// assert_eq!(table.schema.paths.len(), 3);
/// # Ok(())
/// # }
/// ```
pub fn generate_random_values(
    entities: usize,
    values: usize,
) -> Result<Entities, RandomValuesError> {
    generate_random_values_with(&mut rand::thread_rng(), entities, values)
}

/// Generate random values from a caller-supplied RNG.
pub fn generate_random_values_with<R: Rng>(
    rng: &mut R,
    entities: usize,
    values: usize,
) -> Result<Entities, RandomValuesError> {
    if entities < 1 {
        return Err(RandomValuesError::NoEntities);
    }
    if values < 1 {
        return Err(RandomValuesError::NoValues);
    }
    info!("Start creating random values.");
    let rows: Vec<Entity> = (0..entities)
        .map(|_| Entity {
            uri: format!(
                "urn:uuid:{}",
                Builder::from_random_bytes(rng.r#gen()).into_uuid()
            ),
            values: (0..values).map(|_| vec![random_token(rng)]).collect(),
        })
        .collect();
    let table = Entities {
        schema: EntitySchema {
            type_uri: RANDOM_ROW_TYPE.to_owned(),
            paths: (0..values)
                .map(|index| format!("{RANDOM_PATH_PREFIX}{index}"))
                .collect(),
        },
        entities: rows,
    };
    info!("Happy to serve {} random values.", table.value_count());
    Ok(table)
}

fn random_token<R: Rng>(rng: &mut R) -> String {
    let mut raw = [0_u8; TOKEN_BYTES];
    rng.fill(&mut raw);
    URL_SAFE_NO_PAD.encode(raw)
}
