//! Fixtures
//!
//! Named allocation cases loaded from YAML:
//!
//! ```yaml
//! cases:
//!   - name: single-lane
//!     discount: 0
//!     capacities: [2]
//!     target: 2        # optional, defaults to the total capacity
//!     expected: "3"    # optional, decimal string
//! ```

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    cases::Case,
    lanes::{LaneError, LaneSet},
    tally::{Tally, TallyError},
};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A case's lane data or target was rejected
    #[error("Invalid lanes in case {name}: {source}")]
    Lanes {
        /// Case name
        name: String,

        /// Underlying validation error
        source: LaneError,
    },

    /// A case's expected total could not be parsed
    #[error("Invalid expected total in case {name}: {source}")]
    Expected {
        /// Case name
        name: String,

        /// Underlying parse error
        source: TallyError,
    },

    /// Two cases share a name
    #[error("Duplicate case name: {0}")]
    DuplicateCase(String),

    /// Case not found
    #[error("Case not found: {0}")]
    CaseNotFound(String),
}

/// Wrapper for cases in YAML
#[derive(Debug, Deserialize)]
pub struct CasesFixture {
    /// Cases in file order
    pub cases: Vec<CaseFixture>,
}

/// Case fixture from YAML
#[derive(Debug, Deserialize)]
pub struct CaseFixture {
    /// Unique case name
    pub name: String,

    /// Shared discount
    #[serde(default)]
    pub discount: i64,

    /// Lane capacities
    pub capacities: Vec<i64>,

    /// Units to draw; the total capacity when absent
    #[serde(default)]
    pub target: Option<i64>,

    /// Expected total as a decimal string
    #[serde(default)]
    pub expected: Option<String>,
}

impl TryFrom<CaseFixture> for NamedCase {
    type Error = FixtureError;

    fn try_from(fixture: CaseFixture) -> Result<Self, Self::Error> {
        let CaseFixture {
            name,
            discount,
            capacities,
            target,
            expected,
        } = fixture;

        let case = LaneSet::new(capacities, discount)
            .and_then(|lanes| match target {
                Some(target) => Case::new(lanes, target),
                None => Ok(Case::full(lanes)),
            })
            .map_err(|source| FixtureError::Lanes {
                name: name.clone(),
                source,
            })?;

        let expected = expected
            .map(|raw| raw.parse::<Tally>())
            .transpose()
            .map_err(|source| FixtureError::Expected {
                name: name.clone(),
                source,
            })?;

        Ok(NamedCase {
            name,
            case,
            expected,
        })
    }
}

/// A case with its fixture name and optional expected total
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedCase {
    /// Case name
    pub name: String,

    /// The allocation problem
    pub case: Case,

    /// Expected total, if the fixture states one
    pub expected: Option<Tally>,
}

/// Fixture
#[derive(Debug)]
pub struct FixtureSet {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Cases in load order
    cases: Vec<NamedCase>,

    /// Case name -> index into `cases`
    case_keys: FxHashMap<String, usize>,
}

impl Default for FixtureSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureSet {
    /// Create a new empty fixture set with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture set with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            cases: Vec::new(),
            case_keys: FxHashMap::default(),
        }
    }

    /// Load a fixture set from the default base path
    ///
    /// # Errors
    ///
    /// Returns an error if the set cannot be read or contains invalid cases.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load(name)?;

        Ok(fixture)
    }

    /// Load cases from `<base_path>/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a case is invalid, or a
    /// case name is already taken.
    pub fn load(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        self.load_str(&contents)?;

        debug!(set = name, cases = self.cases.len(), "loaded fixture set");

        Ok(self)
    }

    /// Load cases from YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid, a case is invalid, or a case name is
    /// already taken.
    pub fn load_str(&mut self, contents: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CasesFixture = serde_norway::from_str(contents)?;

        for case_fixture in fixture.cases {
            let named = NamedCase::try_from(case_fixture)?;

            if self.case_keys.contains_key(&named.name) {
                return Err(FixtureError::DuplicateCase(named.name));
            }

            self.case_keys.insert(named.name.clone(), self.cases.len());
            self.cases.push(named);
        }

        Ok(self)
    }

    /// Get a case by name
    ///
    /// # Errors
    ///
    /// Returns an error if the case is not found.
    pub fn case(&self, name: &str) -> Result<&NamedCase, FixtureError> {
        self.case_keys
            .get(name)
            .and_then(|&index| self.cases.get(index))
            .ok_or_else(|| FixtureError::CaseNotFound(name.to_string()))
    }

    /// All cases in load order
    pub fn cases(&self) -> &[NamedCase] {
        &self.cases
    }

    /// Number of cases loaded
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Check if no cases are loaded
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}
