//! Static rule tables: technologies, era rules, structure costs, and the
//! starting neighbor roster.
//!
//! Tables are YAML sequences, not maps, because declaration order is part
//! of the contract: prerequisite checks, the neighbor AI's research scan,
//! and the era classifier all iterate in table order.

use serde::Deserialize;
use thiserror::Error;

use hearthage_protocol::{DiplomaticStatus, Era, Resource, Storage};

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("missing referenced id: {0}")]
    MissingId(String),
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub enum RulesSource<'a> {
    Embedded,
    Path(String),
    Bytes {
        techs: &'a [u8],
        eras: &'a [u8],
        structures: &'a [u8],
        neighbors: &'a [u8],
    },
}

/// One resource cost line. Costs are sequences so the first shortfall
/// reported is the first declared line.
#[derive(Clone, Debug, Deserialize)]
pub struct CostLine {
    pub resource: Resource,
    pub amount: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TechSpec {
    pub id: String,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub cost: Vec<CostLine>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EraRule {
    pub era: Era,
    pub requires: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StructureSpec {
    pub id: String,
    pub cost: Vec<CostLine>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StructureTable {
    known: Vec<StructureSpec>,
    fallback_cost: Vec<CostLine>,
}

impl StructureTable {
    /// Cost of a structure type; unknown types get the fallback cost.
    pub fn cost_of(&self, structure: &str) -> &[CostLine] {
        self.known
            .iter()
            .find(|s| s.id == structure)
            .map(|s| s.cost.as_slice())
            .unwrap_or(&self.fallback_cost)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct NeighborSpec {
    pub name: String,
    pub attitude: i32,
    pub status: DiplomaticStatus,
    pub pop: u32,
    pub storage: Storage,
    pub tech: Vec<String>,
}

/// Compiled rule tables. Loaded once at startup and shared immutably.
#[derive(Clone, Debug)]
pub struct Rules {
    pub techs: Vec<TechSpec>,
    pub eras: Vec<EraRule>,
    pub structures: StructureTable,
    pub starting_neighbors: Vec<NeighborSpec>,
}

impl Rules {
    pub fn tech(&self, id: &str) -> Option<&TechSpec> {
        self.techs.iter().find(|t| t.id == id)
    }
}

pub fn load_rules(source: RulesSource<'_>) -> Result<Rules, RulesError> {
    let rules = match source {
        RulesSource::Embedded => {
            let techs_yaml = include_str!("../data/base/techs.yaml");
            let eras_yaml = include_str!("../data/base/eras.yaml");
            let structures_yaml = include_str!("../data/base/structures.yaml");
            let neighbors_yaml = include_str!("../data/base/neighbors.yaml");
            parse_rules(techs_yaml, eras_yaml, structures_yaml, neighbors_yaml)?
        }
        RulesSource::Path(path) => {
            let techs_yaml = std::fs::read_to_string(format!("{path}/techs.yaml"))?;
            let eras_yaml = std::fs::read_to_string(format!("{path}/eras.yaml"))?;
            let structures_yaml = std::fs::read_to_string(format!("{path}/structures.yaml"))?;
            let neighbors_yaml = std::fs::read_to_string(format!("{path}/neighbors.yaml"))?;
            parse_rules(&techs_yaml, &eras_yaml, &structures_yaml, &neighbors_yaml)?
        }
        RulesSource::Bytes {
            techs,
            eras,
            structures,
            neighbors,
        } => parse_rules(
            std::str::from_utf8(techs)?,
            std::str::from_utf8(eras)?,
            std::str::from_utf8(structures)?,
            std::str::from_utf8(neighbors)?,
        )?,
    };

    validate_references(&rules)?;
    Ok(rules)
}

fn parse_rules(
    techs_yaml: &str,
    eras_yaml: &str,
    structures_yaml: &str,
    neighbors_yaml: &str,
) -> Result<Rules, RulesError> {
    Ok(Rules {
        techs: serde_yaml::from_str(techs_yaml)?,
        eras: serde_yaml::from_str(eras_yaml)?,
        structures: serde_yaml::from_str(structures_yaml)?,
        starting_neighbors: serde_yaml::from_str(neighbors_yaml)?,
    })
}

/// Every tech id referenced by a prerequisite list, era rule, or neighbor
/// roster must exist in the tech table.
fn validate_references(rules: &Rules) -> Result<(), RulesError> {
    let known = |id: &str| rules.techs.iter().any(|t| t.id == id);

    for tech in &rules.techs {
        for req in &tech.requires {
            if !known(req) {
                return Err(RulesError::MissingId(req.clone()));
            }
        }
    }
    for rule in &rules.eras {
        for req in &rule.requires {
            if !known(req) {
                return Err(RulesError::MissingId(req.clone()));
            }
        }
    }
    for neighbor in &rules.starting_neighbors {
        for tech in &neighbor.tech {
            if !known(tech) {
                return Err(RulesError::MissingId(tech.clone()));
            }
        }
    }
    Ok(())
}
