//! UF → division / operational management lookup

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::TicketRecord;

pub const UNDEFINED_DIVISION: &str = "Divisão Não Definida";
pub const UNDEFINED_MANAGEMENT: &str = "GO Não Definida";
/// Used when a division lists no management at all
pub const MISSING_MANAGEMENT: &str = "GO Não Definido";

/// One division and the UFs it covers
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DivisionDef {
    pub name: String,
    /// Operational managements; the first one is used for mapping
    #[serde(default)]
    pub management: Vec<String>,
    pub ufs: Vec<String>,
}

impl DivisionDef {
    pub fn new(name: &str, management: &[&str], ufs: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            management: management.iter().map(|s| s.to_string()).collect(),
            ufs: ufs.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Static lookup from UF code to (division, management)
#[derive(Clone, Debug)]
pub struct DivisionMap {
    divisions: Vec<DivisionDef>,
    by_uf: HashMap<String, (String, String)>,
}

impl Default for DivisionMap {
    fn default() -> Self {
        Self::from_definitions(vec![
            DivisionDef::new("DIV 01", &["GO 01"], &["AL", "CE", "PB", "PE", "RN"]),
            DivisionDef::new("DIV 02", &["GO 01", "GO 02"], &["BA", "SE"]),
            DivisionDef::new("DIV 03", &["GO 01"], &["CE", "MA", "PI"]),
            DivisionDef::new("DIV 04", &["GO 02"], &["AP", "PA"]),
            DivisionDef::new("DIV 05", &["GO 02"], &["AM", "RO", "RR", "AC"]),
            DivisionDef::new("DIV 06", &["GO 02"], &["DF", "GO"]),
            DivisionDef::new("DIV 07", &["GO 02"], &["MT", "MS"]),
            DivisionDef::new("DIV 08", &["GO 03"], &["SP"]),
            DivisionDef::new("DIV 09", &["GO 03"], &["RJ", "MG"]),
            DivisionDef::new("DIV 10", &["GO 03"], &["ES", "PR", "SC", "RS"]),
        ])
    }
}

impl DivisionMap {
    /// Build the lookup. A UF listed by several divisions maps to the last one.
    pub fn from_definitions(divisions: Vec<DivisionDef>) -> Self {
        let mut by_uf = HashMap::new();
        for division in &divisions {
            let management = division
                .management
                .first()
                .cloned()
                .unwrap_or_else(|| MISSING_MANAGEMENT.to_string());
            for uf in &division.ufs {
                by_uf.insert(
                    uf.trim().to_uppercase(),
                    (division.name.clone(), management.clone()),
                );
            }
        }
        Self { divisions, by_uf }
    }

    pub fn divisions(&self) -> &[DivisionDef] {
        &self.divisions
    }

    /// Division and management for a UF code
    pub fn lookup(&self, uf: Option<&str>) -> (&str, &str) {
        uf.map(|u| u.trim().to_uppercase())
            .and_then(|u| self.by_uf.get(&u))
            .map_or((UNDEFINED_DIVISION, UNDEFINED_MANAGEMENT), |(d, g)| {
                (d.as_str(), g.as_str())
            })
    }

    /// Fill the division, management and map label of a record.
    pub fn assign(&self, record: &mut TicketRecord) {
        let (division, management) = self.lookup(record.uf.as_deref());
        record.divisao = division.to_string();
        record.gerencia = management.to_string();
        record.metrics.uf_mapa = format!("{}-Brasil", record.uf.as_deref().unwrap_or("nan"));
    }
}
