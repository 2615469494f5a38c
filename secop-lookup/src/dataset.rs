//! The two open-data datasets served by the lookup page

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dataset selector, used in routes as `/api/:dataset/...`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    /// SECOP II electronic contracts (already awarded)
    Contracts,
    /// Procurement processes (pre-award)
    Processes,
}

impl Dataset {
    pub const ALL: [Dataset; 2] = [Dataset::Contracts, Dataset::Processes];

    /// Route segment and log name
    pub fn as_str(self) -> &'static str {
        match self {
            Dataset::Contracts => "contracts",
            Dataset::Processes => "processes",
        }
    }

    /// Heading shown in the mode selector
    pub fn title(self) -> &'static str {
        match self {
            Dataset::Contracts => "Contratos Electrónicos SECOP II",
            Dataset::Processes => "Procesos de Contratación",
        }
    }

    /// Field holding the supplier's display name
    pub fn supplier_name_field(self) -> &'static str {
        match self {
            Dataset::Contracts => "proveedor_adjudicado",
            Dataset::Processes => "nombre_del_proveedor",
        }
    }

    /// Field holding the supplier's document / tax id
    pub fn supplier_id_field(self) -> &'static str {
        match self {
            Dataset::Contracts => "documento_proveedor",
            Dataset::Processes => "nit_del_proveedor_adjudicado",
        }
    }

    /// File name offered for the spreadsheet download
    pub fn export_file_name(self) -> &'static str {
        match self {
            Dataset::Contracts => "contratos_secop_ii.xlsx",
            Dataset::Processes => "procesos_contratacion.xlsx",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
