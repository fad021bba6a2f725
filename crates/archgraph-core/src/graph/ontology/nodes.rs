//! Node kinds for the architecture graph.
//!
//! Nodes are organized by domain:
//!
//! - **Code**: modules, functions, procedures and unresolved call targets
//! - **Data**: embedded queries and the database tables they touch
//! - **Metadata**: objects declared in a configuration export

use serde::{Deserialize, Serialize};
use std::fmt;

use super::NodeCategory;

/// The kind of a node.
///
/// Node identity is derived from the kind token plus a natural key, see
/// [`NodeKind::node_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    // === Code ===
    /// A source module (one file)
    Module,
    /// A function (returns a value)
    Function,
    /// A procedure (no return value)
    Procedure,
    /// Shared placeholder for a call target that could not be resolved
    ExternalCall,

    // === Data ===
    /// An embedded query
    Query,
    /// A database table referenced by a query
    DatabaseTable,

    // === Metadata ===
    Configuration,
    Subsystem,
    Catalog,
    Document,
    DocumentJournal,
    Enum,
    Report,
    DataProcessor,
    InformationRegister,
    AccumulationRegister,
    AccountingRegister,
    CalculationRegister,
    ChartOfCharacteristicTypes,
    ChartOfAccounts,
    ChartOfCalculationTypes,
    BusinessProcess,
    Task,
    ExchangePlan,
    Constant,
    CommonModule,
    CommonForm,
    Role,
    /// Generic metadata object for export tags without a dedicated kind
    MetadataObject,

    /// Kind token not recognized on input
    #[serde(other)]
    Unknown,
}

impl NodeKind {
    /// Every kind, in declaration order.
    pub const ALL: &'static [NodeKind] = &[
        Self::Module,
        Self::Function,
        Self::Procedure,
        Self::ExternalCall,
        Self::Query,
        Self::DatabaseTable,
        Self::Configuration,
        Self::Subsystem,
        Self::Catalog,
        Self::Document,
        Self::DocumentJournal,
        Self::Enum,
        Self::Report,
        Self::DataProcessor,
        Self::InformationRegister,
        Self::AccumulationRegister,
        Self::AccountingRegister,
        Self::CalculationRegister,
        Self::ChartOfCharacteristicTypes,
        Self::ChartOfAccounts,
        Self::ChartOfCalculationTypes,
        Self::BusinessProcess,
        Self::Task,
        Self::ExchangePlan,
        Self::Constant,
        Self::CommonModule,
        Self::CommonForm,
        Self::Role,
        Self::MetadataObject,
        Self::Unknown,
    ];

    /// Stable token used in ids, stores and exported documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Function => "function",
            Self::Procedure => "procedure",
            Self::ExternalCall => "external_call",
            Self::Query => "query",
            Self::DatabaseTable => "database_table",
            Self::Configuration => "configuration",
            Self::Subsystem => "subsystem",
            Self::Catalog => "catalog",
            Self::Document => "document",
            Self::DocumentJournal => "document_journal",
            Self::Enum => "enum",
            Self::Report => "report",
            Self::DataProcessor => "data_processor",
            Self::InformationRegister => "information_register",
            Self::AccumulationRegister => "accumulation_register",
            Self::AccountingRegister => "accounting_register",
            Self::CalculationRegister => "calculation_register",
            Self::ChartOfCharacteristicTypes => "chart_of_characteristic_types",
            Self::ChartOfAccounts => "chart_of_accounts",
            Self::ChartOfCalculationTypes => "chart_of_calculation_types",
            Self::BusinessProcess => "business_process",
            Self::Task => "task",
            Self::ExchangePlan => "exchange_plan",
            Self::Constant => "constant",
            Self::CommonModule => "common_module",
            Self::CommonForm => "common_form",
            Self::Role => "role",
            Self::MetadataObject => "metadata_object",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a kind token. Unrecognized tokens become [`NodeKind::Unknown`].
    pub fn from_token(token: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == token)
            .unwrap_or(Self::Unknown)
    }

    /// Prefix used in node ids. Tables use the short `table` prefix.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::DatabaseTable => "table",
            other => other.as_str(),
        }
    }

    /// Build the deterministic node id for a natural key.
    ///
    /// ```
    /// use archgraph_core::graph::NodeKind;
    /// assert_eq!(NodeKind::Function.node_id("Sales:Post"), "function:Sales:Post");
    /// ```
    pub fn node_id(&self, natural_key: &str) -> String {
        format!("{}:{}", self.id_prefix(), natural_key)
    }

    /// Get the category of this kind.
    pub fn category(&self) -> NodeCategory {
        match self {
            Self::Module | Self::Function | Self::Procedure | Self::ExternalCall => {
                NodeCategory::Code
            }
            Self::Query | Self::DatabaseTable => NodeCategory::Data,
            Self::Unknown => NodeCategory::Other,
            _ => NodeCategory::Metadata,
        }
    }

    /// Functions and procedures.
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Function | Self::Procedure)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
