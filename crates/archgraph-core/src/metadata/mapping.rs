//! Export tag to node kind mapping.

use crate::graph::NodeKind;

/// Object tags with a dedicated node kind.
const TAG_KINDS: &[(&str, NodeKind)] = &[
    ("Configuration", NodeKind::Configuration),
    ("Subsystem", NodeKind::Subsystem),
    ("Catalog", NodeKind::Catalog),
    ("Document", NodeKind::Document),
    ("DocumentJournal", NodeKind::DocumentJournal),
    ("Enum", NodeKind::Enum),
    ("Report", NodeKind::Report),
    ("DataProcessor", NodeKind::DataProcessor),
    ("InformationRegister", NodeKind::InformationRegister),
    ("AccumulationRegister", NodeKind::AccumulationRegister),
    ("AccountingRegister", NodeKind::AccountingRegister),
    ("CalculationRegister", NodeKind::CalculationRegister),
    ("ChartOfCharacteristicTypes", NodeKind::ChartOfCharacteristicTypes),
    ("ChartOfAccounts", NodeKind::ChartOfAccounts),
    ("ChartOfCalculationTypes", NodeKind::ChartOfCalculationTypes),
    ("BusinessProcess", NodeKind::BusinessProcess),
    ("Task", NodeKind::Task),
    ("ExchangePlan", NodeKind::ExchangePlan),
    ("Constant", NodeKind::Constant),
    ("CommonModule", NodeKind::CommonModule),
    ("CommonForm", NodeKind::CommonForm),
    ("Role", NodeKind::Role),
];

/// Kind for an object's local tag. Unmapped tags become
/// [`NodeKind::MetadataObject`].
pub fn node_kind_for_tag(tag: &str) -> NodeKind {
    TAG_KINDS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, kind)| *kind)
        .unwrap_or(NodeKind::MetadataObject)
}
