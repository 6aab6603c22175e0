//! Parsing the HPO master data provided by the OBO Foundry

/// Module to parse `hp.obo` file
pub(crate) mod hp_obo;
