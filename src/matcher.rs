use crate::args::SuffixList;
use crate::github::Asset;

/// True when any asset name ends with any suffix. Case-sensitive.
pub fn has_conflict(assets: &[Asset], suffixes: &SuffixList) -> bool {
    assets
        .iter()
        .any(|asset| suffixes.iter().any(|s| asset.name.ends_with(s)))
}

/// The matching assets, in release order.
pub fn matching_assets<'a>(assets: &'a [Asset], suffixes: &SuffixList) -> Vec<&'a Asset> {
    assets
        .iter()
        .filter(|asset| suffixes.iter().any(|s| asset.name.ends_with(s)))
        .collect()
}
