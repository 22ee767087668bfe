use crate::buttons::SimpleButtons;
use crate::gallery::ApertureGallery;
use crate::pillbox::PillboxCavity;
use crate::simple::{SimpleParallelPlates, SimpleStripline};
use crate::striplines::{StriplineCurvedTapered2Blade, StriplineCurvedTapered4Blade};
use crate::tapers::{EllipticalTaper, OctagonalToRacetrackTaper, RacetrackTaperedCavity};
use crate::types::Model;

static MODELS: [&(dyn Model + Sync); 10] = [
    &PillboxCavity,
    &EllipticalTaper,
    &OctagonalToRacetrackTaper,
    &RacetrackTaperedCavity,
    &SimpleParallelPlates,
    &SimpleStripline,
    &SimpleButtons,
    &StriplineCurvedTapered4Blade,
    &StriplineCurvedTapered2Blade,
    &ApertureGallery,
];

/// Every known model, in listing order.
pub fn all_models() -> impl Iterator<Item = &'static dyn Model> {
    MODELS.iter().map(|m| *m as &'static dyn Model)
}

/// Look a model up by its `name()`.
pub fn find_model(name: &str) -> Option<&'static dyn Model> {
    all_models().find(|m| m.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = all_models().map(|m| m.name()).collect();
        assert_eq!(names.len(), MODELS.len());
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(find_model("pillbox_cavity").map(|m| m.name()), Some("pillbox_cavity"));
        assert!(find_model("lmbf_cavity").is_none());
    }
}
