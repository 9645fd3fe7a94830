use std::sync::LazyLock;

use regex::Regex;

/// Which lexical rule produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternFamily {
    /// Biologic and targeted-therapy suffixes (-mab, -tinib, ...).
    Biologic,
    /// Common small-molecule suffixes (-statin, -pril, -mycin, ...).
    SmallMolecule,
    /// Fixed allowlist of over-the-counter brand and generic names.
    OverTheCounter,
    /// A capitalized word adjacent to a dose expression.
    Dosage,
}

/// A compiled pattern with its family.
pub struct MedicinePattern {
    pub regex: Regex,
    pub family: PatternFamily,
}

const BIOLOGIC_SUFFIXES: &[&str] = &[
    "mab", "nib", "zumab", "ximab", "lizumab", "olimab", "zomib", "tinib", "ciclib", "rafenib",
    "parin",
];

const SMALL_MOLECULE_SUFFIXES: &[&str] = &[
    "statin", "sartan", "pril", "oxacin", "mycin", "cycline", "cillin", "dronate", "dipine",
    "febrine", "conazole", "zosin", "vudine", "lamide", "thiazide", "prazole", "gliptin",
];

// Broader endings; these catch more real drugs and more false positives.
const SECONDARY_SUFFIXES: &[&str] = &[
    "xetine", "triptyline", "xapine", "done", "xone", "codone", "morphone", "tadine", "navir",
    "vir", "vastatin", "prazole", "pam", "lam", "tam", "zolam", "zepam", "olol", "alol", "ipril",
    "pril", "one", "ine",
];

const OVER_THE_COUNTER: &[&str] = &[
    "Aspirin",
    "Tylenol",
    "Advil",
    "Motrin",
    "Aleve",
    "Paracetamol",
    "Ibuprofen",
    "Acetaminophen",
    "Naproxen",
];

const DOSE_UNIT: &str = r"\d+\s?(?:mg|mcg|mL|g)";

fn suffix_pattern(suffixes: &[&str]) -> String {
    format!(r"\b[A-Z][a-z]*(?:{})\b", suffixes.join("|"))
}

/// Ordered rule set applied by the medicine extractor.
///
/// The order is fixed so that extraction is reproducible for identical
/// input; every pattern is applied independently, so order never changes
/// which substrings end up in the result.
pub static PATTERN_LIBRARY: LazyLock<Vec<MedicinePattern>> = LazyLock::new(|| {
    let compile = |pattern: String, family: PatternFamily| MedicinePattern {
        regex: Regex::new(&pattern).expect("medicine pattern must compile"),
        family,
    };

    vec![
        compile(suffix_pattern(BIOLOGIC_SUFFIXES), PatternFamily::Biologic),
        compile(suffix_pattern(SMALL_MOLECULE_SUFFIXES), PatternFamily::SmallMolecule),
        compile(suffix_pattern(SECONDARY_SUFFIXES), PatternFamily::SmallMolecule),
        compile(
            format!(r"\b(?:{})\b", OVER_THE_COUNTER.join("|")),
            PatternFamily::OverTheCounter,
        ),
        // "500 mg Metformin"
        compile(format!(r"\b{DOSE_UNIT}\s+[A-Z][a-z]+\b"), PatternFamily::Dosage),
        // "Metformin 500mg", the usual prescription order
        compile(format!(r"\b[A-Z][a-z]+\s+{DOSE_UNIT}\b"), PatternFamily::Dosage),
    ]
});
