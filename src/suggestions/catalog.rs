//! Curated local autocomplete list.

use crate::alerts::reference::BRAND_ALIASES;

use super::SuggestionKind;

const DRUGS: &[&str] = &[
    "Acetaminophen", "Allopurinol", "Alprazolam", "Amiodarone", "Amitriptyline", "Amlodipine",
    "Amoxicillin", "Amoxicillin-Clavulanate", "Apixaban", "Aspirin", "Atenolol", "Atorvastatin",
    "Azathioprine", "Abacavir", "Capecitabine", "Carbamazepine", "Carvedilol", "Cephalexin",
    "Ciprofloxacin", "Citalopram", "Clarithromycin", "Clonazepam", "Clopidogrel", "Clozapine",
    "Codeine", "Colchicine", "Cyclobenzaprine", "Dabigatran", "Diazepam", "Diclofenac",
    "Digoxin", "Diltiazem", "Diphenhydramine", "Doxycycline", "Duloxetine", "Enalapril",
    "Erythromycin", "Escitalopram", "Esomeprazole", "Fentanyl", "Fluconazole", "Fluoxetine",
    "Furosemide", "Gabapentin", "Glimepiride", "Glipizide", "Glyburide", "Hydrochlorothiazide",
    "Hydrocodone", "Hydroxyzine", "Ibuprofen", "Insulin Glargine", "Isosorbide Mononitrate",
    "Isotretinoin", "Ketoconazole", "Levofloxacin", "Levothyroxine", "Linezolid", "Lisinopril",
    "Lithium", "Lorazepam", "Losartan", "Lovastatin", "Meloxicam", "Meperidine", "Metformin",
    "Methotrexate", "Metoprolol", "Metronidazole", "Montelukast", "Morphine", "Naproxen",
    "Nitroglycerin", "Omeprazole", "Oxycodone", "Pantoprazole", "Paroxetine", "Phenelzine",
    "Phenytoin", "Prednisone", "Pravastatin", "Propranolol", "Pseudoephedrine", "Quetiapine",
    "Ramipril", "Rivaroxaban", "Rosuvastatin", "Selegiline", "Sertraline", "Sildenafil",
    "Simvastatin", "Spironolactone", "Sulfamethoxazole-Trimethoprim", "Sumatriptan",
    "Tadalafil", "Tamsulosin", "Temazepam", "Ticagrelor", "Tizanidine", "Tramadol",
    "Tranylcypromine", "Valsartan", "Venlafaxine", "Verapamil", "Warfarin", "Zolpidem",
];

const CONDITIONS: &[&str] = &[
    "Asthma", "Atrial fibrillation", "Benign prostatic hyperplasia", "Chronic kidney disease",
    "COPD", "Coronary artery disease", "Dementia", "Depression", "Diabetes mellitus type 2",
    "Epilepsy", "Gastroesophageal reflux disease", "Glaucoma", "Gout", "Heart failure",
    "Hepatic impairment", "Hyperkalemia", "Hypertension", "Hypothyroidism", "Myasthenia gravis",
    "Osteoporosis", "Parkinson's disease", "Peptic ulcer disease", "Pregnancy",
    "QT prolongation", "Rheumatoid arthritis", "Sleep apnea",
];

const SUPPLEMENTS: &[&str] = &[
    "Calcium carbonate", "Coenzyme Q10", "Echinacea", "Fish oil", "Garlic", "Ginger", "Ginkgo",
    "Ginseng", "Glucosamine", "Iron", "Kava", "Magnesium", "Melatonin", "Potassium chloride",
    "St John's Wort", "Turmeric", "Valerian", "Vitamin B12", "Vitamin D", "Vitamin E",
    "Vitamin K",
];

const SUBSTANCES: &[&str] = &[
    "Alcohol", "Caffeine", "Cannabis", "Dairy", "Grapefruit juice", "Leafy greens",
    "Aged cheese", "Tobacco", "Cranberry juice", "Licorice",
];

const ALLERGIES: &[&str] = &[
    "Aspirin", "Cephalosporins", "Codeine", "Contrast dye", "Fluoroquinolones", "Iodine",
    "Latex", "Macrolides", "NSAIDs", "Penicillin", "Sulfa drugs", "Tetracyclines",
];

/// One curated entry with lowercase aliases it can also be found by.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub name: String,
    pub kind: SuggestionKind,
    pub aliases: Vec<String>,
}

/// Build the full local catalog. Drug entries pick up every brand alias that
/// resolves to them.
pub fn default_catalog() -> Vec<CatalogEntry> {
    let mut entries = Vec::with_capacity(
        DRUGS.len() + CONDITIONS.len() + SUPPLEMENTS.len() + SUBSTANCES.len() + ALLERGIES.len(),
    );

    for name in DRUGS {
        let generic = name.to_lowercase();
        let aliases = BRAND_ALIASES
            .iter()
            .filter(|(_, g)| *g == generic)
            .map(|(brand, _)| brand.to_string())
            .collect();
        entries.push(CatalogEntry {
            name: name.to_string(),
            kind: SuggestionKind::Drug,
            aliases,
        });
    }

    let plain = [
        (CONDITIONS, SuggestionKind::Condition),
        (SUPPLEMENTS, SuggestionKind::Supplement),
        (SUBSTANCES, SuggestionKind::Substance),
        (ALLERGIES, SuggestionKind::Allergy),
    ];
    for (names, kind) in plain {
        entries.extend(names.iter().map(|name| CatalogEntry {
            name: name.to_string(),
            kind,
            aliases: Vec::new(),
        }));
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_every_kind() {
        let catalog = default_catalog();
        for kind in [
            SuggestionKind::Drug,
            SuggestionKind::Condition,
            SuggestionKind::Supplement,
            SuggestionKind::Substance,
            SuggestionKind::Allergy,
        ] {
            assert!(catalog.iter().any(|e| e.kind == kind), "missing {kind:?}");
        }
    }

    #[test]
    fn drug_entries_carry_brand_aliases() {
        let catalog = default_catalog();
        let warfarin = catalog.iter().find(|e| e.name == "Warfarin").unwrap();
        assert!(warfarin.aliases.contains(&"coumadin".to_string()));
        assert!(warfarin.aliases.contains(&"jantoven".to_string()));
    }

    #[test]
    fn no_duplicate_names_within_kind() {
        let catalog = default_catalog();
        let mut seen = std::collections::HashSet::new();
        for e in &catalog {
            assert!(seen.insert((e.kind, e.name.to_lowercase())), "dup {}", e.name);
        }
    }
}
