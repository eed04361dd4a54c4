//! Static reference tables for proactive alerts: brand aliases, drug
//! classes and the critical-interaction rule sets.
//!
//! Rule terms are either a generic name (`"warfarin"`) or a class key
//! prefixed with `@` (`"@nsaid"`).

use super::types::AlertSeverity;

/// Brand name → generic name.
pub const BRAND_ALIASES: &[(&str, &str)] = &[
    ("coumadin", "warfarin"),
    ("jantoven", "warfarin"),
    ("eliquis", "apixaban"),
    ("xarelto", "rivaroxaban"),
    ("pradaxa", "dabigatran"),
    ("plavix", "clopidogrel"),
    ("brilinta", "ticagrelor"),
    ("zocor", "simvastatin"),
    ("lipitor", "atorvastatin"),
    ("mevacor", "lovastatin"),
    ("viagra", "sildenafil"),
    ("revatio", "sildenafil"),
    ("cialis", "tadalafil"),
    ("levitra", "vardenafil"),
    ("nitrostat", "nitroglycerin"),
    ("imdur", "isosorbide mononitrate"),
    ("prozac", "fluoxetine"),
    ("zoloft", "sertraline"),
    ("paxil", "paroxetine"),
    ("celexa", "citalopram"),
    ("lexapro", "escitalopram"),
    ("effexor", "venlafaxine"),
    ("cymbalta", "duloxetine"),
    ("nardil", "phenelzine"),
    ("parnate", "tranylcypromine"),
    ("advil", "ibuprofen"),
    ("motrin", "ibuprofen"),
    ("aleve", "naproxen"),
    ("naprosyn", "naproxen"),
    ("celebrex", "celecoxib"),
    ("mobic", "meloxicam"),
    ("voltaren", "diclofenac"),
    ("tylenol", "acetaminophen"),
    ("paracetamol", "acetaminophen"),
    ("glucophage", "metformin"),
    ("zestril", "lisinopril"),
    ("prinivil", "lisinopril"),
    ("vasotec", "enalapril"),
    ("altace", "ramipril"),
    ("cozaar", "losartan"),
    ("diovan", "valsartan"),
    ("aldactone", "spironolactone"),
    ("inspra", "eplerenone"),
    ("xanax", "alprazolam"),
    ("ativan", "lorazepam"),
    ("valium", "diazepam"),
    ("klonopin", "clonazepam"),
    ("restoril", "temazepam"),
    ("ambien", "zolpidem"),
    ("lunesta", "eszopiclone"),
    ("benadryl", "diphenhydramine"),
    ("atarax", "hydroxyzine"),
    ("phenergan", "promethazine"),
    ("flagyl", "metronidazole"),
    ("bactrim", "sulfamethoxazole-trimethoprim"),
    ("septra", "sulfamethoxazole-trimethoprim"),
    ("biaxin", "clarithromycin"),
    ("cipro", "ciprofloxacin"),
    ("levaquin", "levofloxacin"),
    ("amoxil", "amoxicillin"),
    ("augmentin", "amoxicillin-clavulanate"),
    ("keflex", "cephalexin"),
    ("ultram", "tramadol"),
    ("oxycontin", "oxycodone"),
    ("percocet", "oxycodone-acetaminophen"),
    ("vicodin", "hydrocodone-acetaminophen"),
    ("lithobid", "lithium"),
    ("tegretol", "carbamazepine"),
    ("ziagen", "abacavir"),
    ("imuran", "azathioprine"),
    ("zyloprim", "allopurinol"),
    ("lanoxin", "digoxin"),
    ("colcrys", "colchicine"),
    ("ginkgo biloba", "ginkgo"),
    ("cordarone", "amiodarone"),
    ("pacerone", "amiodarone"),
    ("prilosec", "omeprazole"),
    ("nexium", "esomeprazole"),
    ("flexeril", "cyclobenzaprine"),
    ("soma", "carisoprodol"),
    ("elavil", "amitriptyline"),
    ("imitrex", "sumatriptan"),
    ("maxalt", "rizatriptan"),
    ("zanaflex", "tizanidine"),
    ("inderal", "propranolol"),
    ("coreg", "carvedilol"),
    ("glynase", "glyburide"),
    ("amaryl", "glimepiride"),
    ("demerol", "meperidine"),
    ("sudafed", "pseudoephedrine"),
    ("accutane", "isotretinoin"),
    ("xeloda", "capecitabine"),
    ("trexall", "methotrexate"),
    ("synthroid", "levothyroxine"),
];

/// Class key → member generics.
pub const DRUG_CLASSES: &[(&str, &[&str])] = &[
    (
        "nsaid",
        &[
            "ibuprofen", "naproxen", "diclofenac", "celecoxib", "meloxicam", "indomethacin",
            "ketorolac", "piroxicam", "etodolac", "nabumetone",
        ],
    ),
    ("antiplatelet", &["aspirin", "clopidogrel", "prasugrel", "ticagrelor"]),
    (
        "anticoagulant",
        &["warfarin", "apixaban", "rivaroxaban", "dabigatran", "edoxaban", "heparin", "enoxaparin"],
    ),
    (
        "ssri",
        &["fluoxetine", "sertraline", "paroxetine", "citalopram", "escitalopram", "fluvoxamine"],
    ),
    ("snri", &["venlafaxine", "desvenlafaxine", "duloxetine"]),
    (
        "maoi",
        &["phenelzine", "tranylcypromine", "isocarboxazid", "selegiline", "rasagiline", "linezolid"],
    ),
    (
        "nitrate",
        &["nitroglycerin", "isosorbide mononitrate", "isosorbide dinitrate"],
    ),
    ("pde5_inhibitor", &["sildenafil", "tadalafil", "vardenafil", "avanafil"]),
    ("statin_cyp3a4", &["simvastatin", "lovastatin"]),
    (
        "strong_cyp3a4_inhibitor",
        &["clarithromycin", "erythromycin", "ketoconazole", "itraconazole", "ritonavir", "posaconazole"],
    ),
    ("macrolide_strong", &["clarithromycin", "erythromycin", "telithromycin"]),
    (
        "ace_inhibitor",
        &["lisinopril", "enalapril", "ramipril", "captopril", "benazepril", "quinapril"],
    ),
    ("arb", &["losartan", "valsartan", "irbesartan", "candesartan", "olmesartan", "telmisartan"]),
    (
        "potassium_sparing",
        &["spironolactone", "eplerenone", "amiloride", "triamterene"],
    ),
    (
        "benzodiazepine",
        &["diazepam", "lorazepam", "alprazolam", "clonazepam", "temazepam", "chlordiazepoxide", "midazolam"],
    ),
    ("z_drug", &["zolpidem", "eszopiclone", "zaleplon"]),
    (
        "opioid",
        &[
            "oxycodone", "hydrocodone", "morphine", "fentanyl", "codeine", "tramadol", "methadone",
            "hydromorphone", "meperidine", "tapentadol",
        ],
    ),
    (
        "penicillin",
        &["penicillin", "amoxicillin", "ampicillin", "piperacillin", "dicloxacillin", "nafcillin"],
    ),
    (
        "cephalosporin",
        &["cephalexin", "cefuroxime", "ceftriaxone", "cefdinir", "cefazolin", "cefepime"],
    ),
    ("sulfonamide", &["sulfamethoxazole", "sulfadiazine", "sulfasalazine"]),
    ("fluoroquinolone", &["ciprofloxacin", "levofloxacin", "moxifloxacin", "ofloxacin"]),
    (
        "first_gen_antihistamine",
        &["diphenhydramine", "hydroxyzine", "chlorpheniramine", "promethazine", "doxylamine", "meclizine"],
    ),
    ("tricyclic", &["amitriptyline", "nortriptyline", "imipramine", "doxepin", "clomipramine"]),
    ("nonselective_beta_blocker", &["propranolol", "nadolol", "timolol", "carvedilol", "sotalol"]),
    ("long_acting_sulfonylurea", &["glyburide", "glimepiride", "chlorpropamide"]),
    ("muscle_relaxant", &["cyclobenzaprine", "methocarbamol", "carisoprodol", "metaxalone"]),
    ("triptan", &["sumatriptan", "rizatriptan", "zolmitriptan", "eletriptan", "naratriptan"]),
    ("ppi", &["omeprazole", "esomeprazole", "pantoprazole", "lansoprazole", "rabeprazole"]),
    ("st_johns_wort", &["st john's wort", "st johns wort", "hypericum"]),
];

/// A pairwise rule between two terms. Used for drug-drug and drug-substance
/// tables; substance terms are keyword groups from [`SUBSTANCE_KEYWORDS`].
#[derive(Debug, Clone, Copy)]
pub struct PairRule {
    pub id: &'static str,
    pub a: &'static str,
    pub b: &'static str,
    pub severity: AlertSeverity,
    pub title: &'static str,
    pub message: &'static str,
    pub action: &'static str,
}

/// A rule keyed by keywords found in free text (allergies, conditions,
/// genetic markers) against a drug term. All `keywords` of one group must be
/// present; any group may match.
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule {
    pub id: &'static str,
    pub keyword_groups: &'static [&'static [&'static str]],
    pub drug: &'static str,
    pub severity: AlertSeverity,
    pub title: &'static str,
    pub message: &'static str,
    pub action: &'static str,
}

/// A drug (or class) inappropriate for older adults.
#[derive(Debug, Clone, Copy)]
pub struct BeersRule {
    pub id: &'static str,
    pub drug: &'static str,
    pub severity: AlertSeverity,
    pub title: &'static str,
    pub message: &'static str,
    pub action: &'static str,
}

pub const DRUG_DRUG_RULES: &[PairRule] = &[
    PairRule {
        id: "dd-anticoag-nsaid",
        a: "@anticoagulant",
        b: "@nsaid",
        severity: AlertSeverity::Critical,
        title: "Anticoagulant with NSAID",
        message: "NSAIDs add antiplatelet effect and GI injury to anticoagulation; major bleeding risk.",
        action: "Avoid the NSAID; prefer acetaminophen for pain and monitor for bleeding.",
    },
    PairRule {
        id: "dd-anticoag-antiplatelet",
        a: "@anticoagulant",
        b: "@antiplatelet",
        severity: AlertSeverity::Critical,
        title: "Anticoagulant with antiplatelet",
        message: "Combined anticoagulant and antiplatelet therapy markedly increases bleeding risk.",
        action: "Confirm a clear indication for dual therapy and monitor for bleeding.",
    },
    PairRule {
        id: "dd-serotonergic-maoi",
        a: "@ssri",
        b: "@maoi",
        severity: AlertSeverity::Critical,
        title: "SSRI with MAO inhibitor",
        message: "Risk of life-threatening serotonin syndrome.",
        action: "Contraindicated. Observe the required washout period before switching.",
    },
    PairRule {
        id: "dd-snri-maoi",
        a: "@snri",
        b: "@maoi",
        severity: AlertSeverity::Critical,
        title: "SNRI with MAO inhibitor",
        message: "Risk of life-threatening serotonin syndrome.",
        action: "Contraindicated. Observe the required washout period before switching.",
    },
    PairRule {
        id: "dd-triptan-maoi",
        a: "@triptan",
        b: "@maoi",
        severity: AlertSeverity::Critical,
        title: "Triptan with MAO inhibitor",
        message: "MAO inhibition raises triptan exposure and serotonin toxicity risk.",
        action: "Avoid the combination; choose a non-serotonergic migraine treatment.",
    },
    PairRule {
        id: "dd-pde5-nitrate",
        a: "@pde5_inhibitor",
        b: "@nitrate",
        severity: AlertSeverity::Critical,
        title: "PDE5 inhibitor with nitrate",
        message: "Profound, potentially fatal hypotension.",
        action: "Contraindicated. Do not use within 24-48 hours of each other.",
    },
    PairRule {
        id: "dd-statin-cyp3a4",
        a: "@statin_cyp3a4",
        b: "@strong_cyp3a4_inhibitor",
        severity: AlertSeverity::Critical,
        title: "Statin with strong CYP3A4 inhibitor",
        message: "Strong CYP3A4 inhibition raises statin levels; risk of myopathy and rhabdomyolysis.",
        action: "Hold the statin during the course or switch to pravastatin/rosuvastatin.",
    },
    PairRule {
        id: "dd-methotrexate-trimethoprim",
        a: "methotrexate",
        b: "trimethoprim",
        severity: AlertSeverity::Critical,
        title: "Methotrexate with trimethoprim",
        message: "Additive antifolate effect and reduced clearance; bone marrow suppression.",
        action: "Avoid the combination; choose an alternative antibiotic.",
    },
    PairRule {
        id: "dd-colchicine-macrolide",
        a: "colchicine",
        b: "@macrolide_strong",
        severity: AlertSeverity::Critical,
        title: "Colchicine with strong macrolide",
        message: "CYP3A4 and P-gp inhibition raise colchicine to toxic levels.",
        action: "Avoid, or reduce the colchicine dose substantially.",
    },
    PairRule {
        id: "dd-opioid-benzo",
        a: "@opioid",
        b: "@benzodiazepine",
        severity: AlertSeverity::Critical,
        title: "Opioid with benzodiazepine",
        message: "Additive CNS and respiratory depression; boxed warning for overdose death.",
        action: "Avoid co-prescribing; if unavoidable use lowest doses and provide naloxone.",
    },
    PairRule {
        id: "dd-allopurinol-azathioprine",
        a: "allopurinol",
        b: "azathioprine",
        severity: AlertSeverity::Critical,
        title: "Allopurinol with azathioprine",
        message: "Xanthine oxidase inhibition causes azathioprine accumulation and severe myelosuppression.",
        action: "Avoid, or reduce azathioprine dose to a quarter with close blood count monitoring.",
    },
    PairRule {
        id: "dd-cipro-tizanidine",
        a: "ciprofloxacin",
        b: "tizanidine",
        severity: AlertSeverity::Critical,
        title: "Ciprofloxacin with tizanidine",
        message: "CYP1A2 inhibition increases tizanidine exposure; severe hypotension and sedation.",
        action: "Contraindicated. Choose another antibiotic.",
    },
    PairRule {
        id: "dd-sjw-ssri",
        a: "@st_johns_wort",
        b: "@ssri",
        severity: AlertSeverity::Critical,
        title: "St John's Wort with SSRI",
        message: "Additive serotonergic effect; risk of serotonin syndrome.",
        action: "Stop St John's Wort.",
    },
    PairRule {
        id: "dd-lithium-nsaid",
        a: "lithium",
        b: "@nsaid",
        severity: AlertSeverity::Warning,
        title: "Lithium with NSAID",
        message: "NSAIDs reduce renal lithium clearance; risk of lithium toxicity.",
        action: "Avoid or monitor lithium levels closely.",
    },
    PairRule {
        id: "dd-lithium-acei",
        a: "lithium",
        b: "@ace_inhibitor",
        severity: AlertSeverity::Warning,
        title: "Lithium with ACE inhibitor",
        message: "ACE inhibitors raise lithium levels.",
        action: "Monitor lithium levels after starting or changing the dose.",
    },
    PairRule {
        id: "dd-acei-kspare",
        a: "@ace_inhibitor",
        b: "@potassium_sparing",
        severity: AlertSeverity::Warning,
        title: "ACE inhibitor with potassium-sparing diuretic",
        message: "Risk of hyperkalemia.",
        action: "Monitor serum potassium and renal function.",
    },
    PairRule {
        id: "dd-arb-kspare",
        a: "@arb",
        b: "@potassium_sparing",
        severity: AlertSeverity::Warning,
        title: "ARB with potassium-sparing diuretic",
        message: "Risk of hyperkalemia.",
        action: "Monitor serum potassium and renal function.",
    },
    PairRule {
        id: "dd-tramadol-ssri",
        a: "tramadol",
        b: "@ssri",
        severity: AlertSeverity::Warning,
        title: "Tramadol with SSRI",
        message: "Serotonin syndrome and lowered seizure threshold.",
        action: "Use an alternative analgesic or monitor for serotonergic symptoms.",
    },
    PairRule {
        id: "dd-clopidogrel-ppi",
        a: "clopidogrel",
        b: "omeprazole",
        severity: AlertSeverity::Warning,
        title: "Clopidogrel with omeprazole",
        message: "CYP2C19 inhibition reduces clopidogrel activation.",
        action: "Prefer pantoprazole if acid suppression is needed.",
    },
    PairRule {
        id: "dd-clopidogrel-esomeprazole",
        a: "clopidogrel",
        b: "esomeprazole",
        severity: AlertSeverity::Warning,
        title: "Clopidogrel with esomeprazole",
        message: "CYP2C19 inhibition reduces clopidogrel activation.",
        action: "Prefer pantoprazole if acid suppression is needed.",
    },
    PairRule {
        id: "dd-ssri-anticoag",
        a: "@ssri",
        b: "@anticoagulant",
        severity: AlertSeverity::Warning,
        title: "SSRI with anticoagulant",
        message: "SSRIs impair platelet serotonin uptake; increased bleeding risk.",
        action: "Monitor for bleeding; consider gastroprotection.",
    },
    PairRule {
        id: "dd-sjw-warfarin",
        a: "@st_johns_wort",
        b: "warfarin",
        severity: AlertSeverity::Warning,
        title: "St John's Wort with warfarin",
        message: "Enzyme induction lowers warfarin levels and INR.",
        action: "Avoid; if stopped, monitor INR closely.",
    },
    PairRule {
        id: "dd-ginkgo-anticoag",
        a: "ginkgo",
        b: "@anticoagulant",
        severity: AlertSeverity::Warning,
        title: "Ginkgo with anticoagulant",
        message: "Ginkgo may add antiplatelet effect; increased bleeding risk.",
        action: "Avoid ginkgo while anticoagulated.",
    },
    PairRule {
        id: "dd-digoxin-amiodarone",
        a: "digoxin",
        b: "amiodarone",
        severity: AlertSeverity::Warning,
        title: "Digoxin with amiodarone",
        message: "Amiodarone roughly doubles digoxin levels.",
        action: "Halve the digoxin dose and monitor levels.",
    },
    PairRule {
        id: "dd-spironolactone-kcl",
        a: "spironolactone",
        b: "potassium chloride",
        severity: AlertSeverity::Warning,
        title: "Spironolactone with potassium supplement",
        message: "Risk of hyperkalemia.",
        action: "Avoid routine potassium supplementation; monitor potassium.",
    },
];

/// Substance key → keywords recognised in free text.
pub const SUBSTANCE_KEYWORDS: &[(&str, &[&str])] = &[
    ("alcohol", &["alcohol", "ethanol", "wine", "beer", "liquor", "spirits"]),
    ("grapefruit", &["grapefruit", "pomelo", "seville orange"]),
    ("tyramine", &["tyramine", "aged cheese", "cured meat", "fermented"]),
    ("vitamin_k", &["vitamin k", "leafy greens", "kale", "spinach"]),
    ("dairy", &["dairy", "milk", "calcium", "antacid"]),
    ("tobacco", &["tobacco", "smoking", "cigarette", "nicotine"]),
];

pub const DRUG_SUBSTANCE_RULES: &[PairRule] = &[
    PairRule {
        id: "ds-alcohol-metronidazole",
        a: "metronidazole",
        b: "alcohol",
        severity: AlertSeverity::Critical,
        title: "Metronidazole with alcohol",
        message: "Disulfiram-like reaction: flushing, vomiting, tachycardia.",
        action: "No alcohol during treatment and for 72 hours after the last dose.",
    },
    PairRule {
        id: "ds-alcohol-benzo",
        a: "@benzodiazepine",
        b: "alcohol",
        severity: AlertSeverity::Critical,
        title: "Benzodiazepine with alcohol",
        message: "Additive CNS and respiratory depression.",
        action: "Avoid alcohol.",
    },
    PairRule {
        id: "ds-alcohol-opioid",
        a: "@opioid",
        b: "alcohol",
        severity: AlertSeverity::Critical,
        title: "Opioid with alcohol",
        message: "Additive CNS and respiratory depression; overdose risk.",
        action: "Avoid alcohol.",
    },
    PairRule {
        id: "ds-tyramine-maoi",
        a: "@maoi",
        b: "tyramine",
        severity: AlertSeverity::Critical,
        title: "MAO inhibitor with tyramine-rich food",
        message: "Hypertensive crisis.",
        action: "Follow a tyramine-restricted diet.",
    },
    PairRule {
        id: "ds-alcohol-acetaminophen",
        a: "acetaminophen",
        b: "alcohol",
        severity: AlertSeverity::Warning,
        title: "Acetaminophen with alcohol",
        message: "Chronic alcohol use increases the risk of hepatotoxicity.",
        action: "Limit acetaminophen to 2 g/day with regular alcohol use.",
    },
    PairRule {
        id: "ds-alcohol-warfarin",
        a: "warfarin",
        b: "alcohol",
        severity: AlertSeverity::Warning,
        title: "Warfarin with alcohol",
        message: "Binge drinking raises INR; chronic use lowers it.",
        action: "Keep alcohol intake low and consistent; monitor INR.",
    },
    PairRule {
        id: "ds-alcohol-metformin",
        a: "metformin",
        b: "alcohol",
        severity: AlertSeverity::Warning,
        title: "Metformin with alcohol",
        message: "Heavy alcohol use increases lactic acidosis risk.",
        action: "Avoid excessive alcohol.",
    },
    PairRule {
        id: "ds-grapefruit-statin",
        a: "@statin_cyp3a4",
        b: "grapefruit",
        severity: AlertSeverity::Warning,
        title: "Statin with grapefruit",
        message: "Grapefruit inhibits intestinal CYP3A4 and raises statin exposure.",
        action: "Avoid grapefruit juice.",
    },
    PairRule {
        id: "ds-vitk-warfarin",
        a: "warfarin",
        b: "vitamin_k",
        severity: AlertSeverity::Info,
        title: "Warfarin with vitamin K intake",
        message: "Changes in vitamin K intake alter warfarin effect.",
        action: "Keep vitamin K intake consistent.",
    },
    PairRule {
        id: "ds-dairy-fluoroquinolone",
        a: "@fluoroquinolone",
        b: "dairy",
        severity: AlertSeverity::Info,
        title: "Fluoroquinolone with calcium",
        message: "Calcium chelates fluoroquinolones and reduces absorption.",
        action: "Take the antibiotic 2 hours before or 6 hours after dairy or antacids.",
    },
    PairRule {
        id: "ds-tobacco-clozapine",
        a: "clozapine",
        b: "tobacco",
        severity: AlertSeverity::Warning,
        title: "Clozapine with smoking",
        message: "Smoking induces CYP1A2; stopping smoking can raise clozapine to toxic levels.",
        action: "Monitor clozapine levels when smoking status changes.",
    },
];

pub const DRUG_ALLERGY_RULES: &[KeywordRule] = &[
    KeywordRule {
        id: "da-penicillin",
        keyword_groups: &[&["penicillin"], &["amoxicillin"], &["beta-lactam"]],
        drug: "@penicillin",
        severity: AlertSeverity::Critical,
        title: "Penicillin allergy",
        message: "Patient has a documented penicillin allergy and is taking a penicillin.",
        action: "Stop and choose a non-beta-lactam alternative.",
    },
    KeywordRule {
        id: "da-penicillin-cephalosporin",
        keyword_groups: &[&["penicillin"], &["amoxicillin"]],
        drug: "@cephalosporin",
        severity: AlertSeverity::Warning,
        title: "Penicillin allergy with cephalosporin",
        message: "Low but real cross-reactivity between penicillins and cephalosporins.",
        action: "Check the allergy history; avoid if the reaction was anaphylaxis.",
    },
    KeywordRule {
        id: "da-cephalosporin",
        keyword_groups: &[&["cephalosporin"], &["cephalexin"]],
        drug: "@cephalosporin",
        severity: AlertSeverity::Critical,
        title: "Cephalosporin allergy",
        message: "Patient has a documented cephalosporin allergy and is taking a cephalosporin.",
        action: "Stop and choose an alternative.",
    },
    KeywordRule {
        id: "da-sulfa",
        keyword_groups: &[&["sulfa"], &["sulfonamide"], &["sulfamethoxazole"]],
        drug: "@sulfonamide",
        severity: AlertSeverity::Critical,
        title: "Sulfonamide allergy",
        message: "Patient has a sulfonamide allergy and is taking a sulfonamide antibiotic.",
        action: "Stop and choose a non-sulfonamide antibiotic.",
    },
    KeywordRule {
        id: "da-nsaid",
        keyword_groups: &[&["nsaid"], &["ibuprofen"], &["naproxen"], &["aspirin"]],
        drug: "@nsaid",
        severity: AlertSeverity::Warning,
        title: "NSAID sensitivity",
        message: "NSAID or aspirin hypersensitivity often cross-reacts with other NSAIDs.",
        action: "Avoid NSAIDs; acetaminophen is usually tolerated.",
    },
    KeywordRule {
        id: "da-aspirin",
        keyword_groups: &[&["aspirin"], &["salicylate"], &["nsaid"]],
        drug: "aspirin",
        severity: AlertSeverity::Critical,
        title: "Aspirin allergy",
        message: "Patient has an aspirin or NSAID allergy and is taking aspirin.",
        action: "Stop aspirin and review antiplatelet alternatives.",
    },
    KeywordRule {
        id: "da-opioid",
        keyword_groups: &[&["codeine"], &["morphine"], &["opioid"], &["opiate"]],
        drug: "@opioid",
        severity: AlertSeverity::Warning,
        title: "Opioid allergy",
        message: "Opioid allergy recorded; true cross-reactivity varies by chemical class.",
        action: "Clarify the reaction; consider a structurally different opioid.",
    },
    KeywordRule {
        id: "da-fluoroquinolone",
        keyword_groups: &[&["quinolone"], &["ciprofloxacin"], &["levofloxacin"]],
        drug: "@fluoroquinolone",
        severity: AlertSeverity::Critical,
        title: "Fluoroquinolone allergy",
        message: "Patient has a fluoroquinolone allergy and is taking a fluoroquinolone.",
        action: "Stop and choose another antibiotic class.",
    },
];

pub const DRUG_CONDITION_RULES: &[KeywordRule] = &[
    KeywordRule {
        id: "dc-nsaid-renal",
        keyword_groups: &[&["kidney"], &["renal"], &["ckd"]],
        drug: "@nsaid",
        severity: AlertSeverity::Warning,
        title: "NSAID in kidney disease",
        message: "NSAIDs reduce renal perfusion and can worsen kidney function.",
        action: "Avoid NSAIDs; use acetaminophen.",
    },
    KeywordRule {
        id: "dc-nsaid-hf",
        keyword_groups: &[&["heart failure"], &["chf"]],
        drug: "@nsaid",
        severity: AlertSeverity::Warning,
        title: "NSAID in heart failure",
        message: "NSAIDs cause fluid retention and can precipitate decompensation.",
        action: "Avoid NSAIDs.",
    },
    KeywordRule {
        id: "dc-nsaid-ulcer",
        keyword_groups: &[&["ulcer"], &["gi bleed"], &["gastrointestinal bleed"]],
        drug: "@nsaid",
        severity: AlertSeverity::Warning,
        title: "NSAID with ulcer history",
        message: "High risk of recurrent GI bleeding.",
        action: "Avoid, or add a proton pump inhibitor if unavoidable.",
    },
    KeywordRule {
        id: "dc-metformin-renal",
        keyword_groups: &[&["kidney"], &["renal"], &["ckd"]],
        drug: "metformin",
        severity: AlertSeverity::Warning,
        title: "Metformin in kidney disease",
        message: "Reduced clearance raises lactic acidosis risk.",
        action: "Check eGFR; contraindicated below 30 mL/min/1.73m².",
    },
    KeywordRule {
        id: "dc-betablocker-asthma",
        keyword_groups: &[&["asthma"], &["copd"], &["bronchospasm"]],
        drug: "@nonselective_beta_blocker",
        severity: AlertSeverity::Warning,
        title: "Non-selective beta blocker in asthma/COPD",
        message: "Beta-2 blockade can trigger bronchospasm.",
        action: "Prefer a cardioselective beta blocker.",
    },
    KeywordRule {
        id: "dc-benzo-apnea",
        keyword_groups: &[&["sleep apnea"], &["copd"]],
        drug: "@benzodiazepine",
        severity: AlertSeverity::Warning,
        title: "Benzodiazepine with respiratory disease",
        message: "Respiratory depression in sleep apnea or COPD.",
        action: "Avoid or use the lowest dose.",
    },
    KeywordRule {
        id: "dc-opioid-apnea",
        keyword_groups: &[&["sleep apnea"], &["copd"]],
        drug: "@opioid",
        severity: AlertSeverity::Warning,
        title: "Opioid with respiratory disease",
        message: "Respiratory depression in sleep apnea or COPD.",
        action: "Use the lowest effective dose and monitor.",
    },
    KeywordRule {
        id: "dc-antihistamine-glaucoma",
        keyword_groups: &[&["glaucoma"], &["prostat"], &["bph"], &["urinary retention"]],
        drug: "@first_gen_antihistamine",
        severity: AlertSeverity::Warning,
        title: "Anticholinergic antihistamine",
        message: "Anticholinergic effects worsen angle-closure glaucoma and urinary retention.",
        action: "Use a second-generation antihistamine.",
    },
    KeywordRule {
        id: "dc-decongestant-htn",
        keyword_groups: &[&["hypertension"], &["high blood pressure"]],
        drug: "pseudoephedrine",
        severity: AlertSeverity::Info,
        title: "Decongestant in hypertension",
        message: "Sympathomimetic decongestants raise blood pressure.",
        action: "Prefer saline or intranasal steroids.",
    },
    KeywordRule {
        id: "dc-warfarin-pregnancy",
        keyword_groups: &[&["pregnan"]],
        drug: "warfarin",
        severity: AlertSeverity::Critical,
        title: "Warfarin in pregnancy",
        message: "Warfarin is teratogenic.",
        action: "Switch to low molecular weight heparin.",
    },
    KeywordRule {
        id: "dc-acei-pregnancy",
        keyword_groups: &[&["pregnan"]],
        drug: "@ace_inhibitor",
        severity: AlertSeverity::Critical,
        title: "ACE inhibitor in pregnancy",
        message: "Fetal renal toxicity in the second and third trimester.",
        action: "Switch to labetalol, nifedipine or methyldopa.",
    },
    KeywordRule {
        id: "dc-isotretinoin-pregnancy",
        keyword_groups: &[&["pregnan"]],
        drug: "isotretinoin",
        severity: AlertSeverity::Critical,
        title: "Isotretinoin in pregnancy",
        message: "Isotretinoin is a potent teratogen.",
        action: "Contraindicated. Stop immediately.",
    },
    KeywordRule {
        id: "dc-fluoroquinolone-mg",
        keyword_groups: &[&["myasthenia"]],
        drug: "@fluoroquinolone",
        severity: AlertSeverity::Critical,
        title: "Fluoroquinolone in myasthenia gravis",
        message: "Fluoroquinolones can exacerbate muscle weakness.",
        action: "Avoid; choose another antibiotic.",
    },
];

pub const PHARMACOGENETIC_RULES: &[KeywordRule] = &[
    KeywordRule {
        id: "pgx-cyp2c19-clopidogrel",
        keyword_groups: &[&["cyp2c19", "poor"], &["cyp2c19", "2/2"]],
        drug: "clopidogrel",
        severity: AlertSeverity::Critical,
        title: "CYP2C19 poor metabolizer on clopidogrel",
        message: "Clopidogrel is a prodrug; poor metabolizers get little antiplatelet effect.",
        action: "Use prasugrel or ticagrelor if not contraindicated.",
    },
    KeywordRule {
        id: "pgx-cyp2d6-ultra-codeine",
        keyword_groups: &[&["cyp2d6", "ultrarapid"], &["cyp2d6", "ultra-rapid"]],
        drug: "codeine",
        severity: AlertSeverity::Critical,
        title: "CYP2D6 ultrarapid metabolizer on codeine",
        message: "Rapid conversion to morphine; risk of fatal toxicity.",
        action: "Avoid codeine; use a non-CYP2D6 analgesic.",
    },
    KeywordRule {
        id: "pgx-cyp2d6-ultra-tramadol",
        keyword_groups: &[&["cyp2d6", "ultrarapid"], &["cyp2d6", "ultra-rapid"]],
        drug: "tramadol",
        severity: AlertSeverity::Critical,
        title: "CYP2D6 ultrarapid metabolizer on tramadol",
        message: "Increased formation of the active metabolite; respiratory depression risk.",
        action: "Avoid tramadol.",
    },
    KeywordRule {
        id: "pgx-cyp2d6-poor-codeine",
        keyword_groups: &[&["cyp2d6", "poor"]],
        drug: "codeine",
        severity: AlertSeverity::Warning,
        title: "CYP2D6 poor metabolizer on codeine",
        message: "Little conversion to morphine; inadequate analgesia.",
        action: "Use a non-CYP2D6 analgesic.",
    },
    KeywordRule {
        id: "pgx-hlab5701-abacavir",
        keyword_groups: &[&["hla-b5701"]],
        drug: "abacavir",
        severity: AlertSeverity::Critical,
        title: "HLA-B*57:01 with abacavir",
        message: "High risk of abacavir hypersensitivity reaction.",
        action: "Contraindicated.",
    },
    KeywordRule {
        id: "pgx-hlab1502-carbamazepine",
        keyword_groups: &[&["hla-b1502"]],
        drug: "carbamazepine",
        severity: AlertSeverity::Critical,
        title: "HLA-B*15:02 with carbamazepine",
        message: "High risk of Stevens-Johnson syndrome / toxic epidermal necrolysis.",
        action: "Avoid carbamazepine.",
    },
    KeywordRule {
        id: "pgx-hlab5801-allopurinol",
        keyword_groups: &[&["hla-b5801"]],
        drug: "allopurinol",
        severity: AlertSeverity::Critical,
        title: "HLA-B*58:01 with allopurinol",
        message: "High risk of severe cutaneous adverse reactions.",
        action: "Use an alternative urate-lowering therapy.",
    },
    KeywordRule {
        id: "pgx-tpmt-azathioprine",
        keyword_groups: &[&["tpmt", "poor"], &["tpmt", "deficien"], &["tpmt", "low"]],
        drug: "azathioprine",
        severity: AlertSeverity::Critical,
        title: "TPMT deficiency on azathioprine",
        message: "Accumulation of thioguanine nucleotides; life-threatening myelosuppression.",
        action: "Drastically reduce the dose or use an alternative.",
    },
    KeywordRule {
        id: "pgx-dpyd-capecitabine",
        keyword_groups: &[&["dpyd"]],
        drug: "capecitabine",
        severity: AlertSeverity::Critical,
        title: "DPYD variant on capecitabine",
        message: "Reduced fluoropyrimidine clearance; severe toxicity.",
        action: "Reduce the dose per genotype or avoid.",
    },
    KeywordRule {
        id: "pgx-cyp2c9-warfarin",
        keyword_groups: &[&["cyp2c9"], &["vkorc1"]],
        drug: "warfarin",
        severity: AlertSeverity::Warning,
        title: "CYP2C9/VKORC1 variant on warfarin",
        message: "Genotype changes warfarin dose requirements.",
        action: "Use genotype-guided dosing and monitor INR closely.",
    },
    KeywordRule {
        id: "pgx-slco1b1-simvastatin",
        keyword_groups: &[&["slco1b1"]],
        drug: "simvastatin",
        severity: AlertSeverity::Warning,
        title: "SLCO1B1 variant on simvastatin",
        message: "Reduced hepatic uptake; higher myopathy risk.",
        action: "Prefer a lower dose or another statin.",
    },
];

pub const BEERS_RULES: &[BeersRule] = &[
    BeersRule {
        id: "beers-antihistamine",
        drug: "@first_gen_antihistamine",
        severity: AlertSeverity::Warning,
        title: "First-generation antihistamine in older adult",
        message: "Highly anticholinergic; confusion, constipation and falls.",
        action: "Use a second-generation antihistamine.",
    },
    BeersRule {
        id: "beers-benzodiazepine",
        drug: "@benzodiazepine",
        severity: AlertSeverity::Warning,
        title: "Benzodiazepine in older adult",
        message: "Cognitive impairment, delirium, falls and fractures.",
        action: "Avoid; taper if long-term use.",
    },
    BeersRule {
        id: "beers-z-drug",
        drug: "@z_drug",
        severity: AlertSeverity::Warning,
        title: "Z-drug hypnotic in older adult",
        message: "Similar adverse effects to benzodiazepines with minimal sleep benefit.",
        action: "Avoid; prefer sleep hygiene or CBT-I.",
    },
    BeersRule {
        id: "beers-tricyclic",
        drug: "@tricyclic",
        severity: AlertSeverity::Warning,
        title: "Tertiary tricyclic in older adult",
        message: "Anticholinergic, sedating and causes orthostatic hypotension.",
        action: "Avoid; choose an alternative antidepressant.",
    },
    BeersRule {
        id: "beers-muscle-relaxant",
        drug: "@muscle_relaxant",
        severity: AlertSeverity::Warning,
        title: "Muscle relaxant in older adult",
        message: "Poorly tolerated; anticholinergic effects and fracture risk.",
        action: "Avoid.",
    },
    BeersRule {
        id: "beers-sulfonylurea",
        drug: "@long_acting_sulfonylurea",
        severity: AlertSeverity::Warning,
        title: "Long-acting sulfonylurea in older adult",
        message: "Prolonged hypoglycemia risk.",
        action: "Prefer a shorter-acting agent or a non-sulfonylurea.",
    },
    BeersRule {
        id: "beers-meperidine",
        drug: "meperidine",
        severity: AlertSeverity::Warning,
        title: "Meperidine in older adult",
        message: "Neurotoxic metabolite; delirium.",
        action: "Avoid; use another opioid if needed.",
    },
    BeersRule {
        id: "beers-nsaid",
        drug: "@nsaid",
        severity: AlertSeverity::Info,
        title: "Chronic NSAID in older adult",
        message: "Increased risk of GI bleeding and kidney injury.",
        action: "Avoid chronic use unless alternatives fail; add gastroprotection.",
    },
    BeersRule {
        id: "beers-ppi",
        drug: "@ppi",
        severity: AlertSeverity::Info,
        title: "Proton pump inhibitor beyond 8 weeks",
        message: "C. difficile infection, bone loss and fractures with long-term use.",
        action: "Reassess the need beyond 8 weeks.",
    },
    BeersRule {
        id: "beers-digoxin",
        drug: "digoxin",
        severity: AlertSeverity::Info,
        title: "Digoxin in older adult",
        message: "Toxicity with reduced renal clearance.",
        action: "Avoid doses above 0.125 mg/day.",
    },
];

/// Members of a class key (without the `@`), empty when unknown.
pub fn class_members(class: &str) -> &'static [&'static str] {
    DRUG_CLASSES
        .iter()
        .find(|(key, _)| *key == class)
        .map(|(_, members)| *members)
        .unwrap_or(&[])
}

/// Generic name for a brand name (already lowercased).
pub fn resolve_brand(name: &str) -> Option<&'static str> {
    BRAND_ALIASES
        .iter()
        .find(|(brand, _)| *brand == name)
        .map(|(_, generic)| *generic)
}

/// Keywords for a substance key.
pub fn substance_keywords(key: &str) -> &'static [&'static str] {
    SUBSTANCE_KEYWORDS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, kw)| *kw)
        .unwrap_or(&[])
}
