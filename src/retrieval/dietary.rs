use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

use super::lexical::{rank, Ranked};

/// Unit suffixes stripped from display names, with the unit they denote.
const UNIT_SUFFIXES: &[(&str, &str)] = &[(" Mg", "mg"), (" Mcg", "mcg"), (" G", "g"), (" Iu", "iu")];

/// One recommended value for one nutrient in one age/gender bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    /// Display name, e.g. "Vitamin C".
    pub name: String,
    pub value: f64,
    /// Unit carried by the raw key suffix, if any.
    pub unit: Option<String>,
    pub age_group: String,
    pub gender: String,
    pub source_tag: String,
}

impl ReferenceRecord {
    /// `90 mg`, or just `90` when no unit is known.
    pub fn display_value(&self) -> String {
        match &self.unit {
            Some(unit) => format!("{} {}", self.value, unit),
            None => self.value.to_string(),
        }
    }
}

/// `vitamin_c_mg` -> ("Vitamin C", Some("mg")).
pub fn normalize_nutrient_key(key: &str) -> (String, Option<String>) {
    let spaced = key.replace(['_', '-'], " ");
    let mut pretty = spaced
        .split(' ')
        .map(title_word)
        .collect::<Vec<_>>()
        .join(" ");

    let mut unit = None;
    for (suffix, unit_name) in UNIT_SUFFIXES {
        if pretty.ends_with(suffix) {
            pretty.truncate(pretty.len() - suffix.len());
            unit = Some(unit_name.to_string());
        }
    }
    (pretty.trim().to_string(), unit)
}

fn title_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Relevance of `record` to `query`, compared case-insensitively.
///
/// Multi-token overlap is rewarded so "vitamin c" prefers "Vitamin C" over
/// "Vitamin A"; a single shared token only counts when the record name is
/// not a generic "vitamin" name.
pub fn score(query: &str, record: &ReferenceRecord) -> u32 {
    let query = query.to_lowercase();
    let query_tokens: HashSet<&str> = query.split_whitespace().collect();
    let name = record.name.to_lowercase();
    let shared = name.split_whitespace().filter(|t| query_tokens.contains(t)).collect::<HashSet<_>>().len();

    let mut score = 0;
    if !name.is_empty() && query.contains(&name) {
        score += 20;
    }
    if shared >= 2 {
        score += 10;
    } else if shared >= 1 && !name.contains("vitamin") {
        score += 10;
    }
    let gender = record.gender.to_lowercase();
    if !gender.is_empty() && query.contains(&gender) {
        score += 5;
    }
    score
}

/// Read-only index over the reference tables loaded at startup.
#[derive(Debug, Clone, Default)]
pub struct DietaryIndex {
    records: Vec<ReferenceRecord>,
}

impl DietaryIndex {
    pub fn new(records: Vec<ReferenceRecord>) -> Self {
        Self { records }
    }

    /// Loads every `*.json` table in `dir` in file-name order. A missing
    /// directory yields an empty index; unreadable tables are skipped.
    pub fn load_dir(dir: &Path) -> Self {
        let mut index = Self::default();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), "no dietary reference tables loaded: {}", e);
                return index;
            }
        };

        let mut paths: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            let source_tag = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            match fs::read_to_string(&path) {
                Ok(raw) => {
                    if let Err(e) = index.add_table_json(&source_tag, &raw) {
                        error!(file = %source_tag, "error loading reference table: {}", e);
                    }
                }
                Err(e) => error!(file = %source_tag, "error reading reference table: {}", e),
            }
        }

        info!(records = index.records.len(), "dietary reference index loaded");
        index
    }

    pub fn add_table_json(&mut self, source_tag: &str, raw: &str) -> Result<usize, serde_json::Error> {
        let table: Value = serde_json::from_str(raw)?;
        Ok(self.add_table(source_tag, &table))
    }

    /// Flattens `age_group -> gender -> nutrient_key -> value` into records.
    /// Returns how many records were added.
    pub fn add_table(&mut self, source_tag: &str, table: &Value) -> usize {
        let before = self.records.len();
        let Some(ages) = table.as_object() else {
            warn!(source = source_tag, "reference table is not a keyed mapping");
            return 0;
        };

        for (age_group, genders) in ages {
            let Some(genders) = genders.as_object() else { continue };
            for (gender, nutrients) in genders {
                let Some(nutrients) = nutrients.as_object() else { continue };
                for (key, value) in nutrients {
                    let Some(value) = value.as_f64() else {
                        warn!(source = source_tag, nutrient = %key, "skipping non-numeric reference value");
                        continue;
                    };
                    let (name, unit) = normalize_nutrient_key(key);
                    self.records.push(ReferenceRecord {
                        name,
                        value,
                        unit,
                        age_group: age_group.clone(),
                        gender: gender.clone(),
                        source_tag: source_tag.to_string(),
                    });
                }
            }
        }
        self.records.len() - before
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ReferenceRecord] {
        &self.records
    }

    /// Best `top_k` records for the query, highest score first.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<Ranked<&ReferenceRecord>> {
        let query = query.to_lowercase();
        let mut ranked = rank(self.records.iter().map(|r| (score(&query, r), r)));
        ranked.truncate(top_k);
        ranked
    }

    /// Markdown report of up to three brackets for a nutrient.
    pub fn describe(&self, nutrient: &str) -> String {
        let hits = self.search(nutrient, 3);
        if hits.is_empty() {
            return format!("I couldn't find specific dietary advice for '{}'.", nutrient);
        }

        let mut response = format!("**Dietary Recommendations for '{}'**:\n", nutrient);
        for hit in &hits {
            let record = hit.item;
            response.push_str(&format!(
                "- **{} years ({})**: {}\n",
                record.age_group,
                record.gender,
                record.display_value()
            ));
        }
        response.push_str("*(Source: UK Government Dietary Recommendations)*");
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn index() -> DietaryIndex {
        let mut index = DietaryIndex::default();
        index.add_table(
            "uk.json",
            &json!({
                "19-64": {
                    "male": { "vitamin_a_mcg": 700, "vitamin_c_mg": 40, "iron_mg": 8.7 },
                    "female": { "vitamin_a_mcg": 600, "vitamin_c_mg": 40, "iron_mg": 14.8 }
                }
            }),
        );
        index
    }

    #[test]
    fn normalizes_keys_and_keeps_units() {
        assert_eq!(normalize_nutrient_key("vitamin_c_mg"), ("Vitamin C".to_string(), Some("mg".to_string())));
        assert_eq!(normalize_nutrient_key("vitamin_b12_mcg"), ("Vitamin B12".to_string(), Some("mcg".to_string())));
        assert_eq!(normalize_nutrient_key("vitamin_d_iu"), ("Vitamin D".to_string(), Some("iu".to_string())));
        assert_eq!(normalize_nutrient_key("fibre_g"), ("Fibre".to_string(), Some("g".to_string())));
        assert_eq!(normalize_nutrient_key("energy"), ("Energy".to_string(), None));
    }

    #[test]
    fn generic_vitamin_token_does_not_score_alone() {
        let index = index();
        let vitamin_a = &index.records()[0];
        assert_eq!(vitamin_a.name, "Vitamin A");
        assert_eq!(score("vitamin c", vitamin_a), 0);
    }

    #[test]
    fn single_word_nutrient_matches() {
        let idx = index();
        let hits = idx.search("iron for women", 5);
        assert_eq!(hits[0].item.name, "Iron");
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn gender_boost_breaks_ties() {
        let idx = index();
        let hits = idx.search("iron male", 1);
        assert_eq!(hits[0].item.gender, "male");
        assert_eq!(hits[0].score, 35);
    }

    #[test]
    fn describe_lists_brackets() {
        let report = index().describe("iron");
        assert!(report.starts_with("**Dietary Recommendations for 'iron'**:"));
        assert!(report.contains("- **19-64 years (male)**: 8.7 mg"));
        assert!(report.ends_with("*(Source: UK Government Dietary Recommendations)*"));
        assert!(index().describe("unobtainium").contains("couldn't find"));
    }

    #[test]
    fn missing_dir_is_empty() {
        assert!(DietaryIndex::load_dir(Path::new("/definitely/not/here")).is_empty());
    }
}
