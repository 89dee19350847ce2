//! Suggestion sources
//!
//! A suggestion source turns the text typed so far into candidate
//! variables. How candidates are fetched or ranked is up to the source;
//! tally only consumes the `{id, name, value}` triples it returns.

use crate::Suggestion;

/// Something that can offer variables for a search string
pub trait SuggestionSource {
    /// Candidates matching `search`, best first
    fn suggest(&self, search: &str) -> Vec<Suggestion>;
}

impl<T: SuggestionSource + ?Sized> SuggestionSource for &T {
    fn suggest(&self, search: &str) -> Vec<Suggestion> {
        (**self).suggest(search)
    }
}

impl<T: SuggestionSource + ?Sized> SuggestionSource for Box<T> {
    fn suggest(&self, search: &str) -> Vec<Suggestion> {
        (**self).suggest(search)
    }
}

/// In-memory list of variables, searched by case-insensitive substring
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Catalog {
    entries: Vec<Suggestion>,
}

impl Catalog {
    /// Create a catalog from a list of variables
    pub fn new(entries: Vec<Suggestion>) -> Self {
        Self { entries }
    }

    /// The demo variables shipped with tally
    pub fn builtin() -> Self {
        [
            (1_u64, "Revenue", 1000.0),
            (2, "Expenses", 500.0),
            (3, "Profit", 500.0),
            (4, "GrowthRate", 0.1),
            (5, "TaxRate", 0.2),
            (6, "Employees", 50.0),
            (7, "RevenuePerEmployee", 20.0),
            (8, "MarketingBudget", 200.0),
            (9, "SalesForecast", 1500.0),
            (10, "OperatingCosts", 300.0),
            (11, "CustomerAcquisitionCost", 50.0),
            (12, "AverageOrderValue", 75.0),
            (13, "ConversionRate", 0.03),
            (14, "ChurnRate", 0.05),
            (15, "LifetimeValue", 500.0),
        ]
        .into_iter()
        .map(|(id, name, value)| Suggestion::new(id, name, value))
        .collect()
    }

    /// Parse a catalog from a JSON array of `{"id", "name", "value"}` objects
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize the catalog as a JSON array
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// All entries, in catalog order
    pub fn entries(&self) -> &[Suggestion] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add an entry
    pub fn push(&mut self, entry: Suggestion) {
        self.entries.push(entry);
    }

    /// Look up an entry by exact name, ignoring case
    pub fn get(&self, name: &str) -> Option<&Suggestion> {
        let name = name.to_lowercase();
        self.entries.iter().find(|e| e.name.to_lowercase() == name)
    }
}

impl FromIterator<Suggestion> for Catalog {
    fn from_iter<I: IntoIterator<Item = Suggestion>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl SuggestionSource for Catalog {
    fn suggest(&self, search: &str) -> Vec<Suggestion> {
        if search.trim().is_empty() {
            return Vec::new();
        }

        let needle = search.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}
