use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use super::{Category, Difficulty};

const RANDOM_KEY: &str = "RANDOM";

/// A difficulty or category choice made before a quiz.
///
/// On the wire `Random` is the literal `"RANDOM"`; `Only` uses the
/// representation of the wrapped value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection<T> {
    Random,
    Only(T),
}

impl<T: Copy + PartialEq> Selection<T> {
    /// Whether `value` passes this selection.
    pub fn admits(&self, value: T) -> bool {
        match self {
            Selection::Random => true,
            Selection::Only(wanted) => *wanted == value,
        }
    }
}

impl Selection<Difficulty> {
    pub fn is_kangaroo(&self) -> bool {
        matches!(self, Selection::Only(Difficulty::Kangaroo))
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Selection::Random => "Random",
            Selection::Only(difficulty) => difficulty.display_name(),
        }
    }

    /// Every choice offered on the play screen, in menu order.
    pub fn choices() -> Vec<Self> {
        std::iter::once(Selection::Random)
            .chain(Difficulty::ALL.into_iter().map(Selection::Only))
            .collect()
    }
}

impl Selection<Category> {
    pub fn display_name(&self) -> &'static str {
        match self {
            Selection::Random => "Random",
            Selection::Only(category) => category.display_name(),
        }
    }

    /// Every choice offered on the play screen, in menu order.
    pub fn choices() -> Vec<Self> {
        std::iter::once(Selection::Random)
            .chain(Category::ALL.into_iter().map(Selection::Only))
            .collect()
    }
}

impl<T: Serialize> Serialize for Selection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Selection::Random => serializer.serialize_str(RANDOM_KEY),
            Selection::Only(value) => value.serialize(serializer),
        }
    }
}

#[derive(serde::Deserialize)]
enum RandomKey {
    #[serde(rename = "RANDOM")]
    Random,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum SelectionRepr<T> {
    Random(RandomKey),
    Only(T),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Selection<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match SelectionRepr::<T>::deserialize(deserializer)? {
            SelectionRepr::Random(RandomKey::Random) => Selection::Random,
            SelectionRepr::Only(value) => Selection::Only(value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_wire_format() {
        let random: Selection<Category> = Selection::Random;
        assert_eq!(serde_json::to_string(&random).unwrap(), "\"RANDOM\"");

        let art = Selection::Only(Category::Art);
        assert_eq!(serde_json::to_string(&art).unwrap(), "\"ART\"");

        let parsed: Selection<Category> = serde_json::from_str("\"RANDOM\"").unwrap();
        assert_eq!(parsed, Selection::Random);
        let parsed: Selection<Category> = serde_json::from_str("\"SPORTS\"").unwrap();
        assert_eq!(parsed, Selection::Only(Category::Sports));
        assert!(serde_json::from_str::<Selection<Category>>("\"CHESS\"").is_err());
    }

    #[test]
    fn test_admits() {
        assert!(Selection::Random.admits(Difficulty::Hard));
        assert!(Selection::Only(Difficulty::Hard).admits(Difficulty::Hard));
        assert!(!Selection::Only(Difficulty::Easy).admits(Difficulty::Hard));
    }

    #[test]
    fn test_choices_start_with_random() {
        let choices = Selection::<Difficulty>::choices();
        assert_eq!(choices[0], Selection::Random);
        assert_eq!(choices.len(), 5);
        assert_eq!(Selection::<Category>::choices().len(), 12);
    }
}
