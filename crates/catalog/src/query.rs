//! Free-text search token → structured lesson filter.
//!
//! A single token is evaluated as exactly one kind:
//!
//! - **Numeric**: the trimmed token parses fully as a finite decimal number.
//!   The filter is an exact-equality OR over `price` and `spaces`
//!   ("find by stated price or by remaining capacity"), never a range.
//! - **Text**: anything else. The filter is a case-insensitive substring OR
//!   over `subject`, `location` and `description`. The token is matched
//!   literally; no pattern syntax is interpreted.
//!
//! An empty (or whitespace-only) token is a caller error, not an empty search.

use lessonbook_core::{DomainError, DomainResult};

use crate::lesson::Lesson;

/// Numeric lesson fields that support exact-equality search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    Price,
    Spaces,
}

impl NumericField {
    pub const ALL: [NumericField; 2] = [NumericField::Price, NumericField::Spaces];

    pub fn as_str(&self) -> &'static str {
        match self {
            NumericField::Price => "price",
            NumericField::Spaces => "spaces",
        }
    }

    fn value_of(&self, lesson: &Lesson) -> f64 {
        match self {
            NumericField::Price => lesson.price,
            NumericField::Spaces => lesson.spaces as f64,
        }
    }
}

/// Text lesson fields that support substring search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Subject,
    Location,
    Description,
}

impl TextField {
    pub const ALL: [TextField; 3] = [TextField::Subject, TextField::Location, TextField::Description];

    pub fn as_str(&self) -> &'static str {
        match self {
            TextField::Subject => "subject",
            TextField::Location => "location",
            TextField::Description => "description",
        }
    }

    fn value_of<'a>(&self, lesson: &'a Lesson) -> &'a str {
        match self {
            TextField::Subject => &lesson.subject,
            TextField::Location => &lesson.location,
            TextField::Description => &lesson.description,
        }
    }
}

/// A single-field predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldPredicate {
    /// `field == value`.
    Equals { field: NumericField, value: f64 },
    /// `lowercase(field)` contains `needle`. The needle is stored lowercased.
    ContainsIgnoreCase { field: TextField, needle: String },
}

impl FieldPredicate {
    pub fn matches(&self, lesson: &Lesson) -> bool {
        match self {
            FieldPredicate::Equals { field, value } => field.value_of(lesson) == *value,
            FieldPredicate::ContainsIgnoreCase { field, needle } => {
                field.value_of(lesson).to_lowercase().contains(needle.as_str())
            }
        }
    }
}

/// Structured predicate selecting zero or more lessons.
#[derive(Debug, Clone, PartialEq)]
pub enum LessonFilter {
    /// Every lesson in the catalog.
    All,
    /// Lessons matching at least one predicate.
    AnyOf(Vec<FieldPredicate>),
}

impl LessonFilter {
    /// `price == value OR spaces == value`.
    pub fn numeric_equals(value: f64) -> Self {
        LessonFilter::AnyOf(
            NumericField::ALL
                .iter()
                .map(|&field| FieldPredicate::Equals { field, value })
                .collect(),
        )
    }

    /// Case-insensitive substring match on any text field.
    pub fn text_contains(needle: &str) -> Self {
        let needle = needle.to_lowercase();
        LessonFilter::AnyOf(
            TextField::ALL
                .iter()
                .map(|&field| FieldPredicate::ContainsIgnoreCase {
                    field,
                    needle: needle.clone(),
                })
                .collect(),
        )
    }

    pub fn matches(&self, lesson: &Lesson) -> bool {
        match self {
            LessonFilter::All => true,
            LessonFilter::AnyOf(predicates) => predicates.iter().any(|p| p.matches(lesson)),
        }
    }
}

/// Translate a free-text search token into a lesson filter.
pub fn translate(token: &str) -> DomainResult<LessonFilter> {
    let token = token.trim();
    if token.is_empty() {
        return Err(DomainError::validation("search query cannot be empty"));
    }

    Ok(match parse_number(token) {
        Some(value) => LessonFilter::numeric_equals(value),
        None => LessonFilter::text_contains(token),
    })
}

// `f64::from_str` also accepts "inf"/"NaN"; those are words, not numbers.
fn parse_number(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessonbook_core::LessonId;
    use proptest::prelude::*;

    fn lesson(subject: &str, location: &str, description: &str, price: f64, spaces: i64) -> Lesson {
        Lesson {
            id: LessonId::new(),
            subject: subject.to_string(),
            location: location.to_string(),
            description: description.to_string(),
            price,
            spaces,
            version: 1,
        }
    }

    fn catalog() -> Vec<Lesson> {
        vec![
            lesson("Math", "Room1", "Algebra basics", 20.0, 5),
            lesson("English", "Hendon", "Reading club", 15.0, 20),
            lesson("Music", "Colindale", "Piano for beginners", 0.0, 0),
            lesson("Art", "Brent Cross", "Watercolour", 5.0, 15),
        ]
    }

    fn run(filter: &LessonFilter, lessons: &[Lesson]) -> Vec<String> {
        lessons
            .iter()
            .filter(|l| filter.matches(l))
            .map(|l| l.subject.clone())
            .collect()
    }

    #[test]
    fn empty_and_blank_tokens_are_invalid_input() {
        assert!(matches!(translate(""), Err(DomainError::Validation(_))));
        assert!(matches!(translate("   "), Err(DomainError::Validation(_))));
        assert!(matches!(translate("\t\n"), Err(DomainError::Validation(_))));
    }

    #[test]
    fn numeric_token_matches_price_or_spaces() {
        let filter = translate("20").unwrap();
        assert_eq!(filter, LessonFilter::numeric_equals(20.0));
        // Math costs 20, English has 20 spaces.
        assert_eq!(run(&filter, &catalog()), vec!["Math", "English"]);
    }

    #[test]
    fn zero_is_a_numeric_token() {
        let filter = translate("0").unwrap();
        assert_eq!(run(&filter, &catalog()), vec!["Music"]);
    }

    #[test]
    fn numeric_match_is_exact_not_range() {
        let filter = translate("15").unwrap();
        // English costs 15, Art has 15 spaces; nothing "around" 15.
        assert_eq!(run(&filter, &catalog()), vec!["English", "Art"]);
        assert!(run(&translate("16").unwrap(), &catalog()).is_empty());
    }

    #[test]
    fn decimal_token_matches_fractional_price() {
        let lessons = vec![lesson("Chess", "Library", "", 12.5, 3)];
        assert_eq!(run(&translate("12.5").unwrap(), &lessons), vec!["Chess"]);
        assert_eq!(run(&translate("12.50").unwrap(), &lessons), vec!["Chess"]);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed_on_both_paths() {
        assert_eq!(translate("  20 ").unwrap(), LessonFilter::numeric_equals(20.0));
        assert_eq!(translate(" math\t").unwrap(), LessonFilter::text_contains("math"));
    }

    #[test]
    fn text_token_is_case_insensitive_substring_over_three_fields() {
        let lessons = catalog();
        assert_eq!(run(&translate("MATH").unwrap(), &lessons), vec!["Math"]);
        // location
        assert_eq!(run(&translate("hend").unwrap(), &lessons), vec!["English"]);
        // description
        assert_eq!(run(&translate("piano").unwrap(), &lessons), vec!["Music"]);
        assert_eq!(run(&translate("room").unwrap(), &lessons), vec!["Math"]);
    }

    #[test]
    fn infinity_and_nan_are_text() {
        assert_eq!(translate("inf").unwrap(), LessonFilter::text_contains("inf"));
        assert_eq!(translate("NaN").unwrap(), LessonFilter::text_contains("nan"));
    }

    #[test]
    fn mixed_token_is_text() {
        let lessons = vec![lesson("Room 101 tour", "Hall", "", 3.0, 1)];
        let filter = translate("101 tour").unwrap();
        assert_eq!(filter, LessonFilter::text_contains("101 tour"));
        assert_eq!(run(&filter, &lessons), vec!["Room 101 tour"]);
    }

    #[test]
    fn pattern_characters_are_literal() {
        let lessons = vec![lesson("C++", "Lab", "", 1.0, 1), lesson("C", "Lab", "", 1.0, 1)];
        assert_eq!(run(&translate("c++").unwrap(), &lessons), vec!["C++"]);
        assert!(run(&translate(".*").unwrap(), &lessons).is_empty());
    }

    #[test]
    fn all_filter_matches_everything() {
        assert_eq!(run(&LessonFilter::All, &catalog()).len(), 4);
    }

    fn arb_lesson() -> impl Strategy<Value = Lesson> {
        (
            "[a-zA-Z ]{0,10}",
            "[a-zA-Z0-9 ]{0,10}",
            "[a-zA-Z ]{0,16}",
            0u32..50,
            0i64..50,
        )
            .prop_map(|(subject, location, description, price, spaces)| {
                lesson(&subject, &location, &description, price as f64, spaces)
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a numeric token selects exactly the lessons a linear scan
        /// with `price == n || spaces == n` selects.
        #[test]
        fn numeric_token_equals_linear_scan(
            lessons in prop::collection::vec(arb_lesson(), 0..20),
            n in 0u32..50,
            pad in "[ ]{0,2}",
        ) {
            let token = format!("{pad}{n}{pad}");
            let filter = translate(&token).unwrap();

            let expected: Vec<LessonId> = lessons
                .iter()
                .filter(|l| l.price == n as f64 || l.spaces == n as i64)
                .map(|l| l.id)
                .collect();
            let actual: Vec<LessonId> = lessons.iter().filter(|l| filter.matches(l)).map(|l| l.id).collect();

            prop_assert_eq!(actual, expected);
        }

        /// Property: a non-numeric token selects exactly the lessons where it
        /// occurs, ignoring case, in subject, location or description.
        #[test]
        fn text_token_equals_linear_scan(
            lessons in prop::collection::vec(arb_lesson(), 0..20),
            token in "[a-zA-Z]{1,3}",
        ) {
            let filter = translate(&token).unwrap();
            let lowered = token.to_ascii_lowercase();

            let expected: Vec<LessonId> = lessons
                .iter()
                .filter(|l| {
                    [&l.subject, &l.location, &l.description]
                        .iter()
                        .any(|f| f.to_ascii_lowercase().contains(&lowered))
                })
                .map(|l| l.id)
                .collect();
            let actual: Vec<LessonId> = lessons.iter().filter(|l| filter.matches(l)).map(|l| l.id).collect();

            prop_assert_eq!(actual, expected);
        }
    }
}
