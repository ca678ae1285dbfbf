use serde::{Deserialize, Serialize};

use lessonbook_core::{DomainError, DomainResult, LessonId, Versioned};

/// Catalog record: a bookable lesson with a finite number of spaces.
///
/// `version` is store-managed and bumped on every successful spaces update;
/// it never leaves the process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lesson {
    pub id: LessonId,
    pub subject: String,
    pub location: String,
    pub description: String,
    pub price: f64,
    pub spaces: i64,
    #[serde(skip)]
    pub version: u64,
}

/// Why a spaces delta cannot be applied to a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpacesRejection {
    /// The result would drop below zero.
    Insufficient { available: i64, requested: i64 },
    /// The result does not fit the counter.
    Overflow,
}

impl Lesson {
    /// Value of `spaces` after applying `delta`, or why the store must refuse it.
    ///
    /// Stores call this inside their atomic section; callers never pre-check.
    pub fn spaces_after(&self, delta: i64) -> Result<i64, SpacesRejection> {
        let next = self
            .spaces
            .checked_add(delta)
            .ok_or(SpacesRejection::Overflow)?;
        if next < 0 {
            return Err(SpacesRejection::Insufficient {
                available: self.spaces,
                requested: delta.saturating_neg(),
            });
        }
        Ok(next)
    }
}

impl Versioned for Lesson {
    type Id = LessonId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// A lesson as supplied by seed data, before the store assigns its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLesson {
    pub subject: String,
    pub location: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub spaces: i64,
}

impl NewLesson {
    pub fn validate(&self) -> DomainResult<()> {
        if self.subject.trim().is_empty() {
            return Err(DomainError::validation("subject cannot be empty"));
        }
        if self.location.trim().is_empty() {
            return Err(DomainError::validation("location cannot be empty"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(DomainError::validation("price must be a non-negative number"));
        }
        if self.spaces < 0 {
            return Err(DomainError::invariant("spaces cannot be negative"));
        }
        Ok(())
    }

    /// Materialize the record under a store-assigned id at version 1.
    pub fn into_lesson(self, id: LessonId) -> Lesson {
        Lesson {
            id,
            subject: self.subject,
            location: self.location,
            description: self.description,
            price: self.price,
            spaces: self.spaces,
            version: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn math() -> NewLesson {
        NewLesson {
            subject: "Math".to_string(),
            location: "Room1".to_string(),
            description: String::new(),
            price: 20.0,
            spaces: 5,
        }
    }

    #[test]
    fn valid_seed_lesson_passes() {
        assert!(math().validate().is_ok());
    }

    #[test]
    fn blank_subject_is_rejected() {
        let mut lesson = math();
        lesson.subject = "   ".to_string();
        assert!(matches!(lesson.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn negative_or_nan_price_is_rejected() {
        let mut lesson = math();
        lesson.price = -1.0;
        assert!(lesson.validate().is_err());
        lesson.price = f64::NAN;
        assert!(lesson.validate().is_err());
    }

    #[test]
    fn negative_spaces_violate_invariant() {
        let mut lesson = math();
        lesson.spaces = -1;
        assert!(matches!(
            lesson.validate(),
            Err(DomainError::InvariantViolation(_))
        ));
    }

    #[test]
    fn into_lesson_starts_at_version_one() {
        let id = LessonId::new();
        let lesson = math().into_lesson(id);
        assert_eq!(lesson.id, id);
        assert_eq!(lesson.version(), 1);
        assert_eq!(lesson.spaces, 5);
    }

    #[test]
    fn spaces_after_allows_reaching_zero() {
        let lesson = math().into_lesson(LessonId::new());
        assert_eq!(lesson.spaces_after(-5), Ok(0));
        assert_eq!(lesson.spaces_after(3), Ok(8));
        assert_eq!(lesson.spaces_after(0), Ok(5));
    }

    #[test]
    fn spaces_after_refuses_negative_result() {
        let lesson = math().into_lesson(LessonId::new());
        assert_eq!(
            lesson.spaces_after(-6),
            Err(SpacesRejection::Insufficient {
                available: 5,
                requested: 6
            })
        );
    }

    #[test]
    fn spaces_after_detects_overflow() {
        let lesson = math().into_lesson(LessonId::new());
        assert_eq!(lesson.spaces_after(i64::MAX), Err(SpacesRejection::Overflow));
    }

    #[test]
    fn version_is_not_serialized() {
        let lesson = math().into_lesson(LessonId::new());
        let json = serde_json::to_value(&lesson).unwrap();
        assert!(json.get("version").is_none());
        assert_eq!(json["subject"], "Math");
    }

    #[test]
    fn description_defaults_to_empty_in_seed_json() {
        let parsed: NewLesson = serde_json::from_str(
            r#"{"subject":"Art","location":"Studio","price":15,"spaces":3}"#,
        )
        .unwrap();
        assert_eq!(parsed.description, "");
        assert_eq!(parsed.price, 15.0);
    }
}
