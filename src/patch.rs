//! Changed-field tracking shared by every update.

/// Names of the fields an update actually changed.
///
/// A field is only recorded when a value was submitted and differs from the
/// stored one; the new value is written into the record at the same time.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Patch {
    fields: Vec<&'static str>,
}

impl Patch {
    /// Create an empty [`Patch`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `submitted` with `current`, apply and record it if it differs.
    ///
    /// Returns whether the field changed.
    pub fn set<T: PartialEq>(
        &mut self,
        field: &'static str,
        current: &mut T,
        submitted: Option<T>,
    ) -> bool {
        match submitted {
            Some(value) if *current != value => {
                *current = value;
                if !self.fields.contains(&field) {
                    self.fields.push(field);
                }
                true
            },
            _ => false,
        }
    }

    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether `field` changed.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| *f == field)
    }

    /// Changed fields, in submission order.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().copied()
    }
}

/// Result of an update service call.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// At least one field changed and was persisted.
    Updated(T),
    /// Submitted values equal the stored ones; nothing was written.
    Unmodified(T),
}

impl<T> Outcome<T> {
    /// Stored record after the call.
    pub fn into_inner(self) -> T {
        match self {
            Outcome::Updated(value) | Outcome::Unmodified(value) => value,
        }
    }

    /// Whether the call wrote anything.
    pub fn is_modified(&self) -> bool {
        matches!(self, Outcome::Updated(_))
    }

    /// Convert the record, keeping the outcome.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Updated(value) => Outcome::Updated(f(value)),
            Outcome::Unmodified(value) => Outcome::Unmodified(f(value)),
        }
    }
}

/// Turn empty strings into `None` so they clear optional fields.
pub fn blank_to_none(value: String) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_differences_are_recorded() {
        let mut title = String::from("algorithms");
        let mut capacity = 4;
        let mut phone: Option<String> = None;

        let mut patch = Patch::new();
        assert!(!patch.set("title", &mut title, Some("algorithms".into())));
        assert!(patch.set("capacity", &mut capacity, Some(6)));
        assert!(!patch.set("phone_number", &mut phone, None));

        assert_eq!(patch.fields().collect::<Vec<_>>(), vec!["capacity"]);
        assert!(patch.contains("capacity"));
        assert!(!patch.contains("title"));
        assert_eq!(capacity, 6);
    }

    #[test]
    fn test_optional_field_can_be_cleared() {
        let mut phone = Some("010-0000-0000".to_string());
        let mut patch = Patch::new();

        assert!(patch.set("phone_number", &mut phone, Some(blank_to_none(" ".into()))));
        assert_eq!(phone, None);
    }

    #[test]
    fn test_field_recorded_once() {
        let mut value = 1;
        let mut patch = Patch::new();
        patch.set("value", &mut value, Some(2));
        patch.set("value", &mut value, Some(3));

        assert_eq!(patch.fields().count(), 1);
        assert_eq!(value, 3);
    }

    #[test]
    fn test_outcome() {
        assert!(Outcome::Updated(1).is_modified());
        assert!(!Outcome::Unmodified(1).is_modified());
        assert_eq!(Outcome::Unmodified(7).into_inner(), 7);
        assert_eq!(Outcome::Updated(2).map(|v| v * 10), Outcome::Updated(20));
    }
}
