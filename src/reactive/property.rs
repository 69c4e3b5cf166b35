//! Typed property cells

/// Storage for a single view-model property.
///
/// A property starts out unset and is created by its first write. Reads never
/// fail: callers pick the fallback they want when nothing was written yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Property<T> {
    value: Option<T>,
}

impl<T> Default for Property<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> Property<T> {
    /// Create an unset property
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a property that already holds `value`
    pub fn with_value(value: T) -> Self {
        Self { value: Some(value) }
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    /// Whether the property has been written at least once
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    pub fn get_or(&self, default: T) -> T
    where
        T: Clone,
    {
        self.value.clone().unwrap_or(default)
    }

    pub fn get_or_default(&self) -> T
    where
        T: Clone + Default,
    {
        self.value.clone().unwrap_or_default()
    }

    /// Store `value`, returning `false` when an equal value was already present.
    pub(crate) fn replace(&mut self, value: T) -> bool
    where
        T: PartialEq,
    {
        if self.value.as_ref() == Some(&value) {
            return false;
        }
        self.value = Some(value);
        true
    }

    /// Mutable access to the stored value, creating it from `T::default()` if unset.
    pub(crate) fn get_or_insert_default(&mut self) -> &mut T
    where
        T: Default,
    {
        self.value.get_or_insert_with(T::default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_property_reads_fallback() {
        let prop: Property<String> = Property::new();
        assert!(!prop.is_set());
        assert_eq!(prop.get(), None);
        assert_eq!(prop.get_or("fallback".to_string()), "fallback");
        assert_eq!(prop.get_or_default(), "");
    }

    #[test]
    fn test_replace_suppresses_equal_values() {
        let mut prop = Property::new();
        assert!(prop.replace(3));
        assert!(!prop.replace(3));
        assert!(prop.replace(4));
        assert_eq!(prop.get(), Some(&4));
    }

    #[test]
    fn test_first_write_of_default_counts_as_change() {
        let mut prop: Property<bool> = Property::new();
        assert!(prop.replace(false));
        assert!(prop.is_set());
    }

    #[test]
    fn test_both_null_is_equal() {
        let mut prop: Property<Option<String>> = Property::with_value(None);
        assert!(!prop.replace(None));
        assert!(prop.replace(Some("x".to_string())));
        assert!(prop.replace(None));
    }

    #[test]
    fn test_get_or_insert_default() {
        let mut prop: Property<Vec<u8>> = Property::new();
        prop.get_or_insert_default().push(1);
        assert_eq!(prop.get(), Some(&vec![1]));
    }
}
