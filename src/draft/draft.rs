use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// A mutable view over an immutable base value.
///
/// Reads go to the base until something writes through the draft; at that
/// point the base is cloned once and every later access uses the copy.
pub struct Draft<'a, T> {
    base: &'a Arc<T>,
    copy: Option<T>,
}

impl<'a, T: Clone> Draft<'a, T> {
    fn new(base: &'a Arc<T>) -> Self {
        Self { base, copy: None }
    }

    /// The value the draft was created from, ignoring any edits.
    pub fn original(&self) -> &T {
        &**self.base
    }

    /// Whether anything has been written through this draft.
    pub fn is_modified(&self) -> bool {
        self.copy.is_some()
    }

    /// Replace the whole value instead of editing it field by field.
    pub fn replace(&mut self, value: T) {
        self.copy = Some(value);
    }

    fn finish(self) -> Arc<T> {
        match self.copy {
            Some(value) => Arc::new(value),
            None => Arc::clone(self.base),
        }
    }
}

impl<T: Clone> Deref for Draft<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.copy.as_ref().unwrap_or(&**self.base)
    }
}

impl<T: Clone> DerefMut for Draft<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        let base = self.base;
        self.copy.get_or_insert_with(|| T::clone(base))
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Draft<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Draft")
            .field("value", &**self)
            .field("modified", &self.is_modified())
            .finish()
    }
}

/// Produce a new state from `base` by running `recipe` against a draft.
///
/// `base` is never modified. If the recipe returns an error nothing is
/// produced and the error is handed back unchanged. If the recipe never
/// writes, the returned `Arc` is `base` itself.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use draftstore::draft::produce;
///
/// let base = Arc::new(vec![1, 2, 3]);
/// let next = produce(&base, |draft| {
///     draft.push(4);
///     Ok::<(), std::convert::Infallible>(())
/// })
/// .unwrap();
///
/// assert_eq!(*base, vec![1, 2, 3]);
/// assert_eq!(*next, vec![1, 2, 3, 4]);
/// ```
pub fn produce<T, E, F>(base: &Arc<T>, recipe: F) -> Result<Arc<T>, E>
where
    T: Clone,
    F: FnOnce(&mut Draft<'_, T>) -> Result<(), E>,
{
    let mut draft = Draft::new(base);
    recipe(&mut draft)?;
    Ok(draft.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Profile {
        name: String,
        tags: Vec<String>,
    }

    fn profile() -> Arc<Profile> {
        Arc::new(Profile {
            name: "ada".to_string(),
            tags: vec!["math".to_string()],
        })
    }

    #[test]
    fn edits_leave_base_untouched() {
        let base = profile();
        let next = produce(&base, |draft| {
            draft.name = "grace".to_string();
            draft.tags.push("navy".to_string());
            Ok::<_, ()>(())
        })
        .unwrap();

        assert_eq!(base.name, "ada");
        assert_eq!(base.tags, vec!["math"]);
        assert_eq!(next.name, "grace");
        assert_eq!(next.tags, vec!["math", "navy"]);
    }

    #[test]
    fn read_only_recipe_shares_base() {
        let base = profile();
        let next = produce(&base, |draft| {
            assert_eq!(draft.name, "ada");
            assert!(!draft.is_modified());
            Ok::<_, ()>(())
        })
        .unwrap();

        assert!(Arc::ptr_eq(&base, &next));
    }

    #[test]
    fn failing_recipe_produces_nothing() {
        let base = profile();
        let result = produce(&base, |draft| {
            draft.name.clear();
            Err("rejected")
        });

        assert_eq!(result.unwrap_err(), "rejected");
        assert_eq!(base.name, "ada");
    }

    #[test]
    fn original_survives_edits() {
        let base = profile();
        produce(&base, |draft| {
            draft.name = "edited".to_string();
            assert_eq!(draft.original().name, "ada");
            assert_eq!(draft.name, "edited");
            assert!(draft.is_modified());
            Ok::<_, ()>(())
        })
        .unwrap();
    }

    #[test]
    fn replace_swaps_whole_value() {
        let base = Arc::new(7u32);
        let next = produce(&base, |draft| {
            draft.replace(11);
            Ok::<_, ()>(())
        })
        .unwrap();

        assert_eq!(*base, 7);
        assert_eq!(*next, 11);
    }
}
