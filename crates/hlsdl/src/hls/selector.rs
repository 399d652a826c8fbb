// Rendition selection: pure functions over the ordered variant list.

use tracing::{debug, info};

use super::config::VariantSelectionPolicy;
use super::error::SelectionError;
use super::parser::Variant;

/// Picks one variant of a master playlist, returning its zero-based position.
///
/// Implemented by [`VariantSelectionPolicy`] for unattended runs; front-ends plug
/// in their own chooser to ask the user.
pub trait VariantChooser {
    fn choose(&mut self, variants: &[Variant]) -> Result<usize, SelectionError>;
}

impl VariantChooser for VariantSelectionPolicy {
    fn choose(&mut self, variants: &[Variant]) -> Result<usize, SelectionError> {
        select_variant(variants, self)
    }
}

/// Applies an automatic selection policy.
pub fn select_variant(
    variants: &[Variant],
    policy: &VariantSelectionPolicy,
) -> Result<usize, SelectionError> {
    if variants.is_empty() {
        return Err(SelectionError::NoVariants);
    }

    let index = match policy {
        VariantSelectionPolicy::TargetResolution(target) => {
            match variants
                .iter()
                .position(|v| v.resolution.as_deref() == Some(target.as_str()))
            {
                Some(index) => index,
                None => {
                    info!(
                        target = %target,
                        fallback = variants[0].resolution_label(),
                        "No variant matches target resolution, using first variant"
                    );
                    0
                }
            }
        }
        VariantSelectionPolicy::First => 0,
        VariantSelectionPolicy::Index(index) => {
            if *index >= variants.len() {
                return Err(SelectionError::OutOfRange {
                    choice: *index as i64 + 1,
                    count: variants.len(),
                });
            }
            *index
        }
    };

    debug!(
        index,
        resolution = variants[index].resolution_label(),
        url = %variants[index].playlist_url,
        "Selected variant"
    );
    Ok(index)
}

/// Validates a 1-based choice typed by the user and returns the zero-based index.
pub fn validate_choice(input: &str, count: usize) -> Result<usize, SelectionError> {
    if count == 0 {
        return Err(SelectionError::NoVariants);
    }
    let trimmed = input.trim();
    let choice: i64 = trimmed
        .parse()
        .map_err(|_| SelectionError::NotANumber(trimmed.to_string()))?;
    if choice < 1 || choice as u64 > count as u64 {
        return Err(SelectionError::OutOfRange { choice, count });
    }
    Ok(choice as usize - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn variants() -> Vec<Variant> {
        [("1920x1080", "a"), ("1280x720", "b"), ("640x360", "c")]
            .into_iter()
            .map(|(res, name)| Variant {
                resolution: Some(res.to_string()),
                playlist_url: Url::parse(&format!("https://example.com/{name}.m3u8")).unwrap(),
            })
            .collect()
    }

    #[test]
    fn test_target_resolution_exact_match() {
        let variants = variants();
        let policy = VariantSelectionPolicy::TargetResolution("1280x720".into());
        let index = select_variant(&variants, &policy).unwrap();
        assert_eq!(variants[index].playlist_url.as_str(), "https://example.com/b.m3u8");
    }

    #[test]
    fn test_missing_resolution_falls_back_to_first() {
        let variants = variants();
        let policy = VariantSelectionPolicy::TargetResolution("3840x2160".into());
        assert_eq!(select_variant(&variants, &policy).unwrap(), 0);
    }

    #[test]
    fn test_resolution_match_is_literal() {
        let variants = variants();
        let policy = VariantSelectionPolicy::TargetResolution("1280X720".into());
        assert_eq!(select_variant(&variants, &policy).unwrap(), 0);
    }

    #[test]
    fn test_index_policy() {
        let variants = variants();
        let mut policy = VariantSelectionPolicy::Index(2);
        assert_eq!(policy.choose(&variants).unwrap(), 2);

        let mut policy = VariantSelectionPolicy::Index(3);
        assert_eq!(
            policy.choose(&variants).unwrap_err(),
            SelectionError::OutOfRange { choice: 4, count: 3 }
        );
    }

    #[test]
    fn test_empty_variant_list() {
        assert_eq!(
            select_variant(&[], &VariantSelectionPolicy::First).unwrap_err(),
            SelectionError::NoVariants
        );
    }

    #[test]
    fn test_validate_choice() {
        assert_eq!(validate_choice("1", 3).unwrap(), 0);
        assert_eq!(validate_choice(" 3\n", 3).unwrap(), 2);
        assert_eq!(
            validate_choice("0", 3).unwrap_err(),
            SelectionError::OutOfRange { choice: 0, count: 3 }
        );
        assert_eq!(
            validate_choice("4", 3).unwrap_err(),
            SelectionError::OutOfRange { choice: 4, count: 3 }
        );
        assert_eq!(
            validate_choice("-2", 3).unwrap_err(),
            SelectionError::OutOfRange { choice: -2, count: 3 }
        );
        assert_eq!(
            validate_choice("abc", 3).unwrap_err(),
            SelectionError::NotANumber("abc".into())
        );
    }
}
