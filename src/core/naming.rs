//! Route segment naming from entity names
//!
//! Handles common English pluralization rules including irregular forms

/// A derived singular/plural route name pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteName {
    pub singular: String,
    pub plural: String,
}

/// Derives lowercase singular/plural route segments from an entity name
pub struct NameResolver;

impl NameResolver {
    /// Resolve both route segment forms for an entity name
    ///
    /// Case-normalized to lowercase; an empty name passes through unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use crudgen::core::naming::NameResolver;
    ///
    /// let name = NameResolver::resolve("Company");
    /// assert_eq!(name.singular, "company");
    /// assert_eq!(name.plural, "companies");
    /// ```
    pub fn resolve(name: &str) -> RouteName {
        let normalized = name.to_lowercase();
        // Input may already be plural; accept it when it round-trips
        let candidate = Self::singularize(&normalized);
        if Self::pluralize(&candidate) == normalized {
            RouteName {
                singular: candidate,
                plural: normalized,
            }
        } else {
            RouteName {
                plural: Self::pluralize(&normalized),
                singular: normalized,
            }
        }
    }

    /// Convert a singular noun to its plural form
    pub fn pluralize(singular: &str) -> String {
        if singular.is_empty() {
            return singular.to_string();
        }

        match singular {
            // Words ending in consonant + y -> ies
            s if s.ends_with("y")
                && !s.ends_with("ay")
                && !s.ends_with("ey")
                && !s.ends_with("iy")
                && !s.ends_with("oy")
                && !s.ends_with("uy")
                && s.len() > 1 =>
            {
                format!("{}ies", &s[..s.len() - 1])
            }

            // Words ending in s, ss, sh, ch, x, z -> es
            s if s.ends_with("s")
                || s.ends_with("sh")
                || s.ends_with("ch")
                || s.ends_with("x")
                || s.ends_with("z") =>
            {
                format!("{}es", s)
            }

            // Words ending in fe -> ves
            s if s.ends_with("fe") && s.len() > 2 => {
                format!("{}ves", &s[..s.len() - 2])
            }

            // Words ending in f -> ves
            s if s.ends_with("f") && s.len() > 1 => {
                format!("{}ves", &s[..s.len() - 1])
            }

            // Words ending in o after consonant -> es (photo, piano are exceptions)
            s if s.ends_with("o") && s.len() > 1 => {
                let before_o = s.chars().rev().nth(1).unwrap_or('o');
                if matches!(before_o, 'a' | 'e' | 'i' | 'o' | 'u') {
                    format!("{}s", s)
                } else {
                    match s {
                        "photo" | "piano" | "halo" => format!("{}s", s),
                        _ => format!("{}es", s),
                    }
                }
            }

            s => format!("{}s", s),
        }
    }

    /// Convert a plural noun to its singular form
    pub fn singularize(plural: &str) -> String {
        if plural.is_empty() {
            return plural.to_string();
        }

        match plural {
            // Words ending in ies -> y
            s if s.ends_with("ies") && s.len() > 3 => {
                format!("{}y", &s[..s.len() - 3])
            }

            // Words ending in ves -> f
            s if s.ends_with("ves") && s.len() > 3 => {
                format!("{}f", &s[..s.len() - 3])
            }

            // Words ending in ses, shes, ches, xes, zes -> remove es
            s if s.len() > 3
                && (s.ends_with("ses")
                    || s.ends_with("shes")
                    || s.ends_with("ches")
                    || s.ends_with("xes")
                    || s.ends_with("zes")) =>
            {
                s[..s.len() - 2].to_string()
            }

            // Words ending in oes -> o
            s if s.ends_with("oes") && s.len() > 3 => s[..s.len() - 2].to_string(),

            // Default: remove trailing s
            s if s.ends_with("s") && s.len() > 1 => s[..s.len() - 1].to_string(),

            // No plural form detected
            s => s.to_string(),
        }
    }
}
