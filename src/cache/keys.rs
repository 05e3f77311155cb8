//! Cache key definitions.
//!
//! Keys follow `<cacheName>::<arguments>` where multiple arguments are
//! concatenated in declaration order with no delimiter. Existing deployments
//! share the keyspace with other clients, so the format is kept as is even
//! though it is ambiguous: `("ab", "c")` and `("a", "bc")` map to the same
//! name+author key.

use std::fmt;

use globset::{GlobBuilder, GlobMatcher};

use super::error::{CacheError, CacheResult};

/// Logical caches the catalog reads through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheName {
    /// Single book by id.
    Book,
    /// Single book by name and author.
    BookByNameAndAuthor,
    /// Books of one category.
    Books,
}

impl CacheName {
    pub const ALL: [CacheName; 3] = [
        CacheName::Book,
        CacheName::BookByNameAndAuthor,
        CacheName::Books,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CacheName::Book => "book",
            CacheName::BookByNameAndAuthor => "bookByNameAndAuthor",
            CacheName::Books => "books",
        }
    }
}

impl fmt::Display for CacheName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    name: CacheName,
    key: String,
}

impl CacheKey {
    fn new(name: CacheName, args: &[&str]) -> Self {
        Self {
            name,
            key: format!("{}::{}", name.as_str(), args.concat()),
        }
    }

    pub fn book(id: i64) -> Self {
        Self::new(CacheName::Book, &[&id.to_string()])
    }

    pub fn book_by_name_and_author(name: &str, author: &str) -> Self {
        Self::new(CacheName::BookByNameAndAuthor, &[name, author])
    }

    pub fn books(category_name: &str) -> Self {
        Self::new(CacheName::Books, &[category_name])
    }

    pub fn name(&self) -> CacheName {
        self.name
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Pattern matching every entry of `name`.
    pub fn pattern_for(name: CacheName) -> String {
        format!("{}::*", name.as_str())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Compile a Redis-style key pattern (`*`, `?`, `[...]`, `\` escapes).
///
/// `*` also crosses `/`, as it does for Redis keys.
pub fn pattern_matcher(pattern: &str) -> CacheResult<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(false)
        .backslash_escape(true)
        .build()
        .map_err(|err| CacheError::InvalidPattern(format!("`{pattern}`: {err}")))?;
    Ok(glob.compile_matcher())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_cache_name_and_arguments() {
        assert_eq!(CacheKey::book(2).as_str(), "book::2");
        assert_eq!(
            CacheKey::book_by_name_and_author("some book", "some author").as_str(),
            "bookByNameAndAuthor::some booksome author"
        );
        assert_eq!(CacheKey::books("music").as_str(), "books::music");
    }

    #[test]
    fn name_and_author_keys_are_ambiguous() {
        assert_eq!(
            CacheKey::book_by_name_and_author("ab", "c"),
            CacheKey::book_by_name_and_author("a", "bc")
        );
    }

    fn matches(pattern: &str, key: &str) -> bool {
        pattern_matcher(pattern)
            .expect("pattern should compile")
            .is_match(key)
    }

    #[test]
    fn pattern_for_covers_whole_cache() {
        let pattern = CacheKey::pattern_for(CacheName::Books);
        assert!(matches(&pattern, CacheKey::books("sport").as_str()));
        assert!(!matches(&pattern, CacheKey::book(1).as_str()));
    }

    #[test]
    fn glob_matching() {
        assert!(matches("*", "anything"));
        assert!(matches("book::?", "book::7"));
        assert!(!matches("book::?", "book::17"));
        assert!(matches("book*::1*", "bookByNameAndAuthor::1984orwell"));
        assert!(matches("books::*", "books::sci/fi"));
        assert!(matches("a\\*b", "a*b"));
        assert!(!matches("a\\*b", "axb"));
        assert!(!matches("books::", "books::music"));
    }

    #[test]
    fn character_classes_follow_redis() {
        assert!(matches("book::[12]", "book::1"));
        assert!(matches("book::[12]", "book::2"));
        assert!(!matches("book::[12]", "book::3"));
        assert!(matches("book::[0-9]", "book::7"));
    }

    #[test]
    fn malformed_pattern_is_rejected() {
        let err = pattern_matcher("book::[").expect_err("unclosed class");
        assert!(matches!(err, CacheError::InvalidPattern(_)));
    }
}
