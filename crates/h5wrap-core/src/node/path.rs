//! Slash-separated object paths inside a file.
//!
//! Parsing normalises the text: repeated and trailing slashes and `.`
//! components are dropped. `..` is kept as an ordinary component; the
//! native library resolves it.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    absolute: bool,
    components: Vec<String>,
}

impl Path {
    /// `/`
    pub fn root() -> Self {
        Self {
            absolute: true,
            components: Vec::new(),
        }
    }

    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    pub fn is_root(&self) -> bool {
        self.absolute && self.components.is_empty()
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(String::as_str)
    }

    /// Last component; empty for the root and for `.`.
    pub fn name(&self) -> &str {
        self.components.last().map_or("", String::as_str)
    }

    /// Everything but the last component. The root is its own parent.
    pub fn parent(&self) -> Path {
        let mut parent = self.clone();
        parent.components.pop();
        parent
    }

    /// `other` relative to `self`; an absolute `other` wins.
    pub fn join(&self, other: &Path) -> Path {
        if other.absolute {
            return other.clone();
        }
        let mut joined = self.clone();
        joined.components.extend(other.components.iter().cloned());
        joined
    }
}

impl FromStr for Path {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Infallible> {
        Ok(Path::from(s))
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Self {
            absolute: s.starts_with('/'),
            components: s
                .split('/')
                .filter(|c| !c.is_empty() && *c != ".")
                .map(str::to_string)
                .collect(),
        }
    }
}

impl From<String> for Path {
    fn from(s: String) -> Self {
        Path::from(s.as_str())
    }
}

impl From<&Path> for Path {
    fn from(p: &Path) -> Self {
        p.clone()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            f.write_str("/")?;
        } else if self.components.is_empty() {
            return f.write_str(".");
        }
        f.write_str(&self.components.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalisation() {
        assert_eq!(Path::from("//a///b/./c/").to_string(), "/a/b/c");
        assert_eq!(Path::from("a/b/").to_string(), "a/b");
        assert_eq!(Path::from("").to_string(), ".");
        assert_eq!(Path::from("./").to_string(), ".");
        assert_eq!(Path::from("/").to_string(), "/");
        assert_eq!(Path::from("a/../b").len(), 3);
    }

    #[test]
    fn test_name_and_parent() {
        let p = Path::from("/data/run1/events");
        assert_eq!(p.name(), "events");
        assert_eq!(p.parent().to_string(), "/data/run1");
        assert!(Path::root().parent().is_root());
        assert_eq!(Path::root().name(), "");
        assert_eq!(Path::from("x").parent().to_string(), ".");
    }

    #[test]
    fn test_join() {
        let base = Path::from("/data");
        assert_eq!(base.join(&Path::from("run1/events")).to_string(), "/data/run1/events");
        assert_eq!(base.join(&Path::from("/other")).to_string(), "/other");
        assert_eq!(Path::from("rel").join(&Path::from("x")).to_string(), "rel/x");
    }

    #[test]
    fn test_parse_equals_from() {
        let parsed: Path = "/a/b".parse().unwrap();
        assert_eq!(parsed, Path::from("/a//b/"));
        assert!(parsed.is_absolute());
        assert_ne!(parsed, Path::from("a/b"));
    }
}
