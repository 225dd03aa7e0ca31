use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A Java identifier.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Name(SmolStr);

impl Name {
    #[inline]
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(SmolStr::new(text))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::new(value)
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// A dotted name (`java.util.Map.Entry`), stored segment by segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct QualifiedName {
    segments: Vec<Name>,
}

impl QualifiedName {
    pub fn from_dotted(dotted: &str) -> Self {
        let segments = dotted
            .split('.')
            .filter(|segment| !segment.is_empty())
            .map(Name::from)
            .collect();
        Self { segments }
    }

    pub fn from_segments(segments: impl IntoIterator<Item = Name>) -> Self {
        Self {
            segments: segments.into_iter().collect(),
        }
    }

    pub fn segments(&self) -> &[Name] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&Name> {
        self.segments.last()
    }

    pub fn push(&mut self, name: Name) {
        self.segments.push(name);
    }

    pub fn to_dotted(&self) -> String {
        let mut out = String::new();
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                out.push('.');
            }
            out.push_str(segment.as_str());
        }
        out
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dotted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_roundtrip_skips_empty_segments() {
        let name = QualifiedName::from_dotted("java..util.Map");
        assert_eq!(name.segments().len(), 3);
        assert_eq!(name.to_dotted(), "java.util.Map");
        assert_eq!(name.last().map(Name::as_str), Some("Map"));
    }
}
