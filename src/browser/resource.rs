use chromiumoxide::cdp::browser_protocol::network::ResourceType;
use rustc_hash::FxHashSet;
use std::fmt;
use std::str::FromStr;

use crate::core::constants::resources;
use crate::core::error::LinkScoutError;

/// Category of an intercepted request, assigned when the request is paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    Document,
    Script,
    Xhr,
    Fetch,
    Stylesheet,
    Font,
    Media,
    Image,
    Other,
}

impl ResourceClass {
    pub const ALL: [ResourceClass; 9] = [
        ResourceClass::Document,
        ResourceClass::Script,
        ResourceClass::Xhr,
        ResourceClass::Fetch,
        ResourceClass::Stylesheet,
        ResourceClass::Font,
        ResourceClass::Media,
        ResourceClass::Image,
        ResourceClass::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceClass::Document => "document",
            ResourceClass::Script => "script",
            ResourceClass::Xhr => "xhr",
            ResourceClass::Fetch => "fetch",
            ResourceClass::Stylesheet => "stylesheet",
            ResourceClass::Font => "font",
            ResourceClass::Media => "media",
            ResourceClass::Image => "image",
            ResourceClass::Other => "other",
        }
    }
}

impl From<&ResourceType> for ResourceClass {
    fn from(kind: &ResourceType) -> Self {
        match kind {
            ResourceType::Document => ResourceClass::Document,
            ResourceType::Script => ResourceClass::Script,
            ResourceType::Xhr => ResourceClass::Xhr,
            ResourceType::Fetch => ResourceClass::Fetch,
            ResourceType::Stylesheet => ResourceClass::Stylesheet,
            ResourceType::Font => ResourceClass::Font,
            ResourceType::Media => ResourceClass::Media,
            ResourceType::Image => ResourceClass::Image,
            _ => ResourceClass::Other,
        }
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceClass {
    type Err = LinkScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        ResourceClass::ALL
            .into_iter()
            .find(|class| class.as_str() == name)
            .ok_or_else(|| {
                LinkScoutError::InvalidArgument(format!(
                    "Unknown resource type '{s}'. Expected one of: {}.",
                    ResourceClass::ALL.map(|c| c.as_str()).join(", ")
                ))
            })
    }
}

/// Resource classes that are failed at request time instead of fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPolicy {
    blocked: FxHashSet<ResourceClass>,
}

impl Default for BlockPolicy {
    fn default() -> Self {
        Self {
            blocked: [
                ResourceClass::Font,
                ResourceClass::Media,
                ResourceClass::Image,
            ]
            .into_iter()
            .collect(),
        }
    }
}

impl BlockPolicy {
    pub fn new(blocked: impl IntoIterator<Item = ResourceClass>) -> Self {
        Self {
            blocked: blocked.into_iter().collect(),
        }
    }

    /// Parse names such as `font`, `media`, `image`.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, LinkScoutError> {
        names
            .iter()
            .map(|name| name.as_ref().parse::<ResourceClass>())
            .collect::<Result<FxHashSet<_>, _>>()
            .map(|blocked| Self { blocked })
    }

    pub fn default_names() -> Vec<String> {
        resources::DEFAULT_BLOCKED
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn is_blocked(&self, class: ResourceClass) -> bool {
        self.blocked.contains(&class)
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn test_from_cdp_resource_type() {
        assert_eq!(
            ResourceClass::from(&ResourceType::Script),
            ResourceClass::Script
        );
        assert_eq!(ResourceClass::from(&ResourceType::Xhr), ResourceClass::Xhr);
        assert_eq!(
            ResourceClass::from(&ResourceType::Image),
            ResourceClass::Image
        );
        assert_eq!(
            ResourceClass::from(&ResourceType::WebSocket),
            ResourceClass::Other
        );
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("font".parse::<ResourceClass>().unwrap(), ResourceClass::Font);
        assert_eq!(
            " Image ".parse::<ResourceClass>().unwrap(),
            ResourceClass::Image
        );
        assert!("video".parse::<ResourceClass>().is_err());
    }

    #[test]
    fn test_display_round_trips_names() {
        for class in ResourceClass::ALL {
            assert_eq!(class.to_string().parse::<ResourceClass>().unwrap(), class);
        }
    }

    #[test]
    fn test_block_policy__default() {
        let policy = BlockPolicy::default();

        assert!(policy.is_blocked(ResourceClass::Font));
        assert!(policy.is_blocked(ResourceClass::Media));
        assert!(policy.is_blocked(ResourceClass::Image));
        assert!(!policy.is_blocked(ResourceClass::Script));
        assert!(!policy.is_blocked(ResourceClass::Document));
        assert!(!policy.is_blocked(ResourceClass::Xhr));
    }

    #[test]
    fn test_block_policy__default_names_match_default() {
        let policy = BlockPolicy::from_names(&BlockPolicy::default_names()).unwrap();
        assert_eq!(policy, BlockPolicy::default());
    }

    #[test]
    fn test_block_policy__from_names_rejects_unknown() {
        let result = BlockPolicy::from_names(&["font", "sound"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_block_policy__empty_blocks_nothing() {
        let policy = BlockPolicy::new([]);
        for class in ResourceClass::ALL {
            assert!(!policy.is_blocked(class));
        }
    }
}
