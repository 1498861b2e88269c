//! # Channel Catalog
//!
//! The ordered set of channels a message can be tagged with. Position 0 is
//! always the distinguished "all" channel: it scopes nothing, carries no
//! color, and can never be the tag a message is actually sent under — the
//! composer forces a concrete pick before dispatch.
//!
//! Catalog order matters twice:
//! - tag badges are colored by catalog position
//! - channel inference breaks ties by taking the first catalog match

/// Name of the unscoped default channel. Always catalog position 0.
pub const ALL_CHANNEL: &str = "all";

/// A real (taggable) channel: a name plus a display color.
///
/// The color is kept as a string (`"cyan"`, `"#1c6ba7"`, ...) so the core
/// stays free of UI types; the TUI theme layer parses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub name: String,
    pub color: String,
}

/// Ordered catalog of real channels. "all" is implicit at position 0 and is
/// deliberately *not* stored — every stored entry has a color, which keeps
/// the "every real channel has a color" invariant structural.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelCatalog {
    channels: Vec<Channel>,
}

impl ChannelCatalog {
    pub fn new(channels: Vec<Channel>) -> Self {
        Self { channels }
    }

    /// Real channels in catalog order (excludes "all").
    pub fn real_channels(&self) -> &[Channel] {
        &self.channels
    }

    /// All selectable channel names in order: "all" first, then the catalog.
    pub fn names(&self) -> Vec<&str> {
        std::iter::once(ALL_CHANNEL)
            .chain(self.channels.iter().map(|c| c.name.as_str()))
            .collect()
    }

    pub fn is_real(&self, name: &str) -> bool {
        self.channels.iter().any(|c| c.name == name)
    }

    /// Display color for a tag, by catalog lookup. "all" and unknown tags
    /// have none.
    pub fn color_of(&self, name: &str) -> Option<&str> {
        self.channels
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.color.as_str())
    }

    /// The channel after `current` in display order, wrapping through "all".
    /// Used by the Tab cycle in the channel bar.
    pub fn next_after(&self, current: &str) -> String {
        let names = self.names();
        let idx = names.iter().position(|n| *n == current).unwrap_or(0);
        names[(idx + 1) % names.len()].to_string()
    }

    /// Infer a target channel from free composer text.
    ///
    /// A real channel (never "all", never the currently selected one) is
    /// inferred when its name occurs in `text` as a whole token: the text
    /// equals the name, starts with `"<name> "`, ends with `" <name>"`, or
    /// contains `" <name> "`. The first catalog entry that matches wins.
    ///
    /// Inference only ever *adds* a selection; previously inferred tags are
    /// not removed when the text changes again. That asymmetry is observable
    /// behavior the rest of the app relies on, so it stays.
    pub fn infer_from_text(&self, current: &str, text: &str) -> Option<&str> {
        self.channels
            .iter()
            .filter(|c| c.name != current)
            .find(|c| mentions_as_token(text, &c.name))
            .map(|c| c.name.as_str())
    }
}

/// Whole-token occurrence check used by channel inference.
fn mentions_as_token(text: &str, name: &str) -> bool {
    text == name
        || text.starts_with(&format!("{name} "))
        || text.ends_with(&format!(" {name}"))
        || text.contains(&format!(" {name} "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ChannelCatalog {
        ChannelCatalog::new(vec![
            Channel {
                name: "bugs".into(),
                color: "red".into(),
            },
            Channel {
                name: "general".into(),
                color: "cyan".into(),
            },
            Channel {
                name: "ideas".into(),
                color: "yellow".into(),
            },
        ])
    }

    #[test]
    fn all_is_not_a_real_channel() {
        let cat = catalog();
        assert!(!cat.is_real(ALL_CHANNEL));
        assert!(cat.is_real("bugs"));
        assert_eq!(cat.color_of(ALL_CHANNEL), None);
    }

    #[test]
    fn names_puts_all_first() {
        assert_eq!(catalog().names(), vec!["all", "bugs", "general", "ideas"]);
    }

    #[test]
    fn color_follows_catalog_position() {
        let cat = catalog();
        assert_eq!(cat.color_of("bugs"), Some("red"));
        assert_eq!(cat.color_of("ideas"), Some("yellow"));
        assert_eq!(cat.color_of("nope"), None);
    }

    #[test]
    fn next_after_cycles_through_all() {
        let cat = catalog();
        assert_eq!(cat.next_after("all"), "bugs");
        assert_eq!(cat.next_after("ideas"), "all");
        // Unknown current snaps back into the cycle
        assert_eq!(cat.next_after("gone"), "bugs");
    }

    #[test]
    fn infers_exact_match() {
        assert_eq!(catalog().infer_from_text("all", "bugs"), Some("bugs"));
    }

    #[test]
    fn infers_prefix_suffix_and_surrounded() {
        let cat = catalog();
        assert_eq!(cat.infer_from_text("all", "bugs everywhere"), Some("bugs"));
        assert_eq!(cat.infer_from_text("all", "so many bugs"), Some("bugs"));
        assert_eq!(
            cat.infer_from_text("all", "fix the bugs please"),
            Some("bugs")
        );
    }

    #[test]
    fn does_not_infer_substring_inside_word() {
        // "debugs" contains "bugs" but not as a whole token
        assert_eq!(catalog().infer_from_text("all", "debugs"), None);
        assert_eq!(catalog().infer_from_text("all", "ladybugs are nice"), None);
    }

    #[test]
    fn skips_currently_selected_channel() {
        let cat = catalog();
        // "bugs" is current, so only another channel can be inferred
        assert_eq!(cat.infer_from_text("bugs", "more bugs here"), None);
        assert_eq!(
            cat.infer_from_text("bugs", "move this to ideas please"),
            Some("ideas")
        );
    }

    #[test]
    fn first_catalog_match_wins_on_tie() {
        // Both "bugs" and "general" occur; catalog order decides
        assert_eq!(
            catalog().infer_from_text("all", "general bugs talk"),
            Some("bugs")
        );
    }

    #[test]
    fn empty_text_infers_nothing() {
        assert_eq!(catalog().infer_from_text("all", ""), None);
    }
}
