use std::fmt;

use analyse_search::{convert_extended, SearchMode, SearchOptions};

use crate::color::Color;

/// Whether a hit highlights the matched text or the whole line it sits on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SelectionScope {
    #[default]
    Text,
    Line,
}

impl SelectionScope {
    pub fn as_str(self) -> &'static str {
        match self {
            SelectionScope::Text => "text",
            SelectionScope::Line => "line",
        }
    }

    /// Unknown names resolve to [`SelectionScope::Text`].
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("line") {
            SelectionScope::Line
        } else {
            SelectionScope::Text
        }
    }
}

impl fmt::Display for SelectionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured search rule together with the way its hits are displayed.
///
/// `PartialEq` compares every attribute; [`Pattern::is_search_equal`] only the
/// ones that influence what a search finds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    order_label: String,
    enabled: bool,
    search_text: String,
    replace_text: String,
    search_mode: SearchMode,
    whole_word: bool,
    match_case: bool,
    bold: bool,
    italic: bool,
    underlined: bool,
    color: Color,
    bg_color: Color,
    hide_text: bool,
    do_replace: bool,
    selection: SelectionScope,
    comment: String,
    group: String,
}

impl Default for Pattern {
    fn default() -> Self {
        Self {
            order_label: String::new(),
            enabled: true,
            search_text: String::new(),
            replace_text: String::new(),
            search_mode: SearchMode::Normal,
            whole_word: false,
            match_case: false,
            bold: false,
            italic: false,
            underlined: false,
            color: Color::BLACK,
            bg_color: Color::WHITE,
            hide_text: false,
            do_replace: false,
            selection: SelectionScope::Text,
            comment: String::new(),
            group: String::new(),
        }
    }
}

impl Pattern {
    /// Creates an enabled pattern searching `text` literally.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            search_text: text.into(),
            ..Self::default()
        }
    }

    /// True when both patterns would produce the same hits, ignoring styling,
    /// comment and group.
    pub fn is_search_equal(&self, other: &Pattern) -> bool {
        self.order_label == other.order_label
            && self.enabled == other.enabled
            && self.search_text == other.search_text
            && self.search_mode == other.search_mode
            && self.whole_word == other.whole_word
            && self.match_case == other.match_case
            && self.do_replace == other.do_replace
    }

    /// Text handed to the search engine. Extended mode decodes escapes.
    pub fn search_text_converted(&self) -> String {
        match self.search_mode {
            SearchMode::Escaped => convert_extended(&self.search_text),
            _ => self.search_text.clone(),
        }
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            pattern: self.search_text.clone(),
            mode: self.search_mode,
            case_sensitive: self.match_case,
            whole_word: self.whole_word,
        }
    }

    pub fn order_label(&self) -> &str {
        &self.order_label
    }

    pub fn set_order_label(&mut self, label: impl Into<String>) {
        self.order_label = label.into();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    pub fn replace_text(&self) -> &str {
        &self.replace_text
    }

    pub fn set_replace_text(&mut self, text: impl Into<String>) {
        self.replace_text = text.into();
    }

    pub fn search_mode(&self) -> SearchMode {
        self.search_mode
    }

    pub fn set_search_mode(&mut self, mode: SearchMode) {
        self.search_mode = mode;
    }

    pub fn set_search_mode_str(&mut self, value: &str) {
        self.search_mode = SearchMode::parse(value);
    }

    pub fn is_whole_word(&self) -> bool {
        self.whole_word
    }

    pub fn set_whole_word(&mut self, whole_word: bool) {
        self.whole_word = whole_word;
    }

    pub fn is_match_case(&self) -> bool {
        self.match_case
    }

    pub fn set_match_case(&mut self, match_case: bool) {
        self.match_case = match_case;
    }

    pub fn is_bold(&self) -> bool {
        self.bold
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.bold = bold;
    }

    pub fn is_italic(&self) -> bool {
        self.italic
    }

    pub fn set_italic(&mut self, italic: bool) {
        self.italic = italic;
    }

    pub fn is_underlined(&self) -> bool {
        self.underlined
    }

    pub fn set_underlined(&mut self, underlined: bool) {
        self.underlined = underlined;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_color_str(&mut self, value: &str) {
        self.color = Color::parse_lenient(value, Color::BLACK);
    }

    pub fn bg_color(&self) -> Color {
        self.bg_color
    }

    pub fn set_bg_color(&mut self, color: Color) {
        self.bg_color = color;
    }

    pub fn set_bg_color_str(&mut self, value: &str) {
        self.bg_color = Color::parse_lenient(value, Color::WHITE);
    }

    pub fn is_hide_text(&self) -> bool {
        self.hide_text
    }

    pub fn set_hide_text(&mut self, hide: bool) {
        self.hide_text = hide;
    }

    pub fn is_replace_enabled(&self) -> bool {
        self.do_replace
    }

    pub fn set_replace_enabled(&mut self, enabled: bool) {
        self.do_replace = enabled;
    }

    pub fn selection(&self) -> SelectionScope {
        self.selection
    }

    pub fn set_selection(&mut self, scope: SelectionScope) {
        self.selection = scope;
    }

    pub fn set_selection_str(&mut self, value: &str) {
        self.selection = SelectionScope::parse(value);
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn set_group(&mut self, group: impl Into<String>) {
        self.group = group.into();
    }
}

/// String form of a flag as stored in configuration files.
pub fn bool_str(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

/// Accepts `1`, `true` and `yes`; everything else is false.
pub fn parse_bool(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed == "1" || trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("yes")
}
