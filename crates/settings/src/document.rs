//! XML representation of a pattern configuration.
//!
//! One `<Pattern>` element per pattern, in display order, every setting stored
//! as an attribute. Attributes missing from older files take their defaults;
//! malformed values are normalised by the pattern setters.

use analyse_core::{bool_str, parse_bool, Pattern, PatternList, ResultList};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Version written into new documents.
pub const DOCUMENT_VERSION: &str = "2";

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Parses a configuration document into patterns, preserving order.
pub fn parse_config(xml: &str) -> Result<Vec<Pattern>, ConfigError> {
    let doc: AnalyseDoc = quick_xml::de::from_str(xml)?;
    if let Some(version) = doc.version.as_deref() {
        if version != DOCUMENT_VERSION {
            log::info!("reading config document version {version}");
        }
    }
    Ok(doc.patterns.into_iter().map(PatternEntry::into_pattern).collect())
}

/// Renders a pattern list. When `hits` is given every pattern carries its hit
/// count, which is how analysis exports are written.
pub fn render_config(
    patterns: &PatternList,
    hits: Option<&ResultList>,
) -> Result<String, ConfigError> {
    let doc = AnalyseDoc {
        version: Some(DOCUMENT_VERSION.to_string()),
        patterns: patterns
            .iter()
            .map(|(id, pattern)| {
                let count = hits.map(|results| results.get(id).map_or(0, |r| r.hit_count()));
                PatternEntry::from_pattern(pattern, count)
            })
            .collect(),
    };

    let mut body = String::new();
    let mut serializer = quick_xml::se::Serializer::new(&mut body);
    serializer.indent(' ', 2);
    doc.serialize(serializer).map_err(ConfigError::Encode)?;

    let mut xml = String::with_capacity(XML_DECLARATION.len() + body.len() + 1);
    xml.push_str(XML_DECLARATION);
    xml.push_str(&body);
    xml.push('\n');
    Ok(xml)
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "AnalyseDoc")]
struct AnalyseDoc {
    #[serde(rename = "@version", default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(rename = "Pattern", default)]
    patterns: Vec<PatternEntry>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PatternEntry {
    #[serde(rename = "@order", default, skip_serializing_if = "Option::is_none")]
    order: Option<String>,
    #[serde(rename = "@doSearch", default, skip_serializing_if = "Option::is_none")]
    do_search: Option<String>,
    #[serde(rename = "@searchText", default, skip_serializing_if = "Option::is_none")]
    search_text: Option<String>,
    #[serde(rename = "@searchType", default, skip_serializing_if = "Option::is_none")]
    search_type: Option<String>,
    #[serde(rename = "@matchCase", default, skip_serializing_if = "Option::is_none")]
    match_case: Option<String>,
    #[serde(rename = "@wholeWord", default, skip_serializing_if = "Option::is_none")]
    whole_word: Option<String>,
    #[serde(rename = "@select", default, skip_serializing_if = "Option::is_none")]
    select: Option<String>,
    #[serde(rename = "@hide", default, skip_serializing_if = "Option::is_none")]
    hide: Option<String>,
    #[serde(rename = "@bold", default, skip_serializing_if = "Option::is_none")]
    bold: Option<String>,
    #[serde(rename = "@italic", default, skip_serializing_if = "Option::is_none")]
    italic: Option<String>,
    #[serde(rename = "@underlined", default, skip_serializing_if = "Option::is_none")]
    underlined: Option<String>,
    #[serde(rename = "@color", default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(rename = "@bgColor", default, skip_serializing_if = "Option::is_none")]
    bg_color: Option<String>,
    #[serde(rename = "@doReplace", default, skip_serializing_if = "Option::is_none")]
    do_replace: Option<String>,
    #[serde(rename = "@replaceText", default, skip_serializing_if = "Option::is_none")]
    replace_text: Option<String>,
    #[serde(rename = "@group", default, skip_serializing_if = "Option::is_none")]
    group: Option<String>,
    #[serde(rename = "@comment", default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
    #[serde(rename = "@hits", default, skip_serializing_if = "Option::is_none")]
    hits: Option<usize>,
}

impl PatternEntry {
    fn from_pattern(pattern: &Pattern, hits: Option<usize>) -> Self {
        Self {
            order: Some(pattern.order_label().to_string()),
            do_search: Some(bool_str(pattern.is_enabled()).to_string()),
            search_text: Some(pattern.search_text().to_string()),
            search_type: Some(pattern.search_mode().as_str().to_string()),
            match_case: Some(bool_str(pattern.is_match_case()).to_string()),
            whole_word: Some(bool_str(pattern.is_whole_word()).to_string()),
            select: Some(pattern.selection().as_str().to_string()),
            hide: Some(bool_str(pattern.is_hide_text()).to_string()),
            bold: Some(bool_str(pattern.is_bold()).to_string()),
            italic: Some(bool_str(pattern.is_italic()).to_string()),
            underlined: Some(bool_str(pattern.is_underlined()).to_string()),
            color: Some(pattern.color().to_string()),
            bg_color: Some(pattern.bg_color().to_string()),
            do_replace: Some(bool_str(pattern.is_replace_enabled()).to_string()),
            replace_text: Some(pattern.replace_text().to_string()),
            group: Some(pattern.group().to_string()),
            comment: Some(pattern.comment().to_string()),
            hits,
        }
    }

    fn into_pattern(self) -> Pattern {
        let mut pattern = Pattern::default();
        if let Some(order) = self.order {
            pattern.set_order_label(order);
        }
        if let Some(value) = self.do_search {
            pattern.set_enabled(parse_bool(&value));
        }
        if let Some(text) = self.search_text {
            pattern.set_search_text(text);
        }
        if let Some(value) = self.search_type {
            pattern.set_search_mode_str(&value);
        }
        if let Some(value) = self.match_case {
            pattern.set_match_case(parse_bool(&value));
        }
        if let Some(value) = self.whole_word {
            pattern.set_whole_word(parse_bool(&value));
        }
        if let Some(value) = self.select {
            pattern.set_selection_str(&value);
        }
        if let Some(value) = self.hide {
            pattern.set_hide_text(parse_bool(&value));
        }
        if let Some(value) = self.bold {
            pattern.set_bold(parse_bool(&value));
        }
        if let Some(value) = self.italic {
            pattern.set_italic(parse_bool(&value));
        }
        if let Some(value) = self.underlined {
            pattern.set_underlined(parse_bool(&value));
        }
        if let Some(value) = self.color {
            pattern.set_color_str(&value);
        }
        if let Some(value) = self.bg_color {
            pattern.set_bg_color_str(&value);
        }
        if let Some(value) = self.do_replace {
            pattern.set_replace_enabled(parse_bool(&value));
        }
        if let Some(text) = self.replace_text {
            pattern.set_replace_text(text);
        }
        if let Some(group) = self.group {
            pattern.set_group(group);
        }
        if let Some(comment) = self.comment {
            pattern.set_comment(comment);
        }
        pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyse_core::{Color, PatternResult, SearchMode, SelectionScope};

    #[test]
    fn missing_attributes_take_defaults() {
        let xml = r#"<AnalyseDoc><Pattern searchText="timeout"/></AnalyseDoc>"#;
        let patterns = parse_config(xml).unwrap();
        assert_eq!(patterns, vec![Pattern::new("timeout")]);
        assert!(patterns[0].is_enabled());
        assert_eq!(patterns[0].bg_color(), Color::WHITE);
    }

    #[test]
    fn malformed_values_are_normalised() {
        let xml = r##"<?xml version="1.0" encoding="UTF-8"?>
<AnalyseDoc version="1">
  <Pattern searchText="a" searchType="wildcard" select="block" color="nope" doSearch="0" matchCase="yes"/>
  <Pattern searchText="b" searchType="rgx_multiline" select="line" color="#00ff00"/>
</AnalyseDoc>"##;
        let patterns = parse_config(xml).unwrap();
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].search_mode(), SearchMode::Normal);
        assert_eq!(patterns[0].selection(), SelectionScope::Text);
        assert_eq!(patterns[0].color(), Color::BLACK);
        assert!(!patterns[0].is_enabled());
        assert!(patterns[0].is_match_case());
        assert_eq!(patterns[1].search_mode(), SearchMode::RegexMultiline);
        assert_eq!(patterns[1].selection(), SelectionScope::Line);
        assert_eq!(patterns[1].color(), Color::rgb(0, 0xff, 0));
    }

    #[test]
    fn render_then_parse_preserves_every_attribute() {
        let mut pattern = Pattern::new("a \"quoted\" <tag> & more");
        pattern.set_order_label("07");
        pattern.set_search_mode(SearchMode::Escaped);
        pattern.set_whole_word(true);
        pattern.set_italic(true);
        pattern.set_color(Color::rgb(0x12, 0x34, 0x56));
        pattern.set_bg_color(Color::rgb(0xff, 0xa5, 0x00));
        pattern.set_replace_enabled(true);
        pattern.set_replace_text("x");
        pattern.set_group("g");
        pattern.set_comment("c");
        let list: PatternList = [pattern, Pattern::new("second")].into_iter().collect();

        let xml = render_config(&list, None).unwrap();
        assert!(xml.starts_with(XML_DECLARATION));
        assert!(!xml.contains("hits="));
        let parsed = parse_config(&xml).unwrap();
        let original: Vec<Pattern> = list.patterns().cloned().collect();
        assert_eq!(parsed, original);
    }

    #[test]
    fn export_writes_hit_counts() {
        let list: PatternList = [Pattern::new("a"), Pattern::new("b")].into_iter().collect();
        let mut results = ResultList::new();
        results.insert(list.id_at(0).unwrap(), PatternResult::fresh(vec![1, 4, 9]));

        let xml = render_config(&list, Some(&results)).unwrap();
        assert!(xml.contains(r#"hits="3""#));
        assert!(xml.contains(r#"hits="0""#));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            parse_config("<AnalyseDoc><Pattern"),
            Err(ConfigError::Decode(_))
        ));
    }
}
