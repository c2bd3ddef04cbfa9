/// Represents ways to locate an element in the live document.
///
/// The two target applications are reached through CSS selectors and XPath
/// queries almost exclusively; `Id`, `Name` and `Tag` exist so the feature
/// tables can state the simple cases without quoting noise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Select by CSS selector
    Css(String),
    /// Select by XPath query
    XPath(String),
    /// Select by the `id` attribute
    Id(String),
    /// Select by the form control `name` attribute
    Name(String),
    /// Select by tag name
    Tag(String),
}

impl Selector {
    /// Lower to the `(using, value)` pair the wire protocol understands.
    ///
    /// `Id` and `Name` have no native location strategy in the protocol and
    /// compile down to attribute CSS selectors.
    pub fn to_wire(&self) -> (&'static str, String) {
        match self {
            Selector::Css(css) => ("css selector", css.clone()),
            Selector::XPath(xpath) => ("xpath", xpath.clone()),
            Selector::Id(id) => ("css selector", format!("[id='{id}']")),
            Selector::Name(name) => ("css selector", format!("[name='{name}']")),
            Selector::Tag(tag) => ("tag name", tag.clone()),
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Css(css) => write!(f, "css:{css}"),
            Selector::XPath(xpath) => write!(f, "xpath:{xpath}"),
            Selector::Id(id) => write!(f, "id:{id}"),
            Selector::Name(name) => write!(f, "name:{name}"),
            Selector::Tag(tag) => write!(f, "tag:{tag}"),
        }
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        match s {
            _ if s.starts_with("css:") => Selector::Css(s["css:".len()..].to_string()),
            _ if s.starts_with("xpath:") => Selector::XPath(s["xpath:".len()..].to_string()),
            _ if s.starts_with("id:") => Selector::Id(s["id:".len()..].to_string()),
            _ if s.starts_with("name:") => Selector::Name(s["name:".len()..].to_string()),
            _ if s.starts_with("tag:") => Selector::Tag(s["tag:".len()..].to_string()),
            // Bare XPath queries start with an axis or a parenthesised group
            _ if s.starts_with("//") || s.starts_with("(") => Selector::XPath(s.to_string()),
            // A lone fragment like "#feld44" is an id shorthand
            _ if s.starts_with('#') && !s.contains(' ') && !s.contains('.') => {
                Selector::Id(s[1..].to_string())
            }
            _ => Selector::Css(s.to_string()),
        }
    }
}

impl From<String> for Selector {
    fn from(s: String) -> Self {
        Selector::from(s.as_str())
    }
}
