use std::sync::Arc;

/// Desired shape of one node.
///
/// The variant is decided once, where raw input becomes a `Descriptor`;
/// nothing downstream re-inspects a value to guess whether it is an element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Descriptor {
    Element(ElementDescriptor),
    /// Already string-coerced text content.
    Text(String),
}

impl Descriptor {
    pub fn element(tag: impl Into<Arc<str>>) -> ElementDescriptor {
        ElementDescriptor::new(tag)
    }

    pub fn text(value: impl ToText) -> Self {
        Descriptor::Text(value.to_text())
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Descriptor::Element(_))
    }

    pub fn as_element(&self) -> Option<&ElementDescriptor> {
        match self {
            Descriptor::Element(element) => Some(element),
            Descriptor::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Descriptor::Element(_) => None,
            Descriptor::Text(text) => Some(text),
        }
    }

    /// `None` for text, which never matches any element tag.
    pub fn tag(&self) -> Option<&str> {
        self.as_element().map(ElementDescriptor::tag)
    }

    /// Empty for text descriptors.
    pub fn children(&self) -> &[Descriptor] {
        match self {
            Descriptor::Element(element) => element.children(),
            Descriptor::Text(_) => &[],
        }
    }
}

/// Element half of [`Descriptor`], built with chained calls:
///
/// ```
/// use reconcile::Descriptor;
///
/// let button = Descriptor::element("button")
///     .attr("type", "button")
///     .child("render the next step");
/// assert_eq!(button.attr_value("type"), Some("button"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementDescriptor {
    tag: Arc<str>,
    attrs: Vec<(Arc<str>, String)>,
    children: Vec<Descriptor>,
}

impl ElementDescriptor {
    pub fn new(tag: impl Into<Arc<str>>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attributes in insertion order.
    pub fn attrs(&self) -> &[(Arc<str>, String)] {
        &self.attrs
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr_value(name).is_some()
    }

    pub fn children(&self) -> &[Descriptor] {
        &self.children
    }

    pub fn attr(mut self, name: impl Into<Arc<str>>, value: impl ToText) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Names compare case-insensitively; a repeated name keeps its first
    /// position and takes the last value.
    pub fn set_attr(&mut self, name: impl Into<Arc<str>>, value: impl ToText) {
        let name = name.into();
        let value = value.to_text();
        match self
            .attrs
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn child(mut self, child: impl Into<Descriptor>) -> Self {
        self.push_child(child);
        self
    }

    pub fn with_children<I, D>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Descriptor>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn push_child(&mut self, child: impl Into<Descriptor>) {
        self.children.push(child.into());
    }
}

/// String coercion of leaf values, the way a script engine prints them.
pub trait ToText {
    fn to_text(&self) -> String;
}

impl<T: ToText + ?Sized> ToText for &T {
    fn to_text(&self) -> String {
        (**self).to_text()
    }
}

impl ToText for str {
    fn to_text(&self) -> String {
        self.to_string()
    }
}

impl ToText for String {
    fn to_text(&self) -> String {
        self.clone()
    }
}

impl ToText for char {
    fn to_text(&self) -> String {
        self.to_string()
    }
}

impl ToText for bool {
    fn to_text(&self) -> String {
        self.to_string()
    }
}

impl ToText for f64 {
    fn to_text(&self) -> String {
        coerce_number(*self)
    }
}

impl ToText for f32 {
    fn to_text(&self) -> String {
        coerce_number(f64::from(*self))
    }
}

macro_rules! integer_to_text {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToText for $ty {
                fn to_text(&self) -> String {
                    self.to_string()
                }
            }

            impl From<$ty> for Descriptor {
                fn from(value: $ty) -> Self {
                    Descriptor::Text(value.to_text())
                }
            }
        )*
    };
}

integer_to_text!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Formats a number like a script engine's string conversion: integral
/// values have no fraction, `-0` prints as `0`, non-finite values print as
/// `NaN`/`Infinity`, and magnitudes outside `[1e-6, 1e21)` use exponent
/// notation with an explicit sign (`1e+21`, `1.5e-7`).
pub fn coerce_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let formatted = format!("{value:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        };
    }
    value.to_string()
}

impl From<ElementDescriptor> for Descriptor {
    fn from(element: ElementDescriptor) -> Self {
        Descriptor::Element(element)
    }
}

impl From<&str> for Descriptor {
    fn from(value: &str) -> Self {
        Descriptor::Text(value.to_string())
    }
}

impl From<String> for Descriptor {
    fn from(value: String) -> Self {
        Descriptor::Text(value)
    }
}

impl From<&String> for Descriptor {
    fn from(value: &String) -> Self {
        Descriptor::Text(value.clone())
    }
}

impl From<char> for Descriptor {
    fn from(value: char) -> Self {
        Descriptor::Text(value.to_string())
    }
}

impl From<bool> for Descriptor {
    fn from(value: bool) -> Self {
        Descriptor::Text(value.to_text())
    }
}

impl From<f64> for Descriptor {
    fn from(value: f64) -> Self {
        Descriptor::Text(coerce_number(value))
    }
}

impl From<f32> for Descriptor {
    fn from(value: f32) -> Self {
        Descriptor::Text(value.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_coerce_like_script_strings() {
        assert_eq!(coerce_number(42.0), "42");
        assert_eq!(coerce_number(-0.0), "0");
        assert_eq!(coerce_number(0.5), "0.5");
        assert_eq!(coerce_number(-12.25), "-12.25");
        assert_eq!(coerce_number(f64::NAN), "NaN");
        assert_eq!(coerce_number(f64::INFINITY), "Infinity");
        assert_eq!(coerce_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(coerce_number(1e21), "1e+21");
        assert_eq!(coerce_number(1.5e-7), "1.5e-7");
        assert_eq!(coerce_number(0.000001), "0.000001");
    }

    #[test]
    fn leaf_values_become_text() {
        assert_eq!(Descriptor::from(42), Descriptor::Text("42".to_string()));
        assert_eq!(Descriptor::from(42.0), Descriptor::Text("42".to_string()));
        assert_eq!(Descriptor::from(true), Descriptor::Text("true".to_string()));
        assert_eq!(Descriptor::from('x'), Descriptor::Text("x".to_string()));
        assert_eq!(Descriptor::text(7u8).as_text(), Some("7"));
        assert_eq!(Descriptor::from("hi").tag(), None);
    }

    #[test]
    fn builder_collects_attrs_and_children() {
        let element = Descriptor::element("ul")
            .attr("class", "list")
            .attr("data-count", 2)
            .with_children(["a", "b"])
            .child(Descriptor::element("li").child(3));
        assert_eq!(element.tag(), "ul");
        assert_eq!(element.attr_value("data-count"), Some("2"));
        assert_eq!(element.children().len(), 3);
        assert_eq!(element.children()[2].children(), &[Descriptor::from(3)]);

        let descriptor = Descriptor::from(element);
        assert!(descriptor.is_element());
        assert_eq!(descriptor.tag(), Some("ul"));
    }

    #[test]
    fn repeated_attr_names_keep_first_position() {
        let element = Descriptor::element("p")
            .attr("class", "a")
            .attr("id", "x")
            .attr("CLASS", "b");
        assert_eq!(
            element.attrs(),
            &[
                (Arc::<str>::from("class"), "b".to_string()),
                (Arc::<str>::from("id"), "x".to_string())
            ]
        );
        assert!(element.has_attr("Id"));
        assert!(!element.has_attr("title"));
    }
}
