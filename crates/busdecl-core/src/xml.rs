//! Serialized document model and XML rendering.
//!
//! A [`Fragment`] is the serialized form of an element subtree: a tag, an
//! ordered list of already-normalized attributes, and ordered child fragments.
//! A [`Document`] wraps the root fragment and renders it as pretty-printed XML.

use std::fmt::{self, Write};

/// Public identifier of the introspection DTD.
pub const DOCTYPE_PUBLIC_ID: &str = "-//freedesktop//DTD D-BUS Object Introspection 1.0//EN";

/// System identifier of the introspection DTD.
pub const DOCTYPE_SYSTEM_ID: &str = "http://www.freedesktop.org/standards/dbus/1.0/introspect.dtd";

/// The serialized form of one element and its subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    tag: &'static str,
    attributes: Vec<(String, String)>,
    children: Vec<Fragment>,
}

impl Fragment {
    pub fn new(tag: &'static str, attributes: Vec<(String, String)>, children: Vec<Fragment>) -> Self {
        Self {
            tag,
            attributes,
            children,
        }
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Returns the value of the attribute named `key`.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn children(&self) -> &[Fragment] {
        &self.children
    }

    /// Writes this fragment at the given nesting depth.
    fn write_to(&self, out: &mut impl Write, depth: usize, indent: usize) -> fmt::Result {
        let pad = depth * indent;
        write!(out, "{:pad$}<{}", "", self.tag)?;
        for (name, value) in &self.attributes {
            write!(out, " {name}=\"")?;
            write_escaped(out, value)?;
            out.write_char('"')?;
        }

        if self.children.is_empty() {
            return out.write_str("/>\n");
        }

        out.write_str(">\n")?;
        for child in &self.children {
            child.write_to(out, depth + 1, indent)?;
        }
        writeln!(out, "{:pad$}</{}>", "", self.tag)
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f, 0, 2)
    }
}

/// A complete introspection document.
///
/// # Example
///
/// ```
/// # use busdecl_core::xml::{Document, Fragment};
/// let root = Fragment::new("node", vec![("name".into(), "com.example".into())], vec![]);
/// let xml = Document::new(root).with_doctype(false).to_string();
///
/// assert_eq!(xml, "<node name=\"com.example\"/>\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Fragment,
    doctype: bool,
    indent: usize,
}

impl Document {
    /// Wraps a root fragment with the DOCTYPE preamble and two-space indent.
    pub fn new(root: Fragment) -> Self {
        Self {
            root,
            doctype: true,
            indent: 2,
        }
    }

    pub fn with_doctype(mut self, doctype: bool) -> Self {
        self.doctype = doctype;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn root(&self) -> &Fragment {
        &self.root
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.doctype {
            writeln!(
                f,
                "<!DOCTYPE {} PUBLIC \"{DOCTYPE_PUBLIC_ID}\"\n \"{DOCTYPE_SYSTEM_ID}\">",
                self.root.tag
            )?;
        }
        self.root.write_to(f, 0, self.indent)
    }
}

fn write_escaped(out: &mut impl Write, value: &str) -> fmt::Result {
    for ch in value.chars() {
        match ch {
            '&' => out.write_str("&amp;")?,
            '<' => out.write_str("&lt;")?,
            '>' => out.write_str("&gt;")?,
            '"' => out.write_str("&quot;")?,
            // Attribute-value normalization would turn these into spaces.
            '\n' => out.write_str("&#10;")?,
            '\r' => out.write_str("&#13;")?,
            '\t' => out.write_str("&#9;")?,
            _ => out.write_char(ch)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(name: &str, value: &str) -> (String, String) {
        (name.to_string(), value.to_string())
    }

    #[test]
    fn test_fragment_self_closes_without_children() {
        let arg = Fragment::new("arg", vec![attr("name", "x"), attr("type", "s")], vec![]);

        assert_eq!(arg.to_string(), "<arg name=\"x\" type=\"s\"/>\n");
    }

    #[test]
    fn test_attribute_whitespace_escaped() {
        let annotation = Fragment::new("annotation", vec![attr("value", "a\nb\r\tc & \"d\"")], vec![]);

        assert_eq!(
            annotation.to_string(),
            "<annotation value=\"a&#10;b&#13;&#9;c &amp; &quot;d&quot;\"/>\n"
        );
    }

    #[test]
    fn test_fragment_nested_indentation() {
        let arg = Fragment::new("arg", vec![attr("type", "s")], vec![]);
        let method = Fragment::new("method", vec![attr("name", "Echo")], vec![arg]);

        assert_eq!(
            method.to_string(),
            "<method name=\"Echo\">\n  <arg type=\"s\"/>\n</method>\n"
        );
    }

    #[test]
    fn test_attribute_escaping() {
        let annotation = Fragment::new("annotation", vec![attr("value", "a<b & \"c\">")], vec![]);

        assert_eq!(
            annotation.to_string(),
            "<annotation value=\"a&lt;b &amp; &quot;c&quot;&gt;\"/>\n"
        );
    }

    #[test]
    fn test_document_doctype_and_indent() {
        let child = Fragment::new("interface", vec![attr("name", "a.B")], vec![]);
        let root = Fragment::new("node", vec![], vec![child]);

        let xml = Document::new(root).with_indent(4).to_string();

        assert_eq!(
            xml,
            "<!DOCTYPE node PUBLIC \"-//freedesktop//DTD D-BUS Object Introspection 1.0//EN\"\n \
             \"http://www.freedesktop.org/standards/dbus/1.0/introspect.dtd\">\n\
             <node>\n    <interface name=\"a.B\"/>\n</node>\n"
        );
    }

    #[test]
    fn test_attribute_lookup() {
        let fragment = Fragment::new("property", vec![attr("name", "Count"), attr("access", "read")], vec![]);

        assert_eq!(fragment.attribute("access"), Some("read"));
        assert_eq!(fragment.attribute("type"), None);
    }
}
