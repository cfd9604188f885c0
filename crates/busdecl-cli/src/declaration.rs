//! TOML declaration files.
//!
//! A declaration file names a namespace and a type, then lists methods,
//! properties and signals as arrays of tables:
//!
//! ```toml
//! namespace = "com.example.service"
//! type_name = "ExampleService"
//!
//! [[method]]
//! name = "Echo"
//! args = [{ name = "message", type = "s" }]
//! response = "s"
//!
//! [[property]]
//! name = "Count"
//! type = "i"
//! access = "readwrite"
//! signal_on_change = true
//!
//! [[signal]]
//! name = "Ready"
//! annotations = [{ name = "org.freedesktop.DBus.Deprecated" }]
//! ```
//!
//! The file is turned into an [`Introspector`] through the regular builder
//! API, so every declaration rule applies exactly as it does in code.
//!
//! TOML keeps no order between different arrays of tables, so the document
//! groups members by kind: interface annotations, then methods, then
//! properties, then signals. Within a kind, members keep their file order.

use std::sync::Arc;

use log::debug;
use serde::Deserialize;

use busdecl::{
    Access, Annotation, Arg, AttributeValue, BusdeclError, Direction, Introspector, MemberChild,
    PropertyDecl, ServiceType, config::IntrospectorConfig,
};

/// Parsed contents of a declaration file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclarationFile {
    namespace: String,
    type_name: String,
    #[serde(default)]
    annotations: Vec<AnnotationSpec>,
    #[serde(default, rename = "method")]
    methods: Vec<MemberSpec>,
    #[serde(default, rename = "property")]
    properties: Vec<PropertySpec>,
    #[serde(default, rename = "signal")]
    signals: Vec<MemberSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AnnotationSpec {
    name: String,
    value: Option<AttributeValue>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ArgSpec {
    name: String,
    #[serde(rename = "type")]
    signature: String,
    #[serde(default)]
    direction: Direction,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MemberSpec {
    name: String,
    #[serde(default)]
    args: Vec<ArgSpec>,
    response: Option<String>,
    #[serde(default)]
    annotations: Vec<AnnotationSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PropertySpec {
    name: String,
    #[serde(rename = "type")]
    signature: String,
    #[serde(default)]
    access: Access,
    #[serde(default)]
    signal_on_change: bool,
    #[serde(default)]
    annotations: Vec<AnnotationSpec>,
}

impl DeclarationFile {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Declares every member and closes the interface.
    ///
    /// Members are declared grouped by kind, each group in file order.
    ///
    /// The file's `type_name` takes precedence over the configured one.
    pub fn build(&self, config: IntrospectorConfig) -> Result<Arc<ServiceType<()>>, BusdeclError> {
        let config = config.with_type_name(self.type_name.as_str());
        let mut introspector = Introspector::<()>::new(&self.namespace).with_config(config);

        for annotation in &self.annotations {
            introspector.annotate(annotation.build()?);
        }

        for method in &self.methods {
            introspector.method(&method.name, method.children()?, method.response.as_deref())?;
        }

        for property in &self.properties {
            let mut decl = PropertyDecl::new(property.signature.as_str(), property.access)
                .signal_on_change(property.signal_on_change);
            for annotation in &property.annotations {
                decl = decl.annotate(annotation.build()?);
            }
            introspector.property(&property.name, decl)?;
        }

        for signal in &self.signals {
            introspector.signal(&signal.name, signal.children()?, signal.response.as_deref())?;
        }

        debug!(
            namespace = self.namespace.as_str(),
            methods = self.methods.len(),
            properties = self.properties.len(),
            signals = self.signals.len();
            "Declaration file built"
        );
        Ok(introspector.close())
    }
}

impl AnnotationSpec {
    fn build(&self) -> Result<Annotation, BusdeclError> {
        Ok(Annotation::new(self.name.as_str(), self.value.clone())?)
    }
}

impl MemberSpec {
    fn children(&self) -> Result<Vec<MemberChild>, BusdeclError> {
        let mut children = Vec::with_capacity(self.args.len() + self.annotations.len());
        for arg in &self.args {
            let arg = Arg::with_direction(arg.name.as_str(), arg.signature.as_str(), arg.direction)?;
            children.push(arg.into());
        }
        for annotation in &self.annotations {
            children.push(annotation.build()?.into());
        }
        Ok(children)
    }
}

#[cfg(test)]
mod tests {
    use busdecl::{DeclarationError, DeclarationState};

    use super::*;

    fn parse(source: &str) -> DeclarationFile {
        toml::from_str(source).unwrap()
    }

    #[test]
    fn test_build_example() {
        let file = parse(
            r#"
            namespace = "com/example/service"
            type_name = "ExampleService"

            [[method]]
            name = "Echo"
            args = [{ name = "message", type = "s" }]
            response = "s"

            [[property]]
            name = "Count"
            type = "i"
            signal_on_change = true

            [[signal]]
            name = "Ready"
            args = [{ name = "at", type = "t", direction = "out" }]
            "#,
        );

        let service = file.build(IntrospectorConfig::default()).unwrap();
        let document = service.introspection();

        assert_eq!(service.namespace(), "com.example.service.ExampleService");
        assert_eq!(service.state(), DeclarationState::Materialized);
        assert!(document.contains("<property name=\"Count\" type=\"i\" access=\"readwrite\">"));
        assert!(document.contains("<signal name=\"CountChanged\">"));
        assert!(document.contains("<arg name=\"at\" type=\"t\" direction=\"out\"/>"));
    }

    #[test]
    fn test_members_grouped_by_kind() {
        let file = parse(
            r#"
            namespace = "org.example"
            type_name = "Svc"

            [[signal]]
            name = "Ready"

            [[property]]
            name = "Level"
            type = "u"
            access = "read"

            [[method]]
            name = "Stop"

            [[signal]]
            name = "Done"

            [[method]]
            name = "Start"
            "#,
        );

        let service = file.build(IntrospectorConfig::default()).unwrap();
        let fragment = service.interface().serialize();
        let names: Vec<_> = fragment
            .children()
            .iter()
            .filter_map(|child| child.attribute("name"))
            .collect();

        assert_eq!(names, ["Stop", "Start", "Level", "Ready", "Done"]);
    }

    #[test]
    fn test_own_emits_changed_annotation_conflicts_with_signal_on_change() {
        let file = parse(
            r#"
            namespace = "org.example"
            type_name = "Svc"

            [[property]]
            name = "Level"
            type = "u"
            signal_on_change = true
            annotations = [{ name = "org.freedesktop.DBus.Property.EmitsChangedSignal", value = "const" }]
            "#,
        );

        let err = file.build(IntrospectorConfig::default()).unwrap_err();

        assert!(matches!(
            err,
            BusdeclError::Declaration(DeclarationError::ConflictingAnnotation { .. })
        ));
    }

    #[test]
    fn test_file_type_name_overrides_config() {
        let file = parse("namespace = \"org.example\"\ntype_name = \"FromFile\"\n");

        let service = file
            .build(IntrospectorConfig::default().with_type_name("FromConfig"))
            .unwrap();

        assert_eq!(service.namespace(), "org.example.FromFile");
    }

    #[test]
    fn test_out_of_set_annotation_fails() {
        let file = parse(
            r#"
            namespace = "org.example"
            type_name = "Svc"

            [[method]]
            name = "Fire"
            annotations = [{ name = "org.freedesktop.DBus.Method.NoReply", value = "sometimes" }]
            "#,
        );

        let err = file.build(IntrospectorConfig::default()).unwrap_err();

        assert!(matches!(
            err,
            BusdeclError::Declaration(DeclarationError::InvalidAnnotationValue { .. })
        ));
    }

    #[test]
    fn test_missing_signature_fails() {
        let file = parse(
            r#"
            namespace = "org.example"
            type_name = "Svc"

            [[signal]]
            name = "Tick"
            args = [{ name = "n", type = "" }]
            "#,
        );

        let err = file.build(IntrospectorConfig::default()).unwrap_err();

        assert!(matches!(
            err,
            BusdeclError::Declaration(DeclarationError::MissingSignature { .. })
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = toml::from_str::<DeclarationFile>("namespace = \"a\"\ntype_name = \"B\"\nextra = 1\n");

        assert!(result.is_err());
    }
}
