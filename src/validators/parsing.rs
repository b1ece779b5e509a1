//! NXDL parsing
//!
//! Converts definition element trees into [`ConstraintModel`]s. The same
//! content parser serves base classes and application definitions; the
//! difference is where the content comes from (the `definition` root for a
//! base class, the first top-level `group` template for an application).

use crate::documents::Element;
use crate::error::{Error, ParseError, Result};
use crate::loaders::Loader;
use crate::validators::models::{
    AttributeConstraint, ClassFlags, ConstraintModel, Content, Dimensions, FieldConstraint,
    GroupConstraint, Occurs, Optionality,
};
use std::path::Path;

/// Root tag of every NXDL document
pub const DEFINITION_TAG: &str = "definition";

/// Read an NXDL file and return its root element
///
/// XML problems are reported as [`Error::Parse`] carrying the file location.
pub fn load_document(loader: &Loader, path: &Path) -> Result<Element> {
    let document = loader.load_definition(path).map_err(|e| match e {
        Error::Xml(message) => Error::Parse(
            ParseError::new(message).with_location(path.display().to_string()),
        ),
        other => other,
    })?;

    document.root.ok_or_else(|| {
        Error::Parse(
            ParseError::new("Definition document has no root element")
                .with_location(path.display().to_string()),
        )
    })
}

/// Build the model of a base class from its root element
pub fn parse_base_class(name: &str, root: &Element) -> Result<ConstraintModel> {
    if root.local_name() != DEFINITION_TAG {
        return Err(Error::Parse(ParseError::new(format!(
            "Base class {} has root tag '{}' instead of '{}'",
            name,
            root.local_name(),
            DEFINITION_TAG
        ))));
    }

    let mut model = ConstraintModel::new(name);
    model.category = root.get_attribute("category").map(str::to_string);
    model.extends = root.get_attribute("extends").map(str::to_string);
    model.flags = parse_flags(root);
    model.content = parse_content(root);
    Ok(model)
}

/// Build the unmerged model of an application definition
pub fn parse_application(name: &str, root: &Element) -> Result<ConstraintModel> {
    if root.local_name() != DEFINITION_TAG {
        return Err(Error::Definition(format!(
            "The application definition {} does not contain the correct root tag",
            name
        )));
    }

    let extends = root.get_attribute("extends").ok_or_else(|| {
        Error::Definition(format!(
            "The application definition {} does not declare 'extends'",
            name
        ))
    })?;

    let template = root.find_child("group").ok_or_else(|| {
        Error::Definition(format!(
            "The application definition {} has no entry group",
            name
        ))
    })?;

    let mut model = ConstraintModel::new(name);
    model.category = root.get_attribute("category").map(str::to_string);
    model.extends = Some(extends.to_string());
    model.entry_class = template.get_attribute("type").map(str::to_string);
    model.flags = parse_flags(root);
    model.content = parse_content(template);
    Ok(model)
}

fn parse_flags(root: &Element) -> ClassFlags {
    ClassFlags {
        allow_extra_groups: root.is_flag_set("ignoreExtraGroups"),
        allow_extra_fields: root.is_flag_set("ignoreExtraFields"),
        allow_extra_attributes: root.is_flag_set("ignoreExtraAttributes"),
    }
}

/// Parse the `group`, `field` and `attribute` children of an element
pub fn parse_content(element: &Element) -> Content {
    let mut content = Content::default();

    for child in &element.children {
        match child.local_name() {
            "group" => {
                if let Some(group) = parse_group(child) {
                    content.groups.insert(group.key().to_string(), group);
                }
            }
            "field" => {
                if let Some(field) = parse_field(child) {
                    content.fields.insert(field.name.clone(), field);
                }
            }
            "attribute" => {
                if let Some(attribute) = parse_attribute(child) {
                    content.attributes.insert(attribute.name.clone(), attribute);
                }
            }
            _ => {}
        }
    }

    content
}

fn parse_group(element: &Element) -> Option<GroupConstraint> {
    let Some(nxclass) = element.get_attribute("type") else {
        tracing::debug!(
            name = element.get_attribute("name"),
            "skipping group without a type"
        );
        return None;
    };

    Some(GroupConstraint {
        name: element.get_attribute("name").map(str::to_string),
        nxclass: nxclass.to_string(),
        deprecated: element.get_attribute("deprecated").map(str::to_string),
        occurs: parse_occurs(element),
        content: parse_content(element),
    })
}

fn parse_field(element: &Element) -> Option<FieldConstraint> {
    let name = element.get_attribute("name")?;

    let nx_type = element.get_attribute("type").and_then(|t| {
        let parsed = t.parse().ok();
        if parsed.is_none() {
            tracing::debug!(field = name, nx_type = t, "ignoring unknown field type");
        }
        parsed
    });

    let attributes = element
        .find_children("attribute")
        .filter_map(parse_attribute)
        .map(|a| (a.name.clone(), a))
        .collect();

    Some(FieldConstraint {
        name: name.to_string(),
        nx_type,
        dimensions: element.find_child("dimensions").map(parse_dimensions),
        enumeration: element.find_child("enumeration").map(parse_enumeration),
        units: element.get_attribute("units").map(str::to_string),
        deprecated: element.get_attribute("deprecated").map(str::to_string),
        attributes,
        occurs: parse_occurs(element),
    })
}

fn parse_attribute(element: &Element) -> Option<AttributeConstraint> {
    let name = element.get_attribute("name")?;

    // Only keywords are recorded; the optional default belongs to
    // AttributeConstraint::min_occurs so that merges can inherit a minimum
    let occurs = if element.is_flag_set("required")
        || element.get_attribute("optional") == Some("false")
    {
        Occurs::at_least(1)
    } else {
        parse_occurs(element)
    };

    Some(AttributeConstraint {
        name: name.to_string(),
        nx_type: element.get_attribute("type").and_then(|t| t.parse().ok()),
        enumeration: element.find_child("enumeration").map(parse_enumeration),
        deprecated: element.get_attribute("deprecated").map(str::to_string),
        occurs,
    })
}

fn parse_min_occurs(element: &Element) -> Option<u32> {
    element
        .get_attribute("minOccurs")
        .and_then(|m| m.trim().parse().ok())
}

fn parse_occurs(element: &Element) -> Occurs {
    let optionality = if element.is_flag_set("recommended") {
        Optionality::Recommended
    } else if element.is_flag_set("optional") {
        Optionality::Optional
    } else {
        Optionality::Stated
    };

    Occurs {
        min: parse_min_occurs(element),
        optionality,
    }
}

fn parse_enumeration(element: &Element) -> Vec<String> {
    element
        .find_children("item")
        .filter_map(|item| item.get_attribute("value"))
        .map(str::to_string)
        .collect()
}

fn parse_dimensions(element: &Element) -> Dimensions {
    let dims = element
        .find_children("dim")
        .filter_map(|dim| {
            let index = dim.get_attribute("index")?.trim().parse().ok()?;
            let value = dim.get_attribute("value")?;
            Some((index, value.to_string()))
        })
        .collect();

    Dimensions {
        rank: element.get_attribute("rank").map(str::to_string),
        dims,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Document;
    use crate::validators::models::NxType;

    const NXDATA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<definition xmlns="http://definition.nexusformat.org/nxdl/3.1"
    name="NXdata" extends="NXobject" type="group" category="base"
    ignoreExtraFields="true" ignoreExtraAttributes="true">
    <doc>Plottable data</doc>
    <attribute name="signal"/>
    <attribute name="axes"/>
    <group type="NXnote" name="notes" minOccurs="0"/>
    <field name="data" type="NX_NUMBER" units="NX_ANY">
        <doc>The signal</doc>
        <dimensions rank="dataRank">
            <dim index="1" value="n"/>
        </dimensions>
        <attribute name="long_name"/>
    </field>
    <field name="mode" type="NX_CHAR">
        <enumeration>
            <item value="raw"/>
            <item value="binned"/>
        </enumeration>
    </field>
    <field name="x" type="NX_WHATEVER"/>
</definition>"#;

    fn root(xml: &str) -> Element {
        Document::from_string(xml).unwrap().root.unwrap()
    }

    #[test]
    fn test_parse_base_class() {
        let model = parse_base_class("NXdata", &root(NXDATA)).unwrap();

        assert!(model.is_valid());
        assert_eq!(model.category.as_deref(), Some("base"));
        assert!(model.flags.allow_extra_fields);
        assert!(model.flags.allow_extra_attributes);
        assert!(!model.flags.allow_extra_groups);

        assert_eq!(
            model.valid_attributes().keys().collect::<Vec<_>>(),
            vec!["signal", "axes"]
        );
        assert_eq!(model.valid_groups()["notes"].nxclass, "NXnote");
        assert_eq!(model.valid_groups()["notes"].occurs.min_occurs(), 0);

        let data = &model.valid_fields()["data"];
        assert_eq!(data.nx_type, Some(NxType::Number));
        assert_eq!(data.units.as_deref(), Some("NX_ANY"));
        let dims = data.dimensions.as_ref().unwrap();
        assert_eq!(dims.rank.as_deref(), Some("dataRank"));
        assert_eq!(dims.dims.get(&1).map(String::as_str), Some("n"));
        assert!(data.attributes.contains_key("long_name"));

        let mode = &model.valid_fields()["mode"];
        assert_eq!(
            mode.enumeration.as_deref(),
            Some(&["raw".to_string(), "binned".to_string()][..])
        );

        assert_eq!(model.valid_fields()["x"].nx_type, None);
    }

    #[test]
    fn test_unnamed_group_is_keyed_by_type() {
        let xml = r#"<definition name="NXentry" extends="NXobject">
            <group type="NXdata"/>
            <group type="NXsample" name="sample"/>
            <group name="broken"/>
        </definition>"#;
        let model = parse_base_class("NXentry", &root(xml)).unwrap();

        assert_eq!(
            model.valid_groups().keys().collect::<Vec<_>>(),
            vec!["NXdata", "sample"]
        );
    }

    #[test]
    fn test_base_class_with_wrong_root() {
        let result = parse_base_class("NXfoo", &root("<schema/>"));
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_parse_application() {
        let xml = r#"<definition name="NXscan" extends="NXobject" category="application">
            <group type="NXentry">
                <attribute name="default" recommended="true"/>
                <field name="definition">
                    <enumeration><item value="NXscan"/></enumeration>
                </field>
                <field name="title" optional="true"/>
                <group type="NXsample" minOccurs="0">
                    <field name="name"/>
                </group>
            </group>
        </definition>"#;
        let model = parse_application("NXscan", &root(xml)).unwrap();

        assert_eq!(model.extends.as_deref(), Some("NXobject"));
        assert_eq!(model.entry_class.as_deref(), Some("NXentry"));
        assert_eq!(model.content.fields["definition"].occurs.min_occurs(), 1);
        assert!(model.content.fields["title"].occurs.is_optional());
        assert!(model.content.attributes["default"].occurs.is_recommended());

        let sample = &model.content.groups["NXsample"];
        assert!(sample.occurs.is_optional());
        assert!(sample.content.fields.contains_key("name"));
    }

    #[test]
    fn test_application_requires_extends() {
        let xml = r#"<definition name="NXbad"><group type="NXentry"/></definition>"#;
        let result = parse_application("NXbad", &root(xml));
        assert!(matches!(result, Err(Error::Definition(_))));
    }

    #[test]
    fn test_application_requires_definition_root() {
        let xml = r#"<application name="NXbad" extends="NXobject"/>"#;
        let result = parse_application("NXbad", &root(xml));
        assert!(matches!(result, Err(Error::Definition(_))));
    }

    #[test]
    fn test_attribute_requirement_keywords() {
        let xml = r#"<definition name="NXentry" extends="NXobject">
            <attribute name="a"/>
            <attribute name="b" required="true"/>
            <attribute name="c" optional="false"/>
            <attribute name="d" recommended="true"/>
            <attribute name="e" minOccurs="2"/>
        </definition>"#;
        let model = parse_base_class("NXentry", &root(xml)).unwrap();
        let attrs = model.valid_attributes();

        assert_eq!(attrs["a"].occurs, Occurs::default());
        assert_eq!(attrs["a"].min_occurs(), 0);
        assert_eq!(attrs["b"].min_occurs(), 1);
        assert_eq!(attrs["c"].min_occurs(), 1);
        assert!(attrs["d"].occurs.is_recommended());
        assert_eq!(attrs["d"].min_occurs(), 0);
        assert_eq!(attrs["e"].min_occurs(), 2);
    }
}
