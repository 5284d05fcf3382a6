//! # Scheme document emission.
//!
//! In SchemeMode the engine describes the input declaratively: title,
//! description, the external-validation and single-instance flags, and the
//! ordered argument list. The host parses this document to render the
//! configuration UI and to decide how to invoke the input. Streaming mode
//! is always `xml`; the engine speaks nothing else.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::argument::Argument;

/// Declarative description of the input, serialized for the host.
#[derive(Debug, Clone)]
pub struct Scheme {
    /// Scheme title shown by the host.
    pub title: String,
    /// Scheme description shown by the host.
    pub description: String,
    /// Whether the host should invoke `--validate-arguments`.
    pub use_external_validation: bool,
    /// Whether the host runs one process for all stanzas.
    pub use_single_instance: bool,
    arguments: Vec<Argument>,
}

impl Scheme {
    /// Creates a scheme with no extra arguments and both flags off.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            use_external_validation: false,
            use_single_instance: false,
            arguments: Vec::new(),
        }
    }

    /// Appends an argument descriptor; emission preserves insertion order.
    pub fn add_argument(&mut self, argument: Argument) {
        self.arguments.push(argument);
    }

    /// The argument descriptors in emission order.
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Serializes the scheme into the host's XML form.
    pub fn to_xml(&self) -> Result<String, quick_xml::Error> {
        let mut writer = Writer::new(Vec::new());

        writer.write_event(Event::Start(BytesStart::new("scheme")))?;
        write_text_element(&mut writer, "title", &self.title)?;
        write_text_element(&mut writer, "description", &self.description)?;
        write_text_element(
            &mut writer,
            "use_external_validation",
            bool_str(self.use_external_validation),
        )?;
        write_text_element(
            &mut writer,
            "use_single_instance",
            bool_str(self.use_single_instance),
        )?;
        write_text_element(&mut writer, "streaming_mode", "xml")?;

        writer.write_event(Event::Start(BytesStart::new("endpoint")))?;
        writer.write_event(Event::Start(BytesStart::new("args")))?;
        for argument in &self.arguments {
            write_argument(&mut writer, argument)?;
        }
        writer.write_event(Event::End(BytesEnd::new("args")))?;
        writer.write_event(Event::End(BytesEnd::new("endpoint")))?;
        writer.write_event(Event::End(BytesEnd::new("scheme")))?;

        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }
}

fn write_argument<W: std::io::Write>(
    writer: &mut Writer<W>,
    argument: &Argument,
) -> Result<(), quick_xml::Error> {
    let mut arg = BytesStart::new("arg");
    arg.push_attribute(("name", argument.name.as_str()));
    writer.write_event(Event::Start(arg))?;

    if let Some(title) = &argument.title {
        write_text_element(writer, "title", title)?;
    }
    if let Some(description) = &argument.description {
        write_text_element(writer, "description", description)?;
    }
    if let Some(validation) = &argument.validation {
        write_text_element(writer, "validation", validation)?;
    }
    write_text_element(writer, "data_type", argument.data_type.as_str())?;
    write_text_element(
        writer,
        "required_on_edit",
        bool_str(argument.required_on_edit),
    )?;
    write_text_element(
        writer,
        "required_on_create",
        bool_str(argument.required_on_create),
    )?;

    writer.write_event(Event::End(BytesEnd::new("arg")))?;
    Ok(())
}

fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    tag: &str,
    text: &str,
) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
