//! # Host payload decoding.
//!
//! When the host orchestrator launches an input it feeds a single XML
//! document on standard input. RunMode receives an *input definition*
//! (metadata + configured stanzas); ValidateArgs mode receives a
//! *validation definition* (metadata + one proposed parameter set):
//!
//! ```text
//! <input>                                 <items>
//!   <server_host>…</server_host>            <server_host>…</server_host>
//!   <server_uri>…</server_uri>              …
//!   <session_key>…</session_key>            <item name="proposed">
//!   <checkpoint_dir>…</checkpoint_dir>        <param name="interval">60</param>
//!   <configuration>                         </item>
//!     <stanza name="demo://one">          </items>
//!       <param name="interval">60</param>
//!     </stanza>
//!   </configuration>
//! </input>
//! ```
//!
//! Both decode into an immutable [`HostMetadata`] snapshot plus the mode's
//! payload. Metadata is fully populated at construction; a missing field is
//! a loud [`DefinitionError`], never a silent default.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use url::Url;

use crate::net_utils;

/// Errors raised while decoding a host payload.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DefinitionError {
    /// The payload is not well-formed XML.
    #[error("malformed payload XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An element attribute could not be decoded.
    #[error("malformed payload attribute: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    /// A required metadata field is absent from the payload.
    #[error("missing required metadata field: {field}")]
    MissingField {
        /// The absent field.
        field: &'static str,
    },

    /// A stanza or item element carries no `name` attribute.
    #[error("stanza element without a name attribute")]
    UnnamedStanza,

    /// The advertised server URI cannot be split into scheme/host/port.
    #[error("invalid server uri {uri:?}: {reason}")]
    InvalidUri {
        /// The URI as received.
        uri: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Immutable host connection metadata for one invocation.
///
/// Constructed once from the payload before any user logic runs, then
/// handed out read-only. The connection URI is pre-split so backend
/// constructors never re-parse it.
#[derive(Debug, Clone)]
pub struct HostMetadata {
    server_host_name: String,
    server_uri: String,
    server_scheme: String,
    server_host: String,
    server_port: u16,
    session_key: String,
    checkpoint_dir: PathBuf,
}

impl HostMetadata {
    fn from_fields(mut fields: BTreeMap<String, String>) -> Result<Self, DefinitionError> {
        let server_host_name = take_field(&mut fields, "server_host")?;
        let server_uri = take_field(&mut fields, "server_uri")?;
        let session_key = take_field(&mut fields, "session_key")?;
        let checkpoint_dir = PathBuf::from(take_field(&mut fields, "checkpoint_dir")?);

        let url = Url::parse(&server_uri).map_err(|e| DefinitionError::InvalidUri {
            uri: server_uri.clone(),
            reason: e.to_string(),
        })?;
        let server_scheme = url.scheme().to_string();
        if !net_utils::is_valid_scheme(&server_scheme) {
            return Err(DefinitionError::InvalidUri {
                uri: server_uri,
                reason: format!("unsupported scheme {server_scheme:?}"),
            });
        }
        let server_host = url
            .host_str()
            .ok_or_else(|| DefinitionError::InvalidUri {
                uri: server_uri.clone(),
                reason: "missing host".to_string(),
            })?
            .to_string();
        let server_port = url
            .port_or_known_default()
            .ok_or_else(|| DefinitionError::InvalidUri {
                uri: server_uri.clone(),
                reason: "missing port".to_string(),
            })?;

        Ok(Self {
            server_host_name,
            server_uri,
            server_scheme,
            server_host,
            server_port,
            session_key,
            checkpoint_dir,
        })
    }

    /// Host display name.
    pub fn server_host_name(&self) -> &str {
        &self.server_host_name
    }

    /// Full management connection URI, as received.
    pub fn server_uri(&self) -> &str {
        &self.server_uri
    }

    /// Scheme component of the management URI.
    pub fn server_scheme(&self) -> &str {
        &self.server_scheme
    }

    /// Host component of the management URI.
    pub fn server_host(&self) -> &str {
        &self.server_host
    }

    /// Port component of the management URI.
    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    /// Opaque session credential for the management API.
    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    /// Directory reserved for this input's local checkpoints.
    pub fn checkpoint_dir(&self) -> &Path {
        &self.checkpoint_dir
    }
}

fn take_field(
    fields: &mut BTreeMap<String, String>,
    field: &'static str,
) -> Result<String, DefinitionError> {
    fields
        .remove(field)
        .ok_or(DefinitionError::MissingField { field })
}

/// One named configuration instance of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stanza {
    name: String,
    params: BTreeMap<String, String>,
}

impl Stanza {
    fn new(name: String) -> Self {
        Self {
            name,
            params: BTreeMap::new(),
        }
    }

    /// The stanza name, e.g. `demo://one`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All argument values, ordered by argument name.
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Looks up a single argument value.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// The set of configured stanzas delivered to `do_run`, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSpecSet {
    stanzas: BTreeMap<String, Stanza>,
}

impl InputSpecSet {
    fn insert(&mut self, stanza: Stanza) {
        self.stanzas.insert(stanza.name.clone(), stanza);
    }

    /// Looks up a stanza by name.
    pub fn get(&self, name: &str) -> Option<&Stanza> {
        self.stanzas.get(name)
    }

    /// Number of configured stanzas.
    pub fn len(&self) -> usize {
        self.stanzas.len()
    }

    /// `true` when no stanza is configured.
    pub fn is_empty(&self) -> bool {
        self.stanzas.is_empty()
    }

    /// Iterates stanzas in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Stanza)> {
        self.stanzas.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'a> IntoIterator for &'a InputSpecSet {
    type Item = (&'a String, &'a Stanza);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Stanza>;

    fn into_iter(self) -> Self::IntoIter {
        self.stanzas.iter()
    }
}

/// RunMode payload: metadata plus every configured stanza.
#[derive(Debug, Clone)]
pub struct InputDefinition {
    /// Connection metadata snapshot.
    pub metadata: HostMetadata,
    /// The configured stanzas.
    pub inputs: InputSpecSet,
}

impl InputDefinition {
    /// Decodes a RunMode payload.
    pub fn parse(xml: &str) -> Result<Self, DefinitionError> {
        let raw = scan(xml)?;
        let metadata = HostMetadata::from_fields(raw.fields)?;
        let mut inputs = InputSpecSet::default();
        for stanza in raw.stanzas {
            inputs.insert(stanza);
        }
        Ok(Self { metadata, inputs })
    }
}

/// ValidateArgs payload: the proposed parameters for one stanza.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationRequest {
    /// Name of the proposed stanza, when the host supplies one.
    pub name: Option<String>,
    /// Proposed argument values.
    pub parameters: BTreeMap<String, String>,
}

impl ValidationRequest {
    /// Looks up a proposed parameter value.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }
}

/// ValidateArgs payload: metadata plus the proposed parameter set.
#[derive(Debug, Clone)]
pub struct ValidationDefinition {
    /// Connection metadata snapshot.
    pub metadata: HostMetadata,
    /// The parameters to validate.
    pub request: ValidationRequest,
}

impl ValidationDefinition {
    /// Decodes a ValidateArgs payload.
    pub fn parse(xml: &str) -> Result<Self, DefinitionError> {
        let raw = scan(xml)?;
        let metadata = HostMetadata::from_fields(raw.fields)?;
        let request = match raw.stanzas.into_iter().next() {
            Some(stanza) => ValidationRequest {
                name: Some(stanza.name),
                parameters: stanza.params,
            },
            None => ValidationRequest::default(),
        };
        Ok(Self { metadata, request })
    }
}

/// Flat scan result shared by both payload shapes.
struct RawPayload {
    fields: BTreeMap<String, String>,
    stanzas: Vec<Stanza>,
}

/// Walks the document once, collecting top-level scalar fields and
/// `<stanza>`/`<item>` parameter groups. Unknown elements are skipped so
/// host-side payload growth stays non-breaking.
fn scan(xml: &str) -> Result<RawPayload, DefinitionError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut fields = BTreeMap::new();
    let mut stanzas: Vec<Stanza> = Vec::new();
    let mut current_stanza: Option<Stanza> = None;
    let mut current_param: Option<String> = None;
    let mut current_field: Option<String> = None;
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"input" | b"items" | b"configuration" => {}
                b"stanza" | b"item" => {
                    let name =
                        name_attr(&e)?.ok_or(DefinitionError::UnnamedStanza)?;
                    current_stanza = Some(Stanza::new(name));
                }
                b"param" if current_stanza.is_some() => {
                    current_param = name_attr(&e)?;
                    text.clear();
                }
                _ if current_stanza.is_none() => {
                    current_field =
                        Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                    text.clear();
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"param" => {
                    if let (Some(stanza), Some(name)) = (current_stanza.as_mut(), name_attr(&e)?)
                    {
                        stanza.params.insert(name, String::new());
                    }
                }
                _ if current_stanza.is_none() => {
                    fields.insert(
                        String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                        String::new(),
                    );
                }
                _ => {}
            },
            Event::Text(t) => {
                text.push_str(&t.unescape()?);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"stanza" | b"item" => {
                    if let Some(stanza) = current_stanza.take() {
                        stanzas.push(stanza);
                    }
                }
                b"param" => {
                    if let (Some(stanza), Some(param)) =
                        (current_stanza.as_mut(), current_param.take())
                    {
                        stanza.params.insert(param, std::mem::take(&mut text));
                    }
                }
                _ => {
                    if let Some(field) = current_field.take() {
                        fields.insert(field, std::mem::take(&mut text));
                    }
                }
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(RawPayload { fields, stanzas })
}

fn name_attr(e: &BytesStart<'_>) -> Result<Option<String>, DefinitionError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"name" {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}
