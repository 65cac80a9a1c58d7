//! Template loading and the in-memory form document.
//!
//! ## Why lopdf?
//!
//! Filling an AcroForm only needs object-level access: find the field
//! dictionaries under `/AcroForm /Fields`, set their `/V`, and write the
//! document back out. `lopdf` gives exactly that without a native library.
//!
//! ## Appearances
//!
//! Writing a value regenerates the normal appearance (`/AP /N`) of every
//! widget of the field from its `/DA`, see [`crate::pipeline::appearance`].
//! The form also gets `/NeedAppearances true` so viewers that prefer to
//! rebuild the visible text from `/V` still do.
//!
//! Each widget owns one appearance stream object for the whole run. Later
//! rows overwrite it in place, so the document does not grow per row.

use crate::error::Csv2PdfError;
use crate::pipeline::appearance::{self, WidgetBox, FALLBACK_DA};
use crate::pipeline::encoding::{decode_text, encode_text};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Text-field access on a loaded form.
///
/// [`FormDocument`] is the real implementation; the binder is written against
/// this trait so it does not care how fields are stored.
pub trait FormFields {
    /// Fully-qualified names of every field, in document order.
    fn field_names(&self) -> Vec<String>;

    /// Fail unless `name` exists ([`Csv2PdfError::FieldNotFound`]) and is a
    /// text field ([`Csv2PdfError::NotATextField`]).
    fn ensure_text_field(&self, name: &str) -> Result<(), Csv2PdfError>;

    /// Replace the text of field `name`.
    fn set_text(&mut self, name: &str, value: &str) -> Result<(), Csv2PdfError>;

    /// Current text of field `name`, `None` when unset.
    fn text(&self, name: &str) -> Result<Option<String>, Csv2PdfError>;
}

/// Summary of one form field, as listed by [`crate::fill::inspect_template`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormFieldInfo {
    /// Fully-qualified name (`parent.child`).
    pub name: String,
    /// `/FT` value: `Tx`, `Btn`, `Ch`, `Sig`, or `None` when absent.
    pub field_type: Option<String>,
    /// Current `/V` when it is a string.
    pub value: Option<String>,
}

/// `/Ff` bit 13: the field may hold several lines.
const FF_MULTILINE: i64 = 1 << 12;

#[derive(Debug, Clone)]
struct FieldEntry {
    name: String,
    id: ObjectId,
    field_type: Option<String>,
}

/// A parsed PDF template with its form-field index.
///
/// The same instance is mutated and re-serialised for every row of a run.
pub struct FormDocument {
    path: PathBuf,
    doc: Document,
    fields: Vec<FieldEntry>,
    by_name: HashMap<String, usize>,
    appearances_flagged: bool,
    /// Widget → its generated `/AP /N` stream.
    appearance_streams: HashMap<ObjectId, ObjectId>,
    /// Standard Helvetica, added once when `/DR` lacks the `/DA` font.
    fallback_font: Option<ObjectId>,
}

impl std::fmt::Debug for FormDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormDocument")
            .field("path", &self.path)
            .field("fields", &self.fields.len())
            .finish()
    }
}

/// A handle to one text field of a [`FormDocument`].
pub struct TextField<'a> {
    doc: &'a mut FormDocument,
    id: ObjectId,
    name: String,
}

impl TextField<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write `value` into the field's `/V` and redraw its widgets.
    pub fn set_text(&mut self, value: &str) -> Result<(), Csv2PdfError> {
        let path = self.doc.path.clone();
        let dict = self
            .doc
            .doc
            .get_object_mut(self.id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| corrupt(&path, e))?;
        dict.set("V", encode_text(value));
        debug!("Set field '{}' ({} chars)", self.name, value.chars().count());
        self.doc.write_appearances(self.id, value)?;
        self.doc.flag_appearances()
    }
}

/// Read the template at `path` and index its form fields.
pub async fn load_template(path: &Path) -> Result<FormDocument, Csv2PdfError> {
    info!("Reading PDF: {}", path.display());

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| Csv2PdfError::from_read(path, e))?;

    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || FormDocument::from_bytes(&path, &bytes))
        .await
        .map_err(|e| Csv2PdfError::Internal(format!("Template parse task panicked: {}", e)))?
}

impl FormDocument {
    /// Parse PDF bytes. `path` is kept for error context and output naming.
    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Result<Self, Csv2PdfError> {
        if !bytes.starts_with(b"%PDF") {
            return Err(Csv2PdfError::NotAPdf {
                path: path.to_path_buf(),
                magic: bytes.iter().take(4).copied().collect(),
            });
        }

        let doc = Document::load_mem(bytes).map_err(|e| corrupt(path, e))?;

        let acroform = acroform(&doc).ok_or_else(|| Csv2PdfError::MissingForm {
            path: path.to_path_buf(),
        })?;
        let fields = collect_fields(&doc, acroform);
        debug!("Template has {} form fields", fields.len());

        let by_name = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            doc,
            fields,
            by_name,
            appearances_flagged: false,
            appearance_streams: HashMap::new(),
            fallback_font: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Describe every field: name, type and current value.
    pub fn fields(&self) -> Vec<FormFieldInfo> {
        self.fields
            .iter()
            .map(|f| FormFieldInfo {
                name: f.name.clone(),
                field_type: f.field_type.clone(),
                value: self.value_of(f.id),
            })
            .collect()
    }

    /// Look up a text field by fully-qualified name.
    pub fn text_field(&mut self, name: &str) -> Result<TextField<'_>, Csv2PdfError> {
        let id = self.lookup_text(name)?;
        Ok(TextField {
            doc: self,
            id,
            name: name.to_string(),
        })
    }

    /// Serialise the current state of the whole document.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, Csv2PdfError> {
        let mut buf = Vec::new();
        self.doc
            .save_to(&mut buf)
            .map_err(|e| Csv2PdfError::Internal(format!("PDF serialisation failed: {}", e)))?;
        Ok(buf)
    }

    fn lookup(&self, name: &str) -> Result<&FieldEntry, Csv2PdfError> {
        self.by_name
            .get(name)
            .map(|&i| &self.fields[i])
            .ok_or_else(|| Csv2PdfError::FieldNotFound {
                field: name.to_string(),
                available: self.field_names(),
            })
    }

    fn lookup_text(&self, name: &str) -> Result<ObjectId, Csv2PdfError> {
        let entry = self.lookup(name)?;
        if entry.field_type.as_deref() != Some("Tx") {
            return Err(Csv2PdfError::NotATextField {
                field: name.to_string(),
                found: entry.field_type.clone().unwrap_or_else(|| "none".into()),
            });
        }
        Ok(entry.id)
    }

    fn value_of(&self, id: ObjectId) -> Option<String> {
        let dict = self.doc.get_object(id).and_then(Object::as_dict).ok()?;
        match resolve(&self.doc, dict.get(b"V").ok()?)? {
            Object::String(bytes, _) => Some(decode_text(bytes)),
            _ => None,
        }
    }

    fn flag_appearances(&mut self) -> Result<(), Csv2PdfError> {
        if self.appearances_flagged {
            return Ok(());
        }
        let path = self.path.clone();
        let root = self
            .doc
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .map_err(|e| corrupt(&path, e))?;
        let entry = self
            .doc
            .get_object(root)
            .and_then(Object::as_dict)
            .and_then(|catalog| catalog.get(b"AcroForm"))
            .map_err(|e| corrupt(&path, e))?
            .clone();

        let form = match entry {
            Object::Reference(id) => self.doc.get_object_mut(id).and_then(Object::as_dict_mut),
            _ => self
                .doc
                .get_object_mut(root)
                .and_then(Object::as_dict_mut)
                .and_then(|catalog| catalog.get_mut(b"AcroForm"))
                .and_then(Object::as_dict_mut),
        }
        .map_err(|e| corrupt(&path, e))?;

        form.set("NeedAppearances", true);
        self.appearances_flagged = true;
        Ok(())
    }

    fn write_appearances(&mut self, field: ObjectId, value: &str) -> Result<(), Csv2PdfError> {
        let path = self.path.clone();
        for widget in widgets(&self.doc, field) {
            let (da, geometry) = self.widget_style(widget)?;
            let drawn =
                appearance::text_appearance(value, &da, geometry).map_err(|e| corrupt(&path, e))?;
            let mut fonts = Dictionary::new();
            fonts.set(drawn.font.clone(), self.font_resource(&drawn.font));

            let stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Form",
                    "BBox" => vec![Object::Integer(0), Object::Integer(0), geometry.width.into(), geometry.height.into()],
                    "Resources" => dictionary! { "Font" => fonts },
                },
                drawn.content,
            );
            let stream_id = match self.appearance_streams.get(&widget) {
                Some(&id) => {
                    self.doc.objects.insert(id, Object::Stream(stream));
                    id
                }
                None => {
                    let id = self.doc.add_object(stream);
                    self.appearance_streams.insert(widget, id);
                    id
                }
            };

            self.doc
                .get_object_mut(widget)
                .and_then(Object::as_dict_mut)
                .map_err(|e| corrupt(&path, e))?
                .set("AP", dictionary! { "N" => Object::Reference(stream_id) });
        }
        Ok(())
    }

    /// `/DA` and box geometry of one widget, with form-level fallbacks.
    fn widget_style(&self, widget: ObjectId) -> Result<(Vec<u8>, WidgetBox), Csv2PdfError> {
        let dict = self
            .doc
            .get_object(widget)
            .and_then(Object::as_dict)
            .map_err(|e| corrupt(&self.path, e))?;
        let (width, height) = rect_size(&self.doc, dict).ok_or_else(|| Csv2PdfError::CorruptPdf {
            path: self.path.clone(),
            detail: format!("widget {} {} R has no usable /Rect", widget.0, widget.1),
        })?;

        let form = acroform(&self.doc);
        let da = inherited(&self.doc, dict, b"DA")
            .or_else(|| form.and_then(|f| f.get(b"DA").ok()))
            .and_then(|o| o.as_str().ok())
            .unwrap_or(FALLBACK_DA)
            .to_vec();
        let quadding = inherited(&self.doc, dict, b"Q")
            .or_else(|| form.and_then(|f| f.get(b"Q").ok()))
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0);
        let flags = inherited(&self.doc, dict, b"Ff")
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0);

        Ok((
            da,
            WidgetBox {
                width,
                height,
                quadding,
                multiline: flags & FF_MULTILINE != 0,
            },
        ))
    }

    /// The form's `/DR` entry for `name`, or a standard Helvetica stand-in.
    fn font_resource(&mut self, name: &[u8]) -> Object {
        let declared = acroform(&self.doc)
            .and_then(|f| resolve(&self.doc, f.get(b"DR").ok()?))
            .and_then(|dr| dr.as_dict().ok())
            .and_then(|dr| resolve(&self.doc, dr.get(b"Font").ok()?))
            .and_then(|fonts| fonts.as_dict().ok())
            .and_then(|fonts| fonts.get(name).ok())
            .cloned();
        if let Some(font) = declared {
            return font;
        }

        let id = match self.fallback_font {
            Some(id) => id,
            None => {
                debug!(
                    "No /DR font '{}', drawing with Helvetica",
                    String::from_utf8_lossy(name)
                );
                let id = self.doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => "Helvetica",
                    "Encoding" => "WinAnsiEncoding",
                });
                self.fallback_font = Some(id);
                id
            }
        };
        Object::Reference(id)
    }
}

impl FormFields for FormDocument {
    fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    fn ensure_text_field(&self, name: &str) -> Result<(), Csv2PdfError> {
        self.lookup_text(name).map(|_| ())
    }

    fn set_text(&mut self, name: &str, value: &str) -> Result<(), Csv2PdfError> {
        self.text_field(name)?.set_text(value)
    }

    fn text(&self, name: &str) -> Result<Option<String>, Csv2PdfError> {
        let id = self.lookup(name)?.id;
        Ok(self.value_of(id))
    }
}

// ── Form traversal ───────────────────────────────────────────────────────

fn corrupt(path: &Path, e: lopdf::Error) -> Csv2PdfError {
    Csv2PdfError::CorruptPdf {
        path: path.to_path_buf(),
        detail: e.to_string(),
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn acroform(doc: &Document) -> Option<&Dictionary> {
    let root = doc.trailer.get(b"Root").ok()?.as_reference().ok()?;
    let catalog = doc.get_object(root).ok()?.as_dict().ok()?;
    resolve(doc, catalog.get(b"AcroForm").ok()?)?.as_dict().ok()
}

fn collect_fields(doc: &Document, acroform: &Dictionary) -> Vec<FieldEntry> {
    let mut out = Vec::new();
    let mut visited = HashSet::new();
    if let Some(Object::Array(roots)) = acroform.get(b"Fields").ok().and_then(|o| resolve(doc, o)) {
        for obj in roots {
            walk_field(doc, obj, None, &mut out, &mut visited);
        }
    }
    out
}

/// Depth-first walk of the field tree. Kids without `/T` are widgets of
/// their parent field and do not produce entries of their own.
fn walk_field(
    doc: &Document,
    obj: &Object,
    parent: Option<&str>,
    out: &mut Vec<FieldEntry>,
    visited: &mut HashSet<ObjectId>,
) {
    let Object::Reference(id) = obj else {
        return;
    };
    if !visited.insert(*id) {
        return;
    }
    let Ok(dict) = doc.get_object(*id).and_then(Object::as_dict) else {
        return;
    };
    let Some(partial) = dict.get(b"T").ok().and_then(|t| match resolve(doc, t)? {
        Object::String(bytes, _) => Some(decode_text(bytes)),
        _ => None,
    }) else {
        return;
    };

    let name = match parent {
        Some(p) => format!("{p}.{partial}"),
        None => partial,
    };
    out.push(FieldEntry {
        name: name.clone(),
        id: *id,
        field_type: inherited(doc, dict, b"FT")
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).into_owned()),
    });

    if let Some(Object::Array(kids)) = dict.get(b"Kids").ok().and_then(|o| resolve(doc, o)) {
        for kid in kids {
            walk_field(doc, kid, Some(&name), out, visited);
        }
    }
}

/// Look `key` up on `dict`, then on each `/Parent` in turn.
fn inherited<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut current = dict;
    for _ in 0..32 {
        if let Ok(obj) = current.get(key) {
            return resolve(doc, obj);
        }
        current = match current.get(b"Parent") {
            Ok(Object::Reference(pid)) => doc.get_object(*pid).ok()?.as_dict().ok()?,
            _ => return None,
        };
    }
    None
}

/// Widget annotations of a field: the field itself when it carries a
/// `/Rect`, plus every kid without a `/T`.
fn widgets(doc: &Document, field: ObjectId) -> Vec<ObjectId> {
    let Ok(dict) = doc.get_object(field).and_then(Object::as_dict) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    if dict.has(b"Rect") {
        out.push(field);
    }
    if let Some(Object::Array(kids)) = dict.get(b"Kids").ok().and_then(|o| resolve(doc, o)) {
        for kid in kids {
            let Object::Reference(id) = kid else { continue };
            let is_widget = doc
                .get_object(*id)
                .and_then(Object::as_dict)
                .is_ok_and(|k| !k.has(b"T") && k.has(b"Rect"));
            if is_widget {
                out.push(*id);
            }
        }
    }
    out
}

fn rect_size(doc: &Document, dict: &Dictionary) -> Option<(f32, f32)> {
    let rect = resolve(doc, dict.get(b"Rect").ok()?)?.as_array().ok()?;
    let n: Vec<f32> = rect
        .iter()
        .filter_map(|o| resolve(doc, o)?.as_float().ok())
        .collect();
    match n[..] {
        [x1, y1, x2, y2] => Some(((x2 - x1).abs(), (y2 - y1).abs())),
        _ => None,
    }
}
