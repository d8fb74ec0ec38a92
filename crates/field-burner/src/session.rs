//! Document Session: exclusive owner of the document for one burn

use std::collections::HashMap;

use lopdf::content::Content;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{BurnError, RenderError};
use crate::geometry::{self, PageSize};

/// Where a page's resource dictionary lives
#[derive(Debug, Clone, Copy)]
enum ResourcesAt {
    /// Inline in the page dictionary
    Page(ObjectId),
    /// Indirect object, possibly shared between pages
    Object(ObjectId),
}

#[derive(Debug, Default)]
struct PageState {
    font_name: Option<String>,
    wrapped: bool,
}

/// Loaded document plus the resources created while burning into it.
///
/// Never shared: the orchestrator threads a single `&mut` through the field
/// loop, and `finish` consumes the session.
pub struct DocumentSession {
    doc: Document,
    /// Page object ids in page order (index 0 is page 1)
    pages: Vec<ObjectId>,
    font_id: Option<ObjectId>,
    page_state: HashMap<ObjectId, PageState>,
}

impl DocumentSession {
    pub fn load(bytes: &[u8]) -> Result<Self, BurnError> {
        let doc =
            Document::load_mem(bytes).map_err(|e| BurnError::MalformedDocument(e.to_string()))?;
        if doc.trailer.get(b"Encrypt").is_ok() {
            return Err(BurnError::MalformedDocument(
                "encrypted documents are not supported".to_string(),
            ));
        }
        let pages = doc.get_pages().into_values().collect();
        Ok(Self {
            doc,
            pages,
            font_id: None,
            page_state: HashMap::new(),
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Resolve a 1-based page number
    pub fn page_id(&self, page: u32) -> Option<ObjectId> {
        let index = usize::try_from(page).ok()?.checked_sub(1)?;
        self.pages.get(index).copied()
    }

    pub fn page_size(&self, page_id: ObjectId) -> PageSize {
        geometry::page_size(&self.doc, page_id)
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Resource name of the session font on this page, embedding it on first use.
    pub fn font_on_page(&mut self, page_id: ObjectId) -> Result<String, RenderError> {
        if let Some(name) = self
            .page_state
            .get(&page_id)
            .and_then(|s| s.font_name.clone())
        {
            return Ok(name);
        }

        let font_id = *self.font_id.get_or_insert_with(|| {
            self.doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
                "Encoding" => "WinAnsiEncoding",
            })
        });
        let name = self.register_resource(page_id, "Font", "BurnF", font_id)?;
        self.page_state.entry(page_id).or_default().font_name = Some(name.clone());
        Ok(name)
    }

    /// Register an image XObject on the page and return its resource name.
    pub fn image_on_page(
        &mut self,
        page_id: ObjectId,
        image_id: ObjectId,
    ) -> Result<String, RenderError> {
        self.register_resource(page_id, "XObject", "BurnIm", image_id)
    }

    /// Append drawing operations to the page.
    ///
    /// The first append wraps the existing content in `q`/`Q` so its graphics
    /// state cannot leak into burned content.
    pub fn append_content(
        &mut self,
        page_id: ObjectId,
        content: Content,
    ) -> Result<(), RenderError> {
        let mut encoded = content.encode()?;
        // Streams are concatenated when the page is read; keep the last
        // operator from fusing with the next stream's first one
        encoded.push(b'\n');
        let mut contents = self.page_contents(page_id)?;

        let state = self.page_state.entry(page_id).or_default();
        if !state.wrapped {
            state.wrapped = true;
            if !contents.is_empty() {
                let open = self
                    .doc
                    .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
                let close = self
                    .doc
                    .add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
                contents.insert(0, Object::Reference(open));
                contents.push(Object::Reference(close));
            }
        }

        let stream_id = self.doc.add_object(Stream::new(Dictionary::new(), encoded));
        contents.push(Object::Reference(stream_id));

        self.doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)?
            .set("Contents", Object::Array(contents));
        Ok(())
    }

    /// Drop objects that ended up unreferenced after a failed draw
    pub fn discard_objects(&mut self, ids: impl IntoIterator<Item = ObjectId>) {
        for id in ids {
            self.doc.objects.remove(&id);
        }
    }

    /// Serialize the mutated document, ending the session.
    pub fn finish(mut self) -> Result<Vec<u8>, BurnError> {
        let mut output = Vec::new();
        self.doc
            .save_to(&mut output)
            .map_err(|e| BurnError::Serialization(e.to_string()))?;
        Ok(output)
    }

    /// Current content stream references of a page
    fn page_contents(&self, page_id: ObjectId) -> Result<Vec<Object>, RenderError> {
        let page = self.doc.get_dictionary(page_id)?;
        Ok(match page.get(b"Contents") {
            Ok(Object::Reference(id)) => match self.doc.get_object(*id) {
                Ok(Object::Array(arr)) => arr.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(arr)) => arr.clone(),
            _ => Vec::new(),
        })
    }

    /// Add `target` under a fresh `prefix<N>` name in the page's `category` sub-dictionary.
    fn register_resource(
        &mut self,
        page_id: ObjectId,
        category: &str,
        prefix: &str,
        target: ObjectId,
    ) -> Result<String, RenderError> {
        let at = self.resources_at(page_id)?;

        // Referenced sub-dictionaries may be shared, so they are copied inline
        let mut entries = match self.resources(at)?.get(category.as_bytes()) {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            Ok(Object::Reference(id)) => self
                .doc
                .get_dictionary(*id)
                .cloned()
                .unwrap_or_else(|_| Dictionary::new()),
            _ => Dictionary::new(),
        };

        let mut n = 1u32;
        let name = loop {
            let candidate = format!("{}{}", prefix, n);
            if !entries.has(candidate.as_bytes()) {
                break candidate;
            }
            n += 1;
        };
        entries.set(name.clone(), Object::Reference(target));

        self.resources_mut(at)?
            .set(category, Object::Dictionary(entries));
        Ok(name)
    }

    /// Make sure the page has its own `/Resources` entry and say where it is.
    fn resources_at(&mut self, page_id: ObjectId) -> Result<ResourcesAt, RenderError> {
        let page = self.doc.get_dictionary(page_id)?;
        match page.get(b"Resources") {
            Ok(Object::Dictionary(_)) => return Ok(ResourcesAt::Page(page_id)),
            Ok(Object::Reference(id)) if self.doc.get_dictionary(*id).is_ok() => {
                return Ok(ResourcesAt::Object(*id));
            }
            _ => {}
        }

        let inherited = self.inherited_resources(page_id);
        self.doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)?
            .set("Resources", Object::Dictionary(inherited));
        Ok(ResourcesAt::Page(page_id))
    }

    /// Resources inherited through the page tree, or an empty dictionary
    fn inherited_resources(&self, page_id: ObjectId) -> Dictionary {
        let mut current = self
            .doc
            .get_dictionary(page_id)
            .and_then(|d| d.get(b"Parent"))
            .and_then(Object::as_reference)
            .ok();

        for _ in 0..64 {
            let Some(id) = current else { break };
            let Ok(node) = self.doc.get_dictionary(id) else {
                break;
            };
            match node.get(b"Resources") {
                Ok(Object::Dictionary(dict)) => return dict.clone(),
                Ok(Object::Reference(res_id)) => {
                    if let Ok(dict) = self.doc.get_dictionary(*res_id) {
                        return dict.clone();
                    }
                }
                _ => {}
            }
            current = node.get(b"Parent").and_then(Object::as_reference).ok();
        }
        Dictionary::new()
    }

    fn resources(&self, at: ResourcesAt) -> Result<&Dictionary, RenderError> {
        Ok(match at {
            ResourcesAt::Page(id) => self.doc.get_dictionary(id)?.get(b"Resources")?.as_dict()?,
            ResourcesAt::Object(id) => self.doc.get_dictionary(id)?,
        })
    }

    fn resources_mut(&mut self, at: ResourcesAt) -> Result<&mut Dictionary, RenderError> {
        Ok(match at {
            ResourcesAt::Page(id) => self
                .doc
                .get_object_mut(id)
                .and_then(Object::as_dict_mut)?
                .get_mut(b"Resources")
                .and_then(Object::as_dict_mut)?,
            ResourcesAt::Object(id) => self.doc.get_object_mut(id).and_then(Object::as_dict_mut)?,
        })
    }
}
