//! In-memory PDF document assembled page by page.
//!
//! A fresh document already holds one blank page; [`PdfDocumentBuilder::add_page`]
//! appends further blank pages and [`PdfDocumentBuilder::draw_image`] always
//! draws on the last one. Page dictionaries are only materialised in
//! [`PdfDocumentBuilder::finish`], which consumes the builder so a document is
//! serialised exactly once.

use crate::config::Unit;
use crate::error::Png2PdfError;
use crate::layout::{PageGeometry, Placement};
use crate::pipeline::embed::ImageXObject;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// A page whose content is still being collected.
#[derive(Debug, Default)]
struct PendingPage {
    operations: Vec<Operation>,
    xobjects: Dictionary,
}

/// Builds a PDF with one or more images per page.
pub struct PdfDocumentBuilder {
    doc: Document,
    pages_id: ObjectId,
    geometry: PageGeometry,
    unit: Unit,
    pages: Vec<PendingPage>,
    info: Option<Dictionary>,
}

impl PdfDocumentBuilder {
    /// Start a document whose pages all have the given geometry.
    pub fn new(geometry: PageGeometry, unit: Unit) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            geometry,
            unit,
            pages: vec![PendingPage::default()],
            info: None,
        }
    }

    /// Append a blank page and make it the current page.
    pub fn add_page(&mut self) {
        self.pages.push(PendingPage::default());
    }

    /// Number of pages, including the current one.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    /// Draw an image on the current page.
    ///
    /// # Errors
    /// [`Png2PdfError::EmbedFailure`] when the placement is not drawable or
    /// the image has no pixels.
    pub fn draw_image(
        &mut self,
        xobject: &ImageXObject,
        placement: &Placement,
    ) -> Result<(), Png2PdfError> {
        let page_num = self.pages.len();
        if !placement.is_drawable() {
            return Err(Png2PdfError::EmbedFailure {
                page: page_num,
                detail: format!("placement is not drawable: {placement:?}"),
            });
        }
        if xobject.width == 0 || xobject.height == 0 {
            return Err(Png2PdfError::EmbedFailure {
                page: page_num,
                detail: format!("image is {}x{} px", xobject.width, xobject.height),
            });
        }

        let smask_id = xobject.smask_stream().map(|s| self.doc.add_object(s));
        let image_id = self.doc.add_object(xobject.image_stream(smask_id));
        let rect = placement.to_pdf_rect(&self.geometry, self.unit);

        let page = self
            .pages
            .last_mut()
            .ok_or_else(|| Png2PdfError::Internal("document has no pages".into()))?;
        let name = format!("Im{}", page.xobjects.len() + 1);
        page.xobjects.set(name.as_bytes(), image_id);
        page.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    real(rect.width),
                    0.into(),
                    0.into(),
                    real(rect.height),
                    real(rect.x),
                    real(rect.y),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        Ok(())
    }

    /// Record the document Info dictionary.
    pub fn set_info(&mut self, title: Option<&str>, producer: &str) {
        let mut info = dictionary! {
            "Producer" => Object::string_literal(producer),
        };
        if let Some(title) = title {
            info.set("Title", Object::string_literal(title));
        }
        self.info = Some(info);
    }

    /// Assemble the page tree and serialise the document.
    pub fn finish(mut self) -> Result<Vec<u8>, Png2PdfError> {
        let media_box = vec![
            0.into(),
            0.into(),
            real(self.geometry.width * self.unit.points_per_unit()),
            real(self.geometry.height * self.unit.points_per_unit()),
        ];

        let mut kids = Vec::with_capacity(self.pages.len());
        for page in std::mem::take(&mut self.pages) {
            let content = Content {
                operations: page.operations,
            };
            let bytes = content
                .encode()
                .map_err(|e| Png2PdfError::SerializationFailure(e.to_string()))?;
            let content_id = self.doc.add_object(Stream::new(dictionary! {}, bytes));
            let page_id = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => self.pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "XObject" => page.xobjects,
                },
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => media_box,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        if let Some(info) = self.info.take() {
            let info_id = self.doc.add_object(info);
            self.doc.trailer.set("Info", info_id);
        }

        let mut buf = Vec::new();
        self.doc
            .save_to(&mut buf)
            .map_err(|e| Png2PdfError::SerializationFailure(e.to_string()))?;
        Ok(buf)
    }
}

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}
