/*!
 * XML serialization of an ingestion result
 *
 * Layout:
 *
 * ```xml
 * <codebase>
 *   <file_summary>...</file_summary>
 *   <directory_structure>...</directory_structure>
 *   <files>
 *     <file path="src/a.ts" language="typescript" lines="3">...</file>
 *   </files>
 * </codebase>
 * ```
 *
 * All attribute values and element text go through quick-xml's escaping,
 * which replaces `&`, `<`, `>`, `"` and `'` in a single pass, so nothing is
 * ever escaped twice.
 */

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::bail;
use crate::error::Result;
use crate::types::{FileRecord, IngestionResult, SerializedArtifact};

/// XML writer for ingestion results
#[derive(Debug, Clone, Copy)]
pub struct XmlWriter {
    /// Spaces per nesting level
    indent: usize,
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl XmlWriter {
    /// Create a new XML writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize a full ingestion result
    pub fn serialize_result(&self, result: &IngestionResult) -> Result<String> {
        self.serialize(&result.summary, &result.tree, &result.files)
    }

    /// Assemble summary, tree and file records into one document
    pub fn serialize(&self, summary: &str, tree: &str, records: &[FileRecord]) -> Result<String> {
        let mut xml_writer = Writer::new_with_indent(Vec::new(), b' ', self.indent);

        // Write XML declaration
        xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        xml_writer.write_event(Event::Start(BytesStart::new("codebase")))?;

        self.write_text_element(&mut xml_writer, "file_summary", summary)?;
        self.write_text_element(&mut xml_writer, "directory_structure", tree)?;

        xml_writer.write_event(Event::Start(BytesStart::new("files")))?;
        for record in records {
            self.write_file(record, &mut xml_writer)?;
        }
        xml_writer.write_event(Event::End(BytesEnd::new("files")))?;

        xml_writer.write_event(Event::End(BytesEnd::new("codebase")))?;

        let bytes = xml_writer.into_inner();
        String::from_utf8(bytes).map_err(|e| crate::error!(Writer, "Non UTF-8 output: {}", e))
    }

    /// Write a file record as a `file` element
    fn write_file<W: Write>(&self, file: &FileRecord, writer: &mut Writer<W>) -> Result<()> {
        let lines = file.line_count.to_string();

        let mut start_tag = BytesStart::new("file");
        start_tag.push_attribute(("path", file.path.as_str()));
        start_tag.push_attribute(("language", file.language.as_str()));
        start_tag.push_attribute(("lines", lines.as_str()));
        writer.write_event(Event::Start(start_tag))?;

        writer.write_event(Event::Text(BytesText::new(&file.content)))?;

        writer.write_event(Event::End(BytesEnd::new("file")))?;

        Ok(())
    }

    fn write_text_element<W: Write>(
        &self,
        writer: &mut Writer<W>,
        name: &str,
        text: &str,
    ) -> Result<()> {
        writer.write_event(Event::Start(BytesStart::new(name)))?;
        writer.write_event(Event::Text(BytesText::new(text)))?;
        writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// Write a successful artifact to `path`. Failed artifacts are refused so
    /// an invalid document never reaches disk.
    pub fn persist(&self, artifact: &SerializedArtifact, path: &Path) -> Result<()> {
        if !artifact.success {
            bail!(
                Writer,
                "Refusing to write failed artifact: {}",
                artifact.error.as_deref().unwrap_or("unknown error")
            );
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(artifact.xml.as_bytes())?;
        writer.flush()?;

        log::info!("Wrote {} bytes to {}", artifact.xml.len(), path.display());
        Ok(())
    }
}
