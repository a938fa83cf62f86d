//! In-memory EPUB builder for tests.

use std::io::{Cursor, Write};

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// Content of one spine document.
pub enum ChapterBody {
    /// XHTML with the given body markup.
    Markup(String),
    /// Arbitrary bytes (e.g. invalid UTF-8).
    Raw(Vec<u8>),
    /// Listed in the manifest and spine but absent from the archive.
    Missing,
}

/// Builds an EPUB 2 container with one spine item per chapter.
pub struct EpubFixture {
    title: String,
    chapters: Vec<ChapterBody>,
}

impl EpubFixture {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            chapters: Vec::new(),
        }
    }

    /// Adds a chapter whose `<body>` contains `body`.
    pub fn chapter(mut self, body: &str) -> Self {
        self.chapters.push(ChapterBody::Markup(body.to_string()));
        self
    }

    /// Adds `count` chapters with the text "Chapter N".
    pub fn numbered_chapters(mut self, count: usize) -> Self {
        for n in 1..=count {
            self.chapters
                .push(ChapterBody::Markup(format!("<p>Chapter {n}</p>")));
        }
        self
    }

    pub fn raw_chapter(mut self, bytes: &[u8]) -> Self {
        self.chapters.push(ChapterBody::Raw(bytes.to_vec()));
        self
    }

    pub fn missing_chapter(mut self) -> Self {
        self.chapters.push(ChapterBody::Missing);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        zip.start_file("mimetype", stored).unwrap();
        zip.write_all(b"application/epub+zip").unwrap();
        zip.start_file("META-INF/container.xml", stored).unwrap();
        zip.write_all(CONTAINER_XML.as_bytes()).unwrap();
        zip.start_file("OEBPS/content.opf", stored).unwrap();
        zip.write_all(self.package_document().as_bytes()).unwrap();
        zip.start_file("OEBPS/toc.ncx", stored).unwrap();
        zip.write_all(self.ncx().as_bytes()).unwrap();

        for (index, chapter) in self.chapters.iter().enumerate() {
            let name = format!("OEBPS/ch{}.xhtml", index + 1);
            match chapter {
                ChapterBody::Markup(body) => {
                    zip.start_file(name, stored).unwrap();
                    zip.write_all(xhtml(index + 1, body).as_bytes()).unwrap();
                }
                ChapterBody::Raw(bytes) => {
                    zip.start_file(name, stored).unwrap();
                    zip.write_all(bytes).unwrap();
                }
                ChapterBody::Missing => {}
            }
        }

        zip.finish().unwrap().into_inner()
    }

    fn package_document(&self) -> String {
        let manifest: String = (1..=self.chapters.len())
            .map(|n| {
                format!(
                    r#"    <item id="ch{n}" href="ch{n}.xhtml" media-type="application/xhtml+xml"/>
"#
                )
            })
            .collect();
        let spine: String = (1..=self.chapters.len())
            .map(|n| format!("    <itemref idref=\"ch{n}\"/>\n"))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="bookid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>{title}</dc:title>
    <dc:identifier id="bookid">urn:uuid:00000000-0000-4000-8000-000000000000</dc:identifier>
    <dc:language>en</dc:language>
  </metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
{manifest}  </manifest>
  <spine toc="ncx">
{spine}  </spine>
</package>
"#,
            title = self.title
        )
    }

    fn ncx(&self) -> String {
        let points: String = (1..=self.chapters.len())
            .map(|n| {
                format!(
                    r#"    <navPoint id="nav{n}" playOrder="{n}"><navLabel><text>Chapter {n}</text></navLabel><content src="ch{n}.xhtml"/></navPoint>
"#
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head><meta name="dtb:uid" content="urn:uuid:00000000-0000-4000-8000-000000000000"/></head>
  <docTitle><text>{title}</text></docTitle>
  <navMap>
{points}  </navMap>
</ncx>
"#,
            title = self.title
        )
    }
}

fn xhtml(n: usize, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Part {n}</title></head>
<body>
{body}
</body>
</html>
"#
    )
}
