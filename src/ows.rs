//! Detection of OGC exception reports in service responses.
//!
//! OGC services answer failed requests with HTTP 200 and an XML exception
//! report instead of the requested document. Two dialects are recognised:
//! OWS common `ExceptionReport` (with `Exception`/`ExceptionText` children)
//! and the WMS `ServiceExceptionReport` (with `ServiceException` children).
//! Only the root element decides whether a document is a report.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

/// Errors raised while checking a service response.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum OwsError {
    /// The response is an exception report.
    #[error("service returned an exception ({}): {text}", .code.as_deref().unwrap_or("no code"))]
    Exception {
        /// `exceptionCode` (OWS) or `code` (WMS) of the first exception.
        code: Option<String>,
        /// Trimmed text of the first exception; empty when none was given.
        text: String,
    },
    /// The response could not be parsed as XML.
    #[error("malformed service response: {0}")]
    Malformed(String),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Element {
    Report,
    Exception,
    ExceptionText,
    ServiceException,
    Other,
}

impl Element {
    fn classify(start: &BytesStart<'_>) -> Self {
        match start.local_name().as_ref() {
            b"ExceptionReport" | b"ServiceExceptionReport" => Self::Report,
            b"Exception" => Self::Exception,
            b"ExceptionText" => Self::ExceptionText,
            b"ServiceException" => Self::ServiceException,
            _ => Self::Other,
        }
    }

    const fn carries_code(self) -> bool {
        matches!(self, Self::Exception | Self::ServiceException)
    }

    const fn carries_text(self) -> bool {
        matches!(self, Self::ExceptionText | Self::ServiceException)
    }
}

fn malformed(err: impl std::fmt::Display) -> OwsError {
    OwsError::Malformed(err.to_string())
}

fn exception_code(start: &BytesStart<'_>) -> Result<Option<String>, OwsError> {
    for parsed in start.attributes() {
        let attribute = parsed.map_err(malformed)?;
        if matches!(
            attribute.key.local_name().as_ref(),
            b"exceptionCode" | b"code"
        ) {
            let value = attribute.unescape_value().map_err(malformed)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Collects the first exception of a report.
#[derive(Debug, Default)]
struct ReportScan {
    code: Option<String>,
    seen_exception: bool,
    capturing: bool,
    finished: bool,
    text: String,
}

impl ReportScan {
    fn open(&mut self, element: Element, start: &BytesStart<'_>) -> Result<(), OwsError> {
        if element.carries_code() && !self.seen_exception {
            self.seen_exception = true;
            self.code = exception_code(start)?;
        }
        if element.carries_text() && !self.finished {
            self.text.clear();
            self.capturing = true;
        }
        Ok(())
    }

    /// Ends text capture; the first non-blank text is kept.
    fn close(&mut self) {
        if self.capturing {
            self.capturing = false;
            self.finished = !self.text.trim().is_empty();
        }
    }

    fn into_error(self) -> OwsError {
        OwsError::Exception {
            code: self.code,
            text: self.text.trim().to_owned(),
        }
    }
}

/// Tracks document structure while the reader walks every event.
#[derive(Debug, Default)]
struct DocumentScan {
    depth: usize,
    root_seen: bool,
    report: Option<ReportScan>,
}

impl DocumentScan {
    fn element(&mut self, start: &BytesStart<'_>) -> Result<(), OwsError> {
        let element = Element::classify(start);
        if self.depth > 0 {
            if let Some(report) = self.report.as_mut() {
                report.open(element, start)?;
            }
            return Ok(());
        }
        if self.root_seen {
            return Err(OwsError::Malformed(String::from(
                "document has more than one root element",
            )));
        }
        self.root_seen = true;
        if element == Element::Report {
            self.report = Some(ReportScan::default());
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), OwsError> {
        if self.depth == 0 {
            return Err(OwsError::Malformed(String::from(
                "text outside the root element",
            )));
        }
        if let Some(report) = self.report.as_mut().filter(|report| report.capturing) {
            report.text.push_str(text);
        }
        Ok(())
    }

    fn end(&mut self) -> Result<(), OwsError> {
        self.depth = self
            .depth
            .checked_sub(1)
            .ok_or_else(|| OwsError::Malformed(String::from("unexpected end tag")))?;
        if let Some(report) = self.report.as_mut() {
            report.close();
        }
        Ok(())
    }

    fn finish(self) -> Result<(), OwsError> {
        if !self.root_seen {
            return Err(OwsError::Malformed(String::from(
                "document has no root element",
            )));
        }
        if self.depth > 0 {
            return Err(OwsError::Malformed(String::from(
                "document ends inside an open element",
            )));
        }
        self.report.map_or(Ok(()), |report| Err(report.into_error()))
    }
}

/// Checks whether `xml` is an OGC exception report.
///
/// The whole document is read, so a report is only recognised in
/// well-formed XML.
///
/// # Errors
///
/// Returns [`OwsError::Exception`] when the root element is an
/// `ExceptionReport` or `ServiceExceptionReport`, and
/// [`OwsError::Malformed`] when the document is not well-formed XML or has
/// no root element.
pub fn check_for_exception_response(xml: &str) -> Result<(), OwsError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut scan = DocumentScan::default();

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(start) => {
                scan.element(&start)?;
                scan.depth += 1;
            }
            Event::Empty(start) => {
                scan.element(&start)?;
                if let Some(report) = scan.report.as_mut() {
                    report.capturing = false;
                }
            }
            Event::Text(text) => scan.text(&text.unescape().map_err(malformed)?)?,
            Event::CData(data) => scan.text(&String::from_utf8_lossy(&data.into_inner()))?,
            Event::End(_) => scan.end()?,
            Event::Eof => return scan.finish(),
            _ => {}
        }
    }
}
